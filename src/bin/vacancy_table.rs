use clap::Parser;
use vacancy_stats::core::Storage;
use vacancy_stats::report::table::{render_table, RowWindow};
use vacancy_stats::utils::logger;
use vacancy_stats::{CurrencyTable, LocalStorage, VacancyCatalog};

#[derive(Parser)]
#[command(name = "vacancy-table")]
#[command(about = "Filter, sort and print vacancies as a text table")]
struct Args {
    /// CSV file with vacancies
    #[arg(short, long, default_value = "vacancies.csv")]
    file: String,

    /// Filter criterion: skills, salary, published_date, experience, premium,
    /// currency, name, city, employer
    #[arg(long, default_value = "")]
    filter: String,

    #[arg(long, default_value = "")]
    value: String,

    /// Sort field: name, description, employer, city, experience, premium,
    /// salary, skills, published_at
    #[arg(long, default_value = "")]
    sort: String,

    #[arg(long)]
    descending: bool,

    /// Row window, e.g. "10 20" (1-based, end exclusive)
    #[arg(long, default_value = "")]
    rows: String,

    /// Columns to show, comma separated
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let currencies = CurrencyTable::standard();
    let data = LocalStorage::default().read_file(&args.file).await?;

    let mut catalog = match VacancyCatalog::from_csv(data.as_slice(), currencies) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("❌ Could not read vacancies: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    if !args.filter.is_empty() {
        catalog.filter(&args.filter, &args.value);
    }
    catalog.sort(&args.sort, args.descending);

    let fields: Vec<String> = args
        .fields
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    println!(
        "{}",
        render_table(catalog.records(), currencies, RowWindow::parse(&args.rows), &fields)
    );

    Ok(())
}
