use clap::Parser;
use vacancy_stats::core::normalizer::VacancyReader;
use vacancy_stats::core::partition::{YearPartitions, DEFAULT_PARTITION_DIR};
use vacancy_stats::core::Storage;
use vacancy_stats::utils::logger;
use vacancy_stats::{CurrencyTable, LocalStorage};

#[derive(Parser)]
#[command(name = "split-by-year")]
#[command(about = "Split a vacancy CSV into one cleaned file per publication year")]
struct Args {
    /// CSV file with vacancies
    #[arg(short, long, default_value = "vacancies.csv")]
    file: String,

    #[arg(short, long, default_value = DEFAULT_PARTITION_DIR)]
    output_dir: String,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("📥 Splitting {} by year", args.file);

    let storage = LocalStorage::default();
    let data = storage.read_file(&args.file).await?;

    let partitions = match VacancyReader::new(data.as_slice(), CurrencyTable::standard())
        .and_then(|mut reader| YearPartitions::collect(&mut reader))
    {
        Ok(partitions) => partitions,
        Err(e) => {
            tracing::error!("❌ Split failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    let written = partitions.write_all(&storage, &args.output_dir).await?;

    println!(
        "✅ {} vacancies split into {} files in {}",
        partitions.total_rows(),
        written.len(),
        args.output_dir
    );

    Ok(())
}
