use clap::Parser;
use vacancy_stats::core::normalizer::{VacancyReader, REQUIRED_COLUMNS};
use vacancy_stats::core::ConfigProvider;
use vacancy_stats::report::render_summary;
use vacancy_stats::report::table::{render_table, RowWindow};
use vacancy_stats::utils::{logger, validation::Validate};
use vacancy_stats::{
    CurrencyTable, EtlEngine, LocalStorage, ReportPipeline, TomlConfig, VacancyCatalog,
};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Vacancy statistics report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override the profession from config
    #[arg(long)]
    profession: Option<String>,

    /// Dry run - inspect the input without writing a report
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based vacancy report");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(profession) = &args.profession {
        config.input.profession = profession.clone();
        tracing::info!("🔧 Profession overridden to: {}", profession);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No report will be written");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let pipeline = ReportPipeline::new(LocalStorage::default(), config.clone());
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(outcome) => {
            println!("{}", render_summary(&outcome.report));
            println!();
            println!("📁 Report saved to: {}", outcome.output_path);
        }
        Err(e) => {
            tracing::error!("❌ Report failed: {} (Severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            return Ok(());
        }
    }

    if config.catalog.is_some() {
        print_catalog(&config)?;
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Report: {}", config.report.name);
    if let Some(description) = &config.report.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_file());
    println!("  Profession: {}", config.profession());
    println!("  Output: {}/{}", config.output_path(), config.archive_name());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Top cities: {}", config.top_n());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let file = std::fs::File::open(config.input_file())?;
    let mut reader = VacancyReader::new(file, CurrencyTable::standard())?;

    println!("📑 Header:");
    for column in REQUIRED_COLUMNS {
        println!("  ✅ {}", column);
    }
    let extra: Vec<&str> = reader
        .header()
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| !REQUIRED_COLUMNS.contains(c))
        .collect();
    if !extra.is_empty() {
        println!("  Other columns: {}", extra.join(", "));
    }
    println!();

    let mut matching = 0u64;
    for record in reader.by_ref() {
        if record?.name.contains(config.profession()) {
            matching += 1;
        }
    }

    let counters = reader.counters();
    println!("📊 Rows:");
    println!("  Read: {}", counters.read);
    println!("  Admitted: {}", counters.admitted);
    println!("  Incomplete: {}", counters.incomplete);
    println!("  Unknown currency: {}", counters.rejected);
    println!("  Matching '{}': {}", config.profession(), matching);
    println!();
    println!("✅ Dry run completed - no files were written");

    Ok(())
}

fn print_catalog(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config.catalog();
    let currencies = CurrencyTable::standard();

    let file = std::fs::File::open(config.input_file())?;
    let mut catalog = VacancyCatalog::from_csv(file, currencies)?;
    if let Some((name, value)) = settings.filter_parts() {
        catalog.filter(name, value);
    }
    if let Some(sort) = &settings.sort {
        catalog.sort(sort, settings.descending.unwrap_or(false));
    }

    let window = RowWindow::parse(settings.rows.as_deref().unwrap_or(""));
    println!();
    println!("{}", render_table(catalog.records(), currencies, window, &[]));

    Ok(())
}
