use std::fmt::Write as _;
use std::io::Read;
use tempfile::TempDir;
use vacancy_stats::domain::model::StatisticsReport;
use vacancy_stats::{CliConfig, EtlEngine, LocalStorage, ReportPipeline, StatsError};

const HEADER: &str = "\u{feff}name,description,key_skills,experience_id,premium,employer_name,salary_from,salary_to,salary_gross,salary_currency,area_name,published_at";

fn row(name: &str, from: u32, to: u32, currency: &str, city: &str, published_at: &str) -> String {
    format!(
        "{},\"<p>Team <b>work</b></p>\",\"SQL\nPython\",between1And3,FALSE,Acme,{},{},TRUE,{},{},{}",
        name, from, to, currency, city, published_at
    )
}

/// 200 筆有效列 + 5 筆不完整列 + 2 筆未知幣別
fn fixture() -> String {
    let mut csv = String::new();
    writeln!(csv, "{}", HEADER).unwrap();

    for _ in 0..120 {
        writeln!(csv, "{}", row("Аналитик", 100, 200, "RUR", "Москва", "2022-03-01T10:00:00+0300")).unwrap();
    }
    for _ in 0..60 {
        writeln!(csv, "{}", row("Программист Rust", 1000, 3000, "RUR", "Казань", "2021-06-01T10:00:00+0300")).unwrap();
    }
    for _ in 0..19 {
        writeln!(csv, "{}", row("Тестировщик", 10, 20, "USD", "Тверь", "2023-01-15T10:00:00+0300")).unwrap();
    }
    writeln!(csv, "{}", row("Архитектор", 100000, 100000, "RUR", "Псков", "2023-02-01T10:00:00+0300")).unwrap();

    for _ in 0..5 {
        writeln!(csv, "Аналитик,,,,,,100,200,TRUE,RUR,Москва,2022-03-01T10:00:00+0300").unwrap();
    }
    for _ in 0..2 {
        writeln!(csv, "{}", row("Аналитик", 100, 200, "XYZ", "Москва", "2022-03-01T10:00:00+0300")).unwrap();
    }

    csv
}

fn config(profession: &str) -> CliConfig {
    CliConfig {
        file: "vacancies.csv".to_string(),
        profession: profession.to_string(),
        output_path: "out".to_string(),
        formats: vec!["json".to_string(), "txt".to_string(), "csv".to_string()],
        top: 10,
        verbose: false,
        json_logs: false,
    }
}

fn read_entry(archive: &mut zip::ZipArchive<std::fs::File>, name: &str) -> anyhow::Result<String> {
    let mut content = String::new();
    archive.by_name(name)?.read_to_string(&mut content)?;
    Ok(content)
}

#[tokio::test]
async fn test_end_to_end_report() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("vacancies.csv"), fixture())?;

    let pipeline = ReportPipeline::new(LocalStorage::new(temp_dir.path()), config("Программист"));
    let engine = EtlEngine::new(pipeline);
    let outcome = engine.run().await?;

    assert_eq!(outcome.output_path, "out/statistics.zip");
    assert_eq!(outcome.counters.read, 207);
    assert_eq!(outcome.counters.incomplete, 5);
    assert_eq!(outcome.counters.rejected, 2);
    assert_eq!(outcome.counters.admitted, 200);

    let report = &outcome.report;
    assert_eq!(report.total_vacancies, 200);
    // 2023: (19 * 909 + 100000) / 20
    assert_eq!(
        report.overall.salary_by_year,
        vec![(2022, 150), (2021, 2000), (2023, 5863)]
    );
    assert_eq!(
        report.overall.count_by_year,
        vec![(2022, 120), (2021, 60), (2023, 20)]
    );
    assert_eq!(report.profession_scoped.salary_by_year, vec![(2021, 2000)]);
    assert_eq!(report.profession_scoped.count_by_year, vec![(2021, 60)]);

    // 門檻 200 / 100 = 2，Псков 只有 1 筆
    let salary_cities: Vec<&str> = report.cities.by_salary.iter().map(|c| c.city.as_str()).collect();
    assert_eq!(salary_cities, vec!["Казань", "Тверь", "Москва"]);
    let share_cities: Vec<(&str, f64)> = report
        .cities
        .by_share
        .iter()
        .map(|c| (c.city.as_str(), c.share))
        .collect();
    assert_eq!(share_cities, vec![("Москва", 0.6), ("Казань", 0.3), ("Тверь", 0.095)]);

    let archive_path = temp_dir.path().join("out").join("statistics.zip");
    let mut archive = zip::ZipArchive::new(std::fs::File::open(archive_path)?)?;
    assert_eq!(archive.len(), 4);

    let json: StatisticsReport = serde_json::from_str(&read_entry(&mut archive, "statistics.json")?)?;
    assert_eq!(&json, report);

    let summary = read_entry(&mut archive, "statistics.txt")?;
    assert!(summary.contains("Salary by year: {2022: 150, 2021: 2000, 2023: 5863}"));
    assert!(summary.contains("Vacancies by year for 'Программист': {2021: 60}"));

    let cities = read_entry(&mut archive, "cities.csv")?;
    assert!(cities.contains("Тверь,909,,Казань,30.00%"));
    assert!(cities.contains("Москва,150,,Тверь,9.50%"));

    let years = read_entry(&mut archive, "years.csv")?;
    assert!(years.contains("2022,150,0,120,0"));

    Ok(())
}

#[tokio::test]
async fn test_profession_without_matches_falls_back_to_latest_year() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("vacancies.csv"), fixture())?;

    let pipeline = ReportPipeline::new(LocalStorage::new(temp_dir.path()), config("Дизайнер"));
    let outcome = EtlEngine::new(pipeline).run().await?;

    assert_eq!(outcome.report.profession_scoped.salary_by_year, vec![(2023, 0)]);
    assert_eq!(outcome.report.profession_scoped.count_by_year, vec![(2023, 0)]);
    Ok(())
}

#[tokio::test]
async fn test_header_only_file_is_fatal() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("vacancies.csv"), format!("{}\n", HEADER))?;

    let pipeline = ReportPipeline::new(LocalStorage::new(temp_dir.path()), config("Аналитик"));
    let result = EtlEngine::new(pipeline).run().await;

    assert!(matches!(result, Err(StatsError::NoData)));
    assert!(!temp_dir.path().join("out").exists());
    Ok(())
}

#[tokio::test]
async fn test_empty_file_is_fatal() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("vacancies.csv"), "")?;

    let pipeline = ReportPipeline::new(LocalStorage::new(temp_dir.path()), config("Аналитик"));
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, StatsError::EmptyFile));
    assert_eq!(err.exit_code(), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_input_is_io_error() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    let pipeline = ReportPipeline::new(LocalStorage::new(temp_dir.path()), config("Аналитик"));
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, StatsError::IoError(_)));
    assert_eq!(err.exit_code(), 3);
    Ok(())
}
