use crate::core::aggregator::Aggregator;
use crate::core::currency::CurrencyTable;
use crate::core::normalizer::VacancyReader;
use crate::core::ranking::RankingSelector;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{RowCounters, StatisticsReport, TransformResult, VacancyRecord};
use crate::report::{render_cities_csv, render_summary, render_years_csv};
use crate::utils::error::Result;
use std::io::Write;
use std::sync::Mutex;
use zip::write::{FileOptions, ZipWriter};

pub const OUTPUT_FORMATS: [&str; 3] = ["json", "txt", "csv"];

/// 讀取職缺 CSV、彙總、輸出統計報表
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    currencies: CurrencyTable,
    counters: Mutex<RowCounters>,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_currencies(storage, config, CurrencyTable::standard().clone())
    }

    pub fn with_currencies(storage: S, config: C, currencies: CurrencyTable) -> Self {
        Self {
            storage,
            config,
            currencies,
            counters: Mutex::new(RowCounters::default()),
        }
    }

    pub fn counters(&self) -> RowCounters {
        self.counters.lock().map(|c| *c).unwrap_or_default()
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }

    /// 單次走訪完成彙總與城市排名
    pub fn build_report(&self, records: &[VacancyRecord]) -> Result<StatisticsReport> {
        let mut aggregator = Aggregator::new(self.config.profession());
        for record in records {
            aggregator.add(record);
        }

        let aggregates = aggregator.finish()?;
        let cities = RankingSelector::new(self.config.top_n())
            .select(&aggregates.cities, aggregates.total_vacancies);

        Ok(StatisticsReport {
            profession: self.config.profession().to_string(),
            total_vacancies: aggregates.total_vacancies,
            overall: aggregates.overall,
            profession_scoped: aggregates.profession_scoped,
            cities,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<VacancyRecord>> {
        tracing::info!("📥 Reading vacancies from: {}", self.config.input_file());
        let data = self.storage.read_file(self.config.input_file()).await?;

        let mut reader = VacancyReader::new(data.as_slice(), &self.currencies)?;
        let records = reader.by_ref().collect::<Result<Vec<_>>>()?;
        let counters = reader.counters();

        tracing::info!(
            "📊 Rows read: {}, admitted: {}, incomplete: {}, rejected: {}",
            counters.read,
            counters.admitted,
            counters.incomplete,
            counters.rejected
        );

        if let Ok(mut stored) = self.counters.lock() {
            *stored = counters;
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<VacancyRecord>) -> Result<TransformResult> {
        tracing::info!(
            "🔧 Aggregating {} vacancies (profession: '{}')",
            data.len(),
            self.config.profession()
        );

        let report = self.build_report(&data)?;

        tracing::info!(
            "✅ {} years, {} cities by salary, {} cities by share",
            report.overall.salary_by_year.len(),
            report.cities.by_salary.len(),
            report.cities.by_share.len()
        );

        Ok(TransformResult {
            report,
            counters: self.counters(),
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), self.config.archive_name());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            if self.wants("json") {
                zip.start_file::<_, ()>("statistics.json", FileOptions::default())?;
                let json_data = serde_json::to_string_pretty(&result.report)?;
                zip.write_all(json_data.as_bytes())?;
            }

            if self.wants("txt") {
                zip.start_file::<_, ()>("statistics.txt", FileOptions::default())?;
                zip.write_all(render_summary(&result.report).as_bytes())?;
            }

            if self.wants("csv") {
                zip.start_file::<_, ()>("years.csv", FileOptions::default())?;
                zip.write_all(&render_years_csv(&result.report)?)?;

                zip.start_file::<_, ()>("cities.csv", FileOptions::default())?;
                zip.write_all(&render_cities_csv(&result.report)?)?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report archive ({} bytes)", zip_data.len());
        self.storage.write_file(&output_path, &zip_data).await?;

        tracing::info!("📦 Report saved: {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::StatsError;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex as AsyncMutex;

    const INPUT: &str = "\u{feff}name,salary_from,salary_to,salary_currency,area_name,published_at\n\
Аналитик данных,100,200,RUR,Москва,2021-01-01T10:00:00+0300\n\
Программист,1000,3000,RUR,Казань,2021-05-01T10:00:00+0300\n\
Аналитик,10,20,USD,Москва,2022-02-01T10:00:00+0300\n\
Тестировщик,,500,RUR,Москва,2022-03-01T10:00:00+0300\n";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<AsyncMutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.as_bytes().to_vec());
            Self {
                files: Arc::new(AsyncMutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                StatsError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        profession: String,
        formats: Vec<String>,
    }

    impl MockConfig {
        fn new(profession: &str) -> Self {
            Self {
                profession: profession.to_string(),
                formats: vec!["json".to_string(), "txt".to_string(), "csv".to_string()],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_file(&self) -> &str {
            "vacancies.csv"
        }

        fn profession(&self) -> &str {
            &self.profession
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn top_n(&self) -> usize {
            10
        }
    }

    #[tokio::test]
    async fn test_extract_drops_incomplete_rows() {
        let storage = MockStorage::with_file("vacancies.csv", INPUT);
        let pipeline = ReportPipeline::new(storage, MockConfig::new("Аналитик"));

        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(pipeline.counters().incomplete, 1);
    }

    #[tokio::test]
    async fn test_transform_builds_report() {
        let storage = MockStorage::with_file("vacancies.csv", INPUT);
        let pipeline = ReportPipeline::new(storage, MockConfig::new("Аналитик"));

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();
        let report = result.report;

        // 2021: (150 + 2000) / 2; 2022: 30 * 60.66 / 2 = 909.9
        assert_eq!(report.overall.salary_by_year, vec![(2021, 1075), (2022, 909)]);
        assert_eq!(report.profession_scoped.salary_by_year, vec![(2021, 150), (2022, 909)]);
        assert_eq!(report.total_vacancies, 3);
        assert_eq!(report.cities.by_salary[0].city, "Казань");
        assert_eq!(report.cities.by_share[0].city, "Москва");
        assert_eq!(report.cities.by_share[0].share, 0.6667);
    }

    #[tokio::test]
    async fn test_transform_without_rows_is_fatal() {
        let storage = MockStorage::with_file("vacancies.csv", INPUT);
        let pipeline = ReportPipeline::new(storage, MockConfig::new("Аналитик"));

        let err = pipeline.transform(Vec::new()).await.unwrap_err();
        assert!(matches!(err, StatsError::NoData));
    }

    #[tokio::test]
    async fn test_load_writes_requested_formats() {
        let storage = MockStorage::with_file("vacancies.csv", INPUT);
        let mut config = MockConfig::new("Аналитик");
        config.formats = vec!["txt".to_string()];
        let pipeline = ReportPipeline::new(storage.clone(), config);

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();
        assert_eq!(output_path, "out/statistics.zip");

        let zip_bytes = storage.get_file("out/statistics.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        assert_eq!(archive.len(), 1);

        let mut summary = String::new();
        archive
            .by_name("statistics.txt")
            .unwrap()
            .read_to_string(&mut summary)
            .unwrap();
        assert!(summary.starts_with("Salary by year: {2021: 1075, 2022: 909}"));
    }
}
