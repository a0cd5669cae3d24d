use crate::core::normalizer::{parse_year, CleanRow, VacancyReader};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StatsError};
use std::collections::HashMap;
use std::io::Read;

pub const DEFAULT_PARTITION_DIR: &str = "csvs_by_years";

pub fn partition_file_name(year: i32) -> String {
    format!("vacancies_by_{}.csv", year)
}

/// 依發佈年份切分的清理列
#[derive(Debug, Clone, Default)]
pub struct YearPartitions {
    header: Vec<String>,
    years: Vec<i32>,
    rows: HashMap<i32, Vec<CleanRow>>,
}

impl YearPartitions {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            years: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// 讀完整個來源；年份無法解析的列略過
    pub fn collect<R: Read>(reader: &mut VacancyReader<'_, R>) -> Result<Self> {
        let published_at = reader
            .header()
            .position("published_at")
            .ok_or_else(|| StatsError::MissingColumn {
                column: "published_at".to_string(),
            })?;
        let mut partitions = Self::new(reader.header().columns().to_vec());

        while let Some(row) = reader.next_clean_row() {
            let row = row?;
            let year = row
                .get(published_at)
                .map(|value| parse_year(&value.joined()));

            match year {
                Some(Ok(year)) => partitions.push(year, row),
                Some(Err(e)) => tracing::debug!("Skipping row without a year: {}", e),
                None => {}
            }
        }

        if partitions.is_empty() {
            return Err(StatsError::NoData);
        }

        Ok(partitions)
    }

    pub fn push(&mut self, year: i32, row: CleanRow) {
        if !self.rows.contains_key(&year) {
            self.years.push(year);
        }
        self.rows.entry(year).or_default().push(row);
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// 依首次出現順序
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn rows(&self, year: i32) -> &[CleanRow] {
        self.rows.get(&year).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// 單一年份的 CSV 內容 (含原始標頭)
    pub fn render(&self, year: i32) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.header)?;
        for row in self.rows(year) {
            writer.write_record(row.to_csv_fields())?;
        }

        writer
            .into_inner()
            .map_err(|e| StatsError::IoError(e.into_error()))
    }

    /// 每個年份寫一個檔案，回傳寫入的相對路徑
    pub async fn write_all<S: Storage>(&self, storage: &S, directory: &str) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(self.years.len());

        for year in &self.years {
            let path = format!("{}/{}", directory, partition_file_name(*year));
            let data = self.render(*year)?;
            storage.write_file(&path, &data).await?;
            tracing::info!("📄 {} vacancies for {} -> {}", self.rows(*year).len(), year, path);
            written.push(path);
        }

        Ok(written)
    }
}
