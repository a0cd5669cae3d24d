use crate::core::currency::CurrencyTable;
use crate::domain::model::{ExperienceLevel, FieldValue, RowCounters, SalaryRange, VacancyRecord};
use crate::utils::error::{Result, StatsError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io::Read;

/// 彙總所需的欄位
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "salary_from",
    "salary_to",
    "salary_currency",
    "area_name",
    "published_at",
];

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// 移除 HTML 標籤、壓縮空白；含換行時拆成多行
pub fn clean_text(raw: &str) -> FieldValue {
    let stripped = HTML_TAG.replace_all(raw, "");
    let normalized = stripped.trim().replace("\r\n", "\n");

    let mut lines: Vec<String> = normalized
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    if lines.len() == 1 {
        FieldValue::Scalar(lines.remove(0))
    } else {
        FieldValue::Lines(lines)
    }
}

/// TRUE/True/Да 等布林字彙
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "TRUE" | "True" | "true" | "Да" | "Yes" | "yes" => Some(true),
        "FALSE" | "False" | "false" | "Нет" | "No" | "no" => Some(false),
        _ => None,
    }
}

/// 只取整數部分 ("1500.9" -> 1500)
pub fn parse_integer_part(field: &str, value: &str) -> Result<i64> {
    let number: f64 = value.trim().parse().map_err(|_| StatsError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
        reason: "not a number".to_string(),
    })?;

    if !number.is_finite() {
        return Err(StatsError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
            reason: "not a finite number".to_string(),
        });
    }

    let truncated = number.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(StatsError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
            reason: "out of range".to_string(),
        });
    }

    Ok(truncated as i64)
}

/// published_at 以 '-' 切開的第一段即年份
pub fn parse_year(value: &str) -> Result<i32> {
    value
        .split('-')
        .next()
        .and_then(|year| year.trim().parse().ok())
        .ok_or_else(|| StatsError::InvalidField {
            field: "published_at".to_string(),
            value: value.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        })
}

#[derive(Debug, Clone, Copy)]
struct ColumnPositions {
    name: usize,
    salary_from: usize,
    salary_to: usize,
    salary_currency: usize,
    area_name: usize,
    published_at: usize,
    description: Option<usize>,
    key_skills: Option<usize>,
    experience_id: Option<usize>,
    premium: Option<usize>,
    employer_name: Option<usize>,
    salary_gross: Option<usize>,
}

/// 由檔案第一列解析出的欄位索引
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: Vec<String>,
    lookup: HashMap<String, usize>,
    positions: ColumnPositions,
}

impl HeaderIndex {
    pub fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let column = if i == 0 {
                    column.trim_start_matches('\u{feff}')
                } else {
                    column
                };
                column.trim().to_string()
            })
            .collect();

        if columns.iter().all(String::is_empty) {
            return Err(StatsError::EmptyFile);
        }

        let mut lookup = HashMap::new();
        for (i, column) in columns.iter().enumerate() {
            lookup.entry(column.clone()).or_insert(i);
        }

        let required = |column: &str| {
            lookup
                .get(column)
                .copied()
                .ok_or_else(|| StatsError::MissingColumn {
                    column: column.to_string(),
                })
        };

        let positions = ColumnPositions {
            name: required("name")?,
            salary_from: required("salary_from")?,
            salary_to: required("salary_to")?,
            salary_currency: required("salary_currency")?,
            area_name: required("area_name")?,
            published_at: required("published_at")?,
            description: lookup.get("description").copied(),
            key_skills: lookup.get("key_skills").copied(),
            experience_id: lookup.get("experience_id").copied(),
            premium: lookup.get("premium").copied(),
            employer_name: lookup.get("employer_name").copied(),
            salary_gross: lookup.get("salary_gross").copied(),
        };

        Ok(Self {
            columns,
            lookup,
            positions,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.lookup.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 清理後的一列，欄位順序與標頭一致
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CleanRow {
    pub cells: Vec<FieldValue>,
}

impl CleanRow {
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.cells.get(index)
    }

    /// CSV 輸出用字串 (多行以換行串接)
    pub fn to_csv_fields(&self) -> Vec<String> {
        self.cells.iter().map(FieldValue::joined).collect()
    }
}

pub struct RecordNormalizer<'c> {
    header: HeaderIndex,
    currencies: &'c CurrencyTable,
}

impl<'c> RecordNormalizer<'c> {
    pub fn new(header: HeaderIndex, currencies: &'c CurrencyTable) -> Self {
        Self { header, currencies }
    }

    pub fn header(&self) -> &HeaderIndex {
        &self.header
    }

    /// 欄位數不符，或任一欄位清理後為空時回傳 None
    pub fn clean_row(&self, raw: &csv::StringRecord) -> Option<CleanRow> {
        if raw.len() != self.header.len() {
            return None;
        }

        let cells: Vec<FieldValue> = raw.iter().map(clean_text).collect();
        if cells.iter().any(FieldValue::is_empty) {
            return None;
        }

        Some(CleanRow { cells })
    }

    /// 不完整的列回傳 Ok(None)；無法解析的列回傳單列錯誤
    pub fn normalize(&self, raw: &csv::StringRecord) -> Result<Option<VacancyRecord>> {
        match self.clean_row(raw) {
            Some(row) => self.to_record(&row).map(Some),
            None => Ok(None),
        }
    }

    pub fn to_record(&self, row: &CleanRow) -> Result<VacancyRecord> {
        let p = &self.header.positions;
        let text = |index: usize| row.get(index).map(FieldValue::joined).unwrap_or_default();
        let optional = |index: Option<usize>| index.and_then(|i| row.get(i)).cloned();

        let currency = text(p.salary_currency);
        let rate = self.currencies.rate(&currency)?;
        let published_at = text(p.published_at);

        let salary = SalaryRange {
            from: parse_integer_part("salary_from", &text(p.salary_from))?,
            to: parse_integer_part("salary_to", &text(p.salary_to))?,
            currency,
            rate,
            gross: p.salary_gross.and_then(|i| parse_flag(&text(i))),
        };

        Ok(VacancyRecord {
            name: text(p.name),
            salary,
            published_year: parse_year(&published_at)?,
            published_at,
            city: text(p.area_name).trim().to_string(),
            description: optional(p.description),
            skills: optional(p.key_skills),
            experience: p
                .experience_id
                .and_then(|i| ExperienceLevel::parse(&text(i))),
            premium: p.premium.and_then(|i| parse_flag(&text(i))),
            employer: p.employer_name.map(text),
        })
    }
}

/// 逐列串流讀取 CSV，輸出正規化後的職缺
pub struct VacancyReader<'c, R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    normalizer: RecordNormalizer<'c>,
    counters: RowCounters,
}

impl<'c, R: Read> VacancyReader<'c, R> {
    pub fn new(input: R, currencies: &'c CurrencyTable) -> Result<Self> {
        let mut records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input)
            .into_records();

        let header = match records.next() {
            Some(header) => HeaderIndex::from_header(&header?)?,
            None => return Err(StatsError::EmptyFile),
        };

        tracing::debug!("Resolved header with {} columns", header.len());

        Ok(Self {
            records,
            normalizer: RecordNormalizer::new(header, currencies),
            counters: RowCounters::default(),
        })
    }

    pub fn header(&self) -> &HeaderIndex {
        self.normalizer.header()
    }

    pub fn normalizer(&self) -> &RecordNormalizer<'c> {
        &self.normalizer
    }

    pub fn counters(&self) -> RowCounters {
        self.counters
    }

    /// 下一筆完整的清理列；不完整的列直接略過
    pub fn next_clean_row(&mut self) -> Option<Result<CleanRow>> {
        loop {
            let raw = match self.records.next()? {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e.into())),
            };
            self.counters.read += 1;

            match self.normalizer.clean_row(&raw) {
                Some(row) => return Some(Ok(row)),
                None => {
                    self.counters.incomplete += 1;
                    tracing::debug!("Dropping incomplete row {}", self.counters.read);
                }
            }
        }
    }
}

impl<R: Read> Iterator for VacancyReader<'_, R> {
    type Item = Result<VacancyRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.next_clean_row()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };

            match self.normalizer.to_record(&row) {
                Ok(record) => {
                    self.counters.admitted += 1;
                    return Some(Ok(record));
                }
                Err(e) if e.is_row_level() => {
                    self.counters.rejected += 1;
                    tracing::debug!("Skipping row {}: {}", self.counters.read, e);
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
