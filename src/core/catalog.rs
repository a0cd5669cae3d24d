use crate::core::currency::CurrencyTable;
use crate::core::normalizer::{parse_flag, VacancyReader};
use crate::domain::model::{ExperienceLevel, FieldValue, VacancyRecord};
use crate::utils::error::{Result, StatsError};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::cmp::Ordering;
use std::io::Read;

pub const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
pub const FILTER_DATE_FORMAT: &str = "%d.%m.%Y";

pub fn parse_published_at(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, PUBLISHED_AT_FORMAT).ok()
}

/// published_at 的日期部分 (T 之前)
pub fn published_date(value: &str) -> Option<NaiveDate> {
    let date = value.split('T').next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// 可用的篩選條件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCriterion {
    Skills,
    Salary,
    PublishedDate,
    Experience,
    Premium,
    Currency,
    Name,
    City,
    Employer,
}

impl FilterCriterion {
    pub const ALL: [FilterCriterion; 9] = [
        FilterCriterion::Skills,
        FilterCriterion::Salary,
        FilterCriterion::PublishedDate,
        FilterCriterion::Experience,
        FilterCriterion::Premium,
        FilterCriterion::Currency,
        FilterCriterion::Name,
        FilterCriterion::City,
        FilterCriterion::Employer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterCriterion::Skills => "skills",
            FilterCriterion::Salary => "salary",
            FilterCriterion::PublishedDate => "published_date",
            FilterCriterion::Experience => "experience",
            FilterCriterion::Premium => "premium",
            FilterCriterion::Currency => "currency",
            FilterCriterion::Name => "name",
            FilterCriterion::City => "city",
            FilterCriterion::Employer => "employer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn matches(&self, record: &VacancyRecord, value: &str, currencies: &CurrencyTable) -> bool {
        match self {
            // 多行技能逐項比對，單行技能以子字串比對
            FilterCriterion::Skills => {
                let mut wanted = value.split(", ").filter(|skill| !skill.is_empty());
                match &record.skills {
                    Some(skills) => match skills.as_scalar() {
                        Some(text) => wanted.all(|skill| text.contains(skill)),
                        None => {
                            let owned = skills.items();
                            wanted.all(|skill| owned.contains(&skill))
                        }
                    },
                    None => wanted.next().is_none(),
                }
            }
            FilterCriterion::Salary => value
                .trim()
                .parse::<i64>()
                .map(|amount| record.salary.contains(amount))
                .unwrap_or(false),
            FilterCriterion::PublishedDate => {
                match (
                    NaiveDate::parse_from_str(value.trim(), FILTER_DATE_FORMAT),
                    published_date(&record.published_at),
                ) {
                    (Ok(wanted), Some(actual)) => wanted == actual,
                    _ => false,
                }
            }
            FilterCriterion::Experience => matches!(
                ExperienceLevel::parse(value),
                Some(level) if record.experience == Some(level)
            ),
            FilterCriterion::Premium => {
                matches!(parse_flag(value), Some(flag) if record.premium == Some(flag))
            }
            FilterCriterion::Currency => {
                let code = record.salary.currency.as_str();
                code == value || currencies.label(code) == value
            }
            FilterCriterion::Name => record.name == value,
            FilterCriterion::City => record.city == value,
            FilterCriterion::Employer => record.employer.as_deref() == Some(value),
        }
    }
}

/// 排序鍵
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Integer(i64),
    Amount(f64),
    Timestamp(Option<DateTime<FixedOffset>>),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Integer(a), SortKey::Integer(b)) => a.cmp(b),
            (SortKey::Amount(a), SortKey::Amount(b)) => a.total_cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

type KeyExtractor = fn(&VacancyRecord) -> SortKey;

fn text_of(value: &Option<FieldValue>) -> String {
    value.as_ref().map(FieldValue::joined).unwrap_or_default()
}

/// 可排序欄位與取鍵函式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Description,
    Employer,
    City,
    Experience,
    Premium,
    Salary,
    Skills,
    PublishedAt,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::Name,
        SortField::Description,
        SortField::Employer,
        SortField::City,
        SortField::Experience,
        SortField::Premium,
        SortField::Salary,
        SortField::Skills,
        SortField::PublishedAt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Description => "description",
            SortField::Employer => "employer",
            SortField::City => "city",
            SortField::Experience => "experience",
            SortField::Premium => "premium",
            SortField::Salary => "salary",
            SortField::Skills => "skills",
            SortField::PublishedAt => "published_at",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn key_extractor(&self) -> KeyExtractor {
        match self {
            SortField::Name => |r| SortKey::Text(r.name.clone()),
            SortField::Description => |r| SortKey::Text(text_of(&r.description)),
            SortField::Employer => |r| SortKey::Text(r.employer.clone().unwrap_or_default()),
            SortField::City => |r| SortKey::Text(r.city.clone()),
            // 未知經驗等級排最前
            SortField::Experience => {
                |r| SortKey::Integer(r.experience.map(|level| level as i64).unwrap_or(-1))
            }
            // 升冪時 premium 職缺在前，未知排最後
            SortField::Premium => |r| {
                SortKey::Integer(match r.premium {
                    Some(true) => 0,
                    Some(false) => 1,
                    None => 2,
                })
            },
            SortField::Salary => |r| SortKey::Amount(r.salary.midpoint_in_base_currency()),
            SortField::Skills => |r| {
                SortKey::Integer(match &r.skills {
                    Some(FieldValue::Lines(lines)) => lines.len() as i64,
                    Some(FieldValue::Scalar(_)) => 1,
                    None => 0,
                })
            },
            SortField::PublishedAt => |r| SortKey::Timestamp(parse_published_at(&r.published_at)),
        }
    }
}

/// 可篩選、排序的職缺集合
#[derive(Debug, Clone)]
pub struct VacancyCatalog<'c> {
    records: Vec<VacancyRecord>,
    currencies: &'c CurrencyTable,
}

impl<'c> VacancyCatalog<'c> {
    pub fn new(records: Vec<VacancyRecord>, currencies: &'c CurrencyTable) -> Self {
        Self {
            records,
            currencies,
        }
    }

    /// 讀入整個 CSV；沒有任何有效列時回傳 NoData
    pub fn from_csv<R: Read>(input: R, currencies: &'c CurrencyTable) -> Result<Self> {
        let records = VacancyReader::new(input, currencies)?.collect::<Result<Vec<_>>>()?;
        if records.is_empty() {
            return Err(StatsError::NoData);
        }
        Ok(Self::new(records, currencies))
    }

    pub fn records(&self) -> &[VacancyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<VacancyRecord> {
        self.records
    }

    pub fn currencies(&self) -> &CurrencyTable {
        self.currencies
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 依名稱篩選；未知名稱不篩選
    // TODO: decide whether a mistyped criterion should be rejected instead of ignored
    pub fn filter(&mut self, criterion_name: &str, value: &str) {
        match FilterCriterion::from_name(criterion_name) {
            Some(criterion) => self.filter_by(criterion, value),
            None => {
                if !criterion_name.is_empty() {
                    tracing::warn!(
                        "Unknown filter criterion '{}', keeping all {} vacancies",
                        criterion_name,
                        self.records.len()
                    );
                }
            }
        }
    }

    pub fn filter_by(&mut self, criterion: FilterCriterion, value: &str) {
        let before = self.records.len();
        let currencies = self.currencies;
        self.records
            .retain(|record| criterion.matches(record, value, currencies));
        tracing::debug!(
            "Filter {}='{}' kept {} of {} vacancies",
            criterion.name(),
            value,
            self.records.len(),
            before
        );
    }

    /// 依欄位名稱穩定排序；未知或空名稱維持原順序
    pub fn sort(&mut self, field_name: &str, descending: bool) {
        match SortField::from_name(field_name) {
            Some(field) => self.sort_by(field, descending),
            None => {
                if !field_name.is_empty() {
                    tracing::warn!("Unknown sort field '{}', order unchanged", field_name);
                }
            }
        }
    }

    pub fn sort_by(&mut self, field: SortField, descending: bool) {
        let key = field.key_extractor();
        let mut keyed: Vec<(SortKey, VacancyRecord)> = self
            .records
            .drain(..)
            .map(|record| (key(&record), record))
            .collect();

        if descending {
            keyed.sort_by(|a, b| b.0.compare(&a.0));
        } else {
            keyed.sort_by(|a, b| a.0.compare(&b.0));
        }

        self.records = keyed.into_iter().map(|(_, record)| record).collect();
    }
}
