use serde::{Deserialize, Serialize};
use std::fmt;

/// 清理後的欄位值：單行為 Scalar，含換行者拆成有序的 Lines
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Lines(Vec<String>),
}

impl FieldValue {
    /// 單行值；多行值以換行串接
    pub fn joined(&self) -> String {
        match self {
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::Lines(lines) => lines.join("\n"),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            FieldValue::Lines(_) => None,
        }
    }

    /// 以清單形式取值，Scalar 視為單一元素
    pub fn items(&self) -> Vec<&str> {
        match self {
            FieldValue::Scalar(value) => vec![value.as_str()],
            FieldValue::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(value) => value.is_empty(),
            FieldValue::Lines(lines) => lines.iter().all(String::is_empty),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// 經驗等級，順序即排序權重
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    NoExperience,
    Between1And3,
    Between3And6,
    MoreThan6,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::NoExperience,
        ExperienceLevel::Between1And3,
        ExperienceLevel::Between3And6,
        ExperienceLevel::MoreThan6,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ExperienceLevel::NoExperience => "noExperience",
            ExperienceLevel::Between1And3 => "between1And3",
            ExperienceLevel::Between3And6 => "between3And6",
            ExperienceLevel::MoreThan6 => "moreThan6",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::NoExperience => "No experience",
            ExperienceLevel::Between1And3 => "1 to 3 years",
            ExperienceLevel::Between3And6 => "3 to 6 years",
            ExperienceLevel::MoreThan6 => "More than 6 years",
        }
    }

    /// 接受代碼或顯示名稱
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.code() == value || level.label().eq_ignore_ascii_case(value))
    }
}

/// 薪資區間，由所屬的 VacancyRecord 獨佔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub from: i64,
    pub to: i64,
    pub currency: String,
    /// 正規化時從匯率表解析出的匯率
    pub rate: f64,
    pub gross: Option<bool>,
}

impl SalaryRange {
    /// floor((from + to) * rate / 2)，先加總再乘匯率，最後才取整
    pub fn average_in_base_currency(&self) -> i64 {
        (self.sum_as_f64() * self.rate / 2.0).floor() as i64
    }

    /// 未取整的基準貨幣中位數，供排序使用
    pub fn midpoint_in_base_currency(&self) -> f64 {
        self.sum_as_f64() / 2.0 * self.rate
    }

    // 以浮點數加總，避免極大金額的 i64 溢位
    fn sum_as_f64(&self) -> f64 {
        self.from as f64 + self.to as f64
    }

    /// 數值是否落在區間內 (含端點)
    pub fn contains(&self, amount: i64) -> bool {
        self.from <= amount && amount <= self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyRecord {
    pub name: String,
    pub salary: SalaryRange,
    pub published_year: i32,
    pub published_at: String,
    pub city: String,
    pub description: Option<FieldValue>,
    pub skills: Option<FieldValue>,
    pub experience: Option<ExperienceLevel>,
    pub premium: Option<bool>,
    pub employer: Option<String>,
}

/// 年度統計 (平均薪資與職缺數)，依年份首次出現順序排列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearStatistics {
    pub salary_by_year: Vec<(i32, i64)>,
    pub count_by_year: Vec<(i32, u64)>,
}

impl YearStatistics {
    pub fn salary_for(&self, year: i32) -> Option<i64> {
        self.salary_by_year
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, salary)| *salary)
    }

    pub fn count_for(&self, year: i32) -> Option<u64> {
        self.count_by_year
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, count)| *count)
    }

    pub fn years(&self) -> Vec<i32> {
        self.salary_by_year.iter().map(|(year, _)| *year).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySalary {
    pub city: String,
    pub average_salary: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityShare {
    pub city: String,
    /// 四位小數四捨五入的比例
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRanking {
    pub by_salary: Vec<CitySalary>,
    pub by_share: Vec<CityShare>,
}

/// 交給報表層的完整統計結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub profession: String,
    pub total_vacancies: u64,
    pub overall: YearStatistics,
    pub profession_scoped: YearStatistics,
    pub cities: CityRanking,
}

/// 讀取過程的計數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounters {
    pub read: u64,
    pub incomplete: u64,
    pub rejected: u64,
    pub admitted: u64,
}

/// Pipeline 轉換結果
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub report: StatisticsReport,
    pub counters: RowCounters,
}
