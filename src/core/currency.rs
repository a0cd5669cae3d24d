use crate::utils::error::{Result, StatsError};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// 基準貨幣 (盧布) 代碼
pub const BASE_CURRENCY: &str = "RUR";

const STANDARD_RATES: [(&str, f64, &str); 10] = [
    ("AZN", 35.68, "Manats"),
    ("BYR", 23.91, "Belarusian rubles"),
    ("EUR", 59.90, "Euros"),
    ("GEL", 21.74, "Georgian lari"),
    ("KGS", 0.76, "Kyrgyz som"),
    ("KZT", 0.13, "Tenge"),
    ("RUR", 1.0, "Rubles"),
    ("UAH", 1.64, "Hryvnias"),
    ("USD", 60.66, "Dollars"),
    ("UZS", 0.0055, "Uzbek sum"),
];

static STANDARD: Lazy<CurrencyTable> = Lazy::new(|| {
    CurrencyTable::from_entries(
        STANDARD_RATES
            .iter()
            .map(|(code, rate, label)| (code.to_string(), *rate, label.to_string())),
    )
});

#[derive(Debug, Clone, PartialEq)]
struct CurrencyEntry {
    rate: f64,
    label: String,
}

/// 貨幣代碼對基準貨幣匯率的唯讀表
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTable {
    entries: HashMap<String, CurrencyEntry>,
}

impl CurrencyTable {
    /// 行程共用的固定匯率表
    pub fn standard() -> &'static CurrencyTable {
        &STANDARD
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, f64, String)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, rate, label)| (code, CurrencyEntry { rate, label }))
                .collect(),
        }
    }

    pub fn rate(&self, code: &str) -> Result<f64> {
        self.entries
            .get(code)
            .map(|entry| entry.rate)
            .ok_or_else(|| StatsError::UnknownCurrency {
                code: code.to_string(),
            })
    }

    /// 顯示名稱，未知代碼回傳代碼本身
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        self.entries
            .get(code)
            .map(|entry| entry.label.as_str())
            .unwrap_or(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        CurrencyTable::standard().clone()
    }
}
