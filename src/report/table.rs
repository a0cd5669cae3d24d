use crate::core::catalog::published_date;
use crate::core::currency::CurrencyTable;
use crate::domain::model::{FieldValue, VacancyRecord};
use crate::report::group_thousands;
use tabled::builder::Builder;
use tabled::settings::Style;

pub const MAX_CELL_CHARS: usize = 100;
pub const NOTHING_FOUND: &str = "Nothing found";

/// 表格欄位 (依顯示順序)
pub const COLUMNS: [&str; 10] = [
    "#",
    "Name",
    "Description",
    "Skills",
    "Experience",
    "Premium",
    "Employer",
    "Salary",
    "City",
    "Published",
];

/// 超過 100 字元時截斷並加上 "..."
pub fn truncate_cell(value: &str) -> String {
    if value.chars().count() > MAX_CELL_CHARS {
        let head: String = value.chars().take(MAX_CELL_CHARS).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

pub fn format_salary(record: &VacancyRecord, currencies: &CurrencyTable) -> String {
    let salary = &record.salary;
    let mut text = format!(
        "{} - {} ({})",
        group_thousands(salary.from),
        group_thousands(salary.to),
        currencies.label(&salary.currency)
    );

    match salary.gross {
        Some(true) => text.push_str(" (Before tax)"),
        Some(false) => text.push_str(" (After tax)"),
        None => {}
    }

    text
}

/// YYYY-MM-DD... -> DD.MM.YYYY
pub fn format_published_date(published_at: &str) -> String {
    published_date(published_at)
        .map(|date| date.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| published_at.to_string())
}

fn optional_text(value: &Option<FieldValue>) -> String {
    value.as_ref().map(FieldValue::joined).unwrap_or_default()
}

fn cells(index: usize, record: &VacancyRecord, currencies: &CurrencyTable) -> Vec<String> {
    let premium = match record.premium {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "",
    };

    vec![
        index.to_string(),
        record.name.clone(),
        optional_text(&record.description),
        optional_text(&record.skills),
        record
            .experience
            .map(|level| level.label().to_string())
            .unwrap_or_default(),
        premium.to_string(),
        record.employer.clone().unwrap_or_default(),
        format_salary(record, currencies),
        record.city.clone(),
        format_published_date(&record.published_at),
    ]
    .into_iter()
    .map(|cell| truncate_cell(&cell))
    .collect()
}

/// 顯示範圍：從第 start 筆到第 end 筆之前 (1 起算)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowWindow {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl RowWindow {
    /// "" / "3" / "3 7"
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split_whitespace().filter_map(|p| p.parse::<usize>().ok());
        Self {
            start: parts.next(),
            end: parts.next(),
        }
    }

    fn bounds(&self, total: usize) -> (usize, usize) {
        let start = self.start.unwrap_or(1).max(1) - 1;
        let end = self.end.map(|e| e.saturating_sub(1)).unwrap_or(total).min(total);
        (start, end)
    }
}

/// 以純文字表格列出職缺；`fields` 為空時輸出所有欄位
pub fn render_table(
    records: &[VacancyRecord],
    currencies: &CurrencyTable,
    window: RowWindow,
    fields: &[String],
) -> String {
    let (start, end) = window.bounds(records.len());
    if start >= end {
        return NOTHING_FOUND.to_string();
    }

    let selected: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .filter(|(i, name)| *i == 0 || fields.is_empty() || fields.iter().any(|f| f == *name))
        .map(|(i, _)| i)
        .collect();

    let rows: Vec<Vec<String>> = records[start..end]
        .iter()
        .enumerate()
        .map(|(offset, record)| {
            let all = cells(start + offset + 1, record, currencies);
            selected.iter().map(|&i| all[i].clone()).collect()
        })
        .collect();
    let header: Vec<String> = selected.iter().map(|&i| COLUMNS[i].to_string()).collect();

    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    table.to_string()
}
