//! 報表呈現層：純文字摘要、CSV 表格與職缺清單

pub mod table;

use crate::domain::model::{StatisticsReport, YearStatistics};
use crate::utils::error::{Result, StatsError};

/// 百分比字串：乘 100 後截斷 (不四捨五入) 到小數兩位
pub fn format_share_percent(share: f64) -> String {
    let hundredths = (share * 10000.0).floor() / 100.0;
    format!("{:.2}%", hundredths)
}

/// 每三位數以空白分隔
pub fn group_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn format_pairs<V: std::fmt::Display>(pairs: impl Iterator<Item = (String, V)>) -> String {
    let body: Vec<String> = pairs.map(|(k, v)| format!("{}: {}", k, v)).collect();
    format!("{{{}}}", body.join(", "))
}

/// 依序輸出六組統計
pub fn render_summary(report: &StatisticsReport) -> String {
    let overall = &report.overall;
    let scoped = &report.profession_scoped;
    let year_key = |year: &i32| year.to_string();

    let lines = [
        format!(
            "Salary by year: {}",
            format_pairs(overall.salary_by_year.iter().map(|(y, v)| (year_key(y), v)))
        ),
        format!(
            "Vacancies by year: {}",
            format_pairs(overall.count_by_year.iter().map(|(y, v)| (year_key(y), v)))
        ),
        format!(
            "Salary by year for '{}': {}",
            report.profession,
            format_pairs(scoped.salary_by_year.iter().map(|(y, v)| (year_key(y), v)))
        ),
        format!(
            "Vacancies by year for '{}': {}",
            report.profession,
            format_pairs(scoped.count_by_year.iter().map(|(y, v)| (year_key(y), v)))
        ),
        format!(
            "Salary by city (descending): {}",
            format_pairs(
                report
                    .cities
                    .by_salary
                    .iter()
                    .map(|c| (format!("'{}'", c.city), c.average_salary))
            )
        ),
        format!(
            "Vacancy share by city (descending): {}",
            format_pairs(
                report
                    .cities
                    .by_share
                    .iter()
                    .map(|c| (format!("'{}'", c.city), c.share))
            )
        ),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// 年度表：所有年份 × (整體平均、職業平均、整體筆數、職業筆數)；職業缺年份填 0
pub fn render_years_csv(report: &StatisticsReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let scoped: &YearStatistics = &report.profession_scoped;

    writer.write_record([
        "year".to_string(),
        "average_salary".to_string(),
        format!("average_salary - {}", report.profession),
        "vacancies".to_string(),
        format!("vacancies - {}", report.profession),
    ])?;

    for (year, salary) in &report.overall.salary_by_year {
        writer.write_record([
            year.to_string(),
            salary.to_string(),
            scoped.salary_for(*year).unwrap_or(0).to_string(),
            report.overall.count_for(*year).unwrap_or(0).to_string(),
            scoped.count_for(*year).unwrap_or(0).to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| StatsError::IoError(e.into_error()))
}

/// 城市表：左側薪資排名，右側比例排名
pub fn render_cities_csv(report: &StatisticsReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["city", "average_salary", "", "city", "share"])?;

    let by_salary = &report.cities.by_salary;
    let by_share = &report.cities.by_share;
    for i in 0..by_salary.len().max(by_share.len()) {
        let (salary_city, salary) = by_salary
            .get(i)
            .map(|c| (c.city.clone(), c.average_salary.to_string()))
            .unwrap_or_default();
        let (share_city, share) = by_share
            .get(i)
            .map(|c| (c.city.clone(), format_share_percent(c.share)))
            .unwrap_or_default();

        writer.write_record([salary_city, salary, String::new(), share_city, share])?;
    }

    writer
        .into_inner()
        .map_err(|e| StatsError::IoError(e.into_error()))
}
