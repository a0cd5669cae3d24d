use crate::domain::model::{VacancyRecord, YearStatistics};
use crate::utils::error::{Result, StatsError};
use std::collections::HashMap;
use std::hash::Hash;

/// 單一分組的薪資總和與筆數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub salary_sum: i64,
    pub count: u64,
}

impl Tally {
    fn add(&mut self, salary: i64) {
        self.salary_sum = self.salary_sum.saturating_add(salary);
        self.count += 1;
    }

    /// floor(sum / count)，筆數為 0 時無平均
    pub fn average(&self) -> Option<i64> {
        (self.count > 0).then(|| self.salary_sum.div_euclid(self.count as i64))
    }
}

/// 保留首次出現順序的分組計數
#[derive(Debug, Clone)]
pub struct GroupedTally<K> {
    order: Vec<K>,
    tallies: HashMap<K, Tally>,
}

impl<K: Eq + Hash + Clone> GroupedTally<K> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            tallies: HashMap::new(),
        }
    }

    pub fn add(&mut self, key: &K, salary: i64) {
        if !self.tallies.contains_key(key) {
            self.order.push(key.clone());
        }
        self.tallies.entry(key.clone()).or_default().add(salary);
    }

    pub fn get(&self, key: &K) -> Option<&Tally> {
        self.tallies.get(key)
    }

    pub fn keys(&self) -> &[K] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 依首次出現順序列出
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Tally)> {
        self.order
            .iter()
            .filter_map(move |key| self.tallies.get(key).map(|tally| (key, tally)))
    }

    /// 合併另一個分組 (多執行緒分區後的合併步驟)，新鍵接在尾端
    pub fn merge(&mut self, other: &GroupedTally<K>) {
        for (key, tally) in other.iter() {
            if !self.tallies.contains_key(key) {
                self.order.push(key.clone());
            }
            let entry = self.tallies.entry(key.clone()).or_default();
            entry.salary_sum = entry.salary_sum.saturating_add(tally.salary_sum);
            entry.count += tally.count;
        }
    }
}

impl<K: Eq + Hash + Clone> Default for GroupedTally<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearAggregate {
    pub year: i32,
    pub average_salary: i64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityAggregate {
    pub city: String,
    pub average_salary: i64,
    pub count: u64,
}

/// 彙總完成後的唯讀快照
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub total_vacancies: u64,
    pub overall: YearStatistics,
    pub profession_scoped: YearStatistics,
    /// 依城市首次出現順序
    pub cities: Vec<CityAggregate>,
}

/// 單次走訪即完成年度與城市統計
#[derive(Debug, Clone)]
pub struct Aggregator {
    profession: String,
    years: GroupedTally<i32>,
    profession_years: GroupedTally<i32>,
    cities: GroupedTally<String>,
    total: u64,
}

impl Aggregator {
    pub fn new(profession: impl Into<String>) -> Self {
        Self {
            profession: profession.into(),
            years: GroupedTally::new(),
            profession_years: GroupedTally::new(),
            cities: GroupedTally::new(),
            total: 0,
        }
    }

    pub fn profession(&self) -> &str {
        &self.profession
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn add(&mut self, record: &VacancyRecord) {
        let salary = record.salary.average_in_base_currency();

        self.years.add(&record.published_year, salary);
        // 子字串比對，區分大小寫
        if record.name.contains(self.profession.as_str()) {
            self.profession_years.add(&record.published_year, salary);
        }
        self.cities.add(&record.city, salary);
        self.total += 1;
    }

    /// 併入另一個 Aggregator 的部分結果
    pub fn merge(&mut self, other: &Aggregator) {
        self.years.merge(&other.years);
        self.profession_years.merge(&other.profession_years);
        self.cities.merge(&other.cities);
        self.total += other.total;
    }

    pub fn year_aggregates(&self) -> Vec<YearAggregate> {
        finalize_years(&self.years)
    }

    pub fn city_aggregates(&self) -> Vec<CityAggregate> {
        self.cities
            .iter()
            .filter_map(|(city, tally)| {
                tally.average().map(|average_salary| CityAggregate {
                    city: city.clone(),
                    average_salary,
                    count: tally.count,
                })
            })
            .collect()
    }

    pub fn finish(self) -> Result<Aggregates> {
        if self.total == 0 {
            return Err(StatsError::NoData);
        }

        let overall = to_statistics(&finalize_years(&self.years));
        let mut profession_scoped = to_statistics(&finalize_years(&self.profession_years));

        if profession_scoped.salary_by_year.is_empty() {
            // 沒有符合的職缺時，以最新年份補一筆 0
            if let Some(latest) = self.years.keys().iter().max().copied() {
                profession_scoped.salary_by_year.push((latest, 0));
                profession_scoped.count_by_year.push((latest, 0));
            }
        }

        tracing::debug!(
            "Aggregated {} vacancies over {} years and {} cities",
            self.total,
            overall.salary_by_year.len(),
            self.cities.keys().len()
        );

        Ok(Aggregates {
            total_vacancies: self.total,
            overall,
            profession_scoped,
            cities: self.city_aggregates(),
        })
    }
}

fn finalize_years(years: &GroupedTally<i32>) -> Vec<YearAggregate> {
    years
        .iter()
        .filter_map(|(year, tally)| {
            tally.average().map(|average_salary| YearAggregate {
                year: *year,
                average_salary,
                count: tally.count,
            })
        })
        .collect()
}

fn to_statistics(aggregates: &[YearAggregate]) -> YearStatistics {
    YearStatistics {
        salary_by_year: aggregates
            .iter()
            .map(|a| (a.year, a.average_salary))
            .collect(),
        count_by_year: aggregates.iter().map(|a| (a.year, a.count)).collect(),
    }
}
