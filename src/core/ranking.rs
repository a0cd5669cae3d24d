use crate::core::aggregator::CityAggregate;
use crate::domain::model::{CityRanking, CitySalary, CityShare};

pub const DEFAULT_TOP_N: usize = 10;

/// 四位小數，與十進位格式化的進位規則一致
pub fn round_share(ratio: f64) -> f64 {
    format!("{:.4}", ratio).parse().unwrap_or(ratio)
}

/// 城市排名：先以 1% 門檻篩出有效城市，再各自取前 N 名
#[derive(Debug, Clone, Copy)]
pub struct RankingSelector {
    top_n: usize,
}

impl RankingSelector {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// floor(N / 100)
    pub fn threshold(total: u64) -> u64 {
        total / 100
    }

    /// 筆數達門檻的城市，保留輸入順序
    pub fn significant<'a>(cities: &'a [CityAggregate], total: u64) -> Vec<&'a CityAggregate> {
        let threshold = Self::threshold(total);
        cities.iter().filter(|c| c.count >= threshold).collect()
    }

    pub fn by_salary(&self, cities: &[CityAggregate], total: u64) -> Vec<CitySalary> {
        let mut eligible = Self::significant(cities, total);
        // sort_by 為穩定排序，同值依輸入順序
        eligible.sort_by(|a, b| b.average_salary.cmp(&a.average_salary));

        eligible
            .into_iter()
            .take(self.top_n)
            .map(|c| CitySalary {
                city: c.city.clone(),
                average_salary: c.average_salary,
            })
            .collect()
    }

    pub fn by_share(&self, cities: &[CityAggregate], total: u64) -> Vec<CityShare> {
        if total == 0 {
            return Vec::new();
        }

        let mut eligible = Self::significant(cities, total);
        // 分母相同，依筆數排序即依比例排序
        eligible.sort_by(|a, b| b.count.cmp(&a.count));

        eligible
            .into_iter()
            .take(self.top_n)
            .map(|c| CityShare {
                city: c.city.clone(),
                share: round_share(c.count as f64 / total as f64),
            })
            .collect()
    }

    pub fn select(&self, cities: &[CityAggregate], total: u64) -> CityRanking {
        let ranking = CityRanking {
            by_salary: self.by_salary(cities, total),
            by_share: self.by_share(cities, total),
        };

        tracing::debug!(
            "Ranked cities (threshold {}): {} by salary, {} by share",
            Self::threshold(total),
            ranking.by_salary.len(),
            ranking.by_share.len()
        );

        ranking
    }
}

impl Default for RankingSelector {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, average_salary: i64, count: u64) -> CityAggregate {
        CityAggregate {
            city: name.to_string(),
            average_salary,
            count,
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let cities = vec![city("Big", 100, 981), city("Edge", 50, 10), city("Small", 900, 9)];
        let total = 1000;

        assert_eq!(RankingSelector::threshold(total), 10);
        let names: Vec<_> = RankingSelector::significant(&cities, total)
            .into_iter()
            .map(|c| c.city.as_str())
            .collect();
        assert_eq!(names, vec!["Big", "Edge"]);

        let ranking = RankingSelector::default().select(&cities, total);
        assert!(ranking.by_salary.iter().all(|c| c.city != "Small"));
        assert!(ranking.by_share.iter().all(|c| c.city != "Small"));
    }

    #[test]
    fn test_salary_ranking_sorted_and_truncated() {
        let cities: Vec<_> = (0..15)
            .map(|i| city(&format!("City{}", i), i * 10, 10))
            .collect();
        let ranking = RankingSelector::default().by_salary(&cities, 150);

        assert_eq!(ranking.len(), 10);
        assert_eq!(ranking[0].city, "City14");
        assert_eq!(ranking[9].city, "City5");
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let cities = vec![city("First", 100, 5), city("Second", 100, 5), city("Third", 200, 1)];
        let selector = RankingSelector::default();

        let by_salary = selector.by_salary(&cities, 11);
        let names: Vec<_> = by_salary.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["Third", "First", "Second"]);

        let by_share = selector.by_share(&cities, 11);
        let names: Vec<_> = by_share.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_rankings_are_independent() {
        let mut cities: Vec<_> = (0..10)
            .map(|i| city(&format!("Busy{}", i), 100, 100))
            .collect();
        cities.push(city("Rich", 1_000_000, 10));

        let ranking = RankingSelector::default().select(&cities, 1010);
        assert_eq!(ranking.by_salary[0].city, "Rich");
        assert!(ranking.by_share.iter().all(|c| c.city != "Rich"));
    }

    #[test]
    fn test_fewer_than_top_n() {
        let cities = vec![city("A", 1, 1), city("B", 2, 2)];
        let ranking = RankingSelector::default().select(&cities, 3);
        assert_eq!(ranking.by_salary.len(), 2);
        assert_eq!(ranking.by_share.len(), 2);
        assert_eq!(ranking.by_share[0].city, "B");
        assert_eq!(ranking.by_share[0].share, 0.6667);
        assert_eq!(ranking.by_share[1].share, 0.3333);
    }

    #[test]
    fn test_round_share() {
        assert_eq!(round_share(0.12346), 0.1235);
        assert_eq!(round_share(0.5), 0.5);
    }
}
