use crate::core::Pipeline;
use crate::domain::model::{RowCounters, StatisticsReport};
use crate::utils::error::Result;
use std::time::Instant;

/// 一次完整執行的結果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: String,
    pub report: StatisticsReport,
    pub counters: RowCounters,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let started = Instant::now();
        tracing::info!("🚀 Starting vacancy statistics run");

        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} vacancies", records.len());

        let result = self.pipeline.transform(records).await?;
        tracing::info!(
            "Aggregated {} vacancies",
            result.report.total_vacancies
        );

        let report = result.report.clone();
        let counters = result.counters;

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("🏁 Finished in {:?}", started.elapsed());

        Ok(RunOutcome {
            output_path,
            report,
            counters,
        })
    }
}
