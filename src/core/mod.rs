pub mod aggregator;
pub mod catalog;
pub mod currency;
pub mod etl;
pub mod normalizer;
pub mod partition;
pub mod pipeline;
pub mod ranking;

pub use crate::domain::model::{TransformResult, VacancyRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
