//! Cleaning and resampling of irregular time series.
//!
//! A [`Series`] holds timestamped [`Measurement`]s. Outlier rejection
//! (fixed bounds, percentile and z-score fences, Peirce's criterion) splits
//! a series into kept and rejected parts without touching the receiver, and
//! [`Series::regularize`] condenses records onto a fixed grid, marking gaps
//! with Missing sentinels.

pub mod data;
pub mod error;
pub mod processing;
pub mod state;

pub use error::{Result, SeriesError};
pub use processing::partition::{merge, Partition};
pub use processing::primitives;
pub use processing::regularize::{Aggregation, PeriodUnit, RegularizeParams};
pub use processing::statistics::SummaryStats;
pub use state::config::{OutlierMethod, PipelineConfig, PipelineOutput};
pub use state::container::SeriesContainer;
pub use state::measurement::{Measurement, Status};
pub use state::series::Series;
