//! Data module - sample table generation and aggregation

mod aggregate;
mod sample;

pub use aggregate::{Aggregator, CumulativePower, MonthlySums, YearMonthSums};
pub use sample::{month_end_dates, DataError, PowerTable, SampleData};
