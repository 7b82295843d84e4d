//! Stats module - summary figures for the stat card row

mod summary;

pub use summary::{StatCard, SummaryCalculator};
