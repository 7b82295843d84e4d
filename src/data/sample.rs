//! Sample Data Module
//! Builds the synthetic monthly power table and turbine coordinates using Polars.

use crate::config::DashboardConfig;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid start month {year}-{month:02}")]
    InvalidStart { year: i32, month: u32 },
    #[error("Got {dates} timestamps but {readings} readings")]
    LengthMismatch { dates: usize, readings: usize },
    #[error("Power table is empty")]
    EmptyTable,
}

/// Last day of the given month.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Month-end dates starting at the end of `start_month`, one per month.
pub fn month_end_dates(
    start_year: i32,
    start_month: u32,
    periods: usize,
) -> Result<Vec<NaiveDate>, DataError> {
    if !(1..=12).contains(&start_month) {
        return Err(DataError::InvalidStart {
            year: start_year,
            month: start_month,
        });
    }

    let mut dates = Vec::with_capacity(periods);
    let mut year = start_year;
    let mut month = start_month;
    for _ in 0..periods {
        let date = month_end(year, month).ok_or(DataError::InvalidStart {
            year,
            month,
        })?;
        dates.push(date);
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    Ok(dates)
}

/// Days since 1970-01-01, the physical encoding of a Polars `Date`.
fn epoch_days(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

/// Monthly power readings with derived calendar columns.
///
/// Columns: ["timestamp" (Date), "power" (Float64), "month" (Int32), "year" (Int32)]
#[derive(Debug, Clone)]
pub struct PowerTable {
    df: DataFrame,
}

impl PowerTable {
    /// Build the table from explicit timestamps and readings.
    pub fn from_readings(dates: &[NaiveDate], readings: &[f64]) -> Result<Self, DataError> {
        if dates.len() != readings.len() {
            return Err(DataError::LengthMismatch {
                dates: dates.len(),
                readings: readings.len(),
            });
        }

        let days: Vec<i32> = dates.iter().map(|d| epoch_days(*d)).collect();
        let months: Vec<i32> = dates.iter().map(|d| d.month() as i32).collect();
        let years: Vec<i32> = dates.iter().map(|d| d.year()).collect();

        let timestamp = Column::new("timestamp".into(), days).cast(&DataType::Date)?;

        let df = DataFrame::new(vec![
            timestamp,
            Column::new("power".into(), readings.to_vec()),
            Column::new("month".into(), months),
            Column::new("year".into(), years),
        ])?;

        Ok(Self { df })
    }

    /// Generate `periods` uniform readings in [0, 100).
    pub fn generate(config: &DashboardConfig, rng: &mut StdRng) -> Result<Self, DataError> {
        let dates = month_end_dates(config.start_year, config.start_month, config.periods)?;
        let readings: Vec<f64> = (0..dates.len())
            .map(|_| rng.gen::<f64>() * 100.0)
            .collect();
        Self::from_readings(&dates, &readings)
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Power readings in row order.
    pub fn readings(&self) -> Result<Vec<f64>, DataError> {
        Ok(self
            .df
            .column("power")?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Timestamps in row order.
    pub fn timestamps(&self) -> Result<Vec<NaiveDate>, DataError> {
        let days = self.df.column("timestamp")?.cast(&DataType::Int32)?;
        let epoch = NaiveDate::default();
        Ok(days
            .i32()?
            .into_iter()
            .flatten()
            .map(|d| epoch + chrono::Duration::days(d as i64))
            .collect())
    }
}

/// Everything the charts are built from, generated once at startup.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub table: PowerTable,
    /// (longitude, latitude) pairs.
    pub coordinates: Vec<(f64, f64)>,
}

impl SampleData {
    pub fn generate(config: &DashboardConfig) -> Result<Self, DataError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let table = PowerTable::generate(config, &mut rng)?;
        let coordinates = (0..config.coordinate_count)
            .map(|_| (rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)))
            .collect();

        tracing::info!(
            rows = table.height(),
            coordinates = config.coordinate_count,
            seeded = config.seed.is_some(),
            "Generated sample data"
        );

        Ok(Self { table, coordinates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_end_dates_roll_over_years() {
        let dates = month_end_dates(2020, 11, 4).unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2020, 11, 30).unwrap(),
                NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2021, 2, 28).unwrap(),
            ]
        );
    }

    #[test]
    fn default_range_covers_hundred_months() {
        let dates = month_end_dates(2020, 1, 100).unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2020, 1, 31).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(dates[99], NaiveDate::from_ymd_opt(2028, 4, 30).unwrap());
    }

    #[test]
    fn rejects_invalid_start_month() {
        assert!(matches!(
            month_end_dates(2020, 0, 3),
            Err(DataError::InvalidStart { .. })
        ));
    }

    #[test]
    fn table_round_trips_timestamps_and_derives_calendar_columns() {
        let dates = month_end_dates(2021, 12, 2).unwrap();
        let table = PowerTable::from_readings(&dates, &[1.5, 2.5]).unwrap();

        assert_eq!(table.timestamps().unwrap(), dates);
        assert_eq!(table.readings().unwrap(), vec![1.5, 2.5]);

        let df = table.dataframe();
        let months: Vec<i32> = df.column("month").unwrap().i32().unwrap().into_no_null_iter().collect();
        let years: Vec<i32> = df.column("year").unwrap().i32().unwrap().into_no_null_iter().collect();
        assert_eq!(months, vec![12, 1]);
        assert_eq!(years, vec![2021, 2022]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let dates = month_end_dates(2020, 1, 3).unwrap();
        assert!(matches!(
            PowerTable::from_readings(&dates, &[1.0]),
            Err(DataError::LengthMismatch { dates: 3, readings: 1 })
        ));
    }

    #[test]
    fn seeded_generation_is_reproducible_and_in_range() {
        let config = DashboardConfig {
            seed: Some(3),
            ..Default::default()
        };
        let a = SampleData::generate(&config).unwrap();
        let b = SampleData::generate(&config).unwrap();

        let readings = a.table.readings().unwrap();
        assert_eq!(readings, b.table.readings().unwrap());
        assert_eq!(readings.len(), 100);
        assert!(readings.iter().all(|v| (0.0..100.0).contains(v)));

        assert_eq!(a.coordinates.len(), 100);
        assert!(a
            .coordinates
            .iter()
            .all(|(lon, lat)| (-180.0..180.0).contains(lon) && (-90.0..90.0).contains(lat)));
    }
}
