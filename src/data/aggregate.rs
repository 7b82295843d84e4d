//! Aggregation Module
//! Group-by sums and running totals over the power table.

use crate::data::{DataError, PowerTable};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Sum of readings per calendar month, ordered by month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySums {
    pub months: Vec<i32>,
    pub sums: Vec<f64>,
}

impl MonthlySums {
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Sum for one calendar month, if present.
    pub fn get(&self, month: i32) -> Option<f64> {
        self.months
            .iter()
            .position(|&m| m == month)
            .map(|i| self.sums[i])
    }
}

/// Per-year monthly sums, aligned on the union of observed months.
#[derive(Debug, Clone, PartialEq)]
pub struct YearMonthSums {
    /// Months observed in any year, ascending.
    pub months: Vec<i32>,
    /// One series per year (ascending), `None` where the year lacks that month.
    pub series: Vec<(i32, Vec<Option<f64>>)>,
}

/// Running total of readings in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePower {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

/// Fixed-shape aggregations computed once at startup.
pub struct Aggregator;

impl Aggregator {
    /// Group by calendar month and sum readings.
    pub fn monthly_sums(table: &PowerTable) -> Result<MonthlySums, DataError> {
        let out = table
            .dataframe()
            .clone()
            .lazy()
            .group_by([col("month")])
            .agg([col("power").sum()])
            .sort(["month"], SortMultipleOptions::default())
            .collect()?;

        let months = out.column("month")?.i32()?.into_no_null_iter().collect();
        let sums = out
            .column("power")?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        Ok(MonthlySums { months, sums })
    }

    /// Group by (year, month), sum readings and pivot years into series.
    pub fn year_month_sums(table: &PowerTable) -> Result<YearMonthSums, DataError> {
        let out = table
            .dataframe()
            .clone()
            .lazy()
            .group_by([col("year"), col("month")])
            .agg([col("power").sum()])
            .collect()?;

        let years = out.column("year")?.i32()?;
        let months = out.column("month")?.i32()?;
        let sums = out.column("power")?.f64()?;

        let mut by_year: BTreeMap<i32, BTreeMap<i32, f64>> = BTreeMap::new();
        let mut all_months: BTreeSet<i32> = BTreeSet::new();

        for i in 0..out.height() {
            if let (Some(y), Some(m), Some(s)) = (years.get(i), months.get(i), sums.get(i)) {
                by_year.entry(y).or_default().insert(m, s);
                all_months.insert(m);
            }
        }

        let months: Vec<i32> = all_months.into_iter().collect();
        let series = by_year
            .into_iter()
            .map(|(year, sums)| {
                let aligned = months.iter().map(|m| sums.get(m).copied()).collect();
                (year, aligned)
            })
            .collect();

        Ok(YearMonthSums { months, series })
    }

    /// Cumulative sum of readings paired with each row's timestamp.
    pub fn cumulative_power(table: &PowerTable) -> Result<CumulativePower, DataError> {
        if table.is_empty() {
            return Err(DataError::EmptyTable);
        }

        let out = table
            .dataframe()
            .clone()
            .lazy()
            .select([col("power").cum_sum(false).alias("cumulative")])
            .collect()?;

        let values = out
            .column("cumulative")?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();

        Ok(CumulativePower {
            dates: table.timestamps()?,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::month_end_dates;

    fn table(start_year: i32, start_month: u32, readings: &[f64]) -> PowerTable {
        let dates = month_end_dates(start_year, start_month, readings.len()).unwrap();
        PowerTable::from_readings(&dates, readings).unwrap()
    }

    #[test]
    fn monthly_sums_add_readings_per_calendar_month() {
        // Nov 2020 .. Feb 2022: Nov/Dec/Jan/Feb each appear twice.
        let readings: Vec<f64> = (1..=16).map(|v| v as f64).collect();
        let sums = Aggregator::monthly_sums(&table(2020, 11, &readings)).unwrap();

        assert_eq!(sums.months, (1..=12).collect::<Vec<_>>());
        // Nov 2020 = 1, Nov 2021 = 13
        assert_eq!(sums.get(11), Some(14.0));
        // Dec 2020 = 2, Dec 2021 = 14
        assert_eq!(sums.get(12), Some(16.0));
        // Jan 2021 = 3, Jan 2022 = 15
        assert_eq!(sums.get(1), Some(18.0));
        // Mar 2021 only
        assert_eq!(sums.get(3), Some(5.0));
        assert_eq!(sums.sums.iter().sum::<f64>(), readings.iter().sum::<f64>());
    }

    #[test]
    fn year_month_sums_leave_gaps_for_missing_months() {
        let sums = Aggregator::year_month_sums(&table(2020, 11, &[1.0, 2.0, 3.0])).unwrap();

        assert_eq!(sums.months, vec![1, 11, 12]);
        assert_eq!(
            sums.series,
            vec![
                (2020, vec![None, Some(1.0), Some(2.0)]),
                (2021, vec![Some(3.0), None, None]),
            ]
        );
    }

    #[test]
    fn cumulative_sum_is_non_decreasing_for_non_negative_input() {
        let readings = [4.0, 0.0, 2.5, 10.0, 0.1];
        let t = table(2020, 1, &readings);
        let cumulative = Aggregator::cumulative_power(&t).unwrap();

        assert_eq!(cumulative.values, vec![4.0, 4.0, 6.5, 16.5, 16.6]);
        assert!(cumulative.values.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(cumulative.dates, t.timestamps().unwrap());
    }

    #[test]
    fn cumulative_sum_of_empty_table_is_an_error() {
        let t = PowerTable::from_readings(&[], &[]).unwrap();
        assert!(matches!(
            Aggregator::cumulative_power(&t),
            Err(DataError::EmptyTable)
        ));
    }
}
