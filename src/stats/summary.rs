//! Summary Statistics Module
//! Label/number cards shown above the Home tab charts.

use crate::charts::ChartFactory;
use crate::config::DashboardConfig;
use crate::data::{Aggregator, DataError, MonthlySums, SampleData};
use statrs::statistics::Statistics;

/// A single label/number card.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

impl StatCard {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Computes the stat card row once from the sample data.
pub struct SummaryCalculator;

impl SummaryCalculator {
    /// Month with the highest summed reading.
    pub fn peak_month(monthly: &MonthlySums) -> Option<(i32, f64)> {
        if monthly.is_empty() {
            return None;
        }
        monthly
            .months
            .iter()
            .copied()
            .zip(monthly.sums.iter().copied())
            .fold(None, |best, (m, s)| match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((m, s)),
            })
    }

    pub fn compute(data: &SampleData, config: &DashboardConfig) -> Result<Vec<StatCard>, DataError> {
        let readings = data.table.readings()?;
        if readings.is_empty() {
            return Err(DataError::EmptyTable);
        }
        let monthly = Aggregator::monthly_sums(&data.table)?;

        let total: f64 = readings.iter().sum();
        let mean = readings.iter().mean();
        let std = if readings.len() > 1 {
            readings.iter().std_dev()
        } else {
            0.0
        };

        let warnings = ChartFactory::gps_warnings(data.coordinates.len(), config.chart_seed);
        let warning_count = warnings.red.len() + warnings.yellow.len();

        let mut cards = vec![
            StatCard::new("Total Energy", format!("{:.0} kW", total)),
            StatCard::new("Mean Reading", format!("{:.1} kW", mean)),
            StatCard::new("Std Deviation", format!("{:.1} kW", std)),
        ];
        if let Some((month, sum)) = Self::peak_month(&monthly) {
            cards.push(StatCard::new(
                "Peak Month",
                format!("Month {} ({:.0} kW)", month, sum),
            ));
        }
        cards.push(StatCard::new(
            "Turbines in Warning",
            format!("{} / {}", warning_count, data.coordinates.len()),
        ));

        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{month_end_dates, PowerTable};

    #[test]
    fn peak_month_picks_largest_sum() {
        let monthly = MonthlySums {
            months: vec![1, 2, 3],
            sums: vec![5.0, 9.0, 7.0],
        };
        assert_eq!(SummaryCalculator::peak_month(&monthly), Some((2, 9.0)));
        assert_eq!(
            SummaryCalculator::peak_month(&MonthlySums {
                months: vec![],
                sums: vec![]
            }),
            None
        );
    }

    #[test]
    fn cards_summarize_readings() {
        let dates = month_end_dates(2020, 1, 4).unwrap();
        let table = PowerTable::from_readings(&dates, &[10.0, 20.0, 30.0, 40.0]).unwrap();
        let data = SampleData {
            table,
            coordinates: vec![(0.0, 0.0); 20],
        };

        let cards = SummaryCalculator::compute(&data, &DashboardConfig::default()).unwrap();
        let value = |label: &str| {
            cards
                .iter()
                .find(|c| c.label == label)
                .map(|c| c.value.clone())
                .unwrap()
        };

        assert_eq!(value("Total Energy"), "100 kW");
        assert_eq!(value("Mean Reading"), "25.0 kW");
        assert_eq!(value("Std Deviation"), "12.9 kW");
        assert_eq!(value("Peak Month"), "Month 4 (40 kW)");
        assert_eq!(value("Turbines in Warning"), "2 / 20");
    }
}
