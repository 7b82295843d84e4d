//! Chart Factory Module
//! One function per dashboard chart, each turning prepared data into a `Figure`.

use crate::charts::color::{adjust_color_lightness, Rgb, BLUE, GREEN, RED, YELLOW};
use crate::charts::figure::{
    BarMode, Dash, Figure, FigureId, HLine, LabelPosition, Orientation, Projection, Tick, Trace,
};
use crate::config::DashboardConfig;
use crate::data::{Aggregator, CumulativePower, DataError, MonthlySums, SampleData, YearMonthSums};
use chrono::NaiveDate;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;
use std::collections::BTreeMap;

const TURBINE_MODELS: [&str; 4] = ["V47-0.66", "GE1.5-82.5", "Z50", "V117-4.3"];
const FAILURE_DURATIONS: [f64; 4] = [0.8, 2.3, 2.4, 4.8];

/// Quarterly categories, bottom to top.
const QUARTERLY_CATEGORIES: [&str; 3] = ["Profit/loss", "Unexpected failures", "Up time"];
const QUARTERLY_VALUES: [f64; 3] = [1.3, 0.6, 0.8];
const QUARTERLY_GOOD_INCREASE: [bool; 3] = [true, false, true];

/// One in ten turbines is flagged as a warning on the GPS chart.
const WARNING_DIVISOR: usize = 10;
/// Number of warnings shown red; the remainder are yellow.
const RED_WARNINGS: usize = 3;

const BEARING_POINTS: usize = 10;

/// Which turbines are in a warning state.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsWarnings {
    pub red: Vec<usize>,
    pub yellow: Vec<usize>,
}

/// All charts built once at startup.
#[derive(Debug, Clone, Default)]
pub struct FigureSet {
    figures: BTreeMap<FigureId, Figure>,
}

impl FigureSet {
    pub fn insert(&mut self, figure: Figure) {
        self.figures.insert(figure.id, figure);
    }

    pub fn get(&self, id: FigureId) -> Option<&Figure> {
        self.figures.get(&id)
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Figure> {
        self.figures.values()
    }
}

fn month_labels(months: &[i32]) -> Vec<String> {
    months.iter().map(|m| format!("Month {}", m)).collect()
}

fn days_since_epoch(date: NaiveDate) -> f64 {
    date.signed_duration_since(NaiveDate::default()).num_days() as f64
}

/// Builds the declarative figures for every dashboard chart.
pub struct ChartFactory;

impl ChartFactory {
    /// Build every chart from the sample data.
    pub fn build_all(data: &SampleData, config: &DashboardConfig) -> Result<FigureSet, DataError> {
        let monthly = Aggregator::monthly_sums(&data.table)?;
        let year_month = Aggregator::year_month_sums(&data.table)?;
        let cumulative = Aggregator::cumulative_power(&data.table)?;

        let mut set = FigureSet::default();
        set.insert(Self::create_monthly_power_plot(&monthly));
        set.insert(Self::create_noise_difference_plot(
            &monthly,
            config.noise_std,
            config.chart_seed,
        ));
        set.insert(Self::create_gps_plot(&data.coordinates, config.chart_seed));
        set.insert(Self::create_quarterly_summary_plot());
        set.insert(Self::create_failure_model_plot());
        set.insert(Self::create_time_series_plot(
            &cumulative,
            config.threshold,
            config.next_hundred,
        ));
        set.insert(Self::create_stacked_bar_plot(&year_month));
        set.insert(Self::create_bearing_health_plot("pred", config.chart_seed));

        for figure in set.iter() {
            tracing::debug!(figure = figure.id.slug(), traces = figure.traces.len(), "Built figure");
        }
        tracing::info!(count = set.len(), "Built dashboard figures");

        Ok(set)
    }

    pub fn create_monthly_power_plot(monthly: &MonthlySums) -> Figure {
        let labels = month_labels(&monthly.months);
        let mut fig = Figure::new(
            FigureId::MonthlyPower,
            "Monthly Sum of LV ActivePower",
            "Month",
            "LV ActivePower (kW)",
        );
        fig.categories = labels.clone();
        fig.traces.push(Trace::Bar {
            name: "LV ActivePower".to_string(),
            categories: labels,
            values: monthly.sums.clone(),
            base: 0.0,
            colors: vec![Rgb::palette(0); monthly.len()],
            orientation: Orientation::Vertical,
        });
        fig
    }

    /// Bar color for a year-over-year difference.
    pub fn difference_color(difference: f64) -> Rgb {
        if difference > 0.0 {
            GREEN
        } else {
            RED
        }
    }

    /// Simulated second year = first year plus Gaussian noise; plots the difference.
    pub fn create_noise_difference_plot(monthly: &MonthlySums, noise_std: f64, seed: u64) -> Figure {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise: Vec<f64> = match Normal::new(0.0, noise_std) {
            Ok(normal) => (0..monthly.len()).map(|_| normal.sample(&mut rng)).collect(),
            Err(e) => {
                tracing::warn!(noise_std, error = ?e, "Invalid noise distribution, using zero noise");
                vec![0.0; monthly.len()]
            }
        };

        let differences: Vec<f64> = monthly
            .sums
            .iter()
            .zip(&noise)
            .map(|(first, n)| (first + n) - first)
            .collect();
        let colors = differences
            .iter()
            .map(|&d| Self::difference_color(d))
            .collect();

        let labels = month_labels(&monthly.months);
        let mut fig = Figure::new(
            FigureId::NoiseDifference,
            "Difference Between Year 2 and Year 1 (with Noise)",
            "Month",
            "Difference in LV ActivePower (kW)",
        );
        fig.categories = labels.clone();
        fig.traces.push(Trace::Bar {
            name: "Difference".to_string(),
            categories: labels,
            values: differences,
            base: 0.0,
            colors,
            orientation: Orientation::Vertical,
        });
        fig
    }

    /// Pick 10% of turbines as warnings; the first three are red, the rest yellow.
    pub fn gps_warnings(n_points: usize, seed: u64) -> GpsWarnings {
        let mut rng = StdRng::seed_from_u64(seed);
        let amount = n_points / WARNING_DIVISOR;
        let picked = rand::seq::index::sample(&mut rng, n_points, amount).into_vec();
        let split = RED_WARNINGS.min(picked.len());
        GpsWarnings {
            red: picked[..split].to_vec(),
            yellow: picked[split..].to_vec(),
        }
    }

    /// Min/max padded by 10% of the span on each side.
    pub fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
        let pad = (max - min) * 0.1;
        Some((min - pad, max + pad))
    }

    /// Turbine locations; only yellow warnings are plotted.
    /// Points sit on a bare Mercator-projected grid with no basemap.
    pub fn create_gps_plot(coordinates: &[(f64, f64)], seed: u64) -> Figure {
        let warnings = Self::gps_warnings(coordinates.len(), seed);

        let mut base_colors = vec![GREEN; coordinates.len()];
        for &i in &warnings.red {
            base_colors[i] = RED;
        }
        for &i in &warnings.yellow {
            base_colors[i] = YELLOW;
        }

        let shade = |base: Rgb, amount: f64| {
            adjust_color_lightness(&base.to_string(), amount)
                .parse()
                .unwrap_or(base)
        };

        let mut lon = Vec::new();
        let mut lat = Vec::new();
        let mut fill = Vec::new();
        let mut outline = Vec::new();
        for (&(x, y), &base) in coordinates.iter().zip(&base_colors) {
            if base == YELLOW {
                lon.push(x);
                lat.push(y);
                fill.push(shade(base, 1.5));
                outline.push(shade(base, 0.6));
            }
        }

        let mut fig = Figure::new(
            FigureId::Gps,
            "GPS Coordinates Visualization",
            "Longitude",
            "Latitude",
        );
        fig.x_range = Self::padded_range(coordinates.iter().map(|c| c.0));
        fig.y_range = Self::padded_range(coordinates.iter().map(|c| c.1));
        fig.projection = Projection::Mercator;
        fig.traces.push(Trace::GeoScatter {
            name: "Warnings".to_string(),
            lon,
            lat,
            fill,
            outline,
            size: 7.0,
        });
        fig
    }

    /// Multiplicative changes on a log2 scale: 1.0 maps to 0.
    pub fn log_changes(values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| v.log2()).collect()
    }

    /// Green when the change moves in the good direction.
    pub fn change_color(log_value: f64, good_increase: bool) -> Rgb {
        if (log_value > 0.0 && good_increase) || (log_value < 0.0 && !good_increase) {
            GREEN
        } else {
            RED
        }
    }

    pub fn create_quarterly_summary_plot() -> Figure {
        let log_values = Self::log_changes(&QUARTERLY_VALUES);

        let mut fig = Figure::new(
            FigureId::QuarterlySummary,
            "Quarterly Summary of Changes",
            "Change Scale (Log Scale)",
            "Categories",
        );
        fig.categories = QUARTERLY_CATEGORIES.iter().map(|c| c.to_string()).collect();

        for ((category, &value), &good) in QUARTERLY_CATEGORIES
            .iter()
            .zip(&log_values)
            .zip(&QUARTERLY_GOOD_INCREASE)
        {
            fig.traces.push(Trace::Bar {
                name: category.to_string(),
                categories: vec![category.to_string()],
                values: vec![value],
                base: 0.0,
                colors: vec![Self::change_color(value, good)],
                orientation: Orientation::Horizontal,
            });
        }

        fig.x_ticks = [(0.5, "Half"), (1.0, "No Change"), (2.0, "Double")]
            .iter()
            .map(|&(v, label)| Tick {
                value: f64::log2(v),
                label: label.to_string(),
            })
            .collect();
        fig.x_range = Some((f64::log2(0.5), f64::log2(2.0)));
        fig
    }

    pub fn create_failure_model_plot() -> Figure {
        let mut fig = Figure::new(
            FigureId::FailureModel,
            "Failure Model Durations",
            "Duration (hours)",
            "Models",
        );
        fig.categories = TURBINE_MODELS.iter().map(|m| m.to_string()).collect();
        for (model, &duration) in TURBINE_MODELS.iter().zip(&FAILURE_DURATIONS) {
            fig.traces.push(Trace::Bar {
                name: model.to_string(),
                categories: vec![model.to_string()],
                values: vec![duration],
                base: 0.0,
                colors: vec![BLUE],
                orientation: Orientation::Horizontal,
            });
        }
        fig
    }

    pub fn create_time_series_plot(
        cumulative: &CumulativePower,
        threshold: f64,
        next_hundred: f64,
    ) -> Figure {
        let mut fig = Figure::new(
            FigureId::TimeSeries,
            "Cumulative Active Power Over Time",
            "Date/Time",
            "Cumulative Active Power (kW)",
        );
        fig.x_is_date = true;
        fig.traces.push(Trace::Line {
            name: "Active Power".to_string(),
            x: cumulative.dates.iter().map(|d| days_since_epoch(*d)).collect(),
            y: cumulative.values.clone(),
            markers: false,
            color: None,
        });
        fig.h_lines = vec![
            HLine {
                y: threshold,
                color: RED,
                dash: Dash::Dot,
                label: "Threshold".to_string(),
                label_position: LabelPosition::BottomRight,
            },
            HLine {
                y: next_hundred,
                color: GREEN,
                dash: Dash::Dot,
                label: "Next Hundred".to_string(),
                label_position: LabelPosition::TopRight,
            },
        ];
        fig
    }

    /// Monthly totals per year, stacked.
    pub fn create_stacked_bar_plot(year_month: &YearMonthSums) -> Figure {
        let labels: Vec<String> = year_month
            .months
            .iter()
            .map(|m| format!("{:02}", m))
            .collect();

        let mut fig = Figure::new(
            FigureId::StackedBar,
            "Monthly Active Power Comparison",
            "Month",
            "Active Power (kW)",
        );
        fig.categories = labels.clone();
        fig.bar_mode = BarMode::Stack;

        for (i, (year, sums)) in year_month.series.iter().enumerate() {
            let (categories, values): (Vec<String>, Vec<f64>) = labels
                .iter()
                .zip(sums)
                .filter_map(|(label, sum)| sum.map(|s| (label.clone(), s)))
                .unzip();
            fig.traces.push(Trace::Bar {
                name: year.to_string(),
                colors: vec![Rgb::palette(i); values.len()],
                categories,
                values,
                base: 0.0,
                orientation: Orientation::Vertical,
            });
        }
        fig
    }

    /// Placeholder prediction curve for the given health metric.
    pub fn create_bearing_health_plot(metric: &str, seed: u64) -> Figure {
        let mut rng = StdRng::seed_from_u64(seed);
        let x: Vec<f64> = (0..BEARING_POINTS).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..BEARING_POINTS).map(|_| rng.gen::<f64>()).collect();

        let mut fig = Figure::new(
            FigureId::BearingHealth,
            "Bearing Health Prediction",
            "Time",
            "Health Metric",
        );
        fig.traces.push(Trace::Line {
            name: format!("Bearing Health ({})", metric),
            x,
            y,
            markers: true,
            color: None,
        });
        fig
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly() -> MonthlySums {
        MonthlySums {
            months: (1..=12).collect(),
            sums: (1..=12).map(|m| m as f64 * 100.0).collect(),
        }
    }

    fn bars(fig: &Figure) -> Vec<(&Vec<String>, &Vec<f64>, &Vec<Rgb>)> {
        fig.traces
            .iter()
            .filter_map(|t| match t {
                Trace::Bar {
                    categories,
                    values,
                    colors,
                    ..
                } => Some((categories, values, colors)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn monthly_power_labels_each_month() {
        let fig = ChartFactory::create_monthly_power_plot(&monthly());
        let (categories, values, _) = bars(&fig)[0];
        assert_eq!(categories[0], "Month 1");
        assert_eq!(categories[11], "Month 12");
        assert_eq!(values[2], 300.0);
        assert_eq!(fig.categories, *categories);
    }

    #[test]
    fn noise_colors_follow_difference_sign() {
        let fig = ChartFactory::create_noise_difference_plot(&monthly(), 10_000_000.0, 42);
        let (_, values, colors) = bars(&fig)[0];
        assert_eq!(values.len(), 12);
        for (v, c) in values.iter().zip(colors) {
            assert_eq!(*c, if *v > 0.0 { GREEN } else { RED });
        }
        // Fixed seed keeps the chart stable between runs.
        let again = ChartFactory::create_noise_difference_plot(&monthly(), 10_000_000.0, 42);
        assert_eq!(fig, again);
    }

    #[test]
    fn zero_noise_is_reported_red() {
        let fig = ChartFactory::create_noise_difference_plot(&monthly(), 0.0, 42);
        let (_, values, colors) = bars(&fig)[0];
        assert!(values.iter().all(|v| *v == 0.0));
        assert!(colors.iter().all(|c| *c == RED));
    }

    #[test]
    fn gps_warnings_split_three_red_rest_yellow() {
        let warnings = ChartFactory::gps_warnings(100, 42);
        assert_eq!(warnings.red.len(), 3);
        assert_eq!(warnings.yellow.len(), 7);

        let mut all: Vec<usize> = warnings.red.iter().chain(&warnings.yellow).copied().collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 10);
        assert!(all.iter().all(|&i| i < 100));
    }

    #[test]
    fn gps_plot_shows_only_yellow_warnings_with_padded_ranges() {
        let coords: Vec<(f64, f64)> = (0..100)
            .map(|i| (i as f64 - 50.0, (i as f64 - 50.0) / 2.0))
            .collect();
        let fig = ChartFactory::create_gps_plot(&coords, 42);

        match &fig.traces[0] {
            Trace::GeoScatter {
                lon, fill, outline, ..
            } => {
                assert_eq!(lon.len(), 7);
                assert!(fill.iter().all(|c| c.to_string() == "#ffff80"));
                assert!(outline.iter().all(|c| c.to_string() == "#999900"));
            }
            other => panic!("unexpected trace {:?}", other),
        }

        // lon spans -50..49 (span 99), lat -25..24.5 (span 49.5)
        let (lo, hi) = fig.x_range.unwrap();
        assert!((lo - (-59.9)).abs() < 1e-9);
        assert!((hi - 58.9).abs() < 1e-9);
        let (lo, hi) = fig.y_range.unwrap();
        assert!((lo - (-29.95)).abs() < 1e-9);
        assert!((hi - 29.45).abs() < 1e-9);
        assert_eq!(fig.projection, Projection::Mercator);
    }

    #[test]
    fn gps_plot_without_points_has_no_range() {
        let fig = ChartFactory::create_gps_plot(&[], 42);
        assert!(fig.x_range.is_none());
        assert!(fig.y_range.is_none());
    }

    #[test]
    fn log_scale_maps_no_change_to_zero() {
        assert_eq!(ChartFactory::log_changes(&[1.0, 2.0, 0.5]), vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn quarterly_colors_reward_good_direction() {
        let fig = ChartFactory::create_quarterly_summary_plot();
        let colors: Vec<(String, Rgb)> = fig
            .traces
            .iter()
            .map(|t| match t {
                Trace::Bar { name, colors, .. } => (name.clone(), colors[0]),
                _ => unreachable!(),
            })
            .collect();

        assert_eq!(
            colors,
            vec![
                ("Profit/loss".to_string(), GREEN),
                ("Unexpected failures".to_string(), GREEN),
                ("Up time".to_string(), RED),
            ]
        );
        assert_eq!(fig.x_range, Some((-1.0, 1.0)));
        assert_eq!(fig.x_ticks[1].value, 0.0);
        assert_eq!(fig.x_ticks[1].label, "No Change");
    }

    #[test]
    fn failure_models_are_blue_horizontal_bars() {
        let fig = ChartFactory::create_failure_model_plot();
        assert!(fig.is_horizontal());
        assert_eq!(fig.traces.len(), 4);
        for (_, values, colors) in bars(&fig) {
            assert_eq!(colors[0], BLUE);
            assert!(values[0] > 0.0);
        }
    }

    #[test]
    fn time_series_carries_reference_lines() {
        let cumulative = CumulativePower {
            dates: vec![NaiveDate::from_ymd_opt(1970, 1, 11).unwrap()],
            values: vec![5.0],
        };
        let fig = ChartFactory::create_time_series_plot(&cumulative, 1000.0, 2000.0);

        assert!(fig.x_is_date);
        match &fig.traces[0] {
            Trace::Line { x, .. } => assert_eq!(x, &vec![10.0]),
            other => panic!("unexpected trace {:?}", other),
        }
        assert_eq!(fig.h_lines[0].label, "Threshold");
        assert_eq!(fig.h_lines[0].y, 1000.0);
        assert_eq!(fig.h_lines[1].label_position, LabelPosition::TopRight);
    }

    #[test]
    fn stacked_bars_skip_missing_months() {
        let ym = YearMonthSums {
            months: vec![1, 11, 12],
            series: vec![
                (2020, vec![None, Some(1.0), Some(2.0)]),
                (2021, vec![Some(3.0), None, None]),
            ],
        };
        let fig = ChartFactory::create_stacked_bar_plot(&ym);

        assert_eq!(fig.bar_mode, BarMode::Stack);
        assert_eq!(fig.categories, vec!["01", "11", "12"]);
        assert_eq!(fig.traces[0].name(), "2020");
        let b = bars(&fig);
        assert_eq!(b[0].0, &vec!["11".to_string(), "12".to_string()]);
        assert_eq!(b[1].1, &vec![3.0]);
    }

    #[test]
    fn bearing_health_has_ten_unit_points() {
        let fig = ChartFactory::create_bearing_health_plot("pred", 1);
        match &fig.traces[0] {
            Trace::Line { x, y, markers, .. } => {
                assert_eq!(x.len(), 10);
                assert!(*markers);
                assert!(y.iter().all(|v| (0.0..1.0).contains(v)));
            }
            other => panic!("unexpected trace {:?}", other),
        }
    }

    #[test]
    fn build_all_produces_every_figure() {
        let config = DashboardConfig {
            seed: Some(11),
            ..Default::default()
        };
        let data = SampleData::generate(&config).unwrap();
        let set = ChartFactory::build_all(&data, &config).unwrap();

        assert_eq!(set.len(), FigureId::ALL.len());
        for id in FigureId::ALL {
            assert_eq!(set.get(id).map(|f| f.id), Some(id));
        }
    }
}
