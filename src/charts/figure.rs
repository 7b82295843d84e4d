//! Figure Module
//! Declarative chart descriptions handed to the interactive and static renderers.

use crate::charts::color::Rgb;
use serde::{Deserialize, Serialize};

/// Identifies one of the dashboard's charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureId {
    MonthlyPower,
    NoiseDifference,
    Gps,
    QuarterlySummary,
    FailureModel,
    TimeSeries,
    StackedBar,
    BearingHealth,
}

impl FigureId {
    /// All charts in Home tab order.
    pub const ALL: [FigureId; 8] = [
        FigureId::MonthlyPower,
        FigureId::NoiseDifference,
        FigureId::Gps,
        FigureId::QuarterlySummary,
        FigureId::FailureModel,
        FigureId::TimeSeries,
        FigureId::StackedBar,
        FigureId::BearingHealth,
    ];

    /// File-name friendly identifier.
    pub fn slug(self) -> &'static str {
        match self {
            FigureId::MonthlyPower => "monthly_power",
            FigureId::NoiseDifference => "noise_difference",
            FigureId::Gps => "gps",
            FigureId::QuarterlySummary => "quarterly_summary",
            FigureId::FailureModel => "failure_model",
            FigureId::TimeSeries => "time_series",
            FigureId::StackedBar => "stacked_bar",
            FigureId::BearingHealth => "bearing_health",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    #[default]
    Group,
    Stack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Cartesian,
    Mercator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dash {
    Solid,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPosition {
    TopRight,
    BottomRight,
}

/// Horizontal reference line across the plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HLine {
    pub y: f64,
    pub color: Rgb,
    pub dash: Dash,
    pub label: String,
    pub label_position: LabelPosition,
}

/// Custom tick on the value axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    /// Bars placed on the figure's category axis.
    Bar {
        name: String,
        categories: Vec<String>,
        values: Vec<f64>,
        base: f64,
        /// One color per bar.
        colors: Vec<Rgb>,
        orientation: Orientation,
    },
    Line {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
        markers: bool,
        color: Option<Rgb>,
    },
    GeoScatter {
        name: String,
        lon: Vec<f64>,
        lat: Vec<f64>,
        fill: Vec<Rgb>,
        outline: Vec<Rgb>,
        size: f32,
    },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Bar { name, .. } | Trace::Line { name, .. } | Trace::GeoScatter { name, .. } => {
                name
            }
        }
    }
}

/// A complete chart: traces plus axis decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub id: FigureId,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Category order for bar traces. Empty for numeric axes.
    pub categories: Vec<String>,
    pub traces: Vec<Trace>,
    pub h_lines: Vec<HLine>,
    pub x_ticks: Vec<Tick>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub bar_mode: BarMode,
    pub projection: Projection,
    /// X values are days since 1970-01-01.
    pub x_is_date: bool,
}

impl Figure {
    pub fn new(id: FigureId, title: &str, x_title: &str, y_title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
            categories: Vec::new(),
            traces: Vec::new(),
            h_lines: Vec::new(),
            x_ticks: Vec::new(),
            x_range: None,
            y_range: None,
            bar_mode: BarMode::Group,
            projection: Projection::Cartesian,
            x_is_date: false,
        }
    }

    /// Position of a category on the category axis.
    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    /// Whether bar traces run horizontally (category axis is y).
    pub fn is_horizontal(&self) -> bool {
        self.traces.iter().any(|t| {
            matches!(
                t,
                Trace::Bar {
                    orientation: Orientation::Horizontal,
                    ..
                }
            )
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::color::BLUE;

    #[test]
    fn slugs_are_unique() {
        let mut slugs: Vec<&str> = FigureId::ALL.iter().map(|id| id.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), FigureId::ALL.len());
    }

    #[test]
    fn json_carries_trace_tags_and_hex_colors() {
        let mut fig = Figure::new(FigureId::FailureModel, "t", "x", "y");
        fig.categories = vec!["Z50".to_string()];
        fig.traces.push(Trace::Bar {
            name: "Z50".to_string(),
            categories: vec!["Z50".to_string()],
            values: vec![2.4],
            base: 0.0,
            colors: vec![BLUE],
            orientation: Orientation::Horizontal,
        });

        let json = fig.to_json().unwrap();
        assert!(json.contains("\"type\": \"bar\""));
        assert!(json.contains("\"#0000ff\""));
        assert!(json.contains("\"failure_model\""));
        assert!(fig.is_horizontal());

        let back: Figure = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fig);
    }
}
