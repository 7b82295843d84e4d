//! Chart Plotter Module
//! Draws declarative figures as interactive egui_plot widgets.

use crate::charts::color::Rgb;
use crate::charts::figure::{BarMode, Dash, Figure, LabelPosition, Orientation, Projection, Trace};
use chrono::NaiveDate;
use egui::{Align2, Color32, RichText};
use egui_plot::{
    Bar, BarChart, GridMark, HLine, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points,
    Text,
};

/// Mercator is undefined at the poles.
const MAX_MERCATOR_LAT: f64 = 85.0;

/// Latitude in degrees to Mercator y, also in degrees.
pub fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln().to_degrees()
}

/// Inverse of [`mercator_y`].
pub fn mercator_lat(y: f64) -> f64 {
    (2.0 * y.to_radians().exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees()
}

/// Date label for an x value holding days since 1970-01-01.
pub fn format_date(days: f64) -> String {
    let date = NaiveDate::default() + chrono::Duration::days(days.round() as i64);
    date.format("%Y-%m").to_string()
}

/// Draws figures using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw a figure title and its plot.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure, id_salt: &str, height: f32) {
        ui.label(RichText::new(&figure.title).size(16.0).strong());
        ui.add_space(4.0);

        let horizontal = figure.is_horizontal();
        let categories = figure.categories.clone();

        let mut plot = Plot::new(format!("{}_{}", id_salt, figure.id.slug()))
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label(figure.x_title.clone())
            .y_axis_label(figure.y_title.clone());

        if let Some((lo, hi)) = figure.x_range {
            plot = plot.include_x(lo).include_x(hi);
        }
        if let Some((lo, hi)) = figure.y_range {
            let (lo, hi) = match figure.projection {
                Projection::Mercator => (mercator_y(lo), mercator_y(hi)),
                Projection::Cartesian => (lo, hi),
            };
            plot = plot.include_y(lo).include_y(hi);
        }

        // Category axis: one grid mark per category index.
        if !categories.is_empty() {
            let count = categories.len();
            let spacer = move |_input: egui_plot::GridInput| {
                (0..count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect::<Vec<_>>()
            };
            let formatter = move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    categories.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            };
            if horizontal {
                plot = plot.y_grid_spacer(spacer).y_axis_formatter(formatter);
            } else {
                plot = plot.x_grid_spacer(spacer).x_axis_formatter(formatter);
            }
        }

        if !figure.x_ticks.is_empty() {
            let ticks = figure.x_ticks.clone();
            let marks: Vec<GridMark> = ticks
                .iter()
                .map(|t| GridMark {
                    value: t.value,
                    step_size: 1.0,
                })
                .collect();
            plot = plot
                .x_grid_spacer(move |_input| marks.clone())
                .x_axis_formatter(move |mark, _range| {
                    ticks
                        .iter()
                        .find(|t| (t.value - mark.value).abs() < 1e-9)
                        .map(|t| t.label.clone())
                        .unwrap_or_default()
                });
        }

        if figure.x_is_date {
            plot = plot.x_axis_formatter(|mark, _range| format_date(mark.value));
        }

        if figure.projection == Projection::Mercator {
            plot = plot
                .data_aspect(1.0)
                .y_axis_formatter(|mark, _range| format!("{:.0}°", mercator_lat(mark.value)))
                .x_axis_formatter(|mark, _range| format!("{:.0}°", mark.value));
        }

        plot.show(ui, |plot_ui| {
            // Running bar tops per category position, for stacked mode.
            let mut stack_tops: Vec<f64> = vec![0.0; figure.categories.len()];

            for (trace_idx, trace) in figure.traces.iter().enumerate() {
                match trace {
                    Trace::Bar {
                        name,
                        categories,
                        values,
                        base,
                        colors,
                        orientation,
                    } => {
                        let bars: Vec<Bar> = categories
                            .iter()
                            .zip(values)
                            .enumerate()
                            .filter_map(|(i, (category, &value))| {
                                let position = figure.category_index(category)?;
                                let offset = match figure.bar_mode {
                                    BarMode::Stack => {
                                        let top = stack_tops[position];
                                        stack_tops[position] += value;
                                        top
                                    }
                                    BarMode::Group => *base,
                                };
                                let color = colors
                                    .get(i)
                                    .copied()
                                    .unwrap_or_else(|| Rgb::palette(trace_idx))
                                    .to_color32();
                                Some(
                                    Bar::new(position as f64, value)
                                        .base_offset(offset)
                                        .width(0.7)
                                        .fill(color)
                                        .name(category),
                                )
                            })
                            .collect();

                        let mut chart = BarChart::new(bars).name(name);
                        if *orientation == Orientation::Horizontal {
                            chart = chart.horizontal();
                        }
                        plot_ui.bar_chart(chart);
                    }
                    Trace::Line {
                        name,
                        x,
                        y,
                        markers,
                        color,
                    } => {
                        let color = color.unwrap_or_else(|| Rgb::palette(trace_idx)).to_color32();
                        let points: Vec<[f64; 2]> =
                            x.iter().zip(y).map(|(&x, &y)| [x, y]).collect();

                        plot_ui.line(
                            Line::new(PlotPoints::from_iter(points.iter().copied()))
                                .color(color)
                                .width(2.0)
                                .name(name),
                        );
                        if *markers {
                            plot_ui.points(
                                Points::new(PlotPoints::from_iter(points.iter().copied()))
                                    .radius(4.0)
                                    .color(color),
                            );
                        }
                    }
                    Trace::GeoScatter {
                        name,
                        lon,
                        lat,
                        fill,
                        outline,
                        size,
                    } => {
                        let project = |y: f64| match figure.projection {
                            Projection::Mercator => mercator_y(y),
                            Projection::Cartesian => y,
                        };
                        let radius = size / 2.0;
                        for (i, (&x, &y)) in lon.iter().zip(lat).enumerate() {
                            let point = [x, project(y)];
                            let edge = outline.get(i).copied().unwrap_or(Rgb(0, 0, 0));
                            let face = fill.get(i).copied().unwrap_or(Rgb::palette(0));
                            plot_ui.points(
                                Points::new(vec![point])
                                    .radius(radius + 1.0)
                                    .color(edge.to_color32())
                                    .name(name),
                            );
                            plot_ui.points(
                                Points::new(vec![point])
                                    .radius(radius)
                                    .color(face.to_color32())
                                    .name(name),
                            );
                        }
                    }
                }
            }

            let bounds = plot_ui.plot_bounds();
            for line in &figure.h_lines {
                let style = match line.dash {
                    Dash::Dot => LineStyle::dotted_dense(),
                    Dash::Solid => LineStyle::Solid,
                };
                let color = line.color.to_color32();
                plot_ui.hline(
                    HLine::new(line.y)
                        .color(color)
                        .width(1.5)
                        .style(style)
                        .name(&line.label),
                );

                let anchor = match line.label_position {
                    LabelPosition::TopRight => Align2::RIGHT_BOTTOM,
                    LabelPosition::BottomRight => Align2::RIGHT_TOP,
                };
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(bounds.max()[0], line.y),
                        RichText::new(&line.label).color(color).size(12.0),
                    )
                    .anchor(anchor),
                );
            }
        });
    }

    /// Frame color used behind chart cards.
    pub fn card_fill(ui: &egui::Ui) -> Color32 {
        ui.visuals().widgets.noninteractive.bg_fill
    }
}
