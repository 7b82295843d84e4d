//! Static Chart Renderer
//! Draws figures to PNG images with plotters for export.
//!
//! Layout:
//! 1. Title caption centered above the plot
//! 2. Cartesian plot area with axis titles and mesh
//! 3. Series legend in the upper right corner

use crate::charts::color::{Rgb, BLACK};
use crate::charts::figure::{BarMode, Dash, Figure, LabelPosition, Orientation, Projection, Trace};
use crate::charts::plotter::{format_date, mercator_lat, mercator_y};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Display;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Pixel buffer does not match {0}x{1}")]
    Buffer(u32, u32),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err(e: impl Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

const FONT: &str = "sans-serif";
const BAR_HALF_WIDTH: f64 = 0.35;
const DOT_LENGTH: f64 = 0.01;

type Range2d = ((f64, f64), (f64, f64));

fn widen(range: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = range;
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn include(range: &mut (f64, f64), v: f64) {
    range.0 = range.0.min(v);
    range.1 = range.1.max(v);
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Axis ranges (x, y) covering every trace, bar stack and reference line.
    pub fn bounds(figure: &Figure) -> Range2d {
        let empty = (f64::INFINITY, f64::NEG_INFINITY);
        let mut x = empty;
        let mut y = empty;
        let horizontal = figure.is_horizontal();

        // Value extent of bars, accounting for stacking.
        let mut value_extent = empty;
        let mut stack_tops = vec![0.0; figure.categories.len()];

        for trace in &figure.traces {
            match trace {
                Trace::Bar {
                    categories,
                    values,
                    base,
                    ..
                } => {
                    for (category, &value) in categories.iter().zip(values) {
                        let offset = match (figure.bar_mode, figure.category_index(category)) {
                            (BarMode::Stack, Some(pos)) => {
                                let top = stack_tops[pos];
                                stack_tops[pos] += value;
                                top
                            }
                            _ => *base,
                        };
                        include(&mut value_extent, offset);
                        include(&mut value_extent, offset + value);
                    }
                }
                Trace::Line { x: xs, y: ys, .. } => {
                    xs.iter().for_each(|&v| include(&mut x, v));
                    ys.iter().for_each(|&v| include(&mut y, v));
                }
                Trace::GeoScatter { lon, lat, .. } => {
                    lon.iter().for_each(|&v| include(&mut x, v));
                    lat.iter()
                        .for_each(|&v| include(&mut y, Self::project(figure, v)));
                }
            }
        }

        // The category axis keeps its exact span; value axes get padding.
        let mut category_span = None;
        if !figure.categories.is_empty() {
            category_span = Some((-0.5, figure.categories.len() as f64 - 0.5));
            if horizontal {
                x = value_extent;
            } else {
                y = value_extent;
            }
        }

        for line in &figure.h_lines {
            include(&mut y, line.y);
        }

        let x = match (figure.x_range, category_span) {
            (Some(range), _) => range,
            (None, Some(span)) if !horizontal => span,
            _ => widen(x),
        };
        let y = match (figure.y_range, category_span) {
            (Some((lo, hi)), _) => (Self::project(figure, lo), Self::project(figure, hi)),
            (None, Some(span)) if horizontal => span,
            _ => widen(y),
        };
        (x, y)
    }

    fn project(figure: &Figure, lat: f64) -> f64 {
        match figure.projection {
            Projection::Mercator => mercator_y(lat),
            Projection::Cartesian => lat,
        }
    }

    /// Render a figure to PNG bytes.
    pub fn render_png(figure: &Figure, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(&root, figure)?;
            root.present().map_err(draw_err)?;
        }

        let image = image::RgbImage::from_raw(width, height, buffer)
            .ok_or(RenderError::Buffer(width, height))?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Render a figure and write it to `path`.
    pub fn save_png(figure: &Figure, path: &Path, width: u32, height: u32) -> Result<(), RenderError> {
        let bytes = Self::render_png(figure, width, height)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn draw(root: &DrawingArea<BitMapBackend<'_>, Shift>, figure: &Figure) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(draw_err)?;

        let ((x0, x1), (y0, y1)) = Self::bounds(figure);
        let mut chart = ChartBuilder::on(root)
            .caption(&figure.title, (FONT, 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(draw_err)?;

        let horizontal = figure.is_horizontal();
        let category_label = |v: &f64| {
            let idx = v.round();
            if idx >= 0.0 && (idx - v).abs() < 1e-6 {
                figure.categories.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };
        let x_formatter = |v: &f64| -> String {
            if !figure.x_ticks.is_empty() {
                figure
                    .x_ticks
                    .iter()
                    .find(|t| (t.value - v).abs() < 1e-9)
                    .map(|t| t.label.clone())
                    .unwrap_or_default()
            } else if figure.x_is_date {
                format_date(*v)
            } else if !figure.categories.is_empty() && !horizontal {
                category_label(v)
            } else {
                format!("{:.1}", v)
            }
        };
        let y_formatter = |v: &f64| -> String {
            if figure.projection == Projection::Mercator {
                format!("{:.0}", mercator_lat(*v))
            } else if !figure.categories.is_empty() && horizontal {
                category_label(v)
            } else if v.abs() >= 1e5 {
                format!("{:.2e}", v)
            } else {
                format!("{:.1}", v)
            }
        };

        let x_labels = if !figure.x_ticks.is_empty() {
            figure.x_ticks.len()
        } else if !figure.categories.is_empty() && !horizontal {
            figure.categories.len()
        } else {
            8
        };
        let y_labels = if !figure.categories.is_empty() && horizontal {
            figure.categories.len()
        } else {
            8
        };

        chart
            .configure_mesh()
            .x_desc(figure.x_title.as_str())
            .y_desc(figure.y_title.as_str())
            .x_labels(x_labels)
            .y_labels(y_labels)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .draw()
            .map_err(draw_err)?;

        let mut stack_tops = vec![0.0; figure.categories.len()];

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
                    let mut rects = Vec::new();
                    for (i, (category, &value)) in categories.iter().zip(values).enumerate() {
                        let Some(pos) = figure.category_index(category) else {
                            continue;
                        };
                        let offset = match figure.bar_mode {
                            BarMode::Stack => {
                                let top = stack_tops[pos];
                                stack_tops[pos] += value;
                                top
                            }
                            BarMode::Group => *base,
                        };
                        let color = colors
                            .get(i)
                            .copied()
                            .unwrap_or_else(|| Rgb::palette(trace_idx))
                            .to_plotters();
                        let (lo, hi) = (pos as f64 - BAR_HALF_WIDTH, pos as f64 + BAR_HALF_WIDTH);
                        let corners = match orientation {
                            Orientation::Vertical => [(lo, offset), (hi, offset + value)],
                            Orientation::Horizontal => [(offset, lo), (offset + value, hi)],
                        };
                        rects.push(Rectangle::new(corners, color.filled()));
                    }

                    let legend_color = colors
                        .first()
                        .copied()
                        .unwrap_or_else(|| Rgb::palette(trace_idx))
                        .to_plotters();
                    chart
                        .draw_series(rects)
                        .map_err(draw_err)?
                        .label(name.as_str())
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - 5), (x + 12, y + 5)], legend_color.filled())
                        });
                }
                Trace::Line {
                    name,
                    x,
                    y,
                    markers,
                    color,
                } => {
                    let color = color.unwrap_or_else(|| Rgb::palette(trace_idx)).to_plotters();
                    let points: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();

                    chart
                        .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                        .map_err(draw_err)?
                        .label(name.as_str())
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2))
                        });
                    if *markers {
                        chart
                            .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
                            .map_err(draw_err)?;
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
                    let radius = (*size / 2.0).round() as i32;
                    let points: Vec<(f64, f64)> = lon
                        .iter()
                        .zip(lat)
                        .map(|(&x, &y)| (x, Self::project(figure, y)))
                        .collect();
                    let legend_color = fill.first().copied().unwrap_or(BLACK).to_plotters();

                    chart
                        .draw_series(points.iter().enumerate().map(|(i, &p)| {
                            let edge = outline.get(i).copied().unwrap_or(BLACK).to_plotters();
                            Circle::new(p, radius + 1, edge.filled())
                        }))
                        .map_err(draw_err)?;
                    chart
                        .draw_series(points.iter().enumerate().map(|(i, &p)| {
                            let face = fill.get(i).copied().unwrap_or(BLACK).to_plotters();
                            Circle::new(p, radius, face.filled())
                        }))
                        .map_err(draw_err)?
                        .label(name.as_str())
                        .legend(move |(x, y)| Circle::new((x + 5, y), 4, legend_color.filled()));
                }
            }
        }

        for line in &figure.h_lines {
            let color = line.color.to_plotters();
            let segments: Vec<Vec<(f64, f64)>> = match line.dash {
                Dash::Solid => vec![vec![(x0, line.y), (x1, line.y)]],
                Dash::Dot => {
                    let step = (x1 - x0) * DOT_LENGTH;
                    (0..)
                        .map(|i| x0 + i as f64 * 2.0 * step)
                        .take_while(|&start| start < x1)
                        .map(|start| vec![(start, line.y), ((start + step).min(x1), line.y)])
                        .collect()
                }
            };
            chart
                .draw_series(
                    segments
                        .into_iter()
                        .map(|s| PathElement::new(s, color.stroke_width(2))),
                )
                .map_err(draw_err)?;

            let v_pos = match line.label_position {
                LabelPosition::TopRight => VPos::Bottom,
                LabelPosition::BottomRight => VPos::Top,
            };
            let font = (FONT, 14)
                .into_font()
                .color(&color)
                .pos(Pos::new(HPos::Right, v_pos));
            chart
                .draw_series(std::iter::once(Text::new(
                    line.label.clone(),
                    (x1, line.y),
                    font,
                )))
                .map_err(draw_err)?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.to_plotters())
            .label_font((FONT, 14))
            .draw()
            .map_err(draw_err)?;

        Ok(())
    }
}
