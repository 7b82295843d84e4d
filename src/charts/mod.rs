//! Charts module - figure descriptions, chart factory and rendering

pub mod color;
mod factory;
pub mod figure;
mod plotter;
mod renderer;

pub use factory::{ChartFactory, FigureSet};
pub use figure::{Figure, FigureId};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
