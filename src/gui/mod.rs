//! GUI module - User interface components

mod app;
mod chart_viewer;
pub mod layout;
mod toolbar;

pub use app::DashboardApp;
pub use chart_viewer::ChartViewer;
pub use layout::DashboardLayout;
pub use toolbar::{Toolbar, ToolbarAction};
