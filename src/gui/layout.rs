//! Dashboard Layout
//! Static arrangement of figures into tabs, plus header and footer text.

use crate::charts::FigureId;

/// One block of a tab, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// The label/number stat card row.
    StatCards,
    /// A figure spanning the full width.
    Figure(FigureId),
    /// Figures side by side, equal widths.
    Row(Vec<FigureId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub label: String,
    pub sections: Vec<Section>,
}

impl Tab {
    fn new(label: &str, sections: Vec<Section>) -> Self {
        Self {
            label: label.to_string(),
            sections,
        }
    }

    /// Figures shown on this tab, in display order.
    pub fn figures(&self) -> Vec<FigureId> {
        self.sections
            .iter()
            .flat_map(|section| match section {
                Section::StatCards => Vec::new(),
                Section::Figure(id) => vec![*id],
                Section::Row(ids) => ids.clone(),
            })
            .collect()
    }
}

/// Header, tabs and footer of the dashboard window.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardLayout {
    pub title: String,
    pub subtitle: String,
    pub footer: String,
    pub tabs: Vec<Tab>,
}

impl DashboardLayout {
    /// The windfarm demo: a Home overview followed by one slide per chart.
    pub fn windfarm() -> Self {
        let mut home = vec![Section::StatCards];
        home.extend(FigureId::ALL.iter().map(|id| Section::Figure(*id)));

        let single = |label: &str, id: FigureId| Tab::new(label, vec![Section::Figure(id)]);

        Self {
            title: "neuralix.ai".to_string(),
            subtitle: "Windfarm Dashboard".to_string(),
            footer: "Copyright © 2024 Windfarm".to_string(),
            tabs: vec![
                Tab::new("Home", home),
                Tab::new(
                    "Slide 2",
                    vec![
                        Section::Figure(FigureId::NoiseDifference),
                        Section::Row(vec![FigureId::QuarterlySummary, FigureId::Gps]),
                    ],
                ),
                single("Slide 3", FigureId::NoiseDifference),
                single("Slide 4", FigureId::QuarterlySummary),
                single("Slide 5", FigureId::FailureModel),
                single("Slide 6", FigureId::TimeSeries),
                single("Slide 7", FigureId::StackedBar),
                single("Slide 8", FigureId::BearingHealth),
            ],
        }
    }

    pub fn tab(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.label.as_str()).collect()
    }
}
