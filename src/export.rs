//! Figure Export Module
//! Writes every dashboard figure as a PNG image plus its JSON description.

use crate::charts::{Figure, FigureSet, RenderError, StaticChartRenderer};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to render {figure}: {source}")]
    Render {
        figure: String,
        #[source]
        source: RenderError,
    },
    #[error("Failed to serialize {figure}: {source}")]
    Json {
        figure: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("No figures to export")]
    Empty,
}

/// Files written by an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub dir: PathBuf,
    pub images: Vec<PathBuf>,
    pub descriptions: Vec<PathBuf>,
}

/// Exports figures to a directory.
pub struct Exporter {
    pub width: u32,
    pub height: u32,
}

impl Exporter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Write `<slug>.json` for one figure.
    pub fn write_description(figure: &Figure, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(format!("{}.json", figure.id.slug()));
        let json = figure.to_json().map_err(|source| ExportError::Json {
            figure: figure.id.slug().to_string(),
            source,
        })?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Write `<slug>.png` for one figure.
    pub fn write_image(&self, figure: &Figure, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(format!("{}.png", figure.id.slug()));
        StaticChartRenderer::save_png(figure, &path, self.width, self.height).map_err(|source| {
            ExportError::Render {
                figure: figure.id.slug().to_string(),
                source,
            }
        })?;
        Ok(path)
    }

    /// Export all figures in parallel, reporting `(done, total)` after each one.
    pub fn export_all<F>(
        &self,
        figures: &FigureSet,
        dir: &Path,
        progress: F,
    ) -> Result<ExportSummary, ExportError>
    where
        F: Fn(usize, usize) + Sync,
    {
        if figures.is_empty() {
            return Err(ExportError::Empty);
        }
        fs::create_dir_all(dir)?;

        let total = figures.len();
        let done = AtomicUsize::new(0);
        let list: Vec<&Figure> = figures.iter().collect();

        let written: Vec<(PathBuf, PathBuf)> = list
            .par_iter()
            .map(|figure| {
                let description = Self::write_description(figure, dir)?;
                let image = self.write_image(figure, dir)?;
                let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(figure = figure.id.slug(), finished, total, "Exported figure");
                progress(finished, total);
                Ok((image, description))
            })
            .collect::<Result<_, ExportError>>()?;

        let (images, descriptions) = written.into_iter().unzip();
        tracing::info!(dir = %dir.display(), count = total, "Exported figures");

        Ok(ExportSummary {
            dir: dir.to_path_buf(),
            images,
            descriptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartFactory;
    use crate::config::DashboardConfig;
    use crate::data::SampleData;
    use std::sync::Mutex;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG";

    #[test]
    fn description_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let figure = ChartFactory::create_failure_model_plot();

        let path = Exporter::write_description(&figure, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "failure_model.json");

        let back: Figure = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, figure);
    }

    #[test]
    fn empty_set_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = Exporter::new(100, 100).export_all(&FigureSet::default(), dir.path(), |_, _| {});
        assert!(matches!(result, Err(ExportError::Empty)));
    }

    #[test]
    fn exports_every_dashboard_figure() {
        let config = DashboardConfig {
            seed: Some(7),
            ..DashboardConfig::default()
        };
        let data = SampleData::generate(&config).unwrap();
        let figures = ChartFactory::build_all(&data, &config).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let seen = Mutex::new(Vec::new());
        let summary = Exporter::new(400, 300)
            .export_all(&figures, dir.path(), |done, total| {
                seen.lock().unwrap().push((done, total));
            })
            .unwrap();

        assert_eq!(summary.dir, dir.path());
        assert_eq!(summary.images.len(), 8);
        assert_eq!(summary.descriptions.len(), 8);
        for image in &summary.images {
            let bytes = fs::read(image).unwrap();
            assert!(bytes.starts_with(PNG_SIGNATURE), "{} is not a PNG", image.display());
        }
        for description in &summary.descriptions {
            assert_eq!(description.extension().unwrap(), "json");
            assert!(description.exists());
        }

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 8);
        assert!(seen.contains(&(8, 8)));
    }
}
