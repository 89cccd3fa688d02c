use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::config::ChartConfig;
use crate::data::model::{ColumnKind, Table};
use crate::data::summary::DatasetSummary;
use crate::error::EdaError;
use crate::export::{ExportDir, ExportedChart};
use crate::pipeline::{Analysis, Pipeline};
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// A column chosen for plotting. Only [`Selection::resolve`] builds one, so
/// `name` is always a column of `kind` in the table it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    kind: ColumnKind,
    name: String,
}

impl Selection {
    /// Keep `preferred` when it is a column of `kind`, otherwise fall back to
    /// the first such column. `None` when the table has no column of `kind`.
    pub fn resolve(table: &Table, kind: ColumnKind, preferred: Option<&str>) -> Option<Self> {
        let candidates = table.columns_of_kind(kind);
        let name = preferred
            .filter(|p| candidates.contains(p))
            .or_else(|| candidates.first().copied())?;
        Some(Self {
            kind,
            name: name.to_string(),
        })
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Table>,

    /// Shape and dtype overview of `dataset`, computed once per load.
    pub summary: Option<DatasetSummary>,

    /// Whether the dataframe preview is shown, and how many head rows.
    pub preview: bool,
    pub preview_rows: usize,

    /// Column kind picked in the sidebar.
    pub kind: ColumnKind,

    /// Column to plot; None when the dataset has no column of `kind`.
    pub selection: Option<Selection>,

    /// Display options for `selection`.
    pub config: Option<ChartConfig>,

    pipeline: Pipeline,

    /// Created on first export, removed with everything in it on drop.
    export_dir: Option<ExportDir>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            preview_rows: settings.preview_rows,
            settings,
            dataset: None,
            summary: None,
            preview: false,
            kind: ColumnKind::Numeric,
            selection: None,
            config: None,
            pipeline: Pipeline::default(),
            export_dir: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, replacing the previous one.
    pub fn set_dataset(&mut self, dataset: Table) {
        self.summary = Some(DatasetSummary::of(&dataset));
        self.preview_rows = self.settings.preview_rows.clamp(1, dataset.n_rows().max(1));
        self.dataset = Some(dataset);
        self.selection = None;
        self.config = None;
        self.pipeline.clear();
        self.reselect(None);

        self.status_message = None;
    }

    /// Switch between numeric and categorical columns.
    pub fn set_kind(&mut self, kind: ColumnKind) {
        if self.kind != kind {
            self.kind = kind;
            self.reselect(None);
        }
    }

    /// Pick a column of the current kind by name.
    pub fn select_column(&mut self, name: &str) {
        self.reselect(Some(name));
    }

    /// Resolve the selection against the dataset; chart options are reset to
    /// their defaults whenever the selected column changes.
    fn reselect(&mut self, preferred: Option<&str>) {
        let Some(table) = &self.dataset else {
            self.selection = None;
            self.config = None;
            return;
        };
        let preferred = preferred.or_else(|| {
            self.selection
                .as_ref()
                .filter(|s| s.kind() == self.kind)
                .map(Selection::name)
        });
        let selection = Selection::resolve(table, self.kind, preferred);
        if selection != self.selection || self.config.is_none() {
            self.config = selection
                .as_ref()
                .map(|sel| ChartConfig::default_for(sel, table, &self.settings));
            self.selection = selection;
        }
    }

    /// Run (or reuse) the analysis for the current inputs.
    pub fn analysis(&mut self) -> Option<Result<Arc<Analysis>, EdaError>> {
        let table = self.dataset.as_ref()?;
        let selection = self.selection.as_ref()?;
        let config = self.config.as_ref()?;
        Some(self.pipeline.run(table, selection, config))
    }

    /// Render the current chart to PNG in the export directory.
    pub fn export_current(&mut self) -> Result<ExportedChart> {
        let analysis = match self.analysis() {
            Some(result) => result?,
            None => anyhow::bail!("Nothing to export: no column selected"),
        };
        if self.export_dir.is_none() {
            self.export_dir = Some(ExportDir::new()?);
        }
        let dir = self
            .export_dir
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("export directory unavailable"))?;
        dir.export(&analysis.chart, &self.settings)
    }

    /// Export the current chart and copy it to `dest`.
    pub fn download_to(&mut self, dest: &Path) -> Result<ExportedChart> {
        let exported = self.export_current()?;
        exported.save_to(dest)?;
        log::info!(
            "Saved {} ({}) to {}",
            exported.file_name,
            exported.mime,
            dest.display()
        );
        Ok(exported)
    }
}
