use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::data::model::{ColumnKind, Table};
use crate::data::stats::Stat;
use crate::error::EdaError;
use crate::settings::Settings;
use crate::state::Selection;

pub const MIN_BINS: usize = 5;
pub const MAX_BINS: usize = 100;

// ---------------------------------------------------------------------------
// Histogram options (numeric columns)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    pub title: String,
    pub x_label: String,
    pub stat: Stat,
    pub bins: usize,
    /// Overlay a kernel density estimate.
    pub kde: bool,
    pub color: Rgb,
    pub opacity: f32,
}

impl HistogramConfig {
    pub fn for_column(column: &str, settings: &Settings) -> Self {
        Self {
            title: format!("Histogram of {column}"),
            x_label: column.to_string(),
            stat: Stat::Count,
            bins: settings.histogram_bins,
            kde: false,
            color: settings.histogram_color,
            opacity: settings.histogram_opacity,
        }
    }

    pub fn validate(&self) -> Result<(), EdaError> {
        if !(MIN_BINS..=MAX_BINS).contains(&self.bins) {
            return Err(EdaError::InvalidBins(self.bins));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bar options (categorical columns)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BarMode {
    /// Mean of a numeric column per category.
    #[default]
    Bar,
    /// Raw frequency per category.
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Numeric column aggregated in [`BarMode::Bar`].
    pub y_column: Option<String>,
    pub opacity: f32,
    pub mode: BarMode,
}

impl BarConfig {
    /// Defaults for `column`: bar mode over the first numeric column, or
    /// count mode when the table has none.
    pub fn for_column(column: &str, table: &Table, settings: &Settings) -> Self {
        let y_column = table
            .columns_of_kind(ColumnKind::Numeric)
            .first()
            .map(|s| s.to_string());
        let mode = if y_column.is_some() {
            BarMode::Bar
        } else {
            BarMode::Count
        };
        let mut config = Self {
            title: format!("Barplot of {column}"),
            x_label: column.to_string(),
            y_label: String::new(),
            y_column,
            opacity: settings.bar_opacity,
            mode,
        };
        config.y_label = config.default_y_label();
        config
    }

    /// Y-axis label used until the user types one.
    pub fn default_y_label(&self) -> String {
        match self.mode {
            BarMode::Bar => self.y_column.clone().unwrap_or_default(),
            BarMode::Count => "count".to_string(),
        }
    }

    /// Switch mode, carrying the y label along if it was still the default.
    pub fn set_mode(&mut self, mode: BarMode) {
        let was_default = self.y_label == self.default_y_label();
        self.mode = mode;
        if was_default {
            self.y_label = self.default_y_label();
        }
    }

    /// Switch the aggregated column, carrying the y label along if it was
    /// still the default.
    pub fn set_y_column(&mut self, y_column: String) {
        let was_default = self.y_label == self.default_y_label();
        self.y_column = Some(y_column);
        if was_default {
            self.y_label = self.default_y_label();
        }
    }
}

// ---------------------------------------------------------------------------
// ChartConfig
// ---------------------------------------------------------------------------

/// Display options for the selected column. Rebuilt with defaults whenever
/// the selection changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChartConfig {
    Histogram(HistogramConfig),
    Bar(BarConfig),
}

impl ChartConfig {
    pub fn default_for(selection: &Selection, table: &Table, settings: &Settings) -> Self {
        match selection.kind() {
            ColumnKind::Numeric => {
                ChartConfig::Histogram(HistogramConfig::for_column(selection.name(), settings))
            }
            ColumnKind::Categorical => {
                ChartConfig::Bar(BarConfig::for_column(selection.name(), table, settings))
            }
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ChartConfig::Histogram(_) => ColumnKind::Numeric,
            ChartConfig::Bar(_) => ColumnKind::Categorical,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartConfig::Histogram(h) => &h.title,
            ChartConfig::Bar(b) => &b.title,
        }
    }
}
