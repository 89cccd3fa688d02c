//! Render-agnostic chart description.
//!
//! A [`Chart`] is built once per pipeline run and drawn twice: on screen with
//! `egui_plot` (see `ui::plot`) and into a PNG with `plotters` (see `export`).

use crate::color::{Rgb, generate_palette};
use crate::config::{BarConfig, HistogramConfig};
use crate::data::model::Value;
use crate::data::stats::Histogram;

/// One bar of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistBar {
    pub left: f64,
    pub right: f64,
    pub height: f64,
}

/// One bar of a categorical chart, drawn at integer x positions.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBar {
    pub label: String,
    pub height: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Histogram {
        bars: Vec<HistBar>,
        fill: Rgb,
        /// Density curve already scaled to the bar units.
        kde: Option<Vec<(f64, f64)>>,
    },
    Categories {
        bars: Vec<CategoryBar>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub opacity: f32,
    pub body: ChartBody,
}

impl Chart {
    pub fn histogram(
        config: &HistogramConfig,
        hist: &Histogram,
        kde: Option<Vec<(f64, f64)>>,
    ) -> Self {
        let bars = hist
            .bins
            .iter()
            .map(|b| HistBar {
                left: b.left,
                right: b.right,
                height: b.height,
            })
            .collect();
        Self {
            title: config.title.clone(),
            x_label: config.x_label.clone(),
            y_label: hist.stat.label().to_string(),
            opacity: config.opacity,
            body: ChartBody::Histogram {
                bars,
                fill: config.color,
                kde,
            },
        }
    }

    /// Bars colored from an evenly spaced hue palette, in the given order.
    pub fn categories(config: &BarConfig, heights: &[(Value, f64)]) -> Self {
        let palette = generate_palette(heights.len());
        let bars = heights
            .iter()
            .zip(palette)
            .map(|((value, height), color)| CategoryBar {
                label: value.to_string(),
                height: *height,
                color,
            })
            .collect();
        let y_label = if config.y_label.is_empty() {
            config.default_y_label()
        } else {
            config.y_label.clone()
        };
        Self {
            title: config.title.clone(),
            x_label: config.x_label.clone(),
            y_label,
            opacity: config.opacity,
            body: ChartBody::Categories { bars },
        }
    }

    pub fn bar_count(&self) -> usize {
        match &self.body {
            ChartBody::Histogram { bars, .. } => bars.len(),
            ChartBody::Categories { bars } => bars.len(),
        }
    }

    /// `(x_min, x_max, y_max)` covering every bar and curve point.
    pub fn extent(&self) -> (f64, f64, f64) {
        match &self.body {
            ChartBody::Histogram { bars, kde, .. } => {
                let x_min = bars.first().map(|b| b.left).unwrap_or(0.0);
                let x_max = bars.last().map(|b| b.right).unwrap_or(1.0);
                let bar_max = bars.iter().map(|b| b.height).fold(0.0, f64::max);
                let kde_max = kde
                    .iter()
                    .flatten()
                    .map(|(_, y)| *y)
                    .fold(0.0, f64::max);
                (x_min, x_max, bar_max.max(kde_max))
            }
            ChartBody::Categories { bars } => {
                let y_max = bars.iter().map(|b| b.height).fold(0.0, f64::max);
                (-0.5, bars.len() as f64 - 0.5, y_max)
            }
        }
    }
}
