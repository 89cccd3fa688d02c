use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use crate::chart::{Chart, ChartBody};
use crate::color::Rgb;
use crate::error::EdaError;
use crate::settings::Settings;

pub const PNG_MIME: &str = "image/png";

const FONT: &str = "sans-serif";

// ---------------------------------------------------------------------------
// Export directory
// ---------------------------------------------------------------------------

/// A chart written to disk and read back, ready to be offered for download.
#[derive(Debug, Clone)]
pub struct ExportedChart {
    /// Name suggested to the user: `<title>.png`.
    pub file_name: String,
    /// Content-addressed location inside the export directory.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl ExportedChart {
    pub fn save_to(&self, dest: &Path) -> Result<()> {
        std::fs::write(dest, &self.bytes)
            .with_context(|| format!("writing image to {}", dest.display()))
    }
}

/// Process-scoped directory holding exported images. Everything in it is
/// removed when the value is dropped.
pub struct ExportDir {
    dir: TempDir,
}

impl ExportDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("rusty-eda-export-")
            .tempdir()
            .context("creating export directory")?;
        log::debug!("Exporting charts to {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Render `chart` to PNG, store it under `<title>-<hash>.png` and read it
    /// back. Equal titles with different content get different files.
    pub fn export(&self, chart: &Chart, settings: &Settings) -> Result<ExportedChart> {
        let (width, height) = settings.export_size();
        let png = render_png(chart, width, height, settings.dpi)?;

        let stem = file_stem(&chart.title);
        let digest = hex::encode(Sha256::digest(&png));
        let path = self.path().join(format!("{stem}-{}.png", &digest[..12]));
        std::fs::write(&path, &png)
            .with_context(|| format!("writing {}", path.display()))?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading back {}", path.display()))?;

        log::info!(
            "Exported '{}' ({} bars, {width}x{height}, {} bytes) to {}",
            chart.title,
            chart.bar_count(),
            bytes.len(),
            path.display()
        );
        Ok(ExportedChart {
            file_name: format!("{stem}.png"),
            path,
            bytes,
            mime: PNG_MIME,
        })
    }
}

/// Title reduced to characters safe in a file name.
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.').trim();
    if stem.is_empty() {
        "chart".to_string()
    } else {
        stem.to_string()
    }
}

// ---------------------------------------------------------------------------
// PNG rendering
// ---------------------------------------------------------------------------

/// Draw `chart` into a `width` x `height` RGB image and encode it as PNG.
/// Text and line sizes scale with `dpi`.
pub fn render_png(chart: &Chart, width: u32, height: u32, dpi: u32) -> Result<Vec<u8>, EdaError> {
    let (x_min, x_max, y_max) = chart.extent();
    if ![x_min, x_max, y_max].iter().all(|v| v.is_finite()) {
        return Err(EdaError::Render(format!(
            "'{}' has a non-finite axis range",
            chart.title
        )));
    }
    register_font(FONT, FontStyle::Normal, epaint_default_fonts::UBUNTU_LIGHT)
        .map_err(|_| EdaError::Render("bundled font could not be parsed".to_string()))?;

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let scale = Scale::new(dpi);
        match &chart.body {
            ChartBody::Histogram { bars, fill, kde } => {
                draw_histogram(&root, chart, bars, *fill, kde.as_deref(), &scale)?
            }
            ChartBody::Categories { bars } => draw_categories(&root, chart, bars, &scale)?,
        }
        root.present().map_err(render_err)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&buf, width, height, image::ExtendedColorType::Rgb8)
        .map_err(render_err)?;
    Ok(png)
}

fn render_err<E: std::fmt::Debug>(e: E) -> EdaError {
    EdaError::Render(format!("{e:?}"))
}

/// Pixel sizes derived from the export resolution (1pt = dpi/72 px).
struct Scale {
    px_per_pt: f64,
}

impl Scale {
    fn new(dpi: u32) -> Self {
        Self {
            px_per_pt: dpi as f64 / 72.0,
        }
    }

    fn px(&self, pt: f64) -> u32 {
        (pt * self.px_per_pt).round().max(1.0) as u32
    }

    fn font(&self, pt: f64) -> f64 {
        pt * self.px_per_pt
    }
}

fn to_rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_histogram(
    root: &Area<'_>,
    chart: &Chart,
    bars: &[crate::chart::HistBar],
    fill: Rgb,
    kde: Option<&[(f64, f64)]>,
    scale: &Scale,
) -> Result<(), EdaError> {
    let (x_min, x_max, y_max) = chart.extent();
    let y_top = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, scale.font(14.0)))
        .margin(scale.px(12.0))
        .x_label_area_size(scale.px(36.0))
        .y_label_area_size(scale.px(52.0))
        .build_cartesian_2d(x_min..x_max, 0f64..y_top)
        .map_err(render_err)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .label_style((FONT, scale.font(9.0)))
        .axis_desc_style((FONT, scale.font(11.0)))
        .draw()
        .map_err(render_err)?;

    let color = to_rgb(fill);
    ctx.draw_series(bars.iter().map(|b| {
        Rectangle::new(
            [(b.left, 0.0), (b.right, b.height)],
            color.mix(chart.opacity as f64).filled(),
        )
    }))
    .map_err(render_err)?;
    ctx.draw_series(bars.iter().map(|b| {
        Rectangle::new(
            [(b.left, 0.0), (b.right, b.height)],
            WHITE.stroke_width(scale.px(0.5)),
        )
    }))
    .map_err(render_err)?;

    if let Some(curve) = kde {
        ctx.draw_series(LineSeries::new(
            curve.iter().copied(),
            color.stroke_width(scale.px(1.5)),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

fn draw_categories(
    root: &Area<'_>,
    chart: &Chart,
    bars: &[crate::chart::CategoryBar],
    scale: &Scale,
) -> Result<(), EdaError> {
    let (_, _, y_max) = chart.extent();
    let y_top = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };
    let n = bars.len().max(1) as i32;

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, scale.font(14.0)))
        .margin(scale.px(12.0))
        .x_label_area_size(scale.px(36.0))
        .y_label_area_size(scale.px(52.0))
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_top)
        .map_err(render_err)?;

    let label_for = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => bars
            .get(*i as usize)
            .map(|b| b.label.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(bars.len().max(1))
        .x_label_formatter(&label_for)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .label_style((FONT, scale.font(9.0)))
        .axis_desc_style((FONT, scale.font(11.0)))
        .draw()
        .map_err(render_err)?;

    let gap = scale.px(8.0);
    ctx.draw_series(bars.iter().enumerate().map(|(i, b)| {
        let i = i as i32;
        let mut rect = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), b.height),
            ],
            to_rgb(b.color).mix(chart.opacity as f64).filled(),
        );
        rect.set_margin(0, 0, gap, gap);
        rect
    }))
    .map_err(render_err)?;
    Ok(())
}
