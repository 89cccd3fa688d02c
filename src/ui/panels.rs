use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::Rgb;
use crate::config::{BarMode, ChartConfig, MAX_BINS, MIN_BINS};
use crate::data::model::ColumnKind;
use crate::data::stats::Stat;
use crate::export;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – dataset options
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dataset Options");
    ui.separator();

    ui.strong("File Upload");
    if ui.button("Open a CSV…").clicked() {
        open_file_dialog(state);
    }

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let n_rows = dataset.n_rows();
    ui.label(format!("{} ({n_rows} rows)", dataset.name));

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Preview ----
            ui.checkbox(&mut state.preview, "Preview Dataframe");
            if state.preview && n_rows > 0 {
                ui.add(
                    egui::Slider::new(&mut state.preview_rows, 1..=n_rows)
                        .text("How many rows do you want to see?"),
                );
            }
            ui.separator();

            // ---- Column selection ----
            ui.strong("Column Selection");
            column_selection(ui, state);
            ui.separator();

            // ---- Graph options ----
            ui.strong("Graph Options");
            let numeric_columns: Vec<String> = state
                .dataset
                .as_ref()
                .map(|ds| {
                    ds.columns_of_kind(ColumnKind::Numeric)
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            if state.config.is_some() {
                graph_options(ui, state, &numeric_columns);
            } else {
                ui.label(format!(
                    "This dataset has no {} columns.",
                    state.kind.to_string().to_lowercase()
                ));
            }
        });
}

fn column_selection(ui: &mut Ui, state: &mut AppState) {
    let mut kind = state.kind;
    egui::ComboBox::from_label("Column Type")
        .selected_text(kind.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for k in ColumnKind::ALL {
                ui.selectable_value(&mut kind, k, k.to_string());
            }
        });
    state.set_kind(kind);

    let candidates: Vec<String> = state
        .dataset
        .as_ref()
        .map(|ds| {
            ds.columns_of_kind(state.kind)
                .into_iter()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let current = state
        .selection
        .as_ref()
        .map(|s| s.name().to_string())
        .unwrap_or_default();

    let mut picked: Option<String> = None;
    egui::ComboBox::from_label("Column Name")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &candidates {
                if ui.selectable_label(current == *col, col).clicked() {
                    picked = Some(col.clone());
                }
            }
        });
    if let Some(col) = picked {
        state.select_column(&col);
    }
}

fn graph_options(ui: &mut Ui, state: &mut AppState, numeric_columns: &[String]) {
    match &mut state.config {
        Some(ChartConfig::Histogram(h)) => {
            ui.label("Set Title");
            ui.text_edit_singleline(&mut h.title);
            ui.label("Set X-Axis Title");
            ui.text_edit_singleline(&mut h.x_label);

            egui::ComboBox::from_label("Type of histogram")
                .selected_text(h.stat.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for stat in Stat::ALL {
                        ui.selectable_value(&mut h.stat, stat, stat.label());
                    }
                });
            ui.checkbox(&mut h.kde, "Kernel Density Estimate");
            ui.add(egui::Slider::new(&mut h.bins, MIN_BINS..=MAX_BINS).text("Number of Bins"));

            ui.horizontal(|ui: &mut Ui| {
                let mut rgb = [h.color.0, h.color.1, h.color.2];
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    h.color = Rgb(rgb[0], rgb[1], rgb[2]);
                }
                ui.label("Pick a color");
            });
            ui.add(
                egui::Slider::new(&mut h.opacity, 0.0..=1.0)
                    .step_by(0.05)
                    .text("Bar Opacity"),
            );
        }
        Some(ChartConfig::Bar(b)) => {
            let mut countplot = b.mode == BarMode::Count;
            if ui.checkbox(&mut countplot, "Countplot").changed() {
                b.set_mode(if countplot { BarMode::Count } else { BarMode::Bar });
            }

            if b.mode == BarMode::Bar {
                let current = b.y_column.clone().unwrap_or_default();
                let mut picked: Option<String> = None;
                egui::ComboBox::from_label("Y-Axis")
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        for col in numeric_columns {
                            if ui.selectable_label(current == *col, col).clicked() {
                                picked = Some(col.clone());
                            }
                        }
                    });
                if let Some(col) = picked {
                    b.set_y_column(col);
                }
            }

            ui.label("Set Title");
            ui.text_edit_singleline(&mut b.title);
            ui.label("Set X-Axis Title");
            ui.text_edit_singleline(&mut b.x_label);
            ui.label("Set Y-Axis Title");
            ui.text_edit_singleline(&mut b.y_label);
            ui.add(
                egui::Slider::new(&mut b.opacity, 0.0..=1.0)
                    .step_by(0.05)
                    .text("Bar Opacity"),
            );
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} rows × {} columns",
                ds.name,
                ds.n_rows(),
                ds.n_columns()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a CSV")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with {} columns from {}",
                    dataset.n_rows(),
                    dataset.n_columns(),
                    path.display()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Ask where to save the current chart and write the exported PNG there.
pub fn download_dialog(state: &mut AppState) {
    let Some(config) = &state.config else {
        return;
    };
    let suggested = format!("{}.png", export::file_stem(config.title()));
    let dest = rfd::FileDialog::new()
        .set_title("Download Image")
        .set_file_name(suggested.as_str())
        .add_filter("PNG image", &["png"])
        .save_file();

    if let Some(dest) = dest {
        match state.download_to(&dest) {
            Ok(_) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export chart: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
