use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::{Table, Value};
use crate::data::stats::FiveNumberSummary;

/// Head of the dataframe, `rows` rows at most.
pub fn preview(ui: &mut Ui, table: &Table, rows: usize) {
    let rows = rows.min(table.n_rows());
    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(TableColumn::auto())
                .columns(TableColumn::auto().at_least(60.0), table.n_columns())
                .header(row_height, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("");
                    });
                    for col in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&col.name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_height, rows, |mut row| {
                        let idx = row.index();
                        row.col(|ui: &mut Ui| {
                            ui.label(idx.to_string());
                        });
                        for value in table.row(idx) {
                            row.col(|ui: &mut Ui| {
                                ui.label(value.to_string());
                            });
                        }
                    });
                });
        });
}

/// Two-column grid: statistic name and value.
pub fn five_numbers(ui: &mut Ui, column: &str, five: &FiveNumberSummary) {
    egui::Grid::new("five_numbers")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.strong("");
            ui.strong(column);
            ui.end_row();
            for (label, value) in five.rows() {
                ui.label(label);
                ui.label(format!("{value:.6}"));
                ui.end_row();
            }
        });
}

/// Share of each category, most common first.
pub fn proportions(ui: &mut Ui, column: &str, props: &[(Value, f64)]) {
    egui::Grid::new("proportions")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.strong(column);
            ui.strong("proportion");
            ui.end_row();
            for (value, share) in props {
                ui.label(value.to_string());
                ui.label(format!("{share:.6}"));
                ui.end_row();
            }
        });
}
