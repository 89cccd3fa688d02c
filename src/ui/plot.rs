use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::chart::{Chart, ChartBody};
use crate::pipeline::ColumnInfo;
use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// Central panel: summary, column info, chart
// ---------------------------------------------------------------------------

/// Render the main panel.
pub fn main_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Rusty EDA");

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Open a CSV file to get started  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(summary) = &state.summary {
                ui.heading("Basic Info:");
                for line in summary.lines() {
                    ui.label(line);
                }
                ui.separator();
            }

            if state.preview {
                if let Some(ds) = &state.dataset {
                    ui.heading(format!("{} Dataframe:", ds.name));
                    table::preview(ui, ds, state.preview_rows);
                    ui.separator();
                }
            }

            let Some(selection) = state.selection.clone() else {
                ui.label(format!(
                    "This dataset has no {} columns.",
                    state.kind.to_string().to_lowercase()
                ));
                return;
            };

            let analysis = match state.analysis() {
                Some(Ok(analysis)) => analysis,
                Some(Err(e)) => {
                    ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
                    return;
                }
                None => return,
            };

            ui.heading(format!("{} Info:", selection.name()));
            match &analysis.info {
                ColumnInfo::FiveNumbers(five) => table::five_numbers(ui, selection.name(), five),
                ColumnInfo::Proportions(props) => table::proportions(ui, selection.name(), props),
            }
            ui.separator();

            ui.heading("Graph:");
            chart_plot(ui, &analysis.chart);

            if ui.button("Download Image").clicked() {
                panels::download_dialog(state);
            }
        });
}

/// Draw a chart with `egui_plot`.
pub fn chart_plot(ui: &mut Ui, chart: &Chart) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(&chart.title).strong().size(16.0));
    });

    let plot = Plot::new("chart_plot")
        .height(420.0)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false);

    match &chart.body {
        ChartBody::Histogram { bars, fill, kde } => {
            let plot_bars: Vec<Bar> = bars
                .iter()
                .map(|b| {
                    Bar::new((b.left + b.right) / 2.0, b.height)
                        .width(b.right - b.left)
                        .fill(fill.with_opacity(chart.opacity))
                        .stroke(egui::Stroke::new(0.5, Color32::WHITE))
                })
                .collect();
            let curve = kde.as_ref().map(|points| {
                let points: PlotPoints = points.iter().map(|&(x, y)| [x, y]).collect();
                Line::new(points).color(fill.to_color32()).width(2.0)
            });

            plot.show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(plot_bars));
                if let Some(line) = curve {
                    plot_ui.line(line);
                }
            });
        }
        ChartBody::Categories { bars } => {
            let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
            let plot_bars: Vec<Bar> = bars
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    Bar::new(i as f64, b.height)
                        .width(0.8)
                        .name(&b.label)
                        .fill(b.color.with_opacity(chart.opacity))
                })
                .collect();

            plot.x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(plot_bars));
            });
        }
    }
}
