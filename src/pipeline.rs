//! Pure (table, selection, config) → (column info, chart) computation with a
//! single-entry memo, so the egui frame loop can ask for the analysis every
//! frame without recomputing it.

use std::sync::Arc;

use crate::chart::Chart;
use crate::config::{BarConfig, BarMode, ChartConfig, HistogramConfig};
use crate::data::model::{Column, ColumnKind, Table, Value};
use crate::data::stats::{
    FiveNumberSummary, Histogram, category_counts, category_means, kde_curve, value_proportions,
};
use crate::error::EdaError;
use crate::state::Selection;

/// Statistics shown above the chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnInfo {
    FiveNumbers(FiveNumberSummary),
    Proportions(Vec<(Value, f64)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub info: ColumnInfo,
    pub chart: Chart,
}

/// Compute the column statistics and chart for one selection.
pub fn analyze(
    table: &Table,
    selection: &Selection,
    config: &ChartConfig,
) -> Result<Analysis, EdaError> {
    let column = table.column(selection.name())?;
    if config.kind() != selection.kind() {
        return Err(match selection.kind() {
            ColumnKind::Numeric => EdaError::NotCategorical(column.name.clone()),
            ColumnKind::Categorical => EdaError::NotNumeric(column.name.clone()),
        });
    }
    match config {
        ChartConfig::Histogram(hist) => analyze_numeric(column, hist),
        ChartConfig::Bar(bar) => analyze_categorical(table, column, bar),
    }
}

fn analyze_numeric(column: &Column, config: &HistogramConfig) -> Result<Analysis, EdaError> {
    config.validate()?;
    let values = column.numeric_values()?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(EdaError::NonFinite(column.name.clone()));
    }
    let no_values = || EdaError::NoValues(column.name.clone());

    let five = FiveNumberSummary::of(&values).ok_or_else(no_values)?;
    let hist = Histogram::compute(&values, config.bins, config.stat).ok_or_else(no_values)?;
    let kde = if config.kde {
        let curve = kde_curve(&values, config.stat, hist.bin_width);
        if curve.is_none() {
            log::warn!(
                "Skipping density curve for '{}': needs at least two distinct values",
                column.name
            );
        }
        curve
    } else {
        None
    };

    Ok(Analysis {
        info: ColumnInfo::FiveNumbers(five),
        chart: Chart::histogram(config, &hist, kde),
    })
}

fn analyze_categorical(
    table: &Table,
    column: &Column,
    config: &BarConfig,
) -> Result<Analysis, EdaError> {
    if column.kind() != Some(ColumnKind::Categorical) {
        return Err(EdaError::NotCategorical(column.name.clone()));
    }
    let proportions = value_proportions(&column.values);
    if proportions.is_empty() {
        return Err(EdaError::NoValues(column.name.clone()));
    }

    let heights: Vec<(Value, f64)> = match config.mode {
        BarMode::Count => category_counts(&column.values)
            .into_iter()
            .map(|(v, n)| (v, n as f64))
            .collect(),
        BarMode::Bar => {
            let y_name = config.y_column.as_deref().ok_or(EdaError::NoYColumn)?;
            let y_column = table.column(y_name)?;
            if y_column.kind() != Some(ColumnKind::Numeric) {
                return Err(EdaError::NotNumeric(y_name.to_string()));
            }
            // Categories without any numeric value keep their slot, with no bar.
            category_means(&column.values, &y_column.values)
                .into_iter()
                .map(|(v, mean)| (v, mean.unwrap_or(0.0)))
                .collect()
        }
    };

    Ok(Analysis {
        info: ColumnInfo::Proportions(proportions),
        chart: Chart::categories(config, &heights),
    })
}

// ---------------------------------------------------------------------------
// Memoized pipeline
// ---------------------------------------------------------------------------

type MemoKey = (u64, Selection, ChartConfig);

/// Remembers the last inputs and result of [`analyze`].
#[derive(Default)]
pub struct Pipeline {
    key: Option<MemoKey>,
    result: Option<Result<Arc<Analysis>, EdaError>>,
    runs: usize,
}

impl Pipeline {
    /// Return the analysis for these inputs, recomputing only when they
    /// differ from the previous call.
    pub fn run(
        &mut self,
        table: &Table,
        selection: &Selection,
        config: &ChartConfig,
    ) -> Result<Arc<Analysis>, EdaError> {
        let fresh = matches!(
            &self.key,
            Some((id, sel, cfg)) if *id == table.id() && sel == selection && cfg == config
        );
        if fresh {
            if let Some(result) = &self.result {
                return result.clone();
            }
        }

        log::debug!("Recomputing analysis for {selection:?}");
        self.runs += 1;
        let result = analyze(table, selection, config).map(Arc::new);
        if let Err(e) = &result {
            log::error!("Analysis failed: {e}");
        }
        self.key = Some((table.id(), selection.clone(), config.clone()));
        self.result = Some(result.clone());
        result
    }

    /// How many times the analysis was actually computed.
    #[cfg(test)]
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartBody;
    use crate::data::loader::load_csv;
    use crate::data::stats::Stat;
    use crate::settings::Settings;

    fn people() -> Table {
        load_csv("age,city\n25,A\n30,B\n25,A\n".as_bytes(), "people").unwrap()
    }

    fn numeric(table: &Table, name: &str) -> (Selection, ChartConfig) {
        let sel = Selection::resolve(table, ColumnKind::Numeric, Some(name)).unwrap();
        let cfg = ChartConfig::default_for(&sel, table, &Settings::default());
        (sel, cfg)
    }

    fn categorical(table: &Table, name: &str) -> (Selection, ChartConfig) {
        let sel = Selection::resolve(table, ColumnKind::Categorical, Some(name)).unwrap();
        let cfg = ChartConfig::default_for(&sel, table, &Settings::default());
        (sel, cfg)
    }

    #[test]
    fn numeric_age_with_five_bins() {
        let table = people();
        let (sel, mut cfg) = numeric(&table, "age");
        if let ChartConfig::Histogram(h) = &mut cfg {
            h.bins = 5;
        }
        let analysis = analyze(&table, &sel, &cfg).unwrap();

        let ColumnInfo::FiveNumbers(five) = analysis.info else {
            panic!("expected a five-number summary");
        };
        assert_eq!(five.min, 25.0);
        assert_eq!(five.median, 25.0);
        assert_eq!(five.max, 30.0);
        assert_eq!(analysis.chart.bar_count(), 5);
    }

    #[test]
    fn categorical_city_proportions() {
        let table = people();
        let (sel, cfg) = categorical(&table, "city");
        let analysis = analyze(&table, &sel, &cfg).unwrap();

        let ColumnInfo::Proportions(props) = &analysis.info else {
            panic!("expected proportions");
        };
        assert_eq!(props[0].0, Value::String("A".into()));
        assert!((props[0].1 - 0.667).abs() < 1e-3);
        assert!((props[1].1 - 0.333).abs() < 1e-3);
    }

    #[test]
    fn bar_mode_plots_mean_per_category() {
        let table = people();
        let (sel, cfg) = categorical(&table, "city");
        let analysis = analyze(&table, &sel, &cfg).unwrap();

        assert_eq!(analysis.chart.y_label, "age");
        let ChartBody::Categories { bars } = &analysis.chart.body else {
            panic!("expected category bars");
        };
        let heights: Vec<(&str, f64)> = bars.iter().map(|b| (b.label.as_str(), b.height)).collect();
        assert_eq!(heights, vec![("A", 25.0), ("B", 30.0)]);
    }

    #[test]
    fn count_mode_plots_frequencies_with_y_label() {
        let table = people();
        let (sel, mut cfg) = categorical(&table, "city");
        if let ChartConfig::Bar(b) = &mut cfg {
            b.set_mode(BarMode::Count);
            b.y_label = "Residents".into();
        }
        let analysis = analyze(&table, &sel, &cfg).unwrap();

        assert_eq!(analysis.chart.y_label, "Residents");
        let ChartBody::Categories { bars } = &analysis.chart.body else {
            panic!("expected category bars");
        };
        assert_eq!(bars.iter().map(|b| b.height).collect::<Vec<_>>(), vec![2.0, 1.0]);
    }

    #[test]
    fn bar_mode_without_numeric_column_is_an_error() {
        let table = load_csv("city\nA\n".as_bytes(), "t").unwrap();
        let sel = Selection::resolve(&table, ColumnKind::Categorical, None).unwrap();
        let mut cfg = BarConfig::for_column("city", &table, &Settings::default());
        cfg.mode = BarMode::Bar;
        let err = analyze(&table, &sel, &ChartConfig::Bar(cfg)).unwrap_err();
        assert_eq!(err, EdaError::NoYColumn);
    }

    #[test]
    fn all_missing_numeric_column_is_an_error() {
        let table = load_csv("gap,city\n,A\n,B\n".as_bytes(), "t").unwrap();
        let (sel, cfg) = numeric(&table, "gap");
        let err = analyze(&table, &sel, &cfg).unwrap_err();
        assert_eq!(err, EdaError::NoValues("gap".into()));
    }

    #[test]
    fn infinite_values_are_rejected_before_binning() {
        let table = load_csv("x\n1\n2\ninf\n".as_bytes(), "t").unwrap();
        let (sel, cfg) = numeric(&table, "x");
        let err = analyze(&table, &sel, &cfg).unwrap_err();
        assert_eq!(err, EdaError::NonFinite("x".into()));
    }

    #[test]
    fn proportions_are_shares_of_all_rows() {
        let table = load_csv("city,age\nA,1\n,2\nB,3\nB,4\n".as_bytes(), "t").unwrap();
        let (sel, cfg) = categorical(&table, "city");
        let analysis = analyze(&table, &sel, &cfg).unwrap();

        let ColumnInfo::Proportions(props) = &analysis.info else {
            panic!("expected proportions");
        };
        assert_eq!(
            props,
            &vec![
                (Value::String("B".into()), 0.5),
                (Value::String("A".into()), 0.25),
            ]
        );
    }

    #[test]
    fn bar_mode_keeps_discovery_order() {
        let table = load_csv("city,age\nA,1\nB,\nC,2\nB,3\nD,\n".as_bytes(), "t").unwrap();
        let (sel, cfg) = categorical(&table, "city");
        let analysis = analyze(&table, &sel, &cfg).unwrap();

        let ChartBody::Categories { bars } = &analysis.chart.body else {
            panic!("expected category bars");
        };
        let heights: Vec<(&str, f64)> = bars.iter().map(|b| (b.label.as_str(), b.height)).collect();
        assert_eq!(heights, vec![("A", 1.0), ("B", 3.0), ("C", 2.0), ("D", 0.0)]);
    }

    #[test]
    fn kde_overlay_is_attached_on_request() {
        let table = load_csv("x\n1\n2\n2\n3\n7\n".as_bytes(), "t").unwrap();
        let (sel, mut cfg) = numeric(&table, "x");
        if let ChartConfig::Histogram(h) = &mut cfg {
            h.kde = true;
            h.stat = Stat::Density;
        }
        let analysis = analyze(&table, &sel, &cfg).unwrap();
        let ChartBody::Histogram { kde, .. } = &analysis.chart.body else {
            panic!("expected a histogram");
        };
        assert!(kde.is_some());
    }

    #[test]
    fn mismatched_config_is_rejected() {
        let table = people();
        let (sel, _) = numeric(&table, "age");
        let (_, bar_cfg) = categorical(&table, "city");
        assert_eq!(
            analyze(&table, &sel, &bar_cfg).unwrap_err(),
            EdaError::NotCategorical("age".into())
        );
    }

    #[test]
    fn memo_skips_unchanged_inputs() {
        let table = people();
        let (sel, mut cfg) = numeric(&table, "age");
        let mut pipeline = Pipeline::default();

        let first = pipeline.run(&table, &sel, &cfg).unwrap();
        let second = pipeline.run(&table, &sel, &cfg).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(pipeline.runs(), 1);

        if let ChartConfig::Histogram(h) = &mut cfg {
            h.title = "Ages".into();
        }
        let third = pipeline.run(&table, &sel, &cfg).unwrap();
        assert_eq!(third.chart.title, "Ages");
        assert_eq!(pipeline.runs(), 2);
    }

    #[test]
    fn memo_recomputes_for_a_new_table() {
        let mut pipeline = Pipeline::default();
        let a = people();
        let b = people();
        let (sel, cfg) = numeric(&a, "age");

        pipeline.run(&a, &sel, &cfg).unwrap();
        pipeline.run(&b, &sel, &cfg).unwrap();
        assert_eq!(pipeline.runs(), 2);
    }

    #[test]
    fn memo_caches_errors_too() {
        let table = load_csv("gap\n\n".as_bytes(), "t").unwrap();
        let (sel, cfg) = numeric(&table, "gap");
        let mut pipeline = Pipeline::default();

        assert!(pipeline.run(&table, &sel, &cfg).is_err());
        assert!(pipeline.run(&table, &sel, &cfg).is_err());
        assert_eq!(pipeline.runs(), 1);
    }
}
