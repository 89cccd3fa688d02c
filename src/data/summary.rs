use super::model::{ColumnType, Table};

/// Shape and dtype overview of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub n_columns: usize,
    pub n_rows: usize,
    /// Columns per dtype, most common first; ties keep first-appearance order.
    pub dtype_counts: Vec<(ColumnType, usize)>,
}

impl DatasetSummary {
    pub fn of(table: &Table) -> Self {
        let mut dtype_counts: Vec<(ColumnType, usize)> = Vec::new();
        for col in table.columns() {
            match dtype_counts.iter_mut().find(|(t, _)| *t == col.dtype) {
                Some((_, n)) => *n += 1,
                None => dtype_counts.push((col.dtype, 1)),
            }
        }
        // Stable sort keeps discovery order among equal counts.
        dtype_counts.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            n_columns: table.n_columns(),
            n_rows: table.n_rows(),
            dtype_counts,
        }
    }

    /// The lines shown under "Basic Info".
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("There are {} columns in your dataset.", self.n_columns),
            format!("There are {} rows in your dataset.", self.n_rows),
        ];
        lines.extend(
            self.dtype_counts
                .iter()
                .map(|(dtype, n)| format!("The number of {dtype} objects is {n}.")),
        );
        lines
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::loader::load_csv;
    use crate::data::model::Column;

    #[test]
    fn summarises_age_city_table() {
        let table = load_csv("age,city\n25,A\n30,B\n25,A\n".as_bytes(), "t").unwrap();
        let summary = DatasetSummary::of(&table);

        assert_eq!(summary.n_columns, 2);
        assert_eq!(summary.n_rows, 3);
        assert_eq!(
            summary.dtype_counts,
            vec![(ColumnType::Int64, 1), (ColumnType::Object, 1)]
        );
        assert_eq!(summary.lines()[2], "The number of int64 objects is 1.");
    }

    #[test]
    fn most_common_dtype_first() {
        let table = load_csv("a,b,c\nx,1.5,2.5\ny,3,4\n".as_bytes(), "t").unwrap();
        let summary = DatasetSummary::of(&table);
        assert_eq!(
            summary.dtype_counts,
            vec![(ColumnType::Float64, 2), (ColumnType::Object, 1)]
        );
    }

    #[test]
    fn empty_table() {
        let table = Table::new("empty", vec![]).unwrap();
        let summary = DatasetSummary::of(&table);
        assert_eq!(summary.n_columns, 0);
        assert_eq!(summary.n_rows, 0);
        assert!(summary.dtype_counts.is_empty());
    }

    proptest! {
        #[test]
        fn counts_match_table_shape(
            cells in prop::collection::vec(
                prop::collection::vec("[a-c0-9]{0,3}", 4),
                1..6,
            )
        ) {
            // `cells` is column-major: each inner vec is one column of 4 rows.
            let columns: Vec<Column> = cells
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let raw: Vec<&str> = col.iter().map(String::as_str).collect();
                    Column::from_text_cells(format!("c{i}"), &raw)
                })
                .collect();
            let table = Table::new("p", columns).unwrap();
            let summary = DatasetSummary::of(&table);

            prop_assert_eq!(summary.n_columns, cells.len());
            prop_assert_eq!(summary.n_rows, 4);
            let total: usize = summary.dtype_counts.iter().map(|(_, n)| n).sum();
            prop_assert_eq!(total, summary.n_columns);
        }
    }
}
