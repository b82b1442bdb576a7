//! Table-library adapter.
//!
//! Table libraries describe their columns with their own definitions and
//! filter rows by calling a per-column filter function. This module wires
//! a [`Column`]'s predicate into such definitions and converts the filter
//! state into the `{ id, value }` pairs tables keep per column.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::data::Column;
use crate::error::{FilterError, Result};
use crate::filter::{FilterModel, FiltersState};

/// Row predicate attached to a table column.
pub type RowFilterFn<T> = Arc<dyn Fn(&T, &FilterModel) -> Result<bool> + Send + Sync>;

/// A table library's column definition.
pub struct TableColumnDef<T> {
    pub id: String,
    pub header: String,
    /// When `false` the column is left without a filter function.
    pub enable_column_filter: bool,
    pub filter_fn: Option<RowFilterFn<T>>,
}

impl<T> TableColumnDef<T> {
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        TableColumnDef {
            id: id.into(),
            header: header.into(),
            enable_column_filter: true,
            filter_fn: None,
        }
    }

    pub fn enable_column_filter(mut self, enabled: bool) -> Self {
        self.enable_column_filter = enabled;
        self
    }

    /// Runs this column's filter function; columns without one match.
    pub fn filter_row(&self, row: &T, filter: &FilterModel) -> Result<bool> {
        match &self.filter_fn {
            Some(f) => f(row, filter),
            None => Ok(true),
        }
    }
}

impl<T> Clone for TableColumnDef<T> {
    fn clone(&self) -> Self {
        TableColumnDef {
            id: self.id.clone(),
            header: self.header.clone(),
            enable_column_filter: self.enable_column_filter,
            filter_fn: self.filter_fn.clone(),
        }
    }
}

impl<T> fmt::Debug for TableColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("enable_column_filter", &self.enable_column_filter)
            .field("filter_fn", &self.filter_fn.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Attaches each column's predicate to the matching definition.
///
/// Definitions with filtering disabled, or without a column of the same id,
/// pass through unchanged.
pub fn create_table_columns<T>(
    columns: &[Column<T>],
    defs: Vec<TableColumnDef<T>>,
) -> Vec<TableColumnDef<T>>
where
    T: Send + Sync + 'static,
{
    defs.into_iter()
        .map(|mut def| {
            if !def.enable_column_filter {
                return def;
            }
            if let Some(column) = columns.iter().find(|c| c.id() == def.id) {
                let column = column.clone();
                def.filter_fn = Some(Arc::new(move |row: &T, filter: &FilterModel| {
                    column.matches(row, filter)
                }));
            }
            def
        })
        .collect()
}

/// One entry of a table's column-filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterModel,
}

/// Converts the filter state into per-column table filter entries.
pub fn create_table_filters(filters: &FiltersState) -> Vec<ColumnFilter> {
    filters
        .iter()
        .map(|filter| ColumnFilter {
            id: filter.column_id().to_string(),
            value: filter.clone(),
        })
        .collect()
}

/// Returns the rows matching every filter, in input order.
///
/// A filter on a column that isn't in `columns` is a configuration error.
pub fn apply_filters<'a, T>(
    rows: &'a [T],
    columns: &[Column<T>],
    filters: &FiltersState,
) -> Result<Vec<&'a T>> {
    let bound = filters
        .iter()
        .map(|filter| {
            columns
                .iter()
                .find(|c| c.id() == filter.column_id())
                .map(|column| (column, filter))
                .ok_or_else(|| {
                    FilterError::config(format!("filter on unknown column '{}'", filter.column_id()))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut out = Vec::new();
    for row in rows {
        let mut keep = true;
        for (column, filter) in &bound {
            if !column.matches(row, filter)? {
                keep = false;
                break;
            }
        }
        if keep {
            out.push(row);
        }
    }
    Ok(out)
}
