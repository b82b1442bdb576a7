//! Table-filter - Typed filter model for data table filter bars.
//!
//! Table-filter is the engine behind a Linear-style filter bar: users pick a
//! column, an operator and one or more values, and the table shows the
//! matching rows. It provides:
//!
//! - Column configuration through a persistent, type-checked builder
//! - A static operator catalog per column type, with promotion and demotion
//!   between single-value and multi-value operators
//! - Derived column data: option lists, facet counts, numeric bounds
//! - Pure reducers over the filter state, plus a batching transaction
//! - Predicate functions per column type, and an adapter for table libraries
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use table_filter::{
//!     create_column_config_helper, ColumnOption, DataTableFilters,
//!     DataTableFiltersOptions, FilterOperator, FilterStrategy, FilterValues,
//! };
//!
//! struct Issue {
//!     title: String,
//!     status: &'static str,
//!     estimate: u32,
//! }
//!
//! let dtf = create_column_config_helper::<Issue>();
//! let columns = vec![
//!     dtf.text()
//!         .id("title")
//!         .accessor(|i: &Issue| i.title.clone())
//!         .display_name("Title")
//!         .build()?,
//!     dtf.option()
//!         .id("status")
//!         .accessor(|i: &Issue| i.status)
//!         .display_name("Status")
//!         .options([
//!             ColumnOption::new("todo", "Todo"),
//!             ColumnOption::new("done", "Done"),
//!         ])?
//!         .build()?,
//!     dtf.number()
//!         .id("estimate")
//!         .accessor(|i: &Issue| i.estimate)
//!         .display_name("Estimate")
//!         .build()?,
//! ];
//!
//! let data: Arc<[Issue]> = Arc::from(vec![
//!     Issue { title: "Fix login".into(), status: "todo", estimate: 3 },
//!     Issue { title: "Write docs".into(), status: "done", estimate: 1 },
//!     Issue { title: "Fix signup".into(), status: "todo", estimate: 8 },
//! ]);
//!
//! let mut table = DataTableFilters::new(
//!     DataTableFiltersOptions::new(FilterStrategy::Client, data, columns),
//! )?;
//!
//! table.actions().batch(|b| {
//!     b.add_filter_value("status", ["todo"])?;
//!     b.set_filter_value("estimate", FilterValues::number([5.0]))?;
//!     b.set_filter_operator("estimate", FilterOperator::IsLessThan)
//! })?;
//!
//! let rows = table.filtered_rows()?;
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].title, "Fix login");
//! # Ok::<(), table_filter::FilterError>(())
//! ```
//!
//! # Column Types and Operators
//!
//! | Type | Single value | Multiple values |
//! |------|--------------|-----------------|
//! | text | `contains`, `does not contain` | |
//! | number | `is`, `is not`, `is greater than`, ... | `is between`, `is not between` |
//! | date | `is`, `is not`, `is before`, `is after`, ... | `is between`, `is not between` |
//! | option | `is`, `is not` | `is any of`, `is none of` |
//! | multiOption | `include`, `exclude` | `include any of`, `include all of`, `exclude if any of`, `exclude if all` |
//! | boolean | `is`, `is not` | |
//!
//! # Vacuous Filters
//!
//! A filter without values, or a text filter with a blank string, matches
//! every row. A half-filled filter therefore never hides data.
//!
//! # Persisting State
//!
//! [`FiltersState`] serializes to plain JSON (dates as ISO-8601 strings), so
//! it can round-trip through a URL or local storage:
//!
//! ```rust
//! use table_filter::{FilterModel, FilterOperator, FilterValues, FiltersState};
//!
//! let state = FiltersState::from_filters(vec![FilterModel::new(
//!     "status",
//!     FilterOperator::IsAnyOf,
//!     FilterValues::option(["todo", "done"]),
//! )?])?;
//!
//! let json = state.to_json()?;
//! assert_eq!(FiltersState::from_json(&json)?, state);
//! # Ok::<(), table_filter::FilterError>(())
//! ```

mod actions;
mod column;
mod data;
mod data_table;
mod error;
mod filter;
mod memo;
mod operators;
mod ordering;
mod predicate;
mod table;
mod transition;
mod value;

// Re-export public API
pub use actions::{
    add_filter_value, remove_all_filters, remove_filter, remove_filter_value, set_filter_operator,
    set_filter_value,
};
pub use column::{
    create_column_config_helper, validate_unique_ids, Accessor, ColumnConfig, ColumnConfigBuilder,
    ColumnConfigHelper, ColumnDataType, ColumnOption, TransformOptionsFn, ValueToOptionFn,
};
pub use data::{create_columns, Column, FilterStrategy};
pub use data_table::{
    DataTableFilters, DataTableFiltersOptions, FacetedInput, FilterActions, FilterBatch,
    OnFiltersChange,
};
pub use error::{FilterError, Result};
pub use filter::{
    create_date_filter_value, create_number_filter_value, FilterModel, FilterValues, FiltersState,
};
pub use operators::{
    default_operators, operator_details, operators_for, operators_with_target, DefaultOperators,
    FilterOperator, OperatorDetails, OperatorTarget, BOOLEAN_OPERATORS, DATE_OPERATORS,
    MULTI_OPTION_OPERATORS, NUMBER_OPERATORS, OPTION_OPERATORS, TEXT_OPERATORS,
};
pub use ordering::{compare_by_steps, sort_options, Dir, OptionComparator, OrderKey, OrderStep};
pub use predicate::{
    boolean_filter_fn, date_filter_fn, is_vacuous, matches_value, multi_option_filter_fn,
    number_filter_fn, option_filter_fn, text_filter_fn, Operand,
};
pub use table::{
    apply_filters, create_table_columns, create_table_filters, ColumnFilter, RowFilterFn,
    TableColumnDef,
};
pub use transition::{determine_new_operator, resolve_by_count};
pub use value::{Number, Value};
