//! Filter orchestration for one table.
//!
//! [`DataTableFilters`] ties a dataset, a set of column configs and the
//! filter state together. It hands out [`Column`]s (rebuilt only when one
//! of their inputs changes), exposes the filter reducers through
//! [`FilterActions`], and commits every change as one state update.
//!
//! # State ownership
//!
//! Uncontrolled (the default): the instance owns the state, seeded from
//! `default_filters`.
//!
//! Controlled: the host owns the state. It passes the current `filters`
//! together with an [`OnFiltersChange`] handler; actions only call the
//! handler, and the host feeds the accepted state back through
//! [`DataTableFilters::sync_filters`]. Supplying only one of the two is a
//! configuration error.
//!
//! ```
//! use std::sync::Arc;
//! use table_filter::{
//!     create_column_config_helper, ColumnOption, DataTableFilters,
//!     DataTableFiltersOptions, FilterStrategy,
//! };
//!
//! struct Issue {
//!     status: &'static str,
//! }
//!
//! let dtf = create_column_config_helper::<Issue>();
//! let status = dtf
//!     .option()
//!     .id("status")
//!     .accessor(|i: &Issue| i.status)
//!     .display_name("Status")
//!     .options([ColumnOption::new("todo", "Todo"), ColumnOption::new("done", "Done")])?
//!     .build()?;
//!
//! let data: Arc<[Issue]> = Arc::from(vec![
//!     Issue { status: "todo" },
//!     Issue { status: "done" },
//! ]);
//! let mut table = DataTableFilters::new(
//!     DataTableFiltersOptions::new(FilterStrategy::Client, data, vec![status]),
//! )?;
//!
//! table.actions().add_filter_value("status", ["todo"])?;
//! assert_eq!(table.filtered_rows()?.len(), 1);
//! # Ok::<(), table_filter::FilterError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::actions;
use crate::column::{validate_unique_ids, ColumnConfig, ColumnDataType, ColumnOption};
use crate::data::{Column, FilterStrategy};
use crate::error::{FilterError, Result};
use crate::filter::{FilterValues, FiltersState};
use crate::memo::Memo;
use crate::operators::FilterOperator;
use crate::table::apply_filters;

/// Externally computed facet data for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetedInput {
    /// Occurrence count per option value (option and multi-option columns).
    Options(HashMap<String, usize>),
    /// `(min, max)` bounds (number columns).
    MinMax(f64, f64),
}

/// Handler notified of state changes in controlled mode.
#[derive(Clone)]
pub enum OnFiltersChange {
    /// Receives the next state only.
    Simple(Arc<dyn Fn(&FiltersState) + Send + Sync>),
    /// Receives the previous and the next state.
    WithPrev(Arc<dyn Fn(&FiltersState, &FiltersState) + Send + Sync>),
}

impl OnFiltersChange {
    pub fn simple<F>(f: F) -> Self
    where
        F: Fn(&FiltersState) + Send + Sync + 'static,
    {
        OnFiltersChange::Simple(Arc::new(f))
    }

    pub fn with_prev<F>(f: F) -> Self
    where
        F: Fn(&FiltersState, &FiltersState) + Send + Sync + 'static,
    {
        OnFiltersChange::WithPrev(Arc::new(f))
    }

    fn notify(&self, prev: &FiltersState, next: &FiltersState) {
        match self {
            OnFiltersChange::Simple(f) => f(next),
            OnFiltersChange::WithPrev(f) => f(prev, next),
        }
    }
}

impl fmt::Debug for OnFiltersChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnFiltersChange::Simple(_) => f.write_str("Simple(..)"),
            OnFiltersChange::WithPrev(_) => f.write_str("WithPrev(..)"),
        }
    }
}

/// Construction parameters for [`DataTableFilters`].
pub struct DataTableFiltersOptions<T> {
    strategy: FilterStrategy,
    data: Arc<[T]>,
    columns_config: Vec<ColumnConfig<T>>,
    default_filters: Option<FiltersState>,
    filters: Option<FiltersState>,
    on_filters_change: Option<OnFiltersChange>,
    options: HashMap<String, Vec<ColumnOption>>,
    faceted: HashMap<String, FacetedInput>,
}

impl<T> DataTableFiltersOptions<T> {
    pub fn new(strategy: FilterStrategy, data: Arc<[T]>, columns_config: Vec<ColumnConfig<T>>) -> Self {
        DataTableFiltersOptions {
            strategy,
            data,
            columns_config,
            default_filters: None,
            filters: None,
            on_filters_change: None,
            options: HashMap::new(),
            faceted: HashMap::new(),
        }
    }

    /// Initial state in uncontrolled mode.
    pub fn with_default_filters(mut self, filters: FiltersState) -> Self {
        self.default_filters = Some(filters);
        self
    }

    /// Host-owned state. Must be paired with [`Self::with_on_filters_change`].
    pub fn with_filters(mut self, filters: FiltersState) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_on_filters_change(mut self, handler: OnFiltersChange) -> Self {
        self.on_filters_change = Some(handler);
        self
    }

    /// Controlled mode: host-owned state and its change handler.
    pub fn with_controlled(self, filters: FiltersState, handler: OnFiltersChange) -> Self {
        self.with_filters(filters).with_on_filters_change(handler)
    }

    /// Options for one column, overriding its configured options.
    pub fn with_options<I>(mut self, column_id: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = ColumnOption>,
    {
        self.options
            .insert(column_id.into(), options.into_iter().collect());
        self
    }

    /// Facet data for one column.
    pub fn with_faceted(mut self, column_id: impl Into<String>, faceted: FacetedInput) -> Self {
        self.faceted.insert(column_id.into(), faceted);
        self
    }
}

type ColumnDeps<T> = (
    Arc<[T]>,
    Arc<[ColumnConfig<T>]>,
    FilterStrategy,
    Arc<HashMap<String, Arc<[ColumnOption]>>>,
    Arc<HashMap<String, FacetedInput>>,
);

/// Filter state and columns of one table.
pub struct DataTableFilters<T> {
    strategy: FilterStrategy,
    data: Arc<[T]>,
    configs: Arc<[ColumnConfig<T>]>,
    options: Arc<HashMap<String, Arc<[ColumnOption]>>>,
    faceted: Arc<HashMap<String, FacetedInput>>,
    columns: Memo<ColumnDeps<T>, Arc<[Column<T>]>>,
    filters: FiltersState,
    on_filters_change: Option<OnFiltersChange>,
}

impl<T> DataTableFilters<T> {
    pub fn new(options: DataTableFiltersOptions<T>) -> Result<Self> {
        let controlled = match (options.filters, options.on_filters_change) {
            (Some(filters), Some(handler)) => Some((filters, handler)),
            (None, None) => None,
            _ => {
                return Err(FilterError::config(
                    "filters and onFiltersChange must be supplied together",
                ))
            }
        };
        validate_unique_ids(&options.columns_config)?;

        let (filters, on_filters_change) = match controlled {
            Some((filters, handler)) => (filters, Some(handler)),
            None => (options.default_filters.unwrap_or_default(), None),
        };

        tracing::debug!(
            strategy = %options.strategy,
            columns = options.columns_config.len(),
            controlled = on_filters_change.is_some(),
            "data table filters created"
        );

        Ok(DataTableFilters {
            strategy: options.strategy,
            data: options.data,
            configs: options.columns_config.into(),
            options: Arc::new(
                options
                    .options
                    .into_iter()
                    .map(|(id, opts)| (id, Arc::from(opts)))
                    .collect(),
            ),
            faceted: Arc::new(options.faceted),
            columns: Memo::new(),
            filters,
            on_filters_change,
        })
    }

    pub fn strategy(&self) -> FilterStrategy {
        self.strategy
    }

    pub fn data(&self) -> &Arc<[T]> {
        &self.data
    }

    /// Current filter state.
    pub fn filters(&self) -> &FiltersState {
        &self.filters
    }

    pub fn is_controlled(&self) -> bool {
        self.on_filters_change.is_some()
    }

    /// Columns bound to the current data, with injected options and facets.
    ///
    /// The same columns (and their caches) are returned until the data,
    /// configs, strategy, options or facets change.
    pub fn columns(&self) -> Arc<[Column<T>]> {
        let deps = (
            Arc::clone(&self.data),
            Arc::clone(&self.configs),
            self.strategy,
            Arc::clone(&self.options),
            Arc::clone(&self.faceted),
        );
        self.columns.get_or_init(deps, || {
            tracing::debug!(columns = self.configs.len(), rows = self.data.len(), "building columns");
            self.configs
                .iter()
                .map(|config| Column::new(self.inject(config), Arc::clone(&self.data), self.strategy))
                .collect()
        })
    }

    /// The column with `id`, if configured.
    pub fn column(&self, id: &str) -> Option<Column<T>> {
        self.columns().iter().find(|c| c.id() == id).cloned()
    }

    /// Replaces the dataset.
    pub fn set_data(&mut self, data: Arc<[T]>) {
        self.data = data;
    }

    /// Replaces the column configs. Ids must be unique.
    pub fn set_columns_config(&mut self, configs: Vec<ColumnConfig<T>>) -> Result<()> {
        validate_unique_ids(&configs)?;
        self.configs = configs.into();
        Ok(())
    }

    /// Adopts host-owned state in controlled mode.
    ///
    /// In uncontrolled mode this replaces the owned state without notifying.
    pub fn sync_filters(&mut self, filters: FiltersState) {
        self.filters = filters;
    }

    /// Filter operations that commit to this table.
    pub fn actions(&mut self) -> FilterActions<'_, T> {
        FilterActions { table: self }
    }

    /// Rows matching every active filter, in data order.
    pub fn filtered_rows(&self) -> Result<Vec<&T>> {
        apply_filters(&self.data, &self.columns(), &self.filters)
    }

    fn config(&self, column_id: &str) -> Result<&ColumnConfig<T>> {
        find_config(&self.configs, column_id)
    }

    fn inject(&self, config: &ColumnConfig<T>) -> ColumnConfig<T> {
        let mut config = config.clone();
        let data_type = config.data_type();

        if let Some(options) = self.options.get(config.id()) {
            if data_type.is_option_like() {
                config = config.with_static_options(Arc::clone(options));
            } else {
                tracing::warn!(column_id = %config.id(), %data_type, "ignoring options for a column without options");
            }
        }

        match (self.faceted.get(config.id()), data_type) {
            (Some(FacetedInput::Options(counts)), t) if t.is_option_like() => {
                config = config.with_faceted_options(Arc::new(counts.clone()));
            }
            (Some(FacetedInput::MinMax(min, max)), ColumnDataType::Number) => {
                config = config.with_bounds(*min, *max);
            }
            (Some(_), _) => {
                tracing::warn!(column_id = %config.id(), %data_type, "ignoring faceted data of the wrong shape");
            }
            (None, _) => {}
        }

        config
    }

    fn commit(&mut self, next: FiltersState) {
        let prev = &self.filters;
        tracing::debug!(
            before = prev.len(),
            after = next.len(),
            controlled = self.on_filters_change.is_some(),
            "filters changed"
        );
        match &self.on_filters_change {
            Some(handler) => handler.notify(prev, &next),
            None => self.filters = next,
        }
    }
}

impl<T> fmt::Debug for DataTableFilters<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTableFilters")
            .field("strategy", &self.strategy)
            .field("rows", &self.data.len())
            .field("configs", &self.configs)
            .field("filters", &self.filters)
            .field("on_filters_change", &self.on_filters_change)
            .finish()
    }
}

fn find_config<'a, T>(configs: &'a [ColumnConfig<T>], column_id: &str) -> Result<&'a ColumnConfig<T>> {
    configs
        .iter()
        .find(|c| c.id() == column_id)
        .ok_or_else(|| FilterError::config(format!("unknown column '{column_id}'")))
}

/// Filter operations bound to a [`DataTableFilters`].
///
/// Every call computes the next state and commits it immediately. Use
/// [`FilterActions::batch`] to commit several edits as one change.
pub struct FilterActions<'a, T> {
    table: &'a mut DataTableFilters<T>,
}

impl<T> FilterActions<'_, T> {
    pub fn add_filter_value<I, S>(&mut self, column_id: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next = actions::add_filter_value(&self.table.filters, self.table.config(column_id)?, values)?;
        self.table.commit(next);
        Ok(())
    }

    pub fn remove_filter_value<I, S>(&mut self, column_id: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next =
            actions::remove_filter_value(&self.table.filters, self.table.config(column_id)?, values)?;
        self.table.commit(next);
        Ok(())
    }

    pub fn set_filter_value(&mut self, column_id: &str, values: FilterValues) -> Result<()> {
        let next = actions::set_filter_value(&self.table.filters, self.table.config(column_id)?, values)?;
        self.table.commit(next);
        Ok(())
    }

    pub fn set_filter_operator(&mut self, column_id: &str, operator: FilterOperator) -> Result<()> {
        let next = actions::set_filter_operator(&self.table.filters, column_id, operator)?;
        self.table.commit(next);
        Ok(())
    }

    pub fn remove_filter(&mut self, column_id: &str) {
        let next = actions::remove_filter(&self.table.filters, column_id);
        self.table.commit(next);
    }

    pub fn remove_all_filters(&mut self) {
        let next = actions::remove_all_filters(&self.table.filters);
        self.table.commit(next);
    }

    /// Runs several edits against a working copy of the state and commits
    /// the result once.
    ///
    /// If `edit` fails nothing is committed.
    pub fn batch<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut FilterBatch<'_, T>) -> Result<()>,
    {
        let mut batch = FilterBatch {
            configs: &self.table.configs,
            state: self.table.filters.clone(),
        };
        edit(&mut batch)?;
        let next = batch.state;
        tracing::debug!(filters = next.len(), "batch committed");
        self.table.commit(next);
        Ok(())
    }
}

/// Working copy of the filter state inside [`FilterActions::batch`].
pub struct FilterBatch<'a, T> {
    configs: &'a [ColumnConfig<T>],
    state: FiltersState,
}

impl<T> FilterBatch<'_, T> {
    /// The accumulated state so far.
    pub fn filters(&self) -> &FiltersState {
        &self.state
    }

    pub fn add_filter_value<I, S>(&mut self, column_id: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = find_config(self.configs, column_id)?;
        self.state = actions::add_filter_value(&self.state, config, values)?;
        Ok(())
    }

    pub fn remove_filter_value<I, S>(&mut self, column_id: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = find_config(self.configs, column_id)?;
        self.state = actions::remove_filter_value(&self.state, config, values)?;
        Ok(())
    }

    pub fn set_filter_value(&mut self, column_id: &str, values: FilterValues) -> Result<()> {
        let config = find_config(self.configs, column_id)?;
        self.state = actions::set_filter_value(&self.state, config, values)?;
        Ok(())
    }

    pub fn set_filter_operator(&mut self, column_id: &str, operator: FilterOperator) -> Result<()> {
        self.state = actions::set_filter_operator(&self.state, column_id, operator)?;
        Ok(())
    }

    pub fn remove_filter(&mut self, column_id: &str) {
        self.state = actions::remove_filter(&self.state, column_id);
    }

    pub fn remove_all_filters(&mut self) {
        self.state = actions::remove_all_filters(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnConfigBuilder;
    use std::sync::Mutex;

    struct Issue {
        status: &'static str,
        points: u32,
    }

    fn data() -> Arc<[Issue]> {
        Arc::from(vec![
            Issue { status: "todo", points: 1 },
            Issue { status: "done", points: 5 },
            Issue { status: "todo", points: 8 },
        ])
    }

    fn configs() -> Vec<ColumnConfig<Issue>> {
        vec![
            ColumnConfigBuilder::option()
                .id("status")
                .accessor(|i: &Issue| i.status)
                .display_name("Status")
                .options([ColumnOption::new("todo", "Todo"), ColumnOption::new("done", "Done")])
                .unwrap()
                .build()
                .unwrap(),
            ColumnConfigBuilder::number()
                .id("points")
                .accessor(|i: &Issue| i.points)
                .display_name("Points")
                .build()
                .unwrap(),
        ]
    }

    fn table() -> DataTableFilters<Issue> {
        DataTableFilters::new(DataTableFiltersOptions::new(FilterStrategy::Client, data(), configs())).unwrap()
    }

    #[test]
    fn controlled_mode_is_all_or_nothing() {
        let only_filters = DataTableFiltersOptions::new(FilterStrategy::Client, data(), configs())
            .with_filters(FiltersState::new());
        assert!(matches!(DataTableFilters::new(only_filters), Err(FilterError::Config(_))));

        let only_handler = DataTableFiltersOptions::new(FilterStrategy::Client, data(), configs())
            .with_on_filters_change(OnFiltersChange::simple(|_| {}));
        assert!(DataTableFilters::new(only_handler).is_err());
    }

    #[test]
    fn duplicate_column_ids_fail() {
        let mut configs = configs();
        configs.push(configs[0].clone());
        let options = DataTableFiltersOptions::new(FilterStrategy::Client, data(), configs);
        assert!(DataTableFilters::new(options).is_err());
    }

    #[test]
    fn uncontrolled_actions_update_state() {
        let mut table = table();
        table.actions().add_filter_value("status", ["todo"]).unwrap();
        assert_eq!(table.filters().len(), 1);
        assert_eq!(table.filtered_rows().unwrap().len(), 2);

        table.actions().remove_filter("status");
        assert!(table.filters().is_empty());
        assert_eq!(table.filtered_rows().unwrap().len(), 3);
    }

    #[test]
    fn unknown_column_is_config_error() {
        let mut table = table();
        let err = table.actions().add_filter_value("assignee", ["me"]).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: unknown column 'assignee'");
    }

    #[test]
    fn controlled_actions_only_notify() {
        let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let handler = OnFiltersChange::with_prev(move |prev, next| {
            sink.lock().unwrap().push((prev.len(), next.len()));
        });
        let options = DataTableFiltersOptions::new(FilterStrategy::Client, data(), configs())
            .with_controlled(FiltersState::new(), handler);
        let mut table = DataTableFilters::new(options).unwrap();

        table.actions().add_filter_value("status", ["todo"]).unwrap();
        assert!(table.filters().is_empty());
        assert_eq!(*seen.lock().unwrap(), [(0, 1)]);
    }

    #[test]
    fn batch_commits_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let handler = OnFiltersChange::simple(move |next| sink.lock().unwrap().push(next.clone()));
        let options = DataTableFiltersOptions::new(FilterStrategy::Client, data(), configs())
            .with_controlled(FiltersState::new(), handler);
        let mut table = DataTableFilters::new(options).unwrap();

        table
            .actions()
            .batch(|b| {
                b.add_filter_value("status", ["todo"])?;
                b.set_filter_value("points", FilterValues::number([8.0, 1.0]))?;
                b.remove_filter("status");
                Ok(())
            })
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].column_id(), "points");
        assert_eq!(calls[0][0].operator(), FilterOperator::IsBetween);
    }

    #[test]
    fn failed_batch_commits_nothing() {
        let mut table = table();
        let result = table.actions().batch(|b| {
            b.add_filter_value("status", ["todo"])?;
            b.add_filter_value("points", ["1"])
        });
        assert!(result.is_err());
        assert!(table.filters().is_empty());
    }

    #[test]
    fn columns_are_memoized_by_identity() {
        let mut table = table();
        let first = table.columns();
        assert!(Arc::ptr_eq(&first, &table.columns()));

        let same_data = Arc::clone(table.data());
        table.set_data(same_data);
        assert!(Arc::ptr_eq(&first, &table.columns()));

        table.set_data(data());
        assert!(!Arc::ptr_eq(&first, &table.columns()));
    }

    #[test]
    fn injects_options_and_facets() {
        let options = DataTableFiltersOptions::new(FilterStrategy::Server, data(), configs())
            .with_options("status", [ColumnOption::new("blocked", "Blocked")])
            .with_faceted("status", FacetedInput::Options([("blocked".to_string(), 7)].into()))
            .with_faceted("points", FacetedInput::MinMax(0.0, 21.0));
        let table = DataTableFilters::new(options).unwrap();

        let status = table.column("status").unwrap();
        let opts = status.get_options().unwrap();
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].value, "blocked");
        assert_eq!(opts[0].count, Some(7));

        let points = table.column("points").unwrap();
        assert_eq!(points.get_faceted_min_max_values(), Some((0.0, 21.0)));
    }

    #[test]
    fn wrong_shaped_facets_are_ignored() {
        let options = DataTableFiltersOptions::new(FilterStrategy::Client, data(), configs())
            .with_faceted("status", FacetedInput::MinMax(0.0, 1.0));
        let table = DataTableFilters::new(options).unwrap();
        assert!(table.column("status").unwrap().faceted_options().is_none());
    }
}
