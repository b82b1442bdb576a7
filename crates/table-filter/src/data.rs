//! Column data service.
//!
//! A [`Column`] binds a [`ColumnConfig`] to a dataset and a
//! [`FilterStrategy`], and derives what a filter UI needs from them:
//!
//! - [`Column::get_values`]: every accessed value, lists flattened, missing
//!   values dropped
//! - [`Column::get_options`]: the option list for option pickers, built in
//!   three stages (base options, then counts and ordering, then
//!   `transformOptionsFn`)
//! - [`Column::get_faceted_unique_values`]: occurrence count per option value
//! - [`Column::get_faceted_min_max_values`]: numeric bounds for range sliders
//!
//! Every stage is computed at most once per `Column` and cached. A column is
//! rebuilt (with fresh caches) whenever its dataset, strategy or config
//! changes, so a cache never outlives the inputs it was computed from.
//!
//! Under the server strategy the dataset is only a page of the real data, so
//! options and facets come from the configuration instead of being derived.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::column::{validate_unique_ids, ColumnConfig, ColumnDataType, ColumnOption};
use crate::error::{FilterError, Result};
use crate::filter::FilterModel;
use crate::ordering::sort_options;
use crate::predicate::matches_value;
use crate::value::Value;

/// Where option universes and facet counts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStrategy {
    /// The whole dataset is in memory; derive everything from it.
    #[default]
    Client,
    /// The dataset is partial; options and facets are supplied by the host.
    Server,
}

impl FilterStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterStrategy::Client => "client",
            FilterStrategy::Server => "server",
        }
    }
}

impl fmt::Display for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterStrategy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(FilterStrategy::Client),
            "server" => Ok(FilterStrategy::Server),
            other => Err(FilterError::config(format!(
                "invalid strategy '{other}', expected 'client' or 'server'"
            ))),
        }
    }
}

#[derive(Default)]
struct ColumnCache {
    values: OnceCell<Arc<[Value]>>,
    base_options: OnceCell<Arc<[ColumnOption]>>,
    ordered_options: OnceCell<Arc<[ColumnOption]>>,
    options: OnceCell<Arc<[ColumnOption]>>,
    faceted_unique: OnceCell<Arc<HashMap<String, usize>>>,
    faceted_min_max: OnceCell<Option<(f64, f64)>>,
}

/// A column bound to a dataset, with cached derived data.
///
/// Cloning is cheap and clones share the caches, so a clone can be moved
/// into a spawned task to warm them.
pub struct Column<T> {
    config: ColumnConfig<T>,
    data: Arc<[T]>,
    strategy: FilterStrategy,
    cache: Arc<ColumnCache>,
}

impl<T> Column<T> {
    pub fn new(config: ColumnConfig<T>, data: Arc<[T]>, strategy: FilterStrategy) -> Self {
        Column {
            config,
            data,
            strategy,
            cache: Arc::new(ColumnCache::default()),
        }
    }

    pub fn config(&self) -> &ColumnConfig<T> {
        &self.config
    }

    pub fn data(&self) -> &Arc<[T]> {
        &self.data
    }

    pub fn strategy(&self) -> FilterStrategy {
        self.strategy
    }

    /// Every value the accessor yields over the dataset.
    ///
    /// List values are flattened and missing values are skipped.
    pub fn get_values(&self) -> Arc<[Value]> {
        Arc::clone(self.cache.values.get_or_init(|| {
            let mut out = Vec::with_capacity(self.data.len());
            for row in self.data.iter() {
                self.config.read(row).flatten_into(&mut out);
            }
            out.into()
        }))
    }

    /// The option list shown in this column's value picker.
    ///
    /// Only option and multi-option columns have options; other columns log
    /// a warning and return an empty list.
    pub fn get_options(&self) -> Result<Arc<[ColumnOption]>> {
        if !self.data_type().is_option_like() {
            tracing::warn!(
                column_id = %self.id(),
                data_type = %self.data_type(),
                "options requested for a column without options"
            );
            return Ok(Arc::from(Vec::new()));
        }

        self.cache
            .options
            .get_or_try_init(|| -> Result<Arc<[ColumnOption]>> {
                let ordered = self.ordered_options()?;
                Ok(match self.transform_options() {
                    Some(transform) => transform(ordered.to_vec()).into(),
                    None => ordered,
                })
            })
            .map(Arc::clone)
    }

    fn base_options(&self) -> Result<Arc<[ColumnOption]>> {
        self.cache
            .base_options
            .get_or_try_init(|| -> Result<Arc<[ColumnOption]>> {
                if let Some(options) = self.static_options() {
                    return Ok(options.into());
                }
                if self.strategy == FilterStrategy::Server {
                    return Err(FilterError::config(format!(
                        "column '{}': server strategy requires static options",
                        self.id()
                    )));
                }
                self.derive_options()
            })
            .map(Arc::clone)
    }

    fn derive_options(&self) -> Result<Arc<[ColumnOption]>> {
        let mut unique: Vec<Value> = Vec::new();
        for value in self.get_values().iter() {
            if !unique.contains(value) {
                unique.push(value.clone());
            }
        }

        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(unique.len());
        for value in unique {
            let option = match self.to_option_value(value) {
                Value::Option(option) => option,
                other => {
                    return Err(FilterError::config(format!(
                        "column '{}': accessor returned a {} value; return options or \
                         set transformValueToOptionFn",
                        self.id(),
                        other.kind()
                    )))
                }
            };
            if seen.insert(option.value.clone()) {
                options.push(option);
            }
        }
        Ok(options.into())
    }

    fn ordered_options(&self) -> Result<Arc<[ColumnOption]>> {
        self.cache
            .ordered_options
            .get_or_try_init(|| -> Result<Arc<[ColumnOption]>> {
                let counts = self.get_faceted_unique_values();
                let mut options = self.base_options()?.to_vec();
                for option in &mut options {
                    option.count = Some(counts.get(&option.value).copied().unwrap_or(0));
                }
                sort_options(&mut options, self.order_steps());
                Ok(options.into())
            })
            .map(Arc::clone)
    }

    /// Occurrence count per option value.
    ///
    /// Under the server strategy this is the configured `facetedOptions`
    /// map as is.
    pub fn get_faceted_unique_values(&self) -> Arc<HashMap<String, usize>> {
        if !self.data_type().is_option_like() {
            tracing::warn!(
                column_id = %self.id(),
                data_type = %self.data_type(),
                "faceted values requested for a column without options"
            );
            return Arc::new(HashMap::new());
        }

        Arc::clone(self.cache.faceted_unique.get_or_init(|| {
            if self.strategy == FilterStrategy::Server {
                return Arc::new(self.faceted_options().cloned().unwrap_or_default());
            }
            let mut counts = HashMap::new();
            for value in self.get_values().iter() {
                if let Some(key) = self.to_option_value(value.clone()).option_key() {
                    *counts.entry(key.to_string()).or_insert(0) += 1;
                }
            }
            Arc::new(counts)
        }))
    }

    /// `(min, max)` bounds of a number column.
    ///
    /// Configured bounds win over the data. Under the server strategy
    /// without configured bounds the result is `None`; a dataset without
    /// numeric values yields `(0, 0)`.
    pub fn get_faceted_min_max_values(&self) -> Option<(f64, f64)> {
        if self.data_type() != ColumnDataType::Number {
            tracing::warn!(
                column_id = %self.id(),
                data_type = %self.data_type(),
                "min/max requested for a non-number column"
            );
            return None;
        }

        *self.cache.faceted_min_max.get_or_init(|| {
            if let (Some(min), Some(max)) = (self.min(), self.max()) {
                return Some((min, max));
            }
            if self.strategy == FilterStrategy::Server {
                return None;
            }
            let bounds = self
                .get_values()
                .iter()
                .filter_map(|v| v.as_number())
                .filter(|n| !n.is_nan())
                .map(|n| n.to_f64())
                .fold(None, |acc: Option<(f64, f64)>, n| match acc {
                    Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
                    None => Some((n, n)),
                });
            Some(bounds.unwrap_or((0.0, 0.0)))
        })
    }

    /// Warms the values cache on the next scheduler tick.
    pub async fn prefetch_values(&self) {
        if self.strategy == FilterStrategy::Server || self.cache.values.get().is_some() {
            return;
        }
        tokio::task::yield_now().await;
        self.get_values();
        tracing::debug!(column_id = %self.id(), "prefetched values");
    }

    /// Warms the options cache (and the facet counts it depends on).
    pub async fn prefetch_options(&self) -> Result<()> {
        if self.strategy == FilterStrategy::Server
            || !self.data_type().is_option_like()
            || self.cache.options.get().is_some()
        {
            return Ok(());
        }
        tokio::task::yield_now().await;
        self.get_options()?;
        tracing::debug!(column_id = %self.id(), "prefetched options");
        Ok(())
    }

    /// Warms the facet counts cache.
    pub async fn prefetch_faceted_unique_values(&self) {
        if self.strategy == FilterStrategy::Server
            || !self.data_type().is_option_like()
            || self.cache.faceted_unique.get().is_some()
        {
            return;
        }
        tokio::task::yield_now().await;
        self.get_faceted_unique_values();
        tracing::debug!(column_id = %self.id(), "prefetched faceted values");
    }

    /// Warms the min/max cache.
    pub async fn prefetch_faceted_min_max_values(&self) {
        if self.strategy == FilterStrategy::Server
            || self.data_type() != ColumnDataType::Number
            || self.cache.faceted_min_max.get().is_some()
        {
            return;
        }
        tokio::task::yield_now().await;
        self.get_faceted_min_max_values();
        tracing::debug!(column_id = %self.id(), "prefetched min/max");
    }

    /// Whether the options cache is populated.
    pub fn has_cached_options(&self) -> bool {
        self.cache.options.get().is_some()
    }

    /// Tests one record against a filter on this column.
    pub fn matches(&self, row: &T, filter: &FilterModel) -> Result<bool> {
        if filter.data_type() != self.data_type() {
            return Err(FilterError::type_mismatch(
                format!("{} filter for column '{}'", self.data_type(), self.id()),
                format!("{} filter", filter.data_type()),
            ));
        }
        let value = self.read(row);
        let value = if self.data_type().is_option_like() {
            self.to_option_value(value)
        } else {
            value
        };
        matches_value(&value, filter)
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Column {
            config: self.config.clone(),
            data: Arc::clone(&self.data),
            strategy: self.strategy,
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("config", &self.config)
            .field("rows", &self.data.len())
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl<T> Deref for Column<T> {
    type Target = ColumnConfig<T>;

    fn deref(&self) -> &ColumnConfig<T> {
        &self.config
    }
}

/// Binds every config to `data`. Column ids must be unique.
pub fn create_columns<T>(
    data: Arc<[T]>,
    configs: &[ColumnConfig<T>],
    strategy: FilterStrategy,
) -> Result<Vec<Column<T>>> {
    validate_unique_ids(configs)?;
    Ok(configs
        .iter()
        .map(|config| Column::new(config.clone(), Arc::clone(&data), strategy))
        .collect())
}
