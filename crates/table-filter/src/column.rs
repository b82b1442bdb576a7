//! Column configuration.
//!
//! Columns are described with a persistent builder: every call consumes the
//! builder and returns a new one, so a shared prefix can be branched with
//! `clone()`. Type-restricted methods fail immediately when called on the
//! wrong column type; [`ColumnConfigBuilder::build`] checks required fields.
//!
//! ```
//! use table_filter::{create_column_config_helper, ColumnOption, Dir, OrderKey, OrderStep};
//!
//! struct Issue {
//!     title: String,
//!     status: String,
//!     estimate: u32,
//! }
//!
//! let dtf = create_column_config_helper::<Issue>();
//!
//! let title = dtf
//!     .text()
//!     .id("title")
//!     .accessor(|i: &Issue| i.title.clone())
//!     .display_name("Title")
//!     .build()?;
//!
//! let status = dtf
//!     .option()
//!     .id("status")
//!     .accessor(|i: &Issue| i.status.clone())
//!     .display_name("Status")
//!     .options([ColumnOption::new("todo", "Todo"), ColumnOption::new("done", "Done")])?
//!     .order_fn([OrderStep::by(OrderKey::Count, Dir::Desc)])?
//!     .build()?;
//!
//! let estimate = dtf
//!     .number()
//!     .id("estimate")
//!     .accessor(|i: &Issue| i.estimate)
//!     .display_name("Estimate")
//!     .max(13.0)?
//!     .build()?;
//!
//! assert_eq!(title.id(), "title");
//! assert_eq!(status.static_options().map(|o| o.len()), Some(2));
//! assert_eq!(estimate.max(), Some(13.0));
//! # Ok::<(), table_filter::FilterError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::ordering::OrderStep;
use crate::value::Value;

/// The data type of a column. Decides operators, value shapes and predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnDataType {
    Text,
    Number,
    Date,
    Option,
    MultiOption,
    Boolean,
}

impl ColumnDataType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnDataType::Text => "text",
            ColumnDataType::Number => "number",
            ColumnDataType::Date => "date",
            ColumnDataType::Option => "option",
            ColumnDataType::MultiOption => "multiOption",
            ColumnDataType::Boolean => "boolean",
        }
    }

    /// Returns `true` for `option` and `multiOption` columns.
    pub fn is_option_like(self) -> bool {
        matches!(self, ColumnDataType::Option | ColumnDataType::MultiOption)
    }
}

impl fmt::Display for ColumnDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One selectable value of an option or multi-option column.
///
/// `value` is the identity used for equality and membership. `count` is
/// filled in by the column data service; counts supplied by the caller are
/// overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ColumnOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnOption {
            value: value.into(),
            label: label.into(),
            icon: None,
            count: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Reads a column's value from a record.
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Turns one raw accessor value into an option.
pub type ValueToOptionFn = Arc<dyn Fn(&Value) -> ColumnOption + Send + Sync>;

/// Post-processes the full computed option list.
pub type TransformOptionsFn = Arc<dyn Fn(Vec<ColumnOption>) -> Vec<ColumnOption> + Send + Sync>;

/// Immutable, validated column descriptor.
pub struct ColumnConfig<T> {
    id: String,
    data_type: ColumnDataType,
    accessor: Accessor<T>,
    display_name: String,
    icon: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    options: Option<Arc<[ColumnOption]>>,
    faceted_options: Option<Arc<HashMap<String, usize>>>,
    transform_value_to_option: Option<ValueToOptionFn>,
    transform_options: Option<TransformOptionsFn>,
    order: Option<Arc<[OrderStep]>>,
    toggled_state_name: Option<String>,
}

impl<T> ColumnConfig<T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data_type(&self) -> ColumnDataType {
        self.data_type
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Statically configured options, if any.
    pub fn static_options(&self) -> Option<&[ColumnOption]> {
        self.options.as_deref()
    }

    /// Externally supplied facet counts (server strategy).
    pub fn faceted_options(&self) -> Option<&HashMap<String, usize>> {
        self.faceted_options.as_deref()
    }

    pub fn transform_value_to_option(&self) -> Option<&ValueToOptionFn> {
        self.transform_value_to_option.as_ref()
    }

    pub fn transform_options(&self) -> Option<&TransformOptionsFn> {
        self.transform_options.as_ref()
    }

    pub fn order_steps(&self) -> &[OrderStep] {
        self.order.as_deref().unwrap_or(&[])
    }

    pub fn toggled_state_name(&self) -> Option<&str> {
        self.toggled_state_name.as_deref()
    }

    /// Reads this column's value from a record.
    pub fn read(&self, row: &T) -> Value {
        (self.accessor)(row)
    }

    /// Turns a raw value into its option form.
    ///
    /// Values that are already options pass through. Other values go through
    /// `transformValueToOptionFn`; without one, raw strings stay raw. Lists
    /// are converted element by element.
    pub fn to_option_value(&self, value: Value) -> Value {
        match value {
            Value::List(items) => {
                Value::List(items.into_iter().map(|v| self.to_option_value(v)).collect())
            }
            Value::Option(_) | Value::None => value,
            other => match &self.transform_value_to_option {
                Some(transform) => Value::Option(transform(&other)),
                None => other,
            },
        }
    }

    pub(crate) fn with_static_options(&self, options: Arc<[ColumnOption]>) -> Self {
        ColumnConfig {
            options: Some(options),
            ..self.clone()
        }
    }

    pub(crate) fn with_faceted_options(&self, faceted: Arc<HashMap<String, usize>>) -> Self {
        ColumnConfig {
            faceted_options: Some(faceted),
            ..self.clone()
        }
    }

    pub(crate) fn with_bounds(&self, min: f64, max: f64) -> Self {
        ColumnConfig {
            min: Some(min),
            max: Some(max),
            ..self.clone()
        }
    }
}

impl<T> Clone for ColumnConfig<T> {
    fn clone(&self) -> Self {
        ColumnConfig {
            id: self.id.clone(),
            data_type: self.data_type,
            accessor: Arc::clone(&self.accessor),
            display_name: self.display_name.clone(),
            icon: self.icon.clone(),
            min: self.min,
            max: self.max,
            options: self.options.clone(),
            faceted_options: self.faceted_options.clone(),
            transform_value_to_option: self.transform_value_to_option.clone(),
            transform_options: self.transform_options.clone(),
            order: self.order.clone(),
            toggled_state_name: self.toggled_state_name.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnConfig")
            .field("id", &self.id)
            .field("data_type", &self.data_type)
            .field("display_name", &self.display_name)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("options", &self.options)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Persistent builder for [`ColumnConfig`].
pub struct ColumnConfigBuilder<T> {
    data_type: ColumnDataType,
    id: Option<String>,
    accessor: Option<Accessor<T>>,
    display_name: Option<String>,
    icon: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    options: Option<Arc<[ColumnOption]>>,
    transform_value_to_option: Option<ValueToOptionFn>,
    transform_options: Option<TransformOptionsFn>,
    order: Option<Arc<[OrderStep]>>,
    toggled_state_name: Option<String>,
}

impl<T> ColumnConfigBuilder<T> {
    fn new(data_type: ColumnDataType) -> Self {
        ColumnConfigBuilder {
            data_type,
            id: None,
            accessor: None,
            display_name: None,
            icon: None,
            min: None,
            max: None,
            options: None,
            transform_value_to_option: None,
            transform_options: None,
            order: None,
            toggled_state_name: None,
        }
    }

    pub fn text() -> Self {
        Self::new(ColumnDataType::Text)
    }

    pub fn number() -> Self {
        Self::new(ColumnDataType::Number)
    }

    pub fn date() -> Self {
        Self::new(ColumnDataType::Date)
    }

    pub fn boolean() -> Self {
        Self::new(ColumnDataType::Boolean)
    }

    pub fn option() -> Self {
        Self::new(ColumnDataType::Option)
    }

    pub fn multi_option() -> Self {
        Self::new(ColumnDataType::MultiOption)
    }

    pub fn data_type(&self) -> ColumnDataType {
        self.data_type
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the accessor. Anything convertible into a [`Value`] can be returned.
    pub fn accessor<F, V>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.accessor = Some(Arc::new(move |row: &T| f(row).into()));
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Lower bound for number columns.
    pub fn min(mut self, min: f64) -> Result<Self> {
        self.require("min", &[ColumnDataType::Number])?;
        self.min = Some(min);
        Ok(self)
    }

    /// Upper bound for number columns.
    pub fn max(mut self, max: f64) -> Result<Self> {
        self.require("max", &[ColumnDataType::Number])?;
        self.max = Some(max);
        Ok(self)
    }

    /// Static option list. Option values must be unique.
    pub fn options<I>(mut self, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = ColumnOption>,
    {
        self.require("options", OPTION_TYPES)?;
        let options: Vec<ColumnOption> = options.into_iter().collect();
        let mut seen = HashSet::new();
        if let Some(dup) = options.iter().find(|o| !seen.insert(o.value.as_str())) {
            return Err(FilterError::config(format!(
                "duplicate option value '{}' in static options",
                dup.value
            )));
        }
        self.options = Some(options.into());
        Ok(self)
    }

    /// Maps each raw accessor value to an option.
    pub fn transform_value_to_option_fn<F>(mut self, f: F) -> Result<Self>
    where
        F: Fn(&Value) -> ColumnOption + Send + Sync + 'static,
    {
        self.require("transformValueToOptionFn", OPTION_TYPES)?;
        self.transform_value_to_option = Some(Arc::new(f));
        Ok(self)
    }

    /// Post-processes the computed option list.
    pub fn transform_options_fn<F>(mut self, f: F) -> Result<Self>
    where
        F: Fn(Vec<ColumnOption>) -> Vec<ColumnOption> + Send + Sync + 'static,
    {
        self.require("transformOptionsFn", OPTION_TYPES)?;
        self.transform_options = Some(Arc::new(f));
        Ok(self)
    }

    /// Orders options by a chain of steps, first step first.
    pub fn order_fn<I>(mut self, steps: I) -> Result<Self>
    where
        I: IntoIterator<Item = OrderStep>,
    {
        self.require("orderFn", OPTION_TYPES)?;
        let steps: Vec<OrderStep> = steps.into_iter().collect();
        if steps.is_empty() {
            return Err(FilterError::config(
                "orderFn requires at least one ordering step",
            ));
        }
        self.order = Some(steps.into());
        Ok(self)
    }

    /// Orders options by a built-in function name and direction,
    /// e.g. `order_by("count", "desc")`.
    pub fn order_by(self, key: &str, dir: &str) -> Result<Self> {
        let step = OrderStep::named(key, dir)?;
        self.order_fn([step])
    }

    /// Label shown when a boolean filter is switched on.
    pub fn toggled_state_name(mut self, name: impl Into<String>) -> Result<Self> {
        self.require("toggledStateName", &[ColumnDataType::Boolean])?;
        self.toggled_state_name = Some(name.into());
        Ok(self)
    }

    /// Validates required fields and produces the column config.
    pub fn build(self) -> Result<ColumnConfig<T>> {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(FilterError::config("id is required")),
        };
        let accessor = self
            .accessor
            .ok_or_else(|| FilterError::config("accessor is required"))?;
        let display_name = self
            .display_name
            .ok_or_else(|| FilterError::config("displayName is required"))?;

        Ok(ColumnConfig {
            id,
            data_type: self.data_type,
            accessor,
            display_name,
            icon: self.icon,
            min: self.min,
            max: self.max,
            options: self.options,
            faceted_options: None,
            transform_value_to_option: self.transform_value_to_option,
            transform_options: self.transform_options,
            order: self.order,
            toggled_state_name: self.toggled_state_name,
        })
    }

    fn require(&self, method: &str, allowed: &[ColumnDataType]) -> Result<()> {
        if allowed.contains(&self.data_type) {
            return Ok(());
        }
        let names: Vec<&str> = allowed.iter().map(|t| t.as_str()).collect();
        Err(FilterError::config(format!(
            "{method}() can only be used with {} columns, not {}",
            names.join(" or "),
            self.data_type
        )))
    }
}

const OPTION_TYPES: &[ColumnDataType] = &[ColumnDataType::Option, ColumnDataType::MultiOption];

impl<T> Clone for ColumnConfigBuilder<T> {
    fn clone(&self) -> Self {
        ColumnConfigBuilder {
            data_type: self.data_type,
            id: self.id.clone(),
            accessor: self.accessor.clone(),
            display_name: self.display_name.clone(),
            icon: self.icon.clone(),
            min: self.min,
            max: self.max,
            options: self.options.clone(),
            transform_value_to_option: self.transform_value_to_option.clone(),
            transform_options: self.transform_options.clone(),
            order: self.order.clone(),
            toggled_state_name: self.toggled_state_name.clone(),
        }
    }
}

/// Entry point binding the record type once for every column builder.
pub struct ColumnConfigHelper<T> {
    _record: PhantomData<fn(&T)>,
}

impl<T> ColumnConfigHelper<T> {
    pub fn text(&self) -> ColumnConfigBuilder<T> {
        ColumnConfigBuilder::text()
    }

    pub fn number(&self) -> ColumnConfigBuilder<T> {
        ColumnConfigBuilder::number()
    }

    pub fn date(&self) -> ColumnConfigBuilder<T> {
        ColumnConfigBuilder::date()
    }

    pub fn boolean(&self) -> ColumnConfigBuilder<T> {
        ColumnConfigBuilder::boolean()
    }

    pub fn option(&self) -> ColumnConfigBuilder<T> {
        ColumnConfigBuilder::option()
    }

    pub fn multi_option(&self) -> ColumnConfigBuilder<T> {
        ColumnConfigBuilder::multi_option()
    }
}

/// Creates a [`ColumnConfigHelper`] for records of type `T`.
pub fn create_column_config_helper<T>() -> ColumnConfigHelper<T> {
    ColumnConfigHelper {
        _record: PhantomData,
    }
}

/// Fails when two configs in one set share an id.
pub fn validate_unique_ids<T>(configs: &[ColumnConfig<T>]) -> Result<()> {
    let mut seen = HashSet::new();
    for config in configs {
        if !seen.insert(config.id()) {
            return Err(FilterError::config(format!(
                "duplicate column id '{}'",
                config.id()
            )));
        }
    }
    Ok(())
}
