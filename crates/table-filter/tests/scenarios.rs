//! End-to-end scenarios across configuration, state, data and predicates.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use table_filter::{
    add_filter_value, create_column_config_helper, create_columns, create_table_columns,
    create_table_filters, determine_new_operator, operators_for, remove_filter_value,
    text_filter_fn, ColumnConfig, ColumnDataType, ColumnOption, DataTableFilters,
    DataTableFiltersOptions, FilterError, FilterModel, FilterOperator, FilterStrategy,
    FilterValues, FiltersState, OnFiltersChange, OperatorTarget, TableColumnDef,
};

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug)]
struct Issue {
    title: &'static str,
    status: &'static str,
    labels: Vec<&'static str>,
    estimate: Option<u32>,
    created: NaiveDateTime,
    urgent: bool,
}

fn at(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn issues() -> Arc<[Issue]> {
    Arc::from(vec![
        Issue {
            title: "Fix login redirect",
            status: "todo",
            labels: vec!["bug", "auth"],
            estimate: Some(3),
            created: at(1, 1, 9, 0),
            urgent: true,
        },
        Issue {
            title: "Write onboarding docs",
            status: "done",
            labels: vec!["docs"],
            estimate: Some(1),
            created: at(1, 3, 23, 59),
            urgent: false,
        },
        Issue {
            title: "Rate limit signup",
            status: "todo",
            labels: vec!["auth"],
            estimate: None,
            created: at(1, 4, 0, 1),
            urgent: false,
        },
    ])
}

fn configs() -> Vec<ColumnConfig<Issue>> {
    let dtf = create_column_config_helper::<Issue>();
    vec![
        dtf.text()
            .id("title")
            .accessor(|i: &Issue| i.title)
            .display_name("Title")
            .build()
            .unwrap(),
        dtf.option()
            .id("status")
            .accessor(|i: &Issue| i.status)
            .display_name("Status")
            .options([ColumnOption::new("todo", "Todo"), ColumnOption::new("done", "Done")])
            .unwrap()
            .build()
            .unwrap(),
        dtf.multi_option()
            .id("labels")
            .accessor(|i: &Issue| i.labels.clone())
            .display_name("Labels")
            .transform_value_to_option_fn(|v| {
                let s = v.as_str().unwrap_or_default();
                ColumnOption::new(s, s)
            })
            .unwrap()
            .order_by("count", "desc")
            .unwrap()
            .build()
            .unwrap(),
        dtf.number()
            .id("estimate")
            .accessor(|i: &Issue| i.estimate)
            .display_name("Estimate")
            .build()
            .unwrap(),
        dtf.date()
            .id("created")
            .accessor(|i: &Issue| i.created)
            .display_name("Created")
            .build()
            .unwrap(),
        dtf.boolean()
            .id("urgent")
            .accessor(|i: &Issue| i.urgent)
            .display_name("Urgent")
            .toggled_state_name("Urgent only")
            .unwrap()
            .build()
            .unwrap(),
    ]
}

fn table() -> DataTableFilters<Issue> {
    DataTableFilters::new(DataTableFiltersOptions::new(
        FilterStrategy::Client,
        issues(),
        configs(),
    ))
    .unwrap()
}

fn titles(rows: &[&Issue]) -> Vec<&'static str> {
    rows.iter().map(|i| i.title).collect()
}

// ============================================================================
// Filter state properties
// ============================================================================

#[test]
fn adding_then_removing_a_value_leaves_no_filter() {
    let configs = configs();
    let status = &configs[1];
    let state = add_filter_value(&FiltersState::new(), status, ["todo"]).unwrap();
    let state = remove_filter_value(&state, status, ["todo"]).unwrap();
    assert!(state.is_empty());
}

#[test]
fn operator_promotes_and_demotes_with_value_count() {
    let configs = configs();
    let status = &configs[1];
    let state = add_filter_value(&FiltersState::new(), status, ["todo"]).unwrap();
    assert_eq!(state[0].operator(), FilterOperator::Is);

    let state = add_filter_value(&state, status, ["done"]).unwrap();
    assert_eq!(state[0].operator(), FilterOperator::IsAnyOf);

    let state = remove_filter_value(&state, status, ["done"]).unwrap();
    assert_eq!(state[0].operator(), FilterOperator::Is);
}

#[test]
fn text_operator_is_stable_across_single_values() {
    let op = determine_new_operator(
        ColumnDataType::Text,
        &FilterValues::text(["a"]),
        &FilterValues::text(["b"]),
        FilterOperator::Contains,
    )
    .unwrap();
    assert_eq!(op, FilterOperator::Contains);
}

#[test]
fn empty_text_filters_match_everything() {
    let blank = FilterModel::new("title", FilterOperator::Contains, FilterValues::text([""])).unwrap();
    let none =
        FilterModel::new("title", FilterOperator::Contains, FilterValues::text(Vec::<String>::new()))
            .unwrap();
    for input in ["", "anything", "Fix login redirect"] {
        assert!(text_filter_fn(input, &blank).unwrap());
        assert!(text_filter_fn(input, &none).unwrap());
    }
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn status_filter_narrows_then_widens() {
    let mut table = table();

    table.actions().add_filter_value("status", ["todo"]).unwrap();
    let rows = table.filtered_rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|i| i.status == "todo"));

    table.actions().add_filter_value("status", ["done"]).unwrap();
    assert_eq!(table.filters()[0].operator(), FilterOperator::IsAnyOf);
    assert_eq!(table.filtered_rows().unwrap().len(), 3);
}

#[test]
fn date_range_includes_whole_end_day() {
    let mut table = table();
    table
        .actions()
        .set_filter_value("created", FilterValues::date([at(1, 3, 0, 0), at(1, 1, 0, 0)]))
        .unwrap();

    assert_eq!(table.filters()[0].operator(), FilterOperator::IsBetween);
    let rows = table.filtered_rows().unwrap();
    assert_eq!(titles(&rows), ["Fix login redirect", "Write onboarding docs"]);
}

#[test]
fn multi_option_filters_use_set_semantics() {
    let mut table = table();
    table.actions().add_filter_value("labels", ["auth", "docs"]).unwrap();
    assert_eq!(table.filtered_rows().unwrap().len(), 3);

    table
        .actions()
        .set_filter_operator("labels", FilterOperator::IncludeAllOf)
        .unwrap();
    assert!(table.filtered_rows().unwrap().is_empty());

    table
        .actions()
        .set_filter_operator("labels", FilterOperator::ExcludeIfAnyOf)
        .unwrap();
    assert!(table.filtered_rows().unwrap().is_empty());

    table.actions().remove_filter_value("labels", ["docs"]).unwrap();
    assert_eq!(table.filters()[0].operator(), FilterOperator::Exclude);
    assert_eq!(titles(&table.filtered_rows().unwrap()), ["Write onboarding docs"]);
}

#[test]
fn missing_estimates_never_match_a_number_filter() {
    let mut table = table();
    table
        .actions()
        .set_filter_value("estimate", FilterValues::number([5.0]))
        .unwrap();
    table
        .actions()
        .set_filter_operator("estimate", FilterOperator::IsLessThan)
        .unwrap();
    assert_eq!(
        titles(&table.filtered_rows().unwrap()),
        ["Fix login redirect", "Write onboarding docs"]
    );
}

#[test]
fn filters_combine_with_and() {
    let mut table = table();
    table
        .actions()
        .batch(|b| {
            b.set_filter_value("urgent", FilterValues::boolean([false]))?;
            b.set_filter_value("title", FilterValues::text(["SIGNUP"]))
        })
        .unwrap();
    assert_eq!(titles(&table.filtered_rows().unwrap()), ["Rate limit signup"]);
}

#[test]
fn batch_notifies_once_with_final_state() {
    let notified = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notified);
    let options = DataTableFiltersOptions::new(FilterStrategy::Client, issues(), configs())
        .with_controlled(
            FiltersState::new(),
            OnFiltersChange::simple(move |next| sink.lock().unwrap().push(next.clone())),
        );
    let mut table = DataTableFilters::new(options).unwrap();

    table
        .actions()
        .batch(|b| {
            b.add_filter_value("status", ["todo"])?;
            b.add_filter_value("labels", ["bug"])?;
            b.remove_filter("status");
            Ok(())
        })
        .unwrap();

    let notified = notified.lock().unwrap();
    assert_eq!(notified.len(), 1);
    let state = &notified[0];
    assert_eq!(state.len(), 1);
    assert_eq!(state[0].column_id(), "labels");

    table.sync_filters(state.clone());
    assert_eq!(titles(&table.filtered_rows().unwrap()), ["Fix login redirect"]);
}

#[test]
fn label_options_are_counted_and_ordered() {
    let table = table();
    let labels = table.column("labels").unwrap();
    let options = labels.get_options().unwrap();
    let ordered: Vec<_> = options.iter().map(|o| (o.value.as_str(), o.count)).collect();
    assert_eq!(ordered, [("auth", Some(2)), ("bug", Some(1)), ("docs", Some(1))]);
}

#[test]
fn estimate_bounds_come_from_data() {
    let table = table();
    let estimate = table.column("estimate").unwrap();
    assert_eq!(estimate.get_faceted_min_max_values(), Some((1.0, 3.0)));
}

// ============================================================================
// Adapter and persistence
// ============================================================================

#[test]
fn table_adapter_filters_rows_like_the_engine() {
    let data = issues();
    let columns = create_columns(Arc::clone(&data), &configs(), FilterStrategy::Client).unwrap();
    let defs = create_table_columns(
        &columns,
        vec![
            TableColumnDef::new("title", "Title"),
            TableColumnDef::new("status", "Status"),
        ],
    );

    let state = FiltersState::from_filters(vec![FilterModel::new(
        "status",
        FilterOperator::IsNot,
        FilterValues::option(["todo"]),
    )
    .unwrap()])
    .unwrap();
    let table_filters = create_table_filters(&state);
    assert_eq!(table_filters[0].id, "status");

    let status_def = defs.iter().find(|d| d.id == table_filters[0].id).unwrap();
    let kept: Vec<_> = data
        .iter()
        .filter(|row| status_def.filter_row(row, &table_filters[0].value).unwrap())
        .map(|i| i.title)
        .collect();
    assert_eq!(kept, ["Write onboarding docs"]);
}

#[test]
fn state_round_trips_through_json() {
    let mut table = table();
    table
        .actions()
        .batch(|b| {
            b.add_filter_value("status", ["todo", "done"])?;
            b.set_filter_value("created", FilterValues::date([at(1, 1, 0, 0), at(1, 3, 12, 30)]))?;
            b.set_filter_value("estimate", FilterValues::number([2.0]))?;
            b.set_filter_value("urgent", FilterValues::boolean([true]))
        })
        .unwrap();

    let json = table.filters().to_json().unwrap();
    assert!(json.contains(r#""operator":"is any of""#));
    assert!(json.contains("2024-01-03T12:30:00"));

    let decoded = FiltersState::from_json(&json).unwrap();
    assert_eq!(&decoded, table.filters());
}

#[test]
fn persisted_state_with_unknown_operator_fails() {
    let json = r#"[{"columnId":"urgent","type":"boolean","operator":"is any of","values":[true]}]"#;
    let err = FiltersState::from_json(json).unwrap_err();
    assert!(matches!(err, FilterError::Serialization(_)));
    assert!(err
        .to_string()
        .contains("operator 'is any of' not found for boolean columns"));
}

#[test]
fn every_catalog_operator_is_reachable_by_name() {
    for data_type in [
        ColumnDataType::Text,
        ColumnDataType::Number,
        ColumnDataType::Date,
        ColumnDataType::Option,
        ColumnDataType::MultiOption,
        ColumnDataType::Boolean,
    ] {
        for details in operators_for(data_type) {
            let parsed = FilterOperator::parse(data_type, details.value.as_str()).unwrap();
            assert_eq!(parsed, details.value);
            if details.target == OperatorTarget::Multiple {
                assert!(details.plural_of.is_some(), "{} has no singular form", details.label);
            }
        }
    }
}
