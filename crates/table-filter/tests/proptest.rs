//! Property-based tests for the filter reducers and predicates.

use proptest::prelude::*;
use table_filter::{
    add_filter_value, create_column_config_helper, create_number_filter_value,
    multi_option_filter_fn, number_filter_fn, remove_filter_value, set_filter_value,
    text_filter_fn, ColumnConfig, FilterModel, FilterOperator, FilterValues, FiltersState, Value,
};

// ============================================================================
// Test helpers
// ============================================================================

struct Row;

fn option_column(id: &str, multi: bool) -> ColumnConfig<Row> {
    let dtf = create_column_config_helper::<Row>();
    let builder = if multi { dtf.multi_option() } else { dtf.option() };
    builder
        .id(id)
        .accessor(|_: &Row| Value::None)
        .display_name(id)
        .build()
        .unwrap()
}

fn number_column() -> ColumnConfig<Row> {
    create_column_config_helper::<Row>()
        .number()
        .id("points")
        .accessor(|_: &Row| Value::None)
        .display_name("Points")
        .build()
        .unwrap()
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,3}"
}

fn finite() -> impl Strategy<Value = f64> {
    -1.0e6f64..1.0e6
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Adding the same value twice equals adding it once.
    #[test]
    fn add_is_idempotent(
        seed in prop::collection::vec(value_strategy(), 0..4),
        value in value_strategy(),
        multi in any::<bool>(),
    ) {
        let column = option_column("col", multi);
        let start = add_filter_value(&FiltersState::new(), &column, seed).unwrap();
        let once = add_filter_value(&start, &column, [value.clone()]).unwrap();
        let twice = add_filter_value(&once, &column, [value]).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Removing a freshly added value yields an empty state.
    #[test]
    fn add_then_remove_is_empty(value in value_strategy(), multi in any::<bool>()) {
        let column = option_column("col", multi);
        let added = add_filter_value(&FiltersState::new(), &column, [value.clone()]).unwrap();
        let removed = remove_filter_value(&added, &column, [value]).unwrap();
        prop_assert!(removed.is_empty());
    }

    /// The operator's arity target always agrees with the value count.
    #[test]
    fn operator_tracks_value_count(
        adds in prop::collection::vec(prop::collection::vec(value_strategy(), 1..3), 1..6),
        removes in prop::collection::vec(value_strategy(), 0..6),
        multi in any::<bool>(),
    ) {
        let column = option_column("col", multi);
        let mut state = FiltersState::new();
        for values in adds {
            state = add_filter_value(&state, &column, values).unwrap();
        }
        for value in removes {
            state = remove_filter_value(&state, &column, [value]).unwrap();
        }

        if let Some(filter) = state.get("col") {
            let details = filter.details().unwrap();
            let expect_multiple = filter.values().len() > 1;
            prop_assert_eq!(
                details.target == table_filter::OperatorTarget::Multiple,
                expect_multiple
            );
        }
    }

    /// Number ranges are always stored as (min, max).
    #[test]
    fn number_ranges_are_ordered(a in finite(), b in finite()) {
        let range = create_number_filter_value(&[a, b]);
        prop_assert_eq!(range.len(), 2);
        prop_assert!(range[0] <= range[1]);

        let state = set_filter_value(&FiltersState::new(), &number_column(), FilterValues::number([a, b])).unwrap();
        prop_assert_eq!(state[0].operator(), FilterOperator::IsBetween);
    }

    /// A value inside a between range matches; negation is its complement.
    #[test]
    fn between_and_not_between_are_complements(a in finite(), b in finite(), x in finite()) {
        let values = FilterValues::number(create_number_filter_value(&[a, b]));
        let between = FilterModel::new("n", FilterOperator::IsBetween, values.clone()).unwrap();
        let outside = FilterModel::new("n", FilterOperator::IsNotBetween, values).unwrap();
        prop_assert_ne!(
            number_filter_fn(x, &between).unwrap(),
            number_filter_fn(x, &outside).unwrap()
        );
    }

    /// Blank text filters match any input.
    #[test]
    fn blank_text_is_vacuous(input in ".{0,20}", padding in " {0,4}") {
        let filter = FilterModel::new("t", FilterOperator::Contains, FilterValues::text([padding])).unwrap();
        prop_assert!(text_filter_fn(&input, &filter).unwrap());
    }

    /// `include any of` and `exclude if any of` are complements, as are
    /// `include all of` and `exclude if all`.
    #[test]
    fn multi_option_negations_are_complements(
        record in prop::collection::vec(value_strategy(), 0..5),
        wanted in prop::collection::vec(value_strategy(), 1..4),
    ) {
        let eval = |op| {
            let filter = FilterModel::new("m", op, FilterValues::multi_option(wanted.clone())).unwrap();
            multi_option_filter_fn(record.as_slice(), &filter).unwrap()
        };
        prop_assert_ne!(eval(FilterOperator::IncludeAnyOf), eval(FilterOperator::ExcludeIfAnyOf));
        prop_assert_ne!(eval(FilterOperator::IncludeAllOf), eval(FilterOperator::ExcludeIfAll));
    }

    /// Replaying the same edits from the same start gives the same state.
    #[test]
    fn reducers_are_deterministic(edits in prop::collection::vec((any::<bool>(), value_strategy()), 0..10)) {
        let column = option_column("col", true);
        let replay = || {
            let mut state = FiltersState::new();
            for (add, value) in &edits {
                state = if *add {
                    add_filter_value(&state, &column, [value.as_str()]).unwrap()
                } else {
                    remove_filter_value(&state, &column, [value.as_str()]).unwrap()
                };
            }
            state
        };
        prop_assert_eq!(replay(), replay());
    }
}
