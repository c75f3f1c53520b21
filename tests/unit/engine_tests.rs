//! Unit tests for the comparison engine pipeline, driven by an in-memory
//! sample source

use crate::common::*;
use tabrecon::compare::{ComparisonEngine, ComparisonResult, MismatchReason};
use tabrecon::loader::ColumnType;

#[test]
fn test_missing_source_emits_single_missing_result() {
    let mock = MockSampleSource::new();
    let engine = ComparisonEngine::new(&mock);

    let source = absent("orders", "path not found");
    let target = present("raw_orders", "tgt", 3, &[("id", ColumnType::Integer)]);

    let results = engine.compare(&request("orders", "raw_orders", &["id"], 5), &source, &target);

    assert_eq!(
        results,
        vec![ComparisonResult::Missing {
            table: "orders".to_string()
        }]
    );
    // No sample was ever fetched for the pair
    assert!(mock.fetched.borrow().is_empty());
}

#[test]
fn test_both_sides_missing_emits_two_results() {
    let mock = MockSampleSource::new();
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("orders", "raw_orders", &["id"], 5),
        &absent("orders", "gone"),
        &absent("raw_orders", "also gone"),
    );

    assert_eq!(results.len(), 2);
    assert!(matches!(&results[0], ComparisonResult::Missing { table } if table == "orders"));
    assert!(matches!(&results[1], ComparisonResult::Missing { table } if table == "raw_orders"));
}

#[test]
fn test_empty_table_yields_no_verdict() {
    let mock = MockSampleSource::new();
    let engine = ComparisonEngine::new(&mock);

    let source = present("orders", "src", 0, &[("id", ColumnType::Integer)]);
    let target = present("raw_orders", "tgt", 3, &[("id", ColumnType::Integer)]);

    let results = engine.compare(&request("orders", "raw_orders", &["id"], 5), &source, &target);
    assert!(results.is_empty());
}

#[test]
fn test_row_count_mismatch_short_circuits() {
    // 5 rows vs 7 rows with the same schema: counts alone decide
    let mock = MockSampleSource::new();
    let engine = ComparisonEngine::new(&mock);

    let source = present("orders", "src", 5, &[("id", ColumnType::Integer)]);
    let target = present("raw_orders", "tgt", 7, &[("id", ColumnType::Integer)]);

    let results = engine.compare(&request("orders", "raw_orders", &["id"], 5), &source, &target);

    assert_eq!(results.len(), 1);
    match &results[0] {
        ComparisonResult::Mismatched { pair, reason, diffs } => {
            assert_eq!(pair, "orders <-> raw_orders");
            assert_eq!(
                *reason,
                MismatchReason::RowCount {
                    source_rows: 5,
                    target_rows: 7
                }
            );
            assert!(diffs.is_empty());
        }
        other => panic!("Expected mismatched result, got {:?}", other),
    }
    // No cell comparison was attempted
    assert!(mock.fetched.borrow().is_empty());
}

#[test]
fn test_matching_pair_after_trimming() {
    // 3 rows per side, all cells equal after trimming
    let columns = [("id", ColumnType::Integer), ("qty", ColumnType::Text)];
    let mock = MockSampleSource::new()
        .with_table(
            "src",
            &["id", "qty"],
            vec![
                vec![int(2), text(" 5 ")],
                vec![int(1), text("7")],
                vec![int(3), text(" 9")],
            ],
        )
        .with_table(
            "tgt",
            &["id", "qty"],
            vec![
                vec![int(1), text("7 ")],
                vec![int(2), text("5")],
                vec![int(3), text("9")],
            ],
        );
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("orders", "raw_orders", &["id"], 5),
        &present("orders", "src", 3, &columns),
        &present("raw_orders", "tgt", 3, &columns),
    );

    assert_eq!(
        results,
        vec![ComparisonResult::Matched {
            pair: "orders <-> raw_orders".to_string()
        }]
    );
}

#[test]
fn test_null_against_nan_marker_is_equal() {
    // Null on one side, the "NaN" marker on the other
    let columns = [("id", ColumnType::Integer), ("score", ColumnType::Text)];
    let mock = MockSampleSource::new()
        .with_table("src", &["id", "score"], vec![vec![int(1), null()]])
        .with_table("tgt", &["id", "score"], vec![vec![int(1), text("NaN")]]);
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("scores", "raw_scores", &["id"], 5),
        &present("scores", "src", 1, &columns),
        &present("raw_scores", "tgt", 1, &columns),
    );

    assert!(matches!(&results[0], ComparisonResult::Matched { .. }));
}

#[test]
fn test_cell_mismatch_produces_diff_records() {
    let columns = [("id", ColumnType::Integer), ("name", ColumnType::Text)];
    let mock = MockSampleSource::new()
        .with_table(
            "src",
            &["id", "name"],
            vec![vec![int(1), text("Apple")], vec![int(2), text("Banana")]],
        )
        .with_table(
            "tgt",
            &["id", "name"],
            vec![vec![int(1), text("Apple")], vec![int(2), text("Cherry")]],
        );
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("fruit", "raw_fruit", &["id"], 5),
        &present("fruit", "src", 2, &columns),
        &present("raw_fruit", "tgt", 2, &columns),
    );

    match &results[0] {
        ComparisonResult::Mismatched { reason, diffs, .. } => {
            assert_eq!(*reason, MismatchReason::CellValues);
            assert_eq!(diffs.len(), 1);
            assert_eq!(diffs[0].column, "name");
            assert_eq!(diffs[0].source_value, "Banana");
            assert_eq!(diffs[0].target_value, "Cherry");
            assert_eq!(diffs[0].source_table, "fruit");
            assert_eq!(diffs[0].target_table, "raw_fruit");
        }
        other => panic!("Expected mismatched result, got {:?}", other),
    }
}

#[test]
fn test_sampling_bound_is_respected() {
    // Rows beyond the sample limit differ, but only the first `limit` rows
    // in key order are ever compared
    let columns = [("id", ColumnType::Integer), ("v", ColumnType::Text)];
    let src_rows: Vec<_> = (1..=9)
        .map(|i| vec![int(i), text(&format!("v{}", i))])
        .collect();
    let mut tgt_rows = src_rows.clone();
    tgt_rows[7][1] = text("changed");
    tgt_rows[8][1] = text("changed");

    let mock = MockSampleSource::new()
        .with_table("src", &["id", "v"], src_rows)
        .with_table("tgt", &["id", "v"], tgt_rows);
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("events", "raw_events", &["id"], 5),
        &present("events", "src", 9, &columns),
        &present("raw_events", "tgt", 9, &columns),
    );

    assert!(matches!(&results[0], ComparisonResult::Matched { .. }));
    for (_, spec) in mock.fetched.borrow().iter() {
        assert_eq!(spec.limit, 5);
    }
}

#[test]
fn test_key_resolution_drops_unshared_columns() {
    // Key is "id, region" but the target lacks "region"
    let src_columns = [
        ("id", ColumnType::Integer),
        ("region", ColumnType::Text),
        ("amount", ColumnType::Text),
    ];
    let tgt_columns = [("id", ColumnType::Integer), ("amount", ColumnType::Text)];

    let mock = MockSampleSource::new()
        .with_table(
            "src",
            &["id", "region", "amount"],
            vec![
                vec![int(2), text("eu"), text("20")],
                vec![int(1), text("us"), text("10")],
            ],
        )
        .with_table(
            "tgt",
            &["id", "amount"],
            vec![vec![int(1), text("10")], vec![int(2), text("20")]],
        );
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("sales", "raw_sales", &["id", "region"], 5),
        &present("sales", "src", 2, &src_columns),
        &present("raw_sales", "tgt", 2, &tgt_columns),
    );

    assert!(matches!(&results[0], ComparisonResult::Matched { .. }));

    // The resolved key fell back to ["id"] alone
    let fetched = mock.fetched.borrow();
    for (_, spec) in fetched.iter() {
        assert_eq!(spec.columns, vec!["id", "amount"]);
        let key_names: Vec<&str> = spec.sort_keys.iter().map(|k| k.column.as_str()).collect();
        assert_eq!(key_names, vec!["id"]);
    }
}

#[test]
fn test_no_usable_keys_falls_back_to_aligned_order() {
    let columns = [("a", ColumnType::Text), ("b", ColumnType::Text)];
    let mock = MockSampleSource::new()
        .with_table(
            "src",
            &["a", "b"],
            vec![vec![text("2"), text("y")], vec![text("1"), text("x")]],
        )
        .with_table(
            "tgt",
            &["a", "b"],
            vec![vec![text("1"), text("x")], vec![text("2"), text("y")]],
        );
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("t", "raw_t", &["missing_key"], 5),
        &present("t", "src", 2, &columns),
        &present("raw_t", "tgt", 2, &columns),
    );

    assert!(matches!(&results[0], ComparisonResult::Matched { .. }));
    let fetched = mock.fetched.borrow();
    let key_names: Vec<&str> = fetched[0].1.sort_keys.iter().map(|k| k.column.as_str()).collect();
    assert_eq!(key_names, vec!["a", "b"]);
}

#[test]
fn test_no_shared_columns_is_reported_not_crashed() {
    let mock = MockSampleSource::new();
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("left", "right", &["id"], 5),
        &present("left", "src", 2, &[("x", ColumnType::Text)]),
        &present("right", "tgt", 2, &[("y", ColumnType::Text)]),
    );

    match &results[0] {
        ComparisonResult::Mismatched { reason, diffs, .. } => {
            assert_eq!(*reason, MismatchReason::NoSharedColumns);
            assert!(diffs.is_empty());
        }
        other => panic!("Expected mismatched result, got {:?}", other),
    }
}

#[test]
fn test_source_key_is_cast_to_target_type_for_ordering() {
    // Source stores the key as text, target as integer: the source side
    // orders through a cast to the target's declared type
    let mock = MockSampleSource::new()
        .with_table("src", &["id"], vec![vec![text("1")]])
        .with_table("tgt", &["id"], vec![vec![int(1)]]);
    let engine = ComparisonEngine::new(&mock);

    engine.compare(
        &request("t", "raw_t", &["id"], 5),
        &present("t", "src", 1, &[("id", ColumnType::Text)]),
        &present("raw_t", "tgt", 1, &[("id", ColumnType::Integer)]),
    );

    let fetched = mock.fetched.borrow();
    let (src_view, src_spec) = &fetched[0];
    let (tgt_view, tgt_spec) = &fetched[1];
    assert_eq!(src_view, "src");
    assert_eq!(src_spec.sort_keys[0].cast_to, Some(ColumnType::Integer));
    assert_eq!(tgt_view, "tgt");
    assert_eq!(tgt_spec.sort_keys[0].cast_to, None);
}

#[test]
fn test_sample_failure_becomes_errored_result() {
    let columns = [("id", ColumnType::Integer)];
    let mock = MockSampleSource::new()
        .failing("src")
        .with_table("tgt", &["id"], vec![vec![int(1)]]);
    let engine = ComparisonEngine::new(&mock);

    let results = engine.compare(
        &request("orders", "raw_orders", &["id"], 5),
        &present("orders", "src", 1, &columns),
        &present("raw_orders", "tgt", 1, &columns),
    );

    assert_eq!(results.len(), 1);
    match &results[0] {
        ComparisonResult::Errored { pair, message } => {
            assert_eq!(pair, "orders <-> raw_orders");
            assert!(message.contains("orders"));
        }
        other => panic!("Expected errored result, got {:?}", other),
    }
}

#[test]
fn test_comparison_is_idempotent() {
    let columns = [("id", ColumnType::Integer), ("v", ColumnType::Text)];
    let mock = MockSampleSource::new()
        .with_table(
            "src",
            &["id", "v"],
            vec![vec![int(1), text("a")], vec![int(2), text("b")]],
        )
        .with_table(
            "tgt",
            &["id", "v"],
            vec![vec![int(1), text("x")], vec![int(2), text("b")]],
        );
    let engine = ComparisonEngine::new(&mock);
    let req = request("t", "raw_t", &["id"], 5);
    let source = present("t", "src", 2, &columns);
    let target = present("raw_t", "tgt", 2, &columns);

    let first = engine.compare(&req, &source, &target);
    let second = engine.compare(&req, &source, &target);
    assert_eq!(first, second);
}
