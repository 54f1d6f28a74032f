use float_cmp::approx_eq;
use geolab_core::{
    align, build_series, AlignmentError, ComparisonSelection, SieveRow, TestId, TestType,
};
use geolab_test_utils::{
    bearing_test, compaction_test, compaction_wet_test, particle_size_test, plasticity_test,
    with_hydrometer,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_compaction_scenario() {
    let a = compaction_test(1, &[(10.0, 1.80), (12.0, 1.90), (14.0, 1.85)]);
    let b = compaction_test(2, &[(11.0, 1.70), (12.0, 1.75), (13.0, 1.72)]);
    let table = align(&[a, b]).unwrap();

    assert_eq!(table.x_domain(), vec![10.0, 11.0, 12.0, 13.0, 14.0]);
    assert_eq!(table.rows[0].get("test_1"), Some(1.80));
    assert_eq!(table.rows[0].get("test_2"), None);
    assert_eq!(table.rows[2].get("test_1"), Some(1.90));
    assert_eq!(table.rows[2].get("test_2"), Some(1.75));
}

#[test]
fn test_single_test_reproduces_series() {
    let test = bearing_test(3, &[(5.0, 4.8), (2.5, 3.1), (2.5, 3.2)]);
    let series = build_series(TestType::BearingRatio, &test.points);
    let table = align(std::slice::from_ref(&test)).unwrap();

    let pairs: Vec<(f64, f64)> = table
        .rows
        .iter()
        .map(|r| (r.x, r.get("test_3").unwrap()))
        .collect();
    let expected: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(pairs, expected);
}

#[test]
fn test_raw_sieve_rows_are_charted() {
    let a = particle_size_test(1, 1000.0, &[(20.0, 100.0), (5.0, 300.0)]);
    let b = particle_size_test(2, 500.0, &[(20.0, 50.0), (2.0, 200.0)]);
    let table = align(&[a, b]).unwrap();

    assert_eq!(table.x_domain(), vec![2.0, 5.0, 20.0]);
    assert_eq!(table.column("test_1"), vec![None, Some(60.0), Some(90.0)]);
    assert_eq!(table.column("test_2"), vec![Some(50.0), None, Some(90.0)]);
}

#[test]
fn test_edited_retained_mass_replaces_stale_percentage() {
    let mut test = particle_size_test(1, 1000.0, &[(20.0, 100.0), (5.0, 300.0)]);
    test.points = test.reduced_points();
    test.points[0] = SieveRow::new(20.0, 200.0).into();

    let series = test.series();
    let pairs: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(pairs, vec![(5.0, 50.0), (20.0, 80.0)]);
}

#[test]
fn test_hydrometer_readings_join_sieve_curve() {
    let test = with_hydrometer(
        particle_size_test(4, 1000.0, &[(2.0, 400.0), (0.08, 200.0)]),
        &[(30.0, 0.02, 25.0), (240.0, 0.005, 12.0)],
    );
    let table = align(std::slice::from_ref(&test)).unwrap();
    assert_eq!(table.x_domain(), vec![0.005, 0.02, 0.08, 2.0]);
    assert_eq!(
        table.column("test_4"),
        vec![Some(12.0), Some(25.0), Some(40.0), Some(60.0)]
    );
}

#[test]
fn test_wet_density_compaction_is_charted() {
    let a = compaction_wet_test(1, &[(10.0, 2.2), (12.0, 2.24)]);
    let b = compaction_test(2, &[(12.0, 1.95)]);
    let table = align(&[a, b]).unwrap();

    assert_eq!(table.x_domain(), vec![10.0, 12.0]);
    let dry = table.column("test_1");
    assert!(approx_eq!(f64, dry[0].unwrap(), 2.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, dry[1].unwrap(), 2.0, epsilon = 1e-9));
    assert_eq!(table.rows[1].get("test_2"), Some(1.95));
}

#[test]
fn test_plasticity_aligns_on_log_blows() {
    let a = plasticity_test(1, &[(10, 45.0), (100, 30.0)]);
    let b = plasticity_test(2, &[(10, 50.0)]);
    let table = align(&[a, b]).unwrap();

    assert_eq!(table.x_domain(), vec![1.0, 2.0]);
    assert_eq!(table.column("test_1"), vec![Some(45.0), Some(30.0)]);
    assert_eq!(table.column("test_2"), vec![Some(50.0), None]);
}

#[test]
fn test_mixed_types_fall_back_to_empty() {
    let tests = vec![compaction_test(1, &[(10.0, 1.8)]), plasticity_test(2, &[(25, 40.0)])];
    assert!(matches!(
        align(&tests),
        Err(AlignmentError::TypeMismatch { position: 1, .. })
    ));
    assert!(align(&tests).unwrap_or_default().is_empty());
}

#[test]
fn test_legend_labels() {
    let a = compaction_test(1, &[(10.0, 1.8)]).with_reference("PR-2024-001");
    let b = compaction_test(2, &[(11.0, 1.7)]);
    let table = align(&[a, b]).unwrap();
    assert_eq!(table.meta_for(TestId(1)).unwrap().label, "PR-2024-001");
    assert_eq!(table.meta_for(TestId(2)).unwrap().label, "Test 2");
}

#[test]
fn test_selection_feeds_alignment() {
    let tests = vec![
        compaction_test(1, &[(10.0, 1.8)]),
        compaction_test(2, &[(12.0, 1.9)]),
        compaction_test(3, &[(14.0, 1.7)]),
        compaction_test(4, &[(16.0, 1.6)]),
    ];
    let mut selection = ComparisonSelection::default();
    for id in [3, 1, 2] {
        selection.toggle(TestId(id)).unwrap();
    }
    assert!(selection.toggle(TestId(4)).is_err());

    let table = selection.align(&tests).unwrap();
    let keys: Vec<&str> = table.series_meta.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["test_3", "test_1", "test_2"]);
    assert_eq!(table.x_domain(), vec![10.0, 12.0, 14.0]);
}

fn samples() -> impl Strategy<Value = Vec<(f64, f64)>> {
    // integral water contents so that shared abscissas actually occur
    prop::collection::vec(((0u8..30).prop_map(f64::from), 1.0f64..2.5), 0..8)
}

proptest! {
    #[test]
    fn prop_alignment_commutes(a in samples(), b in samples()) {
        let ta = compaction_test(1, &a);
        let tb = compaction_test(2, &b);
        let ab = align(&[ta.clone(), tb.clone()]).unwrap();
        let ba = align(&[tb, ta]).unwrap();

        prop_assert_eq!(ab.x_domain(), ba.x_domain());
        for key in ["test_1", "test_2"] {
            prop_assert_eq!(ab.column(key), ba.column(key));
        }
    }

    #[test]
    fn prop_domain_is_sorted_union(a in samples(), b in samples()) {
        let table = align(&[compaction_test(1, &a), compaction_test(2, &b)]).unwrap();
        let domain = table.x_domain();
        prop_assert!(domain.windows(2).all(|w| w[0] < w[1]));
        for (x, _) in a.iter().chain(b.iter()) {
            prop_assert!(domain.contains(x));
        }
    }
}
