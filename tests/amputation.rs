use ampute::diagnostics::Diagnostics;
use ampute::normalize::resolve_config;
use ampute::{
    AmputationType, AmputeOptions, Column, Dataset, Diagnostic, Mechanism, amputate,
    amputate_matrix,
};
use approx::assert_relative_eq;
use ndarray::{Array2, array};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

fn normal_data(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    Array2::from_shape_fn((rows, cols), |_| normal.sample(&mut rng))
}

#[test]
fn mcar_single_pattern_only_touches_its_variable() {
    let data = normal_data(100, 4, 1);
    let options = AmputeOptions::default()
        .with_proportion(0.3)
        .with_mechanism(Mechanism::Mcar)
        .with_patterns(array![[0.0, 1.0, 1.0, 1.0]]);

    let mut total = 0;
    for seed in 0..50 {
        let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mask = result.amputed.missing_mask();
        for col in 1..4 {
            assert!(mask.column(col).iter().all(|&m| !m));
        }
        assert!(result.candidates.iter().all(|&c| c == 1));
        assert!(result.scores.is_empty());
        total += mask.column(0).iter().filter(|&&m| m).count();
    }
    let share = total as f64 / 5000.0;
    assert!((share - 0.3).abs() < 0.02, "missing share {share}");
}

#[test]
fn two_patterns_keep_their_own_missingness() {
    let data = normal_data(400, 3, 2);
    let options = AmputeOptions::default()
        .with_proportion(0.5)
        .with_patterns(array![[0.0, 0.0, 1.0], [1.0, 1.0, 0.0]])
        .with_frequencies(vec![0.3, 0.7]);
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(3)).unwrap();
    let mask = result.amputed.missing_mask();

    for (row, &label) in result.candidates.iter().enumerate() {
        let missing: Vec<bool> = mask.row(row).to_vec();
        match label {
            1 => assert!(missing == [false, false, false] || missing == [true, true, false]),
            2 => assert!(missing == [false, false, false] || missing == [false, false, true]),
            other => panic!("unexpected pattern label {other}"),
        }
    }
    let first = result.candidates.iter().filter(|&&c| c == 1).count();
    assert!((60..180).contains(&first), "pattern 1 received {first} cases");
    assert_eq!(result.scores.len(), 2);
    assert_eq!(result.scores[0].len(), first);
}

#[test]
fn defaults_cover_every_variable() {
    let data = normal_data(50, 5, 4);
    let options = AmputeOptions::default().configuration_only();
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(0)).unwrap();
    let config = &result.config;

    assert_eq!(config.n_patterns(), 5);
    for i in 0..5 {
        assert_eq!(config.amputed_variables(i), vec![i]);
        assert_relative_eq!(config.frequencies[i], 0.2, epsilon = 1e-12);
    }
    assert_eq!(config.mechanism, Mechanism::Mar);
    assert_eq!(config.types, vec![AmputationType::Right; 5]);
    assert_eq!(config.weights, config.patterns.mapv(f64::from));
    assert_eq!(config.odds.present(3), vec![1.0, 2.0, 3.0, 4.0]);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn resolved_configuration_is_a_fixed_point() {
    let options = AmputeOptions::default()
        .with_proportion(30.0)
        .with_patterns(array![
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 0.0, 0.0]
        ])
        .with_frequencies(vec![2.0, 1.0])
        .with_mechanism(Mechanism::Mnar)
        .by_cells();

    let mut diagnostics = Diagnostics::new();
    let first = resolve_config(&options, (200, 3), &mut diagnostics).unwrap();
    assert!(!diagnostics.entries().is_empty());

    let mut again = Diagnostics::new();
    let second = resolve_config(&first.to_options(), (200, 3), &mut again).unwrap();
    assert_eq!(first, second);
    assert!(again.entries().is_empty(), "{:?}", again.entries());
}

#[test]
fn percentages_and_dropped_patterns_are_reported() {
    let data = normal_data(80, 3, 5);
    let options = AmputeOptions::default()
        .with_proportion(40.0)
        .with_patterns(array![[0.0, 1.0, 1.0], [1.0, 1.0, 1.0]])
        .with_frequencies(vec![0.5, 0.5])
        .configuration_only();
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(0)).unwrap();

    assert!(result.diagnostics.contains(&Diagnostic::PercentageProportion {
        supplied: 40.0,
        used: 0.4
    }));
    assert_relative_eq!(result.config.proportion, 0.2, epsilon = 1e-12);
    assert_eq!(result.config.n_patterns(), 1);
}

#[test]
fn cell_proportion_is_met_on_average() {
    let data = normal_data(2000, 4, 6);
    let options = AmputeOptions::default()
        .with_proportion(0.1)
        .with_mechanism(Mechanism::Mcar)
        .by_cells();
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(7)).unwrap();

    assert_relative_eq!(result.config.proportion, 0.4, epsilon = 1e-12);
    let cells = result.missing_cell_fraction();
    assert!((cells - 0.1).abs() < 0.015, "missing cells {cells}");
}

#[test]
fn labels_survive_amputation() {
    let rows = 120;
    let data = Dataset::new(vec![
        Column::numeric("height", (0..rows).map(|i| 150.0 + i as f64 * 0.3).collect()),
        Column::text(
            "colour",
            (0..rows).map(|i| ["red", "green", "blue"][i % 3]).collect(),
        ),
    ])
    .unwrap();
    let options = AmputeOptions::default()
        .with_proportion(0.5)
        .with_patterns(array![[1.0, 0.0]]);
    let result = amputate(&data, &options, &mut StdRng::seed_from_u64(8)).unwrap();

    let mask = result.amputed.missing_mask();
    assert!(mask.column(0).iter().all(|&m| !m));
    assert!(mask.column(1).iter().any(|&m| m));
    assert_eq!(result.amputed.column_names(), vec!["height", "colour"]);
}
