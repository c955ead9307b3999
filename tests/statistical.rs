use ampute::{AmputationType, AmputeOptions, Mechanism, OddsMatrix, amputate_matrix};
use ndarray::{Array2, array};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

fn normal_data(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(10.0, 2.0).unwrap();
    Array2::from_shape_fn((rows, cols), |_| normal.sample(&mut rng))
}

/// Mean of `column` in the original data over rows that were (or were not) amputed.
fn split_means(data: &Array2<f64>, missing: &[bool], column: usize) -> (f64, f64) {
    let (mut amputed, mut kept) = (Vec::new(), Vec::new());
    for (row, &m) in missing.iter().enumerate() {
        if m {
            amputed.push(data[[row, column]]);
        } else {
            kept.push(data[[row, column]]);
        }
    }
    let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
    (mean(&amputed), mean(&kept))
}

fn missing_in(result: &ampute::AmputationResult, column: usize) -> Vec<bool> {
    result.amputed.missing_mask().column(column).to_vec()
}

#[test]
fn right_tailed_mar_targets_high_observed_values() {
    let data = normal_data(3000, 2, 11);
    let options = AmputeOptions::default()
        .with_proportion(0.4)
        .with_patterns(array![[0.0, 1.0]]);
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(12)).unwrap();

    let missing = missing_in(&result, 0);
    let (amputed, kept) = split_means(&data, &missing, 1);
    assert!(amputed > kept + 1.0, "amputed mean {amputed}, kept mean {kept}");
    let share = result.incomplete_case_fraction();
    assert!((share - 0.4).abs() < 0.03, "incomplete share {share}");
}

#[test]
fn left_tailed_mar_targets_low_observed_values() {
    let data = normal_data(3000, 2, 13);
    let options = AmputeOptions::default()
        .with_proportion(0.3)
        .with_patterns(array![[0.0, 1.0]])
        .with_types(vec![AmputationType::Left]);
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(14)).unwrap();

    let (amputed, kept) = split_means(&data, &missing_in(&result, 0), 1);
    assert!(amputed < kept - 1.0, "amputed mean {amputed}, kept mean {kept}");
}

#[test]
fn mid_and_tail_split_on_distance_from_the_centre() {
    let data = normal_data(4000, 2, 15);
    let centre = data.column(1).mean().unwrap();
    let spread = |missing: &[bool], amputed: bool| {
        let values: Vec<f64> = missing
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m == amputed)
            .map(|(row, _)| (data[[row, 1]] - centre).abs())
            .collect();
        values.iter().sum::<f64>() / values.len() as f64
    };

    for (kind, seed) in [(AmputationType::Mid, 16), (AmputationType::Tail, 17)] {
        let options = AmputeOptions::default()
            .with_proportion(0.5)
            .with_patterns(array![[0.0, 1.0]])
            .with_types(vec![kind]);
        let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(seed)).unwrap();
        let missing = missing_in(&result, 0);
        let (amputed, kept) = (spread(&missing, true), spread(&missing, false));
        match kind {
            AmputationType::Mid => assert!(amputed < kept, "{amputed} vs {kept}"),
            _ => assert!(amputed > kept, "{amputed} vs {kept}"),
        }
    }
}

#[test]
fn mnar_depends_on_the_amputed_values() {
    let data = normal_data(3000, 2, 18);
    let options = AmputeOptions::default()
        .with_proportion(0.5)
        .with_patterns(array![[0.0, 1.0]])
        .with_mechanism(Mechanism::Mnar);
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(19)).unwrap();

    let missing = missing_in(&result, 0);
    let (amputed_self, kept_self) = split_means(&data, &missing, 0);
    let (amputed_other, kept_other) = split_means(&data, &missing, 1);
    assert!(amputed_self > kept_self + 1.0);
    assert!((amputed_other - kept_other).abs() < 0.3);
}

#[test]
fn mcar_is_independent_of_values() {
    let data = normal_data(4000, 2, 20);
    let options = AmputeOptions::default()
        .with_proportion(0.5)
        .with_patterns(array![[0.0, 1.0]])
        .with_mechanism(Mechanism::Mcar);
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(21)).unwrap();
    let missing = missing_in(&result, 0);
    for column in 0..2 {
        let (amputed, kept) = split_means(&data, &missing, column);
        assert!((amputed - kept).abs() < 0.3, "column {column}: {amputed} vs {kept}");
    }
}

#[test]
fn discrete_model_meets_the_proportion_across_seeds() {
    let data = normal_data(1000, 3, 22);
    let options = AmputeOptions::default()
        .with_proportion(0.35)
        .discrete()
        .with_odds(OddsMatrix::from_rows(&[
            vec![1.0, 2.0, 3.0, 4.0],
            vec![4.0, 1.0],
            vec![1.0, 1.0, 5.0],
        ]));

    let runs = 20;
    let mean_share: f64 = (0..runs)
        .map(|seed| {
            amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(100 + seed))
                .unwrap()
                .incomplete_case_fraction()
        })
        .sum::<f64>()
        / runs as f64;
    assert!((mean_share - 0.35).abs() < 0.015, "mean share {mean_share}");
}

#[test]
fn discrete_odds_favour_the_high_groups() {
    let data = normal_data(4000, 2, 23);
    let options = AmputeOptions::default()
        .with_proportion(0.3)
        .with_patterns(array![[0.0, 1.0]])
        .discrete()
        .with_odds(OddsMatrix::from_rows(&[vec![1.0, 4.0]]));
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(24)).unwrap();

    let median = {
        let mut values = data.column(1).to_vec();
        values.sort_by(f64::total_cmp);
        values[values.len() / 2]
    };
    let missing = missing_in(&result, 0);
    let (mut low, mut high) = (0usize, 0usize);
    for (row, &m) in missing.iter().enumerate() {
        if m && data[[row, 1]] < median {
            low += 1;
        } else if m {
            high += 1;
        }
    }
    let ratio = high as f64 / low as f64;
    assert!((2.5..6.5).contains(&ratio), "high/low ratio {ratio}");
}
