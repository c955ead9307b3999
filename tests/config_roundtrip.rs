use ampute::tables::{load_table, write_table};
use ampute::{AmputeOptions, ConfigFile, Mechanism, amputate, amputate_matrix};
use ndarray::{Array2, array};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tempfile::Builder;

fn normal_data(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    Array2::from_shape_fn((rows, cols), |_| normal.sample(&mut rng))
}

#[test]
fn saved_configuration_reproduces_the_run() {
    let data = normal_data(300, 4, 31);
    let options = AmputeOptions::default()
        .with_proportion(0.15)
        .with_patterns(array![[0.0, 0.0, 1.0, 1.0], [1.0, 1.0, 0.0, 1.0]])
        .with_frequencies(vec![1.0, 3.0])
        .with_mechanism(Mechanism::Mnar)
        .by_cells();
    let first = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(32)).unwrap();

    let file = Builder::new().suffix(".toml").tempfile().unwrap();
    ConfigFile::from_resolved(&first.config).save(file.path()).unwrap();
    let reloaded = ConfigFile::load(file.path()).unwrap().to_options().unwrap();
    let second = amputate_matrix(&data, &reloaded, &mut StdRng::seed_from_u64(32)).unwrap();

    assert_eq!(first.config, second.config);
    assert_eq!(first.candidates, second.candidates);
    assert_eq!(first.amputed, second.amputed);
    assert!(second.diagnostics.is_empty(), "{:?}", second.diagnostics);
}

#[test]
fn discrete_configuration_survives_a_file() {
    let data = normal_data(200, 3, 33);
    let options = AmputeOptions::default().discrete().configuration_only();
    let first = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(0)).unwrap();

    let file = Builder::new().suffix(".toml").tempfile().unwrap();
    ConfigFile::from_resolved(&first.config).save(file.path()).unwrap();
    let text = std::fs::read_to_string(file.path()).unwrap();
    assert!(text.contains("mechanism = \"MAR\""));
    assert!(text.contains("continuous = false"));

    let reloaded = ConfigFile::load(file.path()).unwrap().to_options().unwrap();
    assert_eq!(reloaded, first.config.to_options());
}

#[test]
fn amputed_tables_reload_with_their_missing_cells() {
    let data = normal_data(150, 3, 34);
    let options = AmputeOptions::default().with_proportion(0.6);
    let result = amputate_matrix(&data, &options, &mut StdRng::seed_from_u64(35)).unwrap();

    let file = Builder::new().suffix(".tsv").tempfile().unwrap();
    write_table(&result.amputed, file.path()).unwrap();
    let loaded = load_table(file.path()).unwrap();

    assert_eq!(loaded.missing_mask(), result.amputed.missing_mask());
    assert_eq!(loaded.column_names(), vec!["V1", "V2", "V3"]);
    assert!(amputate(&loaded, &options, &mut StdRng::seed_from_u64(36)).is_err());
}
