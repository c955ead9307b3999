#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use ampute::diagnostics::Diagnostics;
use ampute::tables::{load_table, write_assignments, write_table};
use ampute::{
    AmputationResult, AmputationType, AmputeOptions, ConfigFile, Mechanism, OddsInput, OddsMatrix,
    PatternInput, WeightsInput, amputate,
};

#[derive(Parser)]
#[command(
    name = "ampute",
    about = "Generate multivariate missing data for evaluating imputation methods",
    long_about = "Amputes a complete data table: cases are assigned to missing-data patterns \
                 and made incomplete under an MCAR, MAR or MNAR mechanism, so that imputation \
                 methods can be compared against the known complete data."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand that resolves a configuration.
#[derive(Args)]
struct AmputeArgs {
    /// Start from a configuration saved with --save-config; other flags override it
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Proportion of incomplete cases (or cells with --by-cells), as a fraction or a percentage
    #[arg(long)]
    prop: Option<f64>,

    /// Missingness mechanism: MCAR, MAR or MNAR
    #[arg(long, value_delimiter = ',')]
    mech: Option<Vec<String>>,

    /// Patterns as rows separated by ';' and values by ',', e.g. "0,1,1;1,0,1"
    #[arg(long)]
    patterns: Option<String>,

    /// Relative pattern frequencies, e.g. "0.3,0.7"
    #[arg(long, value_delimiter = ',')]
    freq: Option<Vec<f64>>,

    /// Weights matrix in the same layout as --patterns
    #[arg(long)]
    weights: Option<String>,

    /// Odds per pattern for the discrete model; a single row applies to every pattern
    #[arg(long)]
    odds: Option<String>,

    /// Logistic curve per pattern: LEFT, MID, TAIL or RIGHT
    #[arg(long = "type", value_delimiter = ',')]
    types: Option<Vec<String>>,

    /// Do not standardize the data before computing sum scores
    #[arg(long)]
    no_std: bool,

    /// Use the discrete odds model instead of logistic curves
    #[arg(long)]
    discrete: bool,

    /// Interpret --prop as the proportion of missing cells
    #[arg(long)]
    by_cells: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ampute a complete TSV or CSV table
    #[command(about = "Generate missing values (outputs: amputed table)")]
    Run {
        /// Complete input table with a header row
        data: PathBuf,

        /// Where to write the amputed table
        #[arg(long)]
        output: PathBuf,

        /// Optionally write the pattern assigned to every row
        #[arg(long)]
        assignments: Option<PathBuf>,

        /// Optionally save the resolved configuration as TOML
        #[arg(long)]
        save_config: Option<PathBuf>,

        #[command(flatten)]
        args: AmputeArgs,
    },
    /// Resolve and print the configuration without amputing
    #[command(about = "Show the resolved configuration for a table")]
    Inspect {
        data: PathBuf,

        #[arg(long)]
        save_config: Option<PathBuf>,

        #[command(flatten)]
        args: AmputeArgs,
    },
    #[command(about = "Display version and build information")]
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let Cli { command } = cli;

    let result = match command {
        Some(Commands::Run {
            data,
            output,
            assignments,
            save_config,
            args,
        }) => run(data, output, assignments, save_config, args),
        Some(Commands::Inspect {
            data,
            save_config,
            args,
        }) => inspect(data, save_config, args),
        Some(Commands::Version) => {
            print_version_info();
            Ok(())
        }
        None => {
            let _ = Cli::command().print_help();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn invalid_input(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidInput, message))
}

/// Parses "a,b,c;d,e,f" into rows of numbers. Rows may differ in length.
fn parse_rows(flag: &str, text: &str) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    text.split(';')
        .filter(|row| !row.trim().is_empty())
        .map(|row| {
            row.split(',')
                .map(|value| {
                    value.trim().parse::<f64>().map_err(|_| {
                        invalid_input(format!("--{flag}: '{}' is not a number", value.trim()))
                    })
                })
                .collect()
        })
        .collect()
}

fn parse_matrix(flag: &str, text: &str) -> Result<ndarray::Array2<f64>, Box<dyn Error>> {
    let rows = parse_rows(flag, text)?;
    let width = rows.first().map_or(0, Vec::len);
    if let Some(i) = rows.iter().position(|row| row.len() != width) {
        return Err(invalid_input(format!(
            "--{flag}: row {} has {} values, but row 1 has {width}",
            i + 1,
            rows[i].len()
        )));
    }
    Ok(ndarray::Array2::from_shape_fn((rows.len(), width), |(i, j)| rows[i][j]))
}

/// Builds the run options. Diagnostics raised while reading the flags are returned
/// alongside, since they precede the run that collects the rest.
fn build_options(args: &AmputeArgs) -> Result<(AmputeOptions, Diagnostics), Box<dyn Error>> {
    let mut diagnostics = Diagnostics::new();
    let mut options = match &args.config {
        Some(path) => {
            log::info!("Starting from configuration '{}'", path.display());
            ConfigFile::load(path)?.to_options()?
        }
        None => AmputeOptions::default(),
    };
    if let Some(prop) = args.prop {
        options.proportion = prop;
    }
    if let Some(tokens) = &args.mech {
        options.mechanism = Mechanism::from_tokens(tokens.as_slice(), &mut diagnostics)?;
    }
    if let Some(text) = &args.patterns {
        options.patterns = Some(PatternInput::Matrix(parse_matrix("patterns", text)?));
    }
    if let Some(freq) = &args.freq {
        options.frequencies = Some(freq.clone());
    }
    if let Some(text) = &args.weights {
        options.weights = Some(WeightsInput::Matrix(parse_matrix("weights", text)?));
    }
    if let Some(text) = &args.odds {
        let rows = parse_rows("odds", text)?;
        options.odds = Some(match rows.as_slice() {
            [single] => OddsInput::Shared(single.clone()),
            _ => OddsInput::Matrix(OddsMatrix::from_rows(&rows)),
        });
    }
    if let Some(tokens) = &args.types {
        let types = tokens
            .iter()
            .map(|t| t.parse::<AmputationType>())
            .collect::<Result<Vec<_>, _>>()?;
        options.types = Some(types);
    }
    if args.no_std {
        options.standardize = false;
    }
    if args.discrete {
        options.continuous = false;
    }
    if args.by_cells {
        options.by_cases = false;
    }
    Ok((options, diagnostics))
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_config(result: &AmputationResult, flag_notes: &Diagnostics) {
    let config = &result.config;
    println!(
        "Mechanism: {}  Proportion (cases): {:.4}  Model: {}",
        config.mechanism,
        config.proportion,
        if config.continuous { "logistic" } else { "odds" }
    );
    for i in 0..config.n_patterns() {
        let mut line = format!(
            "Pattern {}: [{}]  freq {:.4}",
            i + 1,
            config.patterns.row(i).iter().join(" "),
            config.frequencies[i]
        );
        if config.mechanism.uses_scores() {
            line.push_str(&format!(
                "  weights [{}]",
                config.weights.row(i).iter().map(|w| format!("{w}")).join(" ")
            ));
            if config.continuous {
                line.push_str(&format!("  type {}", config.types[i]));
            } else {
                line.push_str(&format!("  odds [{}]", config.odds.present(i).iter().join(" ")));
            }
        }
        println!("{line}");
    }
    for diagnostic in flag_notes.entries().iter().chain(&result.diagnostics) {
        println!("Note: {diagnostic}");
    }
}

fn save_config(result: &AmputationResult, path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    if let Some(path) = path {
        ConfigFile::from_resolved(&result.config).save(&path)?;
        println!("Configuration saved to '{}'", path.display());
    }
    Ok(())
}

fn run(
    data: PathBuf,
    output: PathBuf,
    assignments: Option<PathBuf>,
    config_path: Option<PathBuf>,
    args: AmputeArgs,
) -> Result<(), Box<dyn Error>> {
    let dataset = load_table(&data)?;
    let (options, flag_notes) = build_options(&args)?;
    let mut rng = rng_for(args.seed);
    let result = amputate(&dataset, &options, &mut rng)?;

    print_config(&result, &flag_notes);
    write_table(&result.amputed, &output)?;
    if let Some(path) = assignments {
        write_assignments(&result.candidates, &path)?;
    }
    save_config(&result, config_path)?;

    println!(
        "Incomplete cases: {:.4}  Missing cells: {:.4}",
        result.incomplete_case_fraction(),
        result.missing_cell_fraction()
    );
    println!("Amputed data written to '{}'", output.display());
    Ok(())
}

fn inspect(
    data: PathBuf,
    config_path: Option<PathBuf>,
    args: AmputeArgs,
) -> Result<(), Box<dyn Error>> {
    let dataset = load_table(&data)?;
    println!(
        "Data: {} rows, {} columns ({})",
        dataset.nrows(),
        dataset.ncols(),
        dataset.column_names().iter().join(", ")
    );
    let (options, flag_notes) = build_options(&args)?;
    let result = amputate(&dataset, &options.configuration_only(), &mut rng_for(args.seed))?;
    print_config(&result, &flag_notes);
    save_config(&result, config_path)
}

fn print_version_info() {
    let version = env!("CARGO_PKG_VERSION");
    let release_tag = option_env!("AMPUTE_RELEASE_TAG");

    println!("ampute {}", version);

    match release_tag {
        Some(tag) => println!("Release: {}", tag),
        None => println!("Release: development build"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampute::Diagnostic;

    fn inspect_args(flags: &[&str]) -> AmputeArgs {
        let argv = ["ampute", "inspect", "data.tsv"].iter().chain(flags);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Inspect { args, .. }) => args,
            _ => panic!("expected the inspect subcommand"),
        }
    }

    #[test]
    fn extra_mechanisms_become_printed_notes() {
        let (options, notes) = build_options(&inspect_args(&["--mech", "MNAR,MAR"])).unwrap();
        assert_eq!(options.mechanism, Mechanism::Mnar);
        assert_eq!(
            notes.entries(),
            [Diagnostic::MultipleValues {
                argument: "mechanism",
                used: "MNAR".to_string()
            }]
        );

        let (_, quiet) = build_options(&inspect_args(&["--mech", "MCAR"])).unwrap();
        assert!(quiet.entries().is_empty());
    }

    #[test]
    fn matrix_flags_parse_rows() {
        let (options, _) =
            build_options(&inspect_args(&["--patterns", "0,1,1;1,0,1", "--odds", "1,2"])).unwrap();
        assert_eq!(
            options.patterns,
            Some(PatternInput::Matrix(ndarray::array![[0.0, 1.0, 1.0], [1.0, 0.0, 1.0]]))
        );
        assert_eq!(options.odds, Some(OddsInput::Shared(vec![1.0, 2.0])));
        assert!(build_options(&inspect_args(&["--weights", "1,2;3"])).is_err());
    }
}
