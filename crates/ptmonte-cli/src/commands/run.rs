use crate::cli::RunArgs;
use crate::config::{PartialRunConfig, RunSettings};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use indicatif::MultiProgress;
use ptmonte::core::forcefield::params::{ForceField, ForceFieldBuilder};
use ptmonte::core::io::cif::CifFile;
use ptmonte::core::io::raspa::RaspaDefFile;
use ptmonte::core::io::series::{write_move_summary_to_path, write_series_to_path};
use ptmonte::core::io::traits::InputFile;
use ptmonte::core::models::lattice::Lattice;
use ptmonte::engine::error::EngineError;
use ptmonte::engine::progress::ProgressReporter;
use ptmonte::engine::statistics::mean_and_standard_error;
use ptmonte::workflows::adsorption::{self, AdsorptionResult};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_with_cli(&args)?;

    let forcefield = load_forcefield(&settings.forcefield)?
        .build(&settings.constants)
        .map_err(EngineError::from)?;
    let mut lattice = load_lattice(&settings.structure)?;
    let unresolved = forcefield.unresolved_types(lattice.atoms());
    if !unresolved.is_empty() {
        warn!(
            "Framework types without force-field parameters: {}",
            unresolved.join(", ")
        );
    }
    lattice
        .resolve_types(&forcefield)
        .map_err(EngineError::from)?;

    println!(
        "Simulating {} in {} ({} framework atoms) at {} K and {} Pa with {} chain(s)...",
        settings.guest.particle_type,
        settings.structure.display(),
        lattice.atoms().len(),
        settings.temperature,
        settings.pressure,
        settings.chains
    );

    let results = run_chains(&forcefield, &lattice, &settings)?;

    for (chain, result) in results.iter().enumerate() {
        if let Some(path) = &settings.series_output {
            let path = chain_output_path(path, chain, settings.chains);
            info!("Writing particle-count series of chain {} to {:?}", chain, path);
            write_series_to_path(&path, &result.series).map_err(|e| CliError::FileWriting {
                path: path.clone(),
                source: e.into(),
            })?;
        }
        if let Some(path) = &settings.moves_output {
            let path = chain_output_path(path, chain, settings.chains);
            write_move_summary_to_path(&path, &result.moves).map_err(|e| CliError::FileWriting {
                path: path.clone(),
                source: e.into(),
            })?;
        }
    }

    print_report(&results);
    Ok(())
}

pub(crate) fn load_forcefield(path: &Path) -> Result<ForceFieldBuilder> {
    info!("Loading force field from {:?}", path);
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let loaded = if is_toml {
        ForceFieldBuilder::load_toml(path).map_err(anyhow::Error::from)
    } else {
        RaspaDefFile::read_from_path(path).map_err(anyhow::Error::from)
    };
    loaded.map_err(|source| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn load_lattice(path: &Path) -> Result<Lattice> {
    info!("Loading framework structure from {:?}", path);
    let structure = CifFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(structure.into_lattice().map_err(EngineError::from)?)
}

fn run_chains(
    forcefield: &ForceField,
    lattice: &Lattice,
    settings: &RunSettings,
) -> Result<Vec<AdsorptionResult>> {
    let multi = MultiProgress::new();
    (0..settings.chains)
        .into_par_iter()
        .map(|chain| -> Result<AdsorptionResult> {
            let config = settings.chain_config(chain)?;
            let handler = CliProgressHandler::attached(&multi, format!("chain {}", chain));
            let reporter = ProgressReporter::with_callback(handler.get_callback());
            info!("Starting chain {}.", chain);
            Ok(adsorption::run(forcefield, lattice, &config, &reporter)?)
        })
        .collect()
}

/// `base` for a single chain, otherwise `base` with `_chain<i>` appended to its stem.
fn chain_output_path(base: &Path, chain: usize, chains: usize) -> PathBuf {
    if chains <= 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match base.extension() {
        Some(ext) => format!("{}_chain{}.{}", stem, chain, ext.to_string_lossy()),
        None => format!("{}_chain{}", stem, chain),
    };
    base.with_file_name(file_name)
}

fn print_report(results: &[AdsorptionResult]) {
    let mut chain_means = Vec::with_capacity(results.len());
    for (chain, result) in results.iter().enumerate() {
        match &result.summary {
            Some(summary) => {
                let error = summary
                    .std_error
                    .map(|e| format!(" ± {:.3}", e))
                    .unwrap_or_default();
                println!(
                    "  chain {}: <N> = {:.3}{} over {} samples",
                    chain, summary.mean, error, summary.samples
                );
                chain_means.push(summary.mean);
            }
            None => {
                warn!("Chain {} recorded no production samples.", chain);
                println!("  chain {}: no production samples", chain);
            }
        }
        for record in &result.moves {
            let rate = record
                .accept_rate
                .map(|r| format!("{:.3}", r))
                .unwrap_or_else(|| "n/a".to_string());
            println!(
                "    {:<18} {:>10} attempts, acceptance {}",
                record.name, record.attempts, rate
            );
        }
        println!(
            "    guest-framework energy: {:.2} K (vdW {:.2}, Coulomb {:.2})",
            result.framework_energy.total(),
            result.framework_energy.vdw,
            result.framework_energy.coulomb
        );
        if let Some(gas) = result.final_gas_count {
            println!("    gas box holds {} particles", gas);
        }
    }

    if chain_means.len() > 1 {
        if let Some((mean, std_error)) = mean_and_standard_error(&chain_means) {
            println!(
                "Adsorbed particles across {} chains: {:.3} ± {:.3}",
                chain_means.len(),
                mean,
                std_error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    const FRAMEWORK: &str = "\
data_box
_cell_length_a 12
_cell_length_b 12
_cell_length_c 12
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 0.0 0.0 0.0
";

    const FORCEFIELD: &str = "\
# rule
shifted
# tail corrections
no
# number of defined interactions
2
# type interaction
Zn_     lennard-jones    62.40     2.46
CH4_sp3 lennard-jones   148.00     3.73
";

    fn write_inputs(dir: &Path, extra: &str) -> PathBuf {
        fs::write(dir.join("frame.cif"), FRAMEWORK).unwrap();
        fs::write(dir.join("ff.def"), FORCEFIELD).unwrap();
        let config = format!(
            r#"
[structure]
path = "{}"

[forcefield]
path = "{}"

[guest]
type = "CH4_sp3"
mass = 16.04

[conditions]
temperature = 300.0
pressure = 1.0e6

[run]
equilibration-steps = 200
production-steps = 500
blocks = 5
seed = 3
{}
"#,
            dir.join("frame.cif").display(),
            dir.join("ff.def").display(),
            extra
        );
        let path = dir.join("run.toml");
        fs::write(&path, config).unwrap();
        path
    }

    fn args_for(config: &Path, extra: &[&str]) -> RunArgs {
        let mut argv = vec!["ptmc", "run", "-c", config.to_str().unwrap()];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            other => panic!("Expected 'run' subcommand, got {:?}", other),
        }
    }

    #[test]
    fn chain_output_paths_are_suffixed_only_for_multiple_chains() {
        let base = Path::new("out/series.csv");
        assert_eq!(chain_output_path(base, 0, 1), PathBuf::from("out/series.csv"));
        assert_eq!(
            chain_output_path(base, 2, 4),
            PathBuf::from("out/series_chain2.csv")
        );
        assert_eq!(
            chain_output_path(Path::new("series"), 1, 2),
            PathBuf::from("series_chain1")
        );
    }

    #[test]
    fn run_writes_series_and_move_summary() {
        let dir = tempdir().unwrap();
        let moves_path = dir.path().join("moves.csv");
        let extra = format!("\n[output]\nmoves = \"{}\"\n", moves_path.display());
        let config = write_inputs(dir.path(), &extra);
        let series_path = dir.path().join("series.csv");

        run(args_for(&config, &["-o", series_path.to_str().unwrap()])).unwrap();

        let series = fs::read_to_string(&series_path).unwrap();
        // Header plus one row per production step.
        assert_eq!(series.lines().count(), 501);
        let moves = fs::read_to_string(&moves_path).unwrap();
        assert!(moves.contains("insertion"));
        assert!(moves.contains("deletion"));
    }

    #[test]
    fn multiple_chains_write_one_series_each() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path(), "");
        let series_path = dir.path().join("n.csv");

        run(args_for(
            &config,
            &["--chains", "2", "-o", series_path.to_str().unwrap()],
        ))
        .unwrap();

        assert!(dir.path().join("n_chain0.csv").exists());
        assert!(dir.path().join("n_chain1.csv").exists());
        assert!(!series_path.exists());
    }

    #[test]
    fn unknown_framework_type_fails_before_running() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path(), "");
        fs::write(
            dir.path().join("frame.cif"),
            FRAMEWORK.replace("Zn1", "Cu1"),
        )
        .unwrap();

        let err = run(args_for(&config, &[])).unwrap_err();
        assert!(matches!(err, CliError::Engine(EngineError::TypeResolution { .. })));
    }

    #[test]
    fn toml_forcefield_is_detected_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ff.toml");
        fs::write(
            &path,
            "missing = [\"H_\"]\n[[types]]\nname = \"Ar\"\nsigma = 3.4\nepsilon = 120.0\n",
        )
        .unwrap();
        assert_eq!(load_forcefield(&path).unwrap().len(), 1);
    }

    #[test]
    fn missing_structure_file_is_a_parse_error() {
        let err = load_lattice(Path::new("/nonexistent/frame.cif")).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }
}
