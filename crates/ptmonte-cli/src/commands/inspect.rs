use super::run::load_forcefield;
use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use ptmonte::core::constants::PhysicalConstants;
use ptmonte::core::io::cif::CifFile;
use ptmonte::core::io::traits::InputFile;
use ptmonte::core::models::container::PeriodicCell;
use ptmonte::engine::error::EngineError;
use std::fmt::Write;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    let report = inspect(&args)?;
    print!("{}", report);
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<String> {
    info!("Reading framework structure from {:?}", &args.structure);
    let structure = CifFile::read_from_path(&args.structure).map_err(|e| CliError::FileParsing {
        path: args.structure.clone(),
        source: e.into(),
    })?;
    let name = structure
        .name
        .clone()
        .unwrap_or_else(|| args.structure.display().to_string());
    let operator_count = structure.operators.len().max(1);
    let asymmetric_count = structure.asymmetric_unit.len();
    let lattice = structure.into_lattice().map_err(EngineError::from)?;
    let cell = lattice.cell();

    let mut out = String::new();
    let _ = writeln!(out, "Framework: {}", name);
    let _ = writeln!(
        out,
        "  cell: a={:.4} b={:.4} c={:.4} alpha={:.2} beta={:.2} gamma={:.2}",
        cell.a, cell.b, cell.c, cell.alpha, cell.beta, cell.gamma
    );
    let _ = writeln!(out, "  volume: {:.3} Å³", lattice.volume());
    let _ = writeln!(
        out,
        "  atoms: {} in the asymmetric unit, {} after {} symmetry operator(s)",
        asymmetric_count,
        lattice.atoms().len(),
        operator_count
    );

    if let Some(path) = &args.forcefield {
        let forcefield = load_forcefield(path)?
            .build(&PhysicalConstants::default())
            .map_err(EngineError::from)?;
        let unresolved = forcefield.unresolved_types(lattice.atoms());
        if unresolved.is_empty() {
            let _ = writeln!(
                out,
                "  force field: all framework types resolve against {} table entries",
                forcefield.types().len()
            );
        } else {
            let _ = writeln!(out, "  force field: unresolved types {}", unresolved.join(", "));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const FRAMEWORK: &str = "\
data_pair
_cell_length_a 10
_cell_length_b 10
_cell_length_c 10
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_symmetry_equiv_pos_as_xyz
'x,y,z'
'-x,-y,-z'
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 0.0 0.0 0.0
O1 0.1 0.2 0.3
";

    fn args(dir: &std::path::Path, forcefield: Option<&str>) -> InspectArgs {
        let structure = dir.join("pair.cif");
        fs::write(&structure, FRAMEWORK).unwrap();
        let forcefield = forcefield.map(|table| {
            let path = dir.join("ff.toml");
            fs::write(&path, table).unwrap();
            path
        });
        InspectArgs {
            structure,
            forcefield,
        }
    }

    #[test]
    fn reports_cell_and_expanded_atom_count() {
        let dir = tempdir().unwrap();
        let report = inspect(&args(dir.path(), None)).unwrap();
        assert!(report.contains("Framework: pair"));
        assert!(report.contains("volume: 1000.000"));
        assert!(report.contains("2 in the asymmetric unit, 3 after 2 symmetry operator(s)"));
        assert!(!report.contains("force field"));
    }

    #[test]
    fn lists_unresolved_framework_types() {
        let dir = tempdir().unwrap();
        let table = "[[types]]\nname = \"Zn_\"\nsigma = 2.46\nepsilon = 62.4\n";
        let report = inspect(&args(dir.path(), Some(table))).unwrap();
        assert!(report.contains("unresolved types O1"));
    }

    #[test]
    fn missing_structure_is_reported() {
        let args = InspectArgs {
            structure: PathBuf::from("/nonexistent/pair.cif"),
            forcefield: None,
        };
        assert!(matches!(inspect(&args), Err(CliError::FileParsing { .. })));
    }
}
