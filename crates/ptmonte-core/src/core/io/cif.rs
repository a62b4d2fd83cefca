use super::traits::InputFile;
use crate::core::models::cell::{CellParameters, GeometryError};
use crate::core::models::lattice::Lattice;
use crate::core::models::particle::Particle;
use crate::core::models::symmetry::{SymmetryOperator, SymmetryParseError};
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::{debug, warn};

const SYMMETRY_TAGS: [&str; 2] = [
    "_symmetry_equiv_pos_as_xyz",
    "_space_group_symop_operation_xyz",
];

#[derive(Debug, Error)]
pub enum CifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Invalid symmetry operator on line {line}: {source}")]
    Symmetry {
        line: usize,
        #[source]
        source: SymmetryParseError,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(&'static str),
}

/// A crystal structure as read from a CIF file, before symmetry expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct CrystalStructure {
    /// Name of the `data_` block, if present.
    pub name: Option<String>,
    pub cell: CellParameters,
    /// Asymmetric-unit atoms with **fractional** positions.
    pub asymmetric_unit: Vec<Particle>,
    pub operators: Vec<SymmetryOperator>,
}

impl CrystalStructure {
    /// Expands the asymmetric unit into a [`Lattice`].
    pub fn into_lattice(self) -> Result<Lattice, GeometryError> {
        Lattice::build(self.cell, &self.asymmetric_unit, &self.operators)
    }
}

pub struct CifFile;

#[derive(Default)]
struct CellFields {
    a: Option<f64>,
    b: Option<f64>,
    c: Option<f64>,
    alpha: Option<f64>,
    beta: Option<f64>,
    gamma: Option<f64>,
}

impl CellFields {
    /// The field for one of the six cell-parameter tags; other `_cell_` tags have none.
    fn slot(&mut self, tag: &str) -> Option<&mut Option<f64>> {
        match tag {
            "_cell_length_a" => Some(&mut self.a),
            "_cell_length_b" => Some(&mut self.b),
            "_cell_length_c" => Some(&mut self.c),
            "_cell_angle_alpha" => Some(&mut self.alpha),
            "_cell_angle_beta" => Some(&mut self.beta),
            "_cell_angle_gamma" => Some(&mut self.gamma),
            _ => None,
        }
    }

    fn finish(self) -> Result<CellParameters, CifError> {
        Ok(CellParameters::new(
            self.a.ok_or(CifError::MissingRecord("_cell_length_a"))?,
            self.b.ok_or(CifError::MissingRecord("_cell_length_b"))?,
            self.c.ok_or(CifError::MissingRecord("_cell_length_c"))?,
            self.alpha.ok_or(CifError::MissingRecord("_cell_angle_alpha"))?,
            self.beta.ok_or(CifError::MissingRecord("_cell_angle_beta"))?,
            self.gamma.ok_or(CifError::MissingRecord("_cell_angle_gamma"))?,
        ))
    }
}

struct Loop {
    headers: Vec<String>,
    tokens: Vec<String>,
    first_row_line: usize,
}

#[derive(Default)]
struct Collected {
    operators: Vec<SymmetryOperator>,
    atoms: Vec<Particle>,
}

impl InputFile for CifFile {
    type Output = CrystalStructure;
    type Error = CifError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut name = None;
        let mut cell = CellFields::default();
        let mut collected = Collected::default();
        let mut current: Option<Loop> = None;
        let mut in_text_field = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            if line.starts_with(';') {
                in_text_field = !in_text_field;
                continue;
            }
            if in_text_field {
                continue;
            }

            let trimmed = line.trim();
            if trimmed.starts_with('#') {
                continue;
            }
            if trimmed.is_empty() {
                if current.as_ref().is_some_and(|l| !l.tokens.is_empty()) {
                    finish_loop(current.take(), &mut collected)?;
                }
                continue;
            }

            let lower = trimmed.to_ascii_lowercase();
            if lower == "loop_" {
                finish_loop(current.take(), &mut collected)?;
                current = Some(Loop {
                    headers: Vec::new(),
                    tokens: Vec::new(),
                    first_row_line: 0,
                });
                continue;
            }
            if let Some(block) = trimmed.strip_prefix("data_") {
                finish_loop(current.take(), &mut collected)?;
                name = Some(block.to_string());
                continue;
            }

            if trimmed.starts_with('_') {
                if let Some(open) = current.as_mut().filter(|l| l.tokens.is_empty()) {
                    let tag = trimmed.split_whitespace().next().unwrap_or(trimmed);
                    open.headers.push(tag.to_ascii_lowercase());
                    continue;
                }
                finish_loop(current.take(), &mut collected)?;

                let tokens = tokenize(trimmed);
                let tag = tokens[0].to_ascii_lowercase();
                let value = tokens.get(1).and_then(|v| parse_number(v));
                if let Some(slot) = cell.slot(&tag) {
                    if value.is_none() {
                        return Err(CifError::Parse {
                            line: line_num,
                            message: format!("expected a numeric value for '{}'", tag),
                        });
                    }
                    *slot = value;
                }
                continue;
            }

            if let Some(open) = current.as_mut() {
                if open.tokens.is_empty() {
                    open.first_row_line = line_num;
                }
                open.tokens.extend(tokenize(trimmed));
            }
        }
        finish_loop(current.take(), &mut collected)?;

        if collected.operators.is_empty() {
            warn!("CIF file lists no symmetry operators; treating the structure as P1.");
        }
        debug!(
            "Read CIF block {:?}: {} asymmetric-unit atoms, {} symmetry operators.",
            name,
            collected.atoms.len(),
            collected.operators.len()
        );

        Ok(CrystalStructure {
            name,
            cell: cell.finish()?,
            asymmetric_unit: collected.atoms,
            operators: collected.operators,
        })
    }
}

fn finish_loop(current: Option<Loop>, collected: &mut Collected) -> Result<(), CifError> {
    let Some(lp) = current else {
        return Ok(());
    };
    if lp.headers.is_empty() || lp.tokens.is_empty() {
        return Ok(());
    }
    let width = lp.headers.len();
    if lp.tokens.len() % width != 0 {
        return Err(CifError::Parse {
            line: lp.first_row_line,
            message: format!(
                "loop has {} columns but {} values, which is not a whole number of rows",
                width,
                lp.tokens.len()
            ),
        });
    }
    let column = |tag: &str| lp.headers.iter().position(|h| h == tag);

    if let Some(op_col) = SYMMETRY_TAGS.iter().find_map(|tag| column(tag)) {
        for row in lp.tokens.chunks(width) {
            let op = row[op_col]
                .parse::<SymmetryOperator>()
                .map_err(|source| CifError::Symmetry {
                    line: lp.first_row_line,
                    source,
                })?;
            collected.operators.push(op);
        }
        return Ok(());
    }

    let (Some(x_col), Some(y_col), Some(z_col)) = (
        column("_atom_site_fract_x"),
        column("_atom_site_fract_y"),
        column("_atom_site_fract_z"),
    ) else {
        return Ok(());
    };
    let label_col = column("_atom_site_label")
        .or_else(|| column("_atom_site_type_symbol"))
        .ok_or(CifError::MissingRecord("_atom_site_label"))?;
    let charge_col = column("_atom_site_charge");

    for row in lp.tokens.chunks(width) {
        let coord = |col: usize| {
            parse_number(&row[col]).ok_or_else(|| CifError::Parse {
                line: lp.first_row_line,
                message: format!("invalid fractional coordinate '{}'", row[col]),
            })
        };
        let position = Point3::new(coord(x_col)?, coord(y_col)?, coord(z_col)?);
        let charge = charge_col
            .and_then(|col| parse_number(&row[col]))
            .unwrap_or(0.0);
        collected
            .atoms
            .push(Particle::new(&row[label_col], position).with_charge(charge));
    }
    Ok(())
}

/// Splits a CIF line into values, keeping quoted strings (which may contain spaces) intact.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();
    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '\'' || ch == '"' {
            chars.next();
            let mut end = line.len();
            while let Some((i, c)) = chars.next() {
                let closes = chars.peek().is_none_or(|&(_, next)| next.is_whitespace());
                if c == ch && closes {
                    end = i;
                    break;
                }
            }
            tokens.push(line[start + 1..end].to_string());
            continue;
        }
        let mut end = line.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                end = i;
                break;
            }
            chars.next();
        }
        tokens.push(line[start..end].to_string());
    }
    tokens
}

/// Parses a CIF numeric value, dropping a standard-uncertainty suffix such as `(3)`.
fn parse_number(value: &str) -> Option<f64> {
    let number = value.split('(').next()?.trim();
    if number.is_empty() || number == "?" || number == "." {
        return None;
    }
    number.parse().ok()
}
