use super::traits::InputFile;
use crate::core::forcefield::params::ForceFieldBuilder;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

/// Lines preceding the type count in a `force_field_mixing_rules.def` file.
const HEADER_LINES: usize = 5;

#[derive(Debug, Error)]
pub enum RaspaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Unexpected end of file: expected {0}")]
    UnexpectedEof(&'static str),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Reader for RASPA-style Lennard-Jones mixing-rule definition files.
///
/// The layout is five header lines, the number of type rows, one more header line, and then
/// one row per type of the form `type interaction epsilon sigma`. Rows with only a type name
/// (and optionally an interaction keyword) declare a type without parameters.
pub struct RaspaDefFile;

impl InputFile for RaspaDefFile {
    type Output = ForceFieldBuilder;
    type Error = RaspaError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));
        let mut next_line = |what: &'static str| -> Result<(usize, String), RaspaError> {
            match lines.next() {
                Some((num, line)) => Ok((num, line?)),
                None => Err(RaspaError::UnexpectedEof(what)),
            }
        };

        for _ in 0..HEADER_LINES {
            next_line("header line")?;
        }
        let (count_line, count_text) = next_line("number of types")?;
        let count: usize = count_text
            .split_whitespace()
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| RaspaError::Parse {
                line: count_line,
                message: format!("expected the number of types, found '{}'", count_text.trim()),
            })?;
        next_line("column header")?;

        let mut builder = ForceFieldBuilder::new();
        for _ in 0..count {
            let (line_num, line) = next_line("type row")?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            builder = match fields.as_slice() {
                [] => {
                    return Err(RaspaError::Parse {
                        line: line_num,
                        message: "empty type row".to_string(),
                    });
                }
                [name] | [name, _] => builder.add_missing(name),
                [name, _, epsilon, sigma, ..] => {
                    let number = |text: &str| {
                        text.parse::<f64>().map_err(|_| RaspaError::Parse {
                            line: line_num,
                            message: format!("invalid number '{}' for type '{}'", text, name),
                        })
                    };
                    builder.add_type(name, number(*sigma)?, number(*epsilon)?)
                }
                _ => {
                    return Err(RaspaError::Parse {
                        line: line_num,
                        message: format!("type row '{}' has an epsilon but no sigma", line.trim()),
                    });
                }
            };
        }

        debug!(
            "Read {} type rows from RASPA definition file ({} parameterized).",
            count,
            builder.len()
        );
        Ok(builder)
    }
}
