use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymmetryParseError {
    #[error("Symmetry operator '{0}' must have exactly three comma-separated components")]
    ComponentCount(String),
    #[error("Invalid term '{term}' in symmetry operator component '{component}'")]
    InvalidTerm { component: String, term: String },
}

/// A crystallographic symmetry operation in fractional space: `r' = R·r + t`.
///
/// Operators are stored as a precomputed affine transform, so expanding an asymmetric unit is
/// a purely numeric operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryOperator {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl SymmetryOperator {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Applies the operator to a fractional position. The result is not wrapped.
    #[inline]
    pub fn apply(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * fractional.coords + self.translation)
    }
}

impl Default for SymmetryOperator {
    fn default() -> Self {
        Self::identity()
    }
}

impl FromStr for SymmetryOperator {
    type Err = SymmetryParseError;

    /// Parses the `x,y,z` notation used by CIF files, e.g. `-x+1/2, y-x, z+0.25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '"')
            .collect::<String>()
            .to_ascii_lowercase();
        let components: Vec<&str> = cleaned.split(',').collect();
        if components.len() != 3 {
            return Err(SymmetryParseError::ComponentCount(s.to_string()));
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, component) in components.iter().enumerate() {
            let (coefficients, constant) = parse_component(component)?;
            for (col, value) in coefficients.iter().enumerate() {
                rotation[(row, col)] = *value;
            }
            translation[row] = constant;
        }
        Ok(Self::new(rotation, translation))
    }
}

impl fmt::Display for SymmetryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const AXES: [char; 3] = ['x', 'y', 'z'];
        let mut parts = Vec::with_capacity(3);
        for row in 0..3 {
            let mut part = String::new();
            for (col, axis) in AXES.iter().enumerate() {
                let c = self.rotation[(row, col)];
                if c == 0.0 {
                    continue;
                }
                let sign = if c < 0.0 { "-" } else if part.is_empty() { "" } else { "+" };
                if (c.abs() - 1.0).abs() < f64::EPSILON {
                    part.push_str(&format!("{sign}{axis}"));
                } else {
                    part.push_str(&format!("{sign}{}{axis}", c.abs()));
                }
            }
            let t = self.translation[row];
            if t != 0.0 || part.is_empty() {
                let sign = if t < 0.0 { "-" } else if part.is_empty() { "" } else { "+" };
                part.push_str(&format!("{sign}{}", t.abs()));
            }
            parts.push(part);
        }
        write!(f, "{}", parts.join(","))
    }
}

fn parse_component(component: &str) -> Result<([f64; 3], f64), SymmetryParseError> {
    let invalid = |term: &str| SymmetryParseError::InvalidTerm {
        component: component.to_string(),
        term: term.to_string(),
    };
    if component.is_empty() {
        return Err(invalid(component));
    }

    let mut terms = Vec::new();
    let mut start = 0;
    for (i, ch) in component.char_indices() {
        if (ch == '+' || ch == '-') && i > start {
            terms.push(&component[start..i]);
            start = i;
        }
    }
    terms.push(&component[start..]);

    let mut coefficients = [0.0; 3];
    let mut constant = 0.0;
    for term in terms {
        let (sign, body) = match term.as_bytes().first() {
            Some(&b'-') => (-1.0, &term[1..]),
            Some(&b'+') => (1.0, &term[1..]),
            _ => (1.0, term),
        };
        if body.is_empty() {
            return Err(invalid(term));
        }

        let axis = match body.chars().last() {
            Some('x') => Some(0),
            Some('y') => Some(1),
            Some('z') => Some(2),
            _ => None,
        };
        match axis {
            Some(axis) => {
                let prefix = body[..body.len() - 1].trim_end_matches('*');
                let factor = if prefix.is_empty() {
                    1.0
                } else {
                    parse_number(prefix).ok_or_else(|| invalid(term))?
                };
                coefficients[axis] += sign * factor;
            }
            None => {
                constant += sign * parse_number(body).ok_or_else(|| invalid(term))?;
            }
        }
    }
    Ok((coefficients, constant))
}

fn parse_number(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            Some(num.parse::<f64>().ok()? / den)
        }
        None => text.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn parses_identity_operator() {
        let op: SymmetryOperator = "x,y,z".parse().unwrap();
        assert_eq!(op, SymmetryOperator::identity());
    }

    #[test]
    fn parses_signs_fractions_and_mixed_axes() {
        let op: SymmetryOperator = "'-x+1/2, y-x, 0.25+z'".parse().unwrap();
        #[rustfmt::skip]
        let expected = Matrix3::new(
            -1.0, 0.0, 0.0,
            -1.0, 1.0, 0.0,
             0.0, 0.0, 1.0,
        );
        assert_eq!(op.rotation, expected);
        assert!((op.translation - Vector3::new(0.5, 0.0, 0.25)).norm() < TOLERANCE);
    }

    #[test]
    fn parses_uppercase_and_explicit_coefficients() {
        let op: SymmetryOperator = "-Y,X-Y,2*Z-1/3".parse().unwrap();
        assert_eq!(op.rotation[(0, 1)], -1.0);
        assert_eq!(op.rotation[(1, 0)], 1.0);
        assert_eq!(op.rotation[(1, 1)], -1.0);
        assert_eq!(op.rotation[(2, 2)], 2.0);
        assert!((op.translation[2] + 1.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn apply_maps_fractional_coordinates() {
        let op: SymmetryOperator = "-x+1/2,y,-z".parse().unwrap();
        let p = op.apply(&Point3::new(0.1, 0.2, 0.3));
        assert!((p - Point3::new(0.4, 0.2, -0.3)).norm() < TOLERANCE);
    }

    #[test]
    fn rejects_wrong_component_count() {
        assert!(matches!(
            "x,y".parse::<SymmetryOperator>(),
            Err(SymmetryParseError::ComponentCount(_))
        ));
    }

    #[test]
    fn rejects_malformed_terms() {
        for bad in ["x,y,q", "x,,z", "x+-,y,z", "x,y,1/0", "x,y,z++y"] {
            assert!(
                matches!(
                    bad.parse::<SymmetryOperator>(),
                    Err(SymmetryParseError::InvalidTerm { .. })
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips_through_parser() {
        let op: SymmetryOperator = "-x+1/2,y-x,z+1/4".parse().unwrap();
        let again: SymmetryOperator = op.to_string().parse().unwrap();
        assert!((op.rotation - again.rotation).norm() < TOLERANCE);
        assert!((op.translation - again.translation).norm() < TOLERANCE);
    }
}
