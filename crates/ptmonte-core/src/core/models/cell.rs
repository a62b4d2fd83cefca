use nalgebra::{Matrix3, Point3, Vector3};
use rand::Rng;
use thiserror::Error;

/// Fractional coordinates this close to 1 are folded back onto 0 when wrapping, so that a
/// cartesian round trip of an already wrapped position cannot jump by a full cell.
const FRACTIONAL_WRAP_EPSILON: f64 = 1e-12;
const RIGHT_ANGLE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Cell length '{name}' must be positive and finite, got {value}")]
    InvalidLength { name: &'static str, value: f64 },
    #[error("Cell angle '{name}' must lie strictly between 0 and 180 degrees, got {value}")]
    InvalidAngle { name: &'static str, value: f64 },
    #[error("Cell angles ({alpha}, {beta}, {gamma}) do not describe a cell with positive volume")]
    DegenerateCell { alpha: f64, beta: f64, gamma: f64 },
    #[error("Cell transform is not invertible")]
    SingularTransform,
}

/// The six crystallographic cell parameters. Lengths in Angstroms, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl CellParameters {
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }

    /// A cubic cell of edge `side` with right angles.
    pub fn cubic(side: f64) -> Self {
        Self::new(side, side, side, 90.0, 90.0, 90.0)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        for (name, value) in [("a", self.a), ("b", self.b), ("c", self.c)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::InvalidLength { name, value });
            }
        }
        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ] {
            if !(value.is_finite() && value > 0.0 && value < 180.0) {
                return Err(GeometryError::InvalidAngle { name, value });
            }
        }
        Ok(())
    }

    /// Unit-cell volume from the general triclinic formula.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateCell`] if the angles cannot close a cell.
    pub fn volume(&self) -> Result<f64, GeometryError> {
        self.validate()?;
        let (ca, cb, cg) = self.cosines();
        let radicand = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
        if radicand <= 0.0 {
            return Err(GeometryError::DegenerateCell {
                alpha: self.alpha,
                beta: self.beta,
                gamma: self.gamma,
            });
        }
        Ok(self.a * self.b * self.c * radicand.sqrt())
    }

    pub fn is_orthogonal(&self) -> bool {
        [self.alpha, self.beta, self.gamma]
            .iter()
            .all(|angle| (angle - 90.0).abs() < RIGHT_ANGLE_TOLERANCE)
    }

    fn cosines(&self) -> (f64, f64, f64) {
        (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        )
    }
}

/// Cartesian <-> fractional affine transform pair of a periodic cell.
///
/// Owned by a [`Lattice`](super::lattice::Lattice); guest phases living inside the lattice
/// borrow it instead of carrying their own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTransform {
    volume: f64,
    to_cartesian: Matrix3<f64>,
    to_fractional: Matrix3<f64>,
    orthogonal: bool,
}

impl CellTransform {
    /// Builds the transform pair with the `a` vector along x and `b` in the xy plane.
    pub fn new(cell: &CellParameters) -> Result<Self, GeometryError> {
        let volume = cell.volume()?;
        let (ca, cb, cg) = cell.cosines();
        let sg = cell.gamma.to_radians().sin();

        #[rustfmt::skip]
        let to_cartesian = Matrix3::new(
            cell.a, cell.b * cg, cell.c * cb,
            0.0,    cell.b * sg, cell.c * (ca - cb * cg) / sg,
            0.0,    0.0,         volume / (cell.a * cell.b * sg),
        );
        let to_fractional = to_cartesian
            .try_inverse()
            .ok_or(GeometryError::SingularTransform)?;

        Ok(Self {
            volume,
            to_cartesian,
            to_fractional,
            orthogonal: cell.is_orthogonal(),
        })
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[inline]
    pub fn to_cartesian(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.to_cartesian * fractional.coords)
    }

    #[inline]
    pub fn to_fractional(&self, cartesian: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.to_fractional * cartesian.coords)
    }

    /// Maps a cartesian position into the home cell, i.e. fractional coordinates in `[0, 1)`.
    pub fn wrap(&self, position: &Point3<f64>) -> Point3<f64> {
        let fractional = self.to_fractional(position).map(wrap_unit);
        self.to_cartesian(&fractional)
    }

    /// Minimum squared cartesian distance between `p` and any periodic image of `q`.
    ///
    /// The fractional separation is first reduced to `[-0.5, 0.5]` per axis. For skewed cells
    /// that reduction alone can miss the nearest image, so the neighbouring translations along
    /// each lattice vector are searched as well.
    pub fn minimum_distance_sq(&self, p: &Point3<f64>, q: &Point3<f64>) -> f64 {
        let reduced = (self.to_fractional * (p - q)).map(|d| d - d.round());
        if self.orthogonal {
            return (self.to_cartesian * reduced).norm_squared();
        }

        let mut best = f64::INFINITY;
        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    let shifted = reduced + Vector3::new(i as f64, j as f64, k as f64);
                    best = best.min((self.to_cartesian * shifted).norm_squared());
                }
            }
        }
        best
    }

    /// A uniformly distributed cartesian position inside the cell.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f64> {
        let fractional = Point3::new(rng.r#gen::<f64>(), rng.r#gen::<f64>(), rng.r#gen::<f64>());
        self.to_cartesian(&fractional)
    }
}

/// Folds a fractional coordinate into `[0, 1)`.
#[inline]
pub(crate) fn wrap_unit(f: f64) -> f64 {
    let wrapped = f - f.floor();
    if wrapped >= 1.0 - FRACTIONAL_WRAP_EPSILON {
        0.0
    } else {
        wrapped
    }
}
