use super::cell::GeometryError;
use super::container::{Container, MutableContainer, PeriodicCell};
use super::particle::Particle;
use nalgebra::Point3;
use rand::Rng;

/// A cubic periodic box of variable size, used as the bulk (gas) phase of two-phase runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicBox {
    side: f64,
    volume: f64,
    particles: Vec<Particle>,
}

impl CubicBox {
    /// Creates an empty box.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidLength`] if `side` is not positive and finite.
    pub fn new(side: f64) -> Result<Self, GeometryError> {
        Self::with_particles(side, Vec::new())
    }

    /// Creates a box holding `particles`; positions are wrapped into the box.
    pub fn with_particles(side: f64, particles: Vec<Particle>) -> Result<Self, GeometryError> {
        check_side(side)?;
        let mut cubic_box = Self {
            side,
            volume: side.powi(3),
            particles,
        };
        for i in 0..cubic_box.particles.len() {
            let wrapped = cubic_box.wrap(&cubic_box.particles[i].position);
            cubic_box.particles[i].position = wrapped;
        }
        Ok(cubic_box)
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    /// Sets the side length without touching particle coordinates.
    pub fn set_side(&mut self, side: f64) -> Result<(), GeometryError> {
        check_side(side)?;
        self.side = side;
        self.volume = side.powi(3);
        Ok(())
    }

    /// Scales the box and every particle coordinate by the linear factor `k`.
    pub fn rescale(&mut self, k: f64) -> Result<(), GeometryError> {
        self.set_side(self.side * k)?;
        self.scale_coordinates(k);
        Ok(())
    }

    /// Undoes a successful `rescale(k)` that started from `side`.
    pub fn revert_rescale(&mut self, side: f64, k: f64) {
        self.side = side;
        self.volume = side.powi(3);
        self.scale_coordinates(1.0 / k);
    }

    /// Adds `count` copies of `template` at uniformly random positions.
    pub fn fill_random<R: Rng + ?Sized>(&mut self, template: &Particle, count: usize, rng: &mut R) {
        self.particles.reserve(count);
        for _ in 0..count {
            let position = self.random_position(rng);
            self.particles.push(template.moved_to(position));
        }
    }

    fn scale_coordinates(&mut self, k: f64) {
        for particle in &mut self.particles {
            particle.position.coords *= k;
        }
    }
}

impl PeriodicCell for CubicBox {
    fn volume(&self) -> f64 {
        self.volume
    }

    /// Reduces each coordinate into `[0, side)` with true modulo arithmetic, which stays
    /// correct for displacements of any number of box lengths.
    fn wrap(&self, position: &Point3<f64>) -> Point3<f64> {
        position.map(|x| {
            let r = x.rem_euclid(self.side);
            if r >= self.side { 0.0 } else { r }
        })
    }

    fn distance_sq(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        (a - b)
            .map(|d| d - self.side * (d / self.side).round())
            .norm_squared()
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f64> {
        Point3::new(
            rng.r#gen::<f64>() * self.side,
            rng.r#gen::<f64>() * self.side,
            rng.r#gen::<f64>() * self.side,
        )
    }
}

impl Container for CubicBox {
    fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

impl MutableContainer for CubicBox {
    fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }
}

fn check_side(side: f64) -> Result<(), GeometryError> {
    if side.is_finite() && side > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidLength {
            name: "side",
            value: side,
        })
    }
}
