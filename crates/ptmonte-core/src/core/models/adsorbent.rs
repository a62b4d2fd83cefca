use super::cell::CellTransform;
use super::container::{Container, MutableContainer, PeriodicCell};
use super::lattice::Lattice;
use super::particle::Particle;
use nalgebra::Point3;
use rand::Rng;

/// Guest particles adsorbed inside a host lattice.
///
/// The adsorbent shares the coordinate transforms of the lattice it lives in by reference;
/// it never owns or copies them. Its population is the primary observable of a
/// grand-canonical run.
#[derive(Debug, Clone)]
pub struct Adsorbent<'a> {
    transform: &'a CellTransform,
    particles: Vec<Particle>,
}

impl<'a> Adsorbent<'a> {
    /// Creates an empty adsorbent phase hosted by `lattice`.
    pub fn new(lattice: &'a Lattice) -> Self {
        Self {
            transform: lattice.transform(),
            particles: Vec::new(),
        }
    }

    /// Creates an adsorbent phase with an initial guest population.
    pub fn with_particles(lattice: &'a Lattice, particles: Vec<Particle>) -> Self {
        Self {
            transform: lattice.transform(),
            particles,
        }
    }

    pub fn transform(&self) -> &'a CellTransform {
        self.transform
    }
}

impl PeriodicCell for Adsorbent<'_> {
    fn volume(&self) -> f64 {
        self.transform.volume()
    }

    fn wrap(&self, position: &Point3<f64>) -> Point3<f64> {
        self.transform.wrap(position)
    }

    fn distance_sq(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.transform.minimum_distance_sq(a, b)
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f64> {
        self.transform.random_position(rng)
    }
}

impl Container for Adsorbent<'_> {
    fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

impl MutableContainer for Adsorbent<'_> {
    fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }
}
