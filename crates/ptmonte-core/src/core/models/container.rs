use super::particle::Particle;
use nalgebra::Point3;
use rand::Rng;

/// Geometry of a periodic simulation cell.
pub trait PeriodicCell {
    /// Cell volume in Å³.
    fn volume(&self) -> f64;

    /// Maps a position back into the home cell.
    fn wrap(&self, position: &Point3<f64>) -> Point3<f64>;

    /// Squared distance between `a` and the nearest periodic image of `b`.
    fn distance_sq(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64;

    /// A position drawn uniformly from the cell.
    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f64>;
}

/// A periodic cell holding a set of particles that energy sums run over.
pub trait Container: PeriodicCell {
    fn particles(&self) -> &[Particle];

    fn len(&self) -> usize {
        self.particles().len()
    }

    fn is_empty(&self) -> bool {
        self.particles().is_empty()
    }
}

/// A container whose population may change during a simulation.
pub trait MutableContainer: Container {
    fn particles_mut(&mut self) -> &mut Vec<Particle>;

    /// Removes the particle at `index`, swapping the last particle into its place.
    fn take(&mut self, index: usize) -> Particle {
        self.particles_mut().swap_remove(index)
    }

    fn push(&mut self, particle: Particle) {
        self.particles_mut().push(particle);
    }

    /// Undoes [`take`](Self::take): puts `particle` back at `index` and the swapped particle
    /// back at the end, so a take/restore round trip leaves the order unchanged.
    fn restore(&mut self, index: usize, particle: Particle) {
        let particles = self.particles_mut();
        particles.push(particle);
        let last = particles.len() - 1;
        particles.swap(index, last);
    }
}
