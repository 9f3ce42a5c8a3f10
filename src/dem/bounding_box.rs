use crate::{
    error::{Error, Result},
    floating_type_mod::FT,
    model_part::ParticleVec,
    VF,
};

const FAR_AWAY: FT = 1e18;

/// Axis-aligned culling domain with a strict (tight particle envelope) and a
/// padded (scaled plus two reference radii) pair of extents.
pub struct BoundingBox<const D: usize> {
    low: VF<D>,
    high: VF<D>,
    strict_low: VF<D>,
    strict_high: VF<D>,
    diameter: FT,
    strict_diameter: FT,
}

impl<const D: usize> BoundingBox<D> {
    pub fn new() -> BoundingBox<D> {
        BoundingBox {
            low: VF::<D>::from_iterator(std::iter::repeat(-FAR_AWAY)),
            high: VF::<D>::from_iterator(std::iter::repeat(FAR_AWAY)),
            strict_low: VF::<D>::from_iterator(std::iter::repeat(-FAR_AWAY)),
            strict_high: VF::<D>::from_iterator(std::iter::repeat(FAR_AWAY)),
            diameter: 0.,
            strict_diameter: 0.,
        }
    }

    /// Recomputes the extents from scratch. With `automatic` the strict
    /// extents are scanned from every live particle center, the padded ones
    /// derived as `midpoint * (1 - scale) + scale * strict`, then inflated by
    /// twice the radius of the first particle so no ball sitting on the
    /// envelope is culled. Without `automatic` the externally supplied
    /// extents (see `set_low`/`set_high`) are kept as-is.
    ///
    /// In both cases the strict extents are overwritten with the final padded
    /// ones afterwards, so strict and padded read back identical until the
    /// next automatic recompute. Callers depend on this; do not "fix" it
    /// without checking them.
    pub fn recompute(
        &mut self,
        particles: &ParticleVec<D>,
        scale_factor: FT,
        automatic: bool,
    ) -> Result<()> {
        if automatic {
            if particles.is_empty() {
                return Err(Error::InvalidState(
                    "the bounding box cannot be calculated automatically when there are no particles",
                ));
            }

            let ref_radius = particles.radius[0];
            self.strict_low = particles.position[0];
            self.strict_high = particles.position[0];

            for coor in &particles.position {
                for i in 0..D {
                    self.strict_low[i] = FT::min(self.strict_low[i], coor[i]);
                    self.strict_high[i] = FT::max(self.strict_high[i], coor[i]);
                }
            }

            let midpoint = 0.5 * (self.strict_high + self.strict_low);
            self.high = midpoint * (1. - scale_factor) + scale_factor * self.strict_high;
            self.low = midpoint * (1. - scale_factor) + scale_factor * self.strict_low;

            for i in 0..D {
                self.low[i] -= 2. * ref_radius;
                self.high[i] += 2. * ref_radius;
            }
        }

        self.strict_high = self.high;
        self.strict_low = self.low;
        self.strict_diameter = (self.strict_high - self.strict_low).norm();
        self.diameter = (self.high - self.low).norm();

        Ok(())
    }

    pub fn low(&self) -> VF<D> {
        self.low
    }

    pub fn high(&self) -> VF<D> {
        self.high
    }

    pub fn strict_low(&self) -> VF<D> {
        self.strict_low
    }

    pub fn strict_high(&self) -> VF<D> {
        self.strict_high
    }

    /// Characteristic length of the padded domain.
    pub fn diameter(&self) -> FT {
        self.diameter
    }

    pub fn strict_diameter(&self) -> FT {
        self.strict_diameter
    }

    pub fn set_low(&mut self, low: VF<D>) {
        self.low = low;
    }

    pub fn set_high(&mut self, high: VF<D>) {
        self.high = high;
    }
}

impl<const D: usize> Default for BoundingBox<D> {
    fn default() -> Self {
        BoundingBox::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{vec3f, Error};

    fn particles_at(positions: &[crate::V3], radius: FT) -> ParticleVec<3> {
        let mut particles = ParticleVec::<3>::default(positions.len());
        for (i, &p) in positions.iter().enumerate() {
            particles.id[i] = i as u64 + 1;
            particles.position[i] = p;
            particles.radius[i] = radius;
        }
        particles
    }

    #[test]
    fn automatic_recompute_contains_all_centers() {
        let positions = [
            vec3f(0., 0., 0.),
            vec3f(1., 5., -3.),
            vec3f(-2., 2., 7.),
            vec3f(4., -1., 1.),
        ];
        let particles = particles_at(&positions, 0.1);

        let mut bbox = BoundingBox::<3>::new();
        bbox.recompute(&particles, 1.5, true).unwrap();

        for p in &positions {
            for d in 0..3 {
                assert!(bbox.low()[d] <= p[d] && p[d] <= bbox.high()[d]);
            }
        }
        // padded never tighter than the scanned envelope, axis by axis
        let scanned_low = vec3f(-2., -1., -3.);
        let scanned_high = vec3f(4., 5., 7.);
        for d in 0..3 {
            assert!(bbox.low()[d] <= scanned_low[d] && bbox.high()[d] >= scanned_high[d] - 1e-5);
        }
        assert!(bbox.diameter() > 0.);
    }

    #[test]
    fn strict_tracks_padded_after_recompute() {
        let particles = particles_at(&[vec3f(0., 0., 0.), vec3f(2., 2., 2.)], 0.5);
        let mut bbox = BoundingBox::<3>::new();
        bbox.recompute(&particles, 2.0, true).unwrap();
        assert_eq!(bbox.strict_low(), bbox.low());
        assert_eq!(bbox.strict_high(), bbox.high());
        assert_eq!(bbox.strict_diameter(), bbox.diameter());
    }

    #[test]
    fn manual_recompute_keeps_supplied_extents() {
        let particles = particles_at(&[vec3f(100., 100., 100.)], 0.5);
        let mut bbox = BoundingBox::<3>::new();
        bbox.set_low(vec3f(-1., -1., -1.));
        bbox.set_high(vec3f(1., 2., 3.));
        bbox.recompute(&particles, 1.5, false).unwrap();

        assert_eq!(bbox.low(), vec3f(-1., -1., -1.));
        assert_eq!(bbox.high(), vec3f(1., 2., 3.));
        assert_eq!(bbox.strict_low(), vec3f(-1., -1., -1.));
        assert_eq!(bbox.strict_high(), vec3f(1., 2., 3.));
    }

    #[test]
    fn automatic_recompute_without_particles_fails() {
        let particles = ParticleVec::<3>::default(0);
        let mut bbox = BoundingBox::<3>::new();
        let err = bbox.recompute(&particles, 1.5, true).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }
}
