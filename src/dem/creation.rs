use crate::{
    dimension::DimensionUtils,
    element::{ElementBehaviour, ElementTemplate},
    error::{Error, Result},
    flags::Flags,
    model_part::ParticleVec,
    properties::PhysicalParams,
    VF,
};

/// Creates node+element particle pairs and tracks the greatest node id handed
/// out so far. Id allocation and creation are sequential within a step; the
/// inlet and any other creation path share this one counter.
pub struct ParticleCreator {
    pub max_node_id: u64,
}

impl ParticleCreator {
    pub fn new() -> ParticleCreator {
        ParticleCreator { max_node_id: 0 }
    }

    /// Scans the live particles and raises the id counter to the largest node
    /// id found. Called once before the first injection.
    pub fn find_max_node_id<const D: usize>(&mut self, particles: &ParticleVec<D>) {
        for &id in &particles.id {
            if id > self.max_node_id {
                self.max_node_id = id;
            }
        }
    }

    fn node_creator_with_physical_parameters<const D: usize>(
        &mut self,
        particles: &mut ParticleVec<D>,
        id: u64,
        reference_position: VF<D>,
        params: &PhysicalParams<D>,
        has_sphericity: bool,
    ) -> usize {
        particles.extend(1);
        let i = particles.len() - 1;

        particles.id[i] = id;
        particles.position[i] = reference_position;

        particles.radius[i] = params.radius;
        particles.density[i] = params.density;
        particles.young_modulus[i] = params.young_modulus;
        particles.poisson_ratio[i] = params.poisson_ratio;
        particles.friction[i] = params.friction;
        particles.ln_restitution[i] = params.ln_restitution;
        particles.rolling_friction[i] = params.rolling_friction;
        particles.rotation_damp_ratio[i] = params.rotation_damp_ratio;
        particles.material[i] = params.material;
        if has_sphericity {
            particles.sphericity[i] = params.sphericity;
        }
        particles.velocity[i] = params.velocity;
        particles.angular_velocity[i] = VF::<D>::zeros();

        // every created particle starts kinematically prescribed until the
        // inlet detach pass releases it
        for d in 0..D {
            particles.flags[i].set(Flags::FIXED_VEL[d]);
            particles.flags[i].set(Flags::FIXED_ANG_VEL[d]);
        }

        if id > self.max_node_id {
            self.max_node_id = id;
        }

        i
    }

    /// Creates one particle (node and element) at `reference_position` with
    /// the given physical parameter set. `initial` marks a permanent support
    /// particle occupying an inlet layer node rather than a transient
    /// injection. Returns the index of the new row.
    pub fn create_particle_with_physical_parameters<DU: DimensionUtils<D>, const D: usize>(
        &mut self,
        particles: &mut ParticleVec<D>,
        id: u64,
        reference_position: VF<D>,
        params: &PhysicalParams<D>,
        template: &ElementTemplate<D>,
        has_sphericity: bool,
        initial: bool,
    ) -> Result<usize> {
        if !template.kind().is_spheric() {
            return Err(Error::TypeMismatch(format!("{:?}", template.kind())));
        }

        let i = self.node_creator_with_physical_parameters(
            particles,
            id,
            reference_position,
            params,
            has_sphericity,
        );

        particles.flags[i].set(Flags::NEW_ENTITY);
        if initial {
            particles.flags[i].set(Flags::BLOCKED);
        }

        template.initialize_solution_step(particles, i);
        template.initialize(particles, i);

        let radius = params.radius;
        let mass = DU::radius_to_sphere_volume(radius) * params.density;
        particles.sqrt_mass[i] = mass.sqrt();

        Ok(i)
    }
}

impl Default for ParticleCreator {
    fn default() -> Self {
        ParticleCreator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dimension::DimensionUtils3d, element::element_template_from_name, floating_type_mod::PI,
        vec3f, ElementKind,
    };

    fn physical() -> PhysicalParams<3> {
        PhysicalParams {
            radius: 0.1,
            density: 2000.,
            young_modulus: 1e7,
            poisson_ratio: 0.25,
            friction: 0.4,
            ln_restitution: -1.2,
            rolling_friction: 0.02,
            rotation_damp_ratio: 0.1,
            sphericity: 0.9,
            material: 3,
            velocity: vec3f(0., -1.5, 0.),
        }
    }

    #[test]
    fn created_particle_is_fully_populated_and_constrained() {
        let mut particles = ParticleVec::<3>::default(0);
        let mut creator = ParticleCreator::new();
        let template = element_template_from_name::<3>("SphericParticle3D").unwrap();

        let i = creator
            .create_particle_with_physical_parameters::<DimensionUtils3d, 3>(
                &mut particles,
                7,
                vec3f(1., 2., 3.),
                &physical(),
                &template,
                true,
                false,
            )
            .unwrap();

        assert_eq!(particles.id[i], 7);
        assert_eq!(particles.position[i], vec3f(1., 2., 3.));
        assert_eq!(particles.velocity[i], vec3f(0., -1.5, 0.));
        assert_eq!(particles.angular_velocity[i], vec3f(0., 0., 0.));
        assert_eq!(particles.sphericity[i], 0.9);
        assert_eq!(particles.material[i], 3);
        assert_eq!(particles.kind[i], ElementKind::Spheric);

        let r: crate::floating_type_mod::FT = 0.1;
        let mass = 4. / 3. * PI * 2000. * r * r * r;
        assert!((particles.sqrt_mass[i] - mass.sqrt()).abs() < 1e-4);

        assert!(particles.flags[i].is(Flags::NEW_ENTITY));
        assert!(particles.flags[i].is_not(Flags::BLOCKED));
        for d in 0..3 {
            assert!(particles.flags[i].is(Flags::FIXED_VEL[d]));
            assert!(particles.flags[i].is(Flags::FIXED_ANG_VEL[d]));
        }
        assert_eq!(creator.max_node_id, 7);
    }

    #[test]
    fn initial_particle_is_blocked_and_sphericity_optional() {
        let mut particles = ParticleVec::<3>::default(0);
        let mut creator = ParticleCreator::new();
        let template = element_template_from_name::<3>("SphericParticle3D").unwrap();

        let i = creator
            .create_particle_with_physical_parameters::<DimensionUtils3d, 3>(
                &mut particles,
                1,
                vec3f(0., 0., 0.),
                &physical(),
                &template,
                false,
                true,
            )
            .unwrap();

        assert!(particles.flags[i].is(Flags::BLOCKED));
        assert_eq!(particles.sphericity[i], 1.);
    }

    #[test]
    fn wall_template_is_a_type_mismatch() {
        let mut particles = ParticleVec::<3>::default(0);
        let mut creator = ParticleCreator::new();
        let template = element_template_from_name::<3>("RigidFace3D").unwrap();

        let err = creator
            .create_particle_with_physical_parameters::<DimensionUtils3d, 3>(
                &mut particles,
                1,
                vec3f(0., 0., 0.),
                &physical(),
                &template,
                false,
                false,
            )
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
        assert!(particles.is_empty());
    }

    #[test]
    fn find_max_node_id_scans_live_particles() {
        let mut particles = ParticleVec::<3>::default(3);
        particles.id[0] = 5;
        particles.id[1] = 91;
        particles.id[2] = 14;

        let mut creator = ParticleCreator::new();
        creator.find_max_node_id(&particles);
        assert_eq!(creator.max_node_id, 91);
    }
}
