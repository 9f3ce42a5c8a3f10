use std::marker::PhantomData;

use num_traits::Float;

use crate::{
    bonds::build_bonds,
    bounding_box::BoundingBox,
    concurrency::par_iter_mut2,
    creation::ParticleCreator,
    destruction::{
        destroy_contact_elements, destroy_particles, mark_contact_elements_of_erased_particles,
        mark_distant_particles,
    },
    dimension::DimensionUtils,
    element::element_template_from_name,
    error::{Error, Result},
    flags::Flags,
    floating_type_mod::FT,
    inlet::Inlet,
    model_part::{ContactVec, ParticleVec},
    neighborhood::{build_neighborhood_list, NeighborhoodCache},
    properties::{SceneConfig, SimulationParams},
};

/// What one step did to the particle population.
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub time: FT,
    pub num_injected: usize,
    pub num_erased: usize,
    pub num_particles: usize,
    pub num_contacts: usize,
}

/// Running min/avg/max over a scalar series, for the per-step reporting.
pub struct Counter {
    min: FT,
    max: FT,
    sum: FT,
    count: usize,
}

impl Counter {
    pub fn new() -> Counter {
        Counter {
            min: Float::max_value(),
            max: Float::min_value(),
            sum: 0.,
            count: 0,
        }
    }

    pub fn add(&mut self, value: FT) {
        self.min = FT::min(self.min, value);
        self.max = FT::max(self.max, value);
        self.sum += value;
        self.count += 1;
    }

    pub fn min(&self) -> FT {
        self.min
    }

    pub fn max(&self) -> FT {
        self.max
    }

    pub fn avg(&self) -> FT {
        self.sum / self.count as FT
    }
}

impl Default for Counter {
    fn default() -> Self {
        Counter::new()
    }
}

/// The particle lifecycle loop: ballistic motion of the free particles,
/// inlet injection and release, bond upkeep and out-of-domain culling.
pub struct DemSimulation<DU: DimensionUtils<D>, const D: usize> {
    pub particles: ParticleVec<D>,
    pub contacts: ContactVec,
    pub neighs: NeighborhoodCache,
    pub bounding_box: BoundingBox<D>,
    pub params: SimulationParams<D>,
    creator: ParticleCreator,
    inlet: Inlet<D>,
    next_contact_id: u64,
    time: FT,
    step_count: usize,
    du: PhantomData<DU>,
}

impl<DU: DimensionUtils<D>, const D: usize> DemSimulation<DU, D> {
    pub fn new(params: SimulationParams<D>, scene: SceneConfig<D>) -> Result<DemSimulation<DU, D>> {
        let mut particles = ParticleVec::<D>::default(0);
        let mut creator = ParticleCreator::new();

        if let Some(block) = &scene.initial_particles {
            let template = element_template_from_name::<D>(&block.element_name)?;
            for &position in &block.positions {
                let id = creator.max_node_id + 1;
                let i = creator.create_particle_with_physical_parameters::<DU, D>(
                    &mut particles,
                    id,
                    position,
                    &block.physical,
                    &template,
                    true,
                    false,
                )?;
                // initial particles are free from the start
                particles.flags[i].reset(Flags::NEW_ENTITY);
                for d in 0..D {
                    particles.flags[i].reset(Flags::FIXED_VEL[d]);
                    particles.flags[i].reset(Flags::FIXED_ANG_VEL[d]);
                }
            }
        }

        let mut inlet = Inlet::new(scene.inlet_layers, true, params.inlet_seed)?;
        inlet.initialize::<DU>(&mut particles, &mut creator)?;

        let mut bounding_box = BoundingBox::<D>::new();
        if !params.automatic_bounding_box {
            match (params.bounding_box_low, params.bounding_box_high) {
                (Some(low), Some(high)) => {
                    bounding_box.set_low(low);
                    bounding_box.set_high(high);
                }
                _ => {
                    return Err(Error::InvalidState(
                        "a manual bounding box requires explicit low and high extents",
                    ))
                }
            }
        }
        bounding_box.recompute(
            &particles,
            params.bounding_box_scale_factor,
            params.automatic_bounding_box,
        )?;

        let mut simulation = DemSimulation {
            neighs: NeighborhoodCache::new(particles.len()),
            particles,
            contacts: ContactVec::default(0),
            bounding_box,
            params,
            creator,
            inlet,
            next_contact_id: 0,
            time: 0.,
            step_count: 0,
            du: PhantomData,
        };

        if params.continuum {
            simulation.search();
            build_bonds(
                &mut simulation.particles,
                &mut simulation.contacts,
                &simulation.neighs,
                &mut simulation.next_contact_id,
            );
        }
        Ok(simulation)
    }

    pub fn time(&self) -> FT {
        self.time
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    fn search(&mut self) {
        build_neighborhood_list::<DU, D>(
            &self.params,
            &self.particles.position,
            &self.particles.radius,
            &mut self.neighs,
        );
    }

    /// Symplectic Euler under gravity. Constrained velocity components stay
    /// untouched, so fixed particles hold their prescribed motion.
    fn integrate(&mut self) {
        let dt = self.params.dt;
        let gravity = self.params.gravity_vector();

        let ParticleVec {
            position,
            velocity,
            flags,
            ..
        } = &mut self.particles;
        let flags: &[Flags] = flags;

        par_iter_mut2(position, velocity, |i, position, velocity| {
            for d in 0..D {
                if flags[i].is_not(Flags::FIXED_VEL[d]) {
                    velocity[d] += gravity[d] * dt;
                }
                position[d] += velocity[d] * dt;
            }
        });
    }

    /// Advances by one `dt`: inject/release, move, rebuild bonds, then cull
    /// everything that left the bounding box. Contact elements of culled
    /// particles are always erased before the particles themselves.
    pub fn single_step(&mut self) -> Result<StepReport> {
        self.search();
        let num_injected = self.inlet.step::<DU>(
            &mut self.particles,
            &self.neighs,
            &mut self.creator,
            self.time,
            self.params.dt,
        )?;

        self.integrate();

        if self.params.continuum {
            self.search();
            build_bonds(
                &mut self.particles,
                &mut self.contacts,
                &self.neighs,
                &mut self.next_contact_id,
            );
        }

        self.bounding_box.recompute(
            &self.particles,
            self.params.bounding_box_scale_factor,
            self.params.automatic_bounding_box,
        )?;
        mark_distant_particles(&mut self.particles, &self.bounding_box);

        if self.params.continuum {
            mark_contact_elements_of_erased_particles(&self.particles, &mut self.contacts);
            destroy_contact_elements(&mut self.contacts);
        }

        let num_before = self.particles.len();
        destroy_particles(&mut self.particles);
        self.neighs.resize(self.particles.len());

        self.time += self.params.dt;
        self.step_count += 1;

        Ok(StepReport {
            time: self.time,
            num_injected,
            num_erased: num_before - self.particles.len(),
            num_particles: self.particles.len(),
            num_contacts: self.contacts.len(),
        })
    }
}
