use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    creation::ParticleCreator,
    dimension::DimensionUtils,
    element::{element_template_from_name, ElementTemplate},
    error::Result,
    flags::Flags,
    floating_type_mod::FT,
    model_part::ParticleVec,
    neighborhood::NeighborhoodCache,
    properties::InletLayerConfig,
};

/// One injection layer. Each config node is occupied by a permanent fixed
/// support particle; its node id doubles as the injection site handle.
pub struct InletLayer<const D: usize> {
    pub config: InletLayerConfig<D>,
    template: ElementTemplate<D>,
    /// Node ids of the support particles, filled by `Inlet::initialize`.
    pub node_ids: Vec<u64>,
    /// Fractional particle count carried between steps so low rates still
    /// average out to `particles_per_second`.
    carry_over: FT,
    removed: bool,
}

impl<const D: usize> InletLayer<D> {
    fn new(config: InletLayerConfig<D>) -> Result<InletLayer<D>> {
        let template = element_template_from_name::<D>(&config.element_name)?;
        Ok(InletLayer {
            config,
            template,
            node_ids: Vec::new(),
            carry_over: 0.,
            removed: false,
        })
    }
}

/// Particle inlet: injects particles at randomly sampled free layer nodes and
/// releases earlier injections once they have separated from their support.
pub struct Inlet<const D: usize> {
    pub layers: Vec<InletLayer<D>>,
    has_sphericity: bool,
    rng: StdRng,
}

impl<const D: usize> Inlet<D> {
    pub fn new(
        layer_configs: Vec<InletLayerConfig<D>>,
        has_sphericity: bool,
        seed: u64,
    ) -> Result<Inlet<D>> {
        let layers = layer_configs
            .into_iter()
            .map(InletLayer::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Inlet {
            layers,
            has_sphericity,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Creates the fixed support particles occupying every layer node. Their
    /// velocity is nulled regardless of the layer's injection velocity.
    pub fn initialize<DU: DimensionUtils<D>>(
        &mut self,
        particles: &mut ParticleVec<D>,
        creator: &mut ParticleCreator,
    ) -> Result<()> {
        creator.find_max_node_id(particles);

        for layer in &mut self.layers {
            let params = layer.config.physical.with_null_velocity();
            for node_idx in 0..layer.config.nodes.len() {
                let id = creator.max_node_id + 1;
                creator.create_particle_with_physical_parameters::<DU, D>(
                    particles,
                    id,
                    layer.config.nodes[node_idx],
                    &params,
                    &layer.template,
                    self.has_sphericity,
                    true,
                )?;
                layer.node_ids.push(id);
            }
        }
        Ok(())
    }

    /// One inlet pass: detach separated injections, expire layers past their
    /// stop time, then inject into free nodes. `neighs` must be current for
    /// the passed particle store. Returns the number of injected particles.
    pub fn step<DU: DimensionUtils<D>>(
        &mut self,
        particles: &mut ParticleVec<D>,
        neighs: &NeighborhoodCache,
        creator: &mut ParticleCreator,
        time: FT,
        dt: FT,
    ) -> Result<usize> {
        creator.find_max_node_id(particles);
        detach_separated_particles(particles, neighs);

        let index_of_node: HashMap<u64, usize> = particles
            .id
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let Inlet {
            layers,
            has_sphericity,
            rng,
        } = self;

        let mut num_injected = 0;
        for layer in layers {
            if layer.removed || time < layer.config.start_time {
                continue;
            }

            if time > layer.config.stop_time {
                for node_id in &layer.node_ids {
                    if let Some(&i) = index_of_node.get(node_id) {
                        particles.flags[i].set(Flags::TO_ERASE);
                    }
                }
                layer.removed = true;
                continue;
            }

            let target = layer.config.particles_per_second * dt + layer.carry_over;
            let mut to_insert = target.floor() as usize;
            layer.carry_over = target - target.floor();
            if to_insert == 0 {
                continue;
            }

            // nodes whose previous injection has detached
            let mut free_nodes: Vec<usize> = layer
                .node_ids
                .iter()
                .filter_map(|node_id| index_of_node.get(node_id).copied())
                .filter(|&i| particles.flags[i].is_not(Flags::ACTIVE))
                .collect();
            to_insert = usize::min(to_insert, free_nodes.len());

            // sample without replacement by swapping picks to the tail
            for k in 0..to_insert {
                let pick = rng.gen_range(0..free_nodes.len() - k);
                let support = free_nodes[pick];
                let last = free_nodes.len() - 1 - k;
                free_nodes.swap(pick, last);

                let id = creator.max_node_id + 1;
                let position = particles.position[support];
                creator.create_particle_with_physical_parameters::<DU, D>(
                    particles,
                    id,
                    position,
                    &layer.config.physical,
                    &layer.template,
                    *has_sphericity,
                    false,
                )?;
                particles.flags[support].set(Flags::ACTIVE);
            }
            num_injected += to_insert;
        }
        Ok(num_injected)
    }
}

/// Frees every newly created particle that no longer touches a particle on
/// the other side of the BLOCKED divide: injections lose their kinematic
/// constraints once clear of their support, supports lose ACTIVE and become
/// available for the next injection.
fn detach_separated_particles<const D: usize>(
    particles: &mut ParticleVec<D>,
    neighs: &NeighborhoodCache,
) {
    for i in 0..particles.len() {
        if particles.flags[i].is_not(Flags::NEW_ENTITY) {
            continue;
        }

        let blocked = particles.flags[i].is(Flags::BLOCKED);
        let still_touching = neighs
            .iter(i)
            .any(|j| particles.flags[j].is(Flags::BLOCKED) != blocked);
        if still_touching {
            continue;
        }

        if blocked {
            particles.flags[i].reset(Flags::ACTIVE);
        } else {
            particles.flags[i].reset(Flags::NEW_ENTITY);
            for d in 0..D {
                particles.flags[i].reset(Flags::FIXED_VEL[d]);
                particles.flags[i].reset(Flags::FIXED_ANG_VEL[d]);
            }
        }
    }
}
