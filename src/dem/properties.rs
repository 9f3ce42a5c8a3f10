use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::Result, floating_type_mod::FT, IT, VF};

/// Physical parameter set applied to every particle created from one inlet
/// layer or initial block. Mirrors the named-property lookup of the
/// surrounding framework.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhysicalParams<const D: usize> {
    pub radius: FT,
    pub density: FT,
    pub young_modulus: FT,
    pub poisson_ratio: FT,
    pub friction: FT,
    pub ln_restitution: FT,
    pub rolling_friction: FT,
    pub rotation_damp_ratio: FT,
    pub sphericity: FT,
    pub material: IT,
    pub velocity: VF<D>,
}

impl<const D: usize> PhysicalParams<D> {
    /// Same parameters but with the injection velocity zeroed; used for the
    /// fixed support particles occupying the inlet layer nodes.
    pub fn with_null_velocity(mut self) -> Self {
        self.velocity = VF::<D>::zeros();
        self
    }
}

/// One inlet layer: a group of candidate placement nodes with its own time
/// window and target insertion rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InletLayerConfig<const D: usize> {
    pub start_time: FT,
    pub stop_time: FT,
    /// Target particles per unit time while the layer is active.
    pub particles_per_second: FT,
    pub element_name: String,
    pub physical: PhysicalParams<D>,
    pub nodes: Vec<VF<D>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeighborhoodSearchAlgorithm {
    Grid,
    RStar,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationParams<const D: usize> {
    pub dt: FT,
    pub gravity: FT,

    /// Scale factor for the padded bounding box used to cull escaped
    /// particles.
    pub bounding_box_scale_factor: FT,
    /// If false, the extents below are used verbatim instead of being
    /// recomputed from the live particles.
    pub automatic_bounding_box: bool,
    pub bounding_box_low: Option<VF<D>>,
    pub bounding_box_high: Option<VF<D>>,

    pub neighborhood_search_algorithm: NeighborhoodSearchAlgorithm,

    /// Build bonded contact elements between touching continuum particles.
    pub continuum: bool,

    pub inlet_seed: u64,
}

impl<const D: usize> SimulationParams<D> {
    pub fn gravity_vector(&self) -> VF<D> {
        let mut data: [FT; D] = [0.; D];
        data[1] = self.gravity;
        VF::<D>::from_column_slice(&data)
    }
}

/// Initial free particles present before the first inlet step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialBlock<const D: usize> {
    pub element_name: String,
    pub physical: PhysicalParams<D>,
    pub positions: Vec<VF<D>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig<const D: usize> {
    pub initial_particles: Option<InitialBlock<D>>,
    pub inlet_layers: Vec<InletLayerConfig<D>>,
}

pub fn load_simulation_params<const D: usize>(path: &Path) -> Result<SimulationParams<D>> {
    let yaml = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&yaml)?)
}

pub fn load_scene_config<const D: usize>(path: &Path) -> Result<SceneConfig<D>> {
    let yaml = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&yaml)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3f;

    fn physical() -> PhysicalParams<3> {
        PhysicalParams {
            radius: 0.05,
            density: 2500.,
            young_modulus: 1e7,
            poisson_ratio: 0.25,
            friction: 0.5,
            ln_restitution: -1.6,
            rolling_friction: 0.01,
            rotation_damp_ratio: 0.05,
            sphericity: 1.,
            material: 1,
            velocity: vec3f(0., -2., 0.),
        }
    }

    #[test]
    fn null_velocity_keeps_other_fields() {
        let p = physical().with_null_velocity();
        assert_eq!(p.velocity, vec3f(0., 0., 0.));
        assert_eq!(p.radius, 0.05);
        assert_eq!(p.material, 1);
    }

    #[test]
    fn scene_config_yaml_roundtrip() {
        let scene = SceneConfig::<3> {
            initial_particles: None,
            inlet_layers: vec![InletLayerConfig {
                start_time: 0.,
                stop_time: 10.,
                particles_per_second: 100.,
                element_name: "SphericParticle3D".into(),
                physical: physical(),
                nodes: vec![vec3f(0., 0., 0.), vec3f(0.1, 0., 0.)],
            }],
        };

        let yaml = serde_yaml::to_string(&scene).unwrap();
        let parsed: SceneConfig<3> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.inlet_layers.len(), 1);
        assert_eq!(parsed.inlet_layers[0].nodes.len(), 2);
        assert_eq!(parsed.inlet_layers[0].element_name, "SphericParticle3D");
    }
}
