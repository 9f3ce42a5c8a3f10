pub mod bonds;
pub mod bounding_box;
pub mod concurrency;
pub mod creation;
pub mod destruction;
pub mod dimension;
pub mod element;
pub mod error;
pub mod flags;
pub mod inlet;
pub mod model_part;
pub mod neighborhood;
pub mod properties;
pub mod simulation;

pub type IT = i32;

#[cfg(feature = "double-precision")]
pub mod floating_type_mod {
    pub type FT = f64;
    pub use std::f64::consts::{FRAC_1_PI, PI};
}

#[cfg(not(feature = "double-precision"))]
pub mod floating_type_mod {
    pub type FT = f32;
    pub use std::f32::consts::{FRAC_1_PI, PI};
}

use floating_type_mod::FT;

use nalgebra::SVector;

pub type V<FT, const D: usize> = SVector<FT, D>;

pub type VF<const D: usize> = V<FT, D>;
pub type VI<const D: usize> = V<IT, D>;

pub type V2 = V<FT, 2>;
pub type V3 = V<FT, 3>;

pub fn vec2f(x: FT, y: FT) -> V<FT, 2> {
    [x, y].into()
}

pub fn vec3f(x: FT, y: FT, z: FT) -> V<FT, 3> {
    [x, y, z].into()
}

pub use bounding_box::BoundingBox;
pub use creation::ParticleCreator;
pub use dimension::{DimensionUtils, DimensionUtils2d, DimensionUtils3d};
pub use element::{element_template_from_name, ElementBehaviour, ElementKind, ElementTemplate};
pub use error::{Error, Result};
pub use flags::Flags;
pub use inlet::{Inlet, InletLayer};
pub use model_part::{ContactVec, ParticleVec, ScalarVariable, VectorVariable};
pub use neighborhood::NeighborhoodCache;
pub use properties::{
    load_scene_config, load_simulation_params, InitialBlock, InletLayerConfig,
    NeighborhoodSearchAlgorithm, PhysicalParams, SceneConfig, SimulationParams,
};
pub use simulation::{Counter, DemSimulation, StepReport};
