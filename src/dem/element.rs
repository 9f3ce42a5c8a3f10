use enum_dispatch::enum_dispatch;

use crate::{
    error::{Error, Result},
    model_part::ParticleVec,
};

/// Concrete particle kind stored per element row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Spheric,
    SphericContinuum,
    RigidWall,
}

impl ElementKind {
    pub fn is_spheric(self) -> bool {
        matches!(self, ElementKind::Spheric | ElementKind::SphericContinuum)
    }
}

/// The behavior hooks every element template provides. The factory invokes
/// `initialize` once right after creation and `initialize_solution_step` at
/// the start of the step the element was created in.
#[enum_dispatch]
pub trait ElementBehaviour<const D: usize> {
    fn kind(&self) -> ElementKind;

    fn initialize(&self, particles: &mut ParticleVec<D>, i: usize);

    fn initialize_solution_step(&self, particles: &mut ParticleVec<D>, i: usize);
}

pub struct SphericTemplate<const D: usize>;
impl<const D: usize> ElementBehaviour<D> for SphericTemplate<D> {
    fn kind(&self) -> ElementKind {
        ElementKind::Spheric
    }

    fn initialize(&self, particles: &mut ParticleVec<D>, i: usize) {
        particles.kind[i] = ElementKind::Spheric;
        particles.bonds[i].clear();
    }

    fn initialize_solution_step(&self, _particles: &mut ParticleVec<D>, _i: usize) {}
}

pub struct SphericContinuumTemplate<const D: usize>;
impl<const D: usize> ElementBehaviour<D> for SphericContinuumTemplate<D> {
    fn kind(&self) -> ElementKind {
        ElementKind::SphericContinuum
    }

    fn initialize(&self, particles: &mut ParticleVec<D>, i: usize) {
        particles.kind[i] = ElementKind::SphericContinuum;
        particles.bonds[i].clear();
    }

    fn initialize_solution_step(&self, _particles: &mut ParticleVec<D>, _i: usize) {}
}

/// Wall/support surface element. Registered so a scene file naming it is
/// diagnosed as a type mismatch by the particle factory instead of silently
/// producing a ball.
pub struct RigidWallTemplate<const D: usize>;
impl<const D: usize> ElementBehaviour<D> for RigidWallTemplate<D> {
    fn kind(&self) -> ElementKind {
        ElementKind::RigidWall
    }

    fn initialize(&self, _particles: &mut ParticleVec<D>, _i: usize) {}

    fn initialize_solution_step(&self, _particles: &mut ParticleVec<D>, _i: usize) {}
}

#[enum_dispatch(ElementBehaviour<D>)]
pub enum ElementTemplate<const D: usize> {
    SphericTemplate(SphericTemplate<D>),
    SphericContinuumTemplate(SphericContinuumTemplate<D>),
    RigidWallTemplate(RigidWallTemplate<D>),
}

/// Resolves an element-template name from a scene/config file.
pub fn element_template_from_name<const D: usize>(name: &str) -> Result<ElementTemplate<D>> {
    match name {
        "SphericParticle3D" | "SphericParticle2D" => Ok(SphericTemplate::<D>.into()),
        "SphericContinuumParticle3D" | "SphericContinuumParticle2D" => {
            Ok(SphericContinuumTemplate::<D>.into())
        }
        "RigidFace3D" | "RigidEdge2D" => Ok(RigidWallTemplate::<D>.into()),
        _ => Err(Error::UnknownElement(name.into())),
    }
}
