use nalgebra::zero;
use serde::{Deserialize, Serialize};

use crate::{element::ElementKind, flags::Flags, floating_type_mod::FT, IT, VF};

/// Generates a structure-of-arrays entity store. All columns move together:
/// `swap`/`truncate` support the delete-by-swapping idiom, `push_from` the
/// rebuild-by-filter compaction pass.
macro_rules! decl_entity_vec {
    (@methods $($field_name:ident : $field_type:ty = $default_value:expr),*) => {
        pub fn swap(&mut self, i: usize, j: usize) {
            $(
                self.$field_name.swap(i, j);
            )*
        }

        pub fn truncate(&mut self, len: usize) {
            $(
                self.$field_name.truncate(len);
            )*
        }

        pub fn extend(&mut self, num_elements: usize) {
            $(
                self.$field_name.extend((0..num_elements).map::<$field_type, _>(|_| $default_value));
            )*
        }

        pub fn push_from(&mut self, other: &Self, i: usize) {
            $(
                self.$field_name.push(other.$field_name[i].clone());
            )*
        }

        pub fn default(len: usize) -> Self {
            Self {
                $(
                    $field_name: (0..len).map(|_| $default_value).collect::<Vec<$field_type>>(),
                )*
            }
        }
    };

    (pub struct $struct_name:ident<const D: usize> { $(pub $field_name:ident: Vec<$field_type:ty> | $default_value:expr),*$(,)?  }) => {
        pub struct $struct_name<const D: usize> {
            $(
                pub $field_name : Vec<$field_type>,
            )*
        }

        impl<const D: usize> $struct_name<D> {
            decl_entity_vec!(@methods $($field_name : $field_type = $default_value),*);
        }
    };

    (pub struct $struct_name:ident { $(pub $field_name:ident: Vec<$field_type:ty> | $default_value:expr),*$(,)?  }) => {
        pub struct $struct_name {
            $(
                pub $field_name : Vec<$field_type>,
            )*
        }

        impl $struct_name {
            decl_entity_vec!(@methods $($field_name : $field_type = $default_value),*);
        }
    }
}

decl_entity_vec! {
    pub struct ParticleVec<const D: usize> {
        pub id: Vec<u64> | 0,

        pub position: Vec<VF<D>> | zero(),
        pub velocity: Vec<VF<D>> | zero(),
        pub angular_velocity: Vec<VF<D>> | zero(),

        pub radius: Vec<FT> | 0.,
        pub density: Vec<FT> | 0.,
        pub sqrt_mass: Vec<FT> | 0.,
        pub young_modulus: Vec<FT> | 0.,
        pub poisson_ratio: Vec<FT> | 0.,
        pub friction: Vec<FT> | 0.,
        pub ln_restitution: Vec<FT> | 0.,
        pub rolling_friction: Vec<FT> | 0.,
        pub rotation_damp_ratio: Vec<FT> | 0.,
        pub sphericity: Vec<FT> | 1.,
        pub material: Vec<IT> | 0,

        pub kind: Vec<ElementKind> | ElementKind::Spheric,
        pub flags: Vec<Flags> | Flags::empty(),

        // indices into the contact store; only filled for continuum particles,
        // valid from bond construction until the contact compaction pass
        pub bonds: Vec<Vec<u32>> | Vec::new(),
    }
}

impl<const D: usize> ParticleVec<D> {
    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    pub fn scalar(&self, variable: ScalarVariable, i: usize) -> FT {
        match variable {
            ScalarVariable::Radius => self.radius[i],
            ScalarVariable::Density => self.density[i],
            ScalarVariable::YoungModulus => self.young_modulus[i],
            ScalarVariable::PoissonRatio => self.poisson_ratio[i],
            ScalarVariable::Friction => self.friction[i],
            ScalarVariable::LnRestitution => self.ln_restitution[i],
            ScalarVariable::RollingFriction => self.rolling_friction[i],
            ScalarVariable::Sphericity => self.sphericity[i],
        }
    }

    pub fn vector(&self, variable: VectorVariable, i: usize) -> VF<D> {
        match variable {
            VectorVariable::Position => self.position[i],
            VectorVariable::Velocity => self.velocity[i],
            VectorVariable::AngularVelocity => self.angular_velocity[i],
        }
    }

}

decl_entity_vec! {
    pub struct ContactVec {
        pub id: Vec<u64> | 0,
        // endpoint particles by node id (stable across compaction)
        pub particle_a: Vec<u64> | 0,
        pub particle_b: Vec<u64> | 0,
        pub flags: Vec<Flags> | Flags::empty(),
    }
}

impl ContactVec {
    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// Named per-particle scalar fields, used by the threshold-marking predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarVariable {
    Radius,
    Density,
    YoungModulus,
    PoissonRatio,
    Friction,
    LnRestitution,
    RollingFriction,
    Sphericity,
}

/// Named per-particle 3-vector fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorVariable {
    Position,
    Velocity,
    AngularVelocity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2f;

    #[test]
    fn swap_moves_all_columns() {
        let mut particles = ParticleVec::<2>::default(3);
        particles.id[0] = 10;
        particles.id[2] = 30;
        particles.radius[0] = 1.;
        particles.radius[2] = 3.;
        particles.position[2] = vec2f(5., 6.);

        particles.swap(0, 2);
        assert_eq!(particles.id[0], 30);
        assert_eq!(particles.id[2], 10);
        assert_eq!(particles.radius[0], 3.);
        assert_eq!(particles.position[0], vec2f(5., 6.));
    }

    #[test]
    fn push_from_copies_one_row() {
        let mut src = ParticleVec::<2>::default(2);
        src.id[1] = 42;
        src.bonds[1] = vec![0];

        let mut dst = ParticleVec::<2>::default(0);
        dst.push_from(&src, 1);
        assert_eq!(dst.len(), 1);
        assert_eq!(dst.id[0], 42);
        assert_eq!(dst.bonds[0], vec![0]);
    }
}
