use std::mem;

use crate::{
    bounding_box::BoundingBox,
    element::ElementKind,
    flags::Flags,
    floating_type_mod::FT,
    model_part::{ContactVec, ParticleVec, ScalarVariable, VectorVariable},
    VF,
};

/// Marks every particle whose center leaves `[low, high]` on any axis.
pub fn mark_particles_outside_bounding_box<const D: usize>(
    particles: &mut ParticleVec<D>,
    low: VF<D>,
    high: VF<D>,
) {
    for i in 0..particles.len() {
        let coor = particles.position[i];
        let mut include = true;
        for d in 0..D {
            include = include && coor[d] >= low[d] && coor[d] <= high[d];
        }
        if !include {
            particles.flags[i].set(Flags::TO_ERASE);
        }
    }
}

/// Convenience: cull against the current padded culling domain.
pub fn mark_distant_particles<const D: usize>(particles: &mut ParticleVec<D>, bbox: &BoundingBox<D>) {
    mark_particles_outside_bounding_box(particles, bbox.low(), bbox.high());
}

/// Marks particles whose scalar `variable` lies outside
/// `[value - |tol|, value + |tol|]` (the close-to-`value` band survives).
pub fn mark_particles_by_scalar_value<const D: usize>(
    particles: &mut ParticleVec<D>,
    variable: ScalarVariable,
    value: FT,
    tol: FT,
) {
    for i in 0..particles.len() {
        let i_value = particles.scalar(variable, i);
        if i_value <= value - tol.abs() || i_value >= value + tol.abs() {
            particles.flags[i].set(Flags::TO_ERASE);
        }
    }
}

/// Same band test, applied to the Euclidean norm of a vector `variable`.
pub fn mark_particles_by_vector_modulus<const D: usize>(
    particles: &mut ParticleVec<D>,
    variable: VectorVariable,
    value: FT,
    tol: FT,
) {
    for i in 0..particles.len() {
        let i_value = particles.vector(variable, i).norm();
        if i_value <= value - tol.abs() || i_value >= value + tol.abs() {
            particles.flags[i].set(Flags::TO_ERASE);
        }
    }
}

/// Continuum only: propagates TO_ERASE from every doomed particle to the
/// contact elements in its bond list, so no surviving contact can reference a
/// removed particle. Must run after all particle marking and before either
/// compaction pass. No-op for particles without bonded contacts.
pub fn mark_contact_elements_of_erased_particles<const D: usize>(
    particles: &ParticleVec<D>,
    contacts: &mut ContactVec,
) {
    for i in 0..particles.len() {
        if particles.flags[i].is_not(Flags::TO_ERASE) {
            continue;
        }
        if particles.kind[i] != ElementKind::SphericContinuum {
            continue;
        }
        for &bond in &particles.bonds[i] {
            contacts.flags[bond as usize].set(Flags::TO_ERASE);
        }
    }
}

/// Compacting erase pass: swaps the live store out, then re-adds every
/// particle not marked TO_ERASE. One pass, one temporary store; never removes
/// rows one at a time. Retained rows keep their old `neighbours`/`bonds`
/// index lists, which are only valid again after the next search pass.
pub fn destroy_particles<const D: usize>(particles: &mut ParticleVec<D>) {
    let temp = mem::replace(particles, ParticleVec::<D>::default(0));

    for i in 0..temp.len() {
        if temp.flags[i].is_not(Flags::TO_ERASE) {
            particles.push_from(&temp, i);
        }
    }
}

/// Compacting erase pass over the contact container.
pub fn destroy_contact_elements(contacts: &mut ContactVec) {
    let temp = mem::replace(contacts, ContactVec::default(0));

    for i in 0..temp.len() {
        if temp.flags[i].is_not(Flags::TO_ERASE) {
            contacts.push_from(&temp, i);
        }
    }
}
