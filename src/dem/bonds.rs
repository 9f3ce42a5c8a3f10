use crate::{
    element::ElementKind,
    flags::Flags,
    model_part::{ContactVec, ParticleVec},
    neighborhood::NeighborhoodCache,
};

/// Rebuilds the contact element store from the current neighbor lists. Every
/// touching pair of continuum particles gets exactly one contact element, with
/// ids drawn monotonically from `next_contact_id`. Fills the per-particle
/// bond index lists; indices stay valid until the next contact compaction.
pub fn build_bonds<const D: usize>(
    particles: &mut ParticleVec<D>,
    contacts: &mut ContactVec,
    neighs: &NeighborhoodCache,
    next_contact_id: &mut u64,
) {
    *contacts = ContactVec::default(0);
    for bond_list in &mut particles.bonds {
        bond_list.clear();
    }

    for i in 0..particles.len() {
        if particles.kind[i] != ElementKind::SphericContinuum {
            continue;
        }

        for j in neighs.iter(i) {
            // each pair once
            if j <= i {
                continue;
            }
            if particles.kind[j] != ElementKind::SphericContinuum {
                continue;
            }

            *next_contact_id += 1;

            let contact_idx = contacts.len();
            contacts.extend(1);
            contacts.id[contact_idx] = *next_contact_id;
            contacts.particle_a[contact_idx] = particles.id[i];
            contacts.particle_b[contact_idx] = particles.id[j];
            contacts.flags[contact_idx] = Flags::empty();

            particles.bonds[i].push(contact_idx as u32);
            particles.bonds[j].push(contact_idx as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dimension::DimensionUtils3d, vec3f};

    fn touching_chain(kinds: &[ElementKind]) -> (ParticleVec<3>, NeighborhoodCache) {
        // particles at x = 0, 0.15, 0.3, ... with radius 0.1 touch their
        // direct neighbors only
        let mut particles = ParticleVec::<3>::default(kinds.len());
        for (i, &kind) in kinds.iter().enumerate() {
            particles.id[i] = i as u64 + 1;
            particles.position[i] = vec3f(0.15 * i as crate::floating_type_mod::FT, 0., 0.);
            particles.radius[i] = 0.1;
            particles.kind[i] = kind;
        }

        let mut neighs = NeighborhoodCache::new(particles.len());
        neighs.build_neighborhood_list_grid::<DimensionUtils3d, 3>(
            &particles.position,
            &particles.radius,
        );
        (particles, neighs)
    }

    #[test]
    fn chain_of_continuum_particles_gets_one_bond_per_touching_pair() {
        let kinds = [ElementKind::SphericContinuum; 3];
        let (mut particles, neighs) = touching_chain(&kinds);

        let mut contacts = ContactVec::default(0);
        let mut next_contact_id = 0;
        build_bonds(&mut particles, &mut contacts, &neighs, &mut next_contact_id);

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts.id, vec![1, 2]);
        assert_eq!(contacts.particle_a, vec![1, 2]);
        assert_eq!(contacts.particle_b, vec![2, 3]);
        assert_eq!(particles.bonds[0], vec![0]);
        assert_eq!(particles.bonds[1], vec![0, 1]);
        assert_eq!(particles.bonds[2], vec![1]);
    }

    #[test]
    fn plain_spheric_particles_are_never_bonded() {
        let kinds = [
            ElementKind::SphericContinuum,
            ElementKind::Spheric,
            ElementKind::SphericContinuum,
        ];
        let (mut particles, neighs) = touching_chain(&kinds);

        let mut contacts = ContactVec::default(0);
        let mut next_contact_id = 0;
        build_bonds(&mut particles, &mut contacts, &neighs, &mut next_contact_id);

        // the middle spheric particle breaks the chain and 1 and 3 are apart
        assert!(contacts.is_empty());
        assert!(particles.bonds.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn rebuilding_continues_the_id_sequence() {
        let kinds = [ElementKind::SphericContinuum; 2];
        let (mut particles, neighs) = touching_chain(&kinds);

        let mut contacts = ContactVec::default(0);
        let mut next_contact_id = 0;
        build_bonds(&mut particles, &mut contacts, &neighs, &mut next_contact_id);
        build_bonds(&mut particles, &mut contacts, &neighs, &mut next_contact_id);

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts.id, vec![2]);
        assert_eq!(particles.bonds[0], vec![0]);
        assert_eq!(next_contact_id, 2);
    }
}
