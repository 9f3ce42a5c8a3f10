use rstar::{primitives::GeomWithData, Point, RTree};

use crate::{
    concurrency::par_iter_mut1,
    dimension::DimensionUtils,
    floating_type_mod::FT,
    properties::{NeighborhoodSearchAlgorithm, SimulationParams},
    V, VF, VI,
};

const MAX_NEIGHBOR_COUNT: usize = 20000;

/// Per-particle neighbor index lists. Two balls are neighbors when their
/// centers are closer than the sum of their radii.
pub struct NeighborhoodCache {
    neighs: Vec<Vec<u32>>,
}

impl NeighborhoodCache {
    pub fn new(num_particles: usize) -> Self {
        NeighborhoodCache {
            neighs: (0..num_particles).map(|_| Vec::new()).collect(),
        }
    }

    pub fn iter<'a>(&'a self, i: usize) -> impl Iterator<Item = usize> + 'a {
        self.neighs[i].iter().map(|&x| x as usize)
    }

    pub fn neighbor_count(&self, i: usize) -> usize {
        self.neighs[i].len()
    }

    pub fn len(&self) -> usize {
        self.neighs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighs.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.neighs.truncate(len);
    }

    pub fn extend(&mut self, num_elements: usize) {
        self.neighs.extend((0..num_elements).map(|_| Vec::new()));
    }

    pub fn resize(&mut self, len: usize) {
        if len < self.neighs.len() {
            self.truncate(len);
        } else {
            let missing = len - self.neighs.len();
            self.extend(missing);
        }
    }

    pub fn internal_lists(&self) -> &Vec<Vec<u32>> {
        &self.neighs
    }

    #[inline(always)]
    pub fn build_neighborhood_list_rstar<const D: usize>(
        &mut self,
        positions: &[VF<D>],
        radii: &[FT],
    ) {
        #[derive(Debug, PartialEq, Clone, Copy)]
        struct CustomRTreePoint<const D: usize> {
            p: VF<D>,
        }
        impl<const D: usize> Point for CustomRTreePoint<D> {
            type Scalar = FT;

            const DIMENSIONS: usize = D;

            fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
                CustomRTreePoint {
                    p: VF::<D>::from_iterator((0..D).map(|d| generator(d))),
                }
            }

            fn nth(&self, index: usize) -> Self::Scalar {
                self.p[index]
            }

            fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
                &mut self.p[index]
            }
        }
        impl<const D: usize> From<VF<D>> for CustomRTreePoint<D> {
            fn from(p: VF<D>) -> Self {
                CustomRTreePoint { p }
            }
        }

        type CustomRTreeElem<const D: usize> = GeomWithData<CustomRTreePoint<D>, usize>;

        if positions.is_empty() {
            for p_neighs in &mut self.neighs {
                p_neighs.clear();
            }
            return;
        }

        let max_radius = radii.iter().cloned().fold(0., FT::max);

        let rtree_elems: Vec<_> = positions
            .iter()
            .enumerate()
            .map(|(idx, pos)| CustomRTreeElem::new(CustomRTreePoint::from(*pos), idx))
            .collect();
        let rtree = RTree::<CustomRTreeElem<D>>::bulk_load(rtree_elems);

        par_iter_mut1(&mut self.neighs, |i, p_neighs| {
            p_neighs.clear();

            let this_position = positions[i];
            // over-query with the largest possible contact distance, then
            // filter against the exact per-pair radius sum
            let query_radius = radii[i] + max_radius;

            let mut num_neighbors = 0;
            for neigh_point in
                rtree.locate_within_distance(CustomRTreePoint::from(this_position), query_radius * query_radius)
            {
                let j = neigh_point.data;
                if j == i {
                    continue;
                }

                let contact_distance = radii[i] + radii[j];
                let x_ij_sq = (this_position - positions[j]).norm_squared();
                if x_ij_sq >= contact_distance * contact_distance {
                    continue;
                }

                if num_neighbors == MAX_NEIGHBOR_COUNT {
                    panic!("exceeded maximum allowed number of {} neighbors", MAX_NEIGHBOR_COUNT);
                }
                p_neighs.push(j as u32);
                num_neighbors += 1;
            }
        });
    }

    #[inline(always)]
    pub fn build_neighborhood_list_grid<DU: DimensionUtils<D>, const D: usize>(
        &mut self,
        positions: &[VF<D>],
        radii: &[FT],
    ) {
        fn particle_to_cell_pos<const D: usize>(particle_pos: VF<D>, cell_size: FT) -> VI<D> {
            (particle_pos / cell_size).map(|x| x.floor() as i32)
        }

        if positions.is_empty() {
            for p_neighs in &mut self.neighs {
                p_neighs.clear();
            }
            return;
        }

        // two balls can only touch within twice the largest radius
        let max_radius = radii.iter().cloned().fold(0., FT::max);
        let cell_size = 2. * max_radius;

        let mut domain_min = positions[0];
        let mut domain_max = positions[0];
        for position in positions {
            for d in 0..D {
                domain_min[d] = FT::min(domain_min[d], position[d]);
                domain_max[d] = FT::max(domain_max[d], position[d]);
            }
        }

        let cells_min = domain_min.map(|x| (x / cell_size).floor() as i32 - 1);
        let cells_max = domain_max.map(|x| (x / cell_size).floor() as i32 + 2);
        let grid_size: V<usize, D> = (cells_max - cells_min).map(|x| x as usize);

        let mut grid: CellGrid<D> = CellGrid::new(cells_min, grid_size);

        for (particle_id, position) in positions.iter().enumerate() {
            let cell_pos = particle_to_cell_pos(*position, cell_size);
            grid.get_mut(cell_pos).particle_ids.push(particle_id);
        }

        par_iter_mut1(&mut self.neighs, |particle_id, p_neighs| {
            p_neighs.clear();

            let this_position = positions[particle_id];
            let particle_cell_pos = particle_to_cell_pos(this_position, cell_size);

            let mut num_neighbors = 0;
            DU::iterate_grid_neighbors(1, |offset| {
                let cell_pos = particle_cell_pos + offset;

                for d in 0..D {
                    if cell_pos[d] < cells_min[d] || cell_pos[d] >= cells_max[d] {
                        return;
                    }
                }

                for &neigh_particle_id in &grid.get(cell_pos).particle_ids {
                    if neigh_particle_id == particle_id {
                        continue;
                    }

                    let contact_distance = radii[particle_id] + radii[neigh_particle_id];
                    if (positions[neigh_particle_id] - this_position).norm_squared()
                        >= contact_distance * contact_distance
                    {
                        continue;
                    }

                    if num_neighbors == MAX_NEIGHBOR_COUNT {
                        panic!("exceeded maximum allowed number of {} neighbors", MAX_NEIGHBOR_COUNT);
                    }
                    p_neighs.push(neigh_particle_id as u32);
                    num_neighbors += 1;
                }
            });
        });
    }
}

#[inline(always)]
pub fn build_neighborhood_list<DU: DimensionUtils<D>, const D: usize>(
    simulation_params: &SimulationParams<D>,
    positions: &[VF<D>],
    radii: &[FT],
    neighs: &mut NeighborhoodCache,
) {
    neighs.resize(positions.len());
    match simulation_params.neighborhood_search_algorithm {
        NeighborhoodSearchAlgorithm::Grid => {
            neighs.build_neighborhood_list_grid::<DU, D>(positions, radii);
        }
        NeighborhoodSearchAlgorithm::RStar => {
            neighs.build_neighborhood_list_rstar::<D>(positions, radii);
        }
    }
}

struct Cell {
    particle_ids: Vec<usize>,
}

impl Cell {
    fn new() -> Cell {
        Cell {
            particle_ids: Vec::new(),
        }
    }
}

struct CellGrid<const D: usize> {
    grid_min: V<i32, D>,
    size: V<usize, D>,
    cells: Vec<Cell>,
}

impl<const D: usize> CellGrid<D> {
    fn new(grid_min: V<i32, D>, grid_size: V<usize, D>) -> CellGrid<D> {
        let num_elements = grid_size.fold(1, |acc, x| acc * x);
        CellGrid {
            grid_min,
            size: grid_size,
            cells: (0..num_elements).map(|_| Cell::new()).collect(),
        }
    }

    fn pos_to_idx(&self, mut cell_pos: V<i32, D>) -> usize {
        cell_pos = cell_pos - self.grid_min;

        let mut multiplier = 1;
        let mut idx: usize = 0;
        for d in 0..D {
            assert!(0 <= cell_pos[d]);
            assert!((cell_pos[d] as usize) < self.size[d]);
            idx += multiplier * cell_pos[d] as usize;
            multiplier *= self.size[d];
        }
        idx
    }

    fn get(&self, cell_pos: V<i32, D>) -> &Cell {
        let idx = self.pos_to_idx(cell_pos);
        self.cells
            .get(idx)
            .expect("out-of-bounds access should have been catched before")
    }

    fn get_mut(&mut self, cell_pos: V<i32, D>) -> &mut Cell {
        let idx = self.pos_to_idx(cell_pos);
        self.cells
            .get_mut(idx)
            .expect("out-of-bounds access should have been catched before")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dimension::DimensionUtils3d, vec3f, V3};
    use rand::{Rng, SeedableRng};

    fn sorted_lists(cache: &NeighborhoodCache) -> Vec<Vec<u32>> {
        cache
            .internal_lists()
            .iter()
            .map(|l| {
                let mut l = l.clone();
                l.sort_unstable();
                l
            })
            .collect()
    }

    #[test]
    fn touching_spheres_are_neighbors() {
        let positions: Vec<V3> = vec![vec3f(0., 0., 0.), vec3f(0.15, 0., 0.), vec3f(5., 0., 0.)];
        let radii = vec![0.1, 0.1, 0.1];

        let mut cache = NeighborhoodCache::new(positions.len());
        cache.build_neighborhood_list_grid::<DimensionUtils3d, 3>(&positions, &radii);

        assert_eq!(sorted_lists(&cache)[0], vec![1]);
        assert_eq!(sorted_lists(&cache)[1], vec![0]);
        assert!(cache.neighbor_count(2) == 0);
    }

    #[test]
    fn grid_and_rstar_agree_on_random_clouds() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let positions: Vec<V3> = (0..200)
            .map(|_| vec3f(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
            .collect();
        let radii: Vec<FT> = (0..200).map(|_| rng.gen_range(0.01..0.05)).collect();

        let mut grid_cache = NeighborhoodCache::new(positions.len());
        grid_cache.build_neighborhood_list_grid::<DimensionUtils3d, 3>(&positions, &radii);

        let mut rstar_cache = NeighborhoodCache::new(positions.len());
        rstar_cache.build_neighborhood_list_rstar::<3>(&positions, &radii);

        assert_eq!(sorted_lists(&grid_cache), sorted_lists(&rstar_cache));
    }

    #[test]
    fn empty_input_clears_lists() {
        let mut cache = NeighborhoodCache::new(0);
        cache.build_neighborhood_list_grid::<DimensionUtils3d, 3>(&[], &[]);
        assert!(cache.is_empty());
    }
}
