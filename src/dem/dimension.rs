use crate::{
    floating_type_mod::{FRAC_1_PI, FT, PI},
    VI,
};

/// Dimension-dependent helpers. Everything that differs between a 2D and a 3D
/// simulation (ball volume, grid stencils) goes through this trait so the rest
/// of the crate can stay generic over `D`.
pub trait DimensionUtils<const D: usize>: Sync {
    fn iterate_grid_neighbors(dist: i32, f: impl FnMut(VI<D>));

    fn sphere_volume_to_radius(volume: FT) -> FT;
    fn radius_to_sphere_volume(r: FT) -> FT;
}

pub enum DimensionUtils2d {}
impl DimensionUtils<2> for DimensionUtils2d {
    fn iterate_grid_neighbors(dist: i32, mut f: impl FnMut(VI<2>)) {
        for y in -dist..=dist {
            for x in -dist..=dist {
                f([x, y].into());
            }
        }
    }

    /** In the 2D case this is "disc area to radius" */
    fn sphere_volume_to_radius(area: FT) -> FT {
        // A = PI * r^2   =>  r = sqrt(A/PI)
        (area * FRAC_1_PI).sqrt()
    }

    fn radius_to_sphere_volume(r: FT) -> FT {
        PI * r * r
    }
}

pub enum DimensionUtils3d {}
impl DimensionUtils<3> for DimensionUtils3d {
    fn iterate_grid_neighbors(dist: i32, mut f: impl FnMut(VI<3>)) {
        for z in -dist..=dist {
            for y in -dist..=dist {
                for x in -dist..=dist {
                    f([x, y, z].into());
                }
            }
        }
    }

    fn sphere_volume_to_radius(volume: FT) -> FT {
        // V = 4/3 * PI * r^3   =>  r = (3V/4PI)^(1/3)
        (volume * 0.75 * FRAC_1_PI).cbrt()
    }

    fn radius_to_sphere_volume(r: FT) -> FT {
        4. / 3. * PI * r * r * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_radius_roundtrip_3d() {
        for r in [0.001, 0.05, 1., 13.7] {
            let v = DimensionUtils3d::radius_to_sphere_volume(r);
            let r2 = DimensionUtils3d::sphere_volume_to_radius(v);
            assert!((r - r2).abs() < 1e-4 * r, "r={} r2={}", r, r2);
        }
    }

    #[test]
    fn grid_neighbor_counts() {
        let mut count2 = 0;
        DimensionUtils2d::iterate_grid_neighbors(1, |_| count2 += 1);
        assert_eq!(count2, 9);

        let mut count3 = 0;
        DimensionUtils3d::iterate_grid_neighbors(1, |_| count3 += 1);
        assert_eq!(count3, 27);
    }
}
