use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector, DIM};
use crate::query::{Ray, RayCast, RayIntersection};

impl RayCast for Aabb {
    /// Slab test: clips the ray's time interval against each pair of parallel faces.
    fn cast_local_ray(&self, ray: &Ray, max_time_of_impact: Real, solid: bool) -> Option<Real> {
        let mut enter: Real = 0.0;
        let mut exit = max_time_of_impact;

        for i in 0..DIM {
            if ray.dir[i] == 0.0 {
                // Parallel to this slab: the origin must already be between its faces.
                if !(self.mins[i]..=self.maxs[i]).contains(&ray.origin[i]) {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / ray.dir[i];
            let t_mins = (self.mins[i] - ray.origin[i]) * inv_dir;
            let t_maxs = (self.maxs[i] - ray.origin[i]) * inv_dir;

            enter = enter.max(t_mins.min(t_maxs));
            exit = exit.min(t_mins.max(t_maxs));

            if enter > exit {
                return None;
            }
        }

        // A hollow box starting around the origin is hit on the way out.
        if enter == 0.0 && !solid {
            Some(exit)
        } else {
            Some(enter)
        }
    }

    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
        solid: bool,
    ) -> Option<RayIntersection> {
        let toi = self.cast_local_ray(ray, max_time_of_impact, solid)?;
        let offset = ray.point_at(toi) - self.center();
        let half_extents = self.half_extents();

        // The face hit is the one the hit point is relatively the closest to.
        let axis = (0..DIM)
            .filter(|i| half_extents[*i] > 0.0)
            .max_by(|a, b| {
                let ra = (offset[*a] / half_extents[*a]).abs();
                let rb = (offset[*b] / half_extents[*b]).abs();
                ra.total_cmp(&rb)
            })
            .unwrap_or(0);

        let mut normal = Vector::zeros();
        normal[axis] = offset[axis].signum();
        Some(RayIntersection::new(toi, normal))
    }
}
