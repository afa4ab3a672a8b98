use crate::math::{Point, Real, Vector};
use crate::query::{Ray, RayCast, RayIntersection};
use crate::shape::Triangle;

impl RayCast for Triangle {
    #[inline]
    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
        _: bool,
    ) -> Option<RayIntersection> {
        local_ray_intersection_with_triangle(&self.a, &self.b, &self.c, ray)
            .filter(|inter| inter.time_of_impact <= max_time_of_impact)
    }
}

/// Intersects a ray with the triangle `abc`, from either side.
///
/// The result carries the barycentric coordinates of the hit point. Edges and vertices belong
/// to the triangle, so a ray through an edge shared by two triangles hits both of them. Rays
/// parallel to the triangle's plane never hit.
pub fn local_ray_intersection_with_triangle(
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
    ray: &Ray,
) -> Option<RayIntersection> {
    let ab = b - a;
    let ac = c - a;
    let n = ab.cross(&ac);
    let n_dot_dir = n.dot(&ray.dir);

    if n_dot_dir == 0.0 {
        return None;
    }

    // Orient everything so the ray goes against the normal.
    let side = if n_dot_dir > 0.0 { -1.0 } else { 1.0 };
    let denom = n_dot_dir.abs();
    let ap = ray.origin - a;
    let toi = side * ap.dot(&n);

    if toi < 0.0 {
        // The triangle's plane is behind the ray's origin.
        return None;
    }

    // Unnormalized barycentric coordinates, compared to `denom` without dividing first so
    // that edge hits are decided exactly.
    let e = ap.cross(&ray.dir);
    let v = side * ac.dot(&e);
    if v < 0.0 || v > denom {
        return None;
    }

    let w = -side * ab.dot(&e);
    if w < 0.0 || v + w > denom {
        return None;
    }

    let inv_denom = 1.0 / denom;
    let (v, w) = (v * inv_denom, w * inv_denom);

    Some(RayIntersection {
        time_of_impact: toi * inv_denom,
        normal: n.normalize() * side,
        barycentric: Some(Vector::new(1.0 - v - w, v, w)),
    })
}
