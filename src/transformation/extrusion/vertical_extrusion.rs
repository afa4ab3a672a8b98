use super::ExtrusionError;
use crate::math::{Point, Real, Vector};
use crate::shape::{weld_tolerance, TriMesh};

/// A closed solid obtained by extruding a surface along the `Z` axis.
///
/// The first [`Self::base_vertex_count`] vertices of the solid are the vertices of the extruded
/// surface (the base), and the following ones are their translated copies (the cap).
#[derive(Clone, Debug)]
pub struct Prism {
    solid: TriMesh,
    base_len: usize,
}

impl Prism {
    /// The closed, outward-oriented triangle mesh of this prism.
    #[inline]
    pub fn solid(&self) -> &TriMesh {
        &self.solid
    }

    /// Consumes this prism, returning its solid.
    #[inline]
    pub fn into_solid(self) -> TriMesh {
        self.solid
    }

    /// The number of vertices of the base.
    #[inline]
    pub fn base_vertex_count(&self) -> usize {
        self.base_len
    }

    /// The vertices of the cap: the translated copy of the extruded surface.
    #[inline]
    pub fn cap_vertices(&self) -> &[Point<Real>] {
        &self.solid.vertices()[self.base_len..]
    }

    /// The smallest `z` coordinate of the cap's vertices.
    pub fn cap_min_z(&self) -> Real {
        self.cap_vertices()
            .iter()
            .map(|pt| pt.z)
            .fold(Real::MAX, Real::min)
    }

    /// Moves every base vertex to the elevation `z`, flattening the base.
    ///
    /// This stretches an upward prism downward so that it reaches below `z`'s level. The cap
    /// stays in place, so `z` must be strictly below every cap vertex.
    pub fn lower_base_to(&mut self, z: Real) -> Result<(), ExtrusionError> {
        let cap_min_z = self.cap_min_z();
        if !z.is_finite() || z >= cap_min_z {
            return Err(ExtrusionError::InvalidDepth(cap_min_z - z));
        }

        let base_len = self.base_len;
        self.solid
            .modify_vertices(|vertices| vertices[..base_len].iter_mut().for_each(|pt| pt.z = z));
        Ok(())
    }
}

/// Extrudes an open surface by `dz` along the `Z` axis into a closed solid.
///
/// The surface is welded, then closed by a translated copy of itself and by vertical walls
/// along its boundary edges. The resulting solid is oriented outward regardless of the
/// surface's orientation and of the sign of `dz`. The surface is expected to be a height field
/// over the `XY` plane, otherwise the solid self-intersects.
pub fn extrude_vertically(surface: &TriMesh, dz: Real) -> Result<Prism, ExtrusionError> {
    if !dz.is_finite() || dz == 0.0 {
        return Err(ExtrusionError::InvalidDepth(dz));
    }

    let mut surface = surface.clone();
    let removed = surface.merge_vertices(weld_tolerance(surface.local_aabb()));
    if removed > 0 {
        log::debug!("removed {removed} degenerate triangles before extrusion");
    }

    if surface.num_triangles() == 0 {
        return Err(ExtrusionError::DegenerateFootprint);
    }

    let boundary = surface
        .boundary_edges()
        .map_err(ExtrusionError::NonManifoldSurface)?;
    if boundary.is_empty() {
        return Err(ExtrusionError::DegenerateFootprint);
    }

    let (vertices, indices) = surface.into_parts();
    let base_len = vertices.len();
    let n = base_len as u32;
    let shift = Vector::z() * dz;

    let mut solid_vertices = vertices.clone();
    solid_vertices.extend(vertices.iter().map(|pt| pt + shift));

    let mut solid_indices = Vec::with_capacity(indices.len() * 2 + boundary.len() * 2);
    solid_indices.extend_from_slice(&indices);
    solid_indices.extend(indices.iter().map(|[a, b, c]| [b + n, a + n, c + n]));
    for (_, [a, b]) in boundary {
        solid_indices.push([b, a, a + n]);
        solid_indices.push([b, a + n, b + n]);
    }

    let mut solid = TriMesh::new(solid_vertices, solid_indices)?;
    if solid.signed_volume() < 0.0 {
        solid.reverse();
    }
    solid
        .check_manifold()
        .map_err(ExtrusionError::NonManifoldSurface)?;

    Ok(Prism { solid, base_len })
}

/// Extrudes a roughly horizontal footprint upward by `depth` into a prism.
///
/// Fails with [`ExtrusionError::DegenerateFootprint`] if the footprint's projection on the `XY`
/// plane has no area.
pub fn extrude_footprint(footprint: &TriMesh, depth: Real) -> Result<Prism, ExtrusionError> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(ExtrusionError::InvalidDepth(depth));
    }

    let projected_area: Real = footprint
        .triangles()
        .map(|tri| tri.scaled_normal().z.abs() / 2.0)
        .sum();
    let diag = footprint.local_aabb().diagonal_length();
    if projected_area <= diag * diag * crate::math::DEFAULT_EPSILON {
        return Err(ExtrusionError::DegenerateFootprint);
    }

    extrude_vertically(footprint, depth)
}

/// Thickens a terrain surface downward by `depth` into a closed slab.
///
/// Every vertex gets a copy `depth` units below it, so the slab's bottom follows the surface's
/// relief.
pub fn thicken_downward(surface: &TriMesh, depth: Real) -> Result<TriMesh, ExtrusionError> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(ExtrusionError::InvalidDepth(depth));
    }

    extrude_vertically(surface, -depth).map(Prism::into_solid)
}
