use oorandom::Rand64;
use terracarve3d::math::{Affine, Point, Real, Translation};
use terracarve3d::shape::Mesh;

/// A `(cells + 1)²` grid of vertices over `[0, size]²`, elevated by `height`.
pub fn grid_terrain(cells: u32, size: Real, mut height: impl FnMut(Real, Real) -> Real) -> Mesh {
    let step = size / cells as Real;
    let mut vertices = vec![];
    for j in 0..=cells {
        for i in 0..=cells {
            let (x, y) = (i as Real * step, j as Real * step);
            vertices.push(Point::new(x, y, height(x, y)));
        }
    }

    let row = cells + 1;
    let mut triangles = vec![];
    for j in 0..cells {
        for i in 0..cells {
            let a = j * row + i;
            triangles.push([a, a + 1, a + row + 1]);
            triangles.push([a, a + row + 1, a + row]);
        }
    }

    Mesh::from_triangles(vertices, &triangles).unwrap()
}

/// A grid terrain with uniformly random heights in `[zmin, zmax]`.
pub fn random_terrain(rng: &mut Rand64, cells: u32, size: Real, [zmin, zmax]: [Real; 2]) -> Mesh {
    grid_terrain(cells, size, |_, _| {
        zmin + (zmax - zmin) * rng.rand_float() as Real
    })
}

/// An axis-aligned square polygon at elevation `z`.
pub fn square(mins: [Real; 2], maxs: [Real; 2], z: Real) -> Mesh {
    Mesh::from_polygon(vec![
        Point::new(mins[0], mins[1], z),
        Point::new(maxs[0], mins[1], z),
        Point::new(maxs[0], maxs[1], z),
        Point::new(mins[0], maxs[1], z),
    ])
    .unwrap()
}

/// A closed box with its bottom face at `z = 0`, as made by a modeling tool: six quads.
pub fn box_building(width: Real, depth: Real, height: Real) -> Mesh {
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(width, 0.0, 0.0),
        Point::new(width, depth, 0.0),
        Point::new(0.0, depth, 0.0),
        Point::new(0.0, 0.0, height),
        Point::new(width, 0.0, height),
        Point::new(width, depth, height),
        Point::new(0.0, depth, height),
    ];
    let faces: [[u32; 4]; 6] = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [1, 2, 6, 5],
        [2, 3, 7, 6],
        [3, 0, 4, 7],
    ];
    Mesh::new(vertices, faces.iter().map(|f| f[..].into()).collect()).unwrap()
}

pub fn translation(x: Real, y: Real, z: Real) -> Affine<Real> {
    Affine::from_matrix_unchecked(Translation::new(x, y, z).to_homogeneous())
}

/// Twice the signed area of the projection of a polygon on the `XY` plane.
pub fn shoelace(points: &[[Real; 2]]) -> Real {
    (0..points.len())
        .map(|i| {
            let [x0, y0] = points[i];
            let [x1, y1] = points[(i + 1) % points.len()];
            x0 * y1 - x1 * y0
        })
        .sum()
}
