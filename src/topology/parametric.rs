//! Reference-element tables and parametric helpers.
//!
//! Two coordinate systems are used:
//! - *local coordinates*: every node of an element placed on the unit
//!   square/triangle/cube/tetrahedron; used to decide which side of a cut
//!   a node falls on when creating children.
//! - *parametric coordinates*: the isoparametric reference frame of the
//!   shape functions (`[-1, 1]^2` for quads, area coordinates for
//!   triangles); used to place interior nodes.

use crate::topology::element_kind::ElementKind;

pub type Point3 = [f64; 3];

#[inline]
pub fn sub(a: Point3, b: Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn add(a: Point3, b: Point3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(a: Point3, s: f64) -> Point3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Point3, b: Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Point3, b: Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Unit vector along `a`; the zero vector stays zero.
pub fn normalize(a: Point3) -> Point3 {
    let len = dot(a, a).sqrt();
    if len < f64::EPSILON { a } else { scale(a, 1.0 / len) }
}

/// Corner node indices of each hexahedron face, outward oriented.
pub const HEX_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
    [4, 5, 6, 7],
];

/// Corner node indices of each tetrahedron face, outward oriented.
pub const TET_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];

/// Non-vertex nodes of each hexahedron face (mid-edges, then centre).
pub const HEX_FACE_INTERIOR: [[usize; 5]; 6] = [
    [8, 9, 10, 11, 20],
    [8, 13, 16, 12, 21],
    [9, 14, 17, 13, 22],
    [10, 14, 18, 15, 23],
    [11, 15, 19, 12, 24],
    [16, 17, 18, 19, 25],
];

/// Mid-edge nodes of each tetrahedron face.
pub const TET_FACE_INTERIOR: [[usize; 3]; 4] = [[4, 5, 6], [4, 7, 8], [5, 8, 9], [6, 7, 9]];

/// Vertex indices of face `face` of a 3D element.
pub fn face_vertices(kind: ElementKind, face: usize) -> &'static [usize] {
    if kind.is_hex() {
        &HEX_FACES[face]
    } else {
        &TET_FACES[face]
    }
}

/// Non-vertex node indices of face `face`, truncated to what `kind` has.
pub fn face_interior(kind: ElementKind, face: usize) -> &'static [usize] {
    let n = kind.num_face_interior_nodes();
    if kind.is_hex() {
        &HEX_FACE_INTERIOR[face][..n]
    } else {
        &TET_FACE_INTERIOR[face][..n]
    }
}

/// Local coordinates of every node of `kind` (z = 0 in 2D).
pub fn local_node_coords(kind: ElementKind) -> Vec<Point3> {
    const QUAD: [Point3; 9] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.5, 0.0, 0.0],
        [1.0, 0.5, 0.0],
        [0.5, 1.0, 0.0],
        [0.0, 0.5, 0.0],
        [0.5, 0.5, 0.0],
    ];
    const TRI: [Point3; 6] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.5, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.0, 0.5, 0.0],
    ];
    const HEX: [Point3; 27] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
        [0.5, 0.0, 0.0],
        [1.0, 0.5, 0.0],
        [0.5, 1.0, 0.0],
        [0.0, 0.5, 0.0],
        [0.0, 0.0, 0.5],
        [1.0, 0.0, 0.5],
        [1.0, 1.0, 0.5],
        [0.0, 1.0, 0.5],
        [0.5, 0.0, 1.0],
        [1.0, 0.5, 1.0],
        [0.5, 1.0, 1.0],
        [0.0, 0.5, 1.0],
        [0.5, 0.5, 0.0],
        [0.5, 0.0, 0.5],
        [1.0, 0.5, 0.5],
        [0.5, 1.0, 0.5],
        [0.0, 0.5, 0.5],
        [0.5, 0.5, 1.0],
        [0.5, 0.5, 0.5],
    ];
    const TET: [Point3; 10] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.5, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.0, 0.5, 0.0],
        [0.0, 0.0, 0.5],
        [0.5, 0.0, 0.5],
        [0.0, 0.5, 0.5],
    ];
    let n = kind.num_nodes();
    match kind {
        ElementKind::Quad4 | ElementKind::Quad8 | ElementKind::Quad9 => QUAD[..n].to_vec(),
        ElementKind::Tri3 | ElementKind::Tri6 => TRI[..n].to_vec(),
        ElementKind::Hex8 | ElementKind::Hex20 | ElementKind::Hex27 => HEX[..n].to_vec(),
        ElementKind::Tet4 | ElementKind::Tet10 => TET[..n].to_vec(),
    }
}

/// Corner shape functions of a quad (4) or triangle (3) at `xi`.
///
/// Quads use `[-1, 1]^2` with corners `(-1,-1), (1,-1), (1,1), (-1,1)`;
/// triangles use `N0 = xi, N1 = eta, N2 = 1 - xi - eta`.
pub fn shape_functions_2d(num_vertices: usize, xi: [f64; 2]) -> Option<Vec<f64>> {
    match num_vertices {
        4 => {
            const CORNERS: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
            Some(
                CORNERS
                    .iter()
                    .map(|c| 0.25 * (1.0 + c[0] * xi[0]) * (1.0 + c[1] * xi[1]))
                    .collect(),
            )
        }
        3 => Some(vec![xi[0], xi[1], 1.0 - xi[0] - xi[1]]),
        _ => None,
    }
}

/// Corner shape functions of a hexahedron (8) or tetrahedron (4) at `xi`.
pub fn shape_functions_3d(num_vertices: usize, xi: [f64; 3]) -> Option<Vec<f64>> {
    match num_vertices {
        8 => {
            const CORNERS: [[f64; 3]; 8] = [
                [-1.0, -1.0, -1.0],
                [1.0, -1.0, -1.0],
                [1.0, 1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [-1.0, -1.0, 1.0],
                [1.0, -1.0, 1.0],
                [1.0, 1.0, 1.0],
                [-1.0, 1.0, 1.0],
            ];
            Some(
                CORNERS
                    .iter()
                    .map(|c| {
                        0.125 * (1.0 + c[0] * xi[0]) * (1.0 + c[1] * xi[1]) * (1.0 + c[2] * xi[2])
                    })
                    .collect(),
            )
        }
        4 => Some(vec![1.0 - xi[0] - xi[1] - xi[2], xi[0], xi[1], xi[2]]),
        _ => None,
    }
}

/// Parametric coordinate of the point at distance `d` (from the edge's
/// first node) along edge `edge` of a quad (4 edges) or triangle (3 edges).
pub fn edge_to_face_coords(num_edges: usize, edge: usize, d: f64) -> Option<[f64; 2]> {
    let x = 2.0 * d - 1.0;
    match (num_edges, edge) {
        (4, 0) => Some([x, -1.0]),
        (4, 1) => Some([1.0, x]),
        (4, 2) => Some([-x, 1.0]),
        (4, 3) => Some([-1.0, -x]),
        (3, 0) => Some([0.5 * (1.0 - x), 0.5 * (1.0 + x)]),
        (3, 1) => Some([0.0, 0.5 * (1.0 - x)]),
        (3, 2) => Some([0.5 * (1.0 + x), 0.0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn shape_functions_partition_unity() {
        for xi in [[0.3, -0.2], [-1.0, 1.0], [0.0, 0.0]] {
            let n = shape_functions_2d(4, xi).unwrap();
            assert!(close(n.iter().sum::<f64>(), 1.0));
        }
        let n = shape_functions_3d(8, [0.1, 0.7, -0.4]).unwrap();
        assert!(close(n.iter().sum::<f64>(), 1.0));
        let n = shape_functions_3d(4, [0.1, 0.2, 0.3]).unwrap();
        assert!(close(n.iter().sum::<f64>(), 1.0));
        assert!(shape_functions_2d(5, [0.0, 0.0]).is_none());
    }

    #[test]
    fn edge_mapping_hits_corner_shape_functions() {
        // Start of each quad edge is that edge's first corner.
        for edge in 0..4 {
            let xi = edge_to_face_coords(4, edge, 0.0).unwrap();
            let n = shape_functions_2d(4, xi).unwrap();
            assert!(close(n[edge], 1.0), "edge {edge}: {n:?}");
        }
        for edge in 0..3 {
            let xi = edge_to_face_coords(3, edge, 1.0).unwrap();
            let n = shape_functions_2d(3, xi).unwrap();
            assert!(close(n[(edge + 1) % 3], 1.0), "edge {edge}: {n:?}");
        }
    }

    #[test]
    fn hex_faces_point_outward() {
        let coords = local_node_coords(ElementKind::Hex8);
        let centre = [0.5, 0.5, 0.5];
        for face in HEX_FACES {
            let p: Vec<Point3> = face.iter().map(|&i| coords[i]).collect();
            let n = cross(sub(p[1], p[0]), sub(p[2], p[0]));
            assert!(dot(n, sub(p[0], centre)) > 0.0, "{face:?}");
        }
        let coords = local_node_coords(ElementKind::Tet4);
        let centre = [0.25, 0.25, 0.25];
        for face in TET_FACES {
            let p: Vec<Point3> = face.iter().map(|&i| coords[i]).collect();
            let n = cross(sub(p[1], p[0]), sub(p[2], p[0]));
            assert!(dot(n, sub(p[0], centre)) > 0.0, "{face:?}");
        }
    }
}
