//! Geometry helpers for the evolving surface

/// Unique neighbour lists per vertex, derived from the triangle edges
pub fn vertex_neighbors(n_vertices: usize, faces: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n_vertices];
    for &[v0, v1, v2] in faces {
        for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
            if !neighbors[a].contains(&b) {
                neighbors[a].push(b);
            }
            if !neighbors[b].contains(&a) {
                neighbors[b].push(a);
            }
        }
    }
    neighbors
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Area-independent vertex normals: the mean of the unit normals of the
/// incident faces, renormalized
pub fn vertex_normals(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> Vec<[f64; 3]> {
    let mut normals = vec![[0.0f64; 3]; vertices.len()];

    for &[i0, i1, i2] in faces {
        let n = cross(
            sub(vertices[i1], vertices[i0]),
            sub(vertices[i2], vertices[i0]),
        );
        let len = norm(n);
        if len <= 1e-10 {
            continue;
        }
        for idx in [i0, i1, i2] {
            for axis in 0..3 {
                normals[idx][axis] += n[axis] / len;
            }
        }
    }

    for n in normals.iter_mut() {
        let len = norm(*n);
        if len > 1e-10 {
            for c in n.iter_mut() {
                *c /= len;
            }
        }
    }
    normals
}

/// Mean length over all triangle edges (shared edges counted twice)
pub fn mean_edge_length(vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> f64 {
    if faces.is_empty() {
        return 1.0;
    }
    let total: f64 = faces
        .iter()
        .map(|&[a, b, c]| {
            norm(sub(vertices[b], vertices[a]))
                + norm(sub(vertices[c], vertices[b]))
                + norm(sub(vertices[a], vertices[c]))
        })
        .sum();
    total / (faces.len() * 3) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::icosphere::create_icosphere;

    #[test]
    fn test_icosahedron_has_five_neighbors() {
        let (vertices, faces) = create_icosphere(0);
        let neighbors = vertex_neighbors(vertices.len(), &faces);
        assert!(neighbors.iter().all(|n| n.len() == 5));
    }

    #[test]
    fn test_sphere_normals_are_radial() {
        let (vertices, faces) = create_icosphere(2);
        let normals = vertex_normals(&vertices, &faces);
        for (v, n) in vertices.iter().zip(&normals) {
            assert!(dot(*v, *n) > 0.99);
        }
    }

    #[test]
    fn test_mean_edge_length_scales() {
        let (unit, faces) = create_icosphere(1);
        let scaled: Vec<[f64; 3]> = unit
            .iter()
            .map(|v| [v[0] * 10.0, v[1] * 10.0, v[2] * 10.0])
            .collect();
        let ratio = mean_edge_length(&scaled, &faces) / mean_edge_length(&unit, &faces);
        assert!((ratio - 10.0).abs() < 1e-9);
    }
}
