//! Definition of various test shapes.

use crate::geometry::{Point3, TriangleMesh};
use std::collections::{hash_map::Entry::Vacant, HashMap};

/// Create a regular sphere
///
/// A regular sphere is created by starting with a regular octahedron. The
/// shape is then refined `refinement_level` times. Each time the grid is
/// refined, each triangle is split into four triangles (by adding lines
/// connecting the midpoints of each edge). The new points are then scaled
/// so that they are a distance of 1 from the origin.
pub fn regular_sphere(refinement_level: u32) -> TriangleMesh {
    let mut points: Vec<Point3> = vec![
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, -1.0],
    ];

    let mut cells = vec![
        [0, 1, 2],
        [0, 2, 3],
        [0, 3, 4],
        [0, 4, 1],
        [5, 2, 1],
        [5, 3, 2],
        [5, 4, 3],
        [5, 1, 4],
    ];

    for level in 0..refinement_level {
        let mut edge_points = HashMap::new();
        let mut new_cells = Vec::with_capacity(8 * usize::pow(4, level + 1));
        for c in &cells {
            let edges = [[1, 2], [0, 2], [0, 1]]
                .iter()
                .map(|[i, j]| {
                    let mut pt_i = c[*i];
                    let mut pt_j = c[*j];
                    if pt_i > pt_j {
                        std::mem::swap(&mut pt_i, &mut pt_j);
                    }
                    if let Vacant(e) = edge_points.entry((pt_i, pt_j)) {
                        let v_i = points[pt_i];
                        let v_j = points[pt_j];
                        let mut new_pt = [
                            0.5 * (v_i[0] + v_j[0]),
                            0.5 * (v_i[1] + v_j[1]),
                            0.5 * (v_i[2] + v_j[2]),
                        ];
                        let size = new_pt.iter().map(|x| x * x).sum::<f64>().sqrt();
                        for x in new_pt.iter_mut() {
                            *x /= size;
                        }
                        e.insert(points.len());
                        points.push(new_pt);
                    }
                    edge_points[&(pt_i, pt_j)]
                })
                .collect::<Vec<_>>();
            new_cells.push([c[0], edges[2], edges[1]]);
            new_cells.push([c[1], edges[0], edges[2]]);
            new_cells.push([c[2], edges[1], edges[0]]);
            new_cells.push([edges[0], edges[1], edges[2]]);
        }
        cells = new_cells;
    }

    let vertices = points.iter().flatten().copied().collect::<Vec<_>>();
    let connectivity = cells.iter().flatten().copied().collect::<Vec<_>>();
    TriangleMesh::from_vertices(&vertices, &connectivity)
}
