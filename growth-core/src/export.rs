//! Read-out of the cell graph for renderers and mesh writers.

use crate::{
    mesh::CellMesh,
    types::{CellId, Triangle},
};

/// Floats per cell in [`vertex_attributes`]: position, normal, growth.
pub const VERTEX_STRIDE: usize = 7;

/// Triangles of the link graph as cell-id triples.
///
/// Every three mutually linked cells form one triangle, reported once
/// from its lowest id. Winding is chosen so the face normal agrees with
/// the sum of the three cell normals, which gives one consistent
/// (outward) side on a closed surface.
pub fn triangle_indexes(mesh: &CellMesh) -> Vec<[CellId; 3]> {
    let positions = mesh.positions();
    let normals = mesh.normals();
    let mut result = Vec::new();

    for i in 0..mesh.len() {
        let links = mesh.links(i);
        for (a, &j) in links.iter().enumerate() {
            if j < i {
                continue;
            }
            for &k in &links[a + 1..] {
                if k < i || !mesh.are_linked(j, k) {
                    continue;
                }
                let face = (positions[j] - positions[i]).cross(positions[k] - positions[i]);
                let facing = normals[i] + normals[j] + normals[k];
                if face.dot(facing) >= 0.0 {
                    result.push([i, j, k]);
                } else {
                    result.push([i, k, j]);
                }
            }
        }
    }
    result
}

/// Triangles of the link graph at the cells' current positions.
pub fn triangulate(mesh: &CellMesh) -> Vec<Triangle> {
    let positions = mesh.positions();
    triangle_indexes(mesh)
        .into_iter()
        .map(|[a, b, c]| Triangle::new(positions[a], positions[b], positions[c]))
        .collect()
}

/// Flat per-cell vertex records in cell order:
/// `[px, py, pz, nx, ny, nz, food / split_threshold]`.
///
/// The last value is growth progress; it may pass 1.0 for a cell that
/// has not been split yet.
pub fn vertex_attributes(mesh: &CellMesh, split_threshold: f32) -> Vec<f32> {
    let mut result = Vec::with_capacity(mesh.len() * VERTEX_STRIDE);
    for ((p, n), &food) in mesh.positions().iter().zip(mesh.normals()).zip(mesh.food()) {
        result.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, food / split_threshold]);
    }
    result
}
