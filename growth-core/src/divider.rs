//! Cell division.
//!
//! A split appends one child cell and shares the parent's neighbor ring
//! between parent and child along a cleavage plane:
//!
//! ```text
//!          r[i0]                      r[i0]
//!        /   |   \                  /   |   \
//!   ... - parent - ...   =>   ... - parent - child - ...
//!        \   |   /                  \   |   /
//!          r[i1]                      r[i1]
//! ```
//!
//! The arc `r[i0]..=r[i1]` stays with the parent, the arc `r[i1]..=r[i0]`
//! (going on around the ring) moves to the child, and the two boundary
//! cells `r[i0]` and `r[i1]` end up linked to both.

use crate::{
    error::{GrowthError, Result},
    mesh::CellMesh,
    sampler::UniformSampler,
    spatial_index::SpatialIndex,
    types::CellId,
};
use glam::Vec3;

/// Smallest ring that can be cut into two arcs.
pub const MIN_SPLIT_RING: usize = 3;

/// Divides `parent` into itself and a new child, returning the child id.
///
/// The cleavage plane starts at a ring offset drawn from `sampler` and
/// cuts the ring in half; an odd ring leaves the child one link more.
/// Afterwards both cells sit at the mean of themselves and their new
/// neighbors, the index holds both, their normals are re-estimated, and
/// both have no food.
pub fn split(
    mesh: &mut CellMesh,
    index: &mut SpatialIndex,
    parent: CellId,
    sampler: &mut impl UniformSampler,
) -> Result<CellId> {
    if parent >= mesh.len() {
        return Err(GrowthError::UnknownCell { cell: parent });
    }
    let ring = mesh.ordered_links(parent);
    let n = ring.len();
    if n < MIN_SPLIT_RING {
        return Err(GrowthError::DegenerateRing { cell: parent, len: n });
    }

    let origin = mesh.position(parent);
    let normal = mesh.normal(parent);
    let child = mesh.push_cell(origin, normal);

    // choose "plane of cleavage"
    let i0 = sampler.below(n);
    let i1 = i0 + n / 2;

    for k in (i1 + 1)..(i0 + n) {
        mesh.change_link(ring[k % n], parent, child)?;
    }
    mesh.link(child, ring[i0])?;
    mesh.link(child, ring[i1 % n])?;
    mesh.link(parent, child)?;

    // Both means read the pre-split positions; the child still sits at `origin`.
    let parent_position = mean_with_links(mesh, parent);
    let child_position = mean_with_links(mesh, child);

    index.update(origin, parent_position, parent)?;
    index.add(child_position, child)?;
    mesh.positions[parent] = parent_position;
    mesh.positions[child] = child_position;

    mesh.normals[parent] = mesh.cell_normal(parent, normal);
    mesh.normals[child] = mesh.cell_normal(child, normal);

    mesh.food[parent] = 0.0;

    tracing::trace!(parent, child, ring = n, i0, "split cell");
    Ok(child)
}

/// Mean of `id`'s position and the positions of all its links.
fn mean_with_links(mesh: &CellMesh, id: CellId) -> Vec3 {
    let links = mesh.links(id);
    let sum = links
        .iter()
        .fold(mesh.position(id), |acc, &j| acc + mesh.position(j));
    sum / (links.len() + 1) as f32
}
