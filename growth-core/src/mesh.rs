//! The cell graph: per-cell state plus the symmetric link relation.
//!
//! Cells live in parallel arrays indexed by [`CellId`]. Links are kept
//! unordered; code that needs a cyclic neighbor order (normal estimation,
//! choosing a cleavage plane) rebuilds it on demand with
//! [`CellMesh::ordered_links`].

use crate::error::{GrowthError, Result};
use crate::types::{CellId, Triangle};
use glam::Vec3;
use std::collections::HashMap;

/// Steps a single [`CellMesh::ordered_links`] search may take.
pub const RING_SEARCH_BUDGET: usize = 4096;

/// Depth-first search for a cycle through every link of one cell. Holds
/// positions into `links`, not cell ids.
struct RingSearch<'a> {
    mesh: &'a CellMesh,
    links: &'a [CellId],
    used: Vec<bool>,
    path: Vec<usize>,
    longest: Vec<usize>,
    budget: usize,
}

impl RingSearch<'_> {
    fn search_from(&mut self, start: usize) -> bool {
        self.used.fill(false);
        self.used[start] = true;
        self.path.clear();
        self.path.push(start);
        self.walk()
    }

    fn walk(&mut self) -> bool {
        let Some(&tail) = self.path.last() else {
            return false;
        };
        if self.path.len() > self.longest.len() {
            self.longest.clone_from(&self.path);
        }
        let tail = self.links[tail];
        if self.path.len() == self.links.len() {
            return self.mesh.are_linked(tail, self.links[self.path[0]]);
        }

        for k in 0..self.links.len() {
            if self.used[k] || !self.mesh.are_linked(tail, self.links[k]) {
                continue;
            }
            if self.budget == 0 {
                return false;
            }
            self.budget -= 1;
            self.used[k] = true;
            self.path.push(k);
            if self.walk() {
                return true;
            }
            self.path.pop();
            self.used[k] = false;
        }
        false
    }
}

#[derive(Clone, Debug, Default)]
pub struct CellMesh {
    pub(crate) positions: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) food: Vec<f32>,
    pub(crate) links: Vec<Vec<CellId>>,
}

/// Hash key for exact vertex matching; `-0.0` and `0.0` share a key.
fn vertex_key(p: Vec3) -> [u32; 3] {
    let p = p + Vec3::ZERO;
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

impl CellMesh {
    /// Builds one cell per distinct triangle vertex and links every pair
    /// of cells that share a triangle edge.
    ///
    /// Initial normals follow the triangles' winding: each cell is seeded
    /// with the area-weighted sum of its incident face normals, then
    /// refined by [`CellMesh::cell_normal`].
    pub fn from_triangles(triangles: &[Triangle]) -> Result<Self> {
        if triangles.is_empty() {
            return Err(GrowthError::EmptyMesh);
        }

        let mut mesh = Self::default();
        let mut ids: HashMap<[u32; 3], CellId> = HashMap::new();
        let mut seeds: Vec<Vec3> = Vec::new();

        for (t, tri) in triangles.iter().enumerate() {
            let mut corners = [0; 3];
            for (k, p) in tri.vertices().into_iter().enumerate() {
                if !p.is_finite() {
                    return Err(GrowthError::NonFinitePosition { cell: mesh.len() });
                }
                corners[k] = *ids
                    .entry(vertex_key(p))
                    .or_insert_with(|| mesh.push_cell(p, Vec3::ZERO));
            }

            let [a, b, c] = corners;
            if a == b || b == c || c == a {
                return Err(GrowthError::DegenerateTriangle { triangle: t });
            }

            seeds.resize(mesh.len(), Vec3::ZERO);
            let face = tri.area_normal();
            for id in corners {
                seeds[id] += face;
            }

            for (x, y) in [(a, b), (b, c), (c, a)] {
                if !mesh.are_linked(x, y) {
                    mesh.link(x, y)?;
                }
            }
        }

        for (i, seed) in seeds.iter().enumerate() {
            mesh.normals[i] = mesh.cell_normal(i, *seed);
        }

        tracing::info!(
            cells = mesh.len(),
            triangles = triangles.len(),
            "built cell mesh"
        );
        Ok(mesh)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn food(&self) -> &[f32] {
        &self.food
    }

    pub fn position(&self, id: CellId) -> Vec3 {
        self.positions[id]
    }

    pub fn normal(&self, id: CellId) -> Vec3 {
        self.normals[id]
    }

    /// Links of `id` in storage order, which carries no meaning.
    pub fn links(&self, id: CellId) -> &[CellId] {
        &self.links[id]
    }

    pub fn are_linked(&self, a: CellId, b: CellId) -> bool {
        self.links[a].contains(&b)
    }

    /// Appends an unlinked cell with no food and returns its id.
    pub(crate) fn push_cell(&mut self, position: Vec3, normal: Vec3) -> CellId {
        let id = self.positions.len();
        self.positions.push(position);
        self.normals.push(normal);
        self.food.push(0.0);
        self.links.push(Vec::new());
        id
    }

    fn check_cell(&self, id: CellId) -> Result<()> {
        if id < self.len() {
            Ok(())
        } else {
            Err(GrowthError::UnknownCell { cell: id })
        }
    }

    /// Links `a` and `b` in both directions.
    pub fn link(&mut self, a: CellId, b: CellId) -> Result<()> {
        self.check_cell(a)?;
        self.check_cell(b)?;
        if a == b {
            return Err(GrowthError::SelfLink { cell: a });
        }
        if self.are_linked(a, b) {
            return Err(GrowthError::DuplicateLink { cell: a, link: b });
        }
        if self.are_linked(b, a) {
            return Err(GrowthError::DuplicateLink { cell: b, link: a });
        }
        self.links[a].push(b);
        self.links[b].push(a);
        Ok(())
    }

    /// Removes the link between `a` and `b` in both directions.
    pub fn unlink(&mut self, a: CellId, b: CellId) -> Result<()> {
        self.check_cell(a)?;
        self.check_cell(b)?;
        let ab = self.links[a]
            .iter()
            .position(|&l| l == b)
            .ok_or(GrowthError::LinkNotFound { cell: a, link: b })?;
        let ba = self.links[b]
            .iter()
            .position(|&l| l == a)
            .ok_or(GrowthError::LinkNotFound { cell: b, link: a })?;
        self.links[a].remove(ab);
        self.links[b].remove(ba);
        Ok(())
    }

    /// Moves `cell`'s link from `from` over to `to`, keeping its slot in
    /// `cell`'s link list.
    pub fn change_link(&mut self, cell: CellId, from: CellId, to: CellId) -> Result<()> {
        self.check_cell(cell)?;
        self.check_cell(from)?;
        self.check_cell(to)?;
        if to == cell {
            return Err(GrowthError::SelfLink { cell });
        }
        if self.are_linked(cell, to) {
            return Err(GrowthError::DuplicateLink { cell, link: to });
        }
        let slot = self.links[cell]
            .iter()
            .position(|&l| l == from)
            .ok_or(GrowthError::LinkNotFound { cell, link: from })?;
        let back = self.links[from]
            .iter()
            .position(|&l| l == cell)
            .ok_or(GrowthError::AsymmetricLink { cell, link: from })?;

        self.links[cell][slot] = to;
        self.links[from].remove(back);
        self.links[to].push(cell);
        Ok(())
    }

    /// Links of `id` arranged as a cycle in which consecutive entries are
    /// linked to each other.
    ///
    /// Searches the subgraph spanned by the links for a cycle through all
    /// of them, backtracking whenever a branch dead-ends, so chords across
    /// the ring are never mistaken for ring edges. On a closed triangulated
    /// surface that cycle is unique. Without one (open fans, or a search
    /// that runs past [`RING_SEARCH_BUDGET`] steps) the longest chain found
    /// is returned with the remaining links appended in storage order. The
    /// direction of the cycle is not fixed.
    pub fn ordered_links(&self, id: CellId) -> Vec<CellId> {
        let links = &self.links[id];
        if links.len() < 3 {
            return links.clone();
        }

        let mut search = RingSearch {
            mesh: self,
            links,
            used: vec![false; links.len()],
            path: Vec::with_capacity(links.len()),
            longest: Vec::new(),
            budget: RING_SEARCH_BUDGET,
        };
        for start in 0..links.len() {
            if search.search_from(start) {
                return search.path.iter().map(|&k| links[k]).collect();
            }
            if search.longest.len() == links.len() {
                break;
            }
        }

        let mut order = search.longest;
        for k in 0..links.len() {
            if !order.contains(&k) {
                order.push(k);
            }
        }
        order.into_iter().map(|k| links[k]).collect()
    }

    /// Unit normal at `id` from the fan of triangles spanned by its
    /// ordered ring.
    ///
    /// The fan sum is flipped to agree with `seed`. When the fan is
    /// degenerate the normalized `seed` is returned, or +Z if `seed` is
    /// zero.
    pub fn cell_normal(&self, id: CellId, seed: Vec3) -> Vec3 {
        let ring = self.ordered_links(id);
        let p0 = self.positions[id];

        let mut sum = Vec3::ZERO;
        if let Some(&last) = ring.last() {
            let mut p1 = self.positions[last];
            for &j in &ring {
                let p2 = self.positions[j];
                sum += (p1 - p0).cross(p2 - p0).normalize_or_zero();
                p1 = p2;
            }
        }

        if sum.dot(seed) < 0.0 {
            sum = -sum;
        }
        sum.try_normalize()
            .or_else(|| seed.try_normalize())
            .unwrap_or(Vec3::Z)
    }

    /// Verifies the structural invariants of the graph: finite positions,
    /// non-negative food, no self links, no duplicate links, and symmetric
    /// adjacency.
    pub fn check_invariants(&self) -> Result<()> {
        for (i, links) in self.links.iter().enumerate() {
            if !self.positions[i].is_finite() {
                return Err(GrowthError::NonFinitePosition { cell: i });
            }
            if self.food[i] < 0.0 {
                return Err(GrowthError::NegativeFood { cell: i });
            }
            for (k, &j) in links.iter().enumerate() {
                self.check_cell(j)?;
                if j == i {
                    return Err(GrowthError::SelfLink { cell: i });
                }
                if links[..k].contains(&j) {
                    return Err(GrowthError::DuplicateLink { cell: i, link: j });
                }
                if !self.are_linked(j, i) {
                    return Err(GrowthError::AsymmetricLink { cell: i, link: j });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{icosahedron, tetrahedron};

    fn is_cycle(mesh: &CellMesh, ring: &[CellId]) -> bool {
        (0..ring.len()).all(|k| mesh.are_linked(ring[k], ring[(k + 1) % ring.len()]))
    }

    #[test]
    fn icosahedron_has_twelve_cells_of_degree_five() {
        let mesh = CellMesh::from_triangles(&icosahedron(1.0)).unwrap();
        assert_eq!(mesh.len(), 12);
        for i in 0..mesh.len() {
            assert_eq!(mesh.links(i).len(), 5);
        }
        let edges: usize = (0..mesh.len()).map(|i| mesh.links(i).len()).sum::<usize>() / 2;
        assert_eq!(edges, 30);
        mesh.check_invariants().unwrap();
    }

    #[test]
    fn initial_normals_point_outward_and_are_unit() {
        let mesh = CellMesh::from_triangles(&icosahedron(2.0)).unwrap();
        for i in 0..mesh.len() {
            let n = mesh.normal(i);
            assert!((n.length() - 1.0).abs() < 1e-5);
            let radial = mesh.position(i).normalize();
            assert!(n.dot(radial) > 0.99, "normal {n:?} at {i} not radial");
        }
    }

    #[test]
    fn shared_vertices_merge_including_signed_zero() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let a_neg = Vec3::new(-0.0, 0.0, -0.0);
        let b = Vec3::X;
        let c = Vec3::Y;
        let d = Vec3::Z;
        let mesh = CellMesh::from_triangles(&[
            Triangle::new(a, b, c),
            Triangle::new(a_neg, c, d),
        ])
        .unwrap();
        assert_eq!(mesh.len(), 4);
    }

    #[test]
    fn empty_and_degenerate_inputs_fail() {
        assert!(matches!(
            CellMesh::from_triangles(&[]),
            Err(GrowthError::EmptyMesh)
        ));

        let p = Vec3::ONE;
        let err = CellMesh::from_triangles(&[Triangle::new(p, p, Vec3::ZERO)]).unwrap_err();
        assert!(matches!(err, GrowthError::DegenerateTriangle { triangle: 0 }));

        let nan = Vec3::new(f32::NAN, 0.0, 0.0);
        let err = CellMesh::from_triangles(&[Triangle::new(nan, Vec3::X, Vec3::Y)]).unwrap_err();
        assert!(matches!(err, GrowthError::NonFinitePosition { .. }));
    }

    #[test]
    fn link_and_unlink_are_symmetric() {
        let mut mesh = CellMesh::default();
        let a = mesh.push_cell(Vec3::ZERO, Vec3::Z);
        let b = mesh.push_cell(Vec3::X, Vec3::Z);

        mesh.link(a, b).unwrap();
        assert!(mesh.are_linked(a, b) && mesh.are_linked(b, a));
        assert!(matches!(
            mesh.link(b, a),
            Err(GrowthError::DuplicateLink { .. })
        ));
        assert!(matches!(mesh.link(a, a), Err(GrowthError::SelfLink { cell: 0 })));

        mesh.unlink(b, a).unwrap();
        assert!(mesh.links(a).is_empty() && mesh.links(b).is_empty());
        assert!(matches!(
            mesh.unlink(a, b),
            Err(GrowthError::LinkNotFound { cell: 0, link: 1 })
        ));
        assert!(matches!(
            mesh.link(a, 9),
            Err(GrowthError::UnknownCell { cell: 9 })
        ));
    }

    #[test]
    fn change_link_rewires_both_sides() {
        let mut mesh = CellMesh::default();
        let a = mesh.push_cell(Vec3::ZERO, Vec3::Z);
        let b = mesh.push_cell(Vec3::X, Vec3::Z);
        let c = mesh.push_cell(Vec3::Y, Vec3::Z);
        let d = mesh.push_cell(Vec3::Z, Vec3::Z);
        mesh.link(a, d).unwrap();
        mesh.link(a, b).unwrap();

        mesh.change_link(a, b, c).unwrap();
        assert_eq!(mesh.links(a), &[d, c]);
        assert!(mesh.links(b).is_empty());
        assert_eq!(mesh.links(c), &[a]);
        mesh.check_invariants().unwrap();

        assert!(matches!(
            mesh.change_link(a, b, c),
            Err(GrowthError::DuplicateLink { cell: 0, link: 2 })
        ));
        assert!(matches!(
            mesh.change_link(a, b, 1),
            Err(GrowthError::LinkNotFound { cell: 0, link: 1 })
        ));
        assert!(matches!(
            mesh.change_link(a, c, a),
            Err(GrowthError::SelfLink { cell: 0 })
        ));
    }

    #[test]
    fn check_invariants_detects_asymmetry() {
        let mut mesh = CellMesh::default();
        let a = mesh.push_cell(Vec3::ZERO, Vec3::Z);
        let b = mesh.push_cell(Vec3::X, Vec3::Z);
        mesh.links[a].push(b);
        assert!(matches!(
            mesh.check_invariants(),
            Err(GrowthError::AsymmetricLink { cell: 0, link: 1 })
        ));
    }

    #[test]
    fn ordered_links_form_a_cycle_regardless_of_storage_order() {
        let mut mesh = CellMesh::from_triangles(&icosahedron(1.0)).unwrap();
        mesh.links[0].reverse();
        mesh.links[0].swap(1, 3);
        for i in 0..mesh.len() {
            let ring = mesh.ordered_links(i);
            assert_eq!(ring.len(), 5);
            assert!(is_cycle(&mesh, &ring), "ring of {i} is not a cycle: {ring:?}");
            let mut sorted = ring.clone();
            sorted.sort_unstable();
            let mut links = mesh.links(i).to_vec();
            links.sort_unstable();
            assert_eq!(sorted, links);
        }
    }

    #[test]
    fn ordered_links_keeps_every_link_on_open_fans() {
        // Apex of an open fan of three triangles: ring is a path, not a cycle.
        let apex = Vec3::ZERO;
        let rim = [Vec3::X, Vec3::Y, -Vec3::X, -Vec3::Y];
        let tris: Vec<Triangle> = (0..3)
            .map(|k| Triangle::new(apex, rim[k], rim[k + 1]))
            .collect();
        let mesh = CellMesh::from_triangles(&tris).unwrap();
        let ring = mesh.ordered_links(0);
        assert_eq!(ring.len(), 4);
        for k in 0..3 {
            assert!(mesh.are_linked(ring[k], ring[k + 1]));
        }
    }

    #[test]
    fn ordered_links_backtracks_past_chords() {
        // Ring 3-1-0-2 around cell 4, with the chord 1-2 across it.
        let mut mesh = CellMesh::default();
        for _ in 0..5 {
            mesh.push_cell(Vec3::ZERO, Vec3::Z);
        }
        for j in [3, 1, 2, 0] {
            mesh.link(4, j).unwrap();
        }
        for (a, b) in [(3, 1), (3, 2), (1, 2), (1, 0), (2, 0)] {
            mesh.link(a, b).unwrap();
        }

        let ring = mesh.ordered_links(4);
        assert_eq!(ring.len(), 4);
        assert!(is_cycle(&mesh, &ring), "ring {ring:?} is not closed");
    }

    #[test]
    fn tetrahedron_rings_are_closed() {
        let mesh = CellMesh::from_triangles(&tetrahedron(1.0)).unwrap();
        assert_eq!(mesh.len(), 4);
        for i in 0..mesh.len() {
            let ring = mesh.ordered_links(i);
            assert_eq!(ring.len(), 3);
            assert!(is_cycle(&mesh, &ring));
        }
    }

    #[test]
    fn cell_normal_respects_seed_and_falls_back() {
        let mesh = CellMesh::from_triangles(&tetrahedron(1.0)).unwrap();
        for i in 0..mesh.len() {
            let outward = mesh.position(i).normalize();
            let n = mesh.cell_normal(i, outward);
            assert!(n.dot(outward) > 0.99);
            let flipped = mesh.cell_normal(i, -outward);
            assert!(flipped.dot(outward) < -0.99);
        }

        let mut lonely = CellMesh::default();
        lonely.push_cell(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(lonely.cell_normal(0, Vec3::new(0.0, 3.0, 0.0)), Vec3::Y);
        assert_eq!(lonely.cell_normal(0, Vec3::ZERO), Vec3::Z);
    }
}
