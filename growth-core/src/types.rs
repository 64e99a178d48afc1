use glam::Vec3;

/// Identifier for a cell in a [`crate::mesh::CellMesh`].
///
/// This is a dense index into the mesh's parallel per-cell arrays. Ids
/// only grow: a cell keeps its id for the lifetime of the mesh and ids
/// are never reused.
pub type CellId = usize;

/// One input triangle, wound counter-clockwise when seen from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// Unnormalized face normal; its length is twice the triangle area.
    pub fn area_normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a)
    }

    /// Sum of the three edge lengths.
    pub fn perimeter(&self) -> f32 {
        self.a.distance(self.b) + self.b.distance(self.c) + self.c.distance(self.a)
    }
}

/// Mean edge length over all triangles, counting shared edges once per
/// triangle. Returns `0.0` for an empty slice.
pub fn average_edge_length(triangles: &[Triangle]) -> f32 {
    if triangles.is_empty() {
        return 0.0;
    }
    let sum: f32 = triangles.iter().map(Triangle::perimeter).sum();
    sum / (triangles.len() * 3) as f32
}

/// Regular icosahedron centred on the origin with all vertices at `radius`.
///
/// Faces are wound counter-clockwise seen from outside, so the face
/// normals point away from the centre.
pub fn icosahedron(radius: f32) -> Vec<Triangle> {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let v = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(|p| p.normalize() * radius);

    const FACES: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    FACES
        .iter()
        .map(|&[a, b, c]| Triangle::new(v[a], v[b], v[c]))
        .collect()
}

/// Regular tetrahedron centred on the origin with all vertices at
/// `radius`, faces wound counter-clockwise seen from outside.
pub fn tetrahedron(radius: f32) -> Vec<Triangle> {
    let [a, b, c, d] = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ]
    .map(|p| p.normalize() * radius);
    vec![
        Triangle::new(a, b, c),
        Triangle::new(a, d, b),
        Triangle::new(a, c, d),
        Triangle::new(b, d, c),
    ]
}
