#![allow(dead_code)]

use mesh_prediction::{CornerIndex, CornerTable, MeshData, VertexIndex};

/// Owns connectivity plus identity data maps (entry id == vertex id).
pub struct MeshFixture {
    pub corner_table: CornerTable,
    pub data_to_corner: Vec<CornerIndex>,
    pub vertex_to_data: Vec<i32>,
}

impl MeshFixture {
    pub fn new(faces: &[[u32; 3]]) -> Self {
        let corner_table = CornerTable::from_faces(faces).unwrap();
        let data_to_corner: Vec<CornerIndex> = (0..corner_table.num_vertices())
            .map(|v| corner_table.left_most_corner(VertexIndex(v as u32)))
            .collect();
        let vertex_to_data: Vec<i32> = (0..corner_table.num_vertices() as i32).collect();
        Self {
            corner_table,
            data_to_corner,
            vertex_to_data,
        }
    }

    pub fn mesh_data(&self) -> MeshData<'_> {
        MeshData::new(
            &self.corner_table,
            &self.data_to_corner,
            &self.vertex_to_data,
        )
    }

    pub fn num_entries(&self) -> usize {
        self.data_to_corner.len()
    }
}

/// Two triangles sharing one edge.
pub fn quad_faces() -> Vec<[u32; 3]> {
    vec![[0, 2, 1], [1, 2, 3]]
}

/// Triangle strip over |num_faces| + 2 vertices.
pub fn strip_faces(num_faces: usize) -> Vec<[u32; 3]> {
    (0..num_faces)
        .map(|f| {
            let f = f as u32;
            if f % 2 == 0 {
                [f, f + 1, f + 2]
            } else {
                [f + 1, f, f + 2]
            }
        })
        .collect()
}

/// Closed octahedron: equator 0..=3, top 4, bottom 5. Vertex 5 is coded
/// last and sees four fully coded parallelograms.
pub fn octahedron_faces() -> Vec<[u32; 3]> {
    vec![
        [0, 1, 4],
        [1, 2, 4],
        [2, 3, 4],
        [3, 0, 4],
        [1, 0, 5],
        [2, 1, 5],
        [3, 2, 5],
        [0, 3, 5],
    ]
}

pub fn octahedron_positions() -> Vec<[i32; 3]> {
    vec![
        [4, 0, 0],
        [0, 4, 0],
        [-4, 0, 0],
        [0, -4, 0],
        [0, 0, 4],
        [0, 0, -4],
    ]
}

/// Deterministic pseudo-random values, small enough for exact i64 math.
pub fn pseudo_random_values(len: usize, seed: u64) -> Vec<i32> {
    let mut state = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 2001) as i32 - 1000
        })
        .collect()
}
