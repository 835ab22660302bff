//! Corner table connectivity for triangle meshes.
//!
//! Corners are numbered face-major: corners 3f, 3f+1, 3f+2 belong to face f.
//! Boundary edges have no opposite corner and report the INVALID sentinel.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::indices::{
    CornerIndex, FaceIndex, VertexIndex, INVALID_CORNER_INDEX, INVALID_VERTEX_INDEX,
};

#[derive(Debug, Clone)]
pub struct CornerTable {
    corner_to_vertex: Vec<VertexIndex>,
    opposite_corners: Vec<CornerIndex>,
    // Left-most corner of every vertex; swinging right from it reaches the
    // whole fan even on boundaries.
    vertex_corners: Vec<CornerIndex>,
}

impl CornerTable {
    /// Builds the table from a triangle list. Faces must reference each
    /// directed edge at most once (edge-manifold connectivity).
    pub fn from_faces(faces: &[[u32; 3]]) -> Result<Self> {
        let num_corners = faces.len() * 3;
        let mut corner_to_vertex = Vec::with_capacity(num_corners);
        let mut num_vertices = 0usize;
        for face in faces {
            for &v in face {
                corner_to_vertex.push(VertexIndex(v));
                num_vertices = num_vertices.max(v as usize + 1);
            }
        }

        let local_next = |c: usize| if (c + 1) % 3 != 0 { c + 1 } else { c - 2 };
        let local_previous = |c: usize| if c % 3 != 0 { c - 1 } else { c + 2 };

        // The edge opposite corner |c| runs from vertex(next(c)) to
        // vertex(previous(c)); two corners pair up across reversed edges.
        let mut opposite_corners = vec![INVALID_CORNER_INDEX; num_corners];
        let mut open_edges: HashMap<(u32, u32), CornerIndex> = HashMap::new();
        for c in 0..num_corners {
            let from = corner_to_vertex[local_next(c)].0;
            let to = corner_to_vertex[local_previous(c)].0;
            if from == to {
                continue;
            }
            if let Some(opposite) = open_edges.remove(&(to, from)) {
                opposite_corners[c] = opposite;
                opposite_corners[opposite.0 as usize] = CornerIndex(c as u32);
            } else if open_edges.insert((from, to), CornerIndex(c as u32)).is_some() {
                return Err(Error::NonManifoldEdge { from, to });
            }
        }

        let mut vertex_corners = vec![INVALID_CORNER_INDEX; num_vertices];
        for c in 0..num_corners {
            let v = corner_to_vertex[c].0 as usize;
            if !vertex_corners[v].is_valid() {
                vertex_corners[v] = CornerIndex(c as u32);
            }
        }

        let mut table = Self {
            corner_to_vertex,
            opposite_corners,
            vertex_corners,
        };
        // Rotate each stored corner to the left-most position of its fan.
        for v in 0..num_vertices {
            let start = table.vertex_corners[v];
            if !start.is_valid() {
                continue;
            }
            let mut left_most = start;
            let mut corner = table.swing_left(start);
            while corner.is_valid() && corner != start {
                left_most = corner;
                corner = table.swing_left(corner);
            }
            if !corner.is_valid() {
                table.vertex_corners[v] = left_most;
            }
        }
        Ok(table)
    }

    pub fn num_corners(&self) -> usize {
        self.corner_to_vertex.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_corners.len()
    }

    pub fn num_faces(&self) -> usize {
        self.corner_to_vertex.len() / 3
    }

    pub fn vertex(&self, corner: CornerIndex) -> VertexIndex {
        if !corner.is_valid() {
            return INVALID_VERTEX_INDEX;
        }
        self.corner_to_vertex[corner.0 as usize]
    }

    pub fn face(&self, corner: CornerIndex) -> FaceIndex {
        if !corner.is_valid() {
            return crate::indices::INVALID_FACE_INDEX;
        }
        FaceIndex(corner.0 / 3)
    }

    pub fn next(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return corner;
        }
        if (corner.0 + 1) % 3 != 0 {
            CornerIndex(corner.0 + 1)
        } else {
            CornerIndex(corner.0 - 2)
        }
    }

    pub fn previous(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return corner;
        }
        if corner.0 % 3 != 0 {
            CornerIndex(corner.0 - 1)
        } else {
            CornerIndex(corner.0 + 2)
        }
    }

    pub fn opposite(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return corner;
        }
        self.opposite_corners[corner.0 as usize]
    }

    /// Counter-clockwise neighbor corner around the shared vertex.
    pub fn swing_left(&self, corner: CornerIndex) -> CornerIndex {
        self.previous(self.opposite(self.previous(corner)))
    }

    /// Clockwise neighbor corner around the shared vertex.
    pub fn swing_right(&self, corner: CornerIndex) -> CornerIndex {
        self.next(self.opposite(self.next(corner)))
    }

    pub fn left_most_corner(&self, vertex: VertexIndex) -> CornerIndex {
        if !vertex.is_valid() {
            return INVALID_CORNER_INDEX;
        }
        self.vertex_corners
            .get(vertex.0 as usize)
            .copied()
            .unwrap_or(INVALID_CORNER_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two triangles sharing the edge (1, 2):
    //   0 --- 1
    //   |   / |
    //   |  /  |
    //   | /   |
    //   2 --- 3
    fn quad() -> CornerTable {
        CornerTable::from_faces(&[[0, 2, 1], [1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_next_previous_cycle() {
        let table = quad();
        for c in 0..table.num_corners() as u32 {
            let corner = CornerIndex(c);
            assert_eq!(table.next(table.next(table.next(corner))), corner);
            assert_eq!(table.previous(table.next(corner)), corner);
        }
    }

    #[test]
    fn test_opposite_across_shared_edge() {
        let table = quad();
        // Corner 0 (vertex 0) faces the shared edge (2, 1); its opposite is
        // corner 5 (vertex 3).
        assert_eq!(table.opposite(CornerIndex(0)), CornerIndex(5));
        assert_eq!(table.opposite(CornerIndex(5)), CornerIndex(0));
        // Boundary edges have no opposite.
        assert!(!table.opposite(CornerIndex(1)).is_valid());
    }

    #[test]
    fn test_fan_walk_covers_shared_vertex() {
        let table = quad();
        // Vertex 2 appears in both faces; swinging right from its left-most
        // corner must visit both corners before leaving the fan.
        let start = table.left_most_corner(VertexIndex(2));
        assert!(start.is_valid());
        let mut visited = vec![start];
        let mut corner = table.swing_right(start);
        while corner.is_valid() && corner != start {
            visited.push(corner);
            corner = table.swing_right(corner);
        }
        assert_eq!(visited.len(), 2);
        for &c in &visited {
            assert_eq!(table.vertex(c), VertexIndex(2));
        }
    }

    #[test]
    fn test_non_manifold_edge_is_rejected() {
        let result = CornerTable::from_faces(&[[0, 1, 2], [0, 1, 3]]);
        assert!(matches!(result, Err(Error::NonManifoldEdge { .. })));
    }

    #[test]
    fn test_closed_fan_left_most_is_stable() {
        // Tetrahedron: every vertex fan is closed.
        let table =
            CornerTable::from_faces(&[[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]]).unwrap();
        for v in 0..table.num_vertices() as u32 {
            let start = table.left_most_corner(VertexIndex(v));
            let mut corner = table.swing_right(start);
            let mut steps = 1;
            while corner != start {
                assert!(corner.is_valid());
                corner = table.swing_right(corner);
                steps += 1;
            }
            assert_eq!(steps, 3);
        }
    }
}
