//! Shared view of mesh connectivity for the mesh-aware schemes.
//!
//! Attribute entries are addressed by data id. The maps tie data ids to the
//! corner table: every entry has a representative corner, and every vertex
//! maps to its entry (or -1 while the entry is still uncoded or when the
//! vertex carries no value of this attribute).

use crate::corner_table::CornerTable;
use crate::indices::{CornerIndex, VertexIndex};

#[derive(Clone, Copy)]
pub struct MeshData<'a> {
    corner_table: &'a CornerTable,
    data_to_corner: &'a [CornerIndex],
    vertex_to_data: &'a [i32],
}

impl<'a> MeshData<'a> {
    pub fn new(
        corner_table: &'a CornerTable,
        data_to_corner: &'a [CornerIndex],
        vertex_to_data: &'a [i32],
    ) -> Self {
        Self {
            corner_table,
            data_to_corner,
            vertex_to_data,
        }
    }

    pub fn corner_table(&self) -> &'a CornerTable {
        self.corner_table
    }

    pub fn num_entries(&self) -> usize {
        self.data_to_corner.len()
    }

    pub fn corner_for_entry(&self, entry_id: usize) -> CornerIndex {
        self.data_to_corner[entry_id]
    }

    pub fn entry_for_vertex(&self, vertex: VertexIndex) -> Option<usize> {
        if !vertex.is_valid() {
            return None;
        }
        self.vertex_to_data
            .get(vertex.0 as usize)
            .copied()
            .filter(|&d| d >= 0)
            .map(|d| d as usize)
    }

    /// Entry at the vertex of |corner|, if one exists.
    pub fn entry_for_corner(&self, corner: CornerIndex) -> Option<usize> {
        self.entry_for_vertex(self.corner_table.vertex(corner))
    }
}

/// Quantized positions of the parent attribute, addressed by entry id.
///
/// Dependent schemes check `num_positions` against their entry count at
/// construction, so `position` may assume in-range ids.
pub trait PositionSource {
    fn num_positions(&self) -> usize;
    fn position(&self, entry_id: usize) -> [i64; 3];
}

/// Plain vector-backed positions.
#[derive(Debug, Clone)]
pub struct QuantizedPositions {
    positions: Vec<[i32; 3]>,
}

impl QuantizedPositions {
    pub fn new(positions: Vec<[i32; 3]>) -> Self {
        Self { positions }
    }
}

impl PositionSource for QuantizedPositions {
    fn num_positions(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, entry_id: usize) -> [i64; 3] {
        let p = self.positions[entry_id];
        [i64::from(p[0]), i64::from(p[1]), i64::from(p[2])]
    }
}
