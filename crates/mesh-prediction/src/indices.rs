//! Strongly typed connectivity indices.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIndex(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CornerIndex(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceIndex(pub u32);

pub const INVALID_VERTEX_INDEX: VertexIndex = VertexIndex(u32::MAX);
pub const INVALID_CORNER_INDEX: CornerIndex = CornerIndex(u32::MAX);
pub const INVALID_FACE_INDEX: FaceIndex = FaceIndex(u32::MAX);

impl VertexIndex {
    pub fn is_valid(self) -> bool {
        self != INVALID_VERTEX_INDEX
    }
}

impl CornerIndex {
    pub fn is_valid(self) -> bool {
        self != INVALID_CORNER_INDEX
    }
}

impl FaceIndex {
    pub fn is_valid(self) -> bool {
        self != INVALID_FACE_INDEX
    }
}

impl From<u32> for VertexIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<u32> for CornerIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<u32> for FaceIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
