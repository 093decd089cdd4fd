use serde::Serialize;

/// Vertex data stored once per unique vertex plus a triangle index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedGeometry {
    /// xyz triples.
    pub vertex_positions: Vec<f32>,
    /// rgba quadruples.
    pub vertex_colors: Vec<f32>,
    /// Vertex numbers, three per triangle.
    pub indices: Vec<u32>,
}

impl IndexedGeometry {
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertex_positions: Vec::with_capacity(vertices * 3),
            vertex_colors: Vec::with_capacity(vertices * 4),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Number of vertices described by the position stream.
    pub fn vertex_count(&self) -> usize {
        self.vertex_positions.len() / 3
    }

    pub fn color_count(&self) -> usize {
        self.vertex_colors.len() / 4
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Draw-arrays geometry: one entry per triangle corner, no index buffer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatGeometry {
    pub vertex_positions: Vec<f32>,
    pub vertex_colors: Vec<f32>,
}

impl FlatGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertex_positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_positions.is_empty() && self.vertex_colors.is_empty()
    }
}
