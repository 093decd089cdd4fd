//! Owned, decoded view of a glTF scene graph.
//!
//! The asset loader resolves buffer views, byte strides and sparse
//! substitution up front, so everything here is plain data the extractor can
//! walk without touching the `gltf` buffers again. Nodes refer to meshes by
//! index; only meshes that were decoded are present in `meshes`.

use gltf::Semantic;
use gltf::accessor::{DataType, Dimensions};
use gltf::mesh::Mode;

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub index: usize,
    pub name: Option<String>,
    /// Index of the referenced mesh in the document.
    pub mesh: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub index: usize,
    pub primitives: Vec<Primitive>,
}

#[derive(Clone, Debug)]
pub struct Primitive {
    pub index: usize,
    pub mode: Mode,
    pub attributes: Vec<Attribute>,
    pub indices: Option<Accessor>,
}

#[derive(Clone, Debug)]
pub struct Attribute {
    pub semantic: Semantic,
    pub accessor: Accessor,
}

/// A typed view over buffer data: `count` elements of `dimensions`
/// components each.
#[derive(Clone, Debug)]
pub struct Accessor {
    pub index: usize,
    pub count: usize,
    pub dimensions: Dimensions,
    pub normalized: bool,
    pub components: Components,
}

/// Raw component values in element order, still in their storage type.
#[derive(Clone, Debug, PartialEq)]
pub enum Components {
    F32(Vec<f32>),
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Components {
    pub fn data_type(&self) -> DataType {
        match self {
            Components::F32(_) => DataType::F32,
            Components::I8(_) => DataType::I8,
            Components::U8(_) => DataType::U8,
            Components::I16(_) => DataType::I16,
            Components::U16(_) => DataType::U16,
            Components::U32(_) => DataType::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Components::F32(v) => v.len(),
            Components::I8(v) => v.len(),
            Components::U8(v) => v.len(),
            Components::I16(v) => v.len(),
            Components::U16(v) => v.len(),
            Components::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SceneGraph {
    /// Nodes that reference a mesh, in document order.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.mesh.is_some())
    }

    /// The decoded mesh with document index `index`, if it was decoded.
    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.index == index)
    }
}
