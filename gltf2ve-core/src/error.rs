use std::io;

use gltf::accessor::{DataType, Dimensions};
use gltf::mesh::Mode;
use thiserror::Error;

/// Every way a conversion can fail. All of them abort the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to load asset: {0}")]
    AssetLoad(#[from] gltf::Error),

    #[error("accessor {accessor} reads outside of buffer data ({reason})")]
    BufferOutOfRange { accessor: usize, reason: &'static str },

    #[error("node {node} references mesh {mesh}, which was not loaded")]
    UndecodedMesh { node: usize, mesh: usize },

    #[error("node {second} references a mesh, but node {first} already does; only one mesh is supported")]
    MultipleMeshes { first: usize, second: usize },

    #[error("primitive {primitive} of mesh {mesh} uses {mode:?} topology, only Triangles is supported")]
    UnsupportedTopology { mesh: usize, primitive: usize, mode: Mode },

    #[error("{semantic} accessor {accessor} has shape {dimensions:?}, expected {expected}")]
    UnsupportedAccessorShape {
        semantic: &'static str,
        accessor: usize,
        dimensions: Dimensions,
        expected: &'static str,
    },

    #[error("accessor {accessor} unpacked {unpacked} floats, expected {expected}")]
    AccessorUnpack {
        accessor: usize,
        expected: usize,
        unpacked: usize,
    },

    #[error(
        "index accessor {accessor} is {data_type:?} {dimensions:?} (normalized: {normalized}), expected unnormalized U8, U16 or U32 Scalar"
    )]
    UnsupportedIndexFormat {
        accessor: usize,
        data_type: DataType,
        dimensions: Dimensions,
        normalized: bool,
    },

    /// `required` and `available` count vertices for every attribute.
    #[error("index buffer requires {attribute} data for {required} vertices, found {available}")]
    MissingAttribute {
        attribute: &'static str,
        required: usize,
        available: usize,
    },

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("failed to write document: {0}")]
    Emit(#[from] io::Error),
}

impl ConvertError {
    /// Process exit code reported for this error. Distinct per error kind;
    /// 2 is left to the command line for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::AssetLoad(_)
            | ConvertError::BufferOutOfRange { .. }
            | ConvertError::UndecodedMesh { .. } => 3,
            ConvertError::MultipleMeshes { .. } => 4,
            ConvertError::UnsupportedTopology { .. } => 5,
            ConvertError::UnsupportedAccessorShape { .. } => 6,
            ConvertError::AccessorUnpack { .. } => 7,
            ConvertError::UnsupportedIndexFormat { .. } => 8,
            ConvertError::MissingAttribute { .. } => 9,
            ConvertError::IndexOutOfRange { .. } => 10,
            ConvertError::Emit(_) => 11,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let errors = [
            ConvertError::BufferOutOfRange { accessor: 0, reason: "view" },
            ConvertError::MultipleMeshes { first: 0, second: 1 },
            ConvertError::UnsupportedTopology {
                mesh: 0,
                primitive: 0,
                mode: Mode::Lines,
            },
            ConvertError::UnsupportedAccessorShape {
                semantic: "POSITION",
                accessor: 0,
                dimensions: Dimensions::Vec2,
                expected: "Vec3",
            },
            ConvertError::AccessorUnpack {
                accessor: 0,
                expected: 9,
                unpacked: 8,
            },
            ConvertError::UnsupportedIndexFormat {
                accessor: 0,
                data_type: DataType::F32,
                dimensions: Dimensions::Scalar,
                normalized: false,
            },
            ConvertError::MissingAttribute {
                attribute: "COLOR_0",
                required: 3,
                available: 0,
            },
            ConvertError::IndexOutOfRange {
                position: 0,
                index: 7,
                vertex_count: 3,
            },
            ConvertError::Emit(io::Error::other("closed")),
        ];

        let mut codes: Vec<u8> = errors.iter().map(ConvertError::exit_code).collect();
        assert!(codes.iter().all(|&code| code > 2));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = ConvertError::AccessorUnpack {
            accessor: 4,
            expected: 9,
            unpacked: 8,
        };
        assert_eq!(err.to_string(), "accessor 4 unpacked 8 floats, expected 9");
    }
}
