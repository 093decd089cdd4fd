use std::path::Path;

use gltf::accessor::{DataType, Dimensions, Item, Iter};
use gltf::buffer::Data;
use gltf::{Document, Gltf};

use crate::error::{ConvertError, ConvertResult};
use crate::scene::{Accessor, Attribute, Components, Mesh, Node, Primitive, SceneGraph};

/// Loads a `.gltf` or `.glb` file, resolving buffers relative to its directory.
pub fn load_file<P: AsRef<Path>>(path: P) -> ConvertResult<SceneGraph> {
    let path = path.as_ref();
    let Gltf { document, blob } = Gltf::open(path)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;
    log::debug!(
        "loaded {:?}: {} nodes, {} meshes, {} buffers",
        path,
        document.nodes().count(),
        document.meshes().count(),
        buffers.len()
    );
    decode_scene(&document, &buffers)
}

/// Loads an in-memory asset. Buffers must be embedded (GLB chunk or data URI).
pub fn load_slice(bytes: &[u8]) -> ConvertResult<SceneGraph> {
    let Gltf { document, blob } = Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;
    decode_scene(&document, &buffers)
}

/// Accessor data is decoded only for a mesh that can actually be converted.
/// When several nodes reference meshes nothing is decoded, and the extractor
/// reports the graph as having multiple meshes.
fn decode_scene(document: &Document, buffers: &[Data]) -> ConvertResult<SceneGraph> {
    let nodes: Vec<Node> = document
        .nodes()
        .map(|node| Node {
            index: node.index(),
            name: node.name().map(str::to_owned),
            mesh: node.mesh().map(|mesh| mesh.index()),
        })
        .collect();

    let mut referenced = nodes.iter().filter_map(|node| node.mesh);
    let meshes = match (referenced.next(), referenced.next()) {
        (Some(index), None) => document
            .meshes()
            .nth(index)
            .map(|mesh| decode_mesh(&mesh, buffers))
            .transpose()?
            .into_iter()
            .collect(),
        _ => Vec::new(),
    };
    Ok(SceneGraph { nodes, meshes })
}

fn decode_mesh(mesh: &gltf::Mesh<'_>, buffers: &[Data]) -> ConvertResult<Mesh> {
    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        let attributes = primitive
            .attributes()
            .map(|(semantic, accessor)| {
                Ok(Attribute {
                    semantic,
                    accessor: decode_accessor(&accessor, buffers)?,
                })
            })
            .collect::<ConvertResult<Vec<_>>>()?;
        let indices = primitive
            .indices()
            .map(|accessor| decode_accessor(&accessor, buffers))
            .transpose()?;
        primitives.push(Primitive {
            index: primitive.index(),
            mode: primitive.mode(),
            attributes,
            indices,
        });
    }
    Ok(Mesh {
        index: mesh.index(),
        primitives,
    })
}

fn out_of_range(accessor: &gltf::Accessor<'_>, reason: &'static str) -> ConvertError {
    ConvertError::BufferOutOfRange {
        accessor: accessor.index(),
        reason,
    }
}

fn view_fits(view: &gltf::buffer::View<'_>, buffers: &[Data]) -> bool {
    buffers
        .get(view.buffer().index())
        .is_some_and(|data| view.offset() + view.length() <= data.0.len())
}

/// `gltf::accessor::Iter` slices buffers without checking, so every view an
/// accessor touches is bounds-checked first.
fn check_bounds(accessor: &gltf::Accessor<'_>, buffers: &[Data]) -> ConvertResult<()> {
    if let Some(view) = accessor.view() {
        if !view_fits(&view, buffers) {
            return Err(out_of_range(accessor, "buffer view past end of buffer"));
        }
        let stride = view.stride().unwrap_or(accessor.size());
        let needed = match accessor.count() {
            0 => 0,
            count => accessor.offset() + stride * (count - 1) + accessor.size(),
        };
        if needed > view.length() {
            return Err(out_of_range(accessor, "element past end of buffer view"));
        }
    }
    if let Some(sparse) = accessor.sparse() {
        if !view_fits(&sparse.indices().view(), buffers)
            || !view_fits(&sparse.values().view(), buffers)
        {
            return Err(out_of_range(accessor, "sparse data past end of buffer"));
        }
    }
    Ok(())
}

fn items<'a, 's, T: Item>(
    accessor: &gltf::Accessor<'a>,
    buffers: &'s [Data],
) -> ConvertResult<Iter<'s, T>> {
    Iter::new(accessor.clone(), move |buffer: gltf::Buffer<'a>| {
        buffers.get(buffer.index()).map(|data| data.0.as_slice())
    })
    .ok_or_else(|| out_of_range(accessor, "buffer was not loaded"))
}

/// Reads the accessor's components through the `gltf` iterator, which
/// resolves byte strides and sparse substitution. Accessors with neither a
/// view nor sparse data are all zeros.
fn decode_accessor(accessor: &gltf::Accessor<'_>, buffers: &[Data]) -> ConvertResult<Accessor> {
    check_bounds(accessor, buffers)?;
    let zeroed = accessor.view().is_none() && accessor.sparse().is_none();
    let len = accessor.count() * accessor.dimensions().multiplicity();

    macro_rules! gather {
        ($variant:ident, $ty:ty) => {
            Components::$variant(match accessor.dimensions() {
                _ if zeroed => vec![<$ty>::default(); len],
                Dimensions::Scalar => items::<$ty>(accessor, buffers)?.collect(),
                Dimensions::Vec2 => items::<[$ty; 2]>(accessor, buffers)?.flatten().collect(),
                Dimensions::Vec3 => items::<[$ty; 3]>(accessor, buffers)?.flatten().collect(),
                Dimensions::Vec4 => items::<[$ty; 4]>(accessor, buffers)?.flatten().collect(),
                // No output attribute is matrix-shaped; the extractor rejects
                // the shape before looking at the data.
                Dimensions::Mat2 | Dimensions::Mat3 | Dimensions::Mat4 => {
                    log::warn!("accessor {}: matrix data is not decoded", accessor.index());
                    Vec::new()
                }
            })
        };
    }

    let components = match accessor.data_type() {
        DataType::I8 => gather!(I8, i8),
        DataType::U8 => gather!(U8, u8),
        DataType::I16 => gather!(I16, i16),
        DataType::U16 => gather!(U16, u16),
        DataType::U32 => gather!(U32, u32),
        DataType::F32 => gather!(F32, f32),
    };
    if let Some(sparse) = accessor.sparse() {
        log::trace!(
            "accessor {}: applied {} sparse values",
            accessor.index(),
            sparse.count()
        );
    }

    Ok(Accessor {
        index: accessor.index(),
        count: accessor.count(),
        dimensions: accessor.dimensions(),
        normalized: accessor.normalized(),
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf::Semantic;
    use gltf::mesh::Mode;

    // Two f32 VEC3 positions interleaved with padding (stride 16), then a
    // sparse override of element 1.
    const STRIDED_SPARSE: &str = r#"{
        "asset": { "version": "2.0" },
        "buffers": [{
            "byteLength": 48,
            "uri": "data:application/octet-stream;base64,AACAPwAAAEAAAEBAAAAAAAAAgEAAAKBAAADAQAAAAAABAAAAAAAgQQAAMEEAAEBB"
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 32, "byteStride": 16, "target": 34962 },
            { "buffer": 0, "byteOffset": 32, "byteLength": 4 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 12 }
        ],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 2,
            "type": "VEC3",
            "min": [1.0, 2.0, 3.0],
            "max": [10.0, 11.0, 12.0],
            "sparse": {
                "count": 1,
                "indices": { "bufferView": 1, "componentType": 5125 },
                "values": { "bufferView": 2 }
            }
        }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "nodes": [{ "name": "strided", "mesh": 0 }, { "name": "empty" }]
    }"#;

    #[test]
    fn resolves_stride_and_sparse_values() {
        let scene = load_slice(STRIDED_SPARSE.as_bytes()).unwrap();
        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.nodes[0].name.as_deref(), Some("strided"));
        assert!(scene.nodes[1].mesh.is_none());

        assert_eq!(scene.nodes[0].mesh, Some(0));
        let mesh = scene.mesh(0).unwrap();
        let primitive = &mesh.primitives[0];
        assert_eq!(primitive.mode, Mode::Triangles);
        assert!(primitive.indices.is_none());

        let attribute = &primitive.attributes[0];
        assert_eq!(attribute.semantic, Semantic::Positions);
        assert_eq!(
            attribute.accessor.components,
            Components::F32(vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0])
        );
    }

    // The buffer holds one VEC3 float element but the accessor claims two.
    fn short_buffer(nodes: &str) -> String {
        format!(
            r#"{{
                "asset": {{ "version": "2.0" }},
                "buffers": [{{
                    "byteLength": 12,
                    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAA"
                }}],
                "bufferViews": [{{ "buffer": 0, "byteLength": 12 }}],
                "accessors": [{{
                    "bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC3",
                    "min": [0.0, 0.0, 0.0], "max": [0.0, 0.0, 0.0]
                }}],
                "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
                "nodes": {nodes}
            }}"#
        )
    }

    #[test]
    fn accessor_past_its_view_is_rejected() {
        let err = load_slice(short_buffer(r#"[{ "mesh": 0 }]"#).as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::BufferOutOfRange { accessor: 0, .. }
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn several_mesh_nodes_skip_decoding() {
        let scene = load_slice(short_buffer(r#"[{ "mesh": 0 }, { "mesh": 0 }]"#).as_bytes())
            .unwrap();
        assert_eq!(scene.mesh_nodes().count(), 2);
        assert!(scene.meshes.is_empty());

        let err = crate::extract(&scene).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MultipleMeshes {
                first: 0,
                second: 1
            }
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn rejects_malformed_documents() {
        let err = load_slice(b"{ not json").unwrap_err();
        assert!(matches!(err, ConvertError::AssetLoad(_)));
        assert_eq!(err.exit_code(), 3);
    }
}
