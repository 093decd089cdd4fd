//! Scene graph → [`IndexedGeometry`].
//!
//! The walk makes two global assumptions and checks both before touching any
//! accessor data:
//!
//! 1. at most one node in the whole graph references a mesh;
//! 2. every primitive of that mesh is a triangle list.
//!
//! Primitives are then appended in order. Each primitive's indices are
//! re-based by the number of vertices earlier primitives contributed, so a
//! multi-primitive mesh keeps referring to its own vertices.

use gltf::Semantic;
use gltf::accessor::Dimensions;
use gltf::mesh::Mode;

use crate::error::{ConvertError, ConvertResult};
use crate::geometry::IndexedGeometry;
use crate::scene::{Accessor, Components, Mesh, Primitive, SceneGraph};

/// What an attribute contributes to the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttributeKind {
    Position,
    Color,
    Ignored,
}

impl AttributeKind {
    fn of(semantic: &Semantic) -> Self {
        match semantic {
            Semantic::Positions => AttributeKind::Position,
            Semantic::Colors(0) => AttributeKind::Color,
            _ => AttributeKind::Ignored,
        }
    }

    fn accepts(self, dimensions: Dimensions) -> bool {
        matches!(
            (self, dimensions),
            (AttributeKind::Position, Dimensions::Vec3)
                | (AttributeKind::Color, Dimensions::Vec3 | Dimensions::Vec4)
        )
    }

    fn name(self) -> &'static str {
        match self {
            AttributeKind::Position => "POSITION",
            AttributeKind::Color => "COLOR_0",
            AttributeKind::Ignored => "ignored",
        }
    }

    fn expected_shape(self) -> &'static str {
        match self {
            AttributeKind::Position => "Vec3",
            AttributeKind::Color => "Vec3 or Vec4",
            AttributeKind::Ignored => "anything",
        }
    }
}

/// Extracts the single mesh of `scene`. A scene without any mesh yields
/// empty geometry.
pub fn extract(scene: &SceneGraph) -> ConvertResult<IndexedGeometry> {
    let Some(mesh) = single_mesh(scene)? else {
        log::warn!("scene has no mesh-bearing node, output will be empty");
        return Ok(IndexedGeometry::default());
    };
    check_topology(mesh)?;

    let (vertices, indices) = mesh.primitives.iter().fold((0, 0), |(v, i), primitive| {
        let vertices = primitive
            .attributes
            .iter()
            .find(|attribute| AttributeKind::of(&attribute.semantic) == AttributeKind::Position)
            .map_or(0, |attribute| attribute.accessor.count);
        let indices = primitive.indices.as_ref().map_or(0, |accessor| accessor.count);
        (v + vertices, i + indices)
    });
    let mut geometry = IndexedGeometry::with_capacity(vertices, indices);

    for primitive in &mesh.primitives {
        extract_primitive(mesh, primitive, &mut geometry)?;
    }

    log::debug!(
        "mesh {}: {} vertices, {} triangles",
        mesh.index,
        geometry.vertex_count(),
        geometry.triangle_count()
    );
    Ok(geometry)
}

fn single_mesh(scene: &SceneGraph) -> ConvertResult<Option<&Mesh>> {
    let mut nodes = scene.mesh_nodes();
    let Some(first) = nodes.next() else {
        return Ok(None);
    };
    if let Some(second) = nodes.next() {
        return Err(ConvertError::MultipleMeshes {
            first: first.index,
            second: second.index,
        });
    }
    let Some(index) = first.mesh else {
        return Ok(None);
    };
    scene
        .mesh(index)
        .map(Some)
        .ok_or(ConvertError::UndecodedMesh {
            node: first.index,
            mesh: index,
        })
}

fn check_topology(mesh: &Mesh) -> ConvertResult<()> {
    match mesh
        .primitives
        .iter()
        .find(|primitive| primitive.mode != Mode::Triangles)
    {
        Some(primitive) => Err(ConvertError::UnsupportedTopology {
            mesh: mesh.index,
            primitive: primitive.index,
            mode: primitive.mode,
        }),
        None => Ok(()),
    }
}

fn extract_primitive(
    mesh: &Mesh,
    primitive: &Primitive,
    geometry: &mut IndexedGeometry,
) -> ConvertResult<()> {
    let base = geometry.vertex_count();

    for attribute in &primitive.attributes {
        let kind = AttributeKind::of(&attribute.semantic);
        let accessor = &attribute.accessor;
        if kind == AttributeKind::Ignored {
            log::trace!(
                "primitive {}: skipping {:?} attribute",
                primitive.index,
                attribute.semantic
            );
            continue;
        }
        if !kind.accepts(accessor.dimensions) {
            return Err(ConvertError::UnsupportedAccessorShape {
                semantic: kind.name(),
                accessor: accessor.index,
                dimensions: accessor.dimensions,
                expected: kind.expected_shape(),
            });
        }

        let floats = unpack_floats(accessor)?;
        match (kind, accessor.dimensions) {
            (AttributeKind::Color, Dimensions::Vec3) => {
                for rgb in floats.chunks_exact(3) {
                    geometry.vertex_colors.extend_from_slice(rgb);
                    geometry.vertex_colors.push(1.0);
                }
            }
            (AttributeKind::Color, _) => geometry.vertex_colors.extend_from_slice(&floats),
            _ => geometry.vertex_positions.extend_from_slice(&floats),
        }
        log::debug!(
            "mesh {} primitive {}: {} {} elements from accessor {}",
            mesh.index,
            primitive.index,
            accessor.count,
            kind.name(),
            accessor.index
        );
    }

    match &primitive.indices {
        Some(accessor) => {
            let indices = read_indices(accessor)?;
            let base = u32::try_from(base).unwrap_or(u32::MAX);
            let start = geometry.indices.len();
            for (offset, index) in indices.into_iter().enumerate() {
                let rebased = index
                    .checked_add(base)
                    .ok_or(ConvertError::IndexOutOfRange {
                        position: start + offset,
                        index,
                        vertex_count: geometry.vertex_count(),
                    })?;
                geometry.indices.push(rebased);
            }
        }
        None => log::warn!(
            "mesh {} primitive {} has no index buffer and contributes no triangles",
            mesh.index,
            primitive.index
        ),
    }
    Ok(())
}

/// Converts an accessor's components to floats using glTF normalization
/// rules. The result must hold exactly `count * components` values.
pub fn unpack_floats(accessor: &Accessor) -> ConvertResult<Vec<f32>> {
    let normalized = accessor.normalized;
    let floats: Vec<f32> = match &accessor.components {
        Components::F32(values) => values.clone(),
        Components::I8(values) if normalized => values
            .iter()
            .map(|&c| (f32::from(c) / 127.0).max(-1.0))
            .collect(),
        Components::U8(values) if normalized => {
            values.iter().map(|&c| f32::from(c) / 255.0).collect()
        }
        Components::I16(values) if normalized => values
            .iter()
            .map(|&c| (f32::from(c) / 32767.0).max(-1.0))
            .collect(),
        Components::U16(values) if normalized => {
            values.iter().map(|&c| f32::from(c) / 65535.0).collect()
        }
        Components::I8(values) => values.iter().map(|&c| f32::from(c)).collect(),
        Components::U8(values) => values.iter().map(|&c| f32::from(c)).collect(),
        Components::I16(values) => values.iter().map(|&c| f32::from(c)).collect(),
        Components::U16(values) => values.iter().map(|&c| f32::from(c)).collect(),
        Components::U32(values) => values.iter().map(|&c| c as f32).collect(),
    };

    let expected = accessor.count * accessor.dimensions.multiplicity();
    if floats.is_empty() || floats.len() != expected {
        return Err(ConvertError::AccessorUnpack {
            accessor: accessor.index,
            expected,
            unpacked: floats.len(),
        });
    }
    Ok(floats)
}

/// Reads an index accessor: unnormalized `u8`, `u16` or `u32` scalars.
pub fn read_indices(accessor: &Accessor) -> ConvertResult<Vec<u32>> {
    let unsupported = || ConvertError::UnsupportedIndexFormat {
        accessor: accessor.index,
        data_type: accessor.components.data_type(),
        dimensions: accessor.dimensions,
        normalized: accessor.normalized,
    };
    if accessor.dimensions != Dimensions::Scalar || accessor.normalized {
        return Err(unsupported());
    }

    let indices: Vec<u32> = match &accessor.components {
        Components::U8(values) => values.iter().map(|&i| u32::from(i)).collect(),
        Components::U16(values) => values.iter().map(|&i| u32::from(i)).collect(),
        Components::U32(values) => values.clone(),
        _ => return Err(unsupported()),
    };
    if indices.len() != accessor.count {
        return Err(ConvertError::AccessorUnpack {
            accessor: accessor.index,
            expected: accessor.count,
            unpacked: indices.len(),
        });
    }
    Ok(indices)
}
