use crate::error::{ConvertError, ConvertResult};
use crate::geometry::{FlatGeometry, IndexedGeometry};

/// Expands indexed geometry into one position/color entry per triangle
/// corner.
///
/// The whole input is validated before any output is produced: every index
/// must name an existing vertex, and both positions and colors must cover
/// that vertex. Geometry without indices flattens to nothing.
pub fn flatten(geometry: IndexedGeometry) -> ConvertResult<FlatGeometry> {
    if geometry.indices.is_empty() {
        return Ok(FlatGeometry::default());
    }
    validate(&geometry)?;

    let IndexedGeometry {
        vertex_positions,
        vertex_colors,
        indices,
    } = geometry;
    let mut flat = FlatGeometry {
        vertex_positions: Vec::with_capacity(indices.len() * 3),
        vertex_colors: Vec::with_capacity(indices.len() * 4),
    };
    for index in indices {
        let i = index as usize;
        flat.vertex_positions
            .extend_from_slice(&vertex_positions[i * 3..i * 3 + 3]);
        flat.vertex_colors
            .extend_from_slice(&vertex_colors[i * 4..i * 4 + 4]);
    }

    log::debug!(
        "flattened {} vertices into {} triangle corners",
        vertex_positions.len() / 3,
        flat.vertex_count()
    );
    Ok(flat)
}

/// Checks positions, then index range, then colors. Every `MissingAttribute`
/// counts vertices: the number the index buffer needs described.
fn validate(geometry: &IndexedGeometry) -> ConvertResult<()> {
    let vertex_count = geometry.vertex_count();
    let referenced = geometry
        .indices
        .iter()
        .max()
        .map_or(0, |&max| max as usize + 1);
    let required = vertex_count.max(referenced);

    if vertex_count == 0 {
        return Err(ConvertError::MissingAttribute {
            attribute: "POSITION",
            required,
            available: 0,
        });
    }
    if let Some((position, &index)) = geometry
        .indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertex_count)
    {
        return Err(ConvertError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        });
    }
    if geometry.vertex_colors.len() != required * 4 {
        return Err(ConvertError::MissingAttribute {
            attribute: "COLOR_0",
            required,
            available: geometry.color_count(),
        });
    }
    Ok(())
}
