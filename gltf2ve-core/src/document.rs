use std::io::{self, Write};

use crate::error::ConvertResult;
use crate::geometry::FlatGeometry;

/// Writes `{"vertexPositions":[..],"vertexColors":[..]}` and a trailing
/// newline.
pub fn write_document<W: Write>(geometry: &FlatGeometry, mut writer: W) -> ConvertResult<()> {
    serde_json::to_writer(&mut writer, geometry).map_err(io::Error::from)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
