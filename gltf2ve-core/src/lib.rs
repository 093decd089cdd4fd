//! Converts the single triangle mesh of a glTF asset into flat draw-arrays
//! geometry: per-corner positions (xyz) and colors (rgba), no index buffer.
//!
//! ```no_run
//! let scene = gltf2ve_core::load_file("model.glb")?;
//! let flat = gltf2ve_core::convert(&scene)?;
//! gltf2ve_core::write_document(&flat, std::io::stdout().lock())?;
//! # Ok::<(), gltf2ve_core::ConvertError>(())
//! ```

pub mod asset;
pub mod document;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod geometry;
pub mod scene;

pub use asset::{load_file, load_slice};
pub use document::write_document;
pub use error::{ConvertError, ConvertResult};
pub use extract::extract;
pub use flatten::flatten;
pub use geometry::{FlatGeometry, IndexedGeometry};
pub use scene::SceneGraph;

/// Extracts and flattens in one step.
pub fn convert(scene: &SceneGraph) -> ConvertResult<FlatGeometry> {
    flatten(extract(scene)?)
}
