//! The planet itself: fallback surface texture, procedural clouds, material
//! constants, and the atmosphere, body and cloud layers.

pub mod atmosphere;
pub mod cloud_layer;
pub mod clouds;
pub mod material;
pub mod planet;
pub mod surface;

pub use atmosphere::{ATMOSPHERE_TINT, AtmosphereLayer};
pub use cloud_layer::{CloudLayer, CloudMode, cloud_model};
pub use clouds::{CloudGenerator, CloudPatch, procedural_clouds};
pub use material::PlanetMaterial;
pub use planet::PlanetLayer;
pub use surface::{LAND_THRESHOLD, SurfaceClass, classify, fallback_planet_texture, land_value};
