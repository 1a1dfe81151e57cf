//! Deep-space backdrop: seeded star field, nebula and galaxy generators, and
//! the three background layers drawn behind the planet.

pub mod backdrop;
pub mod galaxy;
pub mod nebula;
pub mod nebula_layer;
pub mod star_layer;
pub mod starfield;

pub use backdrop::BackdropLayer;
pub use galaxy::fallback_galaxy_texture;
pub use nebula::{NEBULA_HUES, NebulaGenerator, NebulaPatch, nebula_patches};
pub use nebula_layer::{NebulaLayer, NebulaVertex, nebula_vertices};
pub use star_layer::{StarFieldLayer, StarInstance, partition_by_class};
pub use starfield::{StarClass, StarFieldGenerator, StarRecord, star_field};
