//! Scene-graph and asset boundary for Shoreline.
//!
//! Holds what the external renderer needs to draw a frame (mesh nodes, materials,
//! lights, the camera) and the background loaders that fill it in.

pub mod assets;
pub mod camera;
pub mod error;
pub mod graph;
pub mod material;
pub mod mesh;
pub mod vertex;

pub use assets::*;
pub use camera::*;
pub use error::*;
pub use graph::*;
pub use material::*;
pub use mesh::*;
pub use vertex::*;
