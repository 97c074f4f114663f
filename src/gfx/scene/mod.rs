//! # Scene Management Module
//!
//! An explicit scene graph: nodes live in an arena owned by [`Scene`] and
//! refer to each other by [`NodeId`]. Geometries, materials, textures and
//! cube maps are stored once in the scene and shared by reference.
//!
//! ## Key Components
//!
//! - [`Scene`] - node arena plus the assets nodes reference
//! - [`Node`] - a group, mesh or light with a local [`Transform`]
//! - [`Light`] - ambient, point, spot and directional light sources
//! - [`Vertex3D`] - GPU vertex with position, normal and texture coordinate
//!
//! ## Usage
//!
//! ```no_run
//! use daynight::gfx::geometry::generate_cube;
//! use daynight::gfx::color::Color;
//! use daynight::gfx::resources::material::Material;
//! use daynight::gfx::scene::{MeshNode, Node, Scene};
//!
//! let mut scene = Scene::new();
//! let geometry = scene.add_geometry(generate_cube());
//! let material = scene.materials.add_material(Material::new("cube", Color::WHITE));
//! let cube = scene.add(Node::mesh("cube", MeshNode::new(geometry, material)));
//! ```

pub mod light;
pub mod node;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use light::{Light, LightKind, LightTarget, ShadowSettings};
pub use node::{MeshNode, Node, NodeId, NodeKind, Transform};
pub use scene::{Background, CubeMapId, Geometry, GeometryId, Scene};
pub use vertex::Vertex3D;
