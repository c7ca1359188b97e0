// Core modules for SLA support-tree generation
pub mod cluster;
pub mod geometry;
pub mod hull;
pub mod mesh;
pub mod primitives;
pub mod raycast;
pub mod spatial;
pub mod support;

// Re-export commonly used types
pub use geometry::{Point2D, Point3D, Vector3D};
pub use mesh::{MeshError, TriangleMesh};
pub use support::{
    ChannelController, Command, Controller, SupportConfig, SupportTree, Unattended,
};

/// Main result type for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for support generation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
