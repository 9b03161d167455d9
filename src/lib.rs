pub mod color;
pub mod error;
pub mod scene;
pub mod vector;

pub use color::Color;
pub use error::{SceneError, SceneResult, VectorError};
pub use scene::Scene;
pub use vector::Vector3;

pub type V3 = Vector3;
