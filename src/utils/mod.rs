mod input;
mod vector;

pub use input::VectorInput;
pub use vector::Vector2D;
