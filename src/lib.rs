//! A two-dimensional vector that can be read and written in either cartesian
//! (`x`, `y`) or polar (`d`, `a`) form.
//!
//! Only the representation that was last written is authoritative; the other
//! one is derived on first read and cached until the next write invalidates it.

pub mod error;
pub mod utils;

pub use error::{Result, VectorError};
pub use utils::{Vector2D, VectorInput};
