//! Core traits shared by the harness matrix type and faer matrices.

pub mod traits;
pub use traits::{MatShape, MatrixGet};
