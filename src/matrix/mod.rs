//! Matrix module: dense row-major matrix and the block transcoder.

pub mod dense;
pub use dense::Matrix;
pub mod block;
pub use block::{BlockGrid, blockize, unblock};
