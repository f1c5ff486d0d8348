//! File formats exchanged with the solver.

pub mod mtx;
pub use mtx::{parse_mtx, read_mtx_file, write_mtx, write_mtx_file, write_vector, write_vector_file};
