//! Runtime: data structures and the built-in library.

pub mod ds;
pub mod std_lib;
