//! Mesh input.
pub mod msh;
