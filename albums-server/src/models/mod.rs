//! Domain models

pub mod album;

pub use album::Album;
