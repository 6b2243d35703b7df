//! Domain layer for portability tests

pub mod entities;
pub mod normalizer;
pub mod state;
