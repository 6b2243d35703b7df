//! Environments domain layer: entities

pub mod entities;
