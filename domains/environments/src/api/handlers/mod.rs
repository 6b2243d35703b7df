//! HTTP handlers for the Environments domain

pub mod environments;
