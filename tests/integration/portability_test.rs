//! End-to-end tests over the composed router with in-memory storage

mod common;
mod environments;
mod portability;
mod wes_end_to_end;
