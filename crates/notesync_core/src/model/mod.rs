//! Domain model shared by the sync core and the remote boundary.
//!
//! # Responsibility
//! - Define the canonical note record used everywhere in the crate.
//! - Keep the serialized shape identical to the remote document shape.

pub mod note;
