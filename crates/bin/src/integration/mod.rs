//! Glue between the CLI and the library crates: store access and text rendering.

pub(crate) mod render;
pub(crate) mod store_manager;
