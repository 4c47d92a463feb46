//! Interaction state for the site chrome, independent of rendering.

pub mod carousel;
pub mod header;
pub mod store;
