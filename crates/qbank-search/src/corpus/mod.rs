//! corpus module

pub mod loader;

pub use loader::load_questions;
