//! tokenizer module

pub mod normalizer;

pub use normalizer::{iter_strings, normalize_scalar, normalize_str, tokenize};
