mod ragged;

pub use ragged::{Nested, Ragged};
