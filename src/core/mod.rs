pub mod ragged;
pub mod samples;

pub use ragged::{Nested, Ragged};
pub use samples::{FeatureVector, Label, Sample};
