mod sample;

pub use sample::{FeatureVector, Label, Sample, label_sets, split_by_label};
