mod augmenters;
mod descriptors;
mod negatives;

pub use augmenters::JitterAugmenter;
pub use descriptors::VectorDescriptor;
pub use negatives::FailingNegatives;
