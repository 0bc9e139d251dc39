mod clusters;
mod gallery;

pub use clusters::{ClusterSpec, SyntheticSet, two_clusters};
pub use gallery::SyntheticGallery;
