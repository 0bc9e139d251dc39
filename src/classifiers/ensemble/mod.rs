mod collaborators;
mod ensemble;
mod fusion;
mod naming;

pub use collaborators::{
    Augmenter, FileNegativeSource, InMemoryNegatives, NegativeSource, NoAugmentation,
    PatchDescriptor,
};
pub use ensemble::EnsembleEsvm;
pub use fusion::fuse_mean;
pub use naming::{model_file_name, negatives_file_name};
