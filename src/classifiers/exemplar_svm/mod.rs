mod exemplar_svm;
mod model;
mod platt;
mod solver;
mod weighting;

pub use exemplar_svm::{ExemplarSvm, FilePredictions};
pub use model::{KernelType, LinearModel};
pub use platt::PlattSigmoid;
pub use weighting::{ClassWeightKind, ClassWeightPolicy, EnforcedWeights};
