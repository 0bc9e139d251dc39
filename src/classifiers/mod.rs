pub mod classifier;
pub mod ensemble;
pub mod exemplar_svm;

pub use classifier::Classifier;
pub use ensemble::EnsembleEsvm;
pub use exemplar_svm::ExemplarSvm;
