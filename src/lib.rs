pub mod classifiers;
pub mod codec;
pub mod config;
pub mod core;
pub mod error;
pub mod normalization;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifiers::{Classifier, EnsembleEsvm, ExemplarSvm};
pub use codec::DataFormat;
pub use config::{EnsembleConfig, EsvmParams};
pub use error::{EsvmError, Result};
