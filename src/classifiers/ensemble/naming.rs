use crate::codec::DataFormat;

/// File holding the model of cell `(patch, identity)`.
pub fn model_file_name(patch: usize, identity: &str, format: DataFormat) -> String {
    format!("esvm-p{patch:03}-{identity}.{}", format.extension())
}

/// File holding the negative pool of `patch`.
pub fn negatives_file_name(patch: usize, format: DataFormat) -> String {
    format!("negatives-p{patch:03}.{}", format.extension())
}
