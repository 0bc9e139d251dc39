mod binary;
mod bytes;
mod format;
mod text;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::classifiers::exemplar_svm::LinearModel;
use crate::core::Sample;
use crate::error::Result;

pub use binary::BinaryCodec;
pub use format::DataFormat;
pub use text::TextCodec;

/// Encodes and decodes labelled sample sets.
pub trait SampleCodec: Sync {
    fn encode(&self, samples: &[Sample], out: &mut dyn Write) -> Result<()>;
    fn decode(&self, input: &mut dyn BufRead) -> Result<Vec<Sample>>;
}

/// Encodes and decodes trained linear models.
pub trait ModelCodec: Sync {
    fn encode(&self, model: &LinearModel, out: &mut dyn Write) -> Result<()>;
    fn decode(&self, input: &mut dyn BufRead) -> Result<LinearModel>;
}

pub fn read_samples(path: impl AsRef<Path>, format: DataFormat) -> Result<Vec<Sample>> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    format.sample_codec().decode(&mut reader)
}

pub fn write_samples(path: impl AsRef<Path>, samples: &[Sample], format: DataFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    format.sample_codec().encode(samples, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_model(path: impl AsRef<Path>, format: DataFormat) -> Result<LinearModel> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    format.model_codec().decode(&mut reader)
}

pub fn write_model(path: impl AsRef<Path>, model: &LinearModel, format: DataFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    format.model_codec().encode(model, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EsvmError;
    use strum::IntoEnumIterator;
    use tempfile::NamedTempFile;

    #[test]
    fn file_helpers_round_trip_every_format() {
        let samples = vec![
            Sample::positive(vec![0.5, 0.25]),
            Sample::negative(vec![-1.0, 3.0]),
        ];
        let mut model = LinearModel::new(vec![1.0, -0.5], 0.75);
        model.support_vectors = 2;

        for format in DataFormat::iter() {
            let file = NamedTempFile::new().unwrap();
            write_samples(file.path(), &samples, format).unwrap();
            assert_eq!(read_samples(file.path(), format).unwrap(), samples);

            let file = NamedTempFile::new().unwrap();
            write_model(file.path(), &model, format).unwrap();
            assert_eq!(read_model(file.path(), format).unwrap(), model);
        }
    }

    #[test]
    fn formats_are_not_sniffed() {
        let file = NamedTempFile::new().unwrap();
        write_samples(file.path(), &[Sample::positive(vec![1.0])], DataFormat::Binary).unwrap();
        assert!(matches!(
            read_samples(file.path(), DataFormat::Text),
            Err(EsvmError::Parse { .. }) | Err(EsvmError::Io(_))
        ));
    }

    #[test]
    fn missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_model(dir.path().join("absent.bin"), DataFormat::Binary),
            Err(EsvmError::Io(_))
        ));
    }
}
