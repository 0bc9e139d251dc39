use std::io::{BufRead, Write};

use crate::classifiers::exemplar_svm::{KernelType, LinearModel, PlattSigmoid};
use crate::codec::bytes::ByteReader;
use crate::codec::{ModelCodec, SampleCodec};
use crate::core::{Label, Sample};
use crate::error::{EsvmError, Result};

pub(crate) const SAMPLES_MAGIC: &[u8; 16] = b"ESVM:SAMPLES:v01";
pub(crate) const MODEL_MAGIC: &[u8; 16] = b"ESVM:MODEL:v0001";

/// Little-endian codec behind a 16-byte magic header.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

fn read_all(input: &mut dyn BufRead) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    Ok(buf)
}

fn write_f64s(out: &mut dyn Write, values: &[f64]) -> Result<()> {
    for v in values {
        out.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

impl SampleCodec for BinaryCodec {
    fn encode(&self, samples: &[Sample], out: &mut dyn Write) -> Result<()> {
        out.write_all(SAMPLES_MAGIC)?;
        out.write_all(&(samples.len() as u64).to_le_bytes())?;
        for s in samples {
            out.write_all(&s.label.as_i32().to_le_bytes())?;
            out.write_all(&(s.features.len() as u64).to_le_bytes())?;
            write_f64s(out, &s.features)?;
        }
        Ok(())
    }

    fn decode(&self, input: &mut dyn BufRead) -> Result<Vec<Sample>> {
        let buf = read_all(input)?;
        let mut r = ByteReader::new(&buf);
        r.expect_magic(SAMPLES_MAGIC)?;
        // every record carries at least a label and a length
        let count = r.length(12, "record count")?;

        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            let at = r.offset();
            let raw = r.i32("label")?;
            let label = Label::from_i32(raw).ok_or_else(|| {
                EsvmError::parse_at_byte(at, format!("label must be +1 or -1, found {raw}"))
            })?;
            let len = r.length(8, "record length")?;
            let features = r.f64_vec(len, "feature values")?;
            samples.push(Sample::new(features, label));
        }
        r.finish()?;
        Ok(samples)
    }
}

impl ModelCodec for BinaryCodec {
    fn encode(&self, model: &LinearModel, out: &mut dyn Write) -> Result<()> {
        out.write_all(MODEL_MAGIC)?;
        out.write_all(&[model.kernel.code()])?;
        out.write_all(&(model.weights.len() as u64).to_le_bytes())?;
        out.write_all(&model.rho.to_le_bytes())?;
        out.write_all(&(model.support_vectors as u64).to_le_bytes())?;
        out.write_all(&model.positive_weight.to_le_bytes())?;
        out.write_all(&model.negative_weight.to_le_bytes())?;
        match &model.probability {
            Some(p) => {
                out.write_all(&[1])?;
                write_f64s(out, &[p.a, p.b])?;
            }
            None => out.write_all(&[0])?,
        }
        write_f64s(out, &model.weights)
    }

    fn decode(&self, input: &mut dyn BufRead) -> Result<LinearModel> {
        let buf = read_all(input)?;
        let mut r = ByteReader::new(&buf);
        r.expect_magic(MODEL_MAGIC)?;

        let code = r.u8("kernel code")?;
        let kernel = KernelType::from_code(code)
            .ok_or_else(|| EsvmError::IllegalState(format!("unknown kernel code {code}")))?;
        let nr_feature = r.u64("nr_feature")?;
        let rho = r.f64("rho")?;
        let support_vectors = r.u64("nr_sv")? as usize;
        let positive_weight = r.f64("positive weight")?;
        let negative_weight = r.f64("negative weight")?;

        let at = r.offset();
        let probability = match r.u8("probability flag")? {
            0 => None,
            1 => Some(PlattSigmoid::new(r.f64("sigmoid A")?, r.f64("sigmoid B")?)),
            other => {
                return Err(EsvmError::parse_at_byte(
                    at,
                    format!("probability flag must be 0 or 1, found {other}"),
                ));
            }
        };

        let n = usize::try_from(nr_feature)
            .ok()
            .filter(|n| n.checked_mul(8) == Some(r.remaining()))
            .ok_or_else(|| {
                EsvmError::parse_at_byte(
                    r.offset(),
                    format!(
                        "nr_feature is {nr_feature} but {} weight bytes follow",
                        r.remaining()
                    ),
                )
            })?;
        let weights = r.f64_vec(n, "weights")?;

        Ok(LinearModel {
            kernel,
            weights,
            rho,
            support_vectors,
            positive_weight,
            negative_weight,
            probability,
        })
    }
}
