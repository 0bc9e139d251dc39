use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::classifiers::exemplar_svm::{KernelType, LinearModel, PlattSigmoid};
use crate::codec::{ModelCodec, SampleCodec};
use crate::core::{Label, Sample};
use crate::error::{EsvmError, Result};

pub(crate) const MODEL_HEADER: &str = "ESVM-MODEL-TEXT v1";
const TERMINATOR: &str = "-1:0";
/// Largest feature index a sample line may carry.
pub(crate) const MAX_FEATURE_INDEX: usize = 1 << 24;

/// Line-oriented codec: sparse-indexed samples and keyed model files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

/// Whitespace-separated tokens with their 1-based column.
fn tokens(line: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, ch) in line.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                out.push((s + 1, &line[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push((s + 1, &line[s..]));
    }
    out
}

fn parse_token<T: FromStr>(tok: &str, line: usize, column: usize, what: &str) -> Result<T> {
    tok.parse::<T>()
        .map_err(|_| EsvmError::parse_at_line(line, column, format!("malformed {what} '{tok}'")))
}

fn parse_sample_line(text: &str, line: usize) -> Result<Sample> {
    let toks = tokens(text);
    let Some(&(col, label_tok)) = toks.first() else {
        return Err(EsvmError::parse_at_line(line, 1, "empty sample"));
    };
    let raw: i32 = parse_token(label_tok, line, col, "label")?;
    let label = Label::from_i32(raw).ok_or_else(|| {
        EsvmError::parse_at_line(line, col, format!("label must be +1 or -1, found {raw}"))
    })?;

    let mut features = Vec::new();
    let mut last_index = 0usize;
    let mut terminated = false;
    for &(col, tok) in &toks[1..] {
        if terminated {
            return Err(EsvmError::parse_at_line(line, col, "token after terminator"));
        }
        if tok == TERMINATOR {
            terminated = true;
            continue;
        }
        let (idx_tok, val_tok) = tok.split_once(':').ok_or_else(|| {
            EsvmError::parse_at_line(line, col, format!("expected index:value, found '{tok}'"))
        })?;
        let index: usize = parse_token(idx_tok, line, col, "index")?;
        if index == 0 {
            return Err(EsvmError::parse_at_line(line, col, "indices are 1-based"));
        }
        if index > MAX_FEATURE_INDEX {
            return Err(EsvmError::parse_at_line(
                line,
                col,
                format!("index {index} exceeds the limit of {MAX_FEATURE_INDEX}"),
            ));
        }
        if index <= last_index {
            return Err(EsvmError::parse_at_line(
                line,
                col,
                format!("index {index} does not follow {last_index}"),
            ));
        }
        let value: f64 = parse_token(val_tok, line, col + idx_tok.len() + 1, "value")?;
        features.resize(index - 1, 0.0);
        features.push(value);
        last_index = index;
    }
    if !terminated {
        return Err(EsvmError::parse_at_line(
            line,
            text.trim_end().len() + 1,
            "missing -1:0 terminator",
        ));
    }
    Ok(Sample::new(features, label))
}

impl SampleCodec for TextCodec {
    fn encode(&self, samples: &[Sample], out: &mut dyn Write) -> Result<()> {
        for s in samples {
            write!(out, "{:+}", s.label.as_i32())?;
            for (i, v) in s.features.iter().enumerate() {
                write!(out, " {}:{}", i + 1, v)?;
            }
            writeln!(out, " {TERMINATOR}")?;
        }
        Ok(())
    }

    fn decode(&self, input: &mut dyn BufRead) -> Result<Vec<Sample>> {
        let mut samples = Vec::new();
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            samples.push(parse_sample_line(&line, i + 1)?);
        }
        Ok(samples)
    }
}

#[derive(Default)]
struct ModelFields {
    kernel: Option<KernelType>,
    nr_feature: Option<usize>,
    rho: Option<f64>,
    nr_sv: Option<usize>,
    class_weights: Option<(f64, f64)>,
    probability: Option<PlattSigmoid>,
    weights: Option<Vec<f64>>,
}

fn expect_values<'a>(
    toks: &[(usize, &'a str)],
    n: usize,
    line: usize,
) -> Result<Vec<(usize, &'a str)>> {
    let values = &toks[1..];
    if values.len() != n {
        let col = toks.first().map_or(1, |t| t.0);
        return Err(EsvmError::parse_at_line(
            line,
            col,
            format!("'{}' takes {n} value(s), found {}", toks[0].1, values.len()),
        ));
    }
    Ok(values.to_vec())
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str, line: usize, col: usize) -> Result<()> {
    if slot.is_some() {
        return Err(EsvmError::parse_at_line(
            line,
            col,
            format!("'{key}' is given more than once"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

impl ModelCodec for TextCodec {
    fn encode(&self, model: &LinearModel, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{MODEL_HEADER}")?;
        writeln!(out, "kernel_type {}", model.kernel)?;
        writeln!(out, "nr_feature {}", model.weights.len())?;
        writeln!(out, "rho {}", model.rho)?;
        writeln!(out, "nr_sv {}", model.support_vectors)?;
        writeln!(
            out,
            "class_weights {} {}",
            model.positive_weight, model.negative_weight
        )?;
        if let Some(p) = &model.probability {
            writeln!(out, "probability {} {}", p.a, p.b)?;
        }
        writeln!(out, "w")?;
        let weights: Vec<String> = model.weights.iter().map(f64::to_string).collect();
        writeln!(out, "{}", weights.join(" "))?;
        Ok(())
    }

    fn decode(&self, input: &mut dyn BufRead) -> Result<LinearModel> {
        let mut lines = input.lines().enumerate();
        let mut header_seen = false;
        let mut fields = ModelFields::default();

        while let Some((i, line)) = lines.next() {
            let line = line?;
            let n = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            if !header_seen {
                if line.trim() != MODEL_HEADER {
                    return Err(EsvmError::parse_at_line(
                        n,
                        1,
                        format!("expected header '{MODEL_HEADER}'"),
                    ));
                }
                header_seen = true;
                continue;
            }

            let toks = tokens(&line);
            let (key_col, key) = toks[0];
            if fields.weights.is_some() {
                return Err(EsvmError::parse_at_line(
                    n,
                    key_col,
                    "unexpected content after the weights",
                ));
            }
            match key {
                "kernel_type" => {
                    let v = expect_values(&toks, 1, n)?;
                    let kernel = v[0].1.parse::<KernelType>().map_err(|_| {
                        EsvmError::IllegalState(format!("unsupported kernel type '{}'", v[0].1))
                    })?;
                    set_once(&mut fields.kernel, kernel, key, n, key_col)?;
                }
                "nr_feature" => {
                    let v = expect_values(&toks, 1, n)?;
                    let nr_feature = parse_token(v[0].1, n, v[0].0, "nr_feature")?;
                    set_once(&mut fields.nr_feature, nr_feature, key, n, key_col)?;
                }
                "rho" => {
                    let v = expect_values(&toks, 1, n)?;
                    let rho = parse_token(v[0].1, n, v[0].0, "rho")?;
                    set_once(&mut fields.rho, rho, key, n, key_col)?;
                }
                "nr_sv" => {
                    let v = expect_values(&toks, 1, n)?;
                    let nr_sv = parse_token(v[0].1, n, v[0].0, "nr_sv")?;
                    set_once(&mut fields.nr_sv, nr_sv, key, n, key_col)?;
                }
                "class_weights" => {
                    let v = expect_values(&toks, 2, n)?;
                    let weights = (
                        parse_token(v[0].1, n, v[0].0, "class weight")?,
                        parse_token(v[1].1, n, v[1].0, "class weight")?,
                    );
                    set_once(&mut fields.class_weights, weights, key, n, key_col)?;
                }
                "probability" => {
                    let v = expect_values(&toks, 2, n)?;
                    let sigmoid = PlattSigmoid::new(
                        parse_token(v[0].1, n, v[0].0, "sigmoid A")?,
                        parse_token(v[1].1, n, v[1].0, "sigmoid B")?,
                    );
                    set_once(&mut fields.probability, sigmoid, key, n, key_col)?;
                }
                "w" => {
                    expect_values(&toks, 0, n)?;
                    let weights = match lines.next() {
                        Some((j, next)) => {
                            let next = next?;
                            tokens(&next)
                                .into_iter()
                                .map(|(col, t)| parse_token::<f64>(t, j + 1, col, "weight"))
                                .collect::<Result<Vec<_>>>()?
                        }
                        None => Vec::new(),
                    };
                    fields.weights = Some(weights);
                }
                other => {
                    return Err(EsvmError::parse_at_line(
                        n,
                        key_col,
                        format!("unknown model field '{other}'"),
                    ));
                }
            }
        }

        if !header_seen {
            return Err(EsvmError::parse_at_line(1, 1, "empty model file"));
        }
        let missing = |name: &str| EsvmError::IllegalState(format!("model is missing '{name}'"));
        let kernel = fields.kernel.ok_or_else(|| missing("kernel_type"))?;
        let nr_feature = fields.nr_feature.ok_or_else(|| missing("nr_feature"))?;
        let rho = fields.rho.ok_or_else(|| missing("rho"))?;
        let weights = fields.weights.ok_or_else(|| missing("w"))?;
        if weights.len() != nr_feature {
            return Err(EsvmError::IllegalState(format!(
                "nr_feature is {nr_feature} but {} weights were stored",
                weights.len()
            )));
        }
        let (positive_weight, negative_weight) = fields.class_weights.unwrap_or((1.0, 1.0));

        Ok(LinearModel {
            kernel,
            weights,
            rho,
            support_vectors: fields.nr_sv.unwrap_or(0),
            positive_weight,
            negative_weight,
            probability: fields.probability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;
    use std::io::Cursor;

    fn decode_samples(text: &str) -> Result<Vec<Sample>> {
        SampleCodec::decode(&TextCodec, &mut Cursor::new(text.as_bytes()))
    }

    fn decode_model(text: &str) -> Result<LinearModel> {
        ModelCodec::decode(&TextCodec, &mut Cursor::new(text.as_bytes()))
    }

    fn parse_location(r: Result<Vec<Sample>>) -> (usize, usize) {
        match r {
            Err(EsvmError::Parse {
                location: Location::Line { line, column },
                ..
            }) => (line, column),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn writes_dense_terminated_lines() {
        let samples = vec![
            Sample::positive(vec![0.5, 0.0, -2.0]),
            Sample::negative(vec![1.0]),
        ];
        let mut out = Vec::new();
        SampleCodec::encode(&TextCodec, &samples, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "+1 1:0.5 2:0 3:-2 -1:0\n-1 1:1 -1:0\n");
    }

    #[test]
    fn round_trips_samples() {
        let samples = vec![
            Sample::positive(vec![0.1, 1.0 / 3.0, -7.25e-9]),
            Sample::negative(vec![f64::MAX, -0.0, 42.0]),
        ];
        let mut out = Vec::new();
        SampleCodec::encode(&TextCodec, &samples, &mut out).unwrap();
        let back = SampleCodec::decode(&TextCodec, &mut Cursor::new(out)).unwrap();
        assert_eq!(back, samples);
    }

    #[test]
    fn gaps_read_as_zeros_and_blank_lines_are_skipped() {
        let s = decode_samples("\n1 2:3.5 4:1 -1:0\n\n-1 -1:0\n").unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].features, vec![0.0, 3.5, 0.0, 1.0]);
        assert_eq!(s[0].label, Label::Positive);
        assert!(s[1].features.is_empty());
        assert_eq!(s[1].label, Label::Negative);
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let (line, column) = parse_location(decode_samples("1 1:0.1 2:0.2 2:0.3 -1:0\n"));
        assert_eq!(line, 1);
        assert_eq!(column, 15);
    }

    #[test]
    fn decreasing_index_is_rejected() {
        let (line, column) = parse_location(decode_samples("-1 1:1 -1:0\n1 2:0.2 1:0.1 -1:0\n"));
        assert_eq!(line, 2);
        assert_eq!(column, 9);
    }

    #[test]
    fn oversized_index_is_a_parse_error() {
        let (line, column) =
            parse_location(decode_samples("-1 1:0 -1:0\n1 18446744073709551615:1 -1:0\n"));
        assert_eq!((line, column), (2, 3));

        let too_far = format!("1 {}:1 -1:0\n", MAX_FEATURE_INDEX + 1);
        assert_eq!(parse_location(decode_samples(&too_far)), (1, 3));
    }

    #[test]
    fn missing_terminator_and_bad_tokens() {
        parse_location(decode_samples("1 1:0.5\n"));
        parse_location(decode_samples("2 1:0.5 -1:0\n"));
        parse_location(decode_samples("x 1:0.5 -1:0\n"));
        parse_location(decode_samples("1 1-0.5 -1:0\n"));
        parse_location(decode_samples("1 1:abc -1:0\n"));
        parse_location(decode_samples("1 0:1 -1:0\n"));
        parse_location(decode_samples("1 1:1 -1:0 2:2\n"));
    }

    fn model() -> LinearModel {
        LinearModel {
            kernel: KernelType::Linear,
            weights: vec![0.25, -1.5, 1e-7],
            rho: -0.125,
            support_vectors: 4,
            positive_weight: 100.0,
            negative_weight: 1.0,
            probability: Some(PlattSigmoid::new(-3.5, 0.2)),
        }
    }

    #[test]
    fn model_layout() {
        let mut out = Vec::new();
        ModelCodec::encode(&TextCodec, &model(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], MODEL_HEADER);
        assert_eq!(lines[1], "kernel_type linear");
        assert_eq!(lines[2], "nr_feature 3");
        assert_eq!(lines[5], "class_weights 100 1");
        assert_eq!(lines[6], "probability -3.5 0.2");
        assert_eq!(lines[7], "w");
        assert_eq!(lines[8], "0.25 -1.5 0.0000001");
    }

    #[test]
    fn round_trips_model() {
        for m in [
            model(),
            LinearModel {
                probability: None,
                ..model()
            },
        ] {
            let mut out = Vec::new();
            ModelCodec::encode(&TextCodec, &m, &mut out).unwrap();
            let back = ModelCodec::decode(&TextCodec, &mut Cursor::new(out)).unwrap();
            assert_eq!(back, m);
        }
    }

    #[test]
    fn model_semantic_errors_are_illegal_state() {
        let unsupported = "ESVM-MODEL-TEXT v1\nkernel_type rbf\nnr_feature 1\nrho 0\nw\n1\n";
        assert!(matches!(
            decode_model(unsupported),
            Err(EsvmError::IllegalState(_))
        ));

        let missing_rho = "ESVM-MODEL-TEXT v1\nkernel_type linear\nnr_feature 1\nw\n1\n";
        assert!(matches!(
            decode_model(missing_rho),
            Err(EsvmError::IllegalState(_))
        ));

        let short = "ESVM-MODEL-TEXT v1\nkernel_type linear\nnr_feature 3\nrho 0\nw\n1 2\n";
        assert!(matches!(decode_model(short), Err(EsvmError::IllegalState(_))));
    }

    #[test]
    fn model_syntax_errors_are_parse() {
        let bad_header = "SOMETHING ELSE\n";
        assert!(matches!(
            decode_model(bad_header),
            Err(EsvmError::Parse { .. })
        ));

        let bad_rho = "ESVM-MODEL-TEXT v1\nkernel_type linear\nnr_feature 1\nrho zero\nw\n1\n";
        assert!(matches!(
            decode_model(bad_rho),
            Err(EsvmError::Parse {
                location: Location::Line { line: 4, column: 5 },
                ..
            })
        ));

        let unknown = "ESVM-MODEL-TEXT v1\ngamma 0.5\n";
        assert!(matches!(decode_model(unknown), Err(EsvmError::Parse { .. })));
    }

    fn linear_model_text(tail: &str) -> String {
        format!("{MODEL_HEADER}\nkernel_type linear\nnr_feature 1\n{tail}")
    }

    #[test]
    fn repeated_keys_and_trailing_content_are_rejected() {
        assert!(matches!(
            decode_model(&linear_model_text("rho 0\nrho 1\nw\n1\n")),
            Err(EsvmError::Parse {
                location: Location::Line { line: 5, column: 1 },
                ..
            })
        ));
        assert!(matches!(
            decode_model(&linear_model_text("rho 0\nw\n1\nrho 2\n")),
            Err(EsvmError::Parse {
                location: Location::Line { line: 7, column: 1 },
                ..
            })
        ));
        assert!(matches!(
            decode_model(&linear_model_text("rho 0\nw\n1\n2\n")),
            Err(EsvmError::Parse { .. })
        ));

        let blank_tail = decode_model(&linear_model_text("rho 0\nw\n1\n\n\n")).unwrap();
        assert_eq!(blank_tail.weights, vec![1.0]);
    }
}
