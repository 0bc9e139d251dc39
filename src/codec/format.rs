use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString, IntoStaticStr};

use crate::codec::{BinaryCodec, ModelCodec, SampleCodec, TextCodec};

/// On-disk encoding of datasets and models. Always chosen explicitly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DataFormat {
    #[strum(message = "Text", detailed_message = "Line-oriented, human readable.")]
    Text,
    #[default]
    #[strum(message = "Binary", detailed_message = "Little-endian records behind a magic header.")]
    Binary,
}

impl DataFormat {
    pub fn sample_codec(self) -> &'static dyn SampleCodec {
        match self {
            DataFormat::Text => &TextCodec,
            DataFormat::Binary => &BinaryCodec,
        }
    }

    pub fn model_codec(self) -> &'static dyn ModelCodec {
        match self {
            DataFormat::Text => &TextCodec,
            DataFormat::Binary => &BinaryCodec,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DataFormat::Text => "txt",
            DataFormat::Binary => "bin",
        }
    }
}
