//! YAML decoder

use super::{Decoder, DecoderStrategy, Reader, ReaderDecoder};
use crate::domain::{Partial, Result, Value};
use std::io::Read;

/// Format string accepted by [`YamlDecoderStrategy`]
pub const FORMAT: &str = "yaml";

/// Builds decoders for `yaml`
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoderStrategy;

impl DecoderStrategy for YamlDecoderStrategy {
    fn accept(&self, format: &str) -> bool {
        format == FORMAT
    }

    fn create(&self, reader: Reader) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(ReaderDecoder::new(reader, decode_yaml)))
    }
}

fn decode_yaml(reader: &mut dyn Read) -> Result<Partial> {
    let raw: serde_yaml::Value = serde_yaml::from_reader(reader)?;
    Partial::from_document(Value::try_from(raw)?)
}
