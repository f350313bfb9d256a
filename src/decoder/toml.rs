//! TOML decoder

use super::{Decoder, DecoderStrategy, Reader, ReaderDecoder};
use crate::domain::{Partial, Result, Value};
use std::io::Read;

/// Format string accepted by [`TomlDecoderStrategy`]
pub const FORMAT: &str = "toml";

/// Builds decoders for `toml`
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDecoderStrategy;

impl DecoderStrategy for TomlDecoderStrategy {
    fn accept(&self, format: &str) -> bool {
        format == FORMAT
    }

    fn create(&self, reader: Reader) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(ReaderDecoder::new(reader, decode_toml)))
    }
}

// The toml parser has no streaming entry point.
fn decode_toml(reader: &mut dyn Read) -> Result<Partial> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    let raw: ::toml::Value = ::toml::from_str(&contents)?;
    Partial::from_document(Value::from(raw))
}
