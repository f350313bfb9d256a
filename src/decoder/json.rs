//! JSON decoder

use super::{Decoder, DecoderStrategy, Reader, ReaderDecoder};
use crate::domain::{Partial, Result, Value};
use std::io::Read;

/// Format string accepted by [`JsonDecoderStrategy`]
pub const FORMAT: &str = "json";

/// Builds decoders for `json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoderStrategy;

impl DecoderStrategy for JsonDecoderStrategy {
    fn accept(&self, format: &str) -> bool {
        format == FORMAT
    }

    fn create(&self, reader: Reader) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(ReaderDecoder::new(reader, decode_json)))
    }
}

fn decode_json(reader: &mut dyn Read) -> Result<Partial> {
    let raw: serde_json::Value = serde_json::from_reader(reader)?;
    Partial::from_document(Value::from(raw))
}
