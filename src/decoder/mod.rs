//! Decoders turning raw bytes into configuration trees
//!
//! A [`Decoder`] owns one byte stream and decodes it into exactly one
//! [`Partial`]. Decoders are created through a [`DecoderFactory`], an ordered
//! list of [`DecoderStrategy`] values where the first strategy accepting the
//! requested format wins.
//!
//! Formats are matched case-sensitively. The default factory knows `json`,
//! `yaml` and `toml`.
//!
//! ```rust
//! use strata::decoder::DecoderFactory;
//! use strata::domain::Lookup;
//!
//! let factory = DecoderFactory::default();
//! let tree = factory
//!     .decode("yaml", Box::new("server:\n  port: 8080\n".as_bytes()))
//!     .unwrap();
//! assert_eq!(tree.int("server.port").unwrap(), 8080);
//! ```

pub mod json;
pub mod toml;
pub mod yaml;

use crate::domain::{Partial, Result, StrataError};
use std::io::Read;

pub use self::json::JsonDecoderStrategy;
pub use self::toml::TomlDecoderStrategy;
pub use self::yaml::YamlDecoderStrategy;

/// Byte stream handed to a decoder
pub type Reader = Box<dyn Read + Send>;

/// Decodes one byte stream into one tree
pub trait Decoder: Send {
    /// Decode the stream
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::DecoderClosed`] after `close()`, or a decode
    /// error when the content is malformed or not a mapping.
    fn decode(&mut self) -> Result<Partial>;

    /// Release the underlying reader; calling it again is a no-op
    fn close(&mut self) -> Result<()>;
}

/// Builds decoders for the formats it accepts
pub trait DecoderStrategy: Send + Sync {
    /// Whether this strategy handles `format`
    fn accept(&self, format: &str) -> bool;

    /// Create a decoder reading from `reader`
    fn create(&self, reader: Reader) -> Result<Box<dyn Decoder>>;
}

/// Format-specific parse function used by [`ReaderDecoder`]
pub type DecodeFn = fn(&mut dyn Read) -> Result<Partial>;

/// Decoder that pairs a reader with a format-specific parse function
pub struct ReaderDecoder {
    reader: Option<Reader>,
    decode_fn: DecodeFn,
}

impl ReaderDecoder {
    /// Wrap `reader` with `decode_fn`
    pub fn new(reader: Reader, decode_fn: DecodeFn) -> Self {
        Self {
            reader: Some(reader),
            decode_fn,
        }
    }
}

impl Decoder for ReaderDecoder {
    fn decode(&mut self) -> Result<Partial> {
        let reader = self.reader.as_mut().ok_or(StrataError::DecoderClosed)?;
        (self.decode_fn)(reader.as_mut())
    }

    fn close(&mut self) -> Result<()> {
        self.reader.take();
        Ok(())
    }
}

/// Ordered list of decoder strategies
pub struct DecoderFactory {
    strategies: Vec<Box<dyn DecoderStrategy>>,
}

impl DecoderFactory {
    /// Factory without any strategy
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy; earlier strategies take precedence
    pub fn register(&mut self, strategy: Box<dyn DecoderStrategy>) {
        self.strategies.push(strategy);
    }

    /// Whether any strategy accepts `format`
    pub fn supports(&self, format: &str) -> bool {
        self.strategies.iter().any(|s| s.accept(format))
    }

    /// Create a decoder for `format` reading from `reader`
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidDecoderFormat`] when no strategy accepts
    /// the format.
    pub fn create(&self, format: &str, reader: Reader) -> Result<Box<dyn Decoder>> {
        self.strategies
            .iter()
            .find(|s| s.accept(format))
            .ok_or_else(|| StrataError::InvalidDecoderFormat(format.to_string()))?
            .create(reader)
    }

    /// Create a decoder, decode once and close it
    pub fn decode(&self, format: &str, reader: Reader) -> Result<Partial> {
        let mut decoder = self.create(format, reader)?;
        let decoded = decoder.decode();
        decoder.close()?;
        decoded
    }
}

impl Default for DecoderFactory {
    fn default() -> Self {
        let mut factory = Self::new();
        factory.register(Box::new(JsonDecoderStrategy));
        factory.register(Box::new(YamlDecoderStrategy));
        factory.register(Box::new(TomlDecoderStrategy));
        factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lookup;

    struct ShoutingStrategy;

    impl DecoderStrategy for ShoutingStrategy {
        fn accept(&self, format: &str) -> bool {
            format == "json"
        }

        fn create(&self, reader: Reader) -> Result<Box<dyn Decoder>> {
            Ok(Box::new(ReaderDecoder::new(reader, |_| {
                let mut tree = Partial::new();
                tree.insert("shout", true);
                Ok(tree)
            })))
        }
    }

    #[test]
    fn test_default_factory_formats() {
        let factory = DecoderFactory::default();
        assert!(factory.supports("json"));
        assert!(factory.supports("yaml"));
        assert!(factory.supports("toml"));
        assert!(!factory.supports("JSON"));
    }

    #[test]
    fn test_unknown_format() {
        let factory = DecoderFactory::default();
        let result = factory.create("ini", Box::new("".as_bytes()));
        assert!(matches!(
            result,
            Err(StrataError::InvalidDecoderFormat(ref f)) if f == "ini"
        ));
    }

    #[test]
    fn test_first_accepting_strategy_wins() {
        let mut factory = DecoderFactory::new();
        factory.register(Box::new(ShoutingStrategy));
        factory.register(Box::new(JsonDecoderStrategy));

        let tree = factory
            .decode("json", Box::new(r#"{"a": 1}"#.as_bytes()))
            .unwrap();
        assert!(tree.bool("shout").unwrap());
        assert!(!tree.has("a"));
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let factory = DecoderFactory::default();
        let mut decoder = factory
            .create("json", Box::new(r#"{"a": 1}"#.as_bytes()))
            .unwrap();
        decoder.close().unwrap();
        decoder.close().unwrap();
        assert!(matches!(decoder.decode(), Err(StrataError::DecoderClosed)));
    }
}
