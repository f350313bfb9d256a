//! Domain types for Strata.
//!
//! - [`Value`] and [`Partial`] - the configuration tree and its nodes
//! - [`Lookup`] - typed path accessors shared by trees, sources and the manager
//! - [`StrataError`] and [`Result`] - the error hierarchy
//!
//! ```rust
//! use strata::domain::{Lookup, Partial, Value};
//!
//! let mut base = Partial::new();
//! base.set_with("server.port", ".", Value::Int(8080)).unwrap();
//!
//! let mut overrides = Partial::new();
//! overrides.set_with("server.host", ".", Value::from("0.0.0.0")).unwrap();
//!
//! base.merge(&overrides);
//! assert_eq!(base.int("server.port").unwrap(), 8080);
//! assert_eq!(base.string("server.host").unwrap(), "0.0.0.0");
//! ```

pub mod errors;
pub mod lookup;
pub mod partial;
pub mod result;
pub mod value;

pub use errors::StrataError;
pub use lookup::Lookup;
pub use partial::{segments, Partial, DEFAULT_SEPARATOR};
pub use result::Result;
pub use value::Value;
