#![forbid(unsafe_code)]
//! ACE — the AMM CODEC Engine. A text/binary codec for DTNMA ARIs,
//! validated against ADM catalogs. See the module docs on [`value`],
//! [`registry`], [`catalog`], [`text`], [`cbor`], and [`transcoder`] for the
//! six components that make up the core.

pub mod catalog;
pub mod cbor;
pub mod error;
pub mod registry;
pub mod text;
pub mod transcoder;
pub mod value;

pub use error::{AceError, Position, Result};
pub use transcoder::{Form, Input, Rendered, Transcoder};
pub use value::Value;
