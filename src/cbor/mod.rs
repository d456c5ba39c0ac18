//! The binary codec: a hand-rolled CBOR (RFC 8949) reader and
//! writer, plus the `Value` encode/decode logic built on top of them.

pub mod decoder;
pub mod encoder;
pub mod reader;
pub mod writer;

pub use decoder::decode;
pub use encoder::encode;
