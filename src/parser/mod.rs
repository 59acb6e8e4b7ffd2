//! Message parsing: `.eml` files and MIME decoding into [`crate::variant::parsed::ParsedMessage`].

pub mod eml;
pub mod mime;
