//! Core message model: addresses, capability sets, the message traits and summaries.

pub mod address;
pub mod capability;
pub mod message;
pub mod summary;
