//! Concrete message variants.
//!
//! | Variant            | Reads                          | Writes |
//! |--------------------|--------------------------------|--------|
//! | [`FeedMessage`]    | link, preview                  | none   |
//! | [`ParsedMessage`]  | to, cc, preview, content text  | none   |
//! | [`ComposeMessage`] | to, cc, content text           | all    |
//!
//! [`FeedMessage`]: feed::FeedMessage
//! [`ParsedMessage`]: parsed::ParsedMessage
//! [`ComposeMessage`]: compose::ComposeMessage

pub mod compose;
pub mod feed;
pub mod parsed;

use crate::model::capability::Capabilities;

/// Every variant with its name and capability set, for listings.
pub fn catalog() -> [(&'static str, Capabilities); 3] {
    [
        ("feed", feed::FeedMessage::CAPABILITIES),
        ("parsed", parsed::ParsedMessage::CAPABILITIES),
        ("compose", compose::ComposeMessage::CAPABILITIES),
    ]
}
