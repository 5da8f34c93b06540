//! The composition model and its derivation from settings.

mod build;
pub mod model;

pub use build::{
    LOGO_FADE_FRAMES, OWNER_LOGO_ASSET, PARTNER_LOGO_ASSET, PERSON_FADE_FRAMES, PERSON_IMAGE_ASSET,
    QUOTE_BLOCK_ANCHOR, QUOTE_TEXT_LEAD, TYPING_CHARS_PER_FRAME,
};
