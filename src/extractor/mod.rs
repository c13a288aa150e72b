//! Binding extraction module.
//!
//! This module turns raw captured frames into address-claim outcomes.

mod binding_extractor;

pub use binding_extractor::BindingExtractor;
