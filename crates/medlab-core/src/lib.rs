//! Domain vocabulary and range-resolution rules for the MedLAB+ backend.
//!
//! Everything here is pure and synchronous: the vocabulary mappings between
//! storage, internal, and external representations; the four-state order
//! lifecycle; and the reference-range resolver used when orders snapshot
//! their normal-range text.

pub mod error;
pub mod range;
pub mod vocab;

pub use error::{CoreError, Result};
pub use range::{
    CatalogRange, ReferenceRange, ResolvedRange, bucket_display_text, format_bound,
    resolve_for_snapshot,
};
pub use vocab::{Gender, GenderBucket, OrderStatus, Priority, ResultFlag};
