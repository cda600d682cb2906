//! v1 API Data Transfer Objects.
//!
//! Wire types for the v1 REST API, kept apart from the `ocr` domain types.

pub mod ocr;

pub use ocr::*;
