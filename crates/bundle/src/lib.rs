//! Bundle model and validator.
//!
//! Contains the [`BundleDocument`] submission format, the validated
//! [`Bundle`] it produces, and [`DecodedTransaction`], a signature-recovered
//! transaction with the accessors the executor needs.
//!
//! Validation is all-or-nothing and fails fast: [`parse_and_validate`]
//! returns the first violated check as a [`ValidationError`].

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod bundle;
pub use bundle::{parse_and_validate, Bundle};

mod decoded;
pub use decoded::DecodedTransaction;

mod document;
pub use document::{BlockNumberField, BundleDocument};

mod error;
pub use error::{TxDecodeError, ValidationError};

#[cfg(test)]
pub(crate) mod test_utils;
