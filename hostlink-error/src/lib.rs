// hostlink - hostlink-error
// Module: Bridge Error Handling
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! hostlink error handling library
//!
//! Errors are organized into categories, each with its own range of codes:
//!
//! ## Memory Errors (1000-1999)
//! - Out-of-bounds access to linear memory
//! - Access through a detached (pre-growth) buffer
//! - Growth failures
//!
//! ## Parse Errors (2000-2999)
//! - Malformed UTF-8 handed across the boundary
//!
//! ## Contract Violations (3000-3999)
//! - Invalid or double-released handles
//! - Reentrant closure misuse
//!
//! ## Resource, Runtime, Type and State Errors (4000-7999)
//!
//! # Usage
//!
//! ```
//! use hostlink_error::{codes, Error, ErrorCategory};
//!
//! let error = Error::new(
//!     ErrorCategory::Contract,
//!     codes::INVALID_HANDLE,
//!     "Handle 42 is not live",
//! );
//! assert!(error.is_contract_violation());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error codes for hostlink
pub mod codes;
/// Error and error handling types
pub mod errors;

pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for bridge operations.
pub type Result<T> = core::result::Result<T, Error>;
