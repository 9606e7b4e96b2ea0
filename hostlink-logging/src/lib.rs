//! # hostlink Logging
//!
//! Logging infrastructure for the hostlink module bridge.
//!
//! Module code writes console-style messages through the bridge; this crate
//! turns them into [`LogOperation`]s and hands them to a handler stored in
//! the import registry, or to the `log` facade when no handler is set.

// hostlink - hostlink-logging
// Module: Logging Infrastructure
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

pub use hostlink_error::{Error, Result};
pub use hostlink_host::CallbackRegistry;

/// Logging handlers for processing log messages.
pub mod handler;

/// Log level definitions for categorizing message severity.
pub mod level;

/// Log operation data structures.
pub mod operation;

pub use handler::{forward_to_facade, LogHandler, LoggingExt};
pub use level::LogLevel;
pub use operation::LogOperation;
