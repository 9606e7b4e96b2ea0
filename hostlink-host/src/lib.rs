// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

//! Import function infrastructure for the hostlink module bridge.
//!
//! This crate provides the registry through which a sandboxed module reaches
//! host functions. A module can only pass core numeric values, so every
//! import receives a `Vec<Val>` and returns one.
//!
//! ## Usage
//!
//! ```rust
//! use hostlink_host::{HostBuilder, HostFunctionHandler, Val};
//!
//! let registry = HostBuilder::new()
//!     .with_host_function("env", "answer",
//!         HostFunctionHandler::new(|_, _| Ok(vec![Val::I32(42)])))
//!     .with_module_name("my_module")
//!     .build()
//!     .expect("Failed to build host");
//!
//! let result = registry.call_host_function(&(), "env", "answer", vec![]);
//! assert_eq!(result.unwrap(), vec![Val::I32(42)]);
//! ```

#![warn(clippy::missing_panics_doc)]

pub mod builder;
pub mod callback;
pub mod function;
pub mod value;

pub use builder::HostBuilder;
pub use callback::{function_key, CallbackRegistry, CallbackType};
pub use function::{CloneableFn, HostFunctionHandler};
pub use value::{arg_f64, arg_u32, Val};
