// hostlink - hostlink
// Module: Module/Host Bridge
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! # hostlink
//!
//! Glue between a compiled module that can only exchange numbers and a host
//! whose values are strings, objects and callables.
//!
//! The pieces:
//!
//! - [`HeapTable`]: host values addressed by integer [`Handle`]s, with
//!   sentinels for `undefined`, `null`, `true` and `false`
//! - [`ViewCache`]: byte and word views over linear memory that are rebuilt
//!   after the memory grows
//! - [`transcode`]: UTF-8 string transfer using the module's allocator
//! - [`Trampoline`]: host-callable wrappers around module closures with
//!   reentrancy protection and a one-shot destructor
//! - [`Bridge`]: the per-instance context and the import adapters
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use hostlink::{facilities, Bridge, BridgeConfig, NativeModule, VecMemory};
//! use hostlink_host::Val;
//!
//! let memory = Rc::new(VecMemory::new(1, None));
//! let module = Rc::new(NativeModule::new(memory.clone()));
//! let (ptr, len) = module.alloc_bytes(b"hello").unwrap();
//!
//! let bridge = Bridge::new(memory, module, facilities::window(1024), BridgeConfig::default());
//! let result = bridge
//!     .call_import("string_new", vec![Val::from_u32(ptr), Val::from_u32(len)])
//!     .unwrap();
//! let handle = result[0].as_u32().unwrap();
//! assert_eq!(bridge.object(hostlink::Handle::new(handle)).unwrap(), "hello".into());
//! ```

#![forbid(unsafe_code)]

mod adapters;
pub mod bridge;
pub mod closure;
pub mod config;
pub mod debug;
pub mod exception;
pub mod facilities;
pub mod heap;
pub mod imports;
pub mod memory;
pub mod module;
pub mod native;
pub mod transcode;
pub mod value;

pub use bridge::Bridge;
pub use closure::{ClosureExports, ContextSlot, Trampoline};
pub use config::BridgeConfig;
pub use exception::ExceptionSlot;
pub use heap::{Handle, HeapTable};
pub use hostlink_error::{Error, ErrorCategory, Result};
pub use memory::{ByteView, Int32View, LinearMemory, MemoryBuffer, VecMemory, ViewCache, PAGE_SIZE};
pub use module::ModuleExports;
pub use native::{AllocStats, NativeModule};
pub use transcode::Encoded;
pub use value::{Completion, Fault, HostFunction, HostObject, HostValue};
