// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Import adapters.
//!
//! Each adapter is a method on [`Bridge`](crate::Bridge) with the module-side
//! signature: handles, pointers and lengths in, a handle, number, flag or
//! nothing out. Adapters that call host code which may throw run under
//! [`Bridge::guard`](crate::Bridge::guard) and return 0, `false` or nothing
//! with the exception parked for [`Bridge::exn_take`](crate::Bridge::exn_take).
//! Value arguments are borrowed unless an adapter documents that it consumes
//! the handle.

mod events;
mod intrinsics;
mod object;
mod storage;

use hostlink_error::Result;

use crate::{heap::Handle, value::HostValue, Bridge};

impl Bridge {
    /// Clone the value behind a raw handle
    pub(crate) fn arg(&self, raw: u32) -> Result<HostValue> {
        self.object(Handle::new(raw))
    }

    /// Decode a `(ptr, len)` string argument
    pub(crate) fn str_arg(&self, ptr: u32, len: u32) -> Result<String> {
        self.decode_string(ptr, len)
    }
}
