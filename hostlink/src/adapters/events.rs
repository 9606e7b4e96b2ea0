// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Event adapters.

use hostlink_error::Result;

use crate::{facilities, value::HostValue, Bridge};

impl Bridge {
    /// `new CustomEvent(type, init)`. Guarded; 0 on throw.
    ///
    /// # Errors
    ///
    /// Fails for dead handles, bad strings or a full table
    pub fn custom_event_new(&self, type_ptr: u32, type_len: u32, init: u32) -> Result<u32> {
        let event_type = self.str_arg(type_ptr, type_len)?;
        let init = self.arg(init)?;
        self.guard("custom_event_new", || {
            let event = facilities::custom_event(&event_type, &init)?;
            Ok(self.allocate(HostValue::Object(event))?.index())
        })
    }

    /// `target.addEventListener(type, listener)`. Guarded.
    ///
    /// # Errors
    ///
    /// Fails for dead handles, bad strings or traps
    pub fn add_event_listener(
        &self,
        target: u32,
        type_ptr: u32,
        type_len: u32,
        listener: u32,
    ) -> Result<()> {
        let target = self.arg(target)?;
        let event_type = self.str_arg(type_ptr, type_len)?;
        let listener = self.arg(listener)?;
        self.guard("add_event_listener", || {
            self.invoke_method(&target, "addEventListener", &[HostValue::string(event_type), listener])
                .map(drop)
        })
    }

    /// `target.dispatchEvent(event)`. Guarded; `false` on throw.
    ///
    /// # Errors
    ///
    /// Fails for dead handles or traps
    pub fn dispatch_event(&self, target: u32, event: u32) -> Result<bool> {
        let target = self.arg(target)?;
        let event = self.arg(event)?;
        self.guard("dispatch_event", || {
            let result = self.invoke_method(&target, "dispatchEvent", &[event])?;
            Ok(result.as_bool().unwrap_or(false))
        })
    }
}
