// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Key-value storage adapters.

use hostlink_error::Result;

use crate::{value::HostValue, Bridge};

impl Bridge {
    /// `storage.getItem(key)` written as an optional string at `retptr`.
    /// Guarded; nothing is written on throw.
    ///
    /// # Errors
    ///
    /// Fails for dead handles, bad strings, allocator failures or a bad
    /// return slot
    pub fn storage_get_item(
        &self,
        retptr: u32,
        storage: u32,
        key_ptr: u32,
        key_len: u32,
    ) -> Result<()> {
        let storage = self.arg(storage)?;
        let key = self.str_arg(key_ptr, key_len)?;
        self.guard("storage_get_item", || {
            let item = self.invoke_method(&storage, "getItem", &[HostValue::string(key)])?;
            let text = match item {
                HostValue::Undefined | HostValue::Null => None,
                other => Some(other.to_display_string()),
            };
            Ok(self.write_string_result(retptr, text.as_deref())?)
        })
    }

    /// `storage.setItem(key, value)`. Guarded; a quota overrun is parked as
    /// a `QuotaExceededError`.
    ///
    /// # Errors
    ///
    /// Fails for dead handles, bad strings or traps
    pub fn storage_set_item(
        &self,
        storage: u32,
        key_ptr: u32,
        key_len: u32,
        value_ptr: u32,
        value_len: u32,
    ) -> Result<()> {
        let storage = self.arg(storage)?;
        let key = self.str_arg(key_ptr, key_len)?;
        let value = self.str_arg(value_ptr, value_len)?;
        self.guard("storage_set_item", || {
            self.invoke_method(&storage, "setItem", &[HostValue::string(key), HostValue::string(value)])
                .map(drop)
        })
    }
}
