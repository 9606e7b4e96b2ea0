// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! UTF-8 transfer of strings across the module boundary.
//!
//! Decoding is strict: malformed input fails instead of being replaced.
//! Encoding allocates through the module's own allocator. With a reallocator
//! available, the string is scanned for its ASCII prefix first. An all-ASCII
//! string gets one exact allocation. Otherwise the first allocation holds the
//! prefix plus one byte per remaining character, is grown to the worst case
//! for the remainder and shrunk to the exact length at the end.

use hostlink_error::{Error, Result};
use log::trace;

use crate::memory::ViewCache;

/// Longest UTF-8 encoding of a single character
pub const MAX_UTF8_LEN: u32 = 4;

/// Location of an encoded string in module memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    /// Start of the bytes
    pub ptr: u32,
    /// Length in bytes
    pub len: u32,
}

/// Module allocator entry point: `size -> ptr`
pub type Malloc<'a> = &'a mut dyn FnMut(u32) -> Result<u32>;

/// Module reallocator entry point: `(ptr, old_size, new_size) -> ptr`
pub type Realloc<'a> = &'a mut dyn FnMut(u32, u32, u32) -> Result<u32>;

fn to_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::encoding_overflow("String does not fit in memory"))
}

/// Decode `len` bytes at `ptr` as UTF-8
///
/// # Errors
///
/// Returns a parse error for malformed UTF-8 and a memory error when the range
/// is out of bounds
pub fn decode(views: &ViewCache, ptr: u32, len: u32) -> Result<String> {
    let decoded = views.byte_view().with_bytes(ptr, len, |bytes| {
        core::str::from_utf8(bytes).map(str::to_owned)
    })?;
    decoded.map_err(|_| Error::invalid_utf8("Malformed UTF-8 in module string"))
}

/// Encode `s` into freshly allocated module memory.
///
/// Without `realloc` the exact byte length is allocated up front. Characters
/// are counted only after the first non-ASCII byte. Views are re-fetched
/// after every allocator call since the allocator may grow memory.
///
/// # Errors
///
/// Propagates allocator failures and memory errors, and fails with
/// an encoding overflow for strings that cannot be addressed with 32 bits
pub fn encode(
    views: &ViewCache,
    s: &str,
    malloc: Malloc<'_>,
    realloc: Option<Realloc<'_>>,
    ascii_fast_path: bool,
) -> Result<Encoded> {
    let bytes = s.as_bytes();
    let Some(realloc) = realloc.filter(|_| ascii_fast_path) else {
        let len = to_len(bytes.len())?;
        let ptr = malloc(len)?;
        views.byte_view().write(ptr, bytes)?;
        return Ok(Encoded { ptr, len });
    };

    let ascii = bytes.iter().take_while(|b| b.is_ascii()).count();
    let written = to_len(ascii)?;
    if ascii == bytes.len() {
        let ptr = malloc(written)?;
        views.byte_view().write(ptr, bytes)?;
        return Ok(Encoded { ptr, len: written });
    }

    // Characters are only counted past the ASCII prefix
    let remaining_chars = to_len(s[ascii..].chars().count())?;
    let capacity = written
        .checked_add(remaining_chars)
        .ok_or(Error::encoding_overflow("String does not fit in memory"))?;
    let mut ptr = malloc(capacity)?;
    views.byte_view().write(ptr, &bytes[..ascii])?;

    let rest = &bytes[ascii..];
    let grown = remaining_chars
        .checked_mul(MAX_UTF8_LEN)
        .and_then(|n| n.checked_add(written))
        .ok_or(Error::encoding_overflow("String does not fit in memory"))?;
    trace!("transcode: non-ASCII at byte {written}, growing {capacity} -> {grown}");
    ptr = realloc(ptr, capacity, grown)?;

    let offset = ptr
        .checked_add(written)
        .ok_or(Error::memory_out_of_bounds("String offset overflow"))?;
    views.byte_view().write(offset, rest)?;
    let len = written + to_len(rest.len())?;

    if len != grown {
        ptr = realloc(ptr, grown, len)?;
    }

    Ok(Encoded { ptr, len })
}
