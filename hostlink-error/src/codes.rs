// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for hostlink
//!
//! Codes are grouped by category in ranges of one thousand.

// Memory error codes (1000-1999)
/// Access outside the current linear memory
pub const MEMORY_OUT_OF_BOUNDS: u16 = 1000;
/// Access through a view whose buffer was detached by growth
pub const DETACHED_BUFFER: u16 = 1001;
/// Linear memory could not be grown
pub const MEMORY_GROW_ERROR: u16 = 1002;
/// Module allocator returned an unusable pointer
pub const ALLOCATION_FAILED: u16 = 1004;

// Parse / encoding error codes (2000-2999)
/// Malformed UTF-8 presented for decoding
pub const INVALID_UTF8: u16 = 2000;
/// Length arithmetic overflowed while encoding
pub const ENCODING_OVERFLOW: u16 = 2001;
/// Configuration document could not be parsed
pub const CONFIG_PARSE_ERROR: u16 = 2002;

// Contract violation codes (3000-3999)
/// Handle does not name a live heap slot
pub const INVALID_HANDLE: u16 = 3000;
/// Handle released twice
pub const DOUBLE_RELEASE: u16 = 3001;
/// Closure invoked while its context was borrowed by an outer call
pub const CLOSURE_REENTERED: u16 = 3002;
/// Closure invoked or released after its destructor ran
pub const CLOSURE_RELEASED: u16 = 3003;
/// Out-parameter pointer violates the ABI
pub const INVALID_RETURN_SLOT: u16 = 3004;

// Resource error codes (4000-4999)
/// Heap table capacity exhausted
pub const HANDLE_LIMIT_EXCEEDED: u16 = 4000;

// Runtime error codes (5000-5999)
/// General runtime error
pub const RUNTIME_ERROR: u16 = 5000;
/// Import function not registered
pub const IMPORT_NOT_FOUND: u16 = 5001;
/// Module export not found
pub const EXPORT_NOT_FOUND: u16 = 5002;
/// Module code trapped
pub const MODULE_TRAP: u16 = 5003;
/// Module raised an error through the throw intrinsic
pub const MODULE_THROW: u16 = 5004;

// Type error codes (6000-6999)
/// Value had the wrong type for the operation
pub const TYPE_MISMATCH: u16 = 6000;
/// Import called with the wrong argument count or kind
pub const INVALID_ARGUMENT: u16 = 6001;

// State error codes (7000-7999)
/// Operation not valid in the current lifecycle state
pub const INVALID_STATE: u16 = 7000;
