// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error types for the module bridge.

use core::fmt;

use crate::codes;

/// `Error` categories for bridge operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Linear memory errors (bounds, detached buffers, growth)
    Memory       = 1,
    /// Decoding and parsing errors
    Parse        = 2,
    /// Boundary contract violations (invalid handles, double release)
    Contract     = 3,
    /// Resource exhaustion
    Resource     = 4,
    /// Runtime errors (general)
    Runtime      = 5,
    /// Type errors
    Type         = 6,
    /// Invalid lifecycle state
    InvalidState = 7,
}

/// hostlink `Error` type
///
/// Every error is fatal for the call path it occurs on. Host exceptions are
/// not errors in this sense; they travel through the exception slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code:     u16,
    /// `Error` message
    pub message:  &'static str,
}

impl Error {
    /// Create a new error.
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self {
            category,
            code,
            message,
        }
    }

    // Factory methods

    /// Create a memory out-of-bounds error
    #[must_use]
    pub const fn memory_out_of_bounds(message: &'static str) -> Self {
        Self::new(ErrorCategory::Memory, codes::MEMORY_OUT_OF_BOUNDS, message)
    }

    /// Create a detached buffer error
    #[must_use]
    pub const fn detached_buffer(message: &'static str) -> Self {
        Self::new(ErrorCategory::Memory, codes::DETACHED_BUFFER, message)
    }

    /// Create a memory grow error
    #[must_use]
    pub const fn memory_grow_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Memory, codes::MEMORY_GROW_ERROR, message)
    }

    /// Create an allocation failed error
    #[must_use]
    pub const fn allocation_failed(message: &'static str) -> Self {
        Self::new(ErrorCategory::Memory, codes::ALLOCATION_FAILED, message)
    }

    /// Create an invalid UTF-8 error
    #[must_use]
    pub const fn invalid_utf8(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, codes::INVALID_UTF8, message)
    }

    /// Create an encoding overflow error
    #[must_use]
    pub const fn encoding_overflow(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, codes::ENCODING_OVERFLOW, message)
    }

    /// Create a configuration parse error
    #[must_use]
    pub const fn config_parse_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, codes::CONFIG_PARSE_ERROR, message)
    }

    /// Create an invalid handle error
    #[must_use]
    pub const fn invalid_handle(message: &'static str) -> Self {
        Self::new(ErrorCategory::Contract, codes::INVALID_HANDLE, message)
    }

    /// Create a double release error
    #[must_use]
    pub const fn double_release(message: &'static str) -> Self {
        Self::new(ErrorCategory::Contract, codes::DOUBLE_RELEASE, message)
    }

    /// Create a closure reentered error
    #[must_use]
    pub const fn closure_reentered(message: &'static str) -> Self {
        Self::new(ErrorCategory::Contract, codes::CLOSURE_REENTERED, message)
    }

    /// Create a closure released error
    #[must_use]
    pub const fn closure_released(message: &'static str) -> Self {
        Self::new(ErrorCategory::Contract, codes::CLOSURE_RELEASED, message)
    }

    /// Create an invalid return slot error
    #[must_use]
    pub const fn invalid_return_slot(message: &'static str) -> Self {
        Self::new(ErrorCategory::Contract, codes::INVALID_RETURN_SLOT, message)
    }

    /// Create a handle limit exceeded error
    #[must_use]
    pub const fn handle_limit_exceeded(message: &'static str) -> Self {
        Self::new(ErrorCategory::Resource, codes::HANDLE_LIMIT_EXCEEDED, message)
    }

    /// Create a runtime error
    #[must_use]
    pub const fn runtime_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::RUNTIME_ERROR, message)
    }

    /// Create an import not found error
    #[must_use]
    pub const fn import_not_found(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::IMPORT_NOT_FOUND, message)
    }

    /// Create an export not found error
    #[must_use]
    pub const fn export_not_found(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::EXPORT_NOT_FOUND, message)
    }

    /// Create a module trap error
    #[must_use]
    pub const fn module_trap(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::MODULE_TRAP, message)
    }

    /// Create a module throw error
    #[must_use]
    pub const fn module_throw(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::MODULE_THROW, message)
    }

    /// Create a type mismatch error
    #[must_use]
    pub const fn type_mismatch(message: &'static str) -> Self {
        Self::new(ErrorCategory::Type, codes::TYPE_MISMATCH, message)
    }

    /// Create an invalid argument error
    #[must_use]
    pub const fn invalid_argument(message: &'static str) -> Self {
        Self::new(ErrorCategory::Type, codes::INVALID_ARGUMENT, message)
    }

    /// Create an invalid state error
    #[must_use]
    pub const fn invalid_state(message: &'static str) -> Self {
        Self::new(ErrorCategory::InvalidState, codes::INVALID_STATE, message)
    }

    /// Check if this is a memory error
    #[must_use]
    pub fn is_memory_error(&self) -> bool {
        self.category == ErrorCategory::Memory
    }

    /// Check if this is a parse error
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        self.category == ErrorCategory::Parse
    }

    /// Check if this is a contract violation
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        self.category == ErrorCategory::Contract
    }

    /// Check if this is a resource error
    #[must_use]
    pub fn is_resource_error(&self) -> bool {
        self.category == ErrorCategory::Resource
    }

    /// Check if this is a runtime error
    #[must_use]
    pub fn is_runtime_error(&self) -> bool {
        self.category == ErrorCategory::Runtime
    }

    /// Check if this is a type error
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        self.category == ErrorCategory::Type
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}][E{:04X}] {}", self.category, self.code, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::runtime_error("Formatting error")
    }
}
