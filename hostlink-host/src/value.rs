// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Core values exchanged with module code.
//!
//! A module can only pass numbers across the boundary. Handles and pointers
//! travel as `i32` and are reinterpreted as unsigned on the host side.

use core::fmt;

use hostlink_error::{Error, Result};

/// A core value as seen by an import function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Val {
    /// 32-bit integer (also handles and pointers)
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
}

impl Val {
    /// Wrap an unsigned 32-bit quantity (handle, pointer, length)
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self::I32(value as i32)
    }

    /// Wrap a boolean as `0`/`1`
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        Self::I32(value as i32)
    }

    /// Interpret as an unsigned 32-bit quantity
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an `i32`
    pub fn as_u32(&self) -> Result<u32> {
        match self {
            Self::I32(v) => Ok(*v as u32),
            _ => Err(Error::invalid_argument("Expected an i32 argument")),
        }
    }

    /// Interpret as a float, widening `f32`
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a float
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Self::F64(v) => Ok(*v),
            Self::F32(v) => Ok(f64::from(*v)),
            _ => Err(Error::invalid_argument("Expected a float argument")),
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "i32:{v}"),
            Self::I64(v) => write!(f, "i64:{v}"),
            Self::F32(v) => write!(f, "f32:{v}"),
            Self::F64(v) => write!(f, "f64:{v}"),
        }
    }
}

/// Fetch argument `index` as an unsigned 32-bit quantity
///
/// # Errors
///
/// Returns an error if the argument is missing or not an `i32`
pub fn arg_u32(args: &[Val], index: usize) -> Result<u32> {
    args.get(index)
        .ok_or(Error::invalid_argument("Missing import argument"))?
        .as_u32()
}

/// Fetch argument `index` as a float
///
/// # Errors
///
/// Returns an error if the argument is missing or not a float
pub fn arg_f64(args: &[Val], index: usize) -> Result<f64> {
    args.get(index)
        .ok_or(Error::invalid_argument("Missing import argument"))?
        .as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_round_trip() {
        let val = Val::from_u32(0xFFFF_FFF0);
        assert_eq!(val, Val::I32(-16));
        assert_eq!(val.as_u32().unwrap(), 0xFFFF_FFF0);
    }

    #[test]
    fn test_argument_helpers() {
        let args = [Val::I32(7), Val::F32(1.5), Val::F64(2.25)];
        assert_eq!(arg_u32(&args, 0).unwrap(), 7);
        assert_eq!(arg_f64(&args, 1).unwrap(), 1.5);
        assert_eq!(arg_f64(&args, 2).unwrap(), 2.25);
        assert!(arg_u32(&args, 1).is_err());
        assert!(arg_u32(&args, 3).is_err());
    }
}
