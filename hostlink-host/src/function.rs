// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Import function handlers.
//!
//! This module provides types for representing host functions that can be
//! called from module code.

use core::any::Any;

use hostlink_error::Result;

use crate::value::Val;

/// A trait for functions that can be cloned and operate on `Vec<Val>`.
/// This is used for storing import functions that module code calls into.
pub trait FnWithVecValue: Send + Sync {
    /// Calls the function with the given target and arguments.
    fn call(&self, target: &dyn Any, args: Vec<Val>) -> Result<Vec<Val>>;

    /// Clones the function into a `Box`.
    fn clone_box(&self) -> Box<dyn FnWithVecValue>;
}

impl<F> FnWithVecValue for F
where
    F: Fn(&dyn Any, Vec<Val>) -> Result<Vec<Val>> + Send + Sync + Clone + 'static,
{
    fn call(&self, target: &dyn Any, args: Vec<Val>) -> Result<Vec<Val>> {
        self(target, args)
    }

    fn clone_box(&self) -> Box<dyn FnWithVecValue> {
        Box::new(self.clone())
    }
}

/// A wrapper struct that makes a closure implementing `Fn` cloneable
/// by boxing it and handling the cloning via the `FnWithVecValue` trait.
pub struct CloneableFn(Box<dyn FnWithVecValue>);

impl CloneableFn {
    /// Creates a new `CloneableFn` from a closure.
    ///
    /// The closure must be `Send`, `Sync`, `Clone`, and `'static`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Any, Vec<Val>) -> Result<Vec<Val>> + Send + Sync + Clone + 'static,
    {
        Self(Box::new(f))
    }

    /// Calls the wrapped function.
    ///
    /// The target is shared rather than exclusive: an import may call back
    /// into module code, which may call the same import again.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by the handler
    pub fn call(&self, target: &dyn Any, args: Vec<Val>) -> Result<Vec<Val>> {
        self.0.call(target, args)
    }
}

impl Clone for CloneableFn {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

/// Host function handler type for implementing module imports
pub type HostFunctionHandler = CloneableFn;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloneable_fn() {
        let f = CloneableFn::new(|_, _| Ok(vec![Val::I32(42)]));
        let f2 = f.clone();

        let target = ();
        let result = f.call(&target, vec![]);
        let result2 = f2.call(&target, vec![]);

        assert_eq!(result.unwrap(), vec![Val::I32(42)]);
        assert_eq!(result2.unwrap(), vec![Val::I32(42)]);
    }

    #[test]
    fn test_handler_receives_arguments() {
        let handler = HostFunctionHandler::new(|_, args: Vec<Val>| {
            let sum: i32 = args
                .iter()
                .map(|v| match v {
                    Val::I32(i) => *i,
                    _ => 0,
                })
                .sum();
            Ok(vec![Val::I32(sum)])
        });

        let target = ();
        let result = handler.call(&target, vec![Val::I32(40), Val::I32(2)]);
        assert_eq!(result.unwrap(), vec![Val::I32(42)]);
    }

    #[test]
    fn test_handler_downcasts_target() {
        let handler = HostFunctionHandler::new(|target: &dyn Any, _| {
            let base = target.downcast_ref::<i32>().copied().unwrap_or_default();
            Ok(vec![Val::I32(base + 1)])
        });

        let target = 41_i32;
        assert_eq!(handler.call(&target, vec![]).unwrap(), vec![Val::I32(42)]);
    }
}
