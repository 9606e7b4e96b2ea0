// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Host-callable wrappers around module closures.
//!
//! A module closure is a context pair `(a, b)` plus two table entries: an
//! invoke shim and a destructor. The trampoline keeps a reference count of one
//! for the host's own reference plus one per in-flight call. While a call is
//! running the context is lent out; reentrant calls fail. The destructor runs
//! exactly once, when the last reference goes away.

use std::{cell::RefCell, mem};

use hostlink_error::{Error, Result};
use hostlink_host::Val;
use log::{debug, warn};

use crate::{
    bridge::Bridge,
    heap::Handle,
    value::{Completion, Fault, HostValue},
};

/// Where the closure's primary context word currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSlot {
    /// Held by the trampoline
    Owned(u32),
    /// Lent to an in-flight call
    Borrowed,
    /// The destructor has run
    Released,
}

/// Table indices of a closure's exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureExports {
    /// Shim called with `(a, b, arg handles...)`
    pub invoke: u32,
    /// Called once with `(a, b)`
    pub destructor: u32,
}

#[derive(Debug)]
struct ClosureState {
    context: ContextSlot,
    env: u32,
    refcount: u32,
    /// Whether the host's own reference is still held
    alive: bool,
    exports: ClosureExports,
}

/// Host-callable wrapper for a module closure
#[derive(Debug)]
pub struct Trampoline {
    state: RefCell<ClosureState>,
}

impl Trampoline {
    /// Wrap the context pair `(a, b)`
    #[must_use]
    pub fn new(a: u32, b: u32, exports: ClosureExports) -> Self {
        Self {
            state: RefCell::new(ClosureState {
                context: ContextSlot::Owned(a),
                env: b,
                refcount: 1,
                alive: true,
                exports,
            }),
        }
    }

    /// Current context slot
    #[must_use]
    pub fn context(&self) -> ContextSlot {
        self.state.borrow().context
    }

    /// Current reference count
    #[must_use]
    pub fn refcount(&self) -> u32 {
        self.state.borrow().refcount
    }

    /// Whether the destructor has run
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.context() == ContextSlot::Released
    }

    /// Call the closure with host arguments.
    ///
    /// Each argument is placed in a fresh handle owned by the callee. A
    /// returned word is taken as a handle to the result; no return value
    /// means `undefined`. Cleanup runs on every path.
    ///
    /// # Errors
    ///
    /// Traps when the closure has been released, when it is re-entered, or
    /// when the module call fails
    pub fn invoke(&self, bridge: &Bridge, args: &[HostValue]) -> Completion {
        let (lent, env, exports) = self.enter()?;
        let result = match lent {
            Some(a) => self.call_module(bridge, a, env, exports.invoke, args),
            None => Err(Fault::Trap(Error::closure_reentered("Closure invoked recursively"))),
        };
        match (result, self.leave(bridge, lent)) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(Fault::Trap(e)),
            (Err(fault), Ok(())) => Err(fault),
            (Err(fault), Err(e)) => {
                warn!("closure cleanup failed after a failed call: {e}");
                Err(fault)
            }
        }
    }

    fn enter(&self) -> Result<(Option<u32>, u32, ClosureExports)> {
        let mut state = self.state.borrow_mut();
        if state.context == ContextSlot::Released {
            return Err(Error::closure_released("Closure invoked after it was dropped"));
        }
        state.refcount += 1;
        let lent = match mem::replace(&mut state.context, ContextSlot::Borrowed) {
            ContextSlot::Owned(a) => Some(a),
            _ => None,
        };
        Ok((lent, state.env, state.exports))
    }

    fn call_module(
        &self,
        bridge: &Bridge,
        a: u32,
        b: u32,
        invoke: u32,
        args: &[HostValue],
    ) -> Completion {
        let mut words = vec![Val::from_u32(a), Val::from_u32(b)];
        let mut passed = Vec::with_capacity(args.len());
        for arg in args {
            match bridge.allocate(arg.clone()) {
                Ok(handle) => passed.push(handle),
                Err(e) => {
                    for handle in passed {
                        bridge.release(handle).ok();
                    }
                    return Err(Fault::Trap(e));
                }
            }
        }
        words.extend(passed.iter().map(|h| Val::from_u32(h.index())));

        let results = bridge.module().call(bridge, invoke, &words)?;
        match results.first() {
            None => Ok(HostValue::Undefined),
            Some(word) => Ok(bridge.take_object(Handle::new(word.as_u32()?))?),
        }
    }

    fn leave(&self, bridge: &Bridge, lent: Option<u32>) -> Result<()> {
        let destroy = {
            let mut state = self.state.borrow_mut();
            state.refcount -= 1;
            if state.refcount == 0 {
                state.context = ContextSlot::Released;
                lent.map(|a| (a, state.env, state.exports.destructor))
            } else {
                if let Some(a) = lent {
                    state.context = ContextSlot::Owned(a);
                }
                None
            }
        };
        match destroy {
            Some((a, b, destructor)) => self.destroy(bridge, a, b, destructor),
            None => Ok(()),
        }
    }

    /// Drop the host's reference. Returns `true` when this ran the
    /// destructor, `false` when an in-flight call will run it on exit.
    ///
    /// # Errors
    ///
    /// Returns a contract violation when the reference was already dropped,
    /// and propagates destructor failures
    pub fn release(&self, bridge: &Bridge) -> Result<bool> {
        let destroy = {
            let mut state = self.state.borrow_mut();
            if !state.alive {
                return Err(Error::closure_released("Closure dropped twice"));
            }
            state.alive = false;
            state.refcount -= 1;
            if state.refcount > 0 {
                debug!("closure drop deferred; {} call(s) in flight", state.refcount);
                return Ok(false);
            }
            match mem::replace(&mut state.context, ContextSlot::Released) {
                ContextSlot::Owned(a) => (a, state.env, state.exports.destructor),
                _ => return Err(Error::closure_released("Closure context missing on drop")),
            }
        };
        let (a, b, destructor) = destroy;
        self.destroy(bridge, a, b, destructor)?;
        Ok(true)
    }

    fn destroy(&self, bridge: &Bridge, a: u32, b: u32, destructor: u32) -> Result<()> {
        debug!("closure ({a}, {b}) destroyed");
        bridge.module().call(bridge, destructor, &[Val::from_u32(a), Val::from_u32(b)])?;
        Ok(())
    }
}
