// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Import bindings.
//!
//! Installs every adapter into a [`CallbackRegistry`] under one module
//! namespace. Raw `i32` arguments are handles, pointers and lengths read as
//! unsigned; numbers travel as `f64`; flags return as `i32` 0 or 1.

use core::any::Any;

use hostlink_error::{Error, Result};
use hostlink_host::{arg_f64, arg_u32, CallbackRegistry, HostBuilder, HostFunctionHandler, Val};

use crate::Bridge;

/// Adapter entry point as seen from the import table
pub type Import = fn(&Bridge, &[Val]) -> Result<Vec<Val>>;

fn bridge_of(target: &dyn Any) -> Result<&Bridge> {
    target
        .downcast_ref::<Bridge>()
        .ok_or(Error::runtime_error("Import called without a bridge"))
}

fn handler(import: Import) -> HostFunctionHandler {
    HostFunctionHandler::new(move |target: &dyn Any, args: Vec<Val>| {
        import(bridge_of(target)?, &args)
    })
}

fn handle(value: u32) -> Result<Vec<Val>> {
    Ok(vec![Val::from_u32(value)])
}

fn flag(value: bool) -> Result<Vec<Val>> {
    Ok(vec![Val::from_bool(value)])
}

fn none() -> Result<Vec<Val>> {
    Ok(Vec::new())
}

fn bind(name: &'static str, import: Import) -> (&'static str, Import) {
    (name, import)
}

/// Every adapter with its import name
#[must_use]
pub fn bindings() -> Vec<(&'static str, Import)> {
    vec![
        // Intrinsics
        bind("string_new", |b, a| handle(b.string_new(arg_u32(a, 0)?, arg_u32(a, 1)?)?)),
        bind("number_new", |b, a| handle(b.number_new(arg_f64(a, 0)?)?)),
        bind("number_get", |b, a| Ok(vec![Val::F64(b.number_get(arg_u32(a, 0)?)?)])),
        bind("bool_get", |b, a| handle(b.bool_get(arg_u32(a, 0)?)?)),
        bind("string_get", |b, a| {
            b.string_get(arg_u32(a, 0)?, arg_u32(a, 1)?)?;
            none()
        }),
        bind("object_clone_ref", |b, a| handle(b.object_clone_ref(arg_u32(a, 0)?)?)),
        bind("object_drop_ref", |b, a| {
            b.object_drop_ref(arg_u32(a, 0)?)?;
            none()
        }),
        bind("is_undefined", |b, a| flag(b.is_undefined(arg_u32(a, 0)?)?)),
        bind("is_null", |b, a| flag(b.is_null(arg_u32(a, 0)?)?)),
        bind("is_object", |b, a| flag(b.is_object(arg_u32(a, 0)?)?)),
        bind("is_function", |b, a| flag(b.is_function(arg_u32(a, 0)?)?)),
        bind("debug_string", |b, a| {
            b.debug_string(arg_u32(a, 0)?, arg_u32(a, 1)?)?;
            none()
        }),
        bind("throw", |b, a| match b.throw(arg_u32(a, 0)?, arg_u32(a, 1)?)? {}),
        bind("log", |b, a| {
            b.log(arg_u32(a, 0)?, arg_u32(a, 1)?)?;
            none()
        }),
        bind("error", |b, a| {
            b.error(arg_u32(a, 0)?, arg_u32(a, 1)?)?;
            none()
        }),
        bind("closure_wrapper", |b, a| {
            handle(b.closure_wrapper(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?, arg_u32(a, 3)?)?)
        }),
        bind("cb_drop", |b, a| flag(b.cb_drop(arg_u32(a, 0)?)?)),
        bind("exn_take", |b, _| handle(b.exn_take())),

        // Objects
        bind("global", |b, _| handle(b.global()?)),
        bind("object_new", |b, _| handle(b.object_new()?)),
        bind("array_new", |b, a| handle(b.array_new(arg_u32(a, 0)?)?)),
        bind("array_set", |b, a| {
            b.array_set(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?)?;
            none()
        }),
        bind("get_property", |b, a| {
            handle(b.get_property(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?)?)
        }),
        bind("set_property", |b, a| {
            b.set_property(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?, arg_u32(a, 3)?)?;
            none()
        }),
        bind("reflect_set", |b, a| {
            flag(b.reflect_set(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?)?)
        }),
        bind("instance_of", |b, a| {
            flag(b.instance_of(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?)?)
        }),
        bind("call", |b, a| handle(b.call(arg_u32(a, 0)?, arg_u32(a, 1)?)?)),
        bind("call_method", |b, a| {
            handle(b.call_method(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?, arg_u32(a, 3)?)?)
        }),

        // Events and storage
        bind("custom_event_new", |b, a| {
            handle(b.custom_event_new(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?)?)
        }),
        bind("add_event_listener", |b, a| {
            b.add_event_listener(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?, arg_u32(a, 3)?)?;
            none()
        }),
        bind("dispatch_event", |b, a| {
            flag(b.dispatch_event(arg_u32(a, 0)?, arg_u32(a, 1)?)?)
        }),
        bind("storage_get_item", |b, a| {
            b.storage_get_item(arg_u32(a, 0)?, arg_u32(a, 1)?, arg_u32(a, 2)?, arg_u32(a, 3)?)?;
            none()
        }),
        bind("storage_set_item", |b, a| {
            b.storage_set_item(
                arg_u32(a, 0)?,
                arg_u32(a, 1)?,
                arg_u32(a, 2)?,
                arg_u32(a, 3)?,
                arg_u32(a, 4)?,
            )?;
            none()
        }),
    ]
}

/// Names of every import installed by [`register`]
#[must_use]
pub fn import_names() -> Vec<&'static str> {
    bindings().into_iter().map(|(name, _)| name).collect()
}

/// Install all adapters under `module`
pub fn register(registry: &mut CallbackRegistry, module: &str) {
    for (name, import) in bindings() {
        registry.register_host_function(module, name, handler(import));
    }
}

/// Add all adapters under `module` to a builder, so they can be combined
/// with other imports and checked for clashes
#[must_use]
pub fn install(builder: HostBuilder, module: &str) -> HostBuilder {
    bindings()
        .into_iter()
        .fold(builder, |builder, (name, import)| {
            builder.with_host_function(module, name, handler(import))
        })
}
