// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(clippy::unwrap_used)]
//! Integration tests for import dispatch through the registry.

use std::{any::Any, cell::Cell};

use hostlink_host::{arg_u32, CallbackRegistry, HostFunctionHandler, Val};

struct Counter {
    calls: Cell<u32>,
}

#[test]
fn test_dispatch_reaches_target_state() {
    let mut registry = CallbackRegistry::new();
    registry.register_host_function(
        "env",
        "bump",
        HostFunctionHandler::new(|target: &dyn Any, args: Vec<Val>| {
            let counter = target.downcast_ref::<Counter>().unwrap();
            counter.calls.set(counter.calls.get() + arg_u32(&args, 0)?);
            Ok(vec![Val::from_u32(counter.calls.get())])
        }),
    );

    let counter = Counter { calls: Cell::new(0) };
    registry.call_host_function(&counter, "env", "bump", vec![Val::I32(2)]).unwrap();
    let result = registry.call_host_function(&counter, "env", "bump", vec![Val::I32(3)]).unwrap();

    assert_eq!(result, vec![Val::I32(5)]);
    assert_eq!(counter.calls.get(), 5);
}

#[test]
fn test_argument_errors_propagate() {
    let mut registry = CallbackRegistry::new();
    registry.register_host_function(
        "env",
        "needs_arg",
        HostFunctionHandler::new(|_, args: Vec<Val>| Ok(vec![Val::from_u32(arg_u32(&args, 0)?)])),
    );

    let err = registry.call_host_function(&(), "env", "needs_arg", vec![]).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_registered_listing() {
    let mut registry = CallbackRegistry::new();
    registry.register_host_function("a", "f", HostFunctionHandler::new(|_, _| Ok(vec![])));
    registry.register_host_function("a", "g", HostFunctionHandler::new(|_, _| Ok(vec![])));

    let mut functions = registry.get_registered_functions("a");
    functions.sort();
    assert_eq!(functions, vec!["f", "g"]);
    assert!(registry.get_registered_functions("missing").is_empty());
}
