// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Closure trampolines: invocation, reentrancy and destruction.

mod common;

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use common::Fixture;
use hostlink::{ContextSlot, Fault, Handle, HostFunction, HostValue};
use hostlink_error::codes;
use hostlink_host::Val;

struct Closure {
    handle: u32,
    calls: Rc<Cell<u32>>,
    destroyed: Rc<RefCell<Vec<(u32, u32)>>>,
}

/// Register an echo closure with context `(a, b)`; `body` runs inside each
/// invocation before the first argument is echoed back
fn echo_closure<F>(fixture: &Fixture, a: u32, b: u32, body: F) -> Closure
where
    F: Fn(&hostlink::Bridge, &[Val]) + 'static,
{
    let calls = Rc::new(Cell::new(0));
    let destroyed = Rc::new(RefCell::new(Vec::new()));

    let counter = calls.clone();
    let invoke = fixture.module.register(move |bridge, args| {
        counter.set(counter.get() + 1);
        body(bridge, args);
        Ok(args.get(2).copied().into_iter().collect())
    });
    let log = destroyed.clone();
    let destructor = fixture.module.register(move |_, args| {
        log.borrow_mut().push((args[0].as_u32()?, args[1].as_u32()?));
        Ok(Vec::new())
    });

    let handle = fixture.bridge.closure_wrapper(a, b, invoke, destructor).unwrap();
    Closure { handle, calls, destroyed }
}

fn function(fixture: &Fixture, handle: u32) -> HostFunction {
    fixture.value(handle).as_function().cloned().unwrap()
}

#[test]
fn test_invoke_passes_context_and_returns_result() {
    let fixture = Fixture::new();
    let seen = Rc::new(Cell::new((0, 0)));
    let record = seen.clone();
    let closure = echo_closure(&fixture, 11, 22, move |_, args| {
        record.set((args[0].as_u32().unwrap(), args[1].as_u32().unwrap()));
    });

    let f = function(&fixture, closure.handle);
    let result = f.call(&fixture.bridge, &HostValue::Undefined, &[HostValue::from("ping")]).unwrap();

    assert_eq!(result, HostValue::from("ping"));
    assert_eq!(seen.get(), (11, 22));
    assert_eq!(closure.calls.get(), 1);
    // The argument handle was consumed as the result
    assert_eq!(fixture.bridge.live_handles(), 1);

    let trampoline = f.as_closure().unwrap();
    assert_eq!(trampoline.context(), ContextSlot::Owned(11));
    assert_eq!(trampoline.refcount(), 1);
}

#[test]
fn test_no_return_value_is_undefined() {
    let fixture = Fixture::new();
    let invoke = fixture.module.register(|_, _| Ok(Vec::new()));
    let destructor = fixture.module.register(|_, _| Ok(Vec::new()));
    let handle = fixture.bridge.closure_wrapper(1, 2, invoke, destructor).unwrap();
    let result = function(&fixture, handle).call(&fixture.bridge, &HostValue::Undefined, &[]).unwrap();
    assert!(result.is_undefined());
}

#[test]
fn test_reentrant_invocation_fails() {
    let fixture = Fixture::new();
    let slot = Rc::new(Cell::new(0));
    let inner_error = Rc::new(Cell::new(None));

    let handle_slot = slot.clone();
    let record = inner_error.clone();
    let closure = echo_closure(&fixture, 5, 6, move |bridge, _| {
        let me = bridge.object(Handle::new(handle_slot.get())).unwrap();
        match me.as_function().unwrap().call(bridge, &HostValue::Undefined, &[]) {
            Err(Fault::Trap(e)) => record.set(Some(e.code)),
            _ => record.set(Some(0)),
        }
    });
    slot.set(closure.handle);

    let f = function(&fixture, closure.handle);
    f.call(&fixture.bridge, &HostValue::Undefined, &[]).unwrap();

    assert_eq!(inner_error.get(), Some(codes::CLOSURE_REENTERED));
    assert_eq!(closure.calls.get(), 1);
    let trampoline = f.as_closure().unwrap();
    assert_eq!(trampoline.context(), ContextSlot::Owned(5));
    assert_eq!(trampoline.refcount(), 1);
    assert!(closure.destroyed.borrow().is_empty());
}

#[test]
fn test_drop_runs_destructor_once() {
    let fixture = Fixture::new();
    let closure = echo_closure(&fixture, 7, 8, |_, _| {});
    let f = function(&fixture, closure.handle);

    assert!(fixture.bridge.cb_drop(closure.handle).unwrap());
    assert_eq!(*closure.destroyed.borrow(), vec![(7, 8)]);
    assert!(f.as_closure().unwrap().is_released());

    let err = f.call(&fixture.bridge, &HostValue::Undefined, &[]).unwrap_err();
    let Fault::Trap(err) = err else { panic!("expected a trap") };
    assert_eq!(err.code, codes::CLOSURE_RELEASED);
    assert_eq!(closure.calls.get(), 0);
    assert_eq!(closure.destroyed.borrow().len(), 1);
}

#[test]
fn test_drop_during_call_defers_destructor() {
    let fixture = Fixture::new();
    let slot = Rc::new(Cell::new(0));
    let dropped_now = Rc::new(Cell::new(None));

    let handle_slot = slot.clone();
    let record = dropped_now.clone();
    let closure = echo_closure(&fixture, 3, 4, move |bridge, _| {
        record.set(Some(bridge.cb_drop(handle_slot.get()).unwrap()));
    });
    slot.set(closure.handle);

    let f = function(&fixture, closure.handle);
    f.call(&fixture.bridge, &HostValue::Undefined, &[]).unwrap();

    assert_eq!(dropped_now.get(), Some(false));
    assert_eq!(*closure.destroyed.borrow(), vec![(3, 4)]);
    assert!(f.as_closure().unwrap().is_released());
}

#[test]
fn test_drop_inside_reentered_call_destroys_once_after_outer_call() {
    let fixture = Fixture::new();
    let slot = Rc::new(Cell::new(0));
    let destroy_log: Rc<RefCell<Option<Rc<RefCell<Vec<(u32, u32)>>>>>> = Rc::default();
    let inner_error = Rc::new(Cell::new(None));
    let dropped_now = Rc::new(Cell::new(None));
    let destroyed_inside = Rc::new(Cell::new(None));

    let handle_slot = slot.clone();
    let log = destroy_log.clone();
    let (record_error, record_drop, record_inside) =
        (inner_error.clone(), dropped_now.clone(), destroyed_inside.clone());
    let closure = echo_closure(&fixture, 10, 20, move |bridge, _| {
        let me = bridge.object(Handle::new(handle_slot.get())).unwrap();
        let nested = me.as_function().unwrap().call(bridge, &HostValue::Undefined, &[]);
        if let Err(Fault::Trap(e)) = nested {
            record_error.set(Some(e.code));
        }
        record_drop.set(Some(bridge.cb_drop(handle_slot.get()).unwrap()));
        let destroyed = log.borrow().as_ref().map(|d| !d.borrow().is_empty());
        record_inside.set(destroyed);
    });
    slot.set(closure.handle);
    *destroy_log.borrow_mut() = Some(closure.destroyed.clone());

    let f = function(&fixture, closure.handle);
    f.call(&fixture.bridge, &HostValue::Undefined, &[]).unwrap();

    assert_eq!(inner_error.get(), Some(codes::CLOSURE_REENTERED));
    assert_eq!(dropped_now.get(), Some(false));
    assert_eq!(destroyed_inside.get(), Some(false));
    assert_eq!(*closure.destroyed.borrow(), vec![(10, 20)]);
    assert_eq!(closure.calls.get(), 1);
    let trampoline = f.as_closure().unwrap();
    assert!(trampoline.is_released());
    assert_eq!(trampoline.refcount(), 0);

    let err = f.call(&fixture.bridge, &HostValue::Undefined, &[]).unwrap_err();
    assert!(matches!(err, Fault::Trap(e) if e.code == codes::CLOSURE_RELEASED));
    assert_eq!(closure.destroyed.borrow().len(), 1);
}

#[test]
fn test_second_drop_is_rejected() {
    let fixture = Fixture::new();
    let closure = echo_closure(&fixture, 1, 1, |_, _| {});
    let alias = fixture.bridge.object_clone_ref(closure.handle).unwrap();

    assert!(fixture.bridge.cb_drop(closure.handle).unwrap());
    let err = fixture.bridge.cb_drop(alias).unwrap_err();
    assert!(err.is_contract_violation());
    assert_eq!(closure.destroyed.borrow().len(), 1);
}

#[test]
fn test_cb_drop_rejects_non_closures() {
    let fixture = Fixture::new();
    let object = fixture.bridge.object_new().unwrap();
    let err = fixture.bridge.cb_drop(object).unwrap_err();
    assert!(err.is_type_error());
    assert!(fixture.bridge.is_object(object).unwrap());
}

#[test]
fn test_module_trap_still_cleans_up() {
    let fixture = Fixture::new();
    let invoke = fixture
        .module
        .register(|_, _| Err(hostlink::Error::module_trap("unreachable executed")));
    let destroyed = Rc::new(Cell::new(0));
    let counter = destroyed.clone();
    let destructor = fixture.module.register(move |_, _| {
        counter.set(counter.get() + 1);
        Ok(Vec::new())
    });
    let handle = fixture.bridge.closure_wrapper(9, 9, invoke, destructor).unwrap();
    let f = function(&fixture, handle);

    let err = f.call(&fixture.bridge, &HostValue::Undefined, &[]).unwrap_err();
    assert!(matches!(err, Fault::Trap(e) if e.code == codes::MODULE_TRAP));
    let trampoline = f.as_closure().unwrap();
    assert_eq!(trampoline.context(), ContextSlot::Owned(9));
    assert_eq!(trampoline.refcount(), 1);

    assert!(fixture.bridge.cb_drop(handle).unwrap());
    assert_eq!(destroyed.get(), 1);
}
