// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Reference host facilities.
//!
//! Minimal host objects for the adapters to drive when no real host is
//! attached: event targets, custom events and a key-value storage with a
//! byte quota. A [`window`] ties them together as a global object.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use log::{debug, warn};

use crate::value::{Completion, Fault, HostFunction, HostObject, HostValue};

/// Default storage quota in bytes, counted over keys and values
pub const DEFAULT_STORAGE_QUOTA: usize = 5 * 1024 * 1024;

type Listeners = Rc<RefCell<BTreeMap<String, Vec<HostFunction>>>>;

fn string_arg(args: &[HostValue], index: usize) -> String {
    args.get(index).cloned().unwrap_or_default().to_display_string()
}

/// Install `addEventListener`, `removeEventListener` and `dispatchEvent`
pub fn install_event_target(target: &HostObject) {
    let listeners: Listeners = Rc::default();

    let registry = Rc::clone(&listeners);
    target.define_method("addEventListener", move |_, _, args| {
        let event_type = string_arg(args, 0);
        let Some(HostValue::Function(listener)) = args.get(1) else {
            return Ok(HostValue::Undefined);
        };
        let mut registry = registry.borrow_mut();
        let entries = registry.entry(event_type).or_default();
        if !entries.iter().any(|existing| existing.ptr_eq(listener)) {
            entries.push(listener.clone());
        }
        Ok(HostValue::Undefined)
    });

    let registry = Rc::clone(&listeners);
    target.define_method("removeEventListener", move |_, _, args| {
        let event_type = string_arg(args, 0);
        if let Some(HostValue::Function(listener)) = args.get(1) {
            if let Some(entries) = registry.borrow_mut().get_mut(&event_type) {
                entries.retain(|existing| !existing.ptr_eq(listener));
            }
        }
        Ok(HostValue::Undefined)
    });

    let registry = listeners;
    target.define_method("dispatchEvent", move |bridge, this, args| {
        let Some(HostValue::Object(event)) = args.first() else {
            return Err(HostValue::type_error("dispatchEvent: parameter 1 is not of type 'Event'"));
        };
        if !event.is_instance_of("Event") {
            return Err(HostValue::type_error("dispatchEvent: parameter 1 is not of type 'Event'"));
        }
        let event_type = event.get("type").unwrap_or_default().to_display_string();
        event.set("target", this.clone());

        let snapshot = registry.borrow().get(&event_type).cloned().unwrap_or_default();
        debug!("dispatching '{event_type}' to {} listener(s)", snapshot.len());
        let payload = HostValue::Object(event.clone());
        for listener in snapshot {
            match listener.call(bridge, this, std::slice::from_ref(&payload)) {
                Ok(_) => {}
                Err(Fault::Thrown(exception)) => {
                    warn!("uncaught exception in '{event_type}' listener: {}", exception.to_display_string());
                }
                Err(trap) => return Err(trap),
            }
        }
        let prevented = event.get("defaultPrevented").and_then(|v| v.as_bool()).unwrap_or(false);
        Ok(HostValue::Bool(!prevented))
    });
}

/// Create a standalone event target
#[must_use]
pub fn event_target() -> HostObject {
    let target = HostObject::new("EventTarget");
    install_event_target(&target);
    target
}

/// Construct a `CustomEvent` of `event_type`. `init` may be `undefined`,
/// `null` or an object whose `detail` becomes the event detail.
///
/// # Errors
///
/// Throws a `TypeError` when `init` is any other kind of value
pub fn custom_event(event_type: &str, init: &HostValue) -> Completion<HostObject> {
    let detail = match init {
        HostValue::Undefined | HostValue::Null => HostValue::Null,
        HostValue::Object(options) => options.get("detail").unwrap_or(HostValue::Null),
        _ => {
            return Err(HostValue::type_error(
                "CustomEvent: parameter 2 is not of type 'CustomEventInit'",
            ));
        }
    };
    let cancelable = init
        .as_object()
        .and_then(|options| options.get("cancelable"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let event = HostObject::with_classes(&["CustomEvent", "Event"]);
    event.set("type", HostValue::string(event_type));
    event.set("detail", detail);
    event.set("cancelable", HostValue::Bool(cancelable));
    event.set("defaultPrevented", HostValue::Bool(false));
    event.define_method("preventDefault", |_, this, _| {
        if let Some(event) = this.as_object() {
            if event.get("cancelable").and_then(|v| v.as_bool()).unwrap_or(false) {
                event.set("defaultPrevented", HostValue::Bool(true));
            }
        }
        Ok(HostValue::Undefined)
    });
    Ok(event)
}

/// Create a key-value storage limited to `quota` bytes of keys plus values.
/// Exceeding the quota throws a `QuotaExceededError`.
#[must_use]
pub fn storage(quota: usize) -> HostObject {
    let items: Rc<RefCell<BTreeMap<String, String>>> = Rc::default();
    let storage = HostObject::new("Storage");

    let store = Rc::clone(&items);
    storage.define_method("getItem", move |_, _, args| {
        let key = string_arg(args, 0);
        Ok(store.borrow().get(&key).map_or(HostValue::Null, |v| HostValue::string(v.as_str())))
    });

    let store = Rc::clone(&items);
    storage.define_method("setItem", move |_, _, args| {
        let key = string_arg(args, 0);
        let value = string_arg(args, 1);
        let mut store = store.borrow_mut();
        let used: usize = store
            .iter()
            .filter(|(k, _)| **k != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        if used + key.len() + value.len() > quota {
            return Err(Fault::Thrown(HostValue::error(
                "QuotaExceededError",
                "The quota has been exceeded.",
            )));
        }
        store.insert(key, value);
        Ok(HostValue::Undefined)
    });

    let store = Rc::clone(&items);
    storage.define_method("removeItem", move |_, _, args| {
        store.borrow_mut().remove(&string_arg(args, 0));
        Ok(HostValue::Undefined)
    });

    let store = items;
    storage.define_method("clear", move |_, _, _| {
        store.borrow_mut().clear();
        Ok(HostValue::Undefined)
    });

    storage
}

/// Create a global object with an event target surface, a `document` event
/// target and a `localStorage` of `storage_quota` bytes
#[must_use]
pub fn window(storage_quota: usize) -> HostObject {
    let window = HostObject::with_classes(&["Window", "EventTarget"]);
    install_event_target(&window);

    let document = HostObject::with_classes(&["Document", "Node", "EventTarget"]);
    install_event_target(&document);
    window.set("document", document.into());
    window.set("localStorage", storage(storage_quota).into());
    window
}
