// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Shared fixture for the bridge integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use hostlink::{
    facilities::{self, DEFAULT_STORAGE_QUOTA},
    Bridge, BridgeConfig, Handle, HostObject, HostValue, NativeModule, VecMemory,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Fixture {
    pub memory: Rc<VecMemory>,
    pub module: Rc<NativeModule>,
    pub bridge: Bridge,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self::with_global(facilities::window(DEFAULT_STORAGE_QUOTA), config)
    }

    pub fn with_global(global: HostObject, config: BridgeConfig) -> Self {
        let memory = Rc::new(VecMemory::new(1, None));
        Self::with_module(NativeModule::new(memory), global, config)
    }

    pub fn with_module(module: NativeModule, global: HostObject, config: BridgeConfig) -> Self {
        init_logging();
        let memory = module.memory().clone();
        let module = Rc::new(module);
        let bridge = Bridge::new(memory.clone(), module.clone(), global, config);
        Self { memory, module, bridge }
    }

    /// Stage a string in module memory
    pub fn put_str(&self, s: &str) -> (u32, u32) {
        self.module.alloc_bytes(s.as_bytes()).unwrap()
    }

    /// Reserve an aligned two-word return slot
    pub fn retptr(&self) -> u32 {
        self.module.alloc_bytes(&[0; 8]).unwrap().0
    }

    /// Read back an optional string written at `retptr`
    pub fn read_str(&self, retptr: u32) -> Option<String> {
        let (ptr, len) = self.bridge.views().read_pair(retptr).unwrap();
        if ptr == 0 {
            return None;
        }
        Some(self.bridge.decode_string(ptr, len).unwrap())
    }

    pub fn value(&self, handle: u32) -> HostValue {
        self.bridge.object(Handle::new(handle)).unwrap()
    }

    pub fn string(&self, s: &str) -> u32 {
        let (ptr, len) = self.put_str(s);
        self.bridge.string_new(ptr, len).unwrap()
    }

    pub fn property(&self, obj: u32, name: &str) -> u32 {
        let (ptr, len) = self.put_str(name);
        self.bridge.get_property(obj, ptr, len).unwrap()
    }

    /// Take the pending exception and return it
    pub fn exception(&self) -> HostValue {
        let handle = self.bridge.exn_take();
        assert_ne!(handle, 0, "expected a pending exception");
        self.bridge.take_object(Handle::new(handle)).unwrap()
    }
}
