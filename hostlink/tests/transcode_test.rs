// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! String transfer through module memory.

mod common;

use common::Fixture;
use hostlink::{BridgeConfig, HostObject, HostValue, NativeModule, VecMemory, PAGE_SIZE};
use hostlink_error::codes;
use proptest::prelude::*;
use std::rc::Rc;

proptest! {
    #[test]
    fn encode_then_decode_preserves_text(s in "\\PC{0,64}", fast_path in any::<bool>()) {
        let fixture = Fixture::with_config(BridgeConfig::default().with_ascii_fast_path(fast_path));
        let encoded = fixture.bridge.encode_string(&s).unwrap();
        prop_assert_eq!(encoded.len as usize, s.len());
        prop_assert_eq!(fixture.bridge.decode_string(encoded.ptr, encoded.len).unwrap(), s);
    }
}

#[test]
fn test_malformed_input_is_a_parse_error() {
    let fixture = Fixture::new();
    let (ptr, len) = fixture.module.alloc_bytes(&[0xFF, 0xFE]).unwrap();
    let err = fixture.bridge.string_new(ptr, len).unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.code, codes::INVALID_UTF8);
    assert_eq!(fixture.bridge.live_handles(), 0);
}

#[test]
fn test_string_get_round_trip() {
    let fixture = Fixture::new();
    let handle = fixture.string("grüße, 世界");
    let retptr = fixture.retptr();
    fixture.bridge.string_get(retptr, handle).unwrap();
    assert_eq!(fixture.read_str(retptr).as_deref(), Some("grüße, 世界"));
}

#[test]
fn test_string_get_on_non_string_writes_zero_pair() {
    let fixture = Fixture::new();
    let number = fixture.bridge.number_new(3.0).unwrap();
    let retptr = fixture.retptr();
    fixture.bridge.views().write_pair(retptr, 99, 99).unwrap();
    fixture.bridge.string_get(retptr, number).unwrap();
    assert_eq!(fixture.bridge.views().read_pair(retptr).unwrap(), (0, 0));
}

#[test]
fn test_growth_during_encode_refreshes_views() {
    let fixture = Fixture::new();
    let before = fixture.bridge.views().byte_view();

    // Larger than the single initial page, with a non-ASCII tail
    let mut text = "a".repeat(PAGE_SIZE);
    text.push_str("ünïcödé");
    let encoded = fixture.bridge.encode_string(&text).unwrap();

    assert!(fixture.memory.size() > 1);
    assert!(before.read(0, 1).is_err());
    assert_eq!(fixture.bridge.decode_string(encoded.ptr, encoded.len).unwrap(), text);
    let stats = fixture.module.stats();
    assert_eq!(stats.mallocs, 1);
    assert_eq!(stats.reallocs, 2);
}

#[test]
fn test_module_without_realloc_gets_exact_allocation() {
    let memory = Rc::new(VecMemory::new(1, None));
    let module = NativeModule::new(memory).without_realloc();
    let fixture = Fixture::with_module(module, HostObject::plain(), BridgeConfig::default());
    let encoded = fixture.bridge.encode_string("naïve").unwrap();
    assert_eq!(encoded.len, 6);
    assert_eq!(fixture.module.stats().reallocs, 0);
    assert_eq!(fixture.bridge.decode_string(encoded.ptr, encoded.len).unwrap(), "naïve");
}

#[test]
fn test_strings_become_host_values() {
    let fixture = Fixture::new();
    let handle = fixture.string("");
    assert_eq!(fixture.value(handle), HostValue::from(""));
}
