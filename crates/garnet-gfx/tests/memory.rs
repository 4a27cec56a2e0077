// Copyright 2026 the garnet authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use common::{test_context, test_context_with};
use garnet_core::error::{AllocationError, GfxError};
use garnet_core::memory::{BufferUsage, MemoryPropertyFlags, MemoryType};
use garnet_gfx::{FaultPolicy, GfxContext, GfxSettings, MemoryLocation, NullDevice};
use std::sync::Arc;

#[test]
fn small_buffers_share_one_pool() {
    let (_device, gfx) = test_context();
    let buffers: Vec<_> = (0..3)
        .map(|_| {
            gfx.create_buffer(64, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None)
                .unwrap()
        })
        .collect();
    let stats = gfx.stats();
    assert_eq!(stats.pools, 1);
    assert_eq!(stats.blocks, 3);
    assert_eq!(stats.reserved_bytes, gfx.settings().pool_min_size);
    drop(buffers);
}

#[test]
fn distinct_usages_get_distinct_pools() {
    let (_device, gfx) = test_context();
    let _uniform = gfx
        .create_buffer(64, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None)
        .unwrap();
    let _vertex = gfx
        .create_buffer(
            64,
            BufferUsage::VERTEX,
            MemoryLocation::DeviceLocal,
            None,
        )
        .unwrap();
    assert_eq!(gfx.stats().pools, 2);
}

#[test]
fn missing_memory_type_is_reported() {
    common::init_logging();
    let device = Arc::new(NullDevice::with_memory_types(vec![MemoryType {
        properties: MemoryPropertyFlags::DEVICE_LOCAL,
    }]));
    let gfx = GfxContext::new(
        device,
        GfxSettings {
            fault_policy: FaultPolicy::Propagate,
            ..GfxSettings::default()
        },
    );
    let result = gfx.create_buffer(64, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None);
    assert!(matches!(
        result,
        Err(GfxError::Allocation(
            AllocationError::NoCompatibleMemoryType { .. }
        ))
    ));
}

#[test]
fn exhausted_budget_is_reported() {
    let (device, gfx) = test_context_with(GfxSettings {
        pool_min_size: 1024,
        ..GfxSettings::default()
    });
    device.set_memory_budget(Some(1024));

    let first = gfx.create_buffer(512, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None);
    assert!(first.is_ok());

    // Does not fit the first pool and the budget forbids a second.
    let second = gfx.create_buffer(2048, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None);
    assert!(matches!(
        second,
        Err(GfxError::Allocation(
            AllocationError::OutOfDeviceMemory { .. }
        ))
    ));
}

#[test]
fn dropped_buffers_are_retired_then_reused() {
    let (_device, gfx) = test_context_with(GfxSettings {
        pool_min_size: 1024,
        ..GfxSettings::default()
    });
    let first = gfx
        .create_buffer(1024, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None)
        .unwrap();
    drop(first);
    assert_eq!(gfx.stats().retired_blocks, 1);

    // The pool is full until the retired block is swept, which happens
    // instead of growing a second pool.
    let _second = gfx
        .create_buffer(1024, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None)
        .unwrap();
    let stats = gfx.stats();
    assert_eq!(stats.pools, 1);
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.retired_blocks, 0);
}

#[test]
fn peak_usage_is_tracked() {
    let (_device, gfx) = test_context();
    let buffers: Vec<_> = (0..4)
        .map(|_| {
            gfx.create_buffer(1024, BufferUsage::STORAGE, MemoryLocation::Dynamic, None)
                .unwrap()
        })
        .collect();
    let peak = gfx.stats().peak_used_bytes;
    assert!(peak >= 4 * 1024);
    drop(buffers);
    assert_eq!(gfx.stats().peak_used_bytes, peak);
}
