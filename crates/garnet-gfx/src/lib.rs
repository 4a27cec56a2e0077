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

//! The garnet graphics layer.
//!
//! Sits between the renderer and a [`garnet_core::raw::RawDevice`]
//! backend and owns the problems the raw API leaves open: sub-allocating
//! device memory, keeping resources alive while frames are in flight,
//! recording commands through dirty-state tracking, and caching render
//! passes, framebuffers, and pipeline state objects.
//!
//! Everything hangs off a [`GfxContext`]:
//!
//! ```
//! use garnet_gfx::{GfxContext, GfxSettings, NullDevice};
//! use std::sync::Arc;
//!
//! let device = Arc::new(NullDevice::new());
//! let gfx = GfxContext::new(device, GfxSettings::default());
//! gfx.begin_frame().unwrap();
//! gfx.end_frame().unwrap();
//! ```

#![warn(missing_docs)]

pub mod binding;
pub mod cache;
pub mod command;
pub mod context;
pub mod memory;
pub mod null;
pub mod resource;
pub mod settings;

mod frame;

pub use binding::{ResourceSet, ResourceSetLayout};
pub use cache::PassCompatKey;
pub use command::{CommandList, ListKind, StateFlags};
pub use context::{GfxContext, PassAttachment, PassDescriptor};
pub use memory::AllocatorStats;
pub use null::{NullCommand, NullDevice};
pub use resource::{GpuBuffer, GpuTexture, MemoryLocation, Pipeline, Sampler, WriteMode};
pub use settings::{FaultPolicy, GfxSettings};
