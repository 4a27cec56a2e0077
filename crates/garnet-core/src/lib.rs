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

//! # Garnet Core
//!
//! Foundational crate containing the value types, flag types, error
//! hierarchy, and the raw device contract that the `garnet-gfx`
//! implementation layer is built against.

#![warn(missing_docs)]

pub mod binding;
pub mod error;
pub mod format;
pub mod image;
pub mod memory;
pub mod raw;
pub mod state;
pub mod utils;
pub mod vertex;

pub use binding::{ResourceSetLayoutDesc, ShaderStageFlags, SlotDesc, SlotKind, MAX_RESOURCE_SETS};
pub use error::{AllocationError, DeviceError, GfxError};
pub use format::{IndexFormat, TextureFormat, VertexFormat};
pub use image::{Extent3d, ImageDescriptor, Origin3d, SamplerDesc};
pub use memory::{BufferUsage, ImageUsage, MemoryPropertyFlags, MemoryRequirements, MemoryType};
pub use raw::RawDevice;
pub use state::{
    BlendStateDesc, DepthStencilStateDesc, PrimitiveTopology, RasterizerStateDesc, ScissorRect,
    Viewport,
};
pub use vertex::{VertexAttribute, VertexLayout};

/// The maximum number of frames that can be in flight on the GPU at once.
/// This bounds the per-frame resource rings and the point at which frame
/// submission blocks on the oldest outstanding fence.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;
