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

//! GPU textures and samplers.

use crate::context::GfxShared;
use crate::memory::{BlockRequest, BlockUsage, MemoryBlockRef};
use garnet_core::error::GfxError;
use garnet_core::format::TextureFormat;
use garnet_core::image::{Extent3d, ImageDescriptor, SamplerDesc};
use garnet_core::memory::MemoryPropertyFlags;
use garnet_core::raw::{RawImageId, RawSamplerId};
use std::sync::{Arc, Mutex};

/// A device-local image bound to sub-allocated memory.
///
/// Dropping the texture invalidates every cached framebuffer it is
/// attached to, destroys the image, and releases its memory block; the
/// block release is deferred while in-flight frames still reference the
/// texture.
pub struct GpuTexture {
    shared: Arc<GfxShared>,
    raw: RawImageId,
    descriptor: ImageDescriptor,
    block: Mutex<Option<MemoryBlockRef>>,
}

impl GpuTexture {
    pub(crate) fn create(
        shared: Arc<GfxShared>,
        descriptor: ImageDescriptor,
    ) -> Result<Self, GfxError> {
        let raw = shared.device.create_image(&descriptor)?;
        let requirements = shared.device.image_requirements(raw);
        let block = shared.allocator.allocate_one(&BlockRequest {
            size: requirements.size,
            count: 1,
            align: requirements.alignment,
            usage: BlockUsage::Image,
            properties: MemoryPropertyFlags::DEVICE_LOCAL,
            type_mask: requirements.memory_type_mask,
        })?;
        shared
            .device
            .bind_image_memory(raw, block.memory(), block.offset())?;
        log::trace!(
            "texture {:?} created: {}x{}x{} {:?}, {} bytes",
            descriptor.label.as_deref().unwrap_or("unnamed"),
            descriptor.extent.width,
            descriptor.extent.height,
            descriptor.extent.depth,
            descriptor.format,
            requirements.size
        );
        Ok(Self {
            shared,
            raw,
            descriptor,
            block: Mutex::new(Some(block)),
        })
    }

    pub(crate) fn raw(&self) -> RawImageId {
        self.raw
    }

    /// The texel format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// The full extent of mip level zero.
    pub fn extent(&self) -> Extent3d {
        self.descriptor.extent
    }

    /// Number of mip levels.
    pub fn mip_levels(&self) -> u32 {
        self.descriptor.mip_levels
    }

    /// Multisample count.
    pub fn sample_count(&self) -> u32 {
        self.descriptor.sample_count
    }

    /// The texture's debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.shared
            .framebuffers
            .invalidate_target(&self.shared.device, self.raw);
        self.shared.device.destroy_image(self.raw);
        if let Some(block) = self.block.lock().unwrap().take() {
            if let Err(err) = self.shared.allocator.free(block) {
                log::warn!(
                    "texture {:?} release failed: {err}",
                    self.descriptor.label.as_deref().unwrap_or("unnamed")
                );
            }
        }
    }
}

/// A texture sampler.
pub struct Sampler {
    shared: Arc<GfxShared>,
    raw: RawSamplerId,
    desc: SamplerDesc,
}

impl Sampler {
    pub(crate) fn create(shared: Arc<GfxShared>, desc: SamplerDesc) -> Result<Self, GfxError> {
        let raw = shared.device.create_sampler(&desc)?;
        Ok(Self { shared, raw, desc })
    }

    pub(crate) fn raw(&self) -> RawSamplerId {
        self.raw
    }

    /// The description the sampler was created from.
    pub fn desc(&self) -> &SamplerDesc {
        &self.desc
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shared.device.destroy_sampler(self.raw);
    }
}
