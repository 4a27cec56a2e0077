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

//! GPU buffers.
//!
//! A buffer is a sub-allocated block of a pool-wide raw buffer, never a
//! native buffer object of its own. Dynamic buffers live in host-visible
//! memory and support discard updates: when the current block is still
//! referenced by an in-flight frame, a discard write moves the buffer to
//! a fresh block instead of stalling, bumping the generation counter so
//! resource sets re-resolve the binding. Device-local buffers upload
//! through per-frame staging memory and the frame's transfer commands.

use crate::context::GfxShared;
use crate::frame::FrameRef;
use crate::memory::{BlockRequest, BlockUsage, MemoryBlockRef};
use garnet_core::error::GfxError;
use garnet_core::memory::{BufferUsage, MemoryPropertyFlags};
use garnet_core::raw::RawBufferId;
use std::borrow::Cow;
use std::sync::{Arc, Mutex};

/// Which memory class a buffer lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLocation {
    /// Device-fast memory; writes go through a staging copy.
    DeviceLocal,
    /// Host-visible memory written directly; supports discard updates.
    Dynamic,
}

/// How an update interacts with in-flight reads of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Plain write. The caller guarantees the written range is not read
    /// by in-flight work, or accepts the race.
    Normal,
    /// Orphan the current contents: if an in-flight frame still reads the
    /// block, the buffer moves to a fresh one before writing.
    Discard,
    /// The caller promises the buffer has no in-flight readers.
    NoOverwrite,
}

struct BufferInner {
    block: MemoryBlockRef,
    raw: RawBufferId,
    /// Bumped every time a discard rotates the backing block.
    generation: u64,
}

/// A GPU buffer backed by sub-allocated pool memory.
pub struct GpuBuffer {
    shared: Arc<GfxShared>,
    size: u64,
    usage: BufferUsage,
    location: MemoryLocation,
    label: Option<Cow<'static, str>>,
    inner: Mutex<BufferInner>,
}

impl GpuBuffer {
    pub(crate) fn create(
        shared: Arc<GfxShared>,
        size: u64,
        usage: BufferUsage,
        location: MemoryLocation,
        label: Option<Cow<'static, str>>,
    ) -> Result<Self, GfxError> {
        assert!(size > 0, "a buffer cannot be empty");
        let usage = match location {
            // Device-local contents only arrive via transfer.
            MemoryLocation::DeviceLocal => usage | BufferUsage::TRANSFER_DST,
            MemoryLocation::Dynamic => usage,
        };
        let request = Self::block_request(&shared, size, usage, location);
        let block = shared.allocator.allocate_one(&request)?;
        let raw = match block.buffer() {
            Some(raw) => raw,
            None => {
                return Err(garnet_core::error::DeviceError::Backend(
                    "buffer block has no backing buffer".into(),
                )
                .into())
            }
        };
        log::trace!(
            "buffer {:?} created: {size} bytes at offset {} ({location:?})",
            label.as_deref().unwrap_or("unnamed"),
            block.offset()
        );
        Ok(Self {
            shared,
            size,
            usage,
            location,
            label,
            inner: Mutex::new(BufferInner {
                block,
                raw,
                generation: 0,
            }),
        })
    }

    fn block_request(
        shared: &GfxShared,
        size: u64,
        usage: BufferUsage,
        location: MemoryLocation,
    ) -> BlockRequest {
        let properties = match location {
            MemoryLocation::DeviceLocal => MemoryPropertyFlags::DEVICE_LOCAL,
            MemoryLocation::Dynamic => {
                MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT
            }
        };
        // Uniform buffers carry the device's binding alignment so every
        // block offset is a valid descriptor offset.
        let align = if usage.contains(BufferUsage::UNIFORM) {
            shared.device.limits().min_uniform_offset_alignment.max(1)
        } else {
            16
        };
        BlockRequest {
            size,
            count: 1,
            align,
            usage: BlockUsage::Buffer(usage),
            properties,
            type_mask: !0,
        }
    }

    /// Writes `data` into the buffer at `offset`.
    ///
    /// Dynamic buffers are written in place; [`WriteMode::Discard`]
    /// rotates to a fresh block first when in-flight work still reads the
    /// current one. Device-local buffers stage the bytes and record a
    /// copy on the current frame's transfer stream, so a frame must be
    /// recording.
    pub fn update(&self, offset: u64, data: &[u8], mode: WriteMode) -> Result<(), GfxError> {
        assert!(
            offset + data.len() as u64 <= self.size,
            "buffer update of {} bytes at {offset} overruns size {}",
            data.len(),
            self.size
        );
        if data.is_empty() {
            return Ok(());
        }
        match self.location {
            MemoryLocation::Dynamic => self.update_dynamic(offset, data, mode),
            MemoryLocation::DeviceLocal => self.update_device_local(offset, data),
        }
    }

    fn update_dynamic(&self, offset: u64, data: &[u8], mode: WriteMode) -> Result<(), GfxError> {
        let allocator = &self.shared.allocator;
        let mut inner = self.inner.lock().unwrap();
        match mode {
            WriteMode::Discard if inner.block.is_shared() => {
                let request =
                    Self::block_request(&self.shared, self.size, self.usage, self.location);
                let fresh = allocator.allocate_one(&request)?;
                let raw = match fresh.buffer() {
                    Some(raw) => raw,
                    None => {
                        return Err(garnet_core::error::DeviceError::Backend(
                            "buffer block has no backing buffer".into(),
                        )
                        .into())
                    }
                };
                let old = std::mem::replace(&mut inner.block, fresh);
                inner.raw = raw;
                inner.generation += 1;
                log::trace!(
                    "buffer {:?} discarded to generation {}",
                    self.label.as_deref().unwrap_or("unnamed"),
                    inner.generation
                );
                allocator.free(old)?;
            }
            WriteMode::NoOverwrite => {
                debug_assert!(
                    !inner.block.is_shared(),
                    "no-overwrite update on a buffer with in-flight readers"
                );
            }
            _ => {}
        }
        allocator.write(&inner.block, offset, data)
    }

    fn update_device_local(&self, offset: u64, data: &[u8]) -> Result<(), GfxError> {
        let shared = &self.shared;
        let staging = shared.allocator.allocate_staging(data.len() as u64)?;
        shared.allocator.write(&staging.block, 0, data)?;
        let transfer = shared.frames.transfer_cb()?;
        let inner = self.inner.lock().unwrap();
        shared.device.cmd_copy_buffer(
            transfer,
            staging.buffer,
            staging.block.offset(),
            inner.raw,
            inner.block.offset() + offset,
            data.len() as u64,
        );
        shared.frames.reference(FrameRef::Memory(inner.block.clone()));
        shared.frames.track_staging(staging.block);
        Ok(())
    }

    /// Typed convenience over [`GpuBuffer::update`].
    pub fn update_pod<T: bytemuck::NoUninit>(
        &self,
        offset: u64,
        data: &[T],
        mode: WriteMode,
    ) -> Result<(), GfxError> {
        self.update(offset, bytemuck::cast_slice(data), mode)
    }

    /// The raw binding triple: pool buffer, byte offset, byte length.
    pub(crate) fn raw_binding(&self) -> (RawBufferId, u64, u64) {
        let inner = self.inner.lock().unwrap();
        (inner.raw, inner.block.offset(), self.size)
    }

    /// A clone of the current backing block handle, for frame pinning.
    pub(crate) fn block(&self) -> MemoryBlockRef {
        self.inner.lock().unwrap().block.clone()
    }

    /// Monotonic counter of backing-block rotations.
    pub(crate) fn generation(&self) -> u64 {
        self.inner.lock().unwrap().generation
    }

    /// The buffer's logical size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The usage flags the buffer was created with.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// The memory class the buffer lives in.
    pub fn location(&self) -> MemoryLocation {
        self.location
    }

    /// The buffer's debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        let block = self.inner.lock().unwrap().block.clone();
        if let Err(err) = self.shared.allocator.free(block) {
            log::warn!(
                "buffer {:?} release failed: {err}",
                self.label.as_deref().unwrap_or("unnamed")
            );
        }
    }
}
