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

//! Multi-frame-in-flight lifecycle tracking.
//!
//! A frame moves through `recording -> submitted -> completed`. Its fence
//! is the only place the layer observes GPU completion: everything a
//! frame referenced (memory blocks, descriptors, textures, transient
//! command buffers, staging memory) is held until the fence signals and
//! the frame is retired. Submission blocks only when the number of
//! outstanding frames reaches the configured cap, and then only on the
//! oldest fence.

use crate::binding::set::DescriptorGen;
use crate::command::pool::{CommandPool, TransientBuffer};
use crate::memory::{DeviceMemoryAllocator, MemoryBlockRef};
use crate::resource::{GpuTexture, Sampler};
use crate::settings::GfxSettings;
use garnet_core::error::GfxError;
use garnet_core::raw::{CommandBufferLevel, RawCommandBufferId, RawDevice, RawFenceId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One reference a frame holds to keep a GPU object alive in flight.
pub(crate) enum FrameRef {
    Memory(MemoryBlockRef),
    Descriptor(Arc<DescriptorGen>),
    Texture(Arc<GpuTexture>),
    Sampler(Arc<Sampler>),
}

struct Frame {
    index: u64,
    fence: RawFenceId,
    primary: RawCommandBufferId,
    transfer: Option<RawCommandBufferId>,
    transients: Vec<TransientBuffer>,
    staging: Vec<MemoryBlockRef>,
    referenced: Vec<FrameRef>,
}

struct TrackerInner {
    current: Option<Frame>,
    submitted: VecDeque<Frame>,
    next_index: u64,
}

/// Owns the "current frame" concept and coordinates deferred reclaim.
pub(crate) struct FrameTracker {
    device: Arc<dyn RawDevice>,
    allocator: Arc<DeviceMemoryAllocator>,
    pool: Arc<CommandPool>,
    frames_in_flight: usize,
    fence_timeout_ms: u64,
    inner: Mutex<TrackerInner>,
}

impl FrameTracker {
    pub(crate) fn new(
        device: Arc<dyn RawDevice>,
        allocator: Arc<DeviceMemoryAllocator>,
        pool: Arc<CommandPool>,
        settings: &GfxSettings,
    ) -> Self {
        Self {
            device,
            allocator,
            pool,
            frames_in_flight: settings.frames_in_flight.max(1),
            fence_timeout_ms: settings.fence_timeout_ms,
            inner: Mutex::new(TrackerInner {
                current: None,
                submitted: VecDeque::new(),
                next_index: 0,
            }),
        }
    }

    /// Opens a new frame and its primary command buffer.
    pub(crate) fn start_frame(&self) -> Result<(), GfxError> {
        let mut inner = self.inner.lock().unwrap();
        assert!(
            inner.current.is_none(),
            "start_frame called while a frame is already recording"
        );
        let primary = self.pool.acquire(CommandBufferLevel::Primary)?;
        self.device.begin_command_buffer(primary)?;
        let frame = Frame {
            index: inner.next_index,
            fence: self.device.create_fence(false),
            primary,
            transfer: None,
            transients: Vec::new(),
            staging: Vec::new(),
            referenced: Vec::new(),
        };
        log::trace!("frame {} recording", frame.index);
        inner.next_index += 1;
        inner.current = Some(frame);
        Ok(())
    }

    /// Flushes pending transfers, submits the primary buffer with the
    /// frame's fence, then retires every completed frame. A fence wait
    /// that times out here is a lost device.
    pub(crate) fn end_frame(&self) -> Result<(), GfxError> {
        let mut inner = self.inner.lock().unwrap();
        let frame = inner
            .current
            .take()
            .unwrap_or_else(|| panic!("end_frame called without a recording frame"));

        if let Some(transfer) = frame.transfer {
            self.device.end_command_buffer(transfer)?;
            self.device.submit(transfer, None)?;
        }
        self.device.end_command_buffer(frame.primary)?;
        self.device.submit(frame.primary, Some(frame.fence))?;
        log::trace!("frame {} submitted", frame.index);
        inner.submitted.push_back(frame);

        self.reclaim(&mut inner, false)
    }

    /// The primary command buffer of the recording frame.
    pub(crate) fn primary_cb(&self) -> RawCommandBufferId {
        let inner = self.inner.lock().unwrap();
        match &inner.current {
            Some(frame) => frame.primary,
            None => panic!("no frame is recording"),
        }
    }

    /// The frame's transfer command buffer, opened on first use. It is
    /// submitted ahead of the primary buffer so uploads land before the
    /// frame's draws execute.
    pub(crate) fn transfer_cb(&self) -> Result<RawCommandBufferId, GfxError> {
        let mut inner = self.inner.lock().unwrap();
        let device = &self.device;
        let pool = &self.pool;
        let frame = match inner.current.as_mut() {
            Some(frame) => frame,
            None => panic!("no frame is recording"),
        };
        if let Some(transfer) = frame.transfer {
            return Ok(transfer);
        }
        let transfer = pool.acquire(CommandBufferLevel::Primary)?;
        device.begin_command_buffer(transfer)?;
        frame.transfer = Some(transfer);
        Ok(transfer)
    }

    /// Pins an object until the recording frame is reclaimed.
    pub(crate) fn reference(&self, reference: FrameRef) {
        let mut inner = self.inner.lock().unwrap();
        match inner.current.as_mut() {
            Some(frame) => frame.referenced.push(reference),
            None => panic!("no frame is recording"),
        }
    }

    /// Registers a staging block to be freed when the frame completes.
    pub(crate) fn track_staging(&self, block: MemoryBlockRef) {
        let mut inner = self.inner.lock().unwrap();
        match inner.current.as_mut() {
            Some(frame) => frame.staging.push(block),
            None => panic!("no frame is recording"),
        }
    }

    /// Hands a submitted transient buffer to the recording frame.
    pub(crate) fn track_transient(&self, transient: TransientBuffer) {
        let mut inner = self.inner.lock().unwrap();
        match inner.current.as_mut() {
            Some(frame) => frame.transients.push(transient),
            None => panic!("no frame is recording"),
        }
    }

    /// Number of submitted frames not yet reclaimed.
    pub(crate) fn pending_frames(&self) -> usize {
        self.inner.lock().unwrap().submitted.len()
    }

    /// Discards any recording frame and force-completes every submitted
    /// one. Used at session shutdown.
    pub(crate) fn shutdown(&self) -> Result<(), GfxError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(frame) = inner.current.take() {
            log::debug!("discarding unsubmitted frame {}", frame.index);
            self.discard(frame);
        }
        self.reclaim(&mut inner, true)
    }

    fn reclaim(&self, inner: &mut TrackerInner, force: bool) -> Result<(), GfxError> {
        while let Some(front) = inner.submitted.front() {
            let over_cap = inner.submitted.len() > self.frames_in_flight;
            if force || over_cap {
                self.device.wait_fence(front.fence, self.fence_timeout_ms)?;
            } else if !self.device.fence_signalled(front.fence) {
                break;
            }
            if let Some(frame) = inner.submitted.pop_front() {
                self.retire(frame);
            }
        }
        Ok(())
    }

    fn retire(&self, frame: Frame) {
        log::trace!("frame {} retired", frame.index);
        self.pool.recycle(CommandBufferLevel::Primary, frame.primary);
        if let Some(transfer) = frame.transfer {
            self.pool.recycle(CommandBufferLevel::Primary, transfer);
        }
        for transient in frame.transients {
            self.pool.release(transient);
        }
        for block in frame.staging {
            if let Err(err) = self.allocator.free(block) {
                log::warn!("staging block release failed: {err}");
            }
        }
        drop(frame.referenced);
        self.device.destroy_fence(frame.fence);
        self.allocator.collect();
    }

    fn discard(&self, frame: Frame) {
        if let Err(err) = self.device.end_command_buffer(frame.primary) {
            log::warn!("failed to close discarded primary buffer: {err}");
        }
        self.pool.recycle(CommandBufferLevel::Primary, frame.primary);
        if let Some(transfer) = frame.transfer {
            if let Err(err) = self.device.end_command_buffer(transfer) {
                log::warn!("failed to close discarded transfer buffer: {err}");
            }
            self.pool.recycle(CommandBufferLevel::Primary, transfer);
        }
        for transient in frame.transients {
            self.pool.release(transient);
        }
        for block in frame.staging {
            if let Err(err) = self.allocator.free(block) {
                log::warn!("staging block release failed: {err}");
            }
        }
        self.device.destroy_fence(frame.fence);
        self.allocator.collect();
    }
}

impl Drop for FrameTracker {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::error!("frame tracker shutdown failed: {err}");
        }
    }
}
