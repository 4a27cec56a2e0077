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

//! Allocation and recycling of transient command buffers.
//!
//! A transient buffer decouples "the caller finished recording" from
//! "the GPU finished executing": it is only recycled once its owning
//! frame completes, or immediately if it was never submitted.

use garnet_core::error::GfxError;
use garnet_core::raw::{CommandBufferLevel, RawCommandBufferId, RawDevice};
use std::sync::{Arc, Mutex};

/// Lifecycle of a transient command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransientState {
    Allocated,
    Recording,
    Recorded,
    Submitted,
}

/// A pooled secondary command buffer with an explicit state machine.
#[derive(Debug)]
pub(crate) struct TransientBuffer {
    cb: RawCommandBufferId,
    state: TransientState,
}

impl TransientBuffer {
    pub(crate) fn id(&self) -> RawCommandBufferId {
        self.cb
    }
}

#[derive(Default)]
struct Recycled {
    primary: Vec<RawCommandBufferId>,
    secondary: Vec<RawCommandBufferId>,
}

/// Pool of reusable command buffers, driven by frame reclaim.
pub(crate) struct CommandPool {
    device: Arc<dyn RawDevice>,
    recycled: Mutex<Recycled>,
}

impl CommandPool {
    pub(crate) fn new(device: Arc<dyn RawDevice>) -> Self {
        Self {
            device,
            recycled: Mutex::new(Recycled::default()),
        }
    }

    /// A raw command buffer of the given level, recycled when possible.
    pub(crate) fn acquire(&self, level: CommandBufferLevel) -> Result<RawCommandBufferId, GfxError> {
        let recycled = {
            let mut lists = self.recycled.lock().unwrap();
            match level {
                CommandBufferLevel::Primary => lists.primary.pop(),
                CommandBufferLevel::Secondary => lists.secondary.pop(),
            }
        };
        match recycled {
            Some(cb) => Ok(cb),
            None => Ok(self.device.create_command_buffer(level)?),
        }
    }

    /// Returns a raw buffer to the recycle list.
    pub(crate) fn recycle(&self, level: CommandBufferLevel, cb: RawCommandBufferId) {
        let mut lists = self.recycled.lock().unwrap();
        match level {
            CommandBufferLevel::Primary => lists.primary.push(cb),
            CommandBufferLevel::Secondary => lists.secondary.push(cb),
        }
    }

    /// A secondary buffer in the `Allocated` state.
    pub(crate) fn allocate_transient(&self) -> Result<TransientBuffer, GfxError> {
        Ok(TransientBuffer {
            cb: self.acquire(CommandBufferLevel::Secondary)?,
            state: TransientState::Allocated,
        })
    }

    /// Opens a transient buffer for recording.
    pub(crate) fn begin(&self, transient: &mut TransientBuffer) -> Result<(), GfxError> {
        debug_assert_eq!(transient.state, TransientState::Allocated);
        self.device.begin_command_buffer(transient.cb)?;
        transient.state = TransientState::Recording;
        Ok(())
    }

    /// Closes recording; the buffer is ready to be executed.
    pub(crate) fn finish(&self, transient: &mut TransientBuffer) -> Result<(), GfxError> {
        debug_assert_eq!(transient.state, TransientState::Recording);
        self.device.end_command_buffer(transient.cb)?;
        transient.state = TransientState::Recorded;
        Ok(())
    }

    /// Marks the buffer as owned by a submitted frame.
    pub(crate) fn mark_submitted(&self, transient: &mut TransientBuffer) {
        debug_assert_eq!(transient.state, TransientState::Recorded);
        transient.state = TransientState::Submitted;
    }

    /// Takes a transient buffer back. Submitted buffers arrive here from
    /// frame reclaim; anything else was abandoned mid-recording and is
    /// recycled immediately.
    pub(crate) fn release(&self, transient: TransientBuffer) {
        if transient.state == TransientState::Recording {
            // Close it so the raw object is reusable.
            if let Err(err) = self.device.end_command_buffer(transient.cb) {
                log::warn!("failed to close abandoned command buffer: {err}");
            }
        }
        self.recycle(CommandBufferLevel::Secondary, transient.cb);
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        let lists = self.recycled.lock().unwrap();
        for &cb in lists.primary.iter().chain(lists.secondary.iter()) {
            self.device.free_command_buffer(cb);
        }
    }
}
