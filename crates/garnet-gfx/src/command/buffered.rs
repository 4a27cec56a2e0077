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

//! The buffered command list backend.
//!
//! Commands are recorded as small tagged values and replayed into a raw
//! command stream when the list is merged into a parent or submitted.
//! This is the variant used for child lists assembled off the main
//! thread, and for backends without native secondary command buffers.

use garnet_core::format::IndexFormat;
use garnet_core::raw::{RawBufferId, RawCommandBufferId, RawDescriptorId, RawDevice, RawPipelineId};
use garnet_core::state::{ScissorRect, Viewport};

/// One recorded command. State has already been resolved to raw handles
/// at record time, so replay is a direct translation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RecordedCommand {
    BindPipeline(RawPipelineId),
    BindDescriptor {
        slot: u32,
        descriptor: RawDescriptorId,
    },
    SetViewport(Viewport),
    SetScissor(ScissorRect),
    BindVertexBuffer {
        buffer: RawBufferId,
        offset: u64,
    },
    BindIndexBuffer {
        buffer: RawBufferId,
        offset: u64,
        format: IndexFormat,
    },
    Draw {
        vertex_count: u32,
        first_vertex: u32,
    },
    DrawIndexed {
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    },
}

/// Translates one recorded command into the raw stream.
pub(crate) fn record_one(device: &dyn RawDevice, cb: RawCommandBufferId, command: &RecordedCommand) {
    match command {
        RecordedCommand::BindPipeline(pipeline) => device.cmd_bind_pipeline(cb, *pipeline),
        RecordedCommand::BindDescriptor { slot, descriptor } => {
            device.cmd_bind_descriptor(cb, *slot, *descriptor)
        }
        RecordedCommand::SetViewport(viewport) => device.cmd_set_viewport(cb, *viewport),
        RecordedCommand::SetScissor(scissor) => device.cmd_set_scissor(cb, *scissor),
        RecordedCommand::BindVertexBuffer { buffer, offset } => {
            device.cmd_bind_vertex_buffer(cb, *buffer, *offset)
        }
        RecordedCommand::BindIndexBuffer {
            buffer,
            offset,
            format,
        } => device.cmd_bind_index_buffer(cb, *buffer, *offset, *format),
        RecordedCommand::Draw {
            vertex_count,
            first_vertex,
        } => device.cmd_draw(cb, *vertex_count, *first_vertex),
        RecordedCommand::DrawIndexed {
            index_count,
            first_index,
            vertex_offset,
        } => device.cmd_draw_indexed(cb, *index_count, *first_index, *vertex_offset),
    }
}

/// Replays recorded commands in order.
pub(crate) fn replay(
    device: &dyn RawDevice,
    cb: RawCommandBufferId,
    commands: &[RecordedCommand],
) {
    for command in commands {
        record_one(device, cb, command);
    }
}
