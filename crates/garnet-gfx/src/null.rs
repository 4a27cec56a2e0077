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

//! A recording [`RawDevice`] with no GPU behind it.
//!
//! Every recorded command is kept as a [`NullCommand`] and every object
//! table is inspectable, which is what the layer's tests assert against.
//! Fences auto-signal on wait by default; manual mode leaves them to the
//! test, and an unsignalled wait then reports a timeout. A memory budget
//! can be set to provoke allocation failure.

use garnet_core::binding::ResourceSetLayoutDesc;
use garnet_core::error::{AllocationError, DeviceError};
use garnet_core::format::IndexFormat;
use garnet_core::image::{BufferImageCopy, ImageBlit, ImageDescriptor, SamplerDesc};
use garnet_core::memory::{
    BufferUsage, MemoryPropertyFlags, MemoryRequirements, MemoryType,
};
use garnet_core::raw::{
    CommandBufferLevel, DescriptorBindingDesc, DescriptorWrite, DeviceLimits, FramebufferDesc,
    PipelineDesc, RawBufferId, RawCommandBufferId, RawDescriptorId, RawDescriptorLayoutId,
    RawDevice, RawFenceId, RawFramebufferId, RawImageId, RawMemoryId, RawPipelineId,
    RawProgramId, RawRenderPassId, RawSamplerId, RenderPassDesc,
};
use garnet_core::state::{ClearValue, ScissorRect, Viewport};
use std::collections::HashMap;
use std::sync::Mutex;

/// One command recorded into a null command buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum NullCommand {
    /// `cmd_begin_pass`.
    BeginPass {
        /// The pass begun.
        pass: RawRenderPassId,
        /// The framebuffer bound.
        framebuffer: RawFramebufferId,
        /// The supplied clear values.
        clear_values: Vec<ClearValue>,
    },
    /// `cmd_end_pass`.
    EndPass,
    /// `cmd_bind_pipeline`.
    BindPipeline(RawPipelineId),
    /// `cmd_bind_descriptor`.
    BindDescriptor {
        /// The set slot.
        slot: u32,
        /// The bound descriptor.
        descriptor: RawDescriptorId,
    },
    /// `cmd_set_viewport`.
    SetViewport(Viewport),
    /// `cmd_set_scissor`.
    SetScissor(ScissorRect),
    /// `cmd_bind_vertex_buffer`.
    BindVertexBuffer {
        /// The bound buffer.
        buffer: RawBufferId,
        /// The byte offset.
        offset: u64,
    },
    /// `cmd_bind_index_buffer`.
    BindIndexBuffer {
        /// The bound buffer.
        buffer: RawBufferId,
        /// The byte offset.
        offset: u64,
        /// The index format.
        format: IndexFormat,
    },
    /// `cmd_draw`.
    Draw {
        /// Vertices drawn.
        vertex_count: u32,
        /// First vertex.
        first_vertex: u32,
    },
    /// `cmd_draw_indexed`.
    DrawIndexed {
        /// Indices drawn.
        index_count: u32,
        /// First index.
        first_index: u32,
        /// Signed base vertex.
        vertex_offset: i32,
    },
    /// `cmd_execute_commands`.
    Execute(RawCommandBufferId),
    /// `cmd_copy_buffer`.
    CopyBuffer {
        /// Source buffer.
        src: RawBufferId,
        /// Source byte offset.
        src_offset: u64,
        /// Destination buffer.
        dst: RawBufferId,
        /// Destination byte offset.
        dst_offset: u64,
        /// Bytes copied.
        size: u64,
    },
    /// `cmd_copy_buffer_to_image`.
    CopyBufferToImage {
        /// Source buffer.
        src: RawBufferId,
        /// Destination image.
        dst: RawImageId,
        /// The copy region.
        region: BufferImageCopy,
    },
    /// `cmd_blit_image`.
    BlitImage {
        /// The blitted image.
        image: RawImageId,
        /// The blit region.
        blit: ImageBlit,
    },
}

#[derive(Debug)]
struct NullMemory {
    size: u64,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct NullState {
    next_id: u64,
    uniform_offset_alignment: u64,
    memory: HashMap<RawMemoryId, NullMemory>,
    allocated_bytes: u64,
    budget: Option<u64>,
    buffers: HashMap<RawBufferId, u64>,
    images: HashMap<RawImageId, ImageDescriptor>,
    samplers: usize,
    fences: HashMap<RawFenceId, bool>,
    manual_fences: bool,
    commands: HashMap<RawCommandBufferId, Vec<NullCommand>>,
    submissions: Vec<RawCommandBufferId>,
    layouts: HashMap<RawDescriptorLayoutId, usize>,
    descriptors: HashMap<RawDescriptorId, Vec<Option<DescriptorBindingDesc>>>,
    passes: usize,
    framebuffers: HashMap<RawFramebufferId, FramebufferDesc>,
    pipeline_bases: HashMap<RawPipelineId, Option<RawPipelineId>>,
    pipelines_created: usize,
}

/// A device that records everything and executes nothing.
#[derive(Debug)]
pub struct NullDevice {
    memory_types: Vec<MemoryType>,
    state: Mutex<NullState>,
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl NullDevice {
    /// A device with a typical discrete-GPU memory type list.
    pub fn new() -> Self {
        Self::with_memory_types(vec![
            MemoryType {
                properties: MemoryPropertyFlags::DEVICE_LOCAL,
            },
            MemoryType {
                properties: MemoryPropertyFlags::DEVICE_LOCAL
                    | MemoryPropertyFlags::HOST_VISIBLE
                    | MemoryPropertyFlags::HOST_COHERENT,
            },
            MemoryType {
                properties: MemoryPropertyFlags::HOST_VISIBLE
                    | MemoryPropertyFlags::HOST_COHERENT,
            },
            MemoryType {
                properties: MemoryPropertyFlags::HOST_VISIBLE
                    | MemoryPropertyFlags::HOST_COHERENT
                    | MemoryPropertyFlags::HOST_CACHED,
            },
        ])
    }

    /// A device advertising exactly the given memory types.
    pub fn with_memory_types(memory_types: Vec<MemoryType>) -> Self {
        let state = NullState {
            uniform_offset_alignment: 256,
            ..NullState::default()
        };
        Self {
            memory_types,
            state: Mutex::new(state),
        }
    }

    /// Overrides the advertised uniform-buffer offset alignment.
    pub fn set_uniform_offset_alignment(&self, align: u64) {
        self.state.lock().unwrap().uniform_offset_alignment = align;
    }

    /// Caps total allocatable device memory; further allocations fail.
    pub fn set_memory_budget(&self, budget: Option<u64>) {
        self.state.lock().unwrap().budget = budget;
    }

    /// In manual mode fences only signal through [`NullDevice::signal_fence`]
    /// or [`NullDevice::signal_all_fences`], and waiting on an unsignalled
    /// fence reports a timeout.
    pub fn set_manual_fences(&self, manual: bool) {
        self.state.lock().unwrap().manual_fences = manual;
    }

    /// Signals one fence.
    pub fn signal_fence(&self, fence: RawFenceId) {
        if let Some(signalled) = self.state.lock().unwrap().fences.get_mut(&fence) {
            *signalled = true;
        }
    }

    /// Signals every live fence.
    pub fn signal_all_fences(&self) {
        for signalled in self.state.lock().unwrap().fences.values_mut() {
            *signalled = true;
        }
    }

    /// The commands recorded into one buffer since its last begin.
    pub fn commands(&self, cb: RawCommandBufferId) -> Vec<NullCommand> {
        self.state
            .lock()
            .unwrap()
            .commands
            .get(&cb)
            .cloned()
            .unwrap_or_default()
    }

    /// Like [`NullDevice::commands`], with every [`NullCommand::Execute`]
    /// expanded to the executed buffer's commands.
    pub fn flattened_commands(&self, cb: RawCommandBufferId) -> Vec<NullCommand> {
        let state = self.state.lock().unwrap();
        Self::flatten(&state, cb)
    }

    /// Submitted buffers, in submission order.
    pub fn submissions(&self) -> Vec<RawCommandBufferId> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Every submitted command in queue order, with secondary executions
    /// expanded inline.
    pub fn submitted_commands(&self) -> Vec<NullCommand> {
        let state = self.state.lock().unwrap();
        let mut all = Vec::new();
        for &cb in &state.submissions {
            all.extend(Self::flatten(&state, cb));
        }
        all
    }

    /// Number of live framebuffer objects.
    pub fn live_framebuffers(&self) -> usize {
        self.state.lock().unwrap().framebuffers.len()
    }

    /// Number of live native descriptor objects.
    pub fn live_descriptors(&self) -> usize {
        self.state.lock().unwrap().descriptors.len()
    }

    /// The slot contents of one native descriptor.
    pub fn descriptor_bindings(&self, descriptor: RawDescriptorId) -> Vec<Option<DescriptorBindingDesc>> {
        self.state
            .lock()
            .unwrap()
            .descriptors
            .get(&descriptor)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of pipeline state objects ever compiled.
    pub fn pipelines_created(&self) -> usize {
        self.state.lock().unwrap().pipelines_created
    }

    /// The derivation base a pipeline was compiled with.
    pub fn pipeline_base(&self, pipeline: RawPipelineId) -> Option<RawPipelineId> {
        self.state
            .lock()
            .unwrap()
            .pipeline_bases
            .get(&pipeline)
            .copied()
            .flatten()
    }

    /// The bytes written into one memory allocation so far.
    pub fn memory_contents(&self, memory: RawMemoryId) -> Vec<u8> {
        self.state
            .lock()
            .unwrap()
            .memory
            .get(&memory)
            .map(|memory| memory.bytes.clone())
            .unwrap_or_default()
    }

    fn flatten(state: &NullState, cb: RawCommandBufferId) -> Vec<NullCommand> {
        let mut flat = Vec::new();
        let Some(commands) = state.commands.get(&cb) else {
            return flat;
        };
        for command in commands {
            match command {
                NullCommand::Execute(secondary) => flat.extend(Self::flatten(state, *secondary)),
                other => flat.push(other.clone()),
            }
        }
        flat
    }

    fn next_id(state: &mut NullState) -> u64 {
        state.next_id += 1;
        state.next_id
    }

    fn record(&self, cb: RawCommandBufferId, command: NullCommand) {
        let mut state = self.state.lock().unwrap();
        state.commands.entry(cb).or_default().push(command);
    }
}

impl RawDevice for NullDevice {
    fn memory_types(&self) -> Vec<MemoryType> {
        self.memory_types.clone()
    }

    fn limits(&self) -> DeviceLimits {
        DeviceLimits {
            min_uniform_offset_alignment: self.state.lock().unwrap().uniform_offset_alignment,
        }
    }

    fn allocate_memory(&self, _memory_type: u32, size: u64) -> Result<RawMemoryId, AllocationError> {
        let mut state = self.state.lock().unwrap();
        if let Some(budget) = state.budget {
            if state.allocated_bytes + size > budget {
                return Err(AllocationError::OutOfDeviceMemory { requested: size });
            }
        }
        state.allocated_bytes += size;
        let id = RawMemoryId(Self::next_id(&mut state));
        state.memory.insert(
            id,
            NullMemory {
                size,
                bytes: Vec::new(),
            },
        );
        Ok(id)
    }

    fn free_memory(&self, memory: RawMemoryId) {
        let mut state = self.state.lock().unwrap();
        if let Some(freed) = state.memory.remove(&memory) {
            state.allocated_bytes -= freed.size;
        }
    }

    fn write_memory(&self, memory: RawMemoryId, offset: u64, data: &[u8]) -> Result<(), DeviceError> {
        let mut state = self.state.lock().unwrap();
        let memory = state
            .memory
            .get_mut(&memory)
            .ok_or_else(|| DeviceError::Backend("write to unknown memory".into()))?;
        let end = offset + data.len() as u64;
        if end > memory.size {
            return Err(DeviceError::Backend("write past end of memory".into()));
        }
        if memory.bytes.len() < end as usize {
            memory.bytes.resize(end as usize, 0);
        }
        memory.bytes[offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }

    fn create_buffer(
        &self,
        size: u64,
        _usage: BufferUsage,
        _label: Option<&str>,
    ) -> Result<RawBufferId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        let id = RawBufferId(Self::next_id(&mut state));
        state.buffers.insert(id, size);
        Ok(id)
    }

    fn buffer_requirements(&self, buffer: RawBufferId) -> MemoryRequirements {
        let state = self.state.lock().unwrap();
        MemoryRequirements {
            size: state.buffers.get(&buffer).copied().unwrap_or(0),
            alignment: 256,
            memory_type_mask: !0,
        }
    }

    fn bind_buffer_memory(
        &self,
        _buffer: RawBufferId,
        _memory: RawMemoryId,
        _offset: u64,
    ) -> Result<(), DeviceError> {
        Ok(())
    }

    fn destroy_buffer(&self, buffer: RawBufferId) {
        self.state.lock().unwrap().buffers.remove(&buffer);
    }

    fn create_image(&self, descriptor: &ImageDescriptor) -> Result<RawImageId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        let id = RawImageId(Self::next_id(&mut state));
        state.images.insert(id, descriptor.clone());
        Ok(id)
    }

    fn image_requirements(&self, image: RawImageId) -> MemoryRequirements {
        let state = self.state.lock().unwrap();
        let size = state
            .images
            .get(&image)
            .map(|descriptor| {
                (0..descriptor.mip_levels)
                    .map(|level| {
                        let extent = descriptor.extent.mip_extent(level);
                        u64::from(extent.width)
                            * u64::from(extent.height)
                            * u64::from(extent.depth)
                            * u64::from(descriptor.format.bytes_per_texel())
                    })
                    .sum()
            })
            .unwrap_or(0);
        MemoryRequirements {
            size,
            alignment: 1024,
            memory_type_mask: !0,
        }
    }

    fn bind_image_memory(
        &self,
        _image: RawImageId,
        _memory: RawMemoryId,
        _offset: u64,
    ) -> Result<(), DeviceError> {
        Ok(())
    }

    fn destroy_image(&self, image: RawImageId) {
        self.state.lock().unwrap().images.remove(&image);
    }

    fn create_sampler(&self, _descriptor: &SamplerDesc) -> Result<RawSamplerId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        state.samplers += 1;
        Ok(RawSamplerId(Self::next_id(&mut state)))
    }

    fn destroy_sampler(&self, _sampler: RawSamplerId) {
        self.state.lock().unwrap().samplers -= 1;
    }

    fn create_fence(&self, signalled: bool) -> RawFenceId {
        let mut state = self.state.lock().unwrap();
        let id = RawFenceId(Self::next_id(&mut state));
        state.fences.insert(id, signalled);
        id
    }

    fn fence_signalled(&self, fence: RawFenceId) -> bool {
        self.state
            .lock()
            .unwrap()
            .fences
            .get(&fence)
            .copied()
            .unwrap_or(false)
    }

    fn wait_fence(&self, fence: RawFenceId, timeout_ms: u64) -> Result<(), DeviceError> {
        let mut state = self.state.lock().unwrap();
        let manual = state.manual_fences;
        match state.fences.get_mut(&fence) {
            Some(signalled) if *signalled => Ok(()),
            Some(signalled) if !manual => {
                *signalled = true;
                Ok(())
            }
            Some(_) => Err(DeviceError::FenceTimeout {
                waited_ms: timeout_ms,
            }),
            None => Err(DeviceError::Backend("wait on unknown fence".into())),
        }
    }

    fn destroy_fence(&self, fence: RawFenceId) {
        self.state.lock().unwrap().fences.remove(&fence);
    }

    fn create_command_buffer(
        &self,
        _level: CommandBufferLevel,
    ) -> Result<RawCommandBufferId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        let id = RawCommandBufferId(Self::next_id(&mut state));
        state.commands.insert(id, Vec::new());
        Ok(id)
    }

    fn begin_command_buffer(&self, cb: RawCommandBufferId) -> Result<(), DeviceError> {
        self.state.lock().unwrap().commands.insert(cb, Vec::new());
        Ok(())
    }

    fn end_command_buffer(&self, _cb: RawCommandBufferId) -> Result<(), DeviceError> {
        Ok(())
    }

    fn free_command_buffer(&self, cb: RawCommandBufferId) {
        self.state.lock().unwrap().commands.remove(&cb);
    }

    fn cmd_begin_pass(
        &self,
        cb: RawCommandBufferId,
        pass: RawRenderPassId,
        framebuffer: RawFramebufferId,
        clear_values: &[ClearValue],
    ) {
        self.record(
            cb,
            NullCommand::BeginPass {
                pass,
                framebuffer,
                clear_values: clear_values.to_vec(),
            },
        );
    }

    fn cmd_end_pass(&self, cb: RawCommandBufferId) {
        self.record(cb, NullCommand::EndPass);
    }

    fn cmd_bind_pipeline(&self, cb: RawCommandBufferId, pipeline: RawPipelineId) {
        self.record(cb, NullCommand::BindPipeline(pipeline));
    }

    fn cmd_bind_descriptor(&self, cb: RawCommandBufferId, slot: u32, descriptor: RawDescriptorId) {
        self.record(cb, NullCommand::BindDescriptor { slot, descriptor });
    }

    fn cmd_set_viewport(&self, cb: RawCommandBufferId, viewport: Viewport) {
        self.record(cb, NullCommand::SetViewport(viewport));
    }

    fn cmd_set_scissor(&self, cb: RawCommandBufferId, scissor: ScissorRect) {
        self.record(cb, NullCommand::SetScissor(scissor));
    }

    fn cmd_bind_vertex_buffer(&self, cb: RawCommandBufferId, buffer: RawBufferId, offset: u64) {
        self.record(cb, NullCommand::BindVertexBuffer { buffer, offset });
    }

    fn cmd_bind_index_buffer(
        &self,
        cb: RawCommandBufferId,
        buffer: RawBufferId,
        offset: u64,
        format: IndexFormat,
    ) {
        self.record(
            cb,
            NullCommand::BindIndexBuffer {
                buffer,
                offset,
                format,
            },
        );
    }

    fn cmd_draw(&self, cb: RawCommandBufferId, vertex_count: u32, first_vertex: u32) {
        self.record(
            cb,
            NullCommand::Draw {
                vertex_count,
                first_vertex,
            },
        );
    }

    fn cmd_draw_indexed(
        &self,
        cb: RawCommandBufferId,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) {
        self.record(
            cb,
            NullCommand::DrawIndexed {
                index_count,
                first_index,
                vertex_offset,
            },
        );
    }

    fn cmd_execute_commands(&self, cb: RawCommandBufferId, secondary: RawCommandBufferId) {
        self.record(cb, NullCommand::Execute(secondary));
    }

    fn cmd_copy_buffer(
        &self,
        cb: RawCommandBufferId,
        src: RawBufferId,
        src_offset: u64,
        dst: RawBufferId,
        dst_offset: u64,
        size: u64,
    ) {
        self.record(
            cb,
            NullCommand::CopyBuffer {
                src,
                src_offset,
                dst,
                dst_offset,
                size,
            },
        );
    }

    fn cmd_copy_buffer_to_image(
        &self,
        cb: RawCommandBufferId,
        src: RawBufferId,
        dst: RawImageId,
        region: &BufferImageCopy,
    ) {
        self.record(
            cb,
            NullCommand::CopyBufferToImage {
                src,
                dst,
                region: *region,
            },
        );
    }

    fn cmd_blit_image(&self, cb: RawCommandBufferId, image: RawImageId, blit: &ImageBlit) {
        self.record(cb, NullCommand::BlitImage { image, blit: *blit });
    }

    fn create_descriptor_layout(
        &self,
        descriptor: &ResourceSetLayoutDesc,
    ) -> Result<RawDescriptorLayoutId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        let id = RawDescriptorLayoutId(Self::next_id(&mut state));
        state.layouts.insert(id, descriptor.slots.len());
        Ok(id)
    }

    fn destroy_descriptor_layout(&self, layout: RawDescriptorLayoutId) {
        self.state.lock().unwrap().layouts.remove(&layout);
    }

    fn allocate_descriptor(
        &self,
        layout: RawDescriptorLayoutId,
    ) -> Result<RawDescriptorId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        let slots = state
            .layouts
            .get(&layout)
            .copied()
            .ok_or_else(|| DeviceError::Backend("allocation from unknown layout".into()))?;
        let id = RawDescriptorId(Self::next_id(&mut state));
        state.descriptors.insert(id, vec![None; slots]);
        Ok(id)
    }

    fn update_descriptor(&self, descriptor: RawDescriptorId, writes: &[DescriptorWrite]) {
        let mut state = self.state.lock().unwrap();
        if let Some(slots) = state.descriptors.get_mut(&descriptor) {
            for write in writes {
                if let Some(slot) = slots.get_mut(write.slot as usize) {
                    *slot = Some(write.binding);
                }
            }
        }
    }

    fn copy_descriptor(&self, src: RawDescriptorId, dst: RawDescriptorId, slots: &[u32]) {
        let mut state = self.state.lock().unwrap();
        let copied: Vec<(u32, Option<DescriptorBindingDesc>)> = match state.descriptors.get(&src) {
            Some(source) => slots
                .iter()
                .map(|&slot| (slot, source.get(slot as usize).copied().flatten()))
                .collect(),
            None => return,
        };
        if let Some(target) = state.descriptors.get_mut(&dst) {
            for (slot, binding) in copied {
                if let Some(slot) = target.get_mut(slot as usize) {
                    *slot = binding;
                }
            }
        }
    }

    fn free_descriptor(&self, descriptor: RawDescriptorId) {
        self.state.lock().unwrap().descriptors.remove(&descriptor);
    }

    fn create_render_pass(
        &self,
        _descriptor: &RenderPassDesc,
    ) -> Result<RawRenderPassId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        state.passes += 1;
        Ok(RawRenderPassId(Self::next_id(&mut state)))
    }

    fn destroy_render_pass(&self, _pass: RawRenderPassId) {
        self.state.lock().unwrap().passes -= 1;
    }

    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDesc,
    ) -> Result<RawFramebufferId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        let id = RawFramebufferId(Self::next_id(&mut state));
        state.framebuffers.insert(id, descriptor.clone());
        Ok(id)
    }

    fn destroy_framebuffer(&self, framebuffer: RawFramebufferId) {
        self.state.lock().unwrap().framebuffers.remove(&framebuffer);
    }

    fn create_program(&self, _label: Option<&str>) -> RawProgramId {
        let mut state = self.state.lock().unwrap();
        RawProgramId(Self::next_id(&mut state))
    }

    fn create_pipeline(&self, descriptor: &PipelineDesc) -> Result<RawPipelineId, DeviceError> {
        let mut state = self.state.lock().unwrap();
        let id = RawPipelineId(Self::next_id(&mut state));
        state.pipeline_bases.insert(id, descriptor.base);
        state.pipelines_created += 1;
        Ok(id)
    }

    fn destroy_pipeline(&self, pipeline: RawPipelineId) {
        self.state.lock().unwrap().pipeline_bases.remove(&pipeline);
    }

    fn submit(
        &self,
        cb: RawCommandBufferId,
        fence: Option<RawFenceId>,
    ) -> Result<(), DeviceError> {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(cb);
        // With auto fences the queue "completes" instantly.
        if !state.manual_fences {
            if let Some(fence) = fence {
                if let Some(signalled) = state.fences.get_mut(&fence) {
                    *signalled = true;
                }
            }
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<(), DeviceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_state_is_debug_formattable() {
        let device = NullDevice::new();
        let _fence = device.create_fence(false);
        let memory = device.allocate_memory(0, 64).unwrap();
        device.write_memory(memory, 0, &[1, 2, 3]).unwrap();
        let text = format!("{device:?}");
        assert!(text.contains("NullDevice"));
    }

    #[test]
    fn limits_report_the_configured_alignment() {
        let device = NullDevice::new();
        assert_eq!(device.limits().min_uniform_offset_alignment, 256);
        device.set_uniform_offset_alignment(64);
        assert_eq!(device.limits().min_uniform_offset_alignment, 64);
    }
}
