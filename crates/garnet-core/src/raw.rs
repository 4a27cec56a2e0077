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

//! The raw device contract.
//!
//! [`RawDevice`] is the boundary to the explicit low-level graphics API:
//! manual device memory, fences, primary/secondary command buffers,
//! descriptors, render passes, and pipelines. Everything above it
//! (allocation, frame lifetimes, command recording, caching) lives in the
//! `garnet-gfx` implementation layer and is backend-agnostic.
//!
//! Handles are opaque ID newtypes. The device owns the objects behind
//! them; the upper layer is responsible for not destroying an object the
//! GPU may still read, which it guarantees through frame fences and
//! reference counting.

use crate::binding::ResourceSetLayoutDesc;
use crate::error::{AllocationError, DeviceError};
use crate::format::{IndexFormat, TextureFormat};
use crate::image::{BufferImageCopy, ImageBlit, ImageDescriptor, SamplerDesc};
use crate::memory::{BufferUsage, MemoryRequirements, MemoryType};
use crate::state::{
    BlendStateDesc, ClearValue, DepthStencilStateDesc, PrimitiveTopology, RasterizerStateDesc,
    ScissorRect, Viewport,
};
use crate::vertex::VertexLayout;
use std::borrow::Cow;
use std::fmt::Debug;

macro_rules! raw_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);
    };
}

raw_id!(
    /// An opaque handle to one device memory allocation.
    RawMemoryId
);
raw_id!(
    /// An opaque handle to a raw buffer object (unbound until
    /// [`RawDevice::bind_buffer_memory`]).
    RawBufferId
);
raw_id!(
    /// An opaque handle to a raw image object.
    RawImageId
);
raw_id!(
    /// An opaque handle to a sampler.
    RawSamplerId
);
raw_id!(
    /// An opaque handle to a fence.
    RawFenceId
);
raw_id!(
    /// An opaque handle to a command buffer.
    RawCommandBufferId
);
raw_id!(
    /// An opaque handle to a descriptor layout.
    RawDescriptorLayoutId
);
raw_id!(
    /// An opaque handle to one native descriptor object.
    RawDescriptorId
);
raw_id!(
    /// An opaque handle to a render pass object.
    RawRenderPassId
);
raw_id!(
    /// An opaque handle to a framebuffer object.
    RawFramebufferId
);
raw_id!(
    /// An opaque handle to a compiled shader program, supplied by the
    /// shader subsystem. Pipelines derive from programs.
    RawProgramId
);
raw_id!(
    /// An opaque handle to a compiled pipeline state object.
    RawPipelineId
);

/// The nesting level of a command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandBufferLevel {
    /// Submitted directly to a queue.
    Primary,
    /// Executed from within a primary buffer.
    Secondary,
}

/// What happens to an attachment's contents when a pass begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// Preserve the existing contents.
    Load,
    /// Clear to the value supplied at pass begin.
    Clear,
    /// Contents are undefined; cheapest when fully overwritten.
    DontCare,
}

/// What happens to an attachment's contents when a pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Write results to memory.
    Store,
    /// Discard results.
    Discard,
}

/// One attachment of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentDesc {
    /// Texel format of the attachment.
    pub format: TextureFormat,
    /// Multisample count.
    pub samples: u32,
    /// Load behavior at pass begin.
    pub load: LoadOp,
    /// Store behavior at pass end.
    pub store: StoreOp,
}

/// A descriptor used to create a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassDesc {
    /// Color attachments in slot order.
    pub colors: Vec<AttachmentDesc>,
    /// Optional depth/stencil attachment.
    pub depth: Option<AttachmentDesc>,
}

/// A descriptor used to create a framebuffer for a compatible pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferDesc {
    /// The pass this framebuffer is created against.
    pub pass: RawRenderPassId,
    /// Bound images: colors in slot order, then depth if present.
    pub attachments: Vec<RawImageId>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A descriptor used to compile a pipeline state object.
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    /// Optional debug label.
    pub label: Option<Cow<'static, str>>,
    /// The shader program the pipeline executes.
    pub program: RawProgramId,
    /// A pass the pipeline will be compatible with.
    pub pass: RawRenderPassId,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Vertex input layout.
    pub vertex_layout: VertexLayout,
    /// Blend state.
    pub blend: BlendStateDesc,
    /// Depth/stencil state.
    pub depth_stencil: DepthStencilStateDesc,
    /// Rasterizer state.
    pub rasterizer: RasterizerStateDesc,
    /// If set, create this pipeline as a derivative of `base`, which is
    /// faster and hints the driver that the two share structure.
    pub base: Option<RawPipelineId>,
}

/// The value written into one descriptor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorBindingDesc {
    /// A uniform buffer range.
    UniformBuffer {
        /// The raw buffer.
        buffer: RawBufferId,
        /// Byte offset of the bound range.
        offset: u64,
        /// Byte length of the bound range.
        range: u64,
    },
    /// A sampled image, sampled with a separately bound sampler.
    SampledTexture {
        /// The raw image.
        image: RawImageId,
    },
    /// A standalone sampler.
    Sampler {
        /// The sampler.
        sampler: RawSamplerId,
    },
    /// A sampled image paired with its sampler in one slot.
    CombinedTextureSampler {
        /// The raw image.
        image: RawImageId,
        /// The sampler.
        sampler: RawSamplerId,
    },
}

/// Static limits of a device, queried once at session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Required alignment of uniform-buffer offsets bound in descriptors.
    pub min_uniform_offset_alignment: u64,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            min_uniform_offset_alignment: 256,
        }
    }
}

/// One slot update applied by [`RawDevice::update_descriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorWrite {
    /// The slot index within the descriptor.
    pub slot: u32,
    /// The value written.
    pub binding: DescriptorBindingDesc,
}

/// The explicit low-level graphics device.
///
/// Implementations translate these calls into a concrete driver API. The
/// upper layer serializes all mutation onto the thread driving frame
/// progression; implementations may assume calls do not race for the same
/// object but must tolerate concurrent calls for distinct objects.
pub trait RawDevice: Send + Sync + Debug + 'static {
    // --- Device memory ---

    /// The device's ordered memory type list. Ordering is part of the
    /// contract: earlier entries are preferred on ties, so the best and
    /// most restrictive types come first.
    fn memory_types(&self) -> Vec<MemoryType>;

    /// The device's static limits. Constant for the device's lifetime.
    fn limits(&self) -> DeviceLimits;

    /// Allocates one block of device memory from the given type index.
    fn allocate_memory(
        &self,
        memory_type: u32,
        size: u64,
    ) -> Result<RawMemoryId, AllocationError>;

    /// Releases a device memory allocation.
    fn free_memory(&self, memory: RawMemoryId);

    /// Writes bytes into host-visible memory at the given offset.
    fn write_memory(
        &self,
        memory: RawMemoryId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), DeviceError>;

    // --- Buffers and images ---

    /// Creates an unbound buffer object.
    fn create_buffer(
        &self,
        size: u64,
        usage: BufferUsage,
        label: Option<&str>,
    ) -> Result<RawBufferId, DeviceError>;

    /// Reports the memory placement constraints of a buffer.
    fn buffer_requirements(&self, buffer: RawBufferId) -> MemoryRequirements;

    /// Binds a buffer to device memory at an offset.
    fn bind_buffer_memory(
        &self,
        buffer: RawBufferId,
        memory: RawMemoryId,
        offset: u64,
    ) -> Result<(), DeviceError>;

    /// Destroys a buffer object. The backing memory is released
    /// separately by the allocator.
    fn destroy_buffer(&self, buffer: RawBufferId);

    /// Creates an unbound image object.
    fn create_image(&self, descriptor: &ImageDescriptor) -> Result<RawImageId, DeviceError>;

    /// Reports the memory placement constraints of an image.
    fn image_requirements(&self, image: RawImageId) -> MemoryRequirements;

    /// Binds an image to device memory at an offset.
    fn bind_image_memory(
        &self,
        image: RawImageId,
        memory: RawMemoryId,
        offset: u64,
    ) -> Result<(), DeviceError>;

    /// Destroys an image object.
    fn destroy_image(&self, image: RawImageId);

    /// Creates a sampler.
    fn create_sampler(&self, descriptor: &SamplerDesc) -> Result<RawSamplerId, DeviceError>;

    /// Destroys a sampler.
    fn destroy_sampler(&self, sampler: RawSamplerId);

    // --- Fences ---

    /// Creates a fence, optionally already signalled.
    fn create_fence(&self, signalled: bool) -> RawFenceId;

    /// Polls a fence without blocking.
    fn fence_signalled(&self, fence: RawFenceId) -> bool;

    /// Blocks until a fence signals or the timeout elapses. A timeout is
    /// a [`DeviceError::FenceTimeout`], which the upper layer treats as a
    /// lost device.
    fn wait_fence(&self, fence: RawFenceId, timeout_ms: u64) -> Result<(), DeviceError>;

    /// Destroys a fence.
    fn destroy_fence(&self, fence: RawFenceId);

    // --- Command buffers ---

    /// Creates a command buffer of the given level.
    fn create_command_buffer(
        &self,
        level: CommandBufferLevel,
    ) -> Result<RawCommandBufferId, DeviceError>;

    /// Begins recording, resetting any previous contents.
    fn begin_command_buffer(&self, cb: RawCommandBufferId) -> Result<(), DeviceError>;

    /// Ends recording.
    fn end_command_buffer(&self, cb: RawCommandBufferId) -> Result<(), DeviceError>;

    /// Frees a command buffer.
    fn free_command_buffer(&self, cb: RawCommandBufferId);

    // --- Recording ---

    /// Begins a render pass on a primary command buffer.
    fn cmd_begin_pass(
        &self,
        cb: RawCommandBufferId,
        pass: RawRenderPassId,
        framebuffer: RawFramebufferId,
        clear_values: &[ClearValue],
    );

    /// Ends the current render pass.
    fn cmd_end_pass(&self, cb: RawCommandBufferId);

    /// Binds a pipeline state object.
    fn cmd_bind_pipeline(&self, cb: RawCommandBufferId, pipeline: RawPipelineId);

    /// Binds a descriptor at a set slot.
    fn cmd_bind_descriptor(&self, cb: RawCommandBufferId, slot: u32, descriptor: RawDescriptorId);

    /// Sets the viewport.
    fn cmd_set_viewport(&self, cb: RawCommandBufferId, viewport: Viewport);

    /// Sets the scissor rectangle.
    fn cmd_set_scissor(&self, cb: RawCommandBufferId, scissor: ScissorRect);

    /// Binds a vertex buffer at binding slot zero.
    fn cmd_bind_vertex_buffer(&self, cb: RawCommandBufferId, buffer: RawBufferId, offset: u64);

    /// Binds an index buffer.
    fn cmd_bind_index_buffer(
        &self,
        cb: RawCommandBufferId,
        buffer: RawBufferId,
        offset: u64,
        format: IndexFormat,
    );

    /// Records a non-indexed draw.
    fn cmd_draw(&self, cb: RawCommandBufferId, vertex_count: u32, first_vertex: u32);

    /// Records an indexed draw.
    fn cmd_draw_indexed(
        &self,
        cb: RawCommandBufferId,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    );

    /// Executes a recorded secondary buffer from a primary buffer.
    fn cmd_execute_commands(&self, cb: RawCommandBufferId, secondary: RawCommandBufferId);

    /// Records a buffer-to-buffer copy.
    fn cmd_copy_buffer(
        &self,
        cb: RawCommandBufferId,
        src: RawBufferId,
        src_offset: u64,
        dst: RawBufferId,
        dst_offset: u64,
        size: u64,
    );

    /// Records a buffer-to-image copy.
    fn cmd_copy_buffer_to_image(
        &self,
        cb: RawCommandBufferId,
        src: RawBufferId,
        dst: RawImageId,
        region: &BufferImageCopy,
    );

    /// Records a blit between two mip levels of one image.
    fn cmd_blit_image(&self, cb: RawCommandBufferId, image: RawImageId, blit: &ImageBlit);

    // --- Descriptors ---

    /// Creates a descriptor layout from a slot description.
    fn create_descriptor_layout(
        &self,
        descriptor: &ResourceSetLayoutDesc,
    ) -> Result<RawDescriptorLayoutId, DeviceError>;

    /// Destroys a descriptor layout.
    fn destroy_descriptor_layout(&self, layout: RawDescriptorLayoutId);

    /// Allocates one native descriptor object of a layout.
    fn allocate_descriptor(
        &self,
        layout: RawDescriptorLayoutId,
    ) -> Result<RawDescriptorId, DeviceError>;

    /// Writes slot bindings into a descriptor. Undefined behavior on a
    /// real driver if the descriptor is concurrently read by the GPU; the
    /// upper layer's copy-on-write scheme prevents that.
    fn update_descriptor(&self, descriptor: RawDescriptorId, writes: &[DescriptorWrite]);

    /// Copies the given slots from one descriptor to another of the same
    /// layout.
    fn copy_descriptor(&self, src: RawDescriptorId, dst: RawDescriptorId, slots: &[u32]);

    /// Frees a native descriptor object.
    fn free_descriptor(&self, descriptor: RawDescriptorId);

    // --- Passes, framebuffers, pipelines ---

    /// Creates a render pass object.
    fn create_render_pass(&self, descriptor: &RenderPassDesc)
        -> Result<RawRenderPassId, DeviceError>;

    /// Destroys a render pass object.
    fn destroy_render_pass(&self, pass: RawRenderPassId);

    /// Creates a framebuffer binding images to a compatible pass.
    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDesc,
    ) -> Result<RawFramebufferId, DeviceError>;

    /// Destroys a framebuffer.
    fn destroy_framebuffer(&self, framebuffer: RawFramebufferId);

    /// Registers a compiled shader program and returns its handle.
    fn create_program(&self, label: Option<&str>) -> RawProgramId;

    /// Compiles a pipeline state object, optionally derived from a base.
    fn create_pipeline(&self, descriptor: &PipelineDesc) -> Result<RawPipelineId, DeviceError>;

    /// Destroys a pipeline state object.
    fn destroy_pipeline(&self, pipeline: RawPipelineId);

    // --- Submission ---

    /// Submits a recorded primary buffer to the device queue, optionally
    /// signalling a fence on completion. Submission order on the single
    /// queue equals call order.
    fn submit(
        &self,
        cb: RawCommandBufferId,
        fence: Option<RawFenceId>,
    ) -> Result<(), DeviceError>;

    /// Blocks until the device is idle. Used at shutdown.
    fn wait_idle(&self) -> Result<(), DeviceError>;
}
