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

//! The graphics context, the single entry point to the layer.
//!
//! One [`GfxContext`] owns the allocator, the frame tracker, the command
//! pool, and the caches, and hands out the resources and command lists
//! that reference them. There is no global state; two contexts on two
//! devices coexist without interference.

use crate::binding::{ResourceSet, ResourceSetLayout};
use crate::cache::{FramebufferCache, PassCompatKey, PipelineCache, RenderPassCache};
use crate::command::pool::CommandPool;
use crate::command::{CommandList, ListKind, PassContext};
use crate::frame::{FrameRef, FrameTracker};
use crate::memory::{AllocatorStats, DeviceMemoryAllocator};
use crate::resource::{GpuBuffer, GpuTexture, MemoryLocation, Pipeline, Sampler};
use crate::settings::{FaultPolicy, GfxSettings};
use garnet_core::binding::ResourceSetLayoutDesc;
use garnet_core::error::GfxError;
use garnet_core::image::{BufferImageCopy, Extent3d, ImageBlit, ImageDescriptor, Origin3d, SamplerDesc};
use garnet_core::memory::BufferUsage;
use garnet_core::raw::{
    AttachmentDesc, LoadOp, RawDevice, RawImageId, RenderPassDesc, StoreOp,
};
use garnet_core::state::{
    BlendStateDesc, ClearValue, DepthStencilStateDesc, RasterizerStateDesc,
};
use garnet_core::vertex::VertexLayout;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Interns fixed-function state descriptions so equal contents always
/// yield the same `Arc`, making pointer identity a valid cache key.
pub(crate) struct StateInterner {
    blend: Mutex<HashMap<BlendStateDesc, Arc<BlendStateDesc>>>,
    depth_stencil: Mutex<HashMap<DepthStencilStateDesc, Arc<DepthStencilStateDesc>>>,
    rasterizer: Mutex<HashMap<RasterizerStateDesc, Arc<RasterizerStateDesc>>>,
}

impl StateInterner {
    fn new() -> Self {
        Self {
            blend: Mutex::new(HashMap::new()),
            depth_stencil: Mutex::new(HashMap::new()),
            rasterizer: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn blend(&self, desc: BlendStateDesc) -> Arc<BlendStateDesc> {
        let mut interned = self.blend.lock().unwrap();
        interned
            .entry(desc.clone())
            .or_insert_with(|| Arc::new(desc))
            .clone()
    }

    pub(crate) fn depth_stencil(&self, desc: DepthStencilStateDesc) -> Arc<DepthStencilStateDesc> {
        let mut interned = self.depth_stencil.lock().unwrap();
        interned
            .entry(desc.clone())
            .or_insert_with(|| Arc::new(desc))
            .clone()
    }

    pub(crate) fn rasterizer(&self, desc: RasterizerStateDesc) -> Arc<RasterizerStateDesc> {
        let mut interned = self.rasterizer.lock().unwrap();
        interned
            .entry(desc.clone())
            .or_insert_with(|| Arc::new(desc))
            .clone()
    }

    pub(crate) fn default_blend(&self) -> Arc<BlendStateDesc> {
        self.blend(BlendStateDesc::default())
    }

    pub(crate) fn default_depth_stencil(&self) -> Arc<DepthStencilStateDesc> {
        self.depth_stencil(DepthStencilStateDesc::default())
    }

    pub(crate) fn default_rasterizer(&self) -> Arc<RasterizerStateDesc> {
        self.rasterizer(RasterizerStateDesc::default())
    }
}

/// Everything the context's resources and command lists share.
pub(crate) struct GfxShared {
    pub(crate) device: Arc<dyn RawDevice>,
    pub(crate) settings: GfxSettings,
    pub(crate) allocator: Arc<DeviceMemoryAllocator>,
    pub(crate) frames: FrameTracker,
    pub(crate) command_pool: Arc<CommandPool>,
    pub(crate) states: StateInterner,
    pub(crate) passes: RenderPassCache,
    pub(crate) framebuffers: FramebufferCache,
    pub(crate) pipelines: PipelineCache,
}

impl Drop for GfxShared {
    fn drop(&mut self) {
        self.pipelines.destroy_all(&self.device);
    }
}

/// One attachment of a [`PassDescriptor`].
#[derive(Clone)]
pub struct PassAttachment {
    /// The render target.
    pub texture: Arc<GpuTexture>,
    /// Load behavior at pass begin.
    pub load: LoadOp,
    /// Store behavior at pass end.
    pub store: StoreOp,
    /// Clear value, used when `load` is [`LoadOp::Clear`].
    pub clear: ClearValue,
}

/// Describes one render pass instance.
#[derive(Clone)]
pub struct PassDescriptor {
    /// Optional debug label, carried onto the command list.
    pub label: Option<Cow<'static, str>>,
    /// Color attachments in slot order.
    pub colors: Vec<PassAttachment>,
    /// Optional depth/stencil attachment.
    pub depth: Option<PassAttachment>,
}

/// The graphics context. Owns every piece of per-device state and is the
/// factory for resources and command lists.
pub struct GfxContext {
    shared: Arc<GfxShared>,
}

impl GfxContext {
    /// Creates a context over a raw device.
    pub fn new(device: Arc<dyn RawDevice>, settings: GfxSettings) -> Self {
        let allocator = Arc::new(DeviceMemoryAllocator::new(
            device.clone(),
            settings.pool_min_size,
        ));
        let command_pool = Arc::new(CommandPool::new(device.clone()));
        let frames = FrameTracker::new(
            device.clone(),
            allocator.clone(),
            command_pool.clone(),
            &settings,
        );
        log::debug!(
            "graphics context up: {} frames in flight, {} byte pools",
            settings.frames_in_flight,
            settings.pool_min_size
        );
        Self {
            shared: Arc::new(GfxShared {
                device,
                settings,
                allocator,
                frames,
                command_pool,
                states: StateInterner::new(),
                passes: RenderPassCache::new(),
                framebuffers: FramebufferCache::new(),
                pipelines: PipelineCache::new(),
            }),
        }
    }

    /// The settings the context was created with.
    pub fn settings(&self) -> &GfxSettings {
        &self.shared.settings
    }

    /// Opens a new frame. Exactly one frame records at a time.
    pub fn begin_frame(&self) -> Result<(), GfxError> {
        self.fault(self.shared.frames.start_frame())
    }

    /// Submits the recording frame and reclaims completed ones. Blocks
    /// only when the in-flight cap is exceeded, and then only on the
    /// oldest frame's fence.
    pub fn end_frame(&self) -> Result<(), GfxError> {
        self.fault(self.shared.frames.end_frame())
    }

    /// Number of submitted frames whose GPU work has not been observed
    /// complete.
    pub fn pending_frames(&self) -> usize {
        self.shared.frames.pending_frames()
    }

    /// Begins a render pass over the given attachments and returns a
    /// command list recording into it. The pass object and framebuffer
    /// come from the caches; nothing touches the native stream until the
    /// list is submitted.
    pub fn begin_pass(
        &self,
        descriptor: &PassDescriptor,
        kind: ListKind,
    ) -> Result<CommandList, GfxError> {
        assert!(
            !descriptor.colors.is_empty() || descriptor.depth.is_some(),
            "a pass needs at least one attachment"
        );
        let pass_desc = RenderPassDesc {
            colors: descriptor
                .colors
                .iter()
                .map(|attachment| AttachmentDesc {
                    format: attachment.texture.format(),
                    samples: attachment.texture.sample_count(),
                    load: attachment.load,
                    store: attachment.store,
                })
                .collect(),
            depth: descriptor.depth.as_ref().map(|attachment| AttachmentDesc {
                format: attachment.texture.format(),
                samples: attachment.texture.sample_count(),
                load: attachment.load,
                store: attachment.store,
            }),
        };
        let pass = self.shared.passes.get(&self.shared.device, &pass_desc)?;
        let compat = PassCompatKey::of_desc(&pass_desc);

        let all = descriptor.colors.iter().chain(descriptor.depth.iter());
        let attachments: Vec<RawImageId> =
            all.clone().map(|attachment| attachment.texture.raw()).collect();
        let first = descriptor
            .colors
            .first()
            .or(descriptor.depth.as_ref())
            .map(|attachment| attachment.texture.extent());
        let extent = match first {
            Some(extent) => (extent.width, extent.height),
            None => unreachable!(),
        };
        let framebuffer = self.shared.framebuffers.get(
            &self.shared.device,
            pass,
            &compat,
            &attachments,
            extent.0,
            extent.1,
        )?;
        let clear_values: Vec<ClearValue> =
            all.clone().map(|attachment| attachment.clear).collect();

        let mut list = CommandList::new(
            self.shared.clone(),
            PassContext {
                pass,
                compat,
                framebuffer,
                clear_values,
                extent,
            },
            kind,
            descriptor.label.clone(),
        );
        for attachment in all {
            list.push_reference(FrameRef::Texture(attachment.texture.clone()));
        }
        Ok(list)
    }

    /// Flattens a finished top-level list into the current frame's
    /// primary stream, wrapped in the pass it was begun for. A frame must
    /// be recording.
    pub fn submit_pass(&self, list: CommandList) -> Result<(), GfxError> {
        let pass = list.pass().clone();
        let primary = self.shared.frames.primary_cb();
        self.shared
            .device
            .cmd_begin_pass(primary, pass.pass, pass.framebuffer, &pass.clear_values);
        let result = list.flatten_into_primary(primary);
        self.shared.device.cmd_end_pass(primary);
        self.fault(result)
    }

    /// Creates a buffer.
    pub fn create_buffer(
        &self,
        size: u64,
        usage: BufferUsage,
        location: MemoryLocation,
        label: Option<Cow<'static, str>>,
    ) -> Result<Arc<GpuBuffer>, GfxError> {
        Ok(Arc::new(GpuBuffer::create(
            self.shared.clone(),
            size,
            usage,
            location,
            label,
        )?))
    }

    /// Creates a device-local texture.
    pub fn create_texture(&self, descriptor: ImageDescriptor) -> Result<Arc<GpuTexture>, GfxError> {
        Ok(Arc::new(GpuTexture::create(self.shared.clone(), descriptor)?))
    }

    /// Creates a sampler.
    pub fn create_sampler(&self, desc: SamplerDesc) -> Result<Arc<Sampler>, GfxError> {
        Ok(Arc::new(Sampler::create(self.shared.clone(), desc)?))
    }

    /// Creates a resource set layout.
    pub fn create_resource_set_layout(
        &self,
        descriptor: &ResourceSetLayoutDesc,
    ) -> Result<Arc<ResourceSetLayout>, GfxError> {
        Ok(Arc::new(ResourceSetLayout::create(
            self.shared.device.clone(),
            descriptor,
        )?))
    }

    /// Creates an empty resource set against a layout.
    pub fn create_resource_set(&self, layout: &Arc<ResourceSetLayout>) -> Arc<ResourceSet> {
        Arc::new(ResourceSet::new(layout.clone()))
    }

    /// Registers a shader program and wraps it as a drawable pipeline.
    /// The native pipeline state objects are compiled lazily per draw
    /// configuration.
    pub fn create_pipeline(
        &self,
        label: Option<Cow<'static, str>>,
        vertex_layout: VertexLayout,
    ) -> Arc<Pipeline> {
        let program = self.shared.device.create_program(label.as_deref());
        Arc::new(Pipeline::new(program, vertex_layout, label))
    }

    /// Interns a blend state for binding on command lists.
    pub fn blend_state(&self, desc: BlendStateDesc) -> Arc<BlendStateDesc> {
        self.shared.states.blend(desc)
    }

    /// Interns a depth/stencil state for binding on command lists.
    pub fn depth_stencil_state(&self, desc: DepthStencilStateDesc) -> Arc<DepthStencilStateDesc> {
        self.shared.states.depth_stencil(desc)
    }

    /// Interns a rasterizer state for binding on command lists.
    pub fn rasterizer_state(&self, desc: RasterizerStateDesc) -> Arc<RasterizerStateDesc> {
        self.shared.states.rasterizer(desc)
    }

    /// Uploads texel data into one mip level of a texture through the
    /// current frame's transfer stream. A frame must be recording.
    pub fn upload_texture(
        &self,
        texture: &Arc<GpuTexture>,
        mip_level: u32,
        origin: Origin3d,
        extent: Extent3d,
        data: &[u8],
    ) -> Result<(), GfxError> {
        debug_assert_eq!(
            data.len() as u64,
            u64::from(extent.width)
                * u64::from(extent.height)
                * u64::from(extent.depth)
                * u64::from(texture.format().bytes_per_texel()),
            "texel data does not match the upload extent"
        );
        let shared = &self.shared;
        let staging = shared.allocator.allocate_staging(data.len() as u64)?;
        shared.allocator.write(&staging.block, 0, data)?;
        let transfer = shared.frames.transfer_cb()?;
        shared.device.cmd_copy_buffer_to_image(
            transfer,
            staging.buffer,
            texture.raw(),
            &BufferImageCopy {
                buffer_offset: staging.block.offset(),
                mip_level,
                origin,
                extent,
            },
        );
        shared.frames.track_staging(staging.block);
        shared.frames.reference(FrameRef::Texture(texture.clone()));
        Ok(())
    }

    /// Fills the texture's mip chain by blitting each level from the one
    /// above it on the current frame's transfer stream.
    pub fn generate_mipmaps(&self, texture: &Arc<GpuTexture>) -> Result<(), GfxError> {
        if texture.mip_levels() < 2 {
            return Ok(());
        }
        let transfer = self.shared.frames.transfer_cb()?;
        let extent = texture.extent();
        for level in 1..texture.mip_levels() {
            self.shared.device.cmd_blit_image(
                transfer,
                texture.raw(),
                &ImageBlit {
                    src_mip: level - 1,
                    src_extent: extent.mip_extent(level - 1),
                    dst_mip: level,
                    dst_extent: extent.mip_extent(level),
                },
            );
        }
        self.shared
            .frames
            .reference(FrameRef::Texture(texture.clone()));
        Ok(())
    }

    /// Current allocator occupancy.
    pub fn stats(&self) -> AllocatorStats {
        self.shared.allocator.stats()
    }

    /// Blocks until the device is idle and reclaims everything pending.
    pub fn wait_idle(&self) -> Result<(), GfxError> {
        let result = self
            .shared
            .frames
            .shutdown()
            .and_then(|_| self.shared.device.wait_idle().map_err(GfxError::from));
        self.fault(result)
    }

    fn fault<T>(&self, result: Result<T, GfxError>) -> Result<T, GfxError> {
        match (&result, self.shared.settings.fault_policy) {
            (Err(err), FaultPolicy::Abort) => {
                log::error!("fatal graphics fault: {err}");
                panic!("fatal graphics fault: {err}");
            }
            _ => result,
        }
    }
}

impl Drop for GfxContext {
    fn drop(&mut self) {
        // In-flight frames hold resources that in turn hold the shared
        // state alive; force them through before it unwinds.
        if let Err(err) = self.shared.frames.shutdown() {
            log::error!("graphics context shutdown failed: {err}");
        }
    }
}
