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

//! Hierarchical command recording with lazy state application.
//!
//! A [`CommandList`] tracks abstract state and a dirty mask; nothing is
//! written to the native stream until a draw, at which point each dirty
//! field emits exactly one native command. Child lists are independent
//! recording targets merged back into the parent in call order, which is
//! the sanctioned way to record in parallel while keeping a single
//! serial native stream.

use crate::cache::PassCompatKey;
use crate::command::buffered::{replay, RecordedCommand};
use crate::command::direct::DirectRecorder;
use crate::command::state::{set_flag, RenderState, StateFlags};
use crate::context::GfxShared;
use crate::frame::FrameRef;
use crate::resource::{GpuBuffer, Pipeline};
use crate::binding::ResourceSet;
use garnet_core::error::GfxError;
use garnet_core::format::IndexFormat;
use garnet_core::raw::{RawDescriptorId, RawFramebufferId, RawPipelineId, RawRenderPassId};
use garnet_core::state::{
    BlendStateDesc, ClearValue, DepthStencilStateDesc, PrimitiveTopology, RasterizerStateDesc,
    ScissorRect, Viewport,
};
use garnet_core::MAX_RESOURCE_SETS;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::Arc;

/// Which backend a top-level list records through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Tagged command records, replayed on submit.
    Buffered,
    /// A native secondary command buffer, opened lazily.
    Direct,
}

/// The render pass a list records into, shared with its children.
#[derive(Clone)]
pub(crate) struct PassContext {
    pub(crate) pass: RawRenderPassId,
    pub(crate) compat: PassCompatKey,
    pub(crate) framebuffer: RawFramebufferId,
    pub(crate) clear_values: Vec<ClearValue>,
    pub(crate) extent: (u32, u32),
}

pub(crate) enum Backend {
    Buffered(Vec<RecordedCommand>),
    Direct(DirectRecorder),
}

/// A recording target for draws within one render pass.
///
/// Not thread-safe by design: one producer drives one list. Use
/// [`CommandList::create_child`] to let other threads record in
/// parallel, then merge with [`CommandList::submit_child`].
pub struct CommandList {
    shared: Arc<GfxShared>,
    pass: PassContext,
    label: Option<Cow<'static, str>>,
    state: RenderState,
    dirty: StateFlags,
    stack: Vec<(StateFlags, RenderState)>,
    applied_pipeline: Option<RawPipelineId>,
    applied_sets: [Option<RawDescriptorId>; MAX_RESOURCE_SETS],
    references: Vec<FrameRef>,
    backend: Backend,
}

impl CommandList {
    pub(crate) fn new(
        shared: Arc<GfxShared>,
        pass: PassContext,
        kind: ListKind,
        label: Option<Cow<'static, str>>,
    ) -> Self {
        let mut state = RenderState::default();
        state.viewport = Some(Viewport::of_extent(pass.extent.0, pass.extent.1));
        state.scissor = Some(ScissorRect::of_extent(pass.extent.0, pass.extent.1));
        Self {
            shared,
            pass,
            label,
            state,
            dirty: StateFlags::ALL,
            stack: Vec::new(),
            applied_pipeline: None,
            applied_sets: [None; MAX_RESOURCE_SETS],
            references: Vec::new(),
            backend: match kind {
                ListKind::Buffered => Backend::Buffered(Vec::new()),
                ListKind::Direct => Backend::Direct(DirectRecorder::default()),
            },
        }
    }

    /// The list's debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Binds a pipeline. No-op if the same pipeline is already bound.
    pub fn bind_pipeline(&mut self, pipeline: &Arc<Pipeline>) {
        if self
            .state
            .pipeline
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, pipeline))
        {
            return;
        }
        self.state.pipeline = Some(pipeline.clone());
        self.dirty |= StateFlags::PIPELINE;
    }

    /// Binds a resource set at a slot.
    ///
    /// # Panics
    /// If `slot` is at or beyond the per-draw slot count.
    pub fn bind_resource_set(&mut self, slot: usize, set: &Arc<ResourceSet>) {
        assert!(
            slot < MAX_RESOURCE_SETS,
            "resource set slot {slot} out of range"
        );
        if self.state.sets[slot]
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, set))
        {
            return;
        }
        self.state.sets[slot] = Some(set.clone());
        self.dirty |= set_flag(slot);
    }

    /// Sets the blend state from an interned handle.
    pub fn set_blend_state(&mut self, blend: &Arc<BlendStateDesc>) {
        if self
            .state
            .blend
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, blend))
        {
            return;
        }
        self.state.blend = Some(blend.clone());
        self.dirty |= StateFlags::BLEND;
    }

    /// Sets the depth/stencil state from an interned handle.
    pub fn set_depth_stencil_state(&mut self, depth_stencil: &Arc<DepthStencilStateDesc>) {
        if self
            .state
            .depth_stencil
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, depth_stencil))
        {
            return;
        }
        self.state.depth_stencil = Some(depth_stencil.clone());
        self.dirty |= StateFlags::DEPTH_STENCIL;
    }

    /// Sets the rasterizer state from an interned handle.
    pub fn set_rasterizer_state(&mut self, rasterizer: &Arc<RasterizerStateDesc>) {
        if self
            .state
            .rasterizer
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, rasterizer))
        {
            return;
        }
        self.state.rasterizer = Some(rasterizer.clone());
        self.dirty |= StateFlags::RASTERIZER;
    }

    /// Sets the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.state.viewport == Some(viewport) {
            return;
        }
        self.state.viewport = Some(viewport);
        self.dirty |= StateFlags::VIEWPORT;
    }

    /// Sets the scissor rectangle.
    pub fn set_scissor(&mut self, scissor: ScissorRect) {
        if self.state.scissor == Some(scissor) {
            return;
        }
        self.state.scissor = Some(scissor);
        self.dirty |= StateFlags::SCISSOR;
    }

    /// Binds a vertex buffer at an offset.
    pub fn bind_vertex_buffer(&mut self, buffer: &Arc<GpuBuffer>, offset: u64) {
        if self
            .state
            .vertex_buffer
            .as_ref()
            .is_some_and(|(current, cur_off)| Arc::ptr_eq(current, buffer) && *cur_off == offset)
        {
            return;
        }
        self.state.vertex_buffer = Some((buffer.clone(), offset));
        self.dirty |= StateFlags::VERTEX_BUFFER;
    }

    /// Binds an index buffer at an offset.
    pub fn bind_index_buffer(&mut self, buffer: &Arc<GpuBuffer>, offset: u64, format: IndexFormat) {
        if self
            .state
            .index_buffer
            .as_ref()
            .is_some_and(|(current, cur_off, cur_fmt)| {
                Arc::ptr_eq(current, buffer) && *cur_off == offset && *cur_fmt == format
            })
        {
            return;
        }
        self.state.index_buffer = Some((buffer.clone(), offset, format));
        self.dirty |= StateFlags::INDEX_BUFFER;
    }

    /// Snapshots the fields named by `mask` onto the state stack.
    pub fn push_state(&mut self, mask: StateFlags) {
        self.stack.push((mask, self.state.clone()));
    }

    /// Restores the most recent snapshot by re-invoking the setters, so
    /// dirtiness is recomputed rather than blindly restored.
    ///
    /// # Panics
    /// If there is no matching `push_state`.
    pub fn pop_state(&mut self) {
        let (mask, saved) = match self.stack.pop() {
            Some(entry) => entry,
            None => panic!("pop_state without a matching push_state"),
        };
        if mask.contains(StateFlags::PIPELINE) {
            match &saved.pipeline {
                Some(pipeline) => self.bind_pipeline(pipeline),
                None => self.clear_pipeline(),
            }
        }
        for slot in 0..MAX_RESOURCE_SETS {
            if mask.contains(set_flag(slot)) {
                match &saved.sets[slot] {
                    Some(set) => self.bind_resource_set(slot, set),
                    None => self.clear_resource_set(slot),
                }
            }
        }
        if mask.contains(StateFlags::BLEND) {
            match &saved.blend {
                Some(blend) => self.set_blend_state(blend),
                None => {
                    if self.state.blend.take().is_some() {
                        self.dirty |= StateFlags::BLEND;
                    }
                }
            }
        }
        if mask.contains(StateFlags::DEPTH_STENCIL) {
            match &saved.depth_stencil {
                Some(depth_stencil) => self.set_depth_stencil_state(depth_stencil),
                None => {
                    if self.state.depth_stencil.take().is_some() {
                        self.dirty |= StateFlags::DEPTH_STENCIL;
                    }
                }
            }
        }
        if mask.contains(StateFlags::RASTERIZER) {
            match &saved.rasterizer {
                Some(rasterizer) => self.set_rasterizer_state(rasterizer),
                None => {
                    if self.state.rasterizer.take().is_some() {
                        self.dirty |= StateFlags::RASTERIZER;
                    }
                }
            }
        }
        if mask.contains(StateFlags::VIEWPORT) && self.state.viewport != saved.viewport {
            self.state.viewport = saved.viewport;
            self.dirty |= StateFlags::VIEWPORT;
        }
        if mask.contains(StateFlags::SCISSOR) && self.state.scissor != saved.scissor {
            self.state.scissor = saved.scissor;
            self.dirty |= StateFlags::SCISSOR;
        }
        if mask.contains(StateFlags::VERTEX_BUFFER) {
            match &saved.vertex_buffer {
                Some((buffer, offset)) => self.bind_vertex_buffer(buffer, *offset),
                None => {
                    if self.state.vertex_buffer.take().is_some() {
                        self.dirty |= StateFlags::VERTEX_BUFFER;
                    }
                }
            }
        }
        if mask.contains(StateFlags::INDEX_BUFFER) {
            match &saved.index_buffer {
                Some((buffer, offset, format)) => self.bind_index_buffer(buffer, *offset, *format),
                None => {
                    if self.state.index_buffer.take().is_some() {
                        self.dirty |= StateFlags::INDEX_BUFFER;
                    }
                }
            }
        }
    }

    /// A new buffered child list recording into the same pass,
    /// inheriting the fields of the current state selected by `inherit`.
    /// The child has no effect on this list until submitted back.
    pub fn create_child(&self, inherit: StateFlags) -> CommandList {
        CommandList {
            shared: self.shared.clone(),
            pass: self.pass.clone(),
            label: None,
            state: self.state.inherit(inherit),
            dirty: StateFlags::ALL,
            stack: Vec::new(),
            applied_pipeline: None,
            applied_sets: [None; MAX_RESOURCE_SETS],
            references: Vec::new(),
            backend: Backend::Buffered(Vec::new()),
        }
    }

    /// Appends everything the child recorded after this list's prior
    /// commands and before anything recorded later, then consumes the
    /// child. The child's commands may have left the native stream in
    /// any state, so every field is re-marked dirty.
    ///
    /// # Panics
    /// If `child` is a direct top-level list rather than a child.
    pub fn submit_child(&mut self, child: CommandList) -> Result<(), GfxError> {
        let (backend, mut references, _pass) = child.into_parts();
        let commands = match backend {
            Backend::Buffered(commands) => commands,
            Backend::Direct(_) => panic!("submit_child expects a buffered child list"),
        };
        match &mut self.backend {
            Backend::Buffered(own) => own.extend(commands),
            Backend::Direct(recorder) => {
                for command in &commands {
                    recorder.record(
                        &self.shared.command_pool,
                        self.shared.device.as_ref(),
                        command,
                    )?;
                }
            }
        }
        self.references.append(&mut references);
        // The merged commands invalidate whatever native state had been
        // applied so far.
        self.dirty = StateFlags::ALL;
        self.applied_pipeline = None;
        self.applied_sets = [None; MAX_RESOURCE_SETS];
        Ok(())
    }

    /// Records a draw. This is the only point at which dirty state is
    /// flushed into the native stream; each dirty field emits exactly one
    /// command first. With `indices`, records an indexed draw using
    /// `vertices.start` as the base vertex.
    ///
    /// # Panics
    /// If no pipeline is bound, an indexed draw is recorded without an
    /// index buffer, or a range runs backwards.
    pub fn draw(
        &mut self,
        topology: PrimitiveTopology,
        vertices: Range<u32>,
        indices: Option<Range<u32>>,
    ) -> Result<(), GfxError> {
        assert!(
            vertices.start <= vertices.end,
            "draw vertex range {}..{} runs backwards",
            vertices.start,
            vertices.end
        );
        if let Some(indices) = &indices {
            assert!(
                indices.start <= indices.end,
                "draw index range {}..{} runs backwards",
                indices.start,
                indices.end
            );
        }
        self.flush_state(topology)?;
        match indices {
            Some(indices) => {
                assert!(
                    self.state.index_buffer.is_some(),
                    "indexed draw without a bound index buffer"
                );
                self.emit(RecordedCommand::DrawIndexed {
                    index_count: indices.end - indices.start,
                    first_index: indices.start,
                    vertex_offset: vertices.start as i32,
                })
            }
            None => self.emit(RecordedCommand::Draw {
                vertex_count: vertices.end - vertices.start,
                first_vertex: vertices.start,
            }),
        }
    }

    pub(crate) fn pass(&self) -> &PassContext {
        &self.pass
    }

    pub(crate) fn push_reference(&mut self, reference: FrameRef) {
        self.references.push(reference);
    }

    pub(crate) fn into_parts(mut self) -> (Backend, Vec<FrameRef>, PassContext) {
        let backend = std::mem::replace(&mut self.backend, Backend::Buffered(Vec::new()));
        let references = std::mem::take(&mut self.references);
        (backend, references, self.pass.clone())
    }

    /// Flattens the list into the given primary stream. Buffered records
    /// replay inline; a direct list is closed and executed as a native
    /// secondary buffer.
    pub(crate) fn flatten_into_primary(
        self,
        primary: garnet_core::raw::RawCommandBufferId,
    ) -> Result<(), GfxError> {
        let shared = self.shared.clone();
        let (backend, references, _) = self.into_parts();
        match backend {
            Backend::Buffered(commands) => replay(shared.device.as_ref(), primary, &commands),
            Backend::Direct(mut recorder) => {
                if let Some(mut transient) = recorder.take() {
                    shared.command_pool.finish(&mut transient)?;
                    shared
                        .device
                        .cmd_execute_commands(primary, transient.id());
                    shared.command_pool.mark_submitted(&mut transient);
                    shared.frames.track_transient(transient);
                }
            }
        }
        for reference in references {
            shared.frames.reference(reference);
        }
        Ok(())
    }

    fn clear_pipeline(&mut self) {
        if self.state.pipeline.take().is_some() {
            self.dirty |= StateFlags::PIPELINE;
        }
    }

    fn clear_resource_set(&mut self, slot: usize) {
        if self.state.sets[slot].take().is_some() {
            self.dirty |= set_flag(slot);
        }
    }

    fn flush_state(&mut self, topology: PrimitiveTopology) -> Result<(), GfxError> {
        let pipeline = match &self.state.pipeline {
            Some(pipeline) => pipeline.clone(),
            None => panic!("draw recorded without a bound pipeline"),
        };
        let blend = self
            .state
            .blend
            .clone()
            .unwrap_or_else(|| self.shared.states.default_blend());
        let depth_stencil = self
            .state
            .depth_stencil
            .clone()
            .unwrap_or_else(|| self.shared.states.default_depth_stencil());
        let rasterizer = self
            .state
            .rasterizer
            .clone()
            .unwrap_or_else(|| self.shared.states.default_rasterizer());

        let pso = self.shared.pipelines.get(
            &self.shared.device,
            &pipeline,
            topology,
            self.pass.pass,
            &self.pass.compat,
            &blend,
            &depth_stencil,
            &rasterizer,
        )?;
        if self.applied_pipeline != Some(pso) {
            self.emit(RecordedCommand::BindPipeline(pso))?;
            self.applied_pipeline = Some(pso);
        }
        self.dirty.remove(
            StateFlags::PIPELINE
                | StateFlags::BLEND
                | StateFlags::DEPTH_STENCIL
                | StateFlags::RASTERIZER,
        );

        for slot in 0..MAX_RESOURCE_SETS {
            let set = match &self.state.sets[slot] {
                Some(set) => set.clone(),
                None => continue,
            };
            let (descriptor, mut refs) = set.prepare_for_draw(&self.shared)?;
            let raw = descriptor.raw();
            // Rebind when the list changed the slot, and also when the
            // set itself rotated to a fresh descriptor generation.
            if self.dirty.contains(set_flag(slot)) || self.applied_sets[slot] != Some(raw) {
                self.emit(RecordedCommand::BindDescriptor {
                    slot: slot as u32,
                    descriptor: raw,
                })?;
                self.applied_sets[slot] = Some(raw);
                self.references.push(FrameRef::Descriptor(descriptor));
                self.references.append(&mut refs);
            }
            self.dirty.remove(set_flag(slot));
        }

        if self.dirty.contains(StateFlags::VIEWPORT) {
            if let Some(viewport) = self.state.viewport {
                self.emit(RecordedCommand::SetViewport(viewport))?;
            }
            self.dirty.remove(StateFlags::VIEWPORT);
        }
        if self.dirty.contains(StateFlags::SCISSOR) {
            if let Some(scissor) = self.state.scissor {
                self.emit(RecordedCommand::SetScissor(scissor))?;
            }
            self.dirty.remove(StateFlags::SCISSOR);
        }
        if self.dirty.contains(StateFlags::VERTEX_BUFFER) {
            if let Some((buffer, offset)) = self.state.vertex_buffer.clone() {
                let (raw, base, _) = buffer.raw_binding();
                self.emit(RecordedCommand::BindVertexBuffer {
                    buffer: raw,
                    offset: base + offset,
                })?;
                self.references.push(FrameRef::Memory(buffer.block()));
            }
            self.dirty.remove(StateFlags::VERTEX_BUFFER);
        }
        if self.dirty.contains(StateFlags::INDEX_BUFFER) {
            if let Some((buffer, offset, format)) = self.state.index_buffer.clone() {
                let (raw, base, _) = buffer.raw_binding();
                self.emit(RecordedCommand::BindIndexBuffer {
                    buffer: raw,
                    offset: base + offset,
                    format,
                })?;
                self.references.push(FrameRef::Memory(buffer.block()));
            }
            self.dirty.remove(StateFlags::INDEX_BUFFER);
        }
        Ok(())
    }

    fn emit(&mut self, command: RecordedCommand) -> Result<(), GfxError> {
        match &mut self.backend {
            Backend::Buffered(commands) => {
                commands.push(command);
                Ok(())
            }
            Backend::Direct(recorder) => recorder.record(
                &self.shared.command_pool,
                self.shared.device.as_ref(),
                &command,
            ),
        }
    }
}

impl Drop for CommandList {
    fn drop(&mut self) {
        // An unsubmitted direct list returns its native buffer to the
        // pool immediately; nothing was ever handed to a frame.
        if let Backend::Direct(recorder) = &mut self.backend {
            if let Some(transient) = recorder.take() {
                self.shared.command_pool.release(transient);
            }
        }
    }
}
