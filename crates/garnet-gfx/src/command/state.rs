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

//! The flat, value-comparable recording state of a command list.

use crate::binding::ResourceSet;
use crate::resource::{GpuBuffer, Pipeline};
use garnet_core::format::IndexFormat;
use garnet_core::garnet_bitflags;
use garnet_core::state::{
    BlendStateDesc, DepthStencilStateDesc, RasterizerStateDesc, ScissorRect, Viewport,
};
use garnet_core::MAX_RESOURCE_SETS;
use std::sync::Arc;

garnet_bitflags! {
    /// One bit per field of [`RenderState`]; used both as the dirty mask
    /// and to select fields for inheritance and push/pop.
    pub struct StateFlags: u32 {
        /// The bound pipeline.
        const PIPELINE = 1 << 0;
        /// Resource set slot 0.
        const RESOURCE_SET_0 = 1 << 1;
        /// Resource set slot 1.
        const RESOURCE_SET_1 = 1 << 2;
        /// Resource set slot 2.
        const RESOURCE_SET_2 = 1 << 3;
        /// Resource set slot 3.
        const RESOURCE_SET_3 = 1 << 4;
        /// The blend state object.
        const BLEND = 1 << 5;
        /// The depth/stencil state object.
        const DEPTH_STENCIL = 1 << 6;
        /// The rasterizer state object.
        const RASTERIZER = 1 << 7;
        /// The viewport.
        const VIEWPORT = 1 << 8;
        /// The scissor rectangle.
        const SCISSOR = 1 << 9;
        /// The bound vertex buffer.
        const VERTEX_BUFFER = 1 << 10;
        /// The bound index buffer.
        const INDEX_BUFFER = 1 << 11;
        /// All resource set slots.
        const RESOURCE_SETS = Self::RESOURCE_SET_0.bits()
            | Self::RESOURCE_SET_1.bits()
            | Self::RESOURCE_SET_2.bits()
            | Self::RESOURCE_SET_3.bits();
        /// Every field.
        const ALL = Self::PIPELINE.bits()
            | Self::RESOURCE_SETS.bits()
            | Self::BLEND.bits()
            | Self::DEPTH_STENCIL.bits()
            | Self::RASTERIZER.bits()
            | Self::VIEWPORT.bits()
            | Self::SCISSOR.bits()
            | Self::VERTEX_BUFFER.bits()
            | Self::INDEX_BUFFER.bits();
    }
}

/// The flag bit of resource set slot `slot`.
pub(crate) fn set_flag(slot: usize) -> StateFlags {
    debug_assert!(slot < MAX_RESOURCE_SETS);
    StateFlags::from_bits(StateFlags::RESOURCE_SET_0.bits() << slot)
}

/// Everything a draw depends on, as plain values and interned handles.
/// Comparable field by field so setters can skip no-op changes.
#[derive(Clone)]
pub(crate) struct RenderState {
    pub pipeline: Option<Arc<Pipeline>>,
    pub sets: [Option<Arc<ResourceSet>>; MAX_RESOURCE_SETS],
    pub blend: Option<Arc<BlendStateDesc>>,
    pub depth_stencil: Option<Arc<DepthStencilStateDesc>>,
    pub rasterizer: Option<Arc<RasterizerStateDesc>>,
    pub viewport: Option<Viewport>,
    pub scissor: Option<ScissorRect>,
    pub vertex_buffer: Option<(Arc<GpuBuffer>, u64)>,
    pub index_buffer: Option<(Arc<GpuBuffer>, u64, IndexFormat)>,
}

const NO_SET: Option<Arc<ResourceSet>> = None;

impl Default for RenderState {
    fn default() -> Self {
        Self {
            pipeline: None,
            sets: [NO_SET; MAX_RESOURCE_SETS],
            blend: None,
            depth_stencil: None,
            rasterizer: None,
            viewport: None,
            scissor: None,
            vertex_buffer: None,
            index_buffer: None,
        }
    }
}

impl RenderState {
    /// A fresh state carrying only the fields selected by `mask`.
    pub(crate) fn inherit(&self, mask: StateFlags) -> Self {
        let mut state = Self::default();
        if mask.contains(StateFlags::PIPELINE) {
            state.pipeline = self.pipeline.clone();
        }
        for slot in 0..MAX_RESOURCE_SETS {
            if mask.contains(set_flag(slot)) {
                state.sets[slot] = self.sets[slot].clone();
            }
        }
        if mask.contains(StateFlags::BLEND) {
            state.blend = self.blend.clone();
        }
        if mask.contains(StateFlags::DEPTH_STENCIL) {
            state.depth_stencil = self.depth_stencil.clone();
        }
        if mask.contains(StateFlags::RASTERIZER) {
            state.rasterizer = self.rasterizer.clone();
        }
        if mask.contains(StateFlags::VIEWPORT) {
            state.viewport = self.viewport;
        }
        if mask.contains(StateFlags::SCISSOR) {
            state.scissor = self.scissor;
        }
        if mask.contains(StateFlags::VERTEX_BUFFER) {
            state.vertex_buffer = self.vertex_buffer.clone();
        }
        if mask.contains(StateFlags::INDEX_BUFFER) {
            state.index_buffer = self.index_buffer.clone();
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_flag_bits() {
        assert_eq!(set_flag(0), StateFlags::RESOURCE_SET_0);
        assert_eq!(set_flag(3), StateFlags::RESOURCE_SET_3);
        assert!(StateFlags::RESOURCE_SETS.contains(set_flag(2)));
        assert!(StateFlags::ALL.contains(StateFlags::INDEX_BUFFER));
    }

    #[test]
    fn inherit_copies_only_selected_fields() {
        let mut state = RenderState::default();
        state.viewport = Some(Viewport::of_extent(64, 64));
        state.scissor = Some(ScissorRect::of_extent(64, 64));

        let child = state.inherit(StateFlags::VIEWPORT);
        assert!(child.viewport.is_some());
        assert!(child.scissor.is_none());
    }
}
