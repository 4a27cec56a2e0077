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

//! Resource binding layout types.

use crate::garnet_bitflags;
use std::borrow::Cow;

/// The number of resource-set slots addressable by a single draw.
///
/// Binding a set at an index at or beyond this count is a caller bug and
/// is checked fatally.
pub const MAX_RESOURCE_SETS: usize = 4;

garnet_bitflags! {
    /// The shader stages that may access a binding.
    pub struct ShaderStageFlags: u32 {
        /// Vertex stage.
        const VERTEX = 1 << 0;
        /// Fragment stage.
        const FRAGMENT = 1 << 1;
        /// Compute stage.
        const COMPUTE = 1 << 2;
        /// All graphics stages.
        const VERTEX_FRAGMENT = Self::VERTEX.bits() | Self::FRAGMENT.bits();
        /// Every stage.
        const ALL = Self::VERTEX.bits() | Self::FRAGMENT.bits() | Self::COMPUTE.bits();
    }
}

/// The kind of resource a layout slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A uniform buffer range.
    UniformBuffer,
    /// A sampled texture; the sampler is bound in a separate slot.
    SampledTexture,
    /// A standalone sampler.
    Sampler,
    /// A sampled texture paired with its sampler in one slot.
    CombinedTextureSampler,
}

/// One typed slot of a resource-set layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotDesc {
    /// The kind of resource the slot accepts.
    pub kind: SlotKind,
    /// The stages that read the slot.
    pub stages: ShaderStageFlags,
}

/// A descriptor for a resource-set layout: a fixed array of typed slots,
/// immutable once the layout is created.
#[derive(Debug, Clone)]
pub struct ResourceSetLayoutDesc {
    /// Optional debug label.
    pub label: Option<Cow<'static, str>>,
    /// The slot array. Slot index equals position.
    pub slots: Vec<SlotDesc>,
}

impl ResourceSetLayoutDesc {
    /// A layout whose every slot is visible to vertex and fragment stages.
    pub fn of_kinds(kinds: &[SlotKind]) -> Self {
        Self {
            label: None,
            slots: kinds
                .iter()
                .map(|&kind| SlotDesc {
                    kind,
                    stages: ShaderStageFlags::VERTEX_FRAGMENT,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_kinds_preserves_order() {
        let desc =
            ResourceSetLayoutDesc::of_kinds(&[SlotKind::UniformBuffer, SlotKind::SampledTexture]);
        assert_eq!(desc.slots.len(), 2);
        assert_eq!(desc.slots[0].kind, SlotKind::UniformBuffer);
        assert_eq!(desc.slots[1].kind, SlotKind::SampledTexture);
        assert!(desc.slots[0].stages.contains(ShaderStageFlags::VERTEX));
    }
}
