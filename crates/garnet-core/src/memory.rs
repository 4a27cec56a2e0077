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

//! Device memory and resource usage flags.

use crate::garnet_bitflags;

garnet_bitflags! {
    /// Properties of a device memory type.
    pub struct MemoryPropertyFlags: u32 {
        /// Memory local to the GPU; fastest for GPU access.
        const DEVICE_LOCAL = 1 << 0;
        /// Memory mappable by the host.
        const HOST_VISIBLE = 1 << 1;
        /// Host writes are visible to the device without explicit flushes.
        const HOST_COHERENT = 1 << 2;
        /// Host reads of this memory are cached.
        const HOST_CACHED = 1 << 3;
    }
}

garnet_bitflags! {
    /// Allowed usages of a buffer.
    pub struct BufferUsage: u32 {
        /// Source of a copy operation.
        const TRANSFER_SRC = 1 << 0;
        /// Destination of a copy operation.
        const TRANSFER_DST = 1 << 1;
        /// Bindable as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Bindable as a storage buffer.
        const STORAGE = 1 << 3;
        /// Bindable as a vertex buffer.
        const VERTEX = 1 << 4;
        /// Bindable as an index buffer.
        const INDEX = 1 << 5;
        /// Usable as a source of indirect draw parameters.
        const INDIRECT = 1 << 6;
    }
}

garnet_bitflags! {
    /// Allowed usages of an image.
    pub struct ImageUsage: u32 {
        /// Source of a copy or blit.
        const TRANSFER_SRC = 1 << 0;
        /// Destination of a copy or blit.
        const TRANSFER_DST = 1 << 1;
        /// Sampled from shaders.
        const SAMPLED = 1 << 2;
        /// Bindable as a color attachment.
        const COLOR_ATTACHMENT = 1 << 3;
        /// Bindable as a depth/stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 4;
    }
}

/// The memory placement constraints the driver reports for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRequirements {
    /// Required allocation size in bytes, including driver padding.
    pub size: u64,
    /// Required offset alignment in bytes. Always a power of two.
    pub alignment: u64,
    /// Bitmask of memory type indices the resource may be bound to.
    pub memory_type_mask: u32,
}

/// One entry of the device's ordered memory type list.
///
/// The list ordering is significant: the allocator picks the first type
/// satisfying a request, so more restrictive (better) types must come
/// before laxer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    /// Properties of memory allocated from this type.
    pub properties: MemoryPropertyFlags,
}

impl MemoryType {
    /// Returns `true` if this type satisfies every requested property.
    pub const fn satisfies(&self, requested: MemoryPropertyFlags) -> bool {
        self.properties.contains(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_type_satisfies_subset() {
        let t = MemoryType {
            properties: MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT,
        };
        assert!(t.satisfies(MemoryPropertyFlags::HOST_VISIBLE));
        assert!(t.satisfies(
            MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT
        ));
        assert!(!t.satisfies(MemoryPropertyFlags::DEVICE_LOCAL));
    }
}
