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

//! Vertex input layout description.

use crate::format::VertexFormat;

/// A single vertex attribute within a vertex buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// The input location of this attribute in the vertex shader.
    pub shader_location: u32,
    /// The data format of the attribute.
    pub format: VertexFormat,
    /// Byte offset of this attribute from the start of a vertex.
    pub offset: u32,
}

/// The memory layout of a vertex buffer.
///
/// Owned and hashable so it can participate in pipeline cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    /// Byte distance between consecutive vertices.
    pub stride: u32,
    /// Attributes contained in each vertex.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Creates an empty layout with an explicit stride.
    pub fn with_stride(stride: u32) -> Self {
        Self {
            stride,
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute at the next packed offset, assigning the next
    /// shader location, and grows the stride to cover it.
    pub fn attribute(mut self, format: VertexFormat) -> Self {
        let offset = self.stride;
        self.attributes.push(VertexAttribute {
            shader_location: self.attributes.len() as u32,
            format,
            offset,
        });
        self.stride = offset + format.byte_size();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_builder() {
        let layout = VertexLayout::default()
            .attribute(VertexFormat::Float32x3)
            .attribute(VertexFormat::Float32x2)
            .attribute(VertexFormat::Unorm8x4);

        assert_eq!(layout.stride, 12 + 8 + 4);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 20);
        assert_eq!(layout.attributes[2].shader_location, 2);
    }

    #[test]
    fn equal_layouts_hash_alike() {
        let a = VertexLayout::default().attribute(VertexFormat::Float32x3);
        let b = VertexLayout::default().attribute(VertexFormat::Float32x3);
        assert_eq!(a, b);
    }
}
