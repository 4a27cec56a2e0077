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

//! Texture, index, and vertex data formats.

/// The format of the texels stored in a texture or render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit per channel RGBA, unsigned normalized.
    Rgba8Unorm,
    /// 8-bit per channel RGBA, unsigned normalized, sRGB-encoded.
    Rgba8UnormSrgb,
    /// 8-bit per channel BGRA, unsigned normalized. Common swap-image format.
    Bgra8Unorm,
    /// 8-bit per channel BGRA, unsigned normalized, sRGB-encoded.
    Bgra8UnormSrgb,
    /// 16-bit float per channel RGBA.
    Rgba16Float,
    /// 32-bit float per channel RGBA.
    Rgba32Float,
    /// Single-channel 8-bit, unsigned normalized.
    R8Unorm,
    /// Single-channel 32-bit float.
    R32Float,
    /// 32-bit float depth.
    Depth32Float,
    /// 24-bit depth packed with an 8-bit stencil.
    Depth24Stencil8,
}

impl TextureFormat {
    /// The size in bytes of one texel of this format.
    pub const fn bytes_per_texel(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::R32Float
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24Stencil8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// Returns `true` if this format carries a depth aspect.
    pub const fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24Stencil8
        )
    }

    /// Returns `true` if this format carries a stencil aspect.
    pub const fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8)
    }
}

/// The width of the indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit unsigned indices.
    Uint16,
    /// 32-bit unsigned indices.
    Uint32,
}

impl IndexFormat {
    /// The size in bytes of one index.
    pub const fn byte_size(&self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// The format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
    /// One 32-bit unsigned integer.
    Uint32,
    /// Four 8-bit unsigned normalized values (e.g. packed color).
    Unorm8x4,
}

impl VertexFormat {
    /// The size in bytes of one attribute of this format.
    pub const fn byte_size(&self) -> u32 {
        match self {
            VertexFormat::Float32 | VertexFormat::Uint32 | VertexFormat::Unorm8x4 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_classification() {
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(TextureFormat::Depth24Stencil8.is_depth());
        assert!(TextureFormat::Depth24Stencil8.has_stencil());
        assert!(!TextureFormat::Depth32Float.has_stencil());
        assert!(!TextureFormat::Rgba8Unorm.is_depth());
    }

    #[test]
    fn texel_sizes() {
        assert_eq!(TextureFormat::Rgba8Unorm.bytes_per_texel(), 4);
        assert_eq!(TextureFormat::Rgba16Float.bytes_per_texel(), 8);
        assert_eq!(TextureFormat::Rgba32Float.bytes_per_texel(), 16);
        assert_eq!(VertexFormat::Float32x3.byte_size(), 12);
        assert_eq!(IndexFormat::Uint16.byte_size(), 2);
    }
}
