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

//! Image, sampler, and transfer-region descriptors.

use crate::format::TextureFormat;
use crate::memory::ImageUsage;
use std::borrow::Cow;

/// The size of an image or of a copied region, in texels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Extent3d {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth, or array layer count for 2D array images.
    pub depth: u32,
}

impl Extent3d {
    /// A 2D extent with depth one.
    pub const fn new_2d(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
        }
    }

    /// The extent of the given mip level, halving each axis per level and
    /// clamping at one.
    pub const fn mip_extent(&self, level: u32) -> Self {
        Self {
            width: if self.width >> level == 0 { 1 } else { self.width >> level },
            height: if self.height >> level == 0 { 1 } else { self.height >> level },
            depth: if self.depth >> level == 0 { 1 } else { self.depth >> level },
        }
    }

    /// Number of mip levels in a full chain for this extent.
    pub const fn full_mip_count(&self) -> u32 {
        let largest = if self.width > self.height {
            self.width
        } else {
            self.height
        };
        32 - largest.leading_zeros()
    }
}

/// A texel offset into an image.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Origin3d {
    /// X offset in texels.
    pub x: u32,
    /// Y offset in texels.
    pub y: u32,
    /// Z offset in texels or array layer.
    pub z: u32,
}

/// A descriptor used to create an image.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    /// Optional debug label.
    pub label: Option<Cow<'static, str>>,
    /// Size of the top mip level.
    pub extent: Extent3d,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Allowed usages.
    pub usage: ImageUsage,
    /// Multisample count; one for regular images.
    pub sample_count: u32,
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest-texel sampling.
    Nearest,
    /// Linear interpolation.
    #[default]
    Linear,
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Coordinates wrap around.
    #[default]
    Repeat,
    /// Coordinates mirror on each repeat.
    MirrorRepeat,
    /// Coordinates clamp to the edge texel.
    ClampToEdge,
}

/// A descriptor used to create a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerDesc {
    /// Filtering when the texture is minified.
    pub min_filter: FilterMode,
    /// Filtering when the texture is magnified.
    pub mag_filter: FilterMode,
    /// Addressing outside the unit range.
    pub address_mode: AddressMode,
}

/// A buffer-to-image copy region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferImageCopy {
    /// Byte offset into the source buffer.
    pub buffer_offset: u64,
    /// Destination mip level.
    pub mip_level: u32,
    /// Destination texel offset.
    pub origin: Origin3d,
    /// Size of the copied region.
    pub extent: Extent3d,
}

/// An image-to-image blit between two mip levels, used for mip generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBlit {
    /// Source mip level.
    pub src_mip: u32,
    /// Extent of the source level.
    pub src_extent: Extent3d,
    /// Destination mip level.
    pub dst_mip: u32,
    /// Extent of the destination level.
    pub dst_extent: Extent3d,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_extent_halves_and_clamps() {
        let extent = Extent3d::new_2d(256, 64);
        assert_eq!(extent.mip_extent(0), Extent3d::new_2d(256, 64));
        assert_eq!(extent.mip_extent(3), Extent3d::new_2d(32, 8));
        assert_eq!(extent.mip_extent(7), Extent3d::new_2d(2, 1));
        assert_eq!(extent.mip_extent(10), Extent3d::new_2d(1, 1));
    }

    #[test]
    fn full_mip_count() {
        assert_eq!(Extent3d::new_2d(1, 1).full_mip_count(), 1);
        assert_eq!(Extent3d::new_2d(256, 64).full_mip_count(), 9);
        assert_eq!(Extent3d::new_2d(300, 200).full_mip_count(), 9);
    }
}
