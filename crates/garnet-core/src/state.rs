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

//! Pipeline state descriptors.
//!
//! The blend, depth-stencil, and rasterizer descriptors are value types
//! intended to be interned: the session hands out one shared handle per
//! distinct value, which makes pointer identity a valid cache key for
//! pipeline construction. All three are therefore `Eq + Hash`, with float
//! fields compared through their bit patterns.

use crate::garnet_bitflags;
use std::hash::{Hash, Hasher};

/// The primitive topology used to interpret vertex data in a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is an isolated point.
    PointList,
    /// Each pair of vertices forms a line.
    LineList,
    /// Adjacent vertices form a connected line.
    LineStrip,
    /// Each triple of vertices forms a triangle.
    #[default]
    TriangleList,
    /// Adjacent vertices form connected triangles.
    TriangleStrip,
}

/// A multiplication factor applied to a blend input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`
    Zero,
    /// `1`
    One,
    /// Source color.
    SrcColor,
    /// `1 - source color`
    OneMinusSrcColor,
    /// Source alpha.
    SrcAlpha,
    /// `1 - source alpha`
    OneMinusSrcAlpha,
    /// Destination color.
    DstColor,
    /// `1 - destination color`
    OneMinusDstColor,
    /// Destination alpha.
    DstAlpha,
    /// `1 - destination alpha`
    OneMinusDstAlpha,
}

/// The operation combining the two blend inputs after factoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// `src * src_factor + dst * dst_factor`
    #[default]
    Add,
    /// `src * src_factor - dst * dst_factor`
    Subtract,
    /// `dst * dst_factor - src * src_factor`
    ReverseSubtract,
    /// `min(src, dst)`
    Min,
    /// `max(src, dst)`
    Max,
}

/// A complete blend equation for one component group (color or alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Factor applied to the fragment shader output.
    pub src_factor: BlendFactor,
    /// Factor applied to the value already in the target.
    pub dst_factor: BlendFactor,
    /// Operation combining the factored inputs.
    pub operation: BlendOperation,
}

impl Default for BlendComponent {
    fn default() -> Self {
        // Straight replace.
        Self {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::Zero,
            operation: BlendOperation::Add,
        }
    }
}

garnet_bitflags! {
    /// A mask enabling writes to individual color channels.
    pub struct ColorWrites: u8 {
        /// Write the red channel.
        const R = 0b0001;
        /// Write the green channel.
        const G = 0b0010;
        /// Write the blue channel.
        const B = 0b0100;
        /// Write the alpha channel.
        const A = 0b1000;
        /// Write all channels.
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

/// The blend state bound for a draw, interned by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateDesc {
    /// If `false`, fragments replace the target and the equations are ignored.
    pub enabled: bool,
    /// Blend equation for the RGB components.
    pub color: BlendComponent,
    /// Blend equation for the alpha component.
    pub alpha: BlendComponent,
    /// Channel write mask.
    pub write_mask: ColorWrites,
}

impl Default for BlendStateDesc {
    fn default() -> Self {
        Self {
            enabled: false,
            color: BlendComponent::default(),
            alpha: BlendComponent::default(),
            write_mask: ColorWrites::ALL,
        }
    }
}

impl BlendStateDesc {
    /// Conventional premultiplied-alpha transparency blend.
    pub fn alpha_blend() -> Self {
        Self {
            enabled: true,
            color: BlendComponent {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
                operation: BlendOperation::Add,
            },
            alpha: BlendComponent {
                src_factor: BlendFactor::One,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
                operation: BlendOperation::Add,
            },
            write_mask: ColorWrites::ALL,
        }
    }
}

/// A comparison function used for depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the stored value.
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the stored value.
    LessEqual,
    /// Passes if the new value is greater than the stored value.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the new value is greater than or equal to the stored value.
    GreaterEqual,
    /// The test always passes.
    #[default]
    Always,
}

/// The operation applied to a stencil value after a test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the stored value.
    #[default]
    Keep,
    /// Reset the stored value to zero.
    Zero,
    /// Replace the stored value with the reference value.
    Replace,
    /// Bitwise-invert the stored value.
    Invert,
    /// Increment, clamping at the maximum.
    IncrementClamp,
    /// Decrement, clamping at zero.
    DecrementClamp,
    /// Increment with wraparound.
    IncrementWrap,
    /// Decrement with wraparound.
    DecrementWrap,
}

/// Stencil behavior for one primitive face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StencilFaceState {
    /// Comparison used for the stencil test.
    pub compare: CompareFunction,
    /// Applied when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Applied when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Applied when both tests pass.
    pub depth_pass_op: StencilOperation,
}

/// Depth bias applied during rasterization, used to avoid z-fighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthBiasState {
    /// Constant added to each fragment's depth.
    pub constant: i32,
    /// Factor scaling with the fragment's depth slope.
    pub slope_scale: f32,
    /// Upper bound on the applied bias.
    pub clamp: f32,
}

impl PartialEq for DepthBiasState {
    fn eq(&self, other: &Self) -> bool {
        self.constant == other.constant
            && self.slope_scale.to_bits() == other.slope_scale.to_bits()
            && self.clamp.to_bits() == other.clamp.to_bits()
    }
}

impl Eq for DepthBiasState {}

impl Hash for DepthBiasState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.constant.hash(state);
        self.slope_scale.to_bits().hash(state);
        self.clamp.to_bits().hash(state);
    }
}

/// The depth/stencil state bound for a draw, interned by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilStateDesc {
    /// If `true`, fragments are tested against the depth buffer.
    pub depth_test_enabled: bool,
    /// If `true`, passing fragments write their depth.
    pub depth_write_enabled: bool,
    /// Comparison used for the depth test.
    pub depth_compare: CompareFunction,
    /// Stencil behavior for front faces.
    pub stencil_front: StencilFaceState,
    /// Stencil behavior for back faces.
    pub stencil_back: StencilFaceState,
    /// Mask applied when reading stencil values.
    pub stencil_read_mask: u32,
    /// Mask applied when writing stencil values.
    pub stencil_write_mask: u32,
    /// Depth bias state.
    pub bias: DepthBiasState,
}

impl Default for DepthStencilStateDesc {
    fn default() -> Self {
        Self {
            depth_test_enabled: true,
            depth_write_enabled: true,
            depth_compare: CompareFunction::LessEqual,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            stencil_read_mask: !0,
            stencil_write_mask: !0,
            bias: DepthBiasState::default(),
        }
    }
}

/// Which primitive faces are discarded by culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Cull front-facing primitives.
    Front,
    /// Cull back-facing primitives.
    Back,
}

/// The winding order that defines a front-facing triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise winding is front-facing.
    #[default]
    Ccw,
    /// Clockwise winding is front-facing.
    Cw,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Filled polygons.
    #[default]
    Fill,
    /// Polygon edges only.
    Line,
}

/// The rasterizer state bound for a draw, interned by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterizerStateDesc {
    /// Face culling mode; `None` disables culling.
    pub cull_mode: Option<CullMode>,
    /// Winding order defining the front face.
    pub front_face: FrontFace,
    /// Fill or wireframe rasterization.
    pub polygon_mode: PolygonMode,
    /// If `true`, depth values are clamped instead of clipped.
    pub depth_clamp: bool,
}

/// The viewport transform applied to clip-space output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Minimum depth range value.
    pub min_depth: f32,
    /// Maximum depth range value.
    pub max_depth: f32,
}

impl Viewport {
    /// A full-target viewport with the standard `[0, 1]` depth range.
    pub fn of_extent(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// The scissor rectangle limiting fragment output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ScissorRect {
    /// A scissor covering a full target of the given extent.
    pub const fn of_extent(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// A value an attachment is cleared to at render pass begin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Clear color as linear RGBA.
    Color([f32; 4]),
    /// Clear depth and stencil values.
    DepthStencil {
        /// Depth clear value.
        depth: f32,
        /// Stencil clear value.
        stencil: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn blend_state_value_semantics() {
        assert_eq!(BlendStateDesc::default(), BlendStateDesc::default());
        assert_ne!(BlendStateDesc::default(), BlendStateDesc::alpha_blend());
        assert_eq!(
            hash_of(&BlendStateDesc::alpha_blend()),
            hash_of(&BlendStateDesc::alpha_blend())
        );
    }

    #[test]
    fn depth_bias_float_bits_equality() {
        let a = DepthBiasState {
            constant: 1,
            slope_scale: 0.5,
            clamp: 0.0,
        };
        let b = DepthBiasState {
            constant: 1,
            slope_scale: 0.5,
            clamp: 0.0,
        };
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = DepthBiasState {
            slope_scale: 0.25,
            ..a
        };
        assert_ne!(a, c);
    }

    #[test]
    fn scissor_of_extent() {
        let rect = ScissorRect::of_extent(1920, 1080);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.width, 1920);
        assert_eq!(rect.height, 1080);
    }
}
