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

mod common;

use common::{color_pass, render_target, simple_pipeline, test_context, test_context_with};
use garnet_core::binding::{ResourceSetLayoutDesc, SlotKind};
use garnet_core::error::{DeviceError, GfxError};
use garnet_core::image::{Extent3d, ImageDescriptor, Origin3d};
use garnet_core::memory::{BufferUsage, ImageUsage};
use garnet_core::state::PrimitiveTopology;
use garnet_core::TextureFormat;
use garnet_gfx::{GfxSettings, ListKind, MemoryLocation, NullCommand, WriteMode};

/// A per-draw uniform rewritten with discards while the frame is still
/// reading every previous value: each rewrite must land in fresh memory,
/// and everything but the live block must return after the frame.
#[test]
fn discard_rewrites_rotate_and_reclaim() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[SlotKind::UniformBuffer]))
        .unwrap();
    let set = gfx.create_resource_set(&layout);
    let uniform = gfx
        .create_buffer(64, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None)
        .unwrap();
    set.bind_uniform_buffer(0, &uniform);

    gfx.begin_frame().unwrap();
    for value in 0u8..3 {
        uniform.update(0, &[value; 64], WriteMode::Discard).unwrap();
        let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
        list.bind_pipeline(&pipeline);
        list.bind_resource_set(0, &set);
        list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
        gfx.submit_pass(list).unwrap();
    }
    // Uniform block plus two rotated-out predecessors, plus the render
    // target's image block.
    assert_eq!(gfx.stats().blocks, 4);

    gfx.end_frame().unwrap();
    // The frame completed: only the live uniform block and the image
    // block remain.
    let stats = gfx.stats();
    assert_eq!(stats.blocks, 2);
    assert_eq!(stats.retired_blocks, 0);

    // Each draw saw its own value at its own descriptor.
    let descriptors: Vec<_> = device
        .submitted_commands()
        .into_iter()
        .filter_map(|command| match command {
            NullCommand::BindDescriptor { descriptor, .. } => Some(descriptor),
            _ => None,
        })
        .collect();
    assert_eq!(descriptors.len(), 3);
    assert_ne!(descriptors[0], descriptors[1]);
    assert_ne!(descriptors[1], descriptors[2]);
}

#[test]
fn device_local_uploads_stage_and_free_with_the_frame() {
    let (device, gfx) = test_context();
    let vertices = gfx
        .create_buffer(256, BufferUsage::VERTEX, MemoryLocation::DeviceLocal, None)
        .unwrap();

    gfx.begin_frame().unwrap();
    vertices.update(0, &[1u8; 256], WriteMode::Normal).unwrap();
    // Vertex block, its staging block, and nothing else.
    assert_eq!(gfx.stats().blocks, 2);
    gfx.end_frame().unwrap();

    // The transfer stream was submitted ahead of the primary.
    assert_eq!(device.submissions().len(), 2);
    let commands = device.submitted_commands();
    assert!(matches!(commands[0], NullCommand::CopyBuffer { size: 256, .. }));

    // Staging memory went back with the frame.
    assert_eq!(gfx.stats().blocks, 1);
}

#[test]
fn texture_upload_and_mip_generation_use_the_transfer_stream() {
    let (device, gfx) = test_context();
    let texture = gfx
        .create_texture(ImageDescriptor {
            label: None,
            extent: Extent3d::new_2d(16, 16),
            mip_levels: 5,
            format: TextureFormat::Rgba8Unorm,
            usage: ImageUsage::SAMPLED | ImageUsage::TRANSFER_SRC | ImageUsage::TRANSFER_DST,
            sample_count: 1,
        })
        .unwrap();

    gfx.begin_frame().unwrap();
    gfx.upload_texture(
        &texture,
        0,
        Origin3d::default(),
        Extent3d::new_2d(16, 16),
        &[0u8; 16 * 16 * 4],
    )
    .unwrap();
    gfx.generate_mipmaps(&texture).unwrap();
    gfx.end_frame().unwrap();

    let commands = device.submitted_commands();
    assert!(matches!(commands[0], NullCommand::CopyBufferToImage { .. }));
    let blits = commands
        .iter()
        .filter(|command| matches!(command, NullCommand::BlitImage { .. }))
        .count();
    assert_eq!(blits, 4);
}

#[test]
fn frame_cap_blocks_on_the_oldest_fence() {
    let (device, gfx) = test_context_with(GfxSettings {
        frames_in_flight: 1,
        ..GfxSettings::default()
    });
    device.set_manual_fences(true);

    gfx.begin_frame().unwrap();
    gfx.end_frame().unwrap();
    assert_eq!(gfx.pending_frames(), 1);

    // A second submission exceeds the cap; with no fence progress the
    // wait reports a timeout.
    gfx.begin_frame().unwrap();
    let result = gfx.end_frame();
    assert!(matches!(
        result,
        Err(GfxError::Device(DeviceError::FenceTimeout { .. }))
    ));
    assert_eq!(gfx.pending_frames(), 2);

    device.signal_all_fences();
    gfx.wait_idle().unwrap();
    assert_eq!(gfx.pending_frames(), 0);
}

#[test]
fn frames_retire_in_submission_order() {
    let (device, gfx) = test_context();
    device.set_manual_fences(true);

    for _ in 0..2 {
        gfx.begin_frame().unwrap();
        gfx.end_frame().unwrap();
    }
    assert_eq!(gfx.pending_frames(), 2);

    // Only the two already-signalled frames retire; the new one stays
    // pending behind its own fence.
    device.signal_all_fences();
    gfx.begin_frame().unwrap();
    gfx.end_frame().unwrap();
    assert_eq!(gfx.pending_frames(), 1);

    device.signal_all_fences();
    gfx.wait_idle().unwrap();
    assert_eq!(gfx.pending_frames(), 0);
}
