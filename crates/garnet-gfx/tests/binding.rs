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

use common::{color_pass, render_target, simple_pipeline, test_context};
use garnet_core::binding::{ResourceSetLayoutDesc, SlotKind};
use garnet_core::image::{Extent3d, ImageDescriptor, SamplerDesc};
use garnet_core::memory::{BufferUsage, ImageUsage};
use garnet_core::raw::{DescriptorBindingDesc, RawDescriptorId};
use garnet_core::state::PrimitiveTopology;
use garnet_core::TextureFormat;
use garnet_gfx::{GfxContext, ListKind, MemoryLocation, NullCommand, NullDevice};

fn uniform_buffer(gfx: &GfxContext, size: u64) -> std::sync::Arc<garnet_gfx::GpuBuffer> {
    gfx.create_buffer(size, BufferUsage::UNIFORM, MemoryLocation::Dynamic, None)
        .unwrap()
}

fn bound_descriptors(device: &NullDevice) -> Vec<RawDescriptorId> {
    device
        .submitted_commands()
        .into_iter()
        .filter_map(|command| match command {
            NullCommand::BindDescriptor { descriptor, .. } => Some(descriptor),
            _ => None,
        })
        .collect()
}

#[test]
fn uniform_blocks_bind_one_raw_buffer_at_aligned_offsets() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[SlotKind::UniformBuffer]))
        .unwrap();

    let sets: Vec<_> = (0..3)
        .map(|_| {
            let set = gfx.create_resource_set(&layout);
            set.bind_uniform_buffer(0, &uniform_buffer(&gfx, 64));
            set
        })
        .collect();

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    for set in &sets {
        list.bind_resource_set(0, set);
        list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    }
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let bindings: Vec<(u64, u64, u64)> = bound_descriptors(&device)
        .into_iter()
        .map(|descriptor| match device.descriptor_bindings(descriptor)[0] {
            Some(DescriptorBindingDesc::UniformBuffer {
                buffer,
                offset,
                range,
            }) => (buffer.0, offset, range),
            other => panic!("unexpected binding {other:?}"),
        })
        .collect();
    assert_eq!(bindings.len(), 3);
    // One pool-wide raw buffer, carved at uniform-aligned offsets.
    assert!(bindings.iter().all(|&(buffer, _, _)| buffer == bindings[0].0));
    assert!(bindings.iter().all(|&(_, offset, _)| offset % 256 == 0));
    assert!(bindings.iter().all(|&(_, _, range)| range == 64));
    assert_ne!(bindings[0].1, bindings[1].1);
    assert_ne!(bindings[1].1, bindings[2].1);
}

#[test]
fn uniform_packing_follows_the_device_alignment_limit() {
    let (device, gfx) = test_context();
    device.set_uniform_offset_alignment(64);
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[SlotKind::UniformBuffer]))
        .unwrap();

    let sets: Vec<_> = (0..3)
        .map(|_| {
            let set = gfx.create_resource_set(&layout);
            set.bind_uniform_buffer(0, &uniform_buffer(&gfx, 64));
            set
        })
        .collect();

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    for set in &sets {
        list.bind_resource_set(0, set);
        list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    }
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let mut offsets: Vec<u64> = bound_descriptors(&device)
        .into_iter()
        .map(|descriptor| match device.descriptor_bindings(descriptor)[0] {
            Some(DescriptorBindingDesc::UniformBuffer { offset, .. }) => offset,
            other => panic!("unexpected binding {other:?}"),
        })
        .collect();
    offsets.sort_unstable();
    // A looser device limit packs the 64-byte blocks back to back.
    assert_eq!(offsets, vec![0, 64, 128]);
}

#[test]
fn uncontended_rebind_updates_descriptor_in_place() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[SlotKind::UniformBuffer]))
        .unwrap();
    let set = gfx.create_resource_set(&layout);
    let first = uniform_buffer(&gfx, 64);
    let second = uniform_buffer(&gfx, 64);

    for buffer in [&first, &second] {
        set.bind_uniform_buffer(0, buffer);
        gfx.begin_frame().unwrap();
        let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
        list.bind_pipeline(&pipeline);
        list.bind_resource_set(0, &set);
        list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
        gfx.submit_pass(list).unwrap();
        gfx.end_frame().unwrap();
    }

    // The first frame completed before the rebind, so the same native
    // descriptor was rewritten.
    let descriptors = bound_descriptors(&device);
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0], descriptors[1]);
    assert_eq!(device.live_descriptors(), 1);
}

#[test]
fn contended_rebind_rotates_to_a_new_descriptor() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[SlotKind::UniformBuffer]))
        .unwrap();
    let set = gfx.create_resource_set(&layout);
    let first = uniform_buffer(&gfx, 64);
    let second = uniform_buffer(&gfx, 64);

    gfx.begin_frame().unwrap();
    for buffer in [&first, &second] {
        set.bind_uniform_buffer(0, buffer);
        let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
        list.bind_pipeline(&pipeline);
        list.bind_resource_set(0, &set);
        list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
        gfx.submit_pass(list).unwrap();
    }
    gfx.end_frame().unwrap();

    // The frame still referenced the first generation at rebind time, so
    // the set rotated instead of overwriting it.
    let descriptors = bound_descriptors(&device);
    assert_eq!(descriptors.len(), 2);
    assert_ne!(descriptors[0], descriptors[1]);
    // The superseded generation was freed once the frame completed.
    assert_eq!(device.live_descriptors(), 1);
}

#[test]
fn rotation_copies_unchanged_slots_forward() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[
            SlotKind::UniformBuffer,
            SlotKind::CombinedTextureSampler,
        ]))
        .unwrap();
    let set = gfx.create_resource_set(&layout);
    let first = uniform_buffer(&gfx, 64);
    let second = uniform_buffer(&gfx, 64);
    let texture = gfx
        .create_texture(ImageDescriptor {
            label: None,
            extent: Extent3d::new_2d(16, 16),
            mip_levels: 1,
            format: TextureFormat::Rgba8Unorm,
            usage: ImageUsage::SAMPLED,
            sample_count: 1,
        })
        .unwrap();
    let sampler = gfx.create_sampler(SamplerDesc::default()).unwrap();
    set.bind_uniform_buffer(0, &first);
    set.bind_combined_texture_sampler(1, &texture, &sampler);

    gfx.begin_frame().unwrap();
    for buffer in [&first, &second] {
        set.bind_uniform_buffer(0, buffer);
        let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
        list.bind_pipeline(&pipeline);
        list.bind_resource_set(0, &set);
        list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
        gfx.submit_pass(list).unwrap();
    }
    gfx.end_frame().unwrap();

    let descriptors = bound_descriptors(&device);
    assert_ne!(descriptors[0], descriptors[1]);
    // The texture slot was never rewritten after the rotation; it must
    // have been copied from the old generation.
    let bindings = device.descriptor_bindings(descriptors[1]);
    assert!(matches!(
        bindings[1],
        Some(DescriptorBindingDesc::CombinedTextureSampler { .. })
    ));
}

#[test]
fn texture_and_sampler_slots_bind_independently() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[
            SlotKind::SampledTexture,
            SlotKind::Sampler,
        ]))
        .unwrap();
    let set = gfx.create_resource_set(&layout);
    let texture = gfx
        .create_texture(ImageDescriptor {
            label: None,
            extent: Extent3d::new_2d(16, 16),
            mip_levels: 1,
            format: TextureFormat::Rgba8Unorm,
            usage: ImageUsage::SAMPLED,
            sample_count: 1,
        })
        .unwrap();
    let sampler = gfx.create_sampler(SamplerDesc::default()).unwrap();
    set.bind_texture(0, &texture);
    set.bind_sampler(1, &sampler);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.bind_resource_set(0, &set);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let descriptors = bound_descriptors(&device);
    assert_eq!(descriptors.len(), 1);
    let bindings = device.descriptor_bindings(descriptors[0]);
    assert!(matches!(
        bindings[0],
        Some(DescriptorBindingDesc::SampledTexture { .. })
    ));
    assert!(matches!(
        bindings[1],
        Some(DescriptorBindingDesc::Sampler { .. })
    ));
}

#[test]
fn buffer_discard_refreshes_stale_bindings() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[SlotKind::UniformBuffer]))
        .unwrap();
    let set = gfx.create_resource_set(&layout);
    let buffer = uniform_buffer(&gfx, 64);
    set.bind_uniform_buffer(0, &buffer);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.bind_resource_set(0, &set);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    gfx.submit_pass(list).unwrap();

    // The frame still reads the old block, so a discard moves the buffer
    // and the set must pick the move up without an explicit rebind.
    buffer
        .update(0, &[7u8; 64], garnet_gfx::WriteMode::Discard)
        .unwrap();

    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.bind_resource_set(0, &set);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let descriptors = bound_descriptors(&device);
    assert_eq!(descriptors.len(), 2);
    assert_ne!(descriptors[0], descriptors[1]);
}

#[test]
#[should_panic(expected = "not a uniform-buffer slot")]
fn binding_wrong_slot_kind_panics() {
    let (_device, gfx) = test_context();
    let layout = gfx
        .create_resource_set_layout(&ResourceSetLayoutDesc::of_kinds(&[SlotKind::SampledTexture]))
        .unwrap();
    let set = gfx.create_resource_set(&layout);
    let buffer = uniform_buffer(&gfx, 64);
    set.bind_uniform_buffer(0, &buffer);
}
