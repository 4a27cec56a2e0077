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
use garnet_core::raw::{LoadOp, StoreOp};
use garnet_core::state::{ClearValue, PrimitiveTopology};
use garnet_gfx::{ListKind, NullCommand, PassAttachment, PassDescriptor};

#[test]
fn compatible_passes_share_a_framebuffer() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);

    let clearing = color_pass(&target);
    let loading = PassDescriptor {
        label: None,
        colors: vec![PassAttachment {
            texture: target.clone(),
            load: LoadOp::Load,
            store: StoreOp::Store,
            clear: ClearValue::Color([0.0; 4]),
        }],
        depth: None,
    };

    let first = gfx.begin_pass(&clearing, ListKind::Buffered).unwrap();
    let second = gfx.begin_pass(&loading, ListKind::Buffered).unwrap();
    // Load behavior changes the pass object but not pass compatibility,
    // so one framebuffer serves both.
    assert_eq!(device.live_framebuffers(), 1);
    drop(first);
    drop(second);
}

#[test]
fn distinct_targets_get_distinct_framebuffers() {
    let (device, gfx) = test_context();
    let a = render_target(&gfx, 64, 64);
    let b = render_target(&gfx, 64, 64);

    let _first = gfx.begin_pass(&color_pass(&a), ListKind::Buffered).unwrap();
    let _second = gfx.begin_pass(&color_pass(&b), ListKind::Buffered).unwrap();
    assert_eq!(device.live_framebuffers(), 2);
}

#[test]
fn dropping_a_target_invalidates_its_framebuffers() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    assert_eq!(device.live_framebuffers(), 1);

    drop(list);
    drop(target);
    assert_eq!(device.live_framebuffers(), 0);
}

#[test]
fn pipeline_variants_derive_from_the_first_compiled() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    list.draw(PrimitiveTopology::LineList, 0..2, None).unwrap();
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let binds: Vec<_> = device
        .submitted_commands()
        .into_iter()
        .filter_map(|command| match command {
            NullCommand::BindPipeline(pipeline) => Some(pipeline),
            _ => None,
        })
        .collect();
    // Two variants, and returning to the first topology reuses the
    // cached object rather than compiling a third.
    assert_eq!(binds.len(), 3);
    assert_ne!(binds[0], binds[1]);
    assert_eq!(binds[0], binds[2]);
    assert_eq!(device.pipelines_created(), 2);
    assert_eq!(device.pipeline_base(binds[0]), None);
    assert_eq!(device.pipeline_base(binds[1]), Some(binds[0]));
}
