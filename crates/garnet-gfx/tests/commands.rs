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
use garnet_core::memory::BufferUsage;
use garnet_core::state::{BlendStateDesc, PrimitiveTopology};
use garnet_gfx::{ListKind, MemoryLocation, NullCommand, StateFlags};

#[test]
fn redundant_state_changes_emit_nothing() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);
    let vertices = gfx
        .create_buffer(256, BufferUsage::VERTEX, MemoryLocation::Dynamic, None)
        .unwrap();

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.bind_vertex_buffer(&vertices, 0);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();

    // Re-applying identical state dirties nothing.
    let default_blend = gfx.blend_state(BlendStateDesc::default());
    for _ in 0..5 {
        list.bind_pipeline(&pipeline);
        list.bind_vertex_buffer(&vertices, 0);
        list.set_blend_state(&default_blend);
    }
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let commands = device.submitted_commands();
    assert!(matches!(commands[0], NullCommand::BeginPass { .. }));
    assert!(matches!(commands[1], NullCommand::BindPipeline(_)));
    assert!(matches!(commands[2], NullCommand::SetViewport(_)));
    assert!(matches!(commands[3], NullCommand::SetScissor(_)));
    assert!(matches!(commands[4], NullCommand::BindVertexBuffer { .. }));
    assert!(matches!(
        commands[5],
        NullCommand::Draw {
            vertex_count: 3,
            first_vertex: 0
        }
    ));
    // The second draw follows with no state commands in between.
    assert!(matches!(
        commands[6],
        NullCommand::Draw {
            vertex_count: 3,
            first_vertex: 0
        }
    ));
    assert!(matches!(commands[7], NullCommand::EndPass));
    assert_eq!(commands.len(), 8);
}

#[test]
fn changed_blend_state_switches_pipeline_once() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();

    let alpha = gfx.blend_state(BlendStateDesc::alpha_blend());
    list.set_blend_state(&alpha);
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
    assert_eq!(binds.len(), 2);
    assert_ne!(binds[0], binds[1]);
    assert_eq!(device.pipelines_created(), 2);
}

#[test]
fn child_commands_land_between_parent_commands() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();

    let mut child = list.create_child(StateFlags::ALL);
    child.draw(PrimitiveTopology::TriangleList, 0..6, None).unwrap();
    list.submit_child(child).unwrap();

    list.draw(PrimitiveTopology::TriangleList, 0..9, None).unwrap();
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let draws: Vec<u32> = device
        .submitted_commands()
        .into_iter()
        .filter_map(|command| match command {
            NullCommand::Draw { vertex_count, .. } => Some(vertex_count),
            _ => None,
        })
        .collect();
    assert_eq!(draws, vec![3, 6, 9]);
}

#[test]
fn empty_direct_list_records_no_native_commands() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);

    gfx.begin_frame().unwrap();
    let list = gfx.begin_pass(&color_pass(&target), ListKind::Direct).unwrap();
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    let commands = device.submitted_commands();
    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0], NullCommand::BeginPass { .. }));
    assert!(matches!(commands[1], NullCommand::EndPass));
}

#[test]
fn direct_list_flattens_through_secondary_execution() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Direct).unwrap();
    list.bind_pipeline(&pipeline);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    gfx.submit_pass(list).unwrap();
    gfx.end_frame().unwrap();

    // The primary stream holds an execute of the secondary buffer.
    let primary = device.submissions()[0];
    assert!(device
        .commands(primary)
        .iter()
        .any(|command| matches!(command, NullCommand::Execute(_))));
    assert!(device
        .submitted_commands()
        .iter()
        .any(|command| matches!(command, NullCommand::Draw { vertex_count: 3, .. })));
}

#[test]
fn pop_state_restores_previous_pipeline_without_recompiling() {
    let (device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();

    list.push_state(StateFlags::BLEND);
    let alpha = gfx.blend_state(BlendStateDesc::alpha_blend());
    list.set_blend_state(&alpha);
    list.draw(PrimitiveTopology::TriangleList, 0..3, None).unwrap();
    list.pop_state();
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
    assert_eq!(binds.len(), 3);
    assert_eq!(binds[0], binds[2]);
    assert_ne!(binds[0], binds[1]);
    assert_eq!(device.pipelines_created(), 2);
}

#[test]
#[should_panic(expected = "pop_state without a matching push_state")]
fn unbalanced_pop_state_panics() {
    let (_device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.pop_state();
}

#[test]
#[should_panic(expected = "runs backwards")]
fn backwards_draw_range_panics() {
    let (_device, gfx) = test_context();
    let target = render_target(&gfx, 64, 64);
    let pipeline = simple_pipeline(&gfx);

    gfx.begin_frame().unwrap();
    let mut list = gfx.begin_pass(&color_pass(&target), ListKind::Buffered).unwrap();
    list.bind_pipeline(&pipeline);
    let _ = list.draw(PrimitiveTopology::TriangleList, 3..0, None);
}
