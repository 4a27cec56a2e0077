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

#![allow(dead_code)]

use garnet_core::image::{Extent3d, ImageDescriptor};
use garnet_core::memory::ImageUsage;
use garnet_core::raw::{LoadOp, StoreOp};
use garnet_core::state::ClearValue;
use garnet_core::{TextureFormat, VertexFormat, VertexLayout};
use garnet_gfx::{
    FaultPolicy, GfxContext, GfxSettings, GpuTexture, NullDevice, PassAttachment, PassDescriptor,
    Pipeline,
};
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_context() -> (Arc<NullDevice>, GfxContext) {
    test_context_with(GfxSettings::default())
}

pub fn test_context_with(mut settings: GfxSettings) -> (Arc<NullDevice>, GfxContext) {
    init_logging();
    settings.fault_policy = FaultPolicy::Propagate;
    let device = Arc::new(NullDevice::new());
    let gfx = GfxContext::new(device.clone(), settings);
    (device, gfx)
}

pub fn render_target(gfx: &GfxContext, width: u32, height: u32) -> Arc<GpuTexture> {
    gfx.create_texture(ImageDescriptor {
        label: Some("target".into()),
        extent: Extent3d::new_2d(width, height),
        mip_levels: 1,
        format: TextureFormat::Rgba8Unorm,
        usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::SAMPLED,
        sample_count: 1,
    })
    .unwrap()
}

pub fn color_pass(target: &Arc<GpuTexture>) -> PassDescriptor {
    PassDescriptor {
        label: None,
        colors: vec![PassAttachment {
            texture: target.clone(),
            load: LoadOp::Clear,
            store: StoreOp::Store,
            clear: ClearValue::Color([0.0, 0.0, 0.0, 1.0]),
        }],
        depth: None,
    }
}

pub fn simple_pipeline(gfx: &GfxContext) -> Arc<Pipeline> {
    gfx.create_pipeline(
        Some("test pipeline".into()),
        VertexLayout::default().attribute(VertexFormat::Float32x3),
    )
}
