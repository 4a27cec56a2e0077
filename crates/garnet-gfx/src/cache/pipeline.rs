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

//! Pipeline state object cache.
//!
//! A [`Pipeline`] handle carries the program and vertex layout; the full
//! native object also depends on topology, pass compatibility, and the
//! interned fixed-function state bound at draw time. That combination is
//! resolved here on first use and reused afterwards. The first native
//! object compiled for a program becomes the derivation base for every
//! later variant of the same program, which lets the driver share
//! compiled state between them.

use crate::cache::PassCompatKey;
use crate::resource::Pipeline;
use garnet_core::error::GfxError;
use garnet_core::raw::{
    PipelineDesc, RawDevice, RawPipelineId, RawProgramId, RawRenderPassId,
};
use garnet_core::state::{
    BlendStateDesc, DepthStencilStateDesc, PrimitiveTopology, RasterizerStateDesc,
};
use garnet_core::vertex::VertexLayout;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fixed-function state participates by interned pointer identity, which
/// is cheap and sound because the interner never hands out two `Arc`s
/// with equal contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: RawProgramId,
    topology: PrimitiveTopology,
    compat: PassCompatKey,
    blend: usize,
    depth_stencil: usize,
    rasterizer: usize,
    vertex: VertexLayout,
}

struct CacheInner {
    pipelines: HashMap<PipelineKey, RawPipelineId>,
    /// First compiled variant per program, used as the derivation base.
    roots: HashMap<RawProgramId, RawPipelineId>,
}

pub(crate) struct PipelineCache {
    inner: Mutex<CacheInner>,
}

impl PipelineCache {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                pipelines: HashMap::new(),
                roots: HashMap::new(),
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn get(
        &self,
        device: &Arc<dyn RawDevice>,
        pipeline: &Pipeline,
        topology: PrimitiveTopology,
        pass: RawRenderPassId,
        compat: &PassCompatKey,
        blend: &Arc<BlendStateDesc>,
        depth_stencil: &Arc<DepthStencilStateDesc>,
        rasterizer: &Arc<RasterizerStateDesc>,
    ) -> Result<RawPipelineId, GfxError> {
        let key = PipelineKey {
            program: pipeline.program(),
            topology,
            compat: compat.clone(),
            blend: Arc::as_ptr(blend) as usize,
            depth_stencil: Arc::as_ptr(depth_stencil) as usize,
            rasterizer: Arc::as_ptr(rasterizer) as usize,
            vertex: pipeline.vertex_layout().clone(),
        };
        let mut inner = self.inner.lock().unwrap();
        if let Some(&resolved) = inner.pipelines.get(&key) {
            return Ok(resolved);
        }
        let base = inner.roots.get(&key.program).copied();
        let resolved = device.create_pipeline(&PipelineDesc {
            label: pipeline.label_cow(),
            program: key.program,
            pass,
            topology,
            vertex_layout: key.vertex.clone(),
            blend: (**blend).clone(),
            depth_stencil: (**depth_stencil).clone(),
            rasterizer: (**rasterizer).clone(),
            base,
        })?;
        log::debug!(
            "compiled pipeline {resolved:?} for {:?} (topology {topology:?}, derived: {})",
            pipeline.label().unwrap_or("unnamed"),
            base.is_some()
        );
        inner.roots.entry(key.program).or_insert(resolved);
        inner.pipelines.insert(key, resolved);
        Ok(resolved)
    }

    pub(crate) fn destroy_all(&self, device: &Arc<dyn RawDevice>) {
        let mut inner = self.inner.lock().unwrap();
        for (_, pipeline) in inner.pipelines.drain() {
            device.destroy_pipeline(pipeline);
        }
        inner.roots.clear();
    }
}
