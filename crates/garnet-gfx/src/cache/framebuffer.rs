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

//! Framebuffer cache.
//!
//! Keyed on the pass compatibility key plus the identity of the bound
//! images, so a rotating presentable image set transparently gets one
//! framebuffer per image. No framebuffer survives its own attachments:
//! destroying a render target erases every entry referencing it.

use crate::cache::PassCompatKey;
use garnet_core::error::GfxError;
use garnet_core::raw::{FramebufferDesc, RawDevice, RawFramebufferId, RawImageId, RawRenderPassId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FramebufferKey {
    compat: PassCompatKey,
    attachments: Vec<RawImageId>,
    width: u32,
    height: u32,
}

pub(crate) struct FramebufferCache {
    framebuffers: Mutex<HashMap<FramebufferKey, RawFramebufferId>>,
}

impl FramebufferCache {
    pub(crate) fn new() -> Self {
        Self {
            framebuffers: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn get(
        &self,
        device: &Arc<dyn RawDevice>,
        pass: RawRenderPassId,
        compat: &PassCompatKey,
        attachments: &[RawImageId],
        width: u32,
        height: u32,
    ) -> Result<RawFramebufferId, GfxError> {
        let key = FramebufferKey {
            compat: compat.clone(),
            attachments: attachments.to_vec(),
            width,
            height,
        };
        let mut framebuffers = self.framebuffers.lock().unwrap();
        if let Some(&framebuffer) = framebuffers.get(&key) {
            return Ok(framebuffer);
        }
        let framebuffer = device.create_framebuffer(&FramebufferDesc {
            pass,
            attachments: attachments.to_vec(),
            width,
            height,
        })?;
        log::debug!("created framebuffer {framebuffer:?} ({width}x{height})");
        framebuffers.insert(key, framebuffer);
        Ok(framebuffer)
    }

    /// Destroys every cached framebuffer that binds `image`. Linear scan;
    /// target destruction is rare.
    pub(crate) fn invalidate_target(&self, device: &Arc<dyn RawDevice>, image: RawImageId) {
        let mut framebuffers = self.framebuffers.lock().unwrap();
        let mut dropped = 0usize;
        framebuffers.retain(|key, &mut framebuffer| {
            if key.attachments.contains(&image) {
                device.destroy_framebuffer(framebuffer);
                dropped += 1;
                false
            } else {
                true
            }
        });
        if dropped > 0 {
            log::debug!("invalidated {dropped} framebuffers for {image:?}");
        }
    }
}
