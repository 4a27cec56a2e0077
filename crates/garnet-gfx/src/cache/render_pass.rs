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

//! Render pass cache and the pass compatibility key.

use garnet_core::error::GfxError;
use garnet_core::format::TextureFormat;
use garnet_core::raw::{RawDevice, RawRenderPassId, RenderPassDesc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The reduced pass identity used for framebuffer and pipeline reuse.
///
/// Two passes are compatible, meaning their framebuffers and pipelines
/// are interchangeable, iff their attachment counts, formats, and sample
/// counts match. Load and store behavior deliberately does not
/// participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PassCompatKey {
    /// `(format, samples)` per color attachment, in slot order.
    pub colors: Vec<(TextureFormat, u32)>,
    /// `(format, samples)` of the depth attachment, if present.
    pub depth: Option<(TextureFormat, u32)>,
}

impl PassCompatKey {
    /// The compatibility key of a full pass description.
    pub fn of_desc(desc: &RenderPassDesc) -> Self {
        Self {
            colors: desc
                .colors
                .iter()
                .map(|attachment| (attachment.format, attachment.samples))
                .collect(),
            depth: desc
                .depth
                .as_ref()
                .map(|attachment| (attachment.format, attachment.samples)),
        }
    }
}

/// Cache of native render passes keyed on full pass identity. Entries
/// live for the session.
pub(crate) struct RenderPassCache {
    passes: Mutex<HashMap<RenderPassDesc, RawRenderPassId>>,
}

impl RenderPassCache {
    pub(crate) fn new() -> Self {
        Self {
            passes: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn get(
        &self,
        device: &Arc<dyn RawDevice>,
        desc: &RenderPassDesc,
    ) -> Result<RawRenderPassId, GfxError> {
        let mut passes = self.passes.lock().unwrap();
        if let Some(&pass) = passes.get(desc) {
            return Ok(pass);
        }
        let pass = device.create_render_pass(desc)?;
        log::debug!("created render pass {pass:?} ({} color attachments)", desc.colors.len());
        passes.insert(desc.clone(), pass);
        Ok(pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_core::raw::{AttachmentDesc, LoadOp, StoreOp};

    fn attachment(format: TextureFormat, load: LoadOp) -> AttachmentDesc {
        AttachmentDesc {
            format,
            samples: 1,
            load,
            store: StoreOp::Store,
        }
    }

    #[test]
    fn compat_ignores_load_store() {
        let a = RenderPassDesc {
            colors: vec![attachment(TextureFormat::Rgba8Unorm, LoadOp::Clear)],
            depth: None,
        };
        let b = RenderPassDesc {
            colors: vec![attachment(TextureFormat::Rgba8Unorm, LoadOp::Load)],
            depth: None,
        };
        assert_ne!(a, b);
        assert_eq!(PassCompatKey::of_desc(&a), PassCompatKey::of_desc(&b));
    }

    #[test]
    fn compat_distinguishes_formats() {
        let a = RenderPassDesc {
            colors: vec![attachment(TextureFormat::Rgba8Unorm, LoadOp::Clear)],
            depth: None,
        };
        let b = RenderPassDesc {
            colors: vec![attachment(TextureFormat::Rgba16Float, LoadOp::Clear)],
            depth: None,
        };
        assert_ne!(PassCompatKey::of_desc(&a), PassCompatKey::of_desc(&b));
    }
}
