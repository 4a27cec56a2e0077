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

//! Resource set layouts.

use garnet_core::binding::{ResourceSetLayoutDesc, SlotDesc};
use garnet_core::error::GfxError;
use garnet_core::raw::{RawDescriptorLayoutId, RawDevice};
use std::borrow::Cow;
use std::sync::Arc;

/// An immutable array of typed binding slots, backed by a raw descriptor
/// layout. Sets are created against a layout and must bind matching
/// resource kinds.
pub struct ResourceSetLayout {
    device: Arc<dyn RawDevice>,
    raw: RawDescriptorLayoutId,
    slots: Vec<SlotDesc>,
    label: Option<Cow<'static, str>>,
}

impl ResourceSetLayout {
    pub(crate) fn create(
        device: Arc<dyn RawDevice>,
        descriptor: &ResourceSetLayoutDesc,
    ) -> Result<Self, GfxError> {
        let raw = device.create_descriptor_layout(descriptor)?;
        Ok(Self {
            device,
            raw,
            slots: descriptor.slots.clone(),
            label: descriptor.label.clone(),
        })
    }

    /// The typed slots, in slot-index order.
    pub fn slots(&self) -> &[SlotDesc] {
        &self.slots
    }

    /// The layout's debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn raw(&self) -> RawDescriptorLayoutId {
        self.raw
    }
}

impl Drop for ResourceSetLayout {
    fn drop(&mut self) {
        self.device.destroy_descriptor_layout(self.raw);
    }
}
