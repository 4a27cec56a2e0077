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

//! Resource sets with copy-on-write descriptor generations.
//!
//! Overwriting a descriptor the GPU may still be reading is undefined
//! behavior, so a set never mutates its current native descriptor while
//! anything else holds a reference to it. When a dirty set is prepared
//! under contention, a fresh descriptor is allocated, the unchanged
//! slots are copied forward, and only then are the dirty slots written.
//! The old generation stays alive through the references held by
//! whichever command lists and frames bound it, and is freed when the
//! last of those drops.

use crate::context::GfxShared;
use crate::frame::FrameRef;
use crate::resource::{GpuBuffer, GpuTexture, Sampler};
use garnet_core::binding::SlotKind;
use garnet_core::error::GfxError;
use garnet_core::raw::{DescriptorBindingDesc, DescriptorWrite, RawDescriptorId, RawDevice};
use std::sync::{Arc, Mutex};

use super::ResourceSetLayout;

/// One live native descriptor object. Freed on drop, which happens once
/// the owning set has rotated past it and every frame that bound it has
/// completed.
#[derive(Debug)]
pub(crate) struct DescriptorGen {
    device: Arc<dyn RawDevice>,
    raw: RawDescriptorId,
}

impl DescriptorGen {
    fn new(device: Arc<dyn RawDevice>, raw: RawDescriptorId) -> Self {
        Self { device, raw }
    }

    pub(crate) fn raw(&self) -> RawDescriptorId {
        self.raw
    }
}

impl Drop for DescriptorGen {
    fn drop(&mut self) {
        self.device.free_descriptor(self.raw);
    }
}

#[derive(Clone)]
enum BoundValue {
    UniformBuffer {
        buffer: Arc<GpuBuffer>,
    },
    Texture {
        texture: Arc<GpuTexture>,
    },
    Sampler {
        sampler: Arc<Sampler>,
    },
    Combined {
        texture: Arc<GpuTexture>,
        sampler: Arc<Sampler>,
    },
}

struct SetInner {
    bindings: Vec<Option<BoundValue>>,
    /// Buffer generation observed per slot; a mismatch at prepare time
    /// means the buffer was reallocated underneath the binding.
    seen_generations: Vec<u64>,
    dirty: u32,
    current: Option<Arc<DescriptorGen>>,
}

/// A bound group of resources matching a [`ResourceSetLayout`].
pub struct ResourceSet {
    layout: Arc<ResourceSetLayout>,
    inner: Mutex<SetInner>,
}

impl ResourceSet {
    pub(crate) fn new(layout: Arc<ResourceSetLayout>) -> Self {
        let count = layout.slots().len();
        debug_assert!(count <= 32, "a set layout is limited to 32 slots");
        Self {
            layout,
            inner: Mutex::new(SetInner {
                bindings: vec![None; count],
                seen_generations: vec![0; count],
                dirty: 0,
                current: None,
            }),
        }
    }

    /// The layout this set was created against.
    pub fn layout(&self) -> &Arc<ResourceSetLayout> {
        &self.layout
    }

    /// Binds a uniform buffer to a slot and marks it dirty. Rebinding
    /// the same buffer is a no-op; a reallocation of the buffer is
    /// picked up automatically at the next prepare.
    ///
    /// # Panics
    /// If the slot is out of range or is not a uniform-buffer slot.
    pub fn bind_uniform_buffer(&self, slot: usize, buffer: &Arc<GpuBuffer>) {
        assert_eq!(
            self.slot_kind(slot),
            SlotKind::UniformBuffer,
            "slot {slot} is not a uniform-buffer slot"
        );
        let mut inner = self.inner.lock().unwrap();
        if let Some(BoundValue::UniformBuffer { buffer: current }) = &inner.bindings[slot] {
            if Arc::ptr_eq(current, buffer) {
                return;
            }
        }
        inner.seen_generations[slot] = buffer.generation();
        inner.bindings[slot] = Some(BoundValue::UniformBuffer {
            buffer: buffer.clone(),
        });
        inner.dirty |= 1 << slot;
    }

    /// Binds a sampled texture to a slot and marks it dirty. The sampler
    /// lives in its own slot.
    ///
    /// # Panics
    /// If the slot is out of range or is not a sampled-texture slot.
    pub fn bind_texture(&self, slot: usize, texture: &Arc<GpuTexture>) {
        assert_eq!(
            self.slot_kind(slot),
            SlotKind::SampledTexture,
            "slot {slot} is not a sampled-texture slot"
        );
        let mut inner = self.inner.lock().unwrap();
        if let Some(BoundValue::Texture { texture: current }) = &inner.bindings[slot] {
            if Arc::ptr_eq(current, texture) {
                return;
            }
        }
        inner.bindings[slot] = Some(BoundValue::Texture {
            texture: texture.clone(),
        });
        inner.dirty |= 1 << slot;
    }

    /// Binds a standalone sampler to a slot and marks it dirty.
    ///
    /// # Panics
    /// If the slot is out of range or is not a sampler slot.
    pub fn bind_sampler(&self, slot: usize, sampler: &Arc<Sampler>) {
        assert_eq!(
            self.slot_kind(slot),
            SlotKind::Sampler,
            "slot {slot} is not a sampler slot"
        );
        let mut inner = self.inner.lock().unwrap();
        if let Some(BoundValue::Sampler { sampler: current }) = &inner.bindings[slot] {
            if Arc::ptr_eq(current, sampler) {
                return;
            }
        }
        inner.bindings[slot] = Some(BoundValue::Sampler {
            sampler: sampler.clone(),
        });
        inner.dirty |= 1 << slot;
    }

    /// Binds a texture together with its sampler to a combined slot and
    /// marks it dirty.
    ///
    /// # Panics
    /// If the slot is out of range or is not a combined slot.
    pub fn bind_combined_texture_sampler(
        &self,
        slot: usize,
        texture: &Arc<GpuTexture>,
        sampler: &Arc<Sampler>,
    ) {
        assert_eq!(
            self.slot_kind(slot),
            SlotKind::CombinedTextureSampler,
            "slot {slot} is not a combined-texture-sampler slot"
        );
        let mut inner = self.inner.lock().unwrap();
        if let Some(BoundValue::Combined {
            texture: cur_texture,
            sampler: cur_sampler,
        }) = &inner.bindings[slot]
        {
            if Arc::ptr_eq(cur_texture, texture) && Arc::ptr_eq(cur_sampler, sampler) {
                return;
            }
        }
        inner.bindings[slot] = Some(BoundValue::Combined {
            texture: texture.clone(),
            sampler: sampler.clone(),
        });
        inner.dirty |= 1 << slot;
    }

    /// Resolves the set to a native descriptor for an imminent draw,
    /// rotating to a new generation if the current one is contended.
    /// Also returns the references the issuing command stream must hold.
    pub(crate) fn prepare_for_draw(
        &self,
        shared: &GfxShared,
    ) -> Result<(Arc<DescriptorGen>, Vec<FrameRef>), GfxError> {
        let mut inner = self.inner.lock().unwrap();

        // Reallocated buffers force their slot dirty even without an
        // explicit rebind.
        for slot in 0..inner.bindings.len() {
            let generation = match &inner.bindings[slot] {
                Some(BoundValue::UniformBuffer { buffer }) => buffer.generation(),
                _ => continue,
            };
            if inner.seen_generations[slot] != generation {
                inner.seen_generations[slot] = generation;
                inner.dirty |= 1 << slot;
            }
        }

        let device = &shared.device;
        let generation = match inner.current.clone() {
            None => {
                let raw = device.allocate_descriptor(self.layout.raw())?;
                let fresh = Arc::new(DescriptorGen::new(device.clone(), raw));
                let writes = writes_for(&inner.bindings, !0);
                if !writes.is_empty() {
                    device.update_descriptor(raw, &writes);
                }
                inner.dirty = 0;
                inner.current = Some(fresh.clone());
                fresh
            }
            Some(current) => {
                if inner.dirty == 0 {
                    current
                } else {
                    // Two references are our own: `inner.current` and
                    // the local clone. More means a command stream still
                    // reads this generation.
                    let contended = Arc::strong_count(&current) > 2;
                    if contended {
                        let raw = device.allocate_descriptor(self.layout.raw())?;
                        let fresh = Arc::new(DescriptorGen::new(device.clone(), raw));
                        let keep: Vec<u32> = (0..inner.bindings.len())
                            .filter(|&slot| {
                                inner.bindings[slot].is_some()
                                    && inner.dirty & (1 << slot) == 0
                            })
                            .map(|slot| slot as u32)
                            .collect();
                        if !keep.is_empty() {
                            device.copy_descriptor(current.raw(), raw, &keep);
                        }
                        let writes = writes_for(&inner.bindings, inner.dirty);
                        if !writes.is_empty() {
                            device.update_descriptor(raw, &writes);
                        }
                        log::trace!("resource set rotated to a new descriptor generation");
                        inner.dirty = 0;
                        inner.current = Some(fresh.clone());
                        fresh
                    } else {
                        let writes = writes_for(&inner.bindings, inner.dirty);
                        if !writes.is_empty() {
                            device.update_descriptor(current.raw(), &writes);
                        }
                        inner.dirty = 0;
                        current
                    }
                }
            }
        };

        let references = collect_references(&inner.bindings);
        Ok((generation, references))
    }

    fn slot_kind(&self, slot: usize) -> SlotKind {
        let slots = self.layout.slots();
        assert!(slot < slots.len(), "binding slot {slot} out of range");
        slots[slot].kind
    }
}

fn writes_for(bindings: &[Option<BoundValue>], mask: u32) -> Vec<DescriptorWrite> {
    let mut writes = Vec::new();
    for (slot, binding) in bindings.iter().enumerate() {
        if mask & (1 << slot) == 0 {
            continue;
        }
        let Some(binding) = binding else { continue };
        let binding = match binding {
            BoundValue::UniformBuffer { buffer } => {
                let (raw, offset, range) = buffer.raw_binding();
                DescriptorBindingDesc::UniformBuffer {
                    buffer: raw,
                    offset,
                    range,
                }
            }
            BoundValue::Texture { texture } => DescriptorBindingDesc::SampledTexture {
                image: texture.raw(),
            },
            BoundValue::Sampler { sampler } => DescriptorBindingDesc::Sampler {
                sampler: sampler.raw(),
            },
            BoundValue::Combined { texture, sampler } => {
                DescriptorBindingDesc::CombinedTextureSampler {
                    image: texture.raw(),
                    sampler: sampler.raw(),
                }
            }
        };
        writes.push(DescriptorWrite {
            slot: slot as u32,
            binding,
        });
    }
    writes
}

fn collect_references(bindings: &[Option<BoundValue>]) -> Vec<FrameRef> {
    let mut references = Vec::new();
    for binding in bindings.iter().flatten() {
        match binding {
            BoundValue::UniformBuffer { buffer } => {
                references.push(FrameRef::Memory(buffer.block()));
            }
            BoundValue::Texture { texture } => {
                references.push(FrameRef::Texture(texture.clone()));
            }
            BoundValue::Sampler { sampler } => {
                references.push(FrameRef::Sampler(sampler.clone()));
            }
            BoundValue::Combined { texture, sampler } => {
                references.push(FrameRef::Texture(texture.clone()));
                references.push(FrameRef::Sampler(sampler.clone()));
            }
        }
    }
    references
}
