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

//! Sub-allocation within one device memory pool.
//!
//! A pool is a single large device allocation subdivided into an ordered
//! list of entries. Entries live in an index-stable arena and are linked
//! by index rather than by pointer, so handles held outside the pool are
//! `(pool, entry)` index pairs that can never dangle. Invariant: the live
//! entries partition `[0, size)` exactly, and two adjacent entries are
//! never both free.

use garnet_core::raw::{RawBufferId, RawMemoryId};
use garnet_core::utils::align_up;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Free,
    Used,
    /// Removed by coalescing; the arena slot is awaiting reuse.
    Dead,
}

#[derive(Debug, Clone, Copy)]
struct PoolEntry {
    offset: u64,
    size: u64,
    state: EntryState,
    prev: Option<usize>,
    next: Option<usize>,
}

/// One device memory pool and its entry arena.
#[derive(Debug)]
pub(crate) struct MemoryPool {
    memory: RawMemoryId,
    buffer: Option<RawBufferId>,
    size: u64,
    entries: Vec<PoolEntry>,
    free: Vec<usize>,
    recycled: Vec<usize>,
    head: usize,
    used_bytes: u64,
}

impl MemoryPool {
    /// Wraps a fresh device allocation as one all-free entry.
    pub(crate) fn new(memory: RawMemoryId, buffer: Option<RawBufferId>, size: u64) -> Self {
        Self {
            memory,
            buffer,
            size,
            entries: vec![PoolEntry {
                offset: 0,
                size,
                state: EntryState::Free,
                prev: None,
                next: None,
            }],
            free: vec![0],
            recycled: Vec::new(),
            head: 0,
            used_bytes: 0,
        }
    }

    pub(crate) fn memory(&self) -> RawMemoryId {
        self.memory
    }

    pub(crate) fn buffer(&self) -> Option<RawBufferId> {
        self.buffer
    }

    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Carves `count` consecutive blocks of `size` bytes, each aligned to
    /// `align`, out of the lowest-offset free entry that fits. Returns
    /// `(entry index, offset)` per block, in ascending offset order, or
    /// `None` if no free entry fits.
    ///
    /// Placing a whole run inside one free entry is what guarantees that
    /// ring-buffer slices land in the same native allocation and can be
    /// addressed by offset alone.
    pub(crate) fn allocate_run(
        &mut self,
        size: u64,
        align: u64,
        count: usize,
    ) -> Option<Vec<(usize, u64)>> {
        let align = align.max(1);
        let stride = align_up(size, align);
        let total = stride * count as u64;

        // First fit in offset order. The free list is unordered, so the
        // search walks the entry chain from the head instead.
        let mut found = None;
        let mut cursor = Some(self.head);
        while let Some(candidate) = cursor {
            let entry = &self.entries[candidate];
            if entry.state == EntryState::Free {
                let aligned = align_up(entry.offset, align);
                let padding = aligned - entry.offset;
                if entry.size >= padding + total {
                    found = Some((candidate, padding));
                    break;
                }
            }
            cursor = entry.next;
        }
        let (mut idx, padding) = found?;
        self.remove_from_free(idx);

        if padding > 0 {
            // Alignment forced an offset shift: the skipped bytes become
            // their own free entry so the partition stays exact.
            let prev = self.entries[idx].prev;
            let pad = self.new_entry(PoolEntry {
                offset: self.entries[idx].offset,
                size: padding,
                state: EntryState::Free,
                prev,
                next: Some(idx),
            });
            match prev {
                Some(p) => self.entries[p].next = Some(pad),
                None => self.head = pad,
            }
            self.entries[idx].prev = Some(pad);
            self.entries[idx].offset += padding;
            self.entries[idx].size -= padding;
            self.free.push(pad);
        }

        let mut blocks = Vec::with_capacity(count);
        for i in 0..count {
            let offset = self.entries[idx].offset;
            let remain = self.entries[idx].size - stride;
            self.entries[idx].size = stride;
            self.entries[idx].state = EntryState::Used;
            self.used_bytes += stride;
            blocks.push((idx, offset));

            if i + 1 < count {
                idx = self.insert_after(idx, offset + stride, remain);
            } else if remain > 0 {
                let tail = self.insert_after(idx, offset + stride, remain);
                self.free.push(tail);
            }
        }
        Some(blocks)
    }

    /// Returns a used entry to the free list, merging with an adjacent
    /// free neighbor on either side in O(1). Returns `false` if the index
    /// does not name a live used entry.
    pub(crate) fn release(&mut self, index: usize) -> bool {
        if index >= self.entries.len() || self.entries[index].state != EntryState::Used {
            return false;
        }
        self.used_bytes -= self.entries[index].size;
        self.entries[index].state = EntryState::Free;

        let mut merged = index;
        let mut listed = false;
        if let Some(p) = self.entries[index].prev {
            if self.entries[p].state == EntryState::Free {
                self.entries[p].size += self.entries[index].size;
                let next = self.entries[index].next;
                self.entries[p].next = next;
                if let Some(n) = next {
                    self.entries[n].prev = Some(p);
                }
                self.kill(index);
                merged = p;
                listed = true;
            }
        }
        if !listed {
            self.free.push(merged);
        }
        if let Some(n) = self.entries[merged].next {
            if self.entries[n].state == EntryState::Free {
                self.entries[merged].size += self.entries[n].size;
                let after = self.entries[n].next;
                self.entries[merged].next = after;
                if let Some(a) = after {
                    self.entries[a].prev = Some(merged);
                }
                self.remove_from_free(n);
                self.kill(n);
            }
        }
        true
    }

    /// `(offset, size, used)` for every live entry in offset order.
    pub(crate) fn entries_in_order(&self) -> Vec<(u64, u64, bool)> {
        let mut out = Vec::new();
        let mut cursor = Some(self.head);
        while let Some(idx) = cursor {
            let entry = &self.entries[idx];
            out.push((entry.offset, entry.size, entry.state == EntryState::Used));
            cursor = entry.next;
        }
        out
    }

    fn insert_after(&mut self, idx: usize, offset: u64, size: u64) -> usize {
        let next = self.entries[idx].next;
        let fresh = self.new_entry(PoolEntry {
            offset,
            size,
            state: EntryState::Free,
            prev: Some(idx),
            next,
        });
        self.entries[idx].next = Some(fresh);
        if let Some(n) = next {
            self.entries[n].prev = Some(fresh);
        }
        fresh
    }

    fn new_entry(&mut self, entry: PoolEntry) -> usize {
        match self.recycled.pop() {
            Some(slot) => {
                self.entries[slot] = entry;
                slot
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        }
    }

    fn kill(&mut self, index: usize) {
        self.entries[index].state = EntryState::Dead;
        self.entries[index].prev = None;
        self.entries[index].next = None;
        self.recycled.push(index);
    }

    fn remove_from_free(&mut self, index: usize) {
        if let Some(pos) = self.free.iter().position(|&i| i == index) {
            self.free.swap_remove(pos);
        }
    }
}
