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

//! Compatibility-keyed caches for render passes, framebuffers, and
//! pipeline state objects.

mod framebuffer;
mod pipeline;
mod render_pass;

pub use render_pass::PassCompatKey;

pub(crate) use framebuffer::FramebufferCache;
pub(crate) use pipeline::PipelineCache;
pub(crate) use render_pass::RenderPassCache;
