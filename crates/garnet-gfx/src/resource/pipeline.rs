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

//! Pipeline handles.

use garnet_core::raw::RawProgramId;
use garnet_core::vertex::VertexLayout;
use std::borrow::Cow;

/// A drawable program with its vertex input layout.
///
/// This is the handle applications bind; the matching native pipeline
/// state object also depends on topology, pass compatibility, and the
/// fixed-function state in effect, and is resolved lazily at draw time.
pub struct Pipeline {
    program: RawProgramId,
    vertex_layout: VertexLayout,
    label: Option<Cow<'static, str>>,
}

impl Pipeline {
    pub(crate) fn new(
        program: RawProgramId,
        vertex_layout: VertexLayout,
        label: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            program,
            vertex_layout,
            label,
        }
    }

    pub(crate) fn program(&self) -> RawProgramId {
        self.program
    }

    /// The vertex input layout the pipeline draws with.
    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.vertex_layout
    }

    /// The pipeline's debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn label_cow(&self) -> Option<Cow<'static, str>> {
        self.label.clone()
    }
}
