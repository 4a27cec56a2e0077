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

//! Command recording: pooled native buffers, dirty-state tracking, and
//! the hierarchical command list.

mod buffered;
mod direct;
mod list;
pub(crate) mod pool;
mod state;

pub use list::{CommandList, ListKind};
pub use state::StateFlags;

pub(crate) use list::PassContext;
