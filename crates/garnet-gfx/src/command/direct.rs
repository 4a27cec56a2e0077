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

//! The direct command list backend.
//!
//! Commands are written straight into a native secondary command buffer.
//! The buffer is only acquired and opened on the first command actually
//! issued, so a list that records nothing never touches the raw layer.

use crate::command::buffered::{record_one, RecordedCommand};
use crate::command::pool::{CommandPool, TransientBuffer};
use garnet_core::error::GfxError;
use garnet_core::raw::RawDevice;

#[derive(Default)]
pub(crate) struct DirectRecorder {
    transient: Option<TransientBuffer>,
}

impl DirectRecorder {
    pub(crate) fn record(
        &mut self,
        pool: &CommandPool,
        device: &dyn RawDevice,
        command: &RecordedCommand,
    ) -> Result<(), GfxError> {
        if self.transient.is_none() {
            let mut transient = pool.allocate_transient()?;
            pool.begin(&mut transient)?;
            self.transient = Some(transient);
        }
        if let Some(transient) = &self.transient {
            record_one(device, transient.id(), command);
        }
        Ok(())
    }

    /// Takes the underlying transient buffer, if one was ever opened.
    pub(crate) fn take(&mut self) -> Option<TransientBuffer> {
        self.transient.take()
    }
}
