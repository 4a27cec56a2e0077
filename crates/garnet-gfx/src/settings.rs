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

//! Session configuration.

use garnet_core::MAX_FRAMES_IN_FLIGHT;

/// What the session does when an internal operation fails at the public
/// frame-driving boundary.
///
/// There is no recovery path for a lost device or exhausted device memory
/// at this layer, so the shipped configuration terminates. Test suites
/// select [`FaultPolicy::Propagate`] to observe the error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Log the failure and panic. The default.
    #[default]
    Abort,
    /// Return the error to the caller.
    Propagate,
}

/// Tunables of a graphics session.
#[derive(Debug, Clone)]
pub struct GfxSettings {
    /// Minimum size of a device memory pool in bytes. Requests larger
    /// than this get a dedicated pool of the request size.
    pub pool_min_size: u64,
    /// How many submitted frames may be outstanding before frame
    /// submission blocks on the oldest fence.
    pub frames_in_flight: usize,
    /// How long a fence wait may block before it is treated as a lost
    /// device, in milliseconds.
    pub fence_timeout_ms: u64,
    /// Failure behavior at the public boundary.
    pub fault_policy: FaultPolicy,
}

impl Default for GfxSettings {
    fn default() -> Self {
        Self {
            pool_min_size: 16 * 1024 * 1024,
            frames_in_flight: MAX_FRAMES_IN_FLIGHT,
            fence_timeout_ms: 5_000,
            fault_policy: FaultPolicy::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = GfxSettings::default();
        assert_eq!(settings.frames_in_flight, MAX_FRAMES_IN_FLIGHT);
        assert_eq!(settings.fault_policy, FaultPolicy::Abort);
        assert!(settings.pool_min_size >= 1024 * 1024);
    }
}
