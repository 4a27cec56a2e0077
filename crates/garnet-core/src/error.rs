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

//! The hierarchy of error types for the GPU layer.
//!
//! Internal code propagates these with `Result`; the session's fault
//! policy decides at the public frame-driving boundary whether a failure
//! terminates (the shipped behavior) or is returned to the caller (the
//! behavior test suites select).

use crate::format::TextureFormat;
use crate::memory::MemoryPropertyFlags;
use std::fmt;

/// An error raised by the device memory allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// No memory type on the device satisfies the requested properties.
    NoCompatibleMemoryType {
        /// The property flags that could not be satisfied.
        properties: MemoryPropertyFlags,
    },
    /// The device refused a pool allocation of the given size.
    OutOfDeviceMemory {
        /// The size of the failed pool allocation in bytes.
        requested: u64,
    },
    /// A block was released that the allocator does not own, or was
    /// released twice.
    InvalidFree,
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::NoCompatibleMemoryType { properties } => {
                write!(f, "no memory type satisfies properties {properties:?}")
            }
            AllocationError::OutOfDeviceMemory { requested } => {
                write!(f, "device out of memory allocating {requested} bytes")
            }
            AllocationError::InvalidFree => {
                write!(f, "released a memory block the allocator does not own")
            }
        }
    }
}

impl std::error::Error for AllocationError {}

/// An error raised by the device itself. All variants are terminal for
/// the current GPU context; there is no recovery path at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device was lost (driver reset, hang, removal).
    Lost,
    /// A fence wait exceeded its timeout; treated as a lost device.
    FenceTimeout {
        /// How long the wait lasted before giving up, in milliseconds.
        waited_ms: u64,
    },
    /// The device cannot use the given format for the attempted purpose.
    UnsupportedFormat(TextureFormat),
    /// A backend-specific failure, carried as text.
    Backend(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Lost => write!(f, "the graphics device was lost"),
            DeviceError::FenceTimeout { waited_ms } => {
                write!(f, "fence wait timed out after {waited_ms} ms")
            }
            DeviceError::UnsupportedFormat(format) => {
                write!(f, "unsupported format: {format:?}")
            }
            DeviceError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// The umbrella error for the GPU layer's fallible operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfxError {
    /// A memory allocation failed.
    Allocation(AllocationError),
    /// The device failed.
    Device(DeviceError),
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::Allocation(err) => write!(f, "allocation failed: {err}"),
            GfxError::Device(err) => write!(f, "device failure: {err}"),
        }
    }
}

impl std::error::Error for GfxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GfxError::Allocation(err) => Some(err),
            GfxError::Device(err) => Some(err),
        }
    }
}

impl From<AllocationError> for GfxError {
    fn from(err: AllocationError) -> Self {
        GfxError::Allocation(err)
    }
}

impl From<DeviceError> for GfxError {
    fn from(err: DeviceError) -> Self {
        GfxError::Device(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn allocation_error_display() {
        let err = AllocationError::OutOfDeviceMemory { requested: 4096 };
        assert_eq!(format!("{err}"), "device out of memory allocating 4096 bytes");
    }

    #[test]
    fn device_error_display() {
        let err = DeviceError::FenceTimeout { waited_ms: 1000 };
        assert_eq!(format!("{err}"), "fence wait timed out after 1000 ms");
    }

    #[test]
    fn gfx_error_wraps_with_source() {
        let err: GfxError = AllocationError::InvalidFree.into();
        assert_eq!(
            format!("{err}"),
            "allocation failed: released a memory block the allocator does not own"
        );
        assert!(err.source().is_some());

        let err: GfxError = DeviceError::Lost.into();
        assert_eq!(format!("{err}"), "device failure: the graphics device was lost");
        assert!(err.source().is_some());
    }
}
