//! Raw volume descriptors and the loader that reads them from disk.
//!
//! A raw volume is a headerless file of `width * height * depth` unsigned
//! bytes, X varying fastest, then Y, then Z. Dimensions are never stored in
//! the file; the caller supplies them.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use glam::UVec3;

use crate::error::{RaymarchError, Result};

/// Dimensions of a single-byte scalar volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeDescriptor {
    width: u32,
    height: u32,
    depth: u32,
}

impl VolumeDescriptor {
    /// Bytes per voxel. The only supported format is 8-bit unsigned scalar.
    pub const BYTES_PER_VOXEL: u32 = 1;

    /// Creates a descriptor, rejecting zero dimensions and byte sizes that
    /// do not fit in memory.
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self> {
        let invalid = || RaymarchError::InvalidDimensions {
            width,
            height,
            depth,
        };
        if width == 0 || height == 0 || depth == 0 {
            return Err(invalid());
        }
        let bytes = u64::from(width) * u64::from(height) * u64::from(depth);
        if usize::try_from(bytes).is_err() {
            return Err(invalid());
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Width in voxels (X).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in voxels (Y).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in voxels (Z).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Dimensions as a vector.
    #[must_use]
    pub fn dimensions(&self) -> UVec3 {
        UVec3::new(self.width, self.height, self.depth)
    }

    /// Bytes between consecutive rows.
    #[must_use]
    pub fn row_pitch(&self) -> u32 {
        self.width * Self::BYTES_PER_VOXEL
    }

    /// Bytes between consecutive depth slices.
    #[must_use]
    pub fn slice_pitch(&self) -> u64 {
        u64::from(self.row_pitch()) * u64::from(self.height)
    }

    /// Number of bytes the volume occupies.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.slice_pitch() * u64::from(self.depth)
    }
}

/// A validated voxel buffer, ready to be moved into the upload step.
#[derive(Debug, PartialEq, Eq)]
pub struct VolumeData {
    descriptor: VolumeDescriptor,
    bytes: Vec<u8>,
}

impl VolumeData {
    /// Wraps a buffer of exactly `descriptor.byte_size()` bytes.
    pub fn new(descriptor: VolumeDescriptor, bytes: Vec<u8>) -> Result<Self> {
        let expected = descriptor.byte_size();
        let actual = bytes.len() as u64;
        if actual < expected {
            return Err(RaymarchError::VolumeTooSmall { expected, actual });
        }
        let mut bytes = bytes;
        // expected fits in usize, checked by the descriptor
        #[allow(clippy::cast_possible_truncation)]
        bytes.truncate(expected as usize);
        Ok(Self { descriptor, bytes })
    }

    /// The volume's dimensions.
    #[must_use]
    pub fn descriptor(&self) -> VolumeDescriptor {
        self.descriptor
    }

    /// The voxel bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the volume and returns the voxel bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads raw volumes, checking their size against the declared dimensions.
pub struct VolumeLoader;

impl VolumeLoader {
    /// Loads a raw volume file.
    ///
    /// Fails if the file cannot be opened or holds fewer bytes than the
    /// descriptor needs. Larger files load with a warning; only the leading
    /// `descriptor.byte_size()` bytes are read.
    pub fn load_file(path: &Path, descriptor: VolumeDescriptor) -> Result<VolumeData> {
        let read_error = |source| RaymarchError::VolumeRead {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(read_error)?;
        let available = file.metadata().map_err(read_error)?.len();
        log::info!("opened raw volume '{}' ({available} bytes)", path.display());

        let data = Self::load_reader(file, available, descriptor).map_err(|err| match err {
            RaymarchError::IoError(source) => read_error(source),
            other => other,
        })?;

        log::info!(
            "read raw volume '{}' ({}x{}x{})",
            path.display(),
            descriptor.width(),
            descriptor.height(),
            descriptor.depth()
        );
        Ok(data)
    }

    /// Loads a raw volume from any reader holding `available` bytes.
    pub fn load_reader(
        reader: impl Read,
        available: u64,
        descriptor: VolumeDescriptor,
    ) -> Result<VolumeData> {
        let expected = descriptor.byte_size();
        if available < expected {
            return Err(RaymarchError::VolumeTooSmall {
                expected,
                actual: available,
            });
        }
        if available > expected {
            log::warn!(
                "raw volume is larger than expected ({available} > {expected} bytes); \
                 check the dimensions and voxel format, trailing bytes are ignored"
            );
        }

        #[allow(clippy::cast_possible_truncation)]
        let mut bytes = vec![0u8; expected as usize];
        reader.take(expected).read_exact(&mut bytes)?;
        VolumeData::new(descriptor, bytes)
    }
}
