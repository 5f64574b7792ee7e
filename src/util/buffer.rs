//! Memory-aligned IO buffer
//!
//! O_DIRECT requires the user buffer address to be aligned, so each worker
//! allocates exactly one [`AlignedBuffer`] at start and reuses it for every
//! transfer. The contents are never inspected.

use crate::config::DIRECT_IO_ALIGNMENT;
use crate::error::BenchError;
use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};

/// Memory-aligned buffer suitable for O_DIRECT operations
pub struct AlignedBuffer {
    ptr: *mut u8,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate a zeroed buffer of `size` bytes aligned to `alignment`
    ///
    /// `alignment` must be a power of two and `size` non-zero.
    pub fn new(size: usize, alignment: usize) -> Result<Self, BenchError> {
        if size == 0 {
            return Err(BenchError::InvalidConfig(
                "buffer size must be greater than 0".to_string(),
            ));
        }

        let layout = Layout::from_size_align(size, alignment).map_err(|e| {
            BenchError::InvalidConfig(format!(
                "cannot allocate {} bytes aligned to {}: {}",
                size, alignment, e
            ))
        })?;

        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            handle_alloc_error(layout);
        }

        Ok(AlignedBuffer { ptr, layout })
    }

    /// Buffer for one block of `block_size` bytes
    ///
    /// Aligned to the block size when it is a power of two, otherwise to the
    /// direct IO sector size.
    pub fn for_block(block_size: u64) -> Result<Self, BenchError> {
        let size = usize::try_from(block_size).map_err(|_| {
            BenchError::InvalidConfig(format!("block size {} does not fit in memory", block_size))
        })?;

        let alignment = if size.is_power_of_two() {
            size
        } else {
            DIRECT_IO_ALIGNMENT as usize
        };

        Self::new(size, alignment)
    }

    /// Get the buffer as a slice
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid and initialised for layout.size() bytes
        unsafe { std::slice::from_raw_parts(self.ptr, self.layout.size()) }
    }

    /// Get the buffer as a mutable slice
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid and initialised for layout.size() bytes
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.layout.size()) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with exactly this layout
        unsafe { dealloc(self.ptr, self.layout) };
    }
}

// SAFETY: the buffer exclusively owns its allocation
unsafe impl Send for AlignedBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_buffer_creation() {
        let buffer = AlignedBuffer::new(4096, 512).unwrap();
        assert_eq!(buffer.layout.size(), 4096);
        assert_eq!(buffer.layout.align(), 512);
        assert_eq!(buffer.as_slice().as_ptr() as usize % buffer.layout.align(), 0);
        assert!(buffer.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_for_block_power_of_two() {
        let buffer = AlignedBuffer::for_block(65536).unwrap();
        assert_eq!(buffer.layout.align(), 65536);
        assert_eq!(buffer.as_slice().as_ptr() as usize % buffer.layout.align(), 0);
    }

    #[test]
    fn test_for_block_odd_size() {
        let buffer = AlignedBuffer::for_block(1536).unwrap();
        assert_eq!(buffer.layout.size(), 1536);
        assert_eq!(buffer.layout.align(), 512);
        assert_eq!(buffer.as_slice().as_ptr() as usize % buffer.layout.align(), 0);

        // Not even a sector multiple: still sector aligned
        let buffer = AlignedBuffer::for_block(1000).unwrap();
        assert_eq!(buffer.layout.align(), 512);
    }

    #[test]
    fn test_invalid_alignment() {
        assert!(AlignedBuffer::new(4096, 3).is_err());
        assert!(AlignedBuffer::new(0, 512).is_err());
    }

    #[test]
    fn test_mut_slice_writes() {
        let mut buffer = AlignedBuffer::new(1024, 512).unwrap();
        buffer.as_mut_slice()[1023] = 0xAB;
        assert_eq!(buffer.as_slice()[1023], 0xAB);
    }
}
