//! Block device size detection
//!
//! Raw block devices report a zero length through `stat`, so their addressable
//! size has to be asked from the kernel with `ioctl(BLKGETSIZE64)`.

use std::fs::File;
use std::os::unix::io::AsRawFd;

// ioctl request code for getting block device size
const BLKGETSIZE64: libc::c_ulong = 0x80081272;

/// Size of an open block device in bytes
pub fn device_size(device: &File) -> std::io::Result<u64> {
    let mut size: u64 = 0;

    // SAFETY: the descriptor is valid for the lifetime of `device` and the
    // kernel writes exactly one u64 through the pointer.
    let result = unsafe { libc::ioctl(device.as_raw_fd(), BLKGETSIZE64, &mut size) };

    if result < 0 {
        return Err(std::io::Error::last_os_error());
    }

    Ok(size)
}
