//! Benchmark target access
//!
//! A target is a regular file or a raw block device. Every worker opens its own
//! descriptor through [`open_target`], so workers never share a kernel file
//! offset. [`target_size`] reports the addressable size used when resolving the
//! block window.

pub mod block;

use crate::config::workload::IoMode;
use crate::error::BenchError;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::Path;

/// Open flags derived from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub direct: bool,
}

impl OpenFlags {
    /// Access mode needed for `mode`
    ///
    /// Mixed workloads need both directions on the same descriptor.
    pub fn for_mode(mode: IoMode, direct: bool) -> Self {
        Self {
            read: mode.may_read(),
            write: mode.may_write(),
            direct,
        }
    }
}

/// Open the target for one worker
///
/// The target must already exist; the benchmark never creates or truncates it.
pub fn open_target(path: &Path, flags: OpenFlags) -> Result<File, BenchError> {
    let mut options = OpenOptions::new();
    options.read(flags.read).write(flags.write);

    if flags.direct {
        options.custom_flags(libc::O_DIRECT);
    }

    options.open(path).map_err(|source| BenchError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Addressable size of the target in bytes
///
/// Regular files report their length; block devices are queried via ioctl.
pub fn target_size(path: &Path) -> Result<u64, BenchError> {
    let open_err = |source| BenchError::Open {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(open_err)?;

    if metadata.file_type().is_block_device() {
        let device = File::open(path).map_err(open_err)?;
        return block::device_size(&device).map_err(open_err);
    }

    Ok(metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_flags_for_mode() {
        let read = OpenFlags::for_mode(IoMode::Read, false);
        assert!(read.read && !read.write);

        let write = OpenFlags::for_mode(IoMode::Write, true);
        assert!(!write.read && write.write && write.direct);

        let mixed = OpenFlags::for_mode(IoMode::mixed(0.5), false);
        assert!(mixed.read && mixed.write);
    }

    #[test]
    fn test_target_size_regular_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 12288]).unwrap();
        file.flush().unwrap();

        assert_eq!(target_size(file.path()).unwrap(), 12288);
    }

    #[test]
    fn test_target_size_missing() {
        let result = target_size(Path::new("/nonexistent/iostress/target"));
        assert!(matches!(result, Err(BenchError::Open { .. })));
    }

    #[test]
    fn test_open_target_missing_is_error() {
        let flags = OpenFlags::for_mode(IoMode::Read, false);
        let result = open_target(Path::new("/nonexistent/iostress/target"), flags);
        assert!(matches!(result, Err(BenchError::Open { .. })));
    }

    #[test]
    fn test_open_target_does_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.dat");
        let flags = OpenFlags::for_mode(IoMode::Write, false);
        assert!(open_target(&path, flags).is_err());
        assert!(!path.exists());
    }
}
