//! Synchronous IO engine
//!
//! Blocking `lseek` + `read`/`write` on a descriptor the engine owns. The file
//! offset is kernel state, so after every complete transfer the position has
//! moved by one block and a sequential worker never needs to seek again until
//! its cursor wraps.
//!
//! # Short transfers
//!
//! A transfer that returns fewer bytes than requested is continued from where
//! it stopped. A return of 0 means no further progress is possible (end of
//! file or device) and is reported as [`EngineError::Stalled`]; -1 is reported
//! as [`EngineError::Os`]. Interrupted calls (`EINTR`) are simply reissued.
//!
//! # Example
//!
//! ```no_run
//! use iostress::engine::IOEngine;
//! use iostress::engine::sync::SyncEngine;
//!
//! let file = std::fs::File::open("/dev/sdb").unwrap();
//! let mut engine = SyncEngine::new(file);
//! let mut buffer = vec![0u8; 4096];
//!
//! engine.seek(0).unwrap();
//! engine.read_all(&mut buffer).unwrap();
//! ```

use super::{EngineError, IOEngine, OperationType};
use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Synchronous IO engine over one owned descriptor
///
/// The descriptor is closed when the engine is dropped.
pub struct SyncEngine {
    file: File,
}

impl SyncEngine {
    /// Wrap an already opened target
    pub fn new(file: File) -> Self {
        Self { file }
    }

    #[inline(always)]
    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Classify a -1 return; `Ok(())` means the call should be retried
    #[inline]
    fn check_os_error(op: OperationType) -> Result<(), EngineError> {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(());
        }
        Err(EngineError::Os { op, source: err })
    }
}

impl IOEngine for SyncEngine {
    fn seek(&mut self, offset: u64) -> Result<(), EngineError> {
        let offset = libc::off_t::try_from(offset).map_err(|_| EngineError::Os {
            op: OperationType::Seek,
            source: io::Error::from_raw_os_error(libc::EOVERFLOW),
        })?;

        // SAFETY: lseek only needs a valid descriptor, which `self.file` owns
        let result = unsafe { libc::lseek(self.fd(), offset, libc::SEEK_SET) };

        if result < 0 {
            return Err(EngineError::Os {
                op: OperationType::Seek,
                source: io::Error::last_os_error(),
            });
        }

        Ok(())
    }

    #[inline(always)]
    fn read_all(&mut self, buffer: &mut [u8]) -> Result<(), EngineError> {
        let length = buffer.len();
        let mut total_read = 0;

        while total_read < length {
            let remaining = &mut buffer[total_read..];

            // SAFETY: the pointer and length describe the unfilled tail of
            // `buffer`, which stays borrowed for the duration of the call.
            let result = unsafe {
                libc::read(
                    self.fd(),
                    remaining.as_mut_ptr() as *mut libc::c_void,
                    remaining.len(),
                )
            };

            if result < 0 {
                Self::check_os_error(OperationType::Read)?;
                continue;
            }

            if result == 0 {
                return Err(EngineError::Stalled {
                    op: OperationType::Read,
                    expected: length,
                    transferred: total_read,
                });
            }

            total_read += result as usize;
        }

        Ok(())
    }

    #[inline(always)]
    fn write_all(&mut self, buffer: &[u8]) -> Result<(), EngineError> {
        let length = buffer.len();
        let mut total_written = 0;

        while total_written < length {
            let remaining = &buffer[total_written..];

            // SAFETY: the pointer and length describe the unwritten tail of
            // `buffer`, which stays borrowed for the duration of the call.
            let result = unsafe {
                libc::write(
                    self.fd(),
                    remaining.as_ptr() as *const libc::c_void,
                    remaining.len(),
                )
            };

            if result < 0 {
                Self::check_os_error(OperationType::Write)?;
                continue;
            }

            if result == 0 {
                return Err(EngineError::Stalled {
                    op: OperationType::Write,
                    expected: length,
                    transferred: total_written,
                });
            }

            total_written += result as usize;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    #[test]
    fn test_sync_engine_read() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test_read.dat");

        let test_data = b"Hello, iostress! This is a test file for synchronous reads.";
        std::fs::write(&file_path, test_data).unwrap();

        let mut engine = SyncEngine::new(File::open(&file_path).unwrap());
        let mut buffer = vec![0u8; test_data.len()];

        engine.seek(0).unwrap();
        engine.read_all(&mut buffer).unwrap();
        assert_eq!(&buffer[..], test_data);
    }

    #[test]
    fn test_sync_engine_read_advances_position() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test_offset.dat");
        std::fs::write(&file_path, b"0123456789ABCDEFGHIJ").unwrap();

        let mut engine = SyncEngine::new(File::open(&file_path).unwrap());
        let mut buffer = [0u8; 5];

        engine.seek(5).unwrap();
        engine.read_all(&mut buffer).unwrap();
        assert_eq!(&buffer, b"56789");

        // No seek: the next transfer continues where the last one ended
        engine.read_all(&mut buffer).unwrap();
        assert_eq!(&buffer, b"ABCDE");
    }

    #[test]
    fn test_sync_engine_write() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test_write.dat");
        std::fs::write(&file_path, vec![b'.'; 16]).unwrap();

        let file = OpenOptions::new().write(true).open(&file_path).unwrap();
        let mut engine = SyncEngine::new(file);

        engine.seek(4).unwrap();
        engine.write_all(b"abcd").unwrap();
        drop(engine);

        let written = std::fs::read(&file_path).unwrap();
        assert_eq!(&written[..], b"....abcd........");
    }

    #[test]
    fn test_sync_engine_read_past_end_stalls() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("short.dat");
        std::fs::write(&file_path, vec![0u8; 100]).unwrap();

        let mut engine = SyncEngine::new(File::open(&file_path).unwrap());
        let mut buffer = vec![0u8; 64];

        engine.seek(80).unwrap();
        match engine.read_all(&mut buffer) {
            Err(EngineError::Stalled {
                op,
                expected,
                transferred,
            }) => {
                assert_eq!(op, OperationType::Read);
                assert_eq!(expected, 64);
                assert_eq!(transferred, 20);
            }
            other => panic!("expected stalled read, got {:?}", other),
        }
    }

    #[test]
    fn test_sync_engine_write_on_read_only_fd_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("ro.dat");
        std::fs::write(&file_path, vec![0u8; 16]).unwrap();

        let mut engine = SyncEngine::new(File::open(&file_path).unwrap());
        let result = engine.write_all(&[1u8; 8]);
        assert!(matches!(
            result,
            Err(EngineError::Os {
                op: OperationType::Write,
                ..
            })
        ));
    }
}
