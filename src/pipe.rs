//! Named-pipe provisioning for streaming outputs to a caller without an
//! intermediate regular file.

#![cfg(unix)]

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Create a FIFO at `path` with mode 0o774 (owner rwx, group rwx,
/// other r). Fails with the underlying OS error if the node cannot be
/// created (including when it already exists).
pub fn create_pipe(path: &Path) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))?;
    let mode = libc::S_IRWXU | libc::S_IRWXG | libc::S_IROTH;
    if unsafe { libc::mkfifo(c_path.as_ptr(), mode) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::FileTypeExt;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn creates_fifo_with_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.pipe");
        create_pipe(&path).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.file_type().is_fifo());
        // umask may clear group/other bits; owner rwx must survive
        assert_eq!(meta.permissions().mode() & 0o700, 0o700);
    }

    #[test]
    fn existing_node_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.pipe");
        create_pipe(&path).unwrap();
        let err = create_pipe(&path).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EEXIST));
    }
}
