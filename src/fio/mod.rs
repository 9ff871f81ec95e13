pub mod flock;

use std::{fs::OpenOptions, fs::File, io, path::Path};

/// Opens `path` for reading and writing, creating it with `mode` if absent.
pub fn open_with_mode<P>(path: P, mode: u32) -> io::Result<File>
where
  P: AsRef<Path>,
{
  let mut opts = OpenOptions::new();
  opts.create(true).read(true).write(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    opts.mode(mode);
  }
  #[cfg(not(unix))]
  let _ = mode;
  opts.open(path)
}

/// Sets the permission bits of an existing file. No-op off Unix.
pub fn set_mode<P>(path: P, mode: u32) -> io::Result<()>
where
  P: AsRef<Path>,
{
  #[cfg(unix)]
  {
    use std::{fs, os::unix::fs::PermissionsExt};
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
  }
  #[cfg(not(unix))]
  {
    let _ = (path, mode);
    Ok(())
  }
}
