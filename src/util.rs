//! Internal file helpers.

use std::io;
use std::path::Path;

/// Creates the parent directory of `path`, including intermediates.
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Copies `src` to `dst` by reading and rewriting, so the destination gets
/// fresh permissions instead of inheriting the origin's.
pub(crate) fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    let bytes = std::fs::read(src)?;
    std::fs::write(dst, bytes)
}

/// Creates `path` as an empty file, truncating any prior content.
pub(crate) fn touch(path: &Path) -> io::Result<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, b"")
}
