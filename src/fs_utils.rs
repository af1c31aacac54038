//! Capability-scoped filesystem helpers shared by the filesystem adapters.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use std::sync::Arc;

/// Capability root shared with blocking tasks.
pub(crate) type SharedDir = Arc<Dir>;

/// Runs blocking filesystem work off the async executor.
///
/// A panicked or cancelled worker is reported through `join_error`.
pub(crate) async fn run_blocking<T, E, F>(
    work: F,
    join_error: impl FnOnce(io::Error) -> E,
) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(err) => Err(join_error(io::Error::other(err.to_string()))),
    }
}

/// Opens `path` as a capability root, creating it and its parents first.
pub(crate) fn open_or_create_dir(path: &Utf8Path) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(path, ambient_authority())?;
    Dir::open_ambient_dir(path, ambient_authority())
}

/// Opens `path` below `root`, creating missing directories.
pub(crate) fn open_or_create_subdir(root: &Dir, path: &str) -> io::Result<Dir> {
    root.create_dir_all(path)?;
    root.open_dir(path)
}

/// Opens `path` below `root`, returning `None` when it does not exist.
pub(crate) fn open_existing_subdir(root: &Dir, path: &str) -> io::Result<Option<Dir>> {
    match root.open_dir(path) {
        Ok(dir) => Ok(Some(dir)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Removes a directory tree, treating a missing directory as removed.
pub(crate) fn remove_dir_all_if_exists(root: &Dir, path: &str) -> io::Result<()> {
    match root.remove_dir_all(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Removes a file, treating a missing file as removed.
pub(crate) fn remove_file_if_exists(root: &Dir, path: &str) -> io::Result<()> {
    match root.remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Reads a file, returning `None` when it does not exist.
pub(crate) fn read_if_exists(root: &Dir, path: &str) -> io::Result<Option<Vec<u8>>> {
    match root.read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Sorted `(name, is_dir)` listing of a directory's entries.
pub(crate) fn sorted_entries(dir: &Dir) -> io::Result<Vec<(String, bool)>> {
    let mut listing = Vec::new();
    for entry_result in dir.entries()? {
        let entry = entry_result?;
        listing.push((entry.file_name()?, entry.file_type()?.is_dir()));
    }
    listing.sort();
    Ok(listing)
}
