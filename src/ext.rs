//! Request and response extensions shared with neighboring middleware.

use std::path::{Path, PathBuf};

use http::Uri;

/// The request URI as originally received, before mount or prefix remapping
/// middleware rewrote it.
///
/// Remapping middleware inserts this into the request so that redirect
/// targets can be built from the path the client actually asked for. When
/// the extension is absent, the visible URI is taken to be the original.
#[derive(Clone, Debug)]
pub struct OriginalUri(pub Uri);

/// Records the on-disk file a static file service resolved a request to.
///
/// A file-serving stage inserts this into its response so that stages
/// further up can tell a directory-index resolution apart from a file that
/// was requested by name.
#[derive(Clone, Debug)]
pub struct ServedFile {
    path: PathBuf,
}

impl ServedFile {
    /// Records `path` as the file that was served.
    pub fn new(path: impl Into<PathBuf>) -> ServedFile {
        ServedFile { path: path.into() }
    }

    /// The resolved file's location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path segment, if the path is valid UTF-8.
    pub(crate) fn filename(&self) -> Option<&str> {
        self.path.to_str().map(crate::path::filename)
    }
}
