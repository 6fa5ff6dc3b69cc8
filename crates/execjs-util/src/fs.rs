use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, TempPath};

/// File name prefix for generated scripts.
pub const SCRIPT_PREFIX: &str = "execjs";

/// File extension for generated scripts.
pub const SCRIPT_SUFFIX: &str = ".js";

/// A generated script written to a temporary file.
///
/// The file handle is closed as soon as the contents are written so that an
/// external interpreter can open it on every platform. The file itself is
/// removed when the value is dropped.
#[derive(Debug)]
pub struct ScriptFile {
    path: TempPath,
}

impl ScriptFile {
    /// Write `contents` (UTF-8) to a fresh `execjs*.js` file.
    ///
    /// Uses `dir` when given, the OS temp directory otherwise.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn create(dir: Option<&Path>, contents: &str) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(SCRIPT_PREFIX).suffix(SCRIPT_SUFFIX);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Path of the script on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now, reporting failures.
    ///
    /// # Errors
    /// Returns an error if the file could not be deleted.
    pub fn close(self) -> io::Result<()> {
        self.path.close()
    }
}
