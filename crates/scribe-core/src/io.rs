//! External collaborators: file I/O, user dialogs and the clipboard.
//!
//! The tab manager never touches the filesystem, the user or the system
//! clipboard directly. It reads and writes through [`FileIo`], asks for
//! paths or shows notices through [`Dialogs`] and moves cut/copied text
//! through [`Clipboard`], so hosts and tests can swap any side.

use std::io;
use std::path::{Path, PathBuf};

/// Whole-file reads and writes.
pub trait FileIo {
    /// Reads the full contents of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the contents of `path` with `bytes`.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Path prompts and blocking notices.
///
/// `None` from a prompt means the user dismissed it.
pub trait Dialogs {
    fn prompt_open_path(&mut self) -> Option<PathBuf>;

    fn prompt_save_path(&mut self) -> Option<PathBuf>;

    /// Shows a notice the user has to acknowledge.
    fn warn(&mut self, title: &str, message: &str);
}

/// Text clipboard used by cut, copy and paste.
pub trait Clipboard {
    /// Current clipboard text, if any.
    fn get_text(&mut self) -> Option<String>;

    fn set_text(&mut self, text: &str);
}

/// [`Clipboard`] that lives only as long as the process.
///
/// For hosts without access to a system clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }
}

/// [`FileIo`] on the local filesystem.
///
/// Writes land in a temporary file next to the real target first and are
/// renamed into place, so a failed write never truncates the target. A
/// symlinked path is written through to the file it points at, and an
/// existing file keeps its permissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIo;

impl FsIo {
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".scribe-tmp");
        path.with_file_name(name)
    }
}

impl FileIo for FsIo {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if path.file_name().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file path: {}", path.display()),
            ));
        }

        // Follow symlinks so the link survives and its target gets the bytes.
        let target = if path.exists() {
            std::fs::canonicalize(path)?
        } else {
            path.to_path_buf()
        };
        let permissions = std::fs::metadata(&target).ok().map(|m| m.permissions());

        let temp = Self::temp_path(&target);
        std::fs::write(&temp, bytes)?;

        let result = match permissions {
            Some(permissions) => std::fs::set_permissions(&temp, permissions),
            None => Ok(()),
        }
        .and_then(|()| std::fs::rename(&temp, &target));

        if result.is_err() {
            let _ = std::fs::remove_file(&temp);
        }
        result
    }
}
