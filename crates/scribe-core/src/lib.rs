//! # Scribe Core
//!
//! Tabbed document management for a plain-text editor.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   DocumentTabManager                      │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────────────────┐  │
//! │  │  FileIo    │ │  Dialogs   │ │  EventBus / Chrome   │  │
//! │  └────────────┘ └────────────┘ └──────────────────────┘  │
//! │         │                                                 │
//! │  ┌──────┴──────────────────────────────────────────┐     │
//! │  │                 DocumentTab (ordered)            │     │
//! │  │  ┌───────────────┐        ┌──────────────────┐   │     │
//! │  │  │  TextSurface  │ ─────▶ │ GutterController │   │     │
//! │  │  └───────────────┘ events └──────────────────┘   │     │
//! │  └─────────────────────────────────────────────────┘     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Surfaces queue layout notifications; the manager forwards them to the
//! tab's gutter on `sync_active`/`sync_tab`. Nothing here draws: painting
//! produces plain data ([`GutterPaint`]) for the host to render.

pub mod command;
pub mod config;
pub mod event;
pub mod geometry;
pub mod gutter;
pub mod io;
pub mod surface;
pub mod tabs;

use std::path::PathBuf;

pub use command::{Command, CommandParseError};
pub use config::{Config, ConfigError};
pub use event::{EditorEvent, EventBus};
pub use geometry::{Color, Rect};
pub use gutter::{GutterController, GutterPaint, GutterUpdate, LineNumberLabel};
pub use io::{Clipboard, Dialogs, FileIo, FsIo, MemoryClipboard};
pub use surface::{CaretMove, EditorSurface, SurfaceEvent, TextSurface};
pub use tabs::{DocumentTab, DocumentTabManager, EditAction, OpenOutcome, SaveOutcome, TabId};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Cannot open file: {}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot save file: {}", path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No tab at index {0}")]
    TabOutOfRange(usize),

    #[error("Buffer error: {0}")]
    Buffer(#[from] scribe_buffer::BufferError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_failures_name_the_path() {
        let err = CoreError::OpenFailed {
            path: PathBuf::from("/notes/a.md"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "Cannot open file: /notes/a.md");

        let err = CoreError::SaveFailed {
            path: PathBuf::from("/notes/a.md"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.to_string(), "Cannot save file: /notes/a.md");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_buffer_errors_convert() {
        let err: CoreError = scribe_buffer::BufferError::NothingToUndo.into();
        assert!(matches!(
            err,
            CoreError::Buffer(scribe_buffer::BufferError::NothingToUndo)
        ));
    }
}
