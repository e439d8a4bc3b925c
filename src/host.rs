//! Line-oriented terminal host.
//!
//! Stands in for a window: reads menu commands from stdin, answers file
//! dialogs with typed paths, shares cut/copied text through the system
//! clipboard and prints the tab bar, the gutter next to the visible lines,
//! and the status bar after every command.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use scribe_core::surface::TextSurface;
use scribe_core::{
    Clipboard, Command, CoreError, Dialogs, DocumentTabManager, EditorSurface, MemoryClipboard,
};

/// Makes `path` absolute, resolving symlinks and `..` when it exists and
/// `canonicalize` is set.
pub fn resolve_path(path: &Path, canonicalize: bool) -> PathBuf {
    if canonicalize {
        if let Ok(resolved) = std::fs::canonicalize(path) {
            return resolved;
        }
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// File dialogs answered on the terminal.
pub struct TerminalDialogs {
    canonicalize: bool,
}

impl TerminalDialogs {
    pub fn new(canonicalize: bool) -> Self {
        Self { canonicalize }
    }

    fn prompt(&self, label: &str) -> Option<PathBuf> {
        print!("{label} (empty to cancel): ");
        io::stdout().flush().ok()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(resolve_path(Path::new(line), self.canonicalize))
    }
}

impl Dialogs for TerminalDialogs {
    fn prompt_open_path(&mut self) -> Option<PathBuf> {
        self.prompt("Open file")
    }

    fn prompt_save_path(&mut self) -> Option<PathBuf> {
        self.prompt("Save as")
    }

    fn warn(&mut self, title: &str, message: &str) {
        eprintln!("[{title}] {message}");
    }
}

/// [`Clipboard`] backed by the desktop clipboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, arboard::Error> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        match self.inner.get_text() {
            Ok(text) => Some(text),
            Err(arboard::Error::ContentNotAvailable) => None,
            Err(err) => {
                tracing::warn!("Clipboard read failed: {}", err);
                None
            }
        }
    }

    fn set_text(&mut self, text: &str) {
        if let Err(err) = self.inner.set_text(text) {
            tracing::warn!("Clipboard write failed: {}", err);
        }
    }
}

/// The system clipboard, or a process-local one when there is no display.
pub fn open_clipboard() -> Box<dyn Clipboard> {
    match SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(err) => {
            tracing::warn!("System clipboard unavailable, using a local one: {}", err);
            Box::new(MemoryClipboard::default())
        }
    }
}

/// Renders the whole window as text.
pub fn render(manager: &DocumentTabManager<EditorSurface>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", manager.window_title());

    let bar: Vec<String> = manager
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            if i == manager.active_index() {
                format!("[{}]", tab.label())
            } else {
                format!(" {} ", tab.label())
            }
        })
        .collect();
    let _ = writeln!(out, "{}", bar.join("|"));

    let tab = manager.active_tab();
    let surface = tab.surface();
    let paint = tab.paint_gutter(surface.viewport_rect());
    let digits = scribe_core::gutter::digit_count(surface.block_count()) as usize;

    for (label, (_, text)) in paint.labels.iter().zip(surface.visible_lines()) {
        let marker = if label.emphasized { '>' } else { ' ' };
        let _ = writeln!(out, "{marker}{:>digits$} | {text}", label.number);
    }

    let _ = write!(
        out,
        "-- {} -- {}",
        manager.status_message(),
        manager.cursor_position_label()
    );
    out
}

/// Reads commands until `quit` or end of input.
pub fn run(
    manager: &mut DocumentTabManager<EditorSurface>,
    canonicalize: bool,
) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    println!("{}", render(manager));
    while !manager.should_quit() {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match line.trim_end_matches(['\r', '\n']).parse::<Command>() {
            Ok(Command::OpenFile { path: Some(path) }) => Command::OpenFile {
                path: Some(resolve_path(&path, canonicalize)),
            },
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match manager.execute(command) {
            // Already shown to the user through the dialogs.
            Err(CoreError::OpenFailed { .. } | CoreError::SaveFailed { .. }) => {}
            Err(err) => eprintln!("{err}"),
            Ok(()) => {}
        }
        manager.sync_active();
        println!("{}", render(manager));
    }

    if manager.has_unsaved_changes() {
        tracing::warn!("Quitting with unsaved changes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::{Config, FsIo};

    fn manager() -> DocumentTabManager<EditorSurface> {
        DocumentTabManager::with_config(
            &Config::default(),
            Box::new(FsIo),
            Box::new(TerminalDialogs::new(false)),
            Box::new(MemoryClipboard::default()),
        )
    }

    #[test]
    fn test_render_fresh_window() {
        let screen = render(&manager());
        let lines: Vec<&str> = screen.lines().collect();

        assert_eq!(lines[0], "== untitled-1 — Markdown Editor ==");
        assert_eq!(lines[1], "[untitled-1]");
        assert_eq!(lines[2], ">1 | ");
        assert_eq!(lines[3], "-- Ready -- Ln 1, Col 1");
    }

    #[test]
    fn test_render_marks_dirty_and_active_tabs() {
        let mut manager = manager();
        manager.new_document();
        manager.execute(Command::Insert("hi".into())).unwrap();
        manager.sync_active();

        let screen = render(&manager);
        assert!(screen.contains(" untitled-1 |[untitled-2*]"));
        assert!(screen.contains(">1 | hi"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let resolved = resolve_path(Path::new("notes/a.md"), false);
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("notes/a.md"));
    }

    #[test]
    fn test_resolve_canonicalizes_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        std::fs::write(&file, "").unwrap();

        let dotted = dir.path().join(".").join("a.md");
        assert_eq!(
            resolve_path(&dotted, true),
            std::fs::canonicalize(&file).unwrap()
        );
    }
}
