//! Document tab management.
//!
//! [`DocumentTabManager`] is the single source of truth for which documents
//! are open, in which order, under which titles and paths, and which one is
//! active. Each [`DocumentTab`] owns its surface and the surface's gutter;
//! dropping the tab destroys both.
//!
//! Invariants kept by every public operation:
//! - there is always at least one tab;
//! - no two tabs are bound to the same path;
//! - a tab's path and title only change after a write to the new path
//!   succeeded.

use std::io;
use std::path::{Path, PathBuf};

use scribe_buffer::BufferError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::Command;
use crate::config::{Config, GutterConfig};
use crate::event::{EditorEvent, EventBus};
use crate::geometry::Rect;
use crate::gutter::{GutterController, GutterPaint, GutterUpdate};
use crate::io::{Clipboard, Dialogs, FileIo};
use crate::surface::{EditorSurface, SurfaceEvent, TextSurface};
use crate::{CoreError, CoreResult};

/// Stable identity of a tab, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open document: title, optional path, and the owned surface.
pub struct DocumentTab<S> {
    id: TabId,
    title: String,
    path: Option<PathBuf>,
    surface: S,
    gutter: GutterController,
    /// Gutter updates from attaching, handed out by the first sync.
    pending: Vec<GutterUpdate>,
}

impl<S: TextSurface> DocumentTab<S> {
    fn new(title: String, path: Option<PathBuf>, mut surface: S, gutter_config: GutterConfig) -> Self {
        let mut gutter = GutterController::new(gutter_config);
        let pending = gutter.attach(&mut surface);
        // Loading content queued layout noise; attach already sized everything.
        surface.drain_events();

        Self {
            id: TabId::new(),
            title,
            path,
            surface,
            gutter,
            pending,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    /// Tab text: the file name, or `untitled-N` for unsaved buffers.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Tooltip text: the full path, empty for unsaved buffers.
    pub fn tooltip(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// Title with a trailing `*` while there are unsaved edits.
    pub fn label(&self) -> String {
        if self.surface.is_modified() {
            format!("{}*", self.title)
        } else {
            self.title.clone()
        }
    }

    pub fn is_modified(&self) -> bool {
        self.surface.is_modified()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn gutter(&self) -> &GutterController {
        &self.gutter
    }

    /// Paints the gutter rows intersecting `region`.
    pub fn paint_gutter(&self, region: Rect) -> GutterPaint {
        self.gutter.paint(&self.surface, region)
    }

    /// Forwards queued surface notifications to the gutter.
    ///
    /// Returns the gutter updates and whether the caret moved.
    fn sync(&mut self) -> (Vec<GutterUpdate>, bool) {
        let mut caret_moved = false;
        let mut updates = std::mem::take(&mut self.pending);
        for event in self.surface.drain_events() {
            caret_moved |= event == SurfaceEvent::CursorPositionChanged;
            updates.extend(self.gutter.handle(&mut self.surface, event));
        }
        (updates, caret_moved)
    }
}

/// Result of an open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new tab was created at this index
    Opened(usize),
    /// The path was already open; that tab was activated
    AlreadyOpen(usize),
    /// The user dismissed the dialog
    Cancelled,
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The user dismissed the dialog
    Cancelled,
}

/// Edit and view menu actions on the active surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    ZoomIn,
    ZoomOut,
}

/// Window title, status message and caret indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowChrome {
    pub title: String,
    pub status: String,
    pub cursor_position: String,
}

/// Owns the ordered tab set and everything that changes it.
pub struct DocumentTabManager<S: TextSurface> {
    tabs: Vec<DocumentTab<S>>,
    active: usize,
    untitled_counter: u64,
    make_surface: Box<dyn Fn() -> S>,
    io: Box<dyn FileIo>,
    dialogs: Box<dyn Dialogs>,
    gutter_config: GutterConfig,
    app_name: String,
    chrome: WindowChrome,
    clipboard: Box<dyn Clipboard>,
    events: EventBus,
    should_quit: bool,
}

impl DocumentTabManager<EditorSurface> {
    /// Creates a manager producing [`EditorSurface`]s.
    pub fn with_config(
        config: &Config,
        io: Box<dyn FileIo>,
        dialogs: Box<dyn Dialogs>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let editor = config.editor.clone();
        Self::new(move || EditorSurface::new(&editor), config, io, dialogs, clipboard)
    }
}

impl<S: TextSurface> DocumentTabManager<S> {
    /// Creates a manager holding one empty `untitled-1` tab.
    pub fn new(
        make_surface: impl Fn() -> S + 'static,
        config: &Config,
        io: Box<dyn FileIo>,
        dialogs: Box<dyn Dialogs>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let mut manager = Self {
            tabs: Vec::new(),
            active: 0,
            untitled_counter: 0,
            make_surface: Box::new(make_surface),
            io,
            dialogs,
            gutter_config: config.gutter.clone(),
            app_name: config.window.app_name.clone(),
            chrome: WindowChrome::default(),
            clipboard,
            events: EventBus::new(),
            should_quit: false,
        };
        manager.new_document();
        manager.chrome.status = "Ready".to_string();
        manager
    }

    // ==================== Queries ====================

    pub fn tabs(&self) -> &[DocumentTab<S>] {
        &self.tabs
    }

    pub fn tab(&self, index: usize) -> Option<&DocumentTab<S>> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut DocumentTab<S>> {
        self.tabs.get_mut(index)
    }

    /// Number of open tabs. Never zero.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> &DocumentTab<S> {
        &self.tabs[self.active]
    }

    pub fn active_tab_mut(&mut self) -> &mut DocumentTab<S> {
        &mut self.tabs[self.active]
    }

    /// Number of "new file" actions so far.
    pub fn untitled_counter(&self) -> u64 {
        self.untitled_counter
    }

    /// Finds the tab bound to exactly `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.path() == Some(path))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tabs.iter().any(|tab| tab.is_modified())
    }

    pub fn chrome(&self) -> &WindowChrome {
        &self.chrome
    }

    pub fn window_title(&self) -> &str {
        &self.chrome.title
    }

    pub fn status_message(&self) -> &str {
        &self.chrome.status
    }

    /// `Ln <line>, Col <col>` for the active caret, 1-based.
    pub fn cursor_position_label(&self) -> &str {
        &self.chrome.cursor_position
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    // ==================== File Operations ====================

    /// Creates an empty `untitled-N` tab after the active one and activates
    /// it. Returns its index.
    pub fn new_document(&mut self) -> usize {
        self.untitled_counter += 1;
        let title = format!("untitled-{}", self.untitled_counter);
        let surface = (self.make_surface)();
        let index = self.insert_tab(title, None, surface);
        self.chrome.status = "New file created".to_string();
        index
    }

    /// Opens `path` in a new tab, or activates the tab already bound to it.
    ///
    /// Paths are compared exactly; resolve them first if different
    /// spellings of one file should match. On a read failure the user is
    /// warned and no tab is created.
    pub fn open_document(&mut self, path: impl AsRef<Path>) -> CoreResult<OpenOutcome> {
        let path = path.as_ref();

        if let Some(index) = self.find_by_path(path) {
            tracing::debug!("{} already open in tab {}", path.display(), index);
            self.set_active(index);
            return Ok(OpenOutcome::AlreadyOpen(index));
        }

        let text = match self.io.read(path).and_then(decode_text) {
            Ok(text) => text,
            Err(source) => {
                return Err(self.report(CoreError::OpenFailed {
                    path: path.to_path_buf(),
                    source,
                }));
            }
        };

        let mut surface = (self.make_surface)();
        surface.set_text(&text);
        let index = self.insert_tab(file_title(path), Some(path.to_path_buf()), surface);

        tracing::info!("Opened {}", path.display());
        self.chrome.status = format!("Opened: {}", path.display());
        Ok(OpenOutcome::Opened(index))
    }

    /// Asks the user for a file and opens it.
    pub fn open_document_dialog(&mut self) -> CoreResult<OpenOutcome> {
        match self.dialogs.prompt_open_path() {
            Some(path) => self.open_document(path),
            None => Ok(OpenOutcome::Cancelled),
        }
    }

    /// Writes the active tab to its path, or behaves as
    /// [`save_as_active`](Self::save_as_active) when it has none.
    pub fn save_active(&mut self) -> CoreResult<SaveOutcome> {
        let Some(path) = self.active_tab().path.clone() else {
            return self.save_as_active();
        };

        self.write_active(&path)?;
        self.saved(&path);
        Ok(SaveOutcome::Saved(path))
    }

    /// Asks for a destination and writes the active tab there. The tab is
    /// rebound to the new path only after the write succeeded.
    pub fn save_as_active(&mut self) -> CoreResult<SaveOutcome> {
        let Some(path) = self.dialogs.prompt_save_path() else {
            return Ok(SaveOutcome::Cancelled);
        };

        if self
            .find_by_path(&path)
            .is_some_and(|index| index != self.active)
        {
            let source = io::Error::new(io::ErrorKind::AlreadyExists, "open in another tab");
            return Err(self.report(CoreError::SaveFailed { path, source }));
        }

        self.write_active(&path)?;

        let tab = &mut self.tabs[self.active];
        tab.title = file_title(&path);
        tab.path = Some(path.clone());
        self.saved(&path);
        self.refresh_window_title();
        Ok(SaveOutcome::Saved(path))
    }

    /// Closes the tab at `index`.
    ///
    /// The last remaining tab is never removed: it is cleared in place and
    /// goes back to `untitled-1` with no path.
    pub fn close_tab(&mut self, index: usize) -> CoreResult<()> {
        self.check_index(index)?;

        if self.tabs.len() == 1 {
            let tab = &mut self.tabs[index];
            tab.surface.clear();
            tab.path = None;
            tab.title = "untitled-1".to_string();
            let id = tab.id;

            tracing::debug!("Reset sole tab {}", id);
            self.events.emit(EditorEvent::TabReset(id));
            self.refresh_window_title();
            self.refresh_cursor_position();
            return Ok(());
        }

        let closed = self.tabs.remove(index);
        tracing::debug!("Closed tab {} ({})", index, closed.title);
        self.events.emit(EditorEvent::TabClosed(closed.id));
        drop(closed);

        if index < self.active {
            self.active -= 1;
        } else if index == self.active {
            self.set_active(index.min(self.tabs.len() - 1));
        }
        Ok(())
    }

    /// Makes the tab at `index` active.
    pub fn activate_tab(&mut self, index: usize) -> CoreResult<()> {
        self.check_index(index)?;
        self.set_active(index);
        Ok(())
    }

    /// Moves the tab at `from` to position `to`. The active document stays
    /// active wherever it ends up.
    pub fn move_tab(&mut self, from: usize, to: usize) -> CoreResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }

        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);

        if self.active == from {
            self.active = to;
        } else if from < self.active && self.active <= to {
            self.active -= 1;
        } else if to <= self.active && self.active < from {
            self.active += 1;
        }

        self.events.emit(EditorEvent::TabMoved { from, to });
        Ok(())
    }

    // ==================== Editing ====================

    /// Runs an edit or view menu action on the active surface.
    pub fn edit(&mut self, action: EditAction) -> CoreResult<()> {
        let surface = &mut self.tabs[self.active].surface;

        match action {
            EditAction::Undo => ignore_empty_history(surface.undo())?,
            EditAction::Redo => ignore_empty_history(surface.redo())?,
            EditAction::Copy => {
                if let Some(text) = surface.selected_text() {
                    self.clipboard.set_text(&text);
                }
            }
            EditAction::Cut => {
                if let Some(text) = surface.selected_text() {
                    self.clipboard.set_text(&text);
                    surface.delete_selection()?;
                }
            }
            EditAction::Paste => {
                if let Some(text) = self.clipboard.get_text() {
                    surface.insert_text(&text)?;
                }
            }
            EditAction::SelectAll => surface.select_all(),
            EditAction::ZoomIn => surface.zoom(1),
            EditAction::ZoomOut => surface.zoom(-1),
        }
        Ok(())
    }

    /// Forwards the active surface's notifications to its gutter.
    pub fn sync_active(&mut self) -> Vec<GutterUpdate> {
        let (updates, caret_moved) = self.tabs[self.active].sync();
        if caret_moved {
            self.refresh_cursor_position();
        }
        updates
    }

    /// Forwards a tab's surface notifications to its gutter.
    pub fn sync_tab(&mut self, index: usize) -> CoreResult<Vec<GutterUpdate>> {
        self.check_index(index)?;
        if index == self.active {
            return Ok(self.sync_active());
        }
        Ok(self.tabs[index].sync().0)
    }

    /// Dispatches a menu command.
    pub fn execute(&mut self, command: Command) -> CoreResult<()> {
        tracing::trace!("execute {}", command.display_name());

        match command {
            Command::NewFile => {
                self.new_document();
            }
            Command::OpenFile { path: Some(path) } => {
                self.open_document(path)?;
            }
            Command::OpenFile { path: None } => {
                self.open_document_dialog()?;
            }
            Command::Save => {
                self.save_active()?;
            }
            Command::SaveAs => {
                self.save_as_active()?;
            }
            Command::CloseTab { index } => self.close_tab(index.unwrap_or(self.active))?,
            Command::ActivateTab { index } => self.activate_tab(index)?,
            Command::MoveTab { from, to } => self.move_tab(from, to)?,
            Command::Quit => {
                self.should_quit = true;
                self.events.emit(EditorEvent::Quit);
            }
            Command::Undo => self.edit(EditAction::Undo)?,
            Command::Redo => self.edit(EditAction::Redo)?,
            Command::Cut => self.edit(EditAction::Cut)?,
            Command::Copy => self.edit(EditAction::Copy)?,
            Command::Paste => self.edit(EditAction::Paste)?,
            Command::SelectAll => self.edit(EditAction::SelectAll)?,
            Command::ZoomIn => self.edit(EditAction::ZoomIn)?,
            Command::ZoomOut => self.edit(EditAction::ZoomOut)?,
            Command::Insert(text) => self.active_tab_mut().surface.insert_text(&text)?,
            Command::Newline => self.active_tab_mut().surface.insert_text("\n")?,
            Command::Backspace => self.active_tab_mut().surface.delete_backward()?,
            Command::MoveCaret(movement) => self.active_tab_mut().surface.move_caret(movement),
            Command::Scroll(dy) => self.active_tab_mut().surface.scroll_by(dy),
        }
        Ok(())
    }

    // ==================== Internals ====================

    fn check_index(&self, index: usize) -> CoreResult<()> {
        if index < self.tabs.len() {
            Ok(())
        } else {
            Err(CoreError::TabOutOfRange(index))
        }
    }

    /// Inserts a tab after the active one (or first, into an empty set) and
    /// activates it.
    fn insert_tab(&mut self, title: String, path: Option<PathBuf>, surface: S) -> usize {
        let tab = DocumentTab::new(title, path, surface, self.gutter_config.clone());
        let index = if self.tabs.is_empty() { 0 } else { self.active + 1 };

        tracing::debug!("New tab {} at {}", tab.title, index);
        self.events.emit(EditorEvent::TabOpened(tab.id));
        self.tabs.insert(index, tab);
        self.set_active(index);
        index
    }

    /// Tab-change notification: retitles the window and refreshes the
    /// caret indicator from the newly active surface.
    fn set_active(&mut self, index: usize) {
        self.active = index;
        self.events.emit(EditorEvent::TabActivated(self.tabs[index].id));
        self.refresh_window_title();
        self.refresh_cursor_position();
    }

    fn refresh_window_title(&mut self) {
        let tab = &self.tabs[self.active];
        let name = tab
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| tab.title.clone());

        let title = format!("{} — {}", name, self.app_name);
        if title != self.chrome.title {
            self.chrome.title = title.clone();
            self.events.emit(EditorEvent::WindowTitleChanged(title));
        }
    }

    fn refresh_cursor_position(&mut self) {
        let surface = &self.tabs[self.active].surface;
        self.chrome.cursor_position = format!(
            "Ln {}, Col {}",
            surface.caret_line() + 1,
            surface.caret_column() + 1
        );
    }

    fn write_active(&mut self, path: &Path) -> CoreResult<()> {
        let bytes = self.tabs[self.active].surface.text().into_bytes();
        if let Err(source) = self.io.write(path, &bytes) {
            return Err(self.report(CoreError::SaveFailed {
                path: path.to_path_buf(),
                source,
            }));
        }
        self.tabs[self.active].surface.set_modified(false);
        Ok(())
    }

    fn saved(&mut self, path: &Path) {
        tracing::info!("Saved {}", path.display());
        self.chrome.status = format!("Saved: {}", path.display());
        self.events
            .emit(EditorEvent::DocumentSaved(self.tabs[self.active].id));
    }

    /// Shows a failure to the user once and hands it back for propagation.
    fn report(&mut self, err: CoreError) -> CoreError {
        tracing::warn!("{}", err);
        self.dialogs.warn("Error", &err.to_string());
        err
    }
}

/// Tab title for a bound path: its file name.
fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decodes file bytes as UTF-8, dropping a leading byte-order mark.
fn decode_text(bytes: Vec<u8>) -> io::Result<String> {
    let mut text =
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if text.starts_with('\u{feff}') {
        text.drain(..'\u{feff}'.len_utf8());
    }
    Ok(text)
}

/// Undo/redo with nothing to do is a no-op, not a failure.
fn ignore_empty_history(result: Result<(), BufferError>) -> CoreResult<()> {
    match result {
        Err(BufferError::NothingToUndo | BufferError::NothingToRedo) => Ok(()),
        other => Ok(other?),
    }
}
