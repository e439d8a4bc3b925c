//! Menu commands.
//!
//! Every action a host can trigger on the tab manager is a [`Command`]
//! value, so menus, shortcuts and the terminal host's command line all go
//! through the same dispatch in `DocumentTabManager::execute`.
//!
//! The textual form is what the terminal host reads. Tab numbers are
//! 1-based there and 0-based in the enum.

use std::path::PathBuf;
use std::str::FromStr;

use crate::surface::CaretMove;

/// Actions on the tab set and the active surface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    // File menu
    NewFile,
    /// Opens `path`, or asks for one when `None`
    OpenFile { path: Option<PathBuf> },
    Save,
    SaveAs,
    /// Closes the tab at `index`, or the active tab when `None`
    CloseTab { index: Option<usize> },
    ActivateTab { index: usize },
    MoveTab { from: usize, to: usize },
    Quit,

    // Edit menu
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,

    // Typing and navigation
    Insert(String),
    Newline,
    Backspace,
    MoveCaret(CaretMove),
    /// Scrolls the active surface by this many pixels
    Scroll(i32),

    // View menu
    ZoomIn,
    ZoomOut,
}

impl Command {
    /// Menu label for the command.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::NewFile => "New File",
            Command::OpenFile { .. } => "Open File...",
            Command::Save => "Save",
            Command::SaveAs => "Save As...",
            Command::CloseTab { .. } => "Close Tab",
            Command::ActivateTab { .. } => "Switch Tab",
            Command::MoveTab { .. } => "Move Tab",
            Command::Quit => "Exit",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Cut => "Cut",
            Command::Copy => "Copy",
            Command::Paste => "Paste",
            Command::SelectAll => "Select All",
            Command::Insert(_) => "Insert",
            Command::Newline => "Newline",
            Command::Backspace => "Backspace",
            Command::MoveCaret(_) => "Move Caret",
            Command::Scroll(_) => "Scroll",
            Command::ZoomIn => "Zoom In",
            Command::ZoomOut => "Zoom Out",
        }
    }

    /// Keyboard shortcut shown next to the menu label, if any.
    pub fn shortcut(&self) -> Option<&'static str> {
        Some(match self {
            Command::NewFile => "Ctrl+N",
            Command::OpenFile { .. } => "Ctrl+O",
            Command::Save => "Ctrl+S",
            Command::SaveAs => "Ctrl+Shift+S",
            Command::CloseTab { .. } => "Ctrl+W",
            Command::Quit => "Ctrl+Q",
            Command::Undo => "Ctrl+Z",
            Command::Redo => "Ctrl+Shift+Z",
            Command::Cut => "Ctrl+X",
            Command::Copy => "Ctrl+C",
            Command::Paste => "Ctrl+V",
            Command::SelectAll => "Ctrl+A",
            Command::ZoomIn => "Ctrl++",
            Command::ZoomOut => "Ctrl+-",
            _ => return None,
        })
    }
}

/// Errors from parsing a textual command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    BadArgument {
        command: String,
        expected: &'static str,
    },
}

fn tab_number(command: &str, arg: Option<&str>) -> Result<usize, CommandParseError> {
    arg.and_then(|a| a.parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .map(|n| n - 1)
        .ok_or_else(|| CommandParseError::BadArgument {
            command: command.to_string(),
            expected: "a tab number starting at 1",
        })
}

fn count(command: &str, arg: Option<&str>) -> Result<usize, CommandParseError> {
    match arg {
        None => Ok(1),
        Some(a) => a.parse().map_err(|_| CommandParseError::BadArgument {
            command: command.to_string(),
            expected: "a count",
        }),
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let rest = rest.trim();
        let arg = (!rest.is_empty()).then_some(rest);
        let mut args = rest.split_whitespace();

        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Err(CommandParseError::Empty),
            "new" => Command::NewFile,
            "open" => Command::OpenFile {
                path: arg.map(PathBuf::from),
            },
            "save" => Command::Save,
            "saveas" => Command::SaveAs,
            "close" => Command::CloseTab {
                index: arg.map(|a| tab_number(word, Some(a))).transpose()?,
            },
            "tab" => Command::ActivateTab {
                index: tab_number(word, arg)?,
            },
            "move" => Command::MoveTab {
                from: tab_number(word, args.next())?,
                to: tab_number(word, args.next())?,
            },
            "quit" | "exit" => Command::Quit,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "cut" => Command::Cut,
            "copy" => Command::Copy,
            "paste" => Command::Paste,
            "selectall" => Command::SelectAll,
            // Keep the text exactly as typed after the first space.
            "type" => Command::Insert(line.split_once(' ').map(|(_, t)| t).unwrap_or("").to_string()),
            "enter" => Command::Newline,
            "backspace" => Command::Backspace,
            "up" => Command::MoveCaret(CaretMove::Up(count(word, arg)?)),
            "down" => Command::MoveCaret(CaretMove::Down(count(word, arg)?)),
            "left" => Command::MoveCaret(CaretMove::Left(count(word, arg)?)),
            "right" => Command::MoveCaret(CaretMove::Right(count(word, arg)?)),
            "home" => Command::MoveCaret(CaretMove::LineStart),
            "end" => Command::MoveCaret(CaretMove::LineEnd),
            "top" => Command::MoveCaret(CaretMove::DocumentStart),
            "bottom" => Command::MoveCaret(CaretMove::DocumentEnd),
            "scroll" => Command::Scroll(arg.and_then(|a| a.parse().ok()).ok_or_else(|| {
                CommandParseError::BadArgument {
                    command: word.to_string(),
                    expected: "a pixel offset",
                }
            })?),
            "zoomin" => Command::ZoomIn,
            "zoomout" => Command::ZoomOut,
            other => return Err(CommandParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_and_shortcut() {
        assert_eq!(Command::Save.display_name(), "Save");
        assert_eq!(Command::SaveAs.shortcut(), Some("Ctrl+Shift+S"));
        assert_eq!(Command::Scroll(3).shortcut(), None);
    }

    #[test]
    fn test_parse_file_commands() {
        assert_eq!("new".parse::<Command>(), Ok(Command::NewFile));
        assert_eq!("open".parse::<Command>(), Ok(Command::OpenFile { path: None }));
        assert_eq!(
            "open /tmp/My Notes.md".parse::<Command>(),
            Ok(Command::OpenFile {
                path: Some(PathBuf::from("/tmp/My Notes.md"))
            })
        );
        assert_eq!("close".parse::<Command>(), Ok(Command::CloseTab { index: None }));
        assert_eq!("close 2".parse::<Command>(), Ok(Command::CloseTab { index: Some(1) }));
        assert_eq!("move 1 3".parse::<Command>(), Ok(Command::MoveTab { from: 0, to: 2 }));
    }

    #[test]
    fn test_parse_keeps_typed_text() {
        assert_eq!(
            "type   two  spaces".parse::<Command>(),
            Ok(Command::Insert("  two  spaces".to_string()))
        );
    }

    #[test]
    fn test_parse_movement() {
        assert_eq!("down".parse::<Command>(), Ok(Command::MoveCaret(CaretMove::Down(1))));
        assert_eq!("up 4".parse::<Command>(), Ok(Command::MoveCaret(CaretMove::Up(4))));
        assert_eq!("scroll -20".parse::<Command>(), Ok(Command::Scroll(-20)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandParseError::Empty));
        assert!(matches!("tab 0".parse::<Command>(), Err(CommandParseError::BadArgument { .. })));
        assert!(matches!("frobnicate".parse::<Command>(), Err(CommandParseError::Unknown(_))));
    }
}
