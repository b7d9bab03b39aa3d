//! Terminal stand-ins for the editor's UI collaborators.

use async_trait::async_trait;
use pocketcode_buffer::{EditSession, Position};
use pocketcode_core::{Dialogs, EditorView, SessionId};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Mutex;

/// Line input shared by the command loop and the confirmation prompt.
pub type SharedInput = Rc<Mutex<Lines<Box<dyn AsyncBufRead + Unpin>>>>;

pub fn shared_input(reader: impl AsyncBufRead + Unpin + 'static) -> SharedInput {
    let reader: Box<dyn AsyncBufRead + Unpin> = Box::new(reader);
    Rc::new(Mutex::new(reader.lines()))
}

/// Reads the next line, `None` at end of input.
pub async fn read_line(input: &SharedInput) -> std::io::Result<Option<String>> {
    input.lock().await.next_line().await
}

/// What the editor header and content area currently show.
#[derive(Debug, Clone, Default)]
struct ViewState {
    shown: Option<SessionId>,
    title: String,
    subtitle: String,
}

/// Editor view that remembers what it was told to show; the shell prints
/// from it.
#[derive(Debug, Clone, Default)]
pub struct TerminalView {
    state: Rc<RefCell<ViewState>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session whose buffer is on screen.
    pub fn shown(&self) -> Option<SessionId> {
        self.state.borrow().shown.clone()
    }

    /// Header line: title and subtitle.
    pub fn header(&self) -> String {
        let state = self.state.borrow();
        if state.subtitle.is_empty() {
            state.title.clone()
        } else {
            format!("{} ({})", state.title, state.subtitle)
        }
    }
}

impl EditorView for TerminalView {
    fn show(&mut self, id: &SessionId, _buffer: &EditSession) {
        self.state.borrow_mut().shown = Some(id.clone());
    }

    // A terminal always has focus
    fn focus(&mut self) {}

    // `show` prints whole buffers, so every position is visible
    fn reveal(&mut self, _position: Position) {}

    fn set_title(&mut self, title: &str) {
        self.state.borrow_mut().title = title.to_string();
    }

    fn set_subtitle(&mut self, subtitle: &str) {
        self.state.borrow_mut().subtitle = subtitle.to_string();
    }
}

/// Dialogs answered on the terminal.
#[derive(Clone)]
pub struct TerminalDialogs {
    input: SharedInput,
}

impl TerminalDialogs {
    pub fn new(input: SharedInput) -> Self {
        Self { input }
    }
}

#[async_trait(?Send)]
impl Dialogs for TerminalDialogs {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        print!("{}: {} [y/N] ", title, message);
        let _ = std::io::stdout().flush();

        match read_line(&self.input).await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!("Could not read answer: {}", err);
                false
            }
        }
    }

    async fn alert(&self, title: &str, message: &str) {
        eprintln!("{}: {}", title, message);
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
