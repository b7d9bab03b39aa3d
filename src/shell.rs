//! Line-oriented command shell.
//!
//! Glues the session manager and the selection overlay to the terminal:
//! each input line is one command, and background work reported by the
//! manager is handled between lines.

use anyhow::{Context, bail};
use pocketcode_buffer::Position;
use pocketcode_core::{
    CloseOutcome, Config, Dialogs, EventHandler, FileListPosition, ManagerMessage, MirrorStore,
    OfflineRemotes, OpenOptions, OpenOutcome, Origin, SessionEvent, SessionId, SessionManager,
    SessionSummary, Services, TileStrip,
};
use pocketcode_touch::{
    Clipboard, Handle, HandleOverlay, HeadlessSurface, MenuAction, MonospaceLayout, OverlayEvent,
    Point, ScrollOffset, Size, UnknownAction,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::terminal::{read_line, SharedInput, TerminalDialogs, TerminalView};

/// Cell size of the monospace layout, in pixels.
const CHAR_WIDTH: f32 = 8.0;
const LINE_HEIGHT: f32 = 16.0;
/// A portrait phone screen.
const VIEWPORT: Size = Size::new(360.0, 640.0);

const HELP: &str = "\
commands:
  open PATH            open a file (switches if already open)
  new NAME             new untitled file
  switch N             make session N active
  close N [!]          close session N, ! skips the unsaved check
  rename N NAME        rename session N
  move N DIR           point session N at DIR/NAME
  type TEXT            replace the selection (\\n for newline)
  save N               write session N to its file
  select ROW COL       select the word at ROW:COL and show handles
  drag start|end X Y   drag a selection handle to X,Y
  scroll TOP LEFT      scroll the editor
  tap                  click the content area
  menu ACTION          copy | cut | paste | select-all
  files sidebar|header move the open-file list
  list [--json]        list open sessions
  show                 print the active buffer
  unsaved              count sessions with unsaved changes
  quit[!]              exit";

// ==================== Commands ====================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(PathBuf),
    New(String),
    Switch(usize),
    Close { index: usize, force: bool },
    Rename { index: usize, name: String },
    Move { index: usize, dir: PathBuf },
    Type(String),
    Save(usize),
    Select(Position),
    Drag { handle: Handle, point: Point },
    Scroll(ScrollOffset),
    Tap,
    Menu(MenuAction),
    Files(FileListPosition),
    List { json: bool },
    Show,
    Unsaved,
    Help,
    Quit { force: bool },
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a number: {0}")]
    Number(String),

    #[error(transparent)]
    Action(#[from] UnknownAction),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match word {
            "open" | "o" => Command::Open(PathBuf::from(required(rest, "open PATH")?)),
            "new" => Command::New(required(rest, "new NAME")?.to_string()),
            "switch" | "s" => Command::Switch(index(args.first(), "switch N")?),
            "close" | "c" => Command::Close {
                index: index(args.first(), "close N [!]")?,
                force: args.get(1) == Some(&"!"),
            },
            "rename" => {
                let (n, name) = split_index(rest, "rename N NAME")?;
                Command::Rename {
                    index: n,
                    name: name.to_string(),
                }
            }
            "move" => {
                let (n, dir) = split_index(rest, "move N DIR")?;
                Command::Move {
                    index: n,
                    dir: PathBuf::from(dir),
                }
            }
            "type" | "t" => Command::Type(unescape(required(rest, "type TEXT")?)),
            "save" => Command::Save(index(args.first(), "save N")?),
            "select" => {
                let usage = "select ROW COL";
                let row = index(args.first(), usage)?;
                let column = index(args.get(1), usage)?;
                Command::Select(Position::new(row - 1, column - 1))
            }
            "drag" => {
                let usage = "drag start|end X Y";
                let handle = match args.first() {
                    Some(&"start") => Handle::Start,
                    Some(&"end") => Handle::End,
                    _ => return Err(CommandError::Usage(usage)),
                };
                let point = Point::new(number(args.get(1), usage)?, number(args.get(2), usage)?);
                Command::Drag { handle, point }
            }
            "scroll" => {
                let usage = "scroll TOP LEFT";
                Command::Scroll(ScrollOffset::new(
                    number(args.first(), usage)?,
                    number(args.get(1), usage)?,
                ))
            }
            "tap" => Command::Tap,
            "menu" => Command::Menu(required(rest, "menu ACTION")?.parse()?),
            "files" => match args.first() {
                Some(&"sidebar") => Command::Files(FileListPosition::Sidebar),
                Some(&"header") => Command::Files(FileListPosition::Header),
                _ => return Err(CommandError::Usage("files sidebar|header")),
            },
            "list" | "ls" => Command::List {
                json: args.first() == Some(&"--json"),
            },
            "show" => Command::Show,
            "unsaved" => Command::Unsaved,
            "help" | "?" => Command::Help,
            "quit" | "q" => Command::Quit { force: false },
            "quit!" | "q!" => Command::Quit { force: true },
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest)
    }
}

/// Parses a 1-based index.
fn index(arg: Option<&&str>, usage: &'static str) -> Result<usize, CommandError> {
    let arg = arg.ok_or(CommandError::Usage(usage))?;
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::Number(arg.to_string())),
    }
}

fn number(arg: Option<&&str>, usage: &'static str) -> Result<f32, CommandError> {
    let arg = arg.ok_or(CommandError::Usage(usage))?;
    arg.parse::<f32>()
        .map_err(|_| CommandError::Number(arg.to_string()))
}

/// Splits `N REST`, where REST may contain spaces.
fn split_index<'a>(rest: &'a str, usage: &'static str) -> Result<(usize, &'a str), CommandError> {
    let (n, tail) = rest
        .split_once(char::is_whitespace)
        .ok_or(CommandError::Usage(usage))?;
    Ok((index(Some(&n), usage)?, required(tail.trim(), usage)?))
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}

// ==================== Shell ====================

/// Result of one command.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

enum Step {
    Line(Option<String>),
    Message(ManagerMessage),
}

pub struct Shell {
    manager: SessionManager,
    overlay: HandleOverlay,
    surface: HeadlessSurface,
    layout: MonospaceLayout,
    clipboard: Box<dyn Clipboard>,
    view: TerminalView,
    dialogs: TerminalDialogs,
    events: EventHandler,
}

impl Shell {
    /// Builds the shell. Must be called from within a tokio runtime.
    pub fn new(
        config: Config,
        store: Arc<dyn MirrorStore>,
        input: SharedInput,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let view = TerminalView::new();
        let dialogs = TerminalDialogs::new(input);
        let services = Services {
            view: Box::new(view.clone()),
            dialogs: Box::new(dialogs.clone()),
            tiles: Box::new(TileStrip::new()),
            remotes: Box::new(OfflineRemotes),
        };
        let manager = SessionManager::new(config.session, store, services);
        let events = EventHandler::new(manager.subscribe());

        let surface = HeadlessSurface::default();
        let overlay = HandleOverlay::new(config.overlay, Box::new(surface.clone()));

        Self {
            manager,
            overlay,
            surface,
            layout: MonospaceLayout::new(CHAR_WIDTH, LINE_HEIGHT, VIEWPORT),
            clipboard,
            view,
            dialogs,
            events,
        }
    }

    /// Handles background results until the session store is ready.
    pub async fn wait_ready(&mut self) {
        while !self.manager.is_ready() {
            match self.manager.next_message().await {
                Some(msg) => self.manager.handle(msg).await,
                None => break,
            }
        }
    }

    /// Runs commands from `input` until it ends or `quit`.
    pub async fn run(mut self, input: SharedInput) -> anyhow::Result<()> {
        self.wait_ready().await;
        self.print_notes();

        loop {
            let step = tokio::select! {
                line = read_line(&input) => Step::Line(line?),
                Some(msg) = self.manager.next_message() => Step::Message(msg),
            };

            match step {
                Step::Line(None) => break,
                Step::Line(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(command) => match self.execute(command).await {
                            Ok(Reply::Quit) => break,
                            Ok(Reply::Text(text)) => println!("{}", text),
                            Err(err) => eprintln!("error: {:#}", err),
                        },
                        Err(err) => eprintln!("{}", err),
                    }
                }
                Step::Message(msg) => self.manager.handle(msg).await,
            }
            self.print_notes();
        }

        tracing::info!("Shell exiting with {} unsaved", self.manager.count_unsaved());
        Ok(())
    }

    fn print_notes(&mut self) {
        for note in self.after_step() {
            println!("{}", note);
        }
    }

    /// Opens a local file. Missing files open empty.
    pub async fn open_file(&mut self, path: &Path) -> anyhow::Result<OpenOutcome> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let options = match tokio::fs::read_to_string(&path).await {
            Ok(text) => OpenOptions::default().with_text(text).saved(),
            Err(err) if err.kind() == ErrorKind::NotFound => OpenOptions::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("Could not read {}", path.display()));
            }
        };
        Ok(self.manager.open(name, Origin::path(path), options))
    }

    /// Runs one command.
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Reply> {
        let text = match command {
            Command::Open(path) => {
                let outcome = self.open_file(&path).await?;
                self.describe_open(outcome)
            }
            Command::New(name) => {
                let outcome = self.manager.open(name, Origin::Untitled, OpenOptions::default());
                self.describe_open(outcome)
            }
            Command::Switch(n) => {
                let id = self.session_id(n)?;
                self.manager.switch_active(&id);
                self.view.header()
            }
            Command::Close { index, force } => {
                let id = self.session_id(index)?;
                match self.manager.close(&id, force).await {
                    CloseOutcome::Closed => format!("closed, now editing {}", self.view.header()),
                    CloseOutcome::Declined => "kept open".to_string(),
                    CloseOutcome::Ignored => "nothing to close".to_string(),
                }
            }
            Command::Rename { index, name } => {
                let id = self.session_id(index)?;
                self.manager.rename(&id, &name).await?;
                format!("renamed to {}", name)
            }
            Command::Move { index, dir } => {
                let id = self.session_id(index)?;
                self.manager.relocate(&id, &dir)?;
                self.summary_line(&id)
            }
            Command::Type(text) => {
                self.manager
                    .edit_active(|buffer| buffer.replace_selection(&text))
                    .context("No active session")??;
                self.overlay_event(OverlayEvent::SelectionChanged);
                let cursor = self.manager.active().map(|s| s.buffer().cursor());
                format!("cursor at {}", cursor.unwrap_or_default())
            }
            Command::Save(n) => {
                let id = self.session_id(n)?;
                self.save(&id).await?
            }
            Command::Select(position) => {
                let read_only = self.manager.active().is_some_and(|s| s.is_read_only());
                let buffer = self
                    .manager
                    .active_buffer_mut()
                    .context("No active session")?;
                buffer.move_cursor_to(position);
                if self.overlay.start(buffer, &self.layout, read_only) {
                    self.describe_overlay()
                } else {
                    format!("no word at {}", position)
                }
            }
            Command::Drag { handle, point } => {
                if !self.overlay_event(OverlayEvent::TouchStart(handle)) {
                    bail!("No selection handles on screen");
                }
                self.overlay_event(OverlayEvent::TouchMove(point));
                self.overlay_event(OverlayEvent::TouchEnd);
                self.overlay_event(OverlayEvent::Tick);
                self.describe_overlay()
            }
            Command::Scroll(offset) => {
                self.layout.set_scroll(offset);
                self.overlay_event(OverlayEvent::ScrollChanged);
                self.describe_overlay()
            }
            Command::Tap => {
                self.overlay_event(OverlayEvent::ContentClick);
                self.describe_overlay()
            }
            Command::Menu(action) => {
                let done = self
                    .manager
                    .edit_active(|buffer| {
                        self.overlay
                            .run_action(action, buffer, self.clipboard.as_mut())
                    })
                    .context("No active session")??;
                if !done {
                    bail!("{} is not available here", action);
                }
                action.to_string()
            }
            Command::Files(position) => {
                self.manager.move_file_list(position);
                format!("file list in {:?}", position).to_lowercase()
            }
            Command::List { json } => {
                let summaries = self.manager.summaries();
                if json {
                    serde_json::to_string_pretty(&summaries)?
                } else {
                    format_list(&summaries)
                }
            }
            Command::Show => self.show()?,
            Command::Unsaved => format!("{} unsaved", self.manager.count_unsaved()),
            Command::Help => HELP.to_string(),
            Command::Quit { force } => {
                let unsaved = self.manager.count_unsaved();
                if force || unsaved == 0 {
                    return Ok(Reply::Quit);
                }
                let message = format!("{} files have unsaved changes. Quit anyway?", unsaved);
                if self.dialogs.confirm("WARNING", &message).await {
                    return Ok(Reply::Quit);
                }
                "not quitting".to_string()
            }
        };
        Ok(Reply::Text(text))
    }

    /// Runs the deferred overlay tick and collects notices from manager
    /// events.
    pub fn after_step(&mut self) -> Vec<String> {
        self.overlay_event(OverlayEvent::Tick);

        let mut notes = Vec::new();
        for event in self.events.drain() {
            match event {
                // Handles belong to the buffer that was showing
                SessionEvent::Switched(_) => self.overlay.teardown(),
                SessionEvent::DirtyChanged(id, true) => {
                    if let Some(session) = self.manager.get(&id) {
                        notes.push(format!("{} has unsaved changes", session.name()));
                    }
                }
                SessionEvent::StoreReady => notes.push("session store ready".to_string()),
                _ => {}
            }
        }
        notes
    }

    fn overlay_event(&mut self, event: OverlayEvent) -> bool {
        match self.manager.active_buffer_mut() {
            Some(buffer) => self.overlay.handle(event, buffer, &mut self.layout),
            None => false,
        }
    }

    async fn save(&mut self, id: &SessionId) -> anyhow::Result<String> {
        let session = self.manager.get(id).context("No such session")?;
        if session.is_read_only() {
            bail!("{} is read-only; use `move` first", session.name());
        }
        let path = session
            .origin()
            .local_path()
            .with_context(|| format!("{} has no location; use `move` first", session.name()))?
            .to_path_buf();
        let text = session.buffer().text().into_owned();

        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("Could not write {}", path.display()))?;
        self.manager.mark_saved(id).await?;
        Ok(format!("saved {}", path.display()))
    }

    fn session_id(&self, n: usize) -> anyhow::Result<SessionId> {
        self.manager
            .sessions()
            .nth(n.saturating_sub(1))
            .map(|s| s.id().clone())
            .with_context(|| format!("No session #{}", n))
    }

    fn describe_open(&self, outcome: OpenOutcome) -> String {
        match outcome {
            OpenOutcome::Opened(id) => format!("opened {}", self.summary_line(&id)),
            OpenOutcome::Switched(id) => format!("switched to {}", self.summary_line(&id)),
            OpenOutcome::Queued => "queued until the session store is ready".to_string(),
        }
    }

    fn summary_line(&self, id: &SessionId) -> String {
        match self.manager.get(id) {
            Some(session) => format!(
                "{} ({})",
                session.name(),
                session.subtitle(self.manager.config().subtitle_max_len)
            ),
            None => id.to_string(),
        }
    }

    fn describe_overlay(&self) -> String {
        if !self.overlay.is_active() {
            return "no selection handles".to_string();
        }
        let state = self.surface.state();
        let start = state.start.unwrap_or_default();
        let end = state.end.unwrap_or_default();
        let selected = self
            .manager
            .active()
            .and_then(|s| s.buffer().selected_text())
            .unwrap_or_default();

        let mut out = format!(
            "{:?}  start ({:.0}, {:.0})  end ({:.0}, {:.0})",
            selected, start.x, start.y, end.x, end.y
        );
        if let Some(menu) = state.menu {
            let items: Vec<&str> = state.items.iter().map(|a| a.label()).collect();
            out.push_str(&format!(
                "  menu ({:.0}, {:.0}) x{:.2} [{}]",
                menu.left,
                menu.top,
                menu.scale,
                items.join(", ")
            ));
        }
        if let Some(swatch) = &state.swatch {
            out.push_str(&format!("  swatch {}", swatch));
        }
        out
    }

    fn show(&self) -> anyhow::Result<String> {
        let session = self
            .view
            .shown()
            .and_then(|id| self.manager.get(&id))
            .context("No active session")?;
        let mut out = self.view.header();
        if session.is_unsaved() {
            out.push_str(" *");
        }
        for (i, line) in session.buffer().text().lines().enumerate() {
            out.push_str(&format!("\n{:>4} | {}", i + 1, line));
        }
        Ok(out)
    }
}

fn format_list(summaries: &[SessionSummary]) -> String {
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{} {}. {}{}  {}",
                if s.active { '>' } else { ' ' },
                i + 1,
                s.name,
                if s.unsaved { " *" } else { "" },
                s.subtitle
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::shared_input;
    use pocketcode_core::MemoryMirrorStore;
    use pocketcode_touch::MemoryClipboard;
    use proptest::prelude::*;
    use tempfile::tempdir;

    async fn shell(answers: &'static [u8]) -> Shell {
        let mut shell = Shell::new(
            Config::default(),
            Arc::new(MemoryMirrorStore::ready()),
            shared_input(answers),
            Box::new(MemoryClipboard::new()),
        );
        shell.wait_ready().await;
        shell
    }

    async fn run(shell: &mut Shell, line: &str) -> String {
        let command = line.parse::<Command>().unwrap();
        match shell.execute(command).await.unwrap() {
            Reply::Text(text) => text,
            Reply::Quit => "quit".to_string(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "open src/main.rs".parse::<Command>().unwrap(),
            Command::Open(PathBuf::from("src/main.rs"))
        );
        assert_eq!(
            "close 2 !".parse::<Command>().unwrap(),
            Command::Close {
                index: 2,
                force: true
            }
        );
        assert_eq!(
            "rename 1 my notes.md".parse::<Command>().unwrap(),
            Command::Rename {
                index: 1,
                name: "my notes.md".to_string()
            }
        );
        assert_eq!(
            "select 3 5".parse::<Command>().unwrap(),
            Command::Select(Position::new(2, 4))
        );
        assert_eq!(
            "drag end 10 20.5".parse::<Command>().unwrap(),
            Command::Drag {
                handle: Handle::End,
                point: Point::new(10.0, 20.5)
            }
        );
        assert_eq!(
            "type a\\nb".parse::<Command>().unwrap(),
            Command::Type("a\nb".to_string())
        );
        assert_eq!(
            "menu select-all".parse::<Command>().unwrap(),
            Command::Menu(MenuAction::SelectAll)
        );
        assert_eq!(
            "list --json".parse::<Command>().unwrap(),
            Command::List { json: true }
        );
        assert_eq!(
            "q!".parse::<Command>().unwrap(),
            Command::Quit { force: true }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "frobnicate".parse::<Command>(),
            Err(CommandError::Unknown(_))
        ));
        assert!(matches!("switch".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("switch 0".parse::<Command>(), Err(CommandError::Number(_))));
        assert!(matches!("menu delete".parse::<Command>(), Err(CommandError::Action(_))));
    }

    #[tokio::test]
    async fn test_new_type_and_list() {
        let mut shell = shell(b"").await;
        run(&mut shell, "new notes.md").await;
        run(&mut shell, "type hello world").await;

        let list = run(&mut shell, "list").await;
        assert_eq!(list, "> 1. notes.md *  New file");

        let shown = run(&mut shell, "show").await;
        assert!(shown.ends_with("   1 | hello world"));
    }

    #[tokio::test]
    async fn test_select_copy_paste() {
        let mut shell = shell(b"").await;
        run(&mut shell, "new a.txt").await;
        run(&mut shell, "type alpha beta").await;

        let described = run(&mut shell, "select 1 8").await;
        assert!(described.starts_with("\"beta\""));
        assert!(shell.overlay.is_active());

        assert_eq!(run(&mut shell, "menu copy").await, "copy");
        assert!(!shell.overlay.is_active());

        run(&mut shell, "select 1 2").await;
        run(&mut shell, "menu paste").await;
        shell.after_step();
        let text = shell.manager.active().unwrap().buffer().text().into_owned();
        assert_eq!(text, "beta beta");
    }

    #[tokio::test]
    async fn test_tap_removes_handles() {
        let mut shell = shell(b"").await;
        run(&mut shell, "new a.txt").await;
        run(&mut shell, "type word").await;
        run(&mut shell, "select 1 1").await;
        assert_eq!(run(&mut shell, "tap").await, "no selection handles");
        assert!(shell
            .execute(Command::Drag {
                handle: Handle::End,
                point: Point::new(0.0, 0.0)
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_close_asks_on_the_terminal() {
        let mut shell = shell(b"n\ny\n").await;
        run(&mut shell, "new a.txt").await;
        run(&mut shell, "new b.txt").await;

        assert_eq!(run(&mut shell, "close 2").await, "kept open");
        assert_eq!(shell.manager.len(), 2);
        assert!(run(&mut shell, "close 2").await.starts_with("closed"));
        assert_eq!(shell.manager.len(), 1);
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "old").unwrap();

        let mut shell = shell(b"").await;
        shell.open_file(&path).await.unwrap();
        run(&mut shell, "select 1 1").await;
        run(&mut shell, "type new").await;
        assert_eq!(run(&mut shell, "unsaved").await, "0 unsaved");

        let reply = run(&mut shell, "save 1").await;
        assert!(reply.starts_with("saved"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_save_needs_location() {
        let mut shell = shell(b"").await;
        run(&mut shell, "new a.txt").await;
        let err = shell.execute(Command::Save(1)).await.unwrap_err();
        assert!(err.to_string().contains("no location"));
    }

    #[tokio::test]
    async fn test_quit_with_unsaved_asks() {
        let mut shell = shell(b"n\n").await;
        run(&mut shell, "new a.txt").await;
        assert_eq!(run(&mut shell, "quit").await, "not quitting");
        assert_eq!(run(&mut shell, "quit!").await, "quit");
    }

    #[tokio::test]
    async fn test_open_missing_file_is_unsaved() {
        let dir = tempdir().unwrap();
        let mut shell = shell(b"").await;
        let reply = run(
            &mut shell,
            &format!("open {}", dir.path().join("fresh.rs").display()),
        )
        .await;
        assert!(reply.starts_with("opened fresh.rs"));
        assert_eq!(shell.manager.count_unsaved(), 1);
        assert_eq!(shell.manager.active().unwrap().buffer().mode(), "rust");
    }

    proptest! {
        #[test]
        fn prop_select_is_one_based(row in 1usize..10_000, column in 1usize..10_000) {
            let command = format!("select {} {}", row, column).parse::<Command>().unwrap();
            prop_assert_eq!(command, Command::Select(Position::new(row - 1, column - 1)));
        }

        #[test]
        fn prop_rename_keeps_spaces_in_name(index in 1usize..100, name in "[a-z]{1,8}( [a-z]{1,8}){0,3}") {
            let command = format!("rename {}  {}", index, name).parse::<Command>().unwrap();
            prop_assert_eq!(command, Command::Rename { index, name });
        }

        #[test]
        fn prop_parse_never_panics(line in "\\PC{0,40}") {
            let _ = line.parse::<Command>();
        }
    }
}
