//! The per-file session model.
//!
//! `SessionId` is a newtype over a string: generated ids are UUIDs, but
//! callers may also reopen a session under an id they already know (the
//! fallback session uses the fixed [`SessionId::DEFAULT`]).

use pocketcode_buffer::EditSession;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::debounce::DebounceTimer;

/// Unique identifier for a session. Never derived from the file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Id of the fallback session that keeps the editor from being empty.
    pub const DEFAULT: &'static str = "default-session";

    /// Creates a new unique session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the fallback session's id.
    pub fn default_session() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Returns true for the fallback session's id.
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a session's content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// New file with no backing location
    Untitled,
    /// A file on the local file system
    Path { path: PathBuf },
    /// A content-provider reference (no writable location)
    ContentUri { uri: String },
    /// A record held by a remote backend
    Remote { record: RemoteRecord },
}

impl Origin {
    /// Convenience constructor for a local path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path { path: path.into() }
    }

    /// Returns the local path, if any.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Origin::Path { path } => Some(path),
            _ => None,
        }
    }

    /// Returns true if both origins name the same backing content.
    /// Untitled origins never match anything.
    pub fn same_source(&self, other: &Origin) -> bool {
        match (self, other) {
            (Origin::Path { path: a }, Origin::Path { path: b }) => a == b,
            (Origin::ContentUri { uri: a }, Origin::ContentUri { uri: b }) => a == b,
            (Origin::Remote { record: a }, Origin::Remote { record: b }) => a.same_record(b),
            _ => false,
        }
    }
}

/// Kinds of remote record backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteKind {
    /// A version-control blob; `id` is the blob sha
    Git { repo: String, path: String },
    /// A paste/gist file; `id` is the gist id
    Gist,
}

/// Reference to content held by a remote backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub kind: RemoteKind,
    pub id: String,
}

impl RemoteRecord {
    /// Returns true if both refer to the same backend record.
    pub fn same_record(&self, other: &RemoteRecord) -> bool {
        let same_kind = matches!(
            (&self.kind, &other.kind),
            (RemoteKind::Git { .. }, RemoteKind::Git { .. }) | (RemoteKind::Gist, RemoteKind::Gist)
        );
        same_kind && self.id == other.id
    }
}

/// Ways to look a session up.
#[derive(Debug, Clone)]
pub enum Lookup<'a> {
    Id(&'a SessionId),
    Name(&'a str),
    Path(&'a Path),
    ContentUri(&'a str),
    Remote(&'a RemoteRecord),
}

/// One open file.
pub struct Session {
    id: SessionId,
    /// Unique within one manager; tags background messages
    pub(crate) serial: u64,
    name: String,
    origin: Origin,
    pub(crate) buffer: EditSession,
    pub(crate) dirty: bool,
    pub(crate) read_only: bool,
    pub(crate) mirror_ready: bool,
    /// Mirror text from a save that came in before the first write landed
    pub(crate) deferred_mirror: Option<String>,
    pub(crate) check: DebounceTimer,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        serial: u64,
        name: String,
        origin: Origin,
        text: &str,
        dirty: bool,
        read_only: bool,
    ) -> Self {
        let mut buffer = EditSession::new(text);
        buffer.set_mode(mode_for_name(&name));
        Self {
            id,
            serial,
            name,
            origin,
            buffer,
            dirty,
            read_only,
            mirror_ready: false,
            deferred_mirror: None,
            check: DebounceTimer::new(),
        }
    }

    // ==================== Getters ====================

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn buffer(&self) -> &EditSession {
        &self.buffer
    }

    /// Returns true when the content diverged from the last mirrored content.
    pub fn is_unsaved(&self) -> bool {
        self.dirty
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns true once the initial mirror write finished.
    pub fn is_mirror_ready(&self) -> bool {
        self.mirror_ready
    }

    /// Returns the directory holding a local file.
    pub fn location(&self) -> Option<&Path> {
        self.origin.local_path().and_then(Path::parent)
    }

    /// Returns the icon name for the session's file type.
    pub fn icon(&self) -> &'static str {
        icon_for_name(&self.name)
    }

    /// Derives the header subtitle from the origin.
    pub fn subtitle(&self, max_len: usize) -> String {
        match &self.origin {
            Origin::Remote { record } => match &record.kind {
                RemoteKind::Git { repo, path } => format!("git • {}/{}", repo, path),
                RemoteKind::Gist => {
                    let id = &record.id;
                    let count = id.chars().count();
                    if count > 10 {
                        let tail: String = id.chars().skip(count - 7).collect();
                        format!("gist • ...{}", tail)
                    } else {
                        format!("gist • {}", id)
                    }
                }
            },
            Origin::Path { .. } | Origin::ContentUri { .. } => {
                let text = match (&self.origin, self.location()) {
                    (_, Some(dir)) => dir.display().to_string(),
                    (Origin::ContentUri { uri }, None) => uri.clone(),
                    _ => String::new(),
                };
                truncate_left(&text, max_len)
            }
            Origin::Untitled if self.read_only => "Read Only".to_string(),
            Origin::Untitled => "New file".to_string(),
        }
    }

    /// Returns true if the lookup matches this session.
    pub fn matches(&self, lookup: &Lookup<'_>) -> bool {
        match lookup {
            Lookup::Id(id) => &self.id == *id,
            Lookup::Name(name) => self.name == *name,
            Lookup::Path(path) => self.origin.local_path() == Some(*path),
            Lookup::ContentUri(uri) => {
                matches!(&self.origin, Origin::ContentUri { uri: own } if own.as_str() == *uri)
            }
            Lookup::Remote(record) => {
                matches!(&self.origin, Origin::Remote { record: own } if own.same_record(record))
            }
        }
    }

    /// Returns a plain snapshot for listing.
    pub fn summary(&self, active: bool, subtitle_max_len: usize) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            subtitle: self.subtitle(subtitle_max_len),
            icon: self.icon().to_string(),
            mode: self.buffer.mode().to_string(),
            unsaved: self.dirty,
            read_only: self.read_only,
            active,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_origin(&mut self, origin: Origin) {
        self.origin = origin;
    }
}

/// Immutable snapshot of a session, for UI lists and `--json` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub name: String,
    pub subtitle: String,
    pub icon: String,
    pub mode: String,
    pub unsaved: bool,
    pub read_only: bool,
    pub active: bool,
}

/// Returns the lowercased extension of a file name.
pub fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Detects the syntax mode from a file name.
pub fn mode_for_name(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("rs") => "rust",
        Some("py") => "python",
        Some("js" | "jsx" | "mjs") => "javascript",
        Some("ts" | "tsx") => "typescript",
        Some("html" | "htm") => "html",
        Some("css") => "css",
        Some("scss" | "sass") => "scss",
        Some("json") => "json",
        Some("yaml" | "yml") => "yaml",
        Some("toml") => "toml",
        Some("md" | "markdown") => "markdown",
        Some("c" | "h") => "c_cpp",
        Some("cpp" | "hpp" | "cc" | "cxx") => "c_cpp",
        Some("go") => "golang",
        Some("java") => "java",
        Some("rb") => "ruby",
        Some("sh" | "bash" | "zsh") => "sh",
        _ => "text",
    }
}

/// Returns the icon name for a file name.
pub fn icon_for_name(name: &str) -> &'static str {
    if name.starts_with(".git") {
        return "git";
    }
    match extension(name).as_deref() {
        Some("rs") => "rust",
        Some("py") => "python",
        Some("js" | "jsx" | "mjs") => "javascript",
        Some("ts" | "tsx") => "typescript",
        Some("html" | "htm") => "html",
        Some("css" | "scss" | "sass") => "css",
        Some("json") => "json",
        Some("toml") => "toml",
        Some("yaml" | "yml") => "yaml",
        Some("md" | "markdown") => "markdown",
        _ => "file",
    }
}

/// Keeps the last `max_len - 3` characters behind a `...` prefix.
fn truncate_left(text: &str, max_len: usize) -> String {
    let count = text.chars().count();
    if count <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let tail: String = text.chars().skip(count - keep).collect();
    format!("...{}", tail)
}
