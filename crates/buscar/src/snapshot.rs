//! Rendering search roots for error diagnostics.
//!
//! Every missing/multiple error carries a pretty-printed, length-limited
//! snapshot of the subtree that was searched. Rendering is controlled by
//! explicit [`SnapshotOptions`] rather than ambient host sniffing;
//! [`OutputMode::from_env`] exists for call sites that want the
//! conventional environment toggles.

use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId, Scope};

/// Default snapshot length limit in characters
pub const DEFAULT_PRINT_LIMIT: usize = 7000;

/// Environment variable overriding the snapshot length limit
pub const PRINT_LIMIT_ENV: &str = "BUSCAR_PRINT_LIMIT";

/// Environment variable suppressing snapshots entirely
pub const NO_SNAPSHOT_ENV: &str = "BUSCAR_NO_SNAPSHOT";

/// How a snapshot is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// ANSI-highlighted output (interactive terminals)
    #[default]
    Ansi,
    /// Plain text without highlighting (NO_COLOR env, CI, browser-like hosts)
    Plain,
    /// No snapshot output at all (sandboxed runners)
    Suppressed,
}

impl OutputMode {
    /// Detect output mode from environment
    #[must_use]
    pub fn from_env() -> Self {
        if std::env::var(NO_SNAPSHOT_ENV).is_ok() {
            Self::Suppressed
        } else if std::env::var("NO_COLOR").is_ok() || std::env::var("CI").is_ok() {
            Self::Plain
        } else {
            Self::Ansi
        }
    }
}

/// ANSI escape codes for snapshot highlighting
pub mod ansi {
    /// Reset all attributes
    pub const RESET: &str = "\x1b[0m";
    /// Dim text (punctuation)
    pub const DIM: &str = "\x1b[2m";
    /// Tag names
    pub const TAG: &str = "\x1b[36m";
    /// Attribute names
    pub const ATTR: &str = "\x1b[33m";
}

/// Options for snapshot rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotOptions {
    /// Maximum rendered length in characters
    pub limit: usize,
    /// Rendering mode
    pub mode: OutputMode,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PRINT_LIMIT,
            mode: OutputMode::default(),
        }
    }
}

impl SnapshotOptions {
    /// Create options with defaults (7000 chars, ANSI)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve options from the environment (`BUSCAR_PRINT_LIMIT`,
    /// `BUSCAR_NO_SNAPSHOT`, `NO_COLOR`, `CI`)
    #[must_use]
    pub fn from_env() -> Self {
        let limit = std::env::var(PRINT_LIMIT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PRINT_LIMIT);
        Self {
            limit,
            mode: OutputMode::from_env(),
        }
    }

    /// Set the length limit
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the rendering mode
    #[must_use]
    pub const fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Anything a query error can attach a rendered snapshot of.
///
/// Implemented by [`Document`] and [`Scope`]; custom root types used with
/// the generic combinators implement this to opt into diagnostics.
pub trait SnapshotTarget {
    /// Render this search root per `options`. `Suppressed` mode must
    /// return an empty string.
    fn render_snapshot(&self, options: &SnapshotOptions) -> String;
}

impl SnapshotTarget for Scope<'_> {
    fn render_snapshot(&self, options: &SnapshotOptions) -> String {
        if options.mode == OutputMode::Suppressed {
            return String::new();
        }
        let mut out = String::new();
        render_element(self.document(), self.root(), 0, options.mode, &mut out);
        truncate(out, options.limit)
    }
}

impl SnapshotTarget for Document {
    fn render_snapshot(&self, options: &SnapshotOptions) -> String {
        self.scope().render_snapshot(options)
    }
}

fn paint(text: &str, color: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Ansi => format!("{color}{text}{}", ansi::RESET),
        _ => text.to_string(),
    }
}

fn render_element(doc: &Document, id: NodeId, depth: usize, mode: OutputMode, out: &mut String) {
    let element = doc.element(id);
    let pad = "  ".repeat(depth);
    let tag = paint(&element.tag, ansi::TAG, mode);
    let mut attrs = String::new();
    for (name, value) in &element.attributes {
        attrs.push(' ');
        attrs.push_str(&paint(name, ansi::ATTR, mode));
        attrs.push_str(&format!("=\"{value}\""));
    }

    let children = doc.children(id);
    if children.is_empty() && element.text.is_none() {
        out.push_str(&format!("{pad}<{tag}{attrs} />\n"));
        return;
    }

    out.push_str(&format!("{pad}<{tag}{attrs}>\n"));
    if let Some(text) = &element.text {
        out.push_str(&format!("{pad}  {text}\n"));
    }
    for child in children {
        render_element(doc, *child, depth + 1, mode, out);
    }
    out.push_str(&format!("{pad}</{tag}>\n"));
}

fn truncate(rendered: String, limit: usize) -> String {
    if rendered.chars().count() <= limit {
        return rendered;
    }
    let mut out: String = rendered.chars().take(limit).collect();
    out.push_str("...");
    out
}
