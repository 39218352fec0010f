//! Logging and debugging facilities for Espalier.
//!
//! This module provides:
//! - Target and span names for filtering `tracing` output per subsystem
//! - Debug visualization for object trees
//! - A performance span guard for profiling
//!
//! Espalier never installs a subscriber itself. Applications pick one:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("espalier=debug,espalier_core::object=trace")
//!     .init();
//! ```

use std::fmt::Write as FmtWrite;

use crate::object::{ObjectId, ObjectResult, ObjectTree};

/// Span names used throughout Espalier for tracing.
pub mod span_names {
    /// Input dispatch span.
    pub const DISPATCH: &str = "espalier::dispatch";
    /// Layout pass span.
    pub const LAYOUT: &str = "espalier::layout";
    /// Paint pass span.
    pub const PAINT: &str = "espalier::paint";
    /// Object lifecycle span.
    pub const OBJECT: &str = "espalier::object";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "espalier_core";
    /// Object tree target.
    pub const OBJECT: &str = "espalier_core::object";
    /// Input routing target.
    pub const DISPATCH: &str = "espalier::dispatch";
    /// Focus changes target.
    pub const FOCUS: &str = "espalier::focus";
    /// Layout target.
    pub const LAYOUT: &str = "espalier::layout";
    /// Painting and render cache target.
    pub const PAINT: &str = "espalier::paint";
    /// Widget state machines target.
    pub const WIDGETS: &str = "espalier::widgets";
    /// Text box editing target.
    pub const TEXT_BOX: &str = "espalier::text_box";
    /// Background rasterization target.
    pub const RASTER: &str = "espalier_render::raster";
    /// Theme loading target.
    pub const THEME: &str = "espalier::theme";
}

/// Style options for object tree visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Renders an [`ObjectTree`] subtree as indented text.
///
/// The caller supplies a label for each payload; checked-out nodes are shown
/// as `(checked out)`.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    style: TreeStyle,
    show_ids: bool,
    show_ref_counts: bool,
}

impl TreeFormatter {
    /// Create a formatter with Unicode branches and no ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the branch style.
    pub fn with_style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }

    /// Append each node's id.
    pub fn with_ids(mut self, show: bool) -> Self {
        self.show_ids = show;
        self
    }

    /// Append each node's reference count.
    pub fn with_ref_counts(mut self, show: bool) -> Self {
        self.show_ref_counts = show;
        self
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree<T, F>(
        &self,
        tree: &ObjectTree<T>,
        root: ObjectId,
        label: F,
    ) -> ObjectResult<String>
    where
        F: Fn(&T) -> String,
    {
        let mut output = String::new();
        let mut prefix = String::new();
        self.format_node(tree, root, &label, &mut prefix, None, &mut output)?;
        Ok(output)
    }

    fn format_node<T, F>(
        &self,
        tree: &ObjectTree<T>,
        id: ObjectId,
        label: &F,
        prefix: &mut String,
        is_last: Option<bool>,
        output: &mut String,
    ) -> ObjectResult<()>
    where
        F: Fn(&T) -> String,
    {
        let (tee, corner, bar) = match self.style {
            TreeStyle::Ascii => ("+-- ", "`-- ", "|   "),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}   "),
        };

        output.push_str(prefix);
        match is_last {
            Some(true) => output.push_str(corner),
            Some(false) => output.push_str(tee),
            None => {}
        }

        match tree.get(id) {
            Some(payload) => output.push_str(&label(payload)),
            None => output.push_str("(checked out)"),
        }
        // Writing into a String cannot fail.
        if self.show_ids {
            let _ = write!(output, " [{:?}]", id);
        }
        if self.show_ref_counts {
            let _ = write!(output, " rc={}", tree.ref_count(id)?);
        }
        output.push('\n');

        let saved = prefix.len();
        match is_last {
            Some(true) => prefix.push_str("    "),
            Some(false) => prefix.push_str(bar),
            None => {}
        }
        let children = tree.children(id)?;
        for (index, &child) in children.iter().enumerate() {
            let last = index + 1 == children.len();
            self.format_node(tree, child, label, prefix, Some(last), output)?;
        }
        prefix.truncate(saved);
        Ok(())
    }
}

/// Format a subtree with the default [`TreeFormatter`].
pub fn format_tree<T, F>(tree: &ObjectTree<T>, root: ObjectId, label: F) -> ObjectResult<String>
where
    F: Fn(&T) -> String,
{
    TreeFormatter::new().format_subtree(tree, root, label)
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "espalier::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros. Without an explicit
/// `target:` they log under [`targets::CORE`].
///
/// ```
/// use espalier_core::logging::targets;
/// use espalier_core::{espalier_debug, espalier_trace, espalier_warn};
///
/// let id = 7;
/// espalier_trace!(id, "default target");
/// espalier_debug!(target: targets::OBJECT, id, "object target");
/// espalier_warn!("retrying {}", id);
/// ```
#[macro_export]
macro_rules! espalier_trace {
    (target: $target:expr, $($arg:tt)*) => {
        $crate::__tracing::trace!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::__tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! espalier_debug {
    (target: $target:expr, $($arg:tt)*) => {
        $crate::__tracing::debug!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! espalier_warn {
    (target: $target:expr, $($arg:tt)*) => {
        $crate::__tracing::warn!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::__tracing::warn!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! espalier_error {
    (target: $target:expr, $($arg:tt)*) => {
        $crate::__tracing::error!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        $crate::__tracing::error!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ObjectTree<&'static str>, ObjectId) {
        let mut tree = ObjectTree::new();
        let root = tree.insert("window");
        let panel = tree.insert_child(root, "panel").unwrap();
        tree.insert_child(panel, "ok").unwrap();
        tree.insert_child(root, "cancel").unwrap();
        (tree, root)
    }

    #[test]
    fn test_format_unicode() {
        let (tree, root) = sample();
        let output = format_tree(&tree, root, |s| s.to_string()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "window");
        assert!(lines[1].ends_with("panel"));
        assert!(lines[2].ends_with("ok"));
        assert!(lines[3].starts_with("\u{2514}"));
    }

    #[test]
    fn test_format_ascii_with_ref_counts() {
        let (mut tree, root) = sample();
        tree.retain(root).unwrap();
        let output = TreeFormatter::new()
            .with_style(TreeStyle::Ascii)
            .with_ref_counts(true)
            .format_subtree(&tree, root, |s| s.to_string())
            .unwrap();
        assert!(output.starts_with("window rc=2\n"));
        assert!(output.contains("+-- panel rc=1"));
        assert!(output.contains("|   `-- ok rc=1"));
        assert!(output.contains("`-- cancel rc=1"));
    }

    #[test]
    fn test_format_checked_out_node() {
        let (mut tree, root) = sample();
        let payload = tree.checkout(root).unwrap();
        let output = TreeFormatter::new()
            .format_subtree(&tree, root, |s| s.to_string())
            .unwrap();
        assert!(output.starts_with("(checked out)"));
        tree.check_in(root, payload).unwrap();
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
