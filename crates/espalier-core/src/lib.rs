//! Core systems for Espalier.
//!
//! This crate provides the foundation the widget toolkit is built on:
//!
//! - **Object Tree**: Arena-backed parent/child ownership with reference counts
//! - **Checkout**: Temporarily moving a node's payload out so it can mutate its own tree
//! - **Logging**: Tracing targets, span names and tree visualization
//!
//! # Example
//!
//! ```
//! use espalier_core::ObjectTree;
//!
//! let mut tree = ObjectTree::new();
//! let window = tree.insert("window");
//! let button = tree.insert_child(window, "button").unwrap();
//!
//! assert_eq!(tree.parent(button).unwrap(), Some(window));
//!
//! // Releasing the root tears down the whole tree.
//! tree.release(window).unwrap();
//! assert!(tree.is_empty());
//! ```

pub mod logging;
pub mod object;

pub use logging::{PerfSpan, TreeFormatter, TreeStyle, format_tree};
pub use object::{ObjectError, ObjectId, ObjectResult, ObjectTree};

#[doc(hidden)]
pub use tracing as __tracing;
