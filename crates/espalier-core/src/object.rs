//! Object tree for Espalier.
//!
//! Provides the ownership model every widget lives in:
//! - Unique object identifiers via arena-based storage
//! - Parent-child ownership with reference-counted teardown
//! - Payload checkout so a node can run code that mutates its own tree
//!
//! # Key Types
//!
//! - [`ObjectId`] - Stable handle for a node
//! - [`ObjectTree`] - The arena holding nodes and their payloads
//! - [`ObjectError`] - Failures of tree operations
//!
//! # Ownership
//!
//! Every node carries a reference count. Being attached to a parent counts as
//! one reference; [`ObjectTree::retain`] adds external ones. When the count
//! reaches zero the node and every descendant that is not retained elsewhere
//! are destroyed, children before parents.
//!
//! # Checkout
//!
//! [`ObjectTree::checkout`] moves a node's payload out of the arena and retains
//! the node. Code holding the payload can then mutate the tree freely, including
//! detaching or destroying the node itself. [`ObjectTree::check_in`] puts the
//! payload back and drops the checkout reference, which destroys the node if
//! nothing else holds it.
//!
//! ```
//! use espalier_core::ObjectTree;
//!
//! let mut tree = ObjectTree::new();
//! let root = tree.insert("root");
//! let child = tree.insert_child(root, "child").unwrap();
//!
//! let payload = tree.checkout(child).unwrap();
//! // The child removes itself while it is being handled.
//! tree.remove_child(root, child).unwrap();
//! assert!(tree.contains(child));
//!
//! tree.check_in(child, payload).unwrap();
//! assert!(!tree.contains(child));
//! ```

use std::fmt;

use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a node in an [`ObjectTree`].
    ///
    /// `ObjectId`s stay valid while the tree changes around them and become
    /// invalid once the node is destroyed. A destroyed id is never reused for
    /// a different node.
    pub struct ObjectId;
}

impl ObjectId {
    /// Convert the ObjectId to a raw u64 value.
    ///
    /// The raw value can be converted back using [`ObjectId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create an ObjectId from a raw u64 value.
    ///
    /// This does not check whether the id exists in any tree.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Errors that can occur during object tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The object ID is invalid or has been destroyed.
    InvalidObjectId,
    /// Attempted to set an object as its own parent or ancestor.
    CircularParentage,
    /// The object is not a child of the given parent.
    NotAChild,
    /// The object's payload is currently checked out.
    CheckedOut,
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidObjectId => write!(f, "Invalid or destroyed object ID"),
            Self::CircularParentage => {
                write!(f, "Cannot set an object as its own parent or ancestor")
            }
            Self::NotAChild => write!(f, "Object is not a child of the given parent"),
            Self::CheckedOut => write!(f, "Object payload is checked out"),
        }
    }
}

impl std::error::Error for ObjectError {}

/// Result type for object operations.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

/// Internal data stored in the arena for each node.
struct Node<T> {
    /// Parent node (non-owning back reference).
    parent: Option<ObjectId>,
    /// Children in insertion order. Later entries are on top.
    children: Vec<ObjectId>,
    /// Parent ownership plus external retains plus active checkouts.
    ref_count: usize,
    /// `None` while checked out.
    payload: Option<T>,
}

impl<T> Node<T> {
    fn new(payload: T, parent: Option<ObjectId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            ref_count: 1,
            payload: Some(payload),
        }
    }
}

/// Arena of reference-counted nodes arranged as a forest.
///
/// Uses a `SlotMap` for stable ids and generational invalidation, so a stale
/// `ObjectId` from a destroyed node never aliases a live one.
pub struct ObjectTree<T> {
    nodes: SlotMap<ObjectId, Node<T>>,
}

impl<T> ObjectTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    // =========================================================================
    // Creation & Destruction
    // =========================================================================

    /// Insert a new root node.
    ///
    /// The caller holds the node's single reference and gives it up with
    /// [`release`](Self::release).
    pub fn insert(&mut self, payload: T) -> ObjectId {
        let id = self.nodes.insert(Node::new(payload, None));
        crate::espalier_trace!(target: targets::OBJECT, ?id, "inserted root object");
        id
    }

    /// Insert a new node as the last (topmost) child of `parent`.
    ///
    /// The parent owns the node's single reference.
    pub fn insert_child(&mut self, parent: ObjectId, payload: T) -> ObjectResult<ObjectId> {
        if !self.nodes.contains_key(parent) {
            return Err(ObjectError::InvalidObjectId);
        }
        let id = self.nodes.insert(Node::new(payload, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        crate::espalier_trace!(target: targets::OBJECT, ?id, ?parent, "inserted child object");
        Ok(id)
    }

    /// Attach `child` to `parent` as its topmost child.
    ///
    /// Moving a node between parents keeps its reference count. Attaching a
    /// detached node takes an additional reference on behalf of the parent.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> ObjectResult<()> {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return Err(ObjectError::InvalidObjectId);
        }
        if self.is_ancestor_of(child, parent) {
            return Err(ObjectError::CircularParentage);
        }

        let old_parent = self.nodes.get(child).and_then(|node| node.parent);
        match old_parent {
            Some(old) => {
                if let Some(old_node) = self.nodes.get_mut(old) {
                    old_node.children.retain(|&c| c != child);
                }
            }
            None => {
                if let Some(node) = self.nodes.get_mut(child) {
                    node.ref_count += 1;
                }
            }
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(child);
        }
        crate::espalier_trace!(target: targets::OBJECT, ?child, ?parent, ?old_parent, "attached object");
        Ok(())
    }

    /// Detach `child` from `parent` and drop the parent's reference.
    ///
    /// Returns `true` if this destroyed the child (and its unretained subtree).
    pub fn remove_child(&mut self, parent: ObjectId, child: ObjectId) -> ObjectResult<bool> {
        let node = self.nodes.get(child).ok_or(ObjectError::InvalidObjectId)?;
        if node.parent != Some(parent) {
            return Err(ObjectError::NotAChild);
        }
        self.detach(child);
        crate::espalier_trace!(target: targets::OBJECT, ?child, ?parent, "detached object");
        self.release(child)
    }

    /// Take an additional reference on a node.
    pub fn retain(&mut self, id: ObjectId) -> ObjectResult<()> {
        let node = self.nodes.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        node.ref_count += 1;
        Ok(())
    }

    /// Drop one reference on a node, destroying it when none remain.
    ///
    /// Returns `true` if the node was destroyed.
    ///
    /// Releasing a node whose count is already zero means some holder released
    /// twice. That cannot be recovered from, so the process aborts.
    pub fn release(&mut self, id: ObjectId) -> ObjectResult<bool> {
        let node = self.nodes.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        match node.ref_count {
            0 => fatal_ref_underflow(id),
            1 => {
                node.ref_count = 0;
                self.destroy(id);
                Ok(true)
            }
            _ => {
                node.ref_count -= 1;
                Ok(false)
            }
        }
    }

    /// Destroy a node whose last reference was just released.
    ///
    /// Children are released depth-first before the node itself is removed.
    /// A child that is still retained elsewhere survives as a detached root.
    #[tracing::instrument(skip(self), target = "espalier_core::object", level = "trace")]
    fn destroy(&mut self, id: ObjectId) {
        self.detach(id);

        let children = self
            .nodes
            .get_mut(id)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
            // A child id always refers to a live node here.
            let _ = self.release(child);
        }

        self.nodes.remove(id);
        crate::espalier_trace!(target: targets::OBJECT, ?id, "destroyed object");
    }

    /// Unlink a node from its parent without touching reference counts.
    fn detach(&mut self, id: ObjectId) {
        let parent = self.nodes.get_mut(id).and_then(|node| node.parent.take());
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                parent_node.children.retain(|&c| c != id);
            }
        }
    }

    // =========================================================================
    // Payload Access
    // =========================================================================

    /// Get a node's payload.
    ///
    /// Returns `None` if the node does not exist or is checked out.
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.nodes.get(id).and_then(|node| node.payload.as_ref())
    }

    /// Get a node's payload mutably.
    ///
    /// Returns `None` if the node does not exist or is checked out.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.nodes.get_mut(id).and_then(|node| node.payload.as_mut())
    }

    /// Move a node's payload out of the tree and retain the node.
    ///
    /// Every successful checkout must be paired with [`check_in`](Self::check_in).
    pub fn checkout(&mut self, id: ObjectId) -> ObjectResult<T> {
        let node = self.nodes.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        let payload = node.payload.take().ok_or(ObjectError::CheckedOut)?;
        node.ref_count += 1;
        Ok(payload)
    }

    /// Return a checked-out payload and release the checkout reference.
    ///
    /// Returns `true` if the node had been abandoned in the meantime and was
    /// destroyed now, dropping the payload.
    pub fn check_in(&mut self, id: ObjectId, payload: T) -> ObjectResult<bool> {
        let node = self.nodes.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        if node.payload.is_some() {
            return Err(ObjectError::InvalidObjectId);
        }
        node.payload = Some(payload);
        self.release(id)
    }

    /// Check whether a node's payload is checked out.
    pub fn is_checked_out(&self, id: ObjectId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|node| node.payload.is_none())
    }

    // =========================================================================
    // Structure Queries
    // =========================================================================

    /// Check if a node exists.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current reference count of a node.
    pub fn ref_count(&self, id: ObjectId) -> ObjectResult<usize> {
        self.nodes
            .get(id)
            .map(|node| node.ref_count)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        self.nodes
            .get(id)
            .map(|node| node.parent)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Get the children of a node, bottom to top.
    pub fn children(&self, id: ObjectId) -> ObjectResult<&[ObjectId]> {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Position of a node among its siblings.
    pub fn child_index(&self, id: ObjectId) -> ObjectResult<Option<usize>> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        Ok(self.children(parent)?.iter().position(|&c| c == id))
    }

    /// All ancestors of a node, nearest first.
    pub fn ancestors(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        let mut result = Vec::new();
        let mut current = self.parent(id)?;
        while let Some(ancestor) = current {
            result.push(ancestor);
            current = self.nodes.get(ancestor).and_then(|node| node.parent);
        }
        Ok(result)
    }

    /// Check if `potential_ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_of(&self, potential_ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|node| node.parent);
        }
        false
    }

    /// Root of the tree containing `id`.
    pub fn root_of(&self, id: ObjectId) -> ObjectResult<ObjectId> {
        Ok(self.ancestors(id)?.last().copied().unwrap_or(id))
    }

    /// Node followed by its descendants in pre-order, bottom children first.
    pub fn depth_first_preorder(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        if !self.nodes.contains_key(id) {
            return Err(ObjectError::InvalidObjectId);
        }
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(result)
    }

    // =========================================================================
    // Z-Order
    // =========================================================================

    /// Raise a node to the top of its siblings.
    pub fn raise(&mut self, id: ObjectId) -> ObjectResult<()> {
        let parent = self.parent(id)?;
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent_node.children.retain(|&c| c != id);
            parent_node.children.push(id);
        }
        Ok(())
    }

    /// Lower a node to the bottom of its siblings.
    pub fn lower(&mut self, id: ObjectId) -> ObjectResult<()> {
        let parent = self.parent(id)?;
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent_node.children.retain(|&c| c != id);
            parent_node.children.insert(0, id);
        }
        Ok(())
    }
}

impl<T> Default for ObjectTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectTree")
            .field("len", &self.nodes.len())
            .finish()
    }
}

#[cold]
fn fatal_ref_underflow(id: ObjectId) -> ! {
    crate::espalier_error!(target: targets::OBJECT, ?id, "object released more often than retained");
    std::process::abort()
}
