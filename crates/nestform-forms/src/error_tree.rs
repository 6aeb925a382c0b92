//! Ordered, nested validation error trees.
//!
//! An [`ErrorTree`] maps field names and list indexes to either a list of
//! messages or a nested tree. Entry order is significant: the validation
//! pipeline keeps entries in field declaration order, then index order, so
//! two runs over the same input produce identical trees.
//!
//! When a key receives both messages and nested errors, the messages win:
//! an error on the container itself makes the details underneath moot.

use std::fmt;

use serde::{Serialize, Serializer};

/// A key in an error tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKey {
    /// A named field.
    Field(String),
    /// A position in a list field.
    Index(usize),
}

impl ErrorKey {
    /// Shorthand for [`ErrorKey::Field`].
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for ErrorKey {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<usize> for ErrorKey {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}

/// The value stored under an [`ErrorKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorNode {
    /// Messages for a leaf field.
    Messages(Vec<String>),
    /// Errors of a nested object or list.
    Nested(ErrorTree),
}

impl ErrorNode {
    /// Returns the messages of a leaf node.
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            Self::Messages(msgs) => Some(msgs),
            Self::Nested(_) => None,
        }
    }

    /// Returns the tree of a nested node.
    pub const fn tree(&self) -> Option<&ErrorTree> {
        match self {
            Self::Nested(tree) => Some(tree),
            Self::Messages(_) => None,
        }
    }

    /// Collects every message under this node, depth first.
    pub fn flatten(&self) -> Vec<String> {
        match self {
            Self::Messages(msgs) => msgs.clone(),
            Self::Nested(tree) => tree.iter().flat_map(|(_, node)| node.flatten()).collect(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Messages(msgs) => serde_json::json!(msgs),
            Self::Nested(tree) => tree.to_json(),
        }
    }

    fn absorb(&mut self, incoming: Self) {
        if matches!((&*self, &incoming), (Self::Nested(_), Self::Messages(_))) {
            *self = incoming;
            return;
        }
        match (self, incoming) {
            (Self::Messages(existing), Self::Messages(more)) => existing.extend(more),
            (Self::Nested(existing), Self::Nested(more)) => existing.merge(more),
            _ => {}
        }
    }
}

/// An ordered tree of field and index keyed errors.
///
/// # Examples
///
/// ```
/// use nestform_forms::error_tree::{ErrorKey, ErrorTree};
///
/// let mut tree = ErrorTree::new();
/// tree.push_message(&[ErrorKey::field("bookmarks"), ErrorKey::Index(0), ErrorKey::field("url")], "required");
/// assert_eq!(
///     tree.to_json(),
///     serde_json::json!({"bookmarks": {"0": {"url": ["required"]}}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorTree {
    entries: Vec<(ErrorKey, ErrorNode)>,
}

impl ErrorTree {
    /// Creates an empty tree.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns `true` if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over top-level entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&ErrorKey, &ErrorNode)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Returns `true` if the key has an entry.
    pub fn contains_key(&self, key: &ErrorKey) -> bool {
        self.get(key).is_some()
    }

    /// Returns the node stored under a key.
    pub fn get(&self, key: &ErrorKey) -> Option<&ErrorNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the node stored under a field name.
    pub fn field(&self, name: &str) -> Option<&ErrorNode> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, ErrorKey::Field(f) if f == name))
            .map(|(_, v)| v)
    }

    /// Returns the leaf messages of a field, or an empty slice.
    pub fn messages_for(&self, name: &str) -> &[String] {
        self.field(name).and_then(ErrorNode::messages).unwrap_or(&[])
    }

    /// Follows a path of keys.
    pub fn dig(&self, path: &[ErrorKey]) -> Option<&ErrorNode> {
        let (first, rest) = path.split_first()?;
        let node = self.get(first)?;
        if rest.is_empty() {
            Some(node)
        } else {
            node.tree()?.dig(rest)
        }
    }

    /// Returns a copy of the nested tree under a key, or an empty tree when
    /// the key is absent or holds plain messages.
    pub fn subtree(&self, key: &ErrorKey) -> Self {
        self.get(key)
            .and_then(ErrorNode::tree)
            .cloned()
            .unwrap_or_default()
    }

    /// Adds a message at the end of a path, creating nested levels as needed.
    pub fn push_message(&mut self, path: &[ErrorKey], message: impl Into<String>) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.insert(first.clone(), ErrorNode::Messages(vec![message.into()]));
        } else {
            let mut nested = Self::new();
            nested.push_message(rest, message);
            self.insert(first.clone(), ErrorNode::Nested(nested));
        }
    }

    /// Inserts a node, merging with an existing entry for the same key.
    pub fn insert(&mut self, key: ErrorKey, node: ErrorNode) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            existing.absorb(node);
        } else {
            self.entries.push((key, node));
        }
    }

    /// Replaces the node under a key, keeping its position.
    pub fn replace(&mut self, key: ErrorKey, node: ErrorNode) {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            *existing = node;
        } else {
            self.entries.push((key, node));
        }
    }

    /// Merges every entry of another tree into this one.
    pub fn merge(&mut self, other: Self) {
        for (key, node) in other.entries {
            self.insert(key, node);
        }
    }

    /// Orders top-level entries: fields by their position in `fields`
    /// (unknown names last, in their current order), then indexes ascending.
    pub fn sort_by_fields(&mut self, fields: &[&str]) {
        self.entries.sort_by_key(|(key, _)| match key {
            ErrorKey::Field(name) => (
                0,
                fields.iter().position(|f| f == name).unwrap_or(usize::MAX),
            ),
            ErrorKey::Index(idx) => (1, *idx),
        });
    }

    /// Renders the tree as JSON; index keys become decimal strings.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
