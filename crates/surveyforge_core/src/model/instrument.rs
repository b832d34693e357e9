//! Instrument hierarchy model and tree mutations.
//!
//! # Responsibility
//! - Define the three-level instrument node shape and its serialized form.
//! - Provide insert/remove/rename operations that preserve level linkage.
//!
//! # Invariants
//! - `node.level == parent.level + 1`; root sections have no parent.
//! - Tree depth never exceeds three levels.
//! - A node code is assigned at insertion and never changes afterwards,
//!   even when earlier siblings are deleted (no compaction).
//! - Child order is insertion order and defines display order.

use crate::model::code::{instrument_code, next_sibling_index};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable instrument node identifier.
pub type NodeId = Uuid;

/// Hierarchy level of an instrument node.
///
/// Serialized as its numeric value (`1..=3`) to match the external schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeLevel {
    /// Root-level section.
    Section,
    /// Sub-section under a section.
    SubSection,
    /// Leaf grouping under a sub-section.
    Grouping,
}

impl NodeLevel {
    /// Numeric level as stored externally.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Section => 1,
            Self::SubSection => 2,
            Self::Grouping => 3,
        }
    }

    /// Level required of this node's parent, `None` for root sections.
    pub fn parent_level(self) -> Option<Self> {
        match self {
            Self::Section => None,
            Self::SubSection => Some(Self::Section),
            Self::Grouping => Some(Self::SubSection),
        }
    }

    /// Level of children this node may hold, `None` for leaf groupings.
    pub fn child_level(self) -> Option<Self> {
        match self {
            Self::Section => Some(Self::SubSection),
            Self::SubSection => Some(Self::Grouping),
            Self::Grouping => None,
        }
    }
}

impl TryFrom<u8> for NodeLevel {
    type Error = TreeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Section),
            2 => Ok(Self::SubSection),
            3 => Ok(Self::Grouping),
            other => Err(TreeError::LevelOutOfRange(other)),
        }
    }
}

impl From<NodeLevel> for u8 {
    fn from(value: NodeLevel) -> Self {
        value.as_u8()
    }
}

impl Display for NodeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Errors from instrument tree mutations.
///
/// Every variant leaves the tree unchanged; callers surface the rejection
/// to the user and retry with corrected input.
#[derive(Debug, PartialEq, Eq)]
pub enum TreeError {
    /// Numeric level outside `1..=3`.
    LevelOutOfRange(u8),
    /// A root section was given a parent.
    RootWithParent(NodeId),
    /// A node below root level was inserted without a parent.
    MissingParent(NodeLevel),
    /// Referenced parent id does not exist anywhere in the tree.
    ParentNotFound(NodeId),
    /// Parent exists but sits at the wrong level for the inserted node.
    LevelMismatch {
        level: NodeLevel,
        parent_level: NodeLevel,
    },
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelOutOfRange(value) => {
                write!(f, "instrument level must be 1..=3, got {value}")
            }
            Self::RootWithParent(id) => {
                write!(f, "level-1 section must not have a parent, got parent {id}")
            }
            Self::MissingParent(level) => {
                write!(f, "level-{level} node requires a parent node")
            }
            Self::ParentNotFound(id) => write!(f, "parent node not found: {id}"),
            Self::LevelMismatch {
                level,
                parent_level,
            } => write!(
                f,
                "level-{level} node cannot be inserted under level-{parent_level} parent"
            ),
        }
    }
}

impl Error for TreeError {}

/// Serialized instrument node: the nested shape stored in survey documents
/// and exchanged with the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentNode {
    /// Stable node id.
    pub id: NodeId,
    /// Hierarchical display code, e.g. `L1001.201`.
    pub code: String,
    /// Free-text label, mutable via rename.
    pub name: String,
    /// Hierarchy level.
    pub level: NodeLevel,
    /// Owning node id, absent for root sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    /// Child nodes in display order.
    #[serde(default)]
    pub children: Vec<InstrumentNode>,
}

/// One node record inside the arena.
///
/// `code` stays private so the stability invariant is enforced by the type:
/// there is no mutable access to a code after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    id: NodeId,
    code: String,
    name: String,
    level: NodeLevel,
    parent_id: Option<NodeId>,
    child_ids: Vec<NodeId>,
}

impl NodeRecord {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> NodeLevel {
        self.level
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    /// Child node ids in display order.
    pub fn child_ids(&self) -> &[NodeId] {
        &self.child_ids
    }
}

/// Arena-backed instrument tree.
///
/// Nodes live in a flat id-to-record map with ordered child-id lists; the
/// nested [`InstrumentNode`] shape is reconstructed on demand. This keeps
/// subtree removal and lookups free of ownership juggling while the
/// serialized document keeps the nested external schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<InstrumentNode>", into = "Vec<InstrumentNode>")]
pub struct InstrumentTree {
    nodes: HashMap<NodeId, NodeRecord>,
    roots: Vec<NodeId>,
}

impl InstrumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new node and returns its id.
    ///
    /// The code is generated from the level, the parent code and the highest
    /// code currently held by a sibling, so deleted codes are never handed
    /// out again. Rejections leave the tree untouched.
    ///
    /// # Errors
    /// - [`TreeError::RootWithParent`] when a section carries a parent id.
    /// - [`TreeError::MissingParent`] when a sub-level node has none.
    /// - [`TreeError::ParentNotFound`] when the parent id is unknown.
    /// - [`TreeError::LevelMismatch`] when `level != parent.level + 1`.
    pub fn insert_node(
        &mut self,
        level: NodeLevel,
        parent_id: Option<NodeId>,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let code = match (level.parent_level(), parent_id) {
            (None, Some(parent)) => return Err(TreeError::RootWithParent(parent)),
            (None, None) => {
                let index = next_sibling_index(level, self.sibling_codes(&self.roots));
                instrument_code(level, None, index)
            }
            (Some(_), None) => return Err(TreeError::MissingParent(level)),
            (Some(required), Some(parent)) => {
                let record = self
                    .nodes
                    .get(&parent)
                    .ok_or(TreeError::ParentNotFound(parent))?;
                if record.level != required {
                    return Err(TreeError::LevelMismatch {
                        level,
                        parent_level: record.level,
                    });
                }
                let index = next_sibling_index(level, self.sibling_codes(&record.child_ids));
                instrument_code(level, Some(&record.code), index)
            }
        };

        let id = Uuid::new_v4();
        self.nodes.insert(
            id,
            NodeRecord {
                id,
                code,
                name: name.into(),
                level,
                parent_id,
                child_ids: Vec::new(),
            },
        );
        match parent_id {
            Some(parent) => {
                if let Some(record) = self.nodes.get_mut(&parent) {
                    record.child_ids.push(id);
                }
            }
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Removes a node and its whole subtree.
    ///
    /// Returns the ids of all removed nodes in depth-first order; an unknown
    /// id is a no-op returning an empty vec. Sibling codes are deliberately
    /// left as they are.
    pub fn remove_node(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(record) = self.nodes.get(&id) else {
            return Vec::new();
        };

        match record.parent_id {
            Some(parent) => {
                if let Some(parent_record) = self.nodes.get_mut(&parent) {
                    parent_record.child_ids.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        let removed = self.subtree_ids(id);
        for node_id in &removed {
            self.nodes.remove(node_id);
        }
        removed
    }

    /// Replaces a node's label. Returns `false` as a no-op for unknown ids.
    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(record) => {
                record.name = name.into();
                true
            }
            None => false,
        }
    }

    fn sibling_codes<'a>(&'a self, ids: &'a [NodeId]) -> impl Iterator<Item = &'a str> {
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|record| record.code.as_str())
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Root section ids in display order.
    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of `id` and all its transitive descendants, depth-first.
    ///
    /// Unknown ids yield an empty vec. Termination needs no visited set:
    /// nodes are only ever created under exactly one existing parent, so the
    /// structure is acyclic by construction.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut stack = match self.nodes.contains_key(&id) {
            true => vec![id],
            false => return collected,
        };
        while let Some(current) = stack.pop() {
            if let Some(record) = self.nodes.get(&current) {
                collected.push(current);
                for child in record.child_ids.iter().rev() {
                    stack.push(*child);
                }
            }
        }
        collected
    }

    /// Depth-first pre-order walk over all records, roots first.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Rebuilds the nested serialized shape by recursive lookup.
    pub fn to_nested(&self) -> Vec<InstrumentNode> {
        self.roots
            .iter()
            .filter_map(|root| self.nested_node(*root))
            .collect()
    }

    fn nested_node(&self, id: NodeId) -> Option<InstrumentNode> {
        let record = self.nodes.get(&id)?;
        Some(InstrumentNode {
            id: record.id,
            code: record.code.clone(),
            name: record.name.clone(),
            level: record.level,
            parent_id: record.parent_id,
            children: record
                .child_ids
                .iter()
                .filter_map(|child| self.nested_node(*child))
                .collect(),
        })
    }

    fn absorb_nested(&mut self, node: InstrumentNode, parent_id: Option<NodeId>) {
        let InstrumentNode {
            id,
            code,
            name,
            level,
            children,
            ..
        } = node;
        self.nodes.insert(
            id,
            NodeRecord {
                id,
                code,
                name,
                level,
                // Structural position wins over whatever the payload claimed.
                parent_id,
                child_ids: children.iter().map(|child| child.id).collect(),
            },
        );
        match parent_id {
            Some(_) => {}
            None => self.roots.push(id),
        }
        for child in children {
            self.absorb_nested(child, Some(id));
        }
    }
}

impl From<Vec<InstrumentNode>> for InstrumentTree {
    fn from(structure: Vec<InstrumentNode>) -> Self {
        let mut tree = Self::new();
        for root in structure {
            tree.absorb_nested(root, None);
        }
        tree
    }
}

impl From<InstrumentTree> for Vec<InstrumentNode> {
    fn from(tree: InstrumentTree) -> Self {
        tree.to_nested()
    }
}

pub struct TreeIter<'a> {
    tree: &'a InstrumentTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a NodeRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(record) = self.tree.nodes.get(&id) {
                for child in record.child_ids.iter().rev() {
                    self.stack.push(*child);
                }
                return Some(record);
            }
        }
        None
    }
}
