//! Syntax trees handed to rules.
//!
//! A tree is an arena of nodes. Inner nodes have a kind and children, tokens
//! (leaves) have a kind and text. Rendering all tokens in order gives back
//! the current source text, so trees rewritten by correctable rules can be
//! written out again.
//!
//! Positions are computed lazily from the token texts and dropped on every
//! mutation, so a rule always sees locations that match the current text.

use smallvec::SmallVec;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::TreeError;
use crate::location::{Position, Span};
use crate::suppression::SuppressionMarker;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: String,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    markers: SmallVec<[SuppressionMarker; 1]>,
}

impl NodeData {
    fn new(kind: &str, text: Option<String>, parent: Option<NodeId>) -> Self {
        Self {
            kind: kind.to_string(),
            text,
            parent,
            children: Vec::new(),
            markers: SmallVec::new(),
        }
    }
}

#[derive(Debug)]
pub struct SyntaxTree {
    path: PathBuf,
    nodes: Vec<NodeData>,
    spans: OnceLock<Vec<Option<Span>>>,
    /// Closest node at or above each node that carries markers.
    marked: OnceLock<Vec<Option<NodeId>>>,
    revision: u64,
    journal: Option<Vec<Undo>>,
}

impl Clone for SyntaxTree {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            nodes: self.nodes.clone(),
            spans: OnceLock::new(),
            marked: OnceLock::new(),
            revision: self.revision,
            journal: None,
        }
    }
}

/// How to take back one edit made after a [Checkpoint].
#[derive(Debug)]
enum Undo {
    Text { id: NodeId, text: String },
    Removed { id: NodeId, parent: NodeId, index: usize },
    Inserted { parent: NodeId, index: usize },
    Marker { id: NodeId },
}

/// State of a tree before a correcting rule runs, see [SyntaxTree::checkpoint].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Checkpoint {
    len: usize,
    revision: u64,
}

impl SyntaxTree {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].children.is_empty()
    }

    /// Number of mutations applied since the tree was built.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_modified(&self) -> bool {
        self.revision > 0
    }

    pub fn kind(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].kind
    }

    /// Text of a token, `None` for inner nodes.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.index()].text.as_deref()
    }

    pub fn is_token(&self, id: NodeId) -> bool {
        self.nodes[id.index()].text.is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn markers(&self, id: NodeId) -> &[SuppressionMarker] {
        &self.nodes[id.index()].markers
    }

    /// `id` followed by its parent, grand-parent, up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&node| self.parent(node))
    }

    /// Nodes carrying suppression markers, from `id` outwards. Same order
    /// as [SyntaxTree::ancestors] with the unmarked nodes skipped.
    pub fn marked_scopes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let marked = self.marked.get_or_init(|| self.compute_marked());
        std::iter::successors(marked[id.index()], move |&scope| {
            self.parent(scope).and_then(|parent| marked[parent.index()])
        })
    }

    fn compute_marked(&self) -> Vec<Option<NodeId>> {
        // Parents are always created before their children, so one pass in
        // creation order sees every parent first.
        let mut marked: Vec<Option<NodeId>> = Vec::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            let closest = if node.markers.is_empty() {
                node.parent.and_then(|parent| marked.get(parent.index()).copied().flatten())
            } else {
                Some(NodeId(index as u32))
            };
            marked.push(closest);
        }
        marked
    }

    /// `id` and every node below it, in source order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants { tree: self, stack: vec![id] }
    }

    /// Tokens below `id`, in source order.
    pub fn tokens(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(id).filter(move |&node| self.is_token(node))
    }

    /// Whether `id` can be reached from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).last() == Some(self.root())
    }

    /// Next sibling in the parent's children, if any.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&child| child == id)?;
        siblings.get(index + 1).copied()
    }

    /// Current text of the subtree rooted at `id`.
    pub fn node_text(&self, id: NodeId) -> String {
        self.tokens(id)
            .filter_map(|token| self.text(token))
            .collect()
    }

    /// Current text of the whole tree.
    pub fn render(&self) -> String {
        self.node_text(self.root())
    }

    /// Span of `id` in the current text, `None` for detached nodes.
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.spans.get_or_init(|| self.compute_spans())[id.index()]
    }

    fn compute_spans(&self) -> Vec<Option<Span>> {
        // Blocks nest as deep as the source does, so walk with an explicit
        // stack. Each frame is an open node and the index of its next child.
        struct Frame {
            id: NodeId,
            next: usize,
            start: Position,
            start_offset: usize,
        }

        let mut spans = vec![None; self.nodes.len()];
        let mut position = Position::new(1, 1);
        let mut offset = 0;
        let mut stack = vec![Frame { id: self.root(), next: 0, start: position, start_offset: offset }];

        while let Some(frame) = stack.last_mut() {
            match self.text(frame.id) {
                Some(text) => {
                    position.advance(text);
                    offset += text.chars().count();
                }
                None => {
                    if let Some(&child) = self.children(frame.id).get(frame.next) {
                        frame.next += 1;
                        stack.push(Frame { id: child, next: 0, start: position, start_offset: offset });
                        continue;
                    }
                }
            }
            if let Some(done) = stack.pop() {
                spans[done.id.index()] = Some(Span {
                    start: done.start,
                    end: position,
                    start_offset: done.start_offset,
                    end_offset: offset,
                });
            }
        }
        spans
    }

    fn touch(&mut self) {
        self.spans = OnceLock::new();
        self.marked = OnceLock::new();
        self.revision += 1;
    }

    fn check_attached(&self, id: NodeId) -> Result<(), TreeError> {
        if self.is_attached(id) {
            Ok(())
        } else {
            Err(TreeError::Detached(id.0))
        }
    }

    /// Replace the text of a token.
    pub fn replace_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), TreeError> {
        self.check_attached(id)?;
        let text = text.into();
        let node = &mut self.nodes[id.index()];
        match &mut node.text {
            None => Err(TreeError::NotAToken(id.0)),
            Some(current) if *current == text => Ok(()),
            Some(current) => {
                let old = std::mem::replace(current, text);
                self.record(Undo::Text { id, text: old });
                self.touch();
                Ok(())
            }
        }
    }

    /// Detach `id` and its subtree from the tree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root() {
            return Err(TreeError::RemoveRoot);
        }
        self.check_attached(id)?;
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            let children = &mut self.nodes[parent.index()].children;
            if let Some(index) = children.iter().position(|&child| child == id) {
                children.remove(index);
                self.record(Undo::Removed { id, parent, index });
            }
        }
        self.touch();
        Ok(())
    }

    /// Insert a new token as the `index`-th child of `parent`.
    pub fn insert_token(
        &mut self,
        parent: NodeId,
        index: usize,
        kind: &str,
        text: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.check_attached(parent)?;
        if self.is_token(parent) {
            return Err(TreeError::NotAToken(parent.0));
        }
        let len = self.children(parent).len();
        if index > len {
            return Err(TreeError::OutOfBounds { node: parent.0, index, len });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind, Some(text.into()), Some(parent)));
        self.nodes[parent.index()].children.insert(index, id);
        self.record(Undo::Inserted { parent, index });
        self.touch();
        Ok(id)
    }

    pub fn add_marker(&mut self, id: NodeId, marker: SuppressionMarker) {
        self.nodes[id.index()].markers.push(marker);
        self.marked = OnceLock::new();
        self.record(Undo::Marker { id });
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = &mut self.journal {
            journal.push(undo);
        }
    }

    /// Start recording edits so they can be taken back with
    /// [SyntaxTree::rollback]. Any earlier recording is dropped.
    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        self.journal = Some(Vec::new());
        Checkpoint { len: self.nodes.len(), revision: self.revision }
    }

    /// Keep the edits made since the last checkpoint.
    pub(crate) fn commit(&mut self) {
        self.journal = None;
    }

    /// Undo the edits made since `checkpoint`, newest first.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::Text { id, text } => self.nodes[id.index()].text = Some(text),
                Undo::Removed { id, parent, index } => {
                    self.nodes[id.index()].parent = Some(parent);
                    self.nodes[parent.index()].children.insert(index, id);
                }
                Undo::Inserted { parent, index } => {
                    self.nodes[parent.index()].children.remove(index);
                }
                Undo::Marker { id } => {
                    self.nodes[id.index()].markers.pop();
                }
            }
        }
        self.nodes.truncate(checkpoint.len);
        self.spans = OnceLock::new();
        self.marked = OnceLock::new();
        self.revision = checkpoint.revision;
    }
}

/// Pre-order iterator returned by [SyntaxTree::descendants].
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev());
        Some(id)
    }
}

/// Incremental builder used by front-ends.
///
/// The root is created by [TreeBuilder::new]. Inner nodes are opened with
/// [TreeBuilder::start_node] and closed with [TreeBuilder::finish_node];
/// tokens are added to the innermost open node.
#[derive(Debug)]
pub struct TreeBuilder {
    path: PathBuf,
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(path: impl Into<PathBuf>, root_kind: &str) -> Self {
        Self {
            path: path.into(),
            nodes: vec![NodeData::new(root_kind, None, None)],
            stack: vec![NodeId(0)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, kind: &str, text: Option<String>) -> NodeId {
        let parent = self.stack.last().copied().unwrap_or(NodeId(0));
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind, text, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn start_node(&mut self, kind: &str) -> NodeId {
        let id = self.push(kind, None);
        self.stack.push(id);
        id
    }

    /// Close the innermost open node. The root stays open.
    pub fn finish_node(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn token(&mut self, kind: &str, text: impl Into<String>) -> NodeId {
        self.push(kind, Some(text.into()))
    }

    pub fn marker(&mut self, id: NodeId, marker: SuppressionMarker) {
        self.nodes[id.index()].markers.push(marker);
    }

    /// Innermost open node.
    pub fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId(0))
    }

    /// Build the tree, closing every node still open.
    pub fn finish(self) -> SyntaxTree {
        SyntaxTree {
            path: self.path,
            nodes: self.nodes,
            spans: OnceLock::new(),
            marked: OnceLock::new(),
            revision: 0,
            journal: None,
        }
    }
}
