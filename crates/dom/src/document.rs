use std::collections::HashMap;

use crate::node::{Node, NodeId, NodeKind};

/// A document tree: an arena of [`Node`]s rooted at a single `Document` or
/// `DocumentFragment` node.
///
/// Every node transitively "belongs" to the `Document` that owns its arena;
/// there is no cross-document node reference, which is what makes parent
/// back-pointers safe to store as plain indices.
#[derive(Debug, Clone)]
pub struct Document {
    arena: Vec<Node>,
    root: NodeId,
    /// Source URI, set by the parser. `None` for documents built in memory.
    pub uri: Option<String>,
    pub lang: String,
    pub style: String,
    /// The per-document execution environment used by embedded code.
    pub namespace: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Creates a new document rooted at a `Document`-kind node.
    pub fn new(lang: impl Into<String>, style: impl Into<String>) -> Self {
        let mut arena = Vec::with_capacity(16);
        arena.push(Node::new(NodeKind::Document, "#document"));
        Document {
            arena,
            root: NodeId(0),
            uri: None,
            lang: lang.into(),
            style: style.into(),
            namespace: HashMap::new(),
        }
    }

    /// Creates a document whose root is a `DocumentFragment`, used for
    /// transclusion holding areas and parser scratch space.
    pub fn new_fragment() -> Self {
        let mut arena = Vec::with_capacity(8);
        arena.push(Node::new(NodeKind::DocumentFragment, "#document-fragment"));
        Document {
            arena,
            root: NodeId(0),
            uri: None,
            lang: String::new(),
            style: String::new(),
            namespace: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.arena[id.index()].kind
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.arena[id.index()].name
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.arena[id.index()].name = name.into();
    }

    pub fn data(&self, id: NodeId) -> &str {
        &self.arena[id.index()].data
    }

    pub fn set_data(&mut self, id: NodeId, data: impl Into<String>) {
        self.arena[id.index()].data = data.into();
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.arena[id.index()].children
    }

    /// Position of `id` among its parent's children, or `0` for a root.
    pub fn index_of(&self, id: NodeId) -> usize {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .position(|&c| c == id)
                .expect("child must be listed in its parent's children"),
            None => 0,
        }
    }

    /// The next sibling, if any.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    // --- Node creation -----------------------------------------------

    fn push(&mut self, node: Node) -> NodeId {
        self.arena.push(node);
        NodeId((self.arena.len() - 1) as u32)
    }

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::new(NodeKind::Element, name))
    }

    pub fn create_void(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::new(NodeKind::Void, name))
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        let mut node = Node::new(NodeKind::Text, "#text");
        node.data = data.into();
        self.push(node)
    }

    pub fn create_cdata(&mut self, data: impl Into<String>) -> NodeId {
        let mut node = Node::new(NodeKind::CData, "#cdata-section");
        node.data = data.into();
        self.push(node)
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(Node::new(NodeKind::DocumentFragment, "#document-fragment"))
    }

    pub fn create_pi(&mut self, target: impl Into<String>, data: impl Into<String>) -> NodeId {
        let mut node = Node::new(NodeKind::ProcessingInstruction, target);
        node.data = data.into();
        self.push(node)
    }

    // --- Tree mutation -------------------------------------------------

    /// Appends `child` as the last child of `parent`. Detaches `child` from
    /// its previous parent first, if any.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.arena[parent.index()].children.push(child);
        self.arena[child.index()].parent = Some(parent);
    }

    /// Inserts `child` at `index` among `parent`'s children.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.arena[parent.index()].children.insert(index, child);
        self.arena[child.index()].parent = Some(parent);
    }

    /// Inserts `child` immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        let parent = self
            .parent(reference)
            .expect("insert_before requires a reference node with a parent");
        let index = self.index_of(reference);
        self.insert_at(parent, index, child);
    }

    /// Detaches `node` from its parent, if any. The node remains valid in
    /// the arena and may be re-attached elsewhere.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.arena[node.index()].parent.take() {
            self.arena[parent.index()].children.retain(|&c| c != node);
        }
    }

    /// Removes `node` from the tree and returns an anchor for subsequent
    /// insertion: the previous sibling if one exists, otherwise a freshly
    /// appended empty text node at the start of the (now-missing) parent's
    /// children.
    pub fn remove_and_anchor(&mut self, node: NodeId) -> NodeId {
        let parent = self.parent(node);
        let index = self.index_of(node);
        self.detach(node);
        if let Some(parent) = parent {
            if index > 0 {
                return self.children(parent)[index - 1];
            }
            let empty = self.create_text("");
            self.insert_at(parent, 0, empty);
            return empty;
        }
        node
    }

    /// Appends all children of `source_fragment` (which must live in this
    /// same arena) onto the end of `parent`'s children, leaving
    /// `source_fragment` childless.
    pub fn extend_children(&mut self, parent: NodeId, source_fragment: NodeId) {
        let kids: Vec<NodeId> = self.arena[source_fragment.index()].children.clone();
        for kid in kids {
            self.append_child(parent, kid);
        }
    }

    /// Inserts all children of `source_fragment` into `parent` starting at
    /// `index`, preserving their order.
    pub fn extend_at(&mut self, parent: NodeId, index: usize, source_fragment: NodeId) {
        let kids: Vec<NodeId> = self.arena[source_fragment.index()].children.clone();
        for (offset, kid) in kids.into_iter().enumerate() {
            self.insert_at(parent, index + offset, kid);
        }
    }

    /// Inserts all children of `source_fragment` into `reference`'s parent,
    /// immediately before `reference`.
    pub fn extend_before(&mut self, reference: NodeId, source_fragment: NodeId) {
        let parent = self
            .parent(reference)
            .expect("extend_before requires a reference node with a parent");
        let index = self.index_of(reference);
        self.extend_at(parent, index, source_fragment);
    }

    /// Detaches all of `parent`'s current children into a new, detached
    /// `DocumentFragment` node and returns it. Used by the link phase to
    /// hold a node's original children during transclusion.
    pub fn take_children(&mut self, parent: NodeId) -> NodeId {
        let fragment = self.create_fragment();
        let kids: Vec<NodeId> = std::mem::take(&mut self.arena[parent.index()].children);
        for &kid in &kids {
            self.arena[kid.index()].parent = Some(fragment);
        }
        self.arena[fragment.index()].children = kids;
        fragment
    }

    // --- Cloning ---------------------------------------------------------

    /// Shallow clone: copies kind, name, attributes and data, but not
    /// children. The returned node is detached.
    pub fn clone_shallow(&mut self, node: NodeId) -> NodeId {
        let src = self.arena[node.index()].clone();
        let mut copy = Node::new(src.kind, src.name);
        copy.attributes = src.attributes;
        copy.data = src.data;
        self.push(copy)
    }

    /// Deep clone within the same arena: copies `node` and its full subtree.
    /// The returned node is detached.
    pub fn clone_deep(&mut self, node: NodeId) -> NodeId {
        let copy = self.clone_shallow(node);
        let kids: Vec<NodeId> = self.arena[node.index()].children.clone();
        for kid in kids {
            let kid_copy = self.clone_deep(kid);
            self.append_child(copy, kid_copy);
        }
        copy
    }

    /// Deep clone across arenas: copies `node` (from `other`) and its full
    /// subtree into `self`. The returned node is detached.
    pub fn import_deep(&mut self, other: &Document, node: NodeId) -> NodeId {
        let src = other.node(node);
        let mut copy = Node::new(src.kind, src.name.clone());
        copy.attributes = src.attributes.clone();
        copy.data = src.data.clone();
        let children = src.children.clone();
        let copy_id = self.push(copy);
        for kid in children {
            let kid_copy = self.import_deep(other, kid);
            self.append_child(copy_id, kid_copy);
        }
        copy_id
    }

    /// Deep-imports every child of `other_root` (from `other`) into `self`
    /// as a new, detached `DocumentFragment`.
    pub fn import_children_as_fragment(&mut self, other: &Document, other_root: NodeId) -> NodeId {
        let fragment = self.create_fragment();
        for &kid in other.children(other_root) {
            let copy = self.import_deep(other, kid);
            self.append_child(fragment, copy);
        }
        fragment
    }

    // --- Normalization ---------------------------------------------------

    /// Merges adjacent `Text` children of `parent` and drops empty `Text`
    /// children, unless an empty text node is the sole child.
    pub fn normalize(&mut self, parent: NodeId) {
        let kids = self.arena[parent.index()].children.clone();
        if kids.len() <= 1 {
            return;
        }
        let mut merged: Vec<NodeId> = Vec::with_capacity(kids.len());
        for kid in kids {
            if self.kind(kid) == NodeKind::Text {
                if let Some(&last) = merged.last() {
                    if self.kind(last) == NodeKind::Text {
                        let extra = self.data(kid).to_string();
                        self.arena[last.index()].data.push_str(&extra);
                        continue;
                    }
                }
            }
            merged.push(kid);
        }
        merged.retain(|&n| !(self.node(n).is_empty_text()));
        if merged.is_empty() {
            if let Some(&first_orig) = self.arena[parent.index()].children.first() {
                merged.push(first_orig);
            }
        }
        for &kid in &merged {
            self.arena[kid.index()].parent = Some(parent);
        }
        self.arena[parent.index()].children = merged;
    }

    /// True if `node`'s subtree is structurally equal to `other_node`'s
    /// subtree in `other` (kind, name, attributes, data, children — ignoring
    /// arena indices). Used by identity-transform tests.
    pub fn structurally_eq(&self, node: NodeId, other: &Document, other_node: NodeId) -> bool {
        let a = self.node(node);
        let b = other.node(other_node);
        if a.kind != b.kind || a.name != b.name || a.data != b.data || a.attributes != b.attributes
        {
            return false;
        }
        if a.children.len() != b.children.len() {
            return false;
        }
        a.children
            .iter()
            .zip(b.children.iter())
            .all(|(&ac, &bc)| self.structurally_eq(ac, other, bc))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_index() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a);
        doc.append_child(root, b);
        assert_eq!(doc.index_of(a), 0);
        assert_eq!(doc.index_of(b), 1);
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), None);
        assert_eq!(doc.parent(b), Some(root));
    }

    #[test]
    fn detach_clears_parent() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let a = doc.create_element("a");
        doc.append_child(root, a);
        doc.detach(a);
        assert_eq!(doc.parent(a), None);
        assert!(doc.children(root).is_empty());
        doc.append_child(root, a);
        assert_eq!(doc.parent(a), Some(root));
    }

    #[test]
    fn normalize_merges_adjacent_text_and_drops_empty() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let t1 = doc.create_text("Hello, ");
        let t2 = doc.create_text("World");
        let empty = doc.create_text("");
        let elem = doc.create_element("b");
        doc.append_child(root, t1);
        doc.append_child(root, t2);
        doc.append_child(root, empty);
        doc.append_child(root, elem);
        doc.normalize(root);
        let kids = doc.children(root).to_vec();
        assert_eq!(kids.len(), 2);
        assert_eq!(doc.data(kids[0]), "Hello, World");
        assert_eq!(doc.kind(kids[1]), NodeKind::Element);
    }

    #[test]
    fn normalize_keeps_sole_empty_text() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let empty = doc.create_text("");
        doc.append_child(root, empty);
        doc.normalize(root);
        assert_eq!(doc.children(root).len(), 1);
    }

    #[test]
    fn clone_deep_copies_subtree() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let a = doc.create_element("a");
        let t = doc.create_text("hi");
        doc.append_child(a, t);
        doc.append_child(root, a);
        let clone = doc.clone_deep(a);
        assert_eq!(doc.parent(clone), None);
        assert_eq!(doc.children(clone).len(), 1);
        assert_ne!(doc.children(clone)[0], t);
        assert_eq!(doc.data(doc.children(clone)[0]), "hi");
    }

    #[test]
    fn remove_and_anchor_returns_previous_sibling() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(root, a);
        doc.append_child(root, b);
        let anchor = doc.remove_and_anchor(b);
        assert_eq!(anchor, a);
        assert_eq!(doc.children(root), &[a]);
    }

    #[test]
    fn remove_and_anchor_creates_empty_text_when_no_previous_sibling() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let a = doc.create_element("a");
        doc.append_child(root, a);
        let anchor = doc.remove_and_anchor(a);
        assert_eq!(doc.kind(anchor), NodeKind::Text);
        assert_eq!(doc.data(anchor), "");
    }
}
