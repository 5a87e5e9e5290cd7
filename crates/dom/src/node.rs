use indexmap::IndexMap;

/// A stable handle into a [`crate::Document`]'s node arena.
///
/// Nodes are addressed by index rather than by shared reference so the tree
/// can hold parent back-pointers without reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of a [`Node`]. Attributes are only meaningful on `Element`/`Void`
/// nodes; `data` is only meaningful on `Text`/`CData`/`ProcessingInstruction`
/// nodes; children are only meaningful on `Document`/`DocumentFragment`/`Element`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    DocumentFragment,
    Element,
    /// A self-closing element: carries attributes but never children.
    Void,
    Text,
    CData,
    ProcessingInstruction,
}

impl NodeKind {
    pub fn can_have_children(self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::DocumentFragment | NodeKind::Element
        )
    }

    pub fn can_have_attributes(self) -> bool {
        matches!(self, NodeKind::Element | NodeKind::Void)
    }

    pub fn can_have_data(self) -> bool {
        matches!(
            self,
            NodeKind::Text | NodeKind::CData | NodeKind::ProcessingInstruction
        )
    }
}

/// A node in a document tree.
///
/// `name` is kind-specific: `#document` / `#document-fragment` for the root
/// kinds, the tag name for `Element`/`Void`, `#text`/`#cdata` for leaves, and
/// the PI target for `ProcessingInstruction`.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub data: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Node {
            kind,
            name: name.into(),
            attributes: IndexMap::new(),
            data: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_empty_text(&self) -> bool {
        self.kind == NodeKind::Text && self.data.is_empty()
    }
}
