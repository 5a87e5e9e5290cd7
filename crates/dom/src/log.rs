use std::collections::HashMap;

use crate::document::Document;
use crate::node::NodeId;

/// A structured diagnostic sink shaped like a document: its children are
/// `Void` message records carrying `module`/`code`/`node_id`/`uri`/`arg`
/// attributes.
#[derive(Debug, Clone)]
pub struct LogDocument {
    pub doc: Document,
    /// Module name -> opaque reference used to look up MSG/MSG_EXPLANATION
    /// tables when rendering human-readable explanations.
    pub modules: HashMap<String, String>,
    /// Module name -> rendered explanation, populated after conversion.
    pub explanation: HashMap<String, String>,
}

impl LogDocument {
    pub fn new() -> Self {
        LogDocument {
            doc: Document::new_fragment(),
            modules: HashMap::new(),
            explanation: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.doc.children(self.doc.root()).is_empty()
    }

    pub fn len(&self) -> usize {
        self.doc.children(self.doc.root()).len()
    }

    /// Appends a `Void` message record, minus the caller's own
    /// converter/document plumbing (that lives in `vellum_convert`, which
    /// calls this with the resolved `uri`).
    pub fn push(
        &mut self,
        module: impl Into<String>,
        code: impl Into<String>,
        node_id: Option<NodeId>,
        uri: Option<&str>,
        arg: Option<&str>,
    ) -> NodeId {
        let root = self.doc.root();
        let record = self.doc.create_void("msg");
        let module = module.into();
        self.doc
            .node_mut(record)
            .attributes
            .insert("module".to_string(), module.clone());
        self.doc
            .node_mut(record)
            .attributes
            .insert("code".to_string(), code.into());
        if let Some(id) = node_id {
            self.doc
                .node_mut(record)
                .attributes
                .insert("node_id".to_string(), id.index().to_string());
        }
        if let Some(uri) = uri {
            self.doc
                .node_mut(record)
                .attributes
                .insert("uri".to_string(), uri.to_string());
        }
        if let Some(arg) = arg {
            self.doc
                .node_mut(record)
                .attributes
                .insert("arg".to_string(), arg.to_string());
        }
        self.doc.append_child(root, record);
        self.modules.entry(module).or_insert_with(String::new);
        record
    }

    /// Merges another log document's messages, modules, and explanations
    /// into this one, preserving message order. Used when a nested
    /// parser/converter's log is folded into the caller's (include,
    /// embedded execution).
    pub fn merge(&mut self, other: &LogDocument) {
        let root = self.doc.root();
        let other_root = other.doc.root();
        let imported = self.doc.import_children_as_fragment(&other.doc, other_root);
        self.doc.extend_children(root, imported);
        for (k, v) in &other.modules {
            self.modules.entry(k.clone()).or_insert_with(|| v.clone());
        }
        for (k, v) in &other.explanation {
            self.explanation.insert(k.clone(), v.clone());
        }
    }

    /// Wraps `other`'s messages with `W101`/`W102` bracketing markers
    /// before merging, as done when folding a nested parser's log into the
    /// converter's own.
    pub fn merge_bracketed(
        &mut self,
        other: &LogDocument,
        module: &str,
        open_code: &str,
        close_code: &str,
        uri: Option<&str>,
    ) {
        if other.is_empty() {
            return;
        }
        self.push(module, open_code, None, uri, None);
        self.merge(other);
        self.push(module, close_code, None, uri, None);
    }
}

impl Default for LogDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_records_attributes() {
        let mut log = LogDocument::new();
        let id = log.push("core", "E100", None, Some("a.xml"), Some("boom"));
        let node = log.doc.node(id);
        assert_eq!(node.attributes.get("module").map(String::as_str), Some("core"));
        assert_eq!(node.attributes.get("code").map(String::as_str), Some("E100"));
        assert_eq!(node.attributes.get("uri").map(String::as_str), Some("a.xml"));
        assert_eq!(node.attributes.get("arg").map(String::as_str), Some("boom"));
    }

    #[test]
    fn merge_preserves_order_and_is_monotonic() {
        let mut a = LogDocument::new();
        a.push("core", "W101", None, None, None);
        let mut b = LogDocument::new();
        b.push("nested", "E100", None, None, None);
        let before = a.len();
        a.merge(&b);
        assert_eq!(a.len(), before + 1);
        assert!(a.len() >= before);
    }

    #[test]
    fn merge_bracketed_wraps_with_markers() {
        let mut a = LogDocument::new();
        let mut b = LogDocument::new();
        b.push("nested", "E100", None, None, None);
        a.merge_bracketed(&b, "core", "W101", "W102", Some("a.xml"));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn merge_bracketed_skips_empty_nested_log() {
        let mut a = LogDocument::new();
        let b = LogDocument::new();
        a.merge_bracketed(&b, "core", "W101", "W102", None);
        assert!(a.is_empty());
    }
}
