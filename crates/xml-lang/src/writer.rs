use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::writer::Writer as QuickWriter;

use vellum_dom::{Document, NodeId, NodeKind};

/// Serializes a [`Document`] back to the XML-like language. Stable
/// attribute ordering follows the node's own insertion-order attribute
/// map; escaping is delegated to `quick-xml`.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    pub indent: Option<(u8, usize)>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { indent: None }
    }

    pub fn with_indent(indent_char: u8, indent_size: usize) -> Self {
        Writer {
            indent: Some((indent_char, indent_size)),
        }
    }

    /// Serializes `document` starting from its root's children.
    pub fn write(&self, document: &Document) -> String {
        let buf = Vec::new();
        let mut writer = match self.indent {
            Some((c, n)) => QuickWriter::new_with_indent(buf, c, n),
            None => QuickWriter::new(buf),
        };
        for &child in document.children(document.root()) {
            self.write_node(&mut writer, document, child);
        }
        let bytes = writer.into_inner();
        String::from_utf8(bytes).expect("quick-xml writer always produces valid UTF-8")
    }

    fn write_node(&self, writer: &mut QuickWriter<Vec<u8>>, doc: &Document, id: NodeId) {
        match doc.kind(id) {
            NodeKind::Element => {
                let mut start = BytesStart::new(doc.name(id));
                for (k, v) in doc.node(id).attributes.iter() {
                    start.push_attribute((k.as_str(), v.as_str()));
                }
                writer
                    .write_event(Event::Start(start))
                    .expect("writing to an in-memory buffer never fails");
                for &child in doc.children(id) {
                    self.write_node(writer, doc, child);
                }
                writer
                    .write_event(Event::End(BytesEnd::new(doc.name(id))))
                    .expect("writing to an in-memory buffer never fails");
            }
            NodeKind::Void => {
                let mut start = BytesStart::new(doc.name(id));
                for (k, v) in doc.node(id).attributes.iter() {
                    start.push_attribute((k.as_str(), v.as_str()));
                }
                writer
                    .write_event(Event::Empty(start))
                    .expect("writing to an in-memory buffer never fails");
            }
            NodeKind::Text => {
                writer
                    .write_event(Event::Text(BytesText::new(doc.data(id))))
                    .expect("writing to an in-memory buffer never fails");
            }
            NodeKind::CData => {
                writer
                    .write_event(Event::CData(BytesCData::new(doc.data(id))))
                    .expect("writing to an in-memory buffer never fails");
            }
            NodeKind::ProcessingInstruction if doc.name(id) == "#comment" => {
                writer
                    .write_event(Event::Comment(BytesText::new(doc.data(id))))
                    .expect("writing to an in-memory buffer never fails");
            }
            NodeKind::ProcessingInstruction => {
                let content = if doc.data(id).is_empty() {
                    doc.name(id).to_string()
                } else {
                    format!("{} {}", doc.name(id), doc.data(id))
                };
                writer
                    .write_event(Event::PI(BytesPI::new(content)))
                    .expect("writing to an in-memory buffer never fails");
            }
            NodeKind::Document | NodeKind::DocumentFragment => {
                for &child in doc.children(id) {
                    self.write_node(writer, doc, child);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn round_trips_simple_document() {
        let parser = Parser::new("xml", "default");
        let (doc, _log) = parser.parse("<a><b>hi</b></a>", None);
        let writer = Writer::new();
        let out = writer.write(&doc);
        assert_eq!(out, "<a><b>hi</b></a>");
    }

    #[test]
    fn void_elements_self_close() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let br = doc.create_void("br");
        doc.append_child(root, br);
        let out = Writer::new().write(&doc);
        assert_eq!(out, "<br/>");
    }

    #[test]
    fn attribute_order_is_stable() {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let a = doc.create_void("a");
        doc.node_mut(a).attributes.insert("z".to_string(), "1".to_string());
        doc.node_mut(a).attributes.insert("a".to_string(), "2".to_string());
        doc.append_child(root, a);
        let out = Writer::new().write(&doc);
        assert_eq!(out, r#"<a z="1" a="2"/>"#);
    }
}
