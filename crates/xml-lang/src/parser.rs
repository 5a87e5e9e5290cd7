use vellum_dom::{Document, LogDocument, NodeId};

/// A minimal XML-like language parser.
///
/// Turns a well-formed subset of XML — elements, attributes, text, processing
/// instructions, comments, and childless (void) elements — into a
/// [`Document`]. Malformed input never panics: it is reported as a message
/// in the returned [`LogDocument`] and an empty document is returned instead.
///
/// Limitations, by design (this is a reference implementation, not a
/// general-purpose XML toolkit): CDATA sections are parsed as plain text
/// (the underlying parser does not distinguish them from regular text);
/// there is no DTD/entity/namespace processing.
#[derive(Debug, Clone)]
pub struct Parser {
    pub lang: String,
    pub style: String,
}

impl Parser {
    pub fn new(lang: impl Into<String>, style: impl Into<String>) -> Self {
        Parser {
            lang: lang.into(),
            style: style.into(),
        }
    }

    /// Parses `text`, attaching `uri` to the returned document if given.
    pub fn parse(&self, text: &str, uri: Option<&str>) -> (Document, LogDocument) {
        let mut log = LogDocument::new();
        let mut doc = Document::new(self.lang.clone(), self.style.clone());
        doc.uri = uri.map(str::to_string);

        let parsed = match roxmltree::Document::parse(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                log.push("xml_lang", "E100", None, uri, Some(&e.to_string()));
                log::warn!("xml_lang parse error for {:?}: {e}", uri);
                return (doc, log);
            }
        };

        let root = doc.root();
        for child in parsed.root().children() {
            if let Some(node_id) = self.convert_node(&mut doc, child) {
                doc.append_child(root, node_id);
            }
        }
        (doc, log)
    }

    fn convert_node(&self, doc: &mut Document, node: roxmltree::Node) -> Option<NodeId> {
        if node.is_element() {
            let has_content = node
                .children()
                .any(|c| c.is_element() || c.is_text() || c.is_pi() || c.is_comment());
            let id = if has_content {
                doc.create_element(node.tag_name().name().to_string())
            } else {
                doc.create_void(node.tag_name().name().to_string())
            };
            for attr in node.attributes() {
                doc.node_mut(id)
                    .attributes
                    .insert(attr.name().to_string(), attr.value().to_string());
            }
            if has_content {
                for child in node.children() {
                    if let Some(child_id) = self.convert_node(doc, child) {
                        doc.append_child(id, child_id);
                    }
                }
            }
            Some(id)
        } else if node.is_text() {
            let text = node.text().unwrap_or("");
            Some(doc.create_text(text.to_string()))
        } else if node.is_pi() {
            let pi = node.pi()?;
            Some(doc.create_pi(pi.target.to_string(), pi.value.unwrap_or("").to_string()))
        } else if node.is_comment() {
            let text = node.text().unwrap_or("");
            Some(doc.create_pi("#comment", text.to_string()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_dom::NodeKind;

    #[test]
    fn parses_nested_elements_and_text() {
        let parser = Parser::new("xml", "default");
        let (doc, log) = parser.parse("<a><b>hi</b></a>", None);
        assert!(log.is_empty());
        let root = doc.root();
        let a = doc.children(root)[0];
        assert_eq!(doc.name(a), "a");
        let b = doc.children(a)[0];
        assert_eq!(doc.name(b), "b");
        let text = doc.children(b)[0];
        assert_eq!(doc.kind(text), NodeKind::Text);
        assert_eq!(doc.data(text), "hi");
    }

    #[test]
    fn childless_element_becomes_void() {
        let parser = Parser::new("xml", "default");
        let (doc, _log) = parser.parse("<a><br/></a>", None);
        let root = doc.root();
        let a = doc.children(root)[0];
        let br = doc.children(a)[0];
        assert_eq!(doc.kind(br), NodeKind::Void);
    }

    #[test]
    fn attributes_preserve_source_order() {
        let parser = Parser::new("xml", "default");
        let (doc, _log) = parser.parse(r#"<a z="1" a="2" m="3"/>"#, None);
        let root = doc.root();
        let a = doc.children(root)[0];
        let keys: Vec<&str> = doc.node(a).attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn processing_instruction_is_captured() {
        let parser = Parser::new("xml", "default");
        let (doc, _log) = parser.parse("<a><?script echo('hi')?></a>", None);
        let root = doc.root();
        let a = doc.children(root)[0];
        let pi = doc.children(a)[0];
        assert_eq!(doc.kind(pi), NodeKind::ProcessingInstruction);
        assert_eq!(doc.name(pi), "script");
    }

    #[test]
    fn malformed_input_logs_instead_of_panicking() {
        let parser = Parser::new("xml", "default");
        let (doc, log) = parser.parse("<a><b></a>", Some("broken.xml"));
        assert!(!log.is_empty());
        assert!(doc.children(doc.root()).is_empty());
    }
}
