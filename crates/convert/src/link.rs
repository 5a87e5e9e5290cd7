use vellum_dom::{Document, LogDocument, NodeId, NodeKind};

use crate::annotation::Annotations;
use crate::context::PhaseContext;

/// Walks the compiled copy pre-order, splicing each annotated node's
/// template and transcluded children into place and firing `pre_link`
/// top-down / `post_link` bottom-up.
pub fn link_phase(doc: &mut Document, annotations: &Annotations, log: &mut LogDocument) {
    let root = doc.root();
    let children: Vec<NodeId> = doc.children(root).to_vec();
    for child in children {
        link_node(doc, annotations, child, log);
    }
}

fn link_node(doc: &mut Document, annotations: &Annotations, node: NodeId, log: &mut LogDocument) {
    let uri = doc.uri.clone();

    if let Some(annotation) = annotations.get(&node) {
        let orig_children = doc.take_children(node);

        for m in &annotation.matches {
            if let Some(Some(template_fragment)) = annotation.template_clones.get(&m.name) {
                if m.directive.replace() {
                    transplant_template_root(doc, node, *template_fragment);
                } else {
                    doc.extend_children(node, *template_fragment);
                }
            }

            if m.directive.transclude() {
                splice_transcluded_children(doc, node, orig_children);
            }

            let mut ctx = PhaseContext {
                doc,
                log,
                uri: uri.as_deref(),
            };
            m.directive.pre_link(&mut ctx, node);
        }

        // If nothing transcluded the held-back children (no matched
        // directive set transclude=true), they are simply dropped along
        // with the now-empty holding fragment.
        let _ = orig_children;
    }

    let children: Vec<NodeId> = doc.children(node).to_vec();
    for child in children {
        link_node(doc, annotations, child, log);
    }

    if let Some(annotation) = annotations.get(&node) {
        for m in &annotation.matches {
            let mut ctx = PhaseContext {
                doc,
                log,
                uri: uri.as_deref(),
            };
            m.directive.post_link(&mut ctx, node);
        }
    }
}

/// Splices `orig_children`'s children into `node` at a `<content/>`
/// sentinel if one is present anywhere in `node`'s current subtree,
/// otherwise appends them at the end.
fn splice_transcluded_children(doc: &mut Document, node: NodeId, orig_children: NodeId) {
    if doc.children(orig_children).is_empty() {
        return;
    }
    match find_content_placeholder(doc, node) {
        Some(placeholder) => {
            doc.extend_before(placeholder, orig_children);
            doc.detach(placeholder);
        }
        None => doc.extend_children(node, orig_children),
    }
}

fn find_content_placeholder(doc: &Document, node: NodeId) -> Option<NodeId> {
    for &child in doc.children(node) {
        if matches!(doc.kind(child), NodeKind::Element | NodeKind::Void) && doc.name(child) == "content" {
            return Some(child);
        }
        if let Some(found) = find_content_placeholder(doc, child) {
            return Some(found);
        }
    }
    None
}

/// `replace=true`: the template root itself becomes `node`'s replacement.
/// Rather than re-pointing `node`'s parent to a new `NodeId` (which would
/// invalidate the annotation map's key), `node` is turned in place into a
/// copy of the template root: its kind/name/attributes/data are
/// overwritten and the template root's children are grafted onto it.
fn transplant_template_root(doc: &mut Document, node: NodeId, template_fragment: NodeId) {
    let template_children: Vec<NodeId> = doc.children(template_fragment).to_vec();
    if let [only_root] = template_children.as_slice() {
        let root_kind = doc.kind(*only_root);
        let root_name = doc.name(*only_root).to_string();
        let root_attrs = doc.node(*only_root).attributes.clone();
        let root_data = doc.data(*only_root).to_string();
        let grandchildren: Vec<NodeId> = doc.children(*only_root).to_vec();

        {
            let n = doc.node_mut(node);
            n.kind = root_kind;
            n.name = root_name;
            n.attributes = root_attrs;
            n.data = root_data;
        }
        for gc in grandchildren {
            doc.append_child(node, gc);
        }
    } else {
        doc.extend_children(node, template_fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::rc::Rc;

    use vellum_directive::{ConvertContext, DirectiveRegistry, NodeConverter, Restrict};

    use crate::annotation::Annotation;
    use crate::compile::compile_phase;
    use crate::parser_iface::TextParser;

    struct StubParser;
    impl TextParser for StubParser {
        fn parse(&self, _text: &str, _lang: Option<&str>, _style: Option<&str>) -> (Document, LogDocument) {
            (Document::new_fragment(), LogDocument::new())
        }
    }

    struct Wrap;
    impl NodeConverter for Wrap {
        fn directive(&self) -> &str {
            "wrap"
        }
        fn restrict(&self) -> Restrict {
            Restrict::ELEMENT
        }
        fn template(&self) -> Option<&str> {
            Some("<div class='w'><content/></div>")
        }
    }

    fn build_template_tree() -> (Document, String) {
        let mut tdoc = Document::new_fragment();
        let troot = tdoc.root();
        let div = tdoc.create_element("div");
        tdoc.node_mut(div).attributes.insert("class".to_string(), "w".to_string());
        let content = tdoc.create_void("content");
        tdoc.append_child(div, content);
        tdoc.append_child(troot, div);
        (tdoc, "<div class='w'><content/></div>".to_string())
    }

    #[test]
    fn template_with_content_placeholder_receives_transcluded_children() {
        let mut input = Document::new("xml", "default");
        let iroot = input.root();
        let wrap = input.create_element("wrap");
        let i = input.create_element("i");
        let text = input.create_text("hi");
        input.append_child(i, text);
        input.append_child(wrap, i);
        input.append_child(iroot, wrap);

        let mut registry = DirectiveRegistry::new();
        registry.register("Wrap", Rc::new(Wrap), false).unwrap();

        let (tdoc, _src) = build_template_tree();
        let mut cache = HashMap::new();
        cache.insert("wrap".to_string(), tdoc);

        let mut log = LogDocument::new();
        let (mut compiled, annotations, out_root) =
            compile_phase(&input, &registry, &StubParser, &mut cache, &mut log);
        link_phase(&mut compiled, &annotations, &mut log);

        let wrap_out = compiled.children(out_root)[0];
        assert_eq!(compiled.name(wrap_out), "wrap");
        let div = compiled.children(wrap_out)[0];
        assert_eq!(compiled.name(div), "div");
        let spliced_i = compiled.children(div)[0];
        assert_eq!(compiled.name(spliced_i), "i");
    }

    #[allow(dead_code)]
    fn unused(_: Annotation) {}

    #[allow(dead_code)]
    fn unused_ctx(_: &mut dyn ConvertContext) {}
}
