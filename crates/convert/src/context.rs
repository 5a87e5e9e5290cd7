use vellum_directive::ConvertContext;
use vellum_dom::{Document, LogDocument, NodeId};

/// The concrete [`ConvertContext`] handed to directive hooks during the
/// compile, link, and rewrite phases. Borrows the document being built and
/// the converter's log document for the duration of a single hook call.
pub struct PhaseContext<'a> {
    pub doc: &'a mut Document,
    pub log: &'a mut LogDocument,
    pub uri: Option<&'a str>,
}

impl<'a> ConvertContext for PhaseContext<'a> {
    fn doc_mut(&mut self) -> &mut Document {
        self.doc
    }

    fn log(&mut self, module: &str, code: &str, node: Option<NodeId>, arg: Option<&str>) {
        self.log.push(module, code, node, self.uri, arg);
        log::debug!("{module} {code} node={:?} arg={:?} uri={:?}", node, arg, self.uri);
    }
}
