use vellum_dom::{Document, NodeId};

/// Narrow view of the converter state handed to lifecycle hooks, so that
/// `vellum-directive` does not need to depend on `vellum-convert` to
/// describe the [`crate::NodeConverter`] contract: a template trait stays
/// decoupled from the executor that runs it.
pub trait ConvertContext {
    /// The document the hook is currently allowed to mutate (the compiled
    /// copy during compile/link, the output document during rewrite).
    fn doc_mut(&mut self) -> &mut Document;

    /// Records a diagnostic message against the converter's log document.
    fn log(&mut self, module: &str, code: &str, node: Option<NodeId>, arg: Option<&str>);
}
