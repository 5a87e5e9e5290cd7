use vellum_dom::NodeId;

use crate::parser_iface::TextParser;

/// Handles embedded-execution processing-instruction nodes encountered
/// during the final rewrite walk.
///
/// Kept as a trait, rather than a concrete dependency on `vellum-embed`, so
/// `vellum-convert` never depends on the scripting engine crate — `embed`
/// depends on `convert`, not the other way around. A converter built
/// without a script host simply leaves `script` PI nodes untouched.
pub trait ScriptHost {
    /// Evaluates the code carried by the PI node `node`, splices its
    /// output into the tree in its place, and returns an anchor node: the
    /// PI's previous sibling, or a freshly inserted empty text node if it
    /// had none.
    fn exec_script(
        &mut self,
        ctx: &mut dyn vellum_directive::ConvertContext,
        node: NodeId,
        id_num: u64,
        text_parser: &dyn TextParser,
        raise_on_error: bool,
    ) -> NodeId;
}
