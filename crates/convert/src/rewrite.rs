use vellum_directive::ConvertContext;
use vellum_dom::{Document, LogDocument, NodeId, NodeKind};

use crate::annotation::Annotations;
use crate::context::PhaseContext;
use crate::parser_iface::TextParser;
use crate::script_host::ScriptHost;

/// Threads the pieces the rewrite walk needs through its recursion without
/// re-deriving them at every node.
pub struct RewriteState<'a> {
    pub log: &'a mut LogDocument,
    pub script_host: Option<&'a mut dyn ScriptHost>,
    pub text_parser: &'a dyn TextParser,
    pub next_pi_id: u64,
    pub uri: Option<String>,
}

/// The third and final pre-order walk: produces the output document,
/// firing `start`/`end` on descent/ascent, honoring `copy`/`copy_children`,
/// and handing `script` processing-instruction nodes to the configured
/// [`ScriptHost`].
///
/// `init` is invoked once, against the freshly created (still childless)
/// output root, before any node is rewritten into it — this is where the
/// style module's `init_conversion` hook runs, matching the original's
/// `_convert` cloning the output root and calling `init_conversion` on it
/// before the walk that populates it begins.
pub fn rewrite_phase(
    compiled: &Document,
    annotations: &Annotations,
    to_lang: &str,
    state: &mut RewriteState,
    init: impl FnOnce(&mut dyn ConvertContext, NodeId),
) -> Document {
    let mut output = Document::new(to_lang.to_string(), "default".to_string());
    output.uri = compiled.uri.clone();
    let out_root = output.root();
    {
        let mut ctx = PhaseContext {
            doc: &mut output,
            log: state.log,
            uri: state.uri.as_deref(),
        };
        init(&mut ctx, out_root);
    }

    let in_root = compiled.root();
    for &child in compiled.children(in_root) {
        rewrite_node(compiled, child, &mut output, out_root, annotations, state);
    }
    output.normalize(out_root);
    output
}

/// Rewrites `input_node`'s subtree into `output`, appending the result
/// under `output_parent`. The clone is attached to `output_parent`
/// immediately, before `start`/script-PI handling run, so that a `script`
/// PI always has a parent to splice its output before once it reaches
/// [`ScriptHost::exec_script`] — scenario 5 of `SPEC_FULL.md` §8 requires
/// `echo`/`include` to insert siblings next to the PI, which needs a
/// parent to exist.
fn rewrite_node(
    input: &Document,
    input_node: NodeId,
    output: &mut Document,
    output_parent: NodeId,
    annotations: &Annotations,
    state: &mut RewriteState,
) {
    let annotation = annotations.get(&input_node);
    let matches: &[vellum_directive::Match] = annotation.map(|a| a.matches.as_slice()).unwrap_or(&[]);
    let copy_allowed = matches.first().map(|m| m.directive.copy()).unwrap_or(true);
    let descend_allowed = matches.first().map(|m| m.directive.copy_children()).unwrap_or(true);

    if !copy_allowed {
        return;
    }

    let mut current = output.clone_shallow(input_node);
    output.append_child(output_parent, current);

    for m in matches {
        let mut ctx = PhaseContext {
            doc: output,
            log: state.log,
            uri: state.uri.as_deref(),
        };
        if let Some(replacement) = m.directive.start(&mut ctx, current) {
            if replacement != current {
                replace_in_tree(output, current, replacement);
            }
            current = replacement;
        }
    }

    if output.kind(current) == NodeKind::ProcessingInstruction && output.name(current) == "script" {
        if let Some(host) = state.script_host.as_mut() {
            state.next_pi_id += 1;
            let id_num = state.next_pi_id;
            let mut ctx = PhaseContext {
                doc: output,
                log: state.log,
                uri: state.uri.as_deref(),
            };
            host.exec_script(&mut ctx, current, id_num, state.text_parser, true);
            return;
        }
    }

    if descend_allowed {
        for &child in input.children(input_node) {
            rewrite_node(input, child, output, current, annotations, state);
        }
        output.normalize(current);
    }

    for m in matches {
        let mut ctx = PhaseContext {
            doc: output,
            log: state.log,
            uri: state.uri.as_deref(),
        };
        if let Some(replacement) = m.directive.end(&mut ctx, current) {
            if replacement != current {
                replace_in_tree(output, current, replacement);
            }
            current = replacement;
        }
    }
}

/// Swaps `old` for `new` at `old`'s current position in the tree. Used
/// when a `start`/`end` hook returns a replacement node for one that is
/// already attached to its output parent.
fn replace_in_tree(output: &mut Document, old: NodeId, new: NodeId) {
    if let Some(parent) = output.parent(old) {
        let index = output.index_of(old);
        output.detach(old);
        output.insert_at(parent, index, new);
    }
}
