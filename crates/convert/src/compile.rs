use std::collections::HashMap;

use vellum_directive::{match_node, DirectiveRegistry};
use vellum_dom::{Document, LogDocument, NodeId, NodeKind};

use crate::annotation::{Annotation, Annotations};
use crate::context::PhaseContext;
use crate::parser_iface::TextParser;

/// Produces the compiled copy of `input`: a structural clone in which every
/// surviving node is annotated with its matched directives, the `remove`
/// info bag, and its instantiated template clones.
///
/// `template_cache` caches a template's parsed [`Document`] by directive
/// name, populated lazily on first match and cloned (via
/// [`Document::import_children_as_fragment`]) on every subsequent match, so
/// a template is parsed at most once per converter instance.
pub fn compile_phase(
    input: &Document,
    registry: &DirectiveRegistry,
    template_parser: &dyn TextParser,
    template_cache: &mut HashMap<String, Document>,
    log: &mut LogDocument,
) -> (Document, Annotations, NodeId) {
    let mut output = if input.kind(input.root()) == NodeKind::DocumentFragment {
        Document::new_fragment()
    } else {
        Document::new(input.lang.clone(), input.style.clone())
    };
    output.uri = input.uri.clone();
    let mut annotations = Annotations::new();
    let out_root = output.root();

    for &child in input.children(input.root()) {
        if let Some(copy) = compile_node(
            input,
            child,
            &mut output,
            registry,
            template_parser,
            template_cache,
            &mut annotations,
            log,
        ) {
            output.append_child(out_root, copy);
        }
    }
    output.normalize(out_root);
    (output, annotations, out_root)
}

fn compile_node(
    input: &Document,
    input_node: NodeId,
    output: &mut Document,
    registry: &DirectiveRegistry,
    template_parser: &dyn TextParser,
    template_cache: &mut HashMap<String, Document>,
    annotations: &mut Annotations,
    log: &mut LogDocument,
) -> Option<NodeId> {
    let (matches, info) = match_node(input, input_node, registry);
    let top_suppresses_copy = matches.first().map(|m| !m.directive.copy()).unwrap_or(false);
    if info.is_removed() || top_suppresses_copy {
        return None;
    }

    let copy = output.clone_shallow(input_node);

    let mut template_clones: HashMap<String, Option<NodeId>> = HashMap::new();
    for m in &matches {
        let clone_id = if let Some(template_src) = m.directive.template() {
            if !template_cache.contains_key(&m.name) {
                let opts = m.directive.template_options();
                let (tdoc, tlog) = template_parser.parse(
                    template_src,
                    opts.parser_lang.as_deref(),
                    opts.parser_style.as_deref(),
                );
                if !tlog.is_empty() {
                    log.merge_bracketed(&tlog, "convert", "W101", "W102", input.uri.as_deref());
                }
                template_cache.insert(m.name.clone(), tdoc);
            }
            let cached = &template_cache[&m.name];
            let fragment = output.import_children_as_fragment(cached, cached.root());
            Some(fragment)
        } else {
            None
        };

        {
            let mut ctx = PhaseContext {
                doc: output,
                log,
                uri: input.uri.as_deref(),
            };
            m.directive.compile(&mut ctx, clone_id, &info);
        }
        template_clones.insert(m.name.clone(), clone_id);
    }

    let top_allows_descend = matches.first().map(|m| m.directive.copy_children()).unwrap_or(true);
    if top_allows_descend && !input.children(input_node).is_empty() {
        for &child in input.children(input_node) {
            if let Some(child_copy) = compile_node(
                input,
                child,
                output,
                registry,
                template_parser,
                template_cache,
                annotations,
                log,
            ) {
                output.append_child(copy, child_copy);
            }
        }
        output.normalize(copy);
    }

    annotations.insert(
        copy,
        Annotation {
            matches,
            info,
            template_clones,
        },
    );
    Some(copy)
}
