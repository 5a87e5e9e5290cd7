use std::collections::HashMap;
use std::rc::Rc;

use vellum_directive::{DirectiveRegistry, NodeConverter};
use vellum_dom::{Document, LogDocument, NodeId, NodeKind};
use vellum_style::{merge_defaults, ConfigValue, StyleModule};

use crate::compile::compile_phase;
use crate::context::PhaseContext;
use crate::error::ConvertError;
use crate::link::link_phase;
use crate::parser_iface::TextParser;
use crate::rewrite::{rewrite_phase, RewriteState};
use crate::script_host::ScriptHost;

/// The directive-based tree-rewriting engine.
///
/// Built for one `(from, to, style)` triple; owns the directive registry
/// resolved from the style module, the per-instance template cache, and an
/// optional [`ScriptHost`] for embedded-execution PI nodes. Not `Sync`: a
/// host wanting concurrent conversions builds one `Converter` per
/// thread/task.
pub struct Converter {
    pub from_lang: String,
    pub to_lang: String,
    pub style: String,
    registry: DirectiveRegistry,
    style_module: Rc<dyn StyleModule>,
    template_parser: Box<dyn TextParser>,
    template_cache: HashMap<String, Document>,
    script_host: Option<Box<dyn ScriptHost>>,
    pub config: HashMap<String, ConfigValue>,
}

impl Converter {
    /// Builds a converter for `(from_lang, to_lang, style)`, registering
    /// every directive in the style module's repository and merging its
    /// defaults with `overrides`.
    pub fn new(
        from_lang: impl Into<String>,
        to_lang: impl Into<String>,
        style: impl Into<String>,
        style_module: Rc<dyn StyleModule>,
        template_parser: Box<dyn TextParser>,
        overrides: HashMap<String, ConfigValue>,
    ) -> Result<Self, ConvertError> {
        let mut registry = DirectiveRegistry::new();
        for (class_name, instance) in style_module.repository() {
            registry.register(&class_name, instance, false)?;
        }
        let config = merge_defaults(&style_module.defaults(), &overrides);
        Ok(Converter {
            from_lang: from_lang.into(),
            to_lang: to_lang.into(),
            style: style.into(),
            registry,
            style_module,
            template_parser,
            template_cache: HashMap::new(),
            script_host: None,
            config,
        })
    }

    pub fn with_script_host(mut self, host: Box<dyn ScriptHost>) -> Self {
        self.script_host = Some(host);
        self
    }

    pub fn set_script_host(&mut self, host: Box<dyn ScriptHost>) {
        self.script_host = Some(host);
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    /// Runs the full compile -> link -> rewrite pipeline, matching the
    /// source `Converter.convert` method.
    pub fn convert(&mut self, input: &Document) -> Result<(Document, LogDocument), ConvertError> {
        let kind = input.kind(input.root());
        if !matches!(kind, NodeKind::Document | NodeKind::DocumentFragment) {
            return Err(ConvertError::Type(format!(
                "convert expects a Document or DocumentFragment root, found {kind:?}"
            )));
        }

        let mut log = LogDocument::new();
        log::debug!(
            "convert: begin {}->{} (style={}) uri={:?}",
            self.from_lang,
            self.to_lang,
            self.style,
            input.uri
        );

        let (compiled, annotations, _compiled_root) = compile_phase(
            input,
            &self.registry,
            self.template_parser.as_ref(),
            &mut self.template_cache,
            &mut log,
        );
        log::debug!("convert: compile phase produced {} nodes", compiled.len());

        let mut compiled = compiled;
        link_phase(&mut compiled, &annotations, &mut log);
        log::debug!("convert: link phase complete");

        let style_module = self.style_module.clone();
        let mut state = RewriteState {
            log: &mut log,
            script_host: self.script_host.as_deref_mut(),
            text_parser: self.template_parser.as_ref(),
            next_pi_id: 0,
            uri: input.uri.clone(),
        };
        let mut output = rewrite_phase(&compiled, &annotations, &self.to_lang, &mut state, |ctx, root| {
            style_module.init_conversion(ctx, root);
        });
        output.style = "default".to_string();
        log::debug!("convert: rewrite phase complete, lang={} style={}", output.lang, output.style);

        let out_root = output.root();
        {
            let mut ctx = PhaseContext {
                doc: &mut output,
                log: &mut log,
                uri: input.uri.as_deref(),
            };
            self.style_module.convert(&mut ctx, out_root);
        }

        log::debug!("convert: end, log has {} message(s)", log.len());
        Ok((output, log))
    }

    /// Records a diagnostic message against `log`.
    pub fn msg(
        log: &mut LogDocument,
        module: &str,
        code: &str,
        node: Option<NodeId>,
        uri: Option<&str>,
        arg: Option<&str>,
    ) -> NodeId {
        log::warn!("{module} {code} node={:?} uri={:?} arg={:?}", node, uri, arg);
        log.push(module, code, node, uri, arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_directive::{ConvertContext, Restrict};
    use vellum_style::StyleInfo;

    struct StubParser;
    impl TextParser for StubParser {
        fn parse(&self, _text: &str, _lang: Option<&str>, _style: Option<&str>) -> (Document, LogDocument) {
            (Document::new_fragment(), LogDocument::new())
        }
    }

    struct EmptyStyle;
    impl StyleModule for EmptyStyle {
        fn repository(&self) -> Vec<(String, Rc<dyn NodeConverter>)> {
            Vec::new()
        }
        fn info(&self) -> StyleInfo {
            StyleInfo {
                version: "0.1.0".into(),
                lang: "xml".into(),
                to_lang: Some("xml".into()),
                kind: "converter".into(),
                description: "identity".into(),
                author: "test".into(),
                author_email: "test@example.com".into(),
                url: None,
                path: "identity".into(),
                license: "MIT".into(),
                style: "default".into(),
                ver: "1".into(),
            }
        }
    }

    fn sample_input() -> Document {
        let mut doc = Document::new("xml", "default");
        let root = doc.root();
        let a = doc.create_element("a");
        let b = doc.create_void("b");
        doc.append_child(a, b);
        doc.append_child(root, a);
        doc
    }

    #[test]
    fn empty_registry_passthrough_is_structural_clone() {
        let mut converter = Converter::new(
            "xml",
            "xml",
            "default",
            Rc::new(EmptyStyle),
            Box::new(StubParser),
            HashMap::new(),
        )
        .unwrap();
        let input = sample_input();
        let (output, log) = converter.convert(&input).unwrap();
        assert!(log.is_empty());
        assert_eq!(output.lang, "xml");
        assert_eq!(output.style, "default");
        assert!(input.structurally_eq(input.children(input.root())[0], &output, output.children(output.root())[0]));
    }

    struct Hide;
    impl NodeConverter for Hide {
        fn directive(&self) -> &str {
            "hide"
        }
        fn restrict(&self) -> Restrict {
            Restrict::ATTRIBUTE
        }
        fn remove(&self) -> bool {
            true
        }
    }

    struct HideStyle;
    impl StyleModule for HideStyle {
        fn repository(&self) -> Vec<(String, Rc<dyn NodeConverter>)> {
            vec![("Hide".to_string(), Rc::new(Hide) as Rc<dyn NodeConverter>)]
        }
        fn info(&self) -> StyleInfo {
            StyleInfo {
                version: "0.1.0".into(),
                lang: "xml".into(),
                to_lang: Some("xml".into()),
                kind: "converter".into(),
                description: "hide".into(),
                author: "test".into(),
                author_email: "test@example.com".into(),
                url: None,
                path: "hide".into(),
                license: "MIT".into(),
                style: "default".into(),
                ver: "1".into(),
            }
        }
    }

    #[test]
    fn remove_directive_drops_node_and_its_children() {
        let mut converter = Converter::new(
            "xml",
            "xml",
            "default",
            Rc::new(HideStyle),
            Box::new(StubParser),
            HashMap::new(),
        )
        .unwrap();
        let mut input = Document::new("xml", "default");
        let root = input.root();
        let p = input.create_element("p");
        input.node_mut(p).attributes.insert("hide".to_string(), String::new());
        let text = input.create_text("x");
        input.append_child(p, text);
        input.append_child(root, p);

        let (output, _log) = converter.convert(&input).unwrap();
        assert!(output.children(output.root()).is_empty());
    }

    #[test]
    fn priority_ordering_is_descending() {
        use std::cell::RefCell;
        use std::rc::Rc as StdRc;

        struct Hi;
        impl NodeConverter for Hi {
            fn directive(&self) -> &str {
                "hi"
            }
            fn restrict(&self) -> Restrict {
                Restrict::ATTRIBUTE
            }
            fn priority(&self) -> i32 {
                10
            }
            fn pre_link(&self, ctx: &mut dyn ConvertContext, _node: NodeId) {
                ctx.log("order", "hi", None, None);
            }
        }
        struct Lo;
        impl NodeConverter for Lo {
            fn directive(&self) -> &str {
                "lo"
            }
            fn restrict(&self) -> Restrict {
                Restrict::ATTRIBUTE
            }
            fn priority(&self) -> i32 {
                5
            }
            fn pre_link(&self, ctx: &mut dyn ConvertContext, _node: NodeId) {
                ctx.log("order", "lo", None, None);
            }
        }

        struct OrderStyle;
        impl StyleModule for OrderStyle {
            fn repository(&self) -> Vec<(String, Rc<dyn NodeConverter>)> {
                vec![
                    ("Hi".to_string(), Rc::new(Hi) as Rc<dyn NodeConverter>),
                    ("Lo".to_string(), Rc::new(Lo) as Rc<dyn NodeConverter>),
                ]
            }
            fn info(&self) -> StyleInfo {
                StyleInfo {
                    version: "0.1.0".into(),
                    lang: "xml".into(),
                    to_lang: Some("xml".into()),
                    kind: "converter".into(),
                    description: "order".into(),
                    author: "test".into(),
                    author_email: "test@example.com".into(),
                    url: None,
                    path: "order".into(),
                    license: "MIT".into(),
                    style: "default".into(),
                    ver: "1".into(),
                }
            }
        }

        let mut converter = Converter::new(
            "xml",
            "xml",
            "default",
            StdRc::new(OrderStyle),
            Box::new(StubParser),
            HashMap::new(),
        )
        .unwrap();
        let mut input = Document::new("xml", "default");
        let root = input.root();
        let p = input.create_element("p");
        input.node_mut(p).attributes.insert("lo".to_string(), String::new());
        input.node_mut(p).attributes.insert("hi".to_string(), String::new());
        input.append_child(root, p);

        let (_output, log) = converter.convert(&input).unwrap();
        let codes: Vec<String> = log
            .doc
            .children(log.doc.root())
            .iter()
            .map(|&id| log.doc.node(id).attributes.get("code").cloned().unwrap_or_default())
            .collect();
        assert_eq!(codes, vec!["hi".to_string(), "lo".to_string()]);
    }
}
