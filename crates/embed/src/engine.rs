use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use vellum_convert::{ScriptHost, TextParser};
use vellum_directive::ConvertContext;
use vellum_dom::NodeId;
use vellum_style::StyleRegistry;

use crate::commands::{EchoValue, IncludeOptions, ScriptCommand};
use crate::context::{ConverterFrame, EngineContext};

const MSG_MODULE: &str = "embed";

/// A handle scripts use to read/write the shared execution namespace,
/// bound as `__NAMESPACE__`.
#[derive(Clone)]
struct NamespaceHandle(Rc<RefCell<std::collections::HashMap<String, rhai::Dynamic>>>);

impl NamespaceHandle {
    fn get(&mut self, key: String) -> rhai::Dynamic {
        self.0
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or(rhai::Dynamic::UNIT)
    }

    fn set(&mut self, key: String, value: rhai::Dynamic) {
        self.0.borrow_mut().insert(key, value);
    }
}

/// Implements [`ScriptHost`] by evaluating processing-instruction payloads
/// with `rhai`.
///
/// Host functions (`echo`, `include`, `pi`, `comment_pi`) cannot be given
/// direct mutable access to the live `Document` being converted, because
/// `rhai` requires registered functions to be `'static` while the document
/// is borrowed only for the duration of one `exec_script` call. Instead
/// they record the effect the script requested, in call order, into a
/// staging buffer; `exec_script` replays the buffer against the real tree
/// once evaluation finishes. `import_module` is the exception: it needs no
/// tree access, so it runs eagerly, evaluating the target file into the
/// engine's persistent namespace.
pub struct EmbedEngine {
    pub ctx: EngineContext,
    engine: rhai::Engine,
    commands: Rc<RefCell<Vec<ScriptCommand>>>,
    staged_nodes: Rc<RefCell<Vec<(String, String)>>>,
    imported: Rc<RefCell<HashSet<String>>>,
    style_registry: Rc<StyleRegistry>,
    #[allow(clippy::type_complexity)]
    parser_factory: Rc<dyn Fn(&str, &str) -> Box<dyn TextParser>>,
    /// URI of the document being converted, set once by the facade before
    /// `Converter::convert` runs. `exec_script` falls back to this when the
    /// converter-frame stack is empty (i.e. for a top-level PI, as opposed
    /// to one reached through a nested `include`).
    default_uri: Option<String>,
}

impl EmbedEngine {
    pub fn new(
        style_registry: Rc<StyleRegistry>,
        parser_factory: Rc<dyn Fn(&str, &str) -> Box<dyn TextParser>>,
    ) -> Self {
        let ctx = EngineContext::new();
        let commands = Rc::new(RefCell::new(Vec::new()));
        let staged_nodes = Rc::new(RefCell::new(Vec::new()));
        let imported = Rc::new(RefCell::new(HashSet::new()));

        let mut engine = rhai::Engine::new();
        engine.register_type_with_name::<NamespaceHandle>("Namespace");
        engine.register_fn("get", NamespaceHandle::get);
        engine.register_fn("set", NamespaceHandle::set);

        {
            let commands = commands.clone();
            engine.register_fn("echo", move |s: &str| {
                commands.borrow_mut().push(ScriptCommand::Echo(EchoValue::Text(s.to_string())));
            });
        }
        {
            let commands = commands.clone();
            engine.register_fn("echo", move |handle: i64| {
                commands
                    .borrow_mut()
                    .push(ScriptCommand::Echo(EchoValue::StagedNode(handle as usize)));
            });
        }
        {
            let staged = staged_nodes.clone();
            engine.register_fn("comment_pi", move |data: &str| -> i64 {
                staged.borrow_mut().push(("#comment".to_string(), data.to_string()));
                (staged.borrow().len() - 1) as i64
            });
        }
        {
            let staged = staged_nodes.clone();
            engine.register_fn("pi", move |target: &str, data: &str| -> i64 {
                staged.borrow_mut().push((target.to_string(), data.to_string()));
                (staged.borrow().len() - 1) as i64
            });
        }
        {
            let commands = commands.clone();
            engine.register_fn("include", move |path: &str| {
                commands.borrow_mut().push(ScriptCommand::Include {
                    path: path.to_string(),
                    opts: IncludeOptions::default(),
                });
            });
        }
        {
            let commands = commands.clone();
            engine.register_fn("include", move |path: &str, opts: rhai::Map| {
                commands.borrow_mut().push(ScriptCommand::Include {
                    path: path.to_string(),
                    opts: IncludeOptions::from_rhai_map(&opts),
                });
            });
        }
        {
            let commands = commands.clone();
            engine.register_fn("import_module", move |path: &str| {
                commands.borrow_mut().push(ScriptCommand::ImportModule {
                    path: path.to_string(),
                    name: None,
                });
            });
        }

        EmbedEngine {
            ctx,
            engine,
            commands,
            staged_nodes,
            imported,
            style_registry,
            parser_factory,
            default_uri: None,
        }
    }

    /// Records the URI of the document about to be converted, so the first
    /// PI reached (which has no enclosing converter frame yet) can still
    /// resolve relative `include`/`import_module` paths.
    pub fn set_document_uri(&mut self, uri: Option<String>) {
        self.default_uri = uri;
    }

    fn base_dir(uri: Option<&str>) -> PathBuf {
        match uri {
            Some(u) => Path::new(u)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            None => PathBuf::from("."),
        }
    }

    fn infer_lang(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("xml")
            .to_string()
    }

    fn run_eager_import(&mut self, path: &str, base_dir: &Path) {
        let resolved = base_dir.join(path);
        let key = resolved.to_string_lossy().to_string();
        if !self.imported.borrow_mut().insert(key) {
            return;
        }
        match std::fs::read_to_string(&resolved) {
            Ok(src) => {
                let mut scope = rhai::Scope::new();
                for (k, v) in self.ctx.namespace.borrow().iter() {
                    scope.push_dynamic(k.clone(), v.clone());
                }
                match self.engine.eval_with_scope::<rhai::Dynamic>(&mut scope, &src) {
                    Ok(_) => {
                        for (name, _is_const, value) in scope.iter() {
                            self.ctx.namespace.borrow_mut().insert(name.to_string(), value);
                        }
                    }
                    Err(e) => {
                        log::warn!("import_module: evaluating {:?} failed: {e}", resolved);
                    }
                }
            }
            Err(e) => {
                log::warn!("import_module: cannot read {:?}: {e}", resolved);
            }
        }
    }
}

impl ScriptHost for EmbedEngine {
    fn exec_script(
        &mut self,
        ctx: &mut dyn ConvertContext,
        node: NodeId,
        id_num: u64,
        text_parser: &dyn TextParser,
        raise_on_error: bool,
    ) -> NodeId {
        let uri = self
            .ctx
            .current_frame()
            .and_then(|f| f.uri.clone())
            .or_else(|| self.default_uri.clone());
        let base_dir = Self::base_dir(uri.as_deref());
        let data = ctx.doc_mut().data(node).to_string();

        self.ctx.push(
            node,
            ConverterFrame {
                from_lang: String::new(),
                to_lang: None,
                style: String::new(),
                uri: uri.clone(),
            },
        );

        self.commands.borrow_mut().clear();
        self.staged_nodes.borrow_mut().clear();

        let namespace_handle = NamespaceHandle(self.ctx.namespace.clone());
        let mut scope = rhai::Scope::new();
        scope.push("__FILE__", uri.clone().unwrap_or_default());
        scope.push("__DIR__", base_dir.to_string_lossy().to_string());
        scope.push("__NODE__", format!("{node:?}"));
        scope.push("__NAMESPACE__", namespace_handle);

        let eval_result = self
            .engine
            .eval_with_scope::<rhai::Dynamic>(&mut scope, &data);

        if let Err(e) = &eval_result {
            Self::emit_error(ctx, node, id_num, &uri, &e.to_string(), raise_on_error);
        }

        let commands: Vec<ScriptCommand> = self.commands.borrow_mut().drain(..).collect();
        let staged: Vec<(String, String)> = self.staged_nodes.borrow().clone();

        for command in commands {
            self.apply_command(ctx, node, text_parser, &base_dir, &staged, command);
        }

        self.ctx.pop();
        ctx.doc_mut().remove_and_anchor(node)
    }
}

impl EmbedEngine {
    fn emit_error(
        ctx: &mut dyn ConvertContext,
        node: NodeId,
        id_num: u64,
        uri: &Option<String>,
        message: &str,
        raise_on_error: bool,
    ) {
        ctx.log(MSG_MODULE, "E100", Some(node), Some(message));
        if raise_on_error {
            let error_elem = ctx.doc_mut().create_element("script_pi_error");
            ctx.doc_mut()
                .node_mut(error_elem)
                .attributes
                .insert("id".to_string(), id_num.to_string());
            let trace = ctx.doc_mut().create_cdata(message.to_string());
            ctx.doc_mut().append_child(error_elem, trace);
            ctx.doc_mut().insert_before(node, error_elem);
        }
        let _ = uri;
    }

    fn apply_command(
        &mut self,
        ctx: &mut dyn ConvertContext,
        node: NodeId,
        text_parser: &dyn TextParser,
        base_dir: &Path,
        staged: &[(String, String)],
        command: ScriptCommand,
    ) {
        match command {
            ScriptCommand::Echo(EchoValue::Text(text)) => {
                let id = ctx.doc_mut().create_text(text);
                ctx.doc_mut().insert_before(node, id);
            }
            ScriptCommand::Echo(EchoValue::StagedNode(idx)) => {
                if let Some((target, data)) = staged.get(idx) {
                    let id = ctx.doc_mut().create_pi(target.clone(), data.clone());
                    ctx.doc_mut().insert_before(node, id);
                }
            }
            ScriptCommand::Include { path, opts } => {
                self.apply_include(ctx, node, text_parser, base_dir, path, opts);
            }
            ScriptCommand::ImportModule { path, .. } => {
                self.run_eager_import(&path, base_dir);
            }
        }
    }

    fn apply_include(
        &mut self,
        ctx: &mut dyn ConvertContext,
        node: NodeId,
        text_parser: &dyn TextParser,
        base_dir: &Path,
        path: String,
        opts: IncludeOptions,
    ) {
        let resolved = base_dir.join(&path);
        let text = match std::fs::read_to_string(&resolved) {
            Ok(t) => t,
            Err(e) => {
                ctx.log(MSG_MODULE, "E100", Some(node), Some(&format!("include {path:?}: {e}")));
                return;
            }
        };
        let inferred_lang = opts.parser_lang.clone().unwrap_or_else(|| Self::infer_lang(&resolved));
        let parser_style = opts.parser_style.clone().unwrap_or_else(|| "default".to_string());
        let resolved_uri = resolved.to_string_lossy().to_string();
        let (parsed_doc, parse_log) = text_parser.parse(&text, Some(&inferred_lang), Some(&parser_style));

        if !parse_log.is_empty() {
            let mut ctx_log = vellum_dom::LogDocument::new();
            ctx_log.merge_bracketed(&parse_log, MSG_MODULE, "W101", "W102", Some(&resolved_uri));
            // fold into the converter's own log through the trait surface.
            for &rec in ctx_log.doc.children(ctx_log.doc.root()) {
                let attrs = ctx_log.doc.node(rec).attributes.clone();
                ctx.log(
                    attrs.get("module").map(String::as_str).unwrap_or(MSG_MODULE),
                    attrs.get("code").map(String::as_str).unwrap_or("W101"),
                    Some(node),
                    attrs.get("arg").map(String::as_str),
                );
            }
        }

        let fragment_source = if let Some(convert_to) = &opts.convert_to {
            let convert_from = opts.convert_from.clone().unwrap_or_else(|| inferred_lang.clone());
            let convert_style = opts.convert_style.clone().unwrap_or_else(|| "default".to_string());
            match self
                .style_registry
                .resolve(&convert_from, Some(convert_to.as_str()), &convert_style)
            {
                Ok(style_module) => {
                    let template_parser = (self.parser_factory)(&convert_from, &convert_style);
                    match vellum_convert::Converter::new(
                        convert_from.clone(),
                        convert_to.clone(),
                        convert_style.clone(),
                        style_module,
                        template_parser,
                        std::collections::HashMap::new(),
                    ) {
                        Ok(mut inner) => match inner.convert(&parsed_doc) {
                            Ok((converted, inner_log)) => {
                                if !inner_log.is_empty() {
                                    for &rec in inner_log.doc.children(inner_log.doc.root()) {
                                        let attrs = inner_log.doc.node(rec).attributes.clone();
                                        ctx.log(
                                            attrs.get("module").map(String::as_str).unwrap_or(MSG_MODULE),
                                            attrs.get("code").map(String::as_str).unwrap_or("W101"),
                                            Some(node),
                                            attrs.get("arg").map(String::as_str),
                                        );
                                    }
                                }
                                Some(converted)
                            }
                            Err(e) => {
                                ctx.log(MSG_MODULE, "E100", Some(node), Some(&e.to_string()));
                                None
                            }
                        },
                        Err(e) => {
                            ctx.log(MSG_MODULE, "E100", Some(node), Some(&e.to_string()));
                            None
                        }
                    }
                }
                Err(e) => {
                    ctx.log(MSG_MODULE, "E100", Some(node), Some(&e.to_string()));
                    None
                }
            }
        } else {
            Some(parsed_doc)
        };

        if let Some(source_doc) = fragment_source {
            let doc = ctx.doc_mut();
            if opts.adopt {
                let fragment = doc.import_children_as_fragment(&source_doc, source_doc.root());
                doc.extend_before(node, fragment);
            } else {
                let imported_root = doc.import_deep(&source_doc, source_doc.root());
                doc.insert_before(node, imported_root);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_dom::{Document, LogDocument, NodeKind};

    struct StubParser;
    impl TextParser for StubParser {
        fn parse(&self, text: &str, _lang: Option<&str>, _style: Option<&str>) -> (Document, LogDocument) {
            let mut doc = Document::new_fragment();
            let root = doc.root();
            let t = doc.create_text(text.to_string());
            doc.append_child(root, t);
            (doc, LogDocument::new())
        }
    }

    struct TestCtx {
        doc: Document,
        log: LogDocument,
    }

    impl ConvertContext for TestCtx {
        fn doc_mut(&mut self) -> &mut Document {
            &mut self.doc
        }

        fn log(&mut self, module: &str, code: &str, node: Option<NodeId>, arg: Option<&str>) {
            self.log.push(module, code, node, None, arg);
        }
    }

    fn make_engine() -> EmbedEngine {
        let registry = Rc::new(StyleRegistry::new());
        let factory: Rc<dyn Fn(&str, &str) -> Box<dyn TextParser>> =
            Rc::new(|_from: &str, _style: &str| Box::new(StubParser) as Box<dyn TextParser>);
        EmbedEngine::new(registry, factory)
    }

    #[test]
    fn echo_text_and_staged_comment_are_spliced_before_pi_in_order() {
        let mut engine = make_engine();
        let mut ctx = TestCtx {
            doc: Document::new("xml", "default"),
            log: LogDocument::new(),
        };
        let root = ctx.doc.root();
        let script = r#"
            echo("hello");
            let c = comment_pi("note");
            echo(c);
        "#;
        let pi = ctx.doc.create_pi("script", script);
        ctx.doc.append_child(root, pi);

        let anchor = engine.exec_script(&mut ctx, pi, 1, &StubParser, true);

        let kids = ctx.doc.children(root);
        assert_eq!(kids.len(), 2);
        assert_eq!(ctx.doc.kind(kids[0]), NodeKind::Text);
        assert_eq!(ctx.doc.data(kids[0]), "hello");
        assert_eq!(ctx.doc.kind(kids[1]), NodeKind::ProcessingInstruction);
        assert_eq!(ctx.doc.name(kids[1]), "#comment");
        assert_eq!(ctx.doc.data(kids[1]), "note");
        assert!(ctx.doc.parent(pi).is_none());
        assert_eq!(anchor, kids[1]);
        assert!(ctx.log.is_empty());
        assert_eq!(engine.ctx.depth(), 0);
    }

    #[test]
    fn script_error_logs_e100_and_inserts_trace_element_when_raise_on_error() {
        let mut engine = make_engine();
        let mut ctx = TestCtx {
            doc: Document::new("xml", "default"),
            log: LogDocument::new(),
        };
        let root = ctx.doc.root();
        let pi = ctx.doc.create_pi("script", "this is not valid rhai (((");
        ctx.doc.append_child(root, pi);

        engine.exec_script(&mut ctx, pi, 7, &StubParser, true);

        assert!(!ctx.log.is_empty());
        let kids = ctx.doc.children(root);
        assert!(kids
            .iter()
            .any(|&k| ctx.doc.kind(k) == NodeKind::Element && ctx.doc.name(k) == "script_pi_error"));
    }

    #[test]
    fn include_reads_file_and_splices_parsed_children_before_pi() {
        use std::io::Write;

        let mut engine = make_engine();
        let dir = std::env::temp_dir().join(format!("vellum-embed-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let included = dir.join("snippet.txt");
        std::fs::File::create(&included).unwrap().write_all(b"included-text").unwrap();

        let owner_uri = dir.join("owner.xml").to_string_lossy().to_string();
        let mut ctx = TestCtx {
            doc: Document::new("xml", "default"),
            log: LogDocument::new(),
        };
        ctx.doc.uri = Some(owner_uri.clone());
        engine.set_document_uri(Some(owner_uri));

        let root = ctx.doc.root();
        let pi = ctx.doc.create_pi("script", r#"include("snippet.txt");"#);
        ctx.doc.append_child(root, pi);

        engine.exec_script(&mut ctx, pi, 2, &StubParser, true);

        let kids = ctx.doc.children(root);
        assert!(kids
            .iter()
            .any(|&k| ctx.doc.kind(k) == NodeKind::Text && ctx.doc.data(k) == "included-text"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
