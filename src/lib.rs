//! `vellum`: a directive-driven, multi-language document conversion engine.
//!
//! This crate is the facade the rest of the workspace builds up to: it
//! wires the arena-backed tree (`vellum_dom`), the directive registry and
//! matcher (`vellum_directive`), the style-module registry
//! (`vellum_style`), the compile/link/rewrite pipeline
//! (`vellum_convert`), embedded execution (`vellum_embed`), and the
//! reference XML-like language (`vellum_xml_lang`) into the four
//! module-level operations the original system exposed: `parse`, `read`,
//! `convert`, `write`.
//!
//! A host application constructs one [`Engine`] per set of style modules
//! it wants available, registering each with a [`vellum_style::StyleRegistry`]
//! before building the `Engine`. Each [`Engine::convert`] call builds a
//! fresh [`vellum_embed::EmbedEngine`] (and so a fresh execution namespace
//! and current-node/converter stack) scoped to that one call, matching the
//! "lifecycle bound to the enclosing entry-point call" rule for the
//! original's process-wide execution state (see `SPEC_FULL.md` §5).

mod error;
mod parser_adapter;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;
use std::rc::Rc;

use vellum_convert::Converter;
use vellum_dom::{Document, LogDocument};
use vellum_embed::EmbedEngine;
use vellum_style::{ConfigValue, StyleRegistry};

pub use error::EngineError;
pub use parser_adapter::{infer_lang_from_path, parser_factory, ParserAdapter};

// Re-export the pieces a host needs to assemble style modules without
// depending on the workspace crates directly.
pub use vellum_convert::ConvertError;
pub use vellum_directive::{ConvertContext, DirectiveRegistry, Match, MatchInfo, NodeConverter, Restrict};
pub use vellum_dom::{Node, NodeId, NodeKind};
pub use vellum_style::{module_key, StyleError, StyleInfo, StyleModule};
pub use vellum_xml_lang::{Parser as XmlParser, Writer as XmlWriter};

/// How [`Engine::write`] opens its destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate (or create) the file, matching Python's `mode='w'`.
    Truncate,
    /// Append to (or create) the file, matching Python's `mode='a'`.
    Append,
}

/// The top-level engine: a resolved set of style modules plus the
/// reference `xml` parser/writer, exposing the four module-level
/// operations the original system's entry point provided.
pub struct Engine {
    styles: Rc<StyleRegistry>,
}

impl Engine {
    /// Builds an engine over `styles`, which should already have every
    /// `(from, to, style)` triple the host cares about registered — style
    /// modules are resolved in-process rather than discovered from disk
    /// (`SPEC_FULL.md` §4.2).
    pub fn new(styles: StyleRegistry) -> Self {
        Engine {
            styles: Rc::new(styles),
        }
    }

    /// `parse(text, lang='xml', style='default') -> (Document, Log)`.
    ///
    /// Only the `xml` reference language is implemented by this crate; any
    /// other `lang` still parses with the reference XML-like grammar (it
    /// is recorded on the returned document's `lang` field regardless, so
    /// `convert` can still resolve a style keyed on it).
    pub fn parse(&self, text: &str, lang: &str, style: &str) -> (Document, LogDocument) {
        let parser = vellum_xml_lang::Parser::new(lang.to_string(), style.to_string());
        parser.parse(text, None)
    }

    /// `read(filename, style='default', lang=None) -> (Document, Log)`,
    /// inferring `lang` from the file extension when not given.
    pub fn read(
        &self,
        filename: &str,
        style: &str,
        lang: Option<&str>,
    ) -> Result<(Document, LogDocument), EngineError> {
        let path = Path::new(filename);
        let lang = lang
            .map(str::to_string)
            .unwrap_or_else(|| infer_lang_from_path(path));
        let text = std::fs::read_to_string(path)?;
        let parser = vellum_xml_lang::Parser::new(lang, style.to_string());
        Ok(parser.parse(&text, Some(filename)))
    }

    /// `convert(doc, lang=None, style='default') -> (Document, Log)`,
    /// defaulting the target language to the input document's own
    /// language (a same-language conversion is how a style's directives
    /// get applied without a format change, e.g. `xml -> xml`).
    pub fn convert(
        &self,
        doc: &Document,
        lang: Option<&str>,
        style: &str,
    ) -> Result<(Document, LogDocument), EngineError> {
        self.convert_with_defaults(doc, lang, style, HashMap::new())
    }

    /// As [`Engine::convert`], additionally overriding the style module's
    /// declared configuration defaults (`SPEC_FULL.md` §4.11).
    pub fn convert_with_defaults(
        &self,
        doc: &Document,
        lang: Option<&str>,
        style: &str,
        overrides: HashMap<String, ConfigValue>,
    ) -> Result<(Document, LogDocument), EngineError> {
        let from_lang = doc.lang.clone();
        let to_lang = lang.map(str::to_string).unwrap_or_else(|| from_lang.clone());

        let style_module = self
            .styles
            .resolve(&from_lang, Some(to_lang.as_str()), style)?;
        let template_parser = parser_factory(&from_lang, style);

        let mut converter = Converter::new(
            from_lang.clone(),
            to_lang.clone(),
            style.to_string(),
            style_module,
            template_parser,
            overrides,
        )?;

        let parser_factory_fn: Rc<dyn Fn(&str, &str) -> Box<dyn vellum_convert::TextParser>> =
            Rc::new(parser_factory);
        let mut embed = EmbedEngine::new(self.styles.clone(), parser_factory_fn);
        embed.set_document_uri(doc.uri.clone());
        converter.set_script_host(Box::new(embed));

        let (output, log) = converter.convert(doc)?;
        Ok((output, log))
    }

    /// `write(doc, filename=None, mode='w')`: writes to `filename` if
    /// given, or to standard output otherwise.
    pub fn write(
        &self,
        doc: &Document,
        filename: Option<&str>,
        mode: WriteMode,
    ) -> Result<(), EngineError> {
        let writer = vellum_xml_lang::Writer::new();
        let text = writer.write(doc);
        match filename {
            Some(path) => {
                let mut file = match mode {
                    WriteMode::Truncate => OpenOptions::new().write(true).create(true).truncate(true).open(path)?,
                    WriteMode::Append => OpenOptions::new().append(true).create(true).open(path)?,
                };
                file.write_all(text.as_bytes())?;
                Ok(())
            }
            None => {
                print!("{text}");
                Ok(())
            }
        }
    }
}
