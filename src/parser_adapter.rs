use vellum_convert::TextParser;
use vellum_dom::{Document, LogDocument};

/// Adapts [`vellum_xml_lang::Parser`] (which takes a `uri` but is fixed to
/// one `(lang, style)` at construction) to [`TextParser`] (which takes
/// `lang`/`style` per call but no `uri`) — the shape `vellum-convert` needs
/// for template compilation and `vellum-embed` needs for `include`.
///
/// This reference build only ships one concrete language, `xml`; the
/// adapter ignores the per-call `lang`/`style` hints rather than failing on
/// an unknown one, since they're advisory (inferred from a file extension)
/// and the single registered parser is the only one that can serve them.
pub struct ParserAdapter {
    parser: vellum_xml_lang::Parser,
}

impl ParserAdapter {
    pub fn new(lang: impl Into<String>, style: impl Into<String>) -> Self {
        ParserAdapter {
            parser: vellum_xml_lang::Parser::new(lang, style),
        }
    }
}

impl TextParser for ParserAdapter {
    fn parse(&self, text: &str, _lang: Option<&str>, _style: Option<&str>) -> (Document, LogDocument) {
        self.parser.parse(text, None)
    }
}

/// The facade's parser factory: builds a [`ParserAdapter`] for any
/// `(lang, style)` pair. Shared by `Converter::new` (template compilation)
/// and `EmbedEngine` (`include`'s nested parse/convert).
pub fn parser_factory(lang: &str, style: &str) -> Box<dyn TextParser> {
    Box::new(ParserAdapter::new(lang.to_string(), style.to_string()))
}

/// Infers a language tag from a file's extension, defaulting to `xml`
/// when absent — mirrors `vellum_embed`'s own `infer_lang` used for
/// `include`.
pub fn infer_lang_from_path(path: &std::path::Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xml")
        .to_string()
}
