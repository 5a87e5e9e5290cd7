use vellum_dom::{Document, LogDocument};

/// What the converter needs from a parser collaborator: turn text into a
/// document plus a recoverable-error log. Kept as a trait so `vellum-convert` does not depend on
/// any one concrete language implementation (`vellum-xml-lang` is one such
/// implementation, wired in by the `vellum` facade crate).
pub trait TextParser {
    fn parse(&self, text: &str, lang: Option<&str>, style: Option<&str>) -> (Document, LogDocument);
}
