/// Configuration passed to the parser when compiling a directive's
/// `template` source.
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    pub parser_lang: Option<String>,
    pub parser_style: Option<String>,
}
