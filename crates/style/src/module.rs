use std::collections::HashMap;
use std::rc::Rc;

use vellum_directive::{ConvertContext, NodeConverter};
use vellum_dom::NodeId;

use crate::config::ConfigValue;

/// Metadata describing a style module.
#[derive(Debug, Clone)]
pub struct StyleInfo {
    pub version: String,
    pub lang: String,
    pub to_lang: Option<String>,
    pub kind: String,
    pub description: String,
    pub author: String,
    pub author_email: String,
    pub url: Option<String>,
    pub path: String,
    pub license: String,
    pub style: String,
    pub ver: String,
}

/// A pluggable unit providing the directive registry and final conversion
/// hooks for one `(from, to, style)` triple, registered in-process rather
/// than discovered dynamically from the filesystem.
pub trait StyleModule {
    /// Ordered list of `(class_name, directive_instance)` pairs to register,
    /// in the order they should be tried by the matcher when priorities tie.
    fn repository(&self) -> Vec<(String, Rc<dyn NodeConverter>)>;

    fn defaults(&self) -> HashMap<String, ConfigValue> {
        HashMap::new()
    }

    /// Called once before the final rewrite walk begins.
    fn init_conversion(&self, _ctx: &mut dyn ConvertContext, _output_root: NodeId) {}

    /// Called once after the final rewrite walk completes.
    fn convert(&self, _ctx: &mut dyn ConvertContext, _output_root: NodeId) {}

    /// Message-code -> format string table, used to render log explanations.
    fn messages(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Ordered long-form explanations, rendered alongside `messages()`.
    fn message_explanations(&self) -> Vec<String> {
        Vec::new()
    }

    fn info(&self) -> StyleInfo;
}
