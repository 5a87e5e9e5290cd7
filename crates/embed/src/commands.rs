/// A value passed to the `echo` helper from within a script.
#[derive(Debug, Clone)]
pub enum EchoValue {
    Text(String),
    /// A node staged earlier in the same script via `comment_pi`/`pi`,
    /// identified by its position in the call's staged-node list.
    StagedNode(usize),
}

/// Options recognized by the `include` helper.
#[derive(Debug, Clone)]
pub struct IncludeOptions {
    pub parser_lang: Option<String>,
    pub parser_style: Option<String>,
    pub convert_to: Option<String>,
    pub convert_from: Option<String>,
    pub convert_style: Option<String>,
    /// If false, the included `Document` node itself is inserted rather
    /// than just its children.
    pub adopt: bool,
}

impl Default for IncludeOptions {
    fn default() -> Self {
        IncludeOptions {
            parser_lang: None,
            parser_style: None,
            convert_to: None,
            convert_from: None,
            convert_style: None,
            adopt: true,
        }
    }
}

impl IncludeOptions {
    pub fn from_rhai_map(map: &rhai::Map) -> Self {
        let get_str = |key: &str| -> Option<String> {
            map.get(key).and_then(|v| v.clone().into_string().ok())
        };
        IncludeOptions {
            parser_lang: get_str("parser_lang"),
            parser_style: get_str("parser_style"),
            convert_to: get_str("convert_to"),
            convert_from: get_str("convert_from"),
            convert_style: get_str("convert_style"),
            adopt: map
                .get("adopt")
                .and_then(|v| v.clone().as_bool().ok())
                .unwrap_or(true),
        }
    }
}

/// A single effect requested by an embedded script, recorded in call order
/// by host functions during `rhai` evaluation and replayed against the real
/// document once evaluation finishes.
///
/// Host functions registered with `rhai` must be `'static`, which rules out
/// giving a script direct mutable access to the live `Document` being
/// converted. Staging the requested effects and applying them afterward
/// keeps the tree mutation logic in ordinary Rust while still letting a
/// script interleave `echo`/`include`/`import_module` calls in any order.
#[derive(Debug, Clone)]
pub enum ScriptCommand {
    Echo(EchoValue),
    Include { path: String, opts: IncludeOptions },
    ImportModule { path: String, name: Option<String> },
}
