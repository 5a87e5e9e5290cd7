use std::collections::HashMap;

use vellum_directive::{Match, MatchInfo};
use vellum_dom::NodeId;

/// What the compile phase recorded on one node of the compiled copy: its
/// priority-ordered directive matches, the `remove` info bag, and the
/// instantiated template clone (if any) per matched directive name.
#[derive(Debug, Default)]
pub struct Annotation {
    pub matches: Vec<Match>,
    pub info: MatchInfo,
    /// directive name -> root of its instantiated template fragment, if the
    /// directive declared a `template`.
    pub template_clones: HashMap<String, Option<NodeId>>,
}

/// Side-map from compiled-copy node to its [`Annotation`], keeping the
/// `vellum-dom` node model free of conversion-specific fields (the same
/// pattern `LogDocument` uses for its `modules`/`explanation` maps).
pub type Annotations = HashMap<NodeId, Annotation>;
