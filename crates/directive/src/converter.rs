use vellum_dom::NodeId;

use crate::context::ConvertContext;
use crate::restrict::Restrict;
use crate::template::TemplateOptions;

/// Bookkeeping produced by the directive matcher for a single node.
/// Threaded into `compile` so a directive can see whether it, or a sibling
/// match, caused the node to be removed.
#[derive(Debug, Clone, Default)]
pub struct MatchInfo {
    /// Names of matched directives with `remove == true`.
    pub remove: Vec<String>,
}

impl MatchInfo {
    pub fn is_removed(&self) -> bool {
        !self.remove.is_empty()
    }
}

/// A directive: a named transformation rule matched against an element
/// name, attribute name, or class, carrying metadata and lifecycle hooks.
///
/// All metadata accessors have sensible defaults; implementors only
/// override the fields and hooks that matter for their rule.
pub trait NodeConverter {
    /// The directive name, matched against a node's element name or an
    /// attribute name depending on `restrict`. Must be non-empty.
    fn directive(&self) -> &str;

    fn restrict(&self) -> Restrict {
        Restrict::ELEMENT
    }

    fn priority(&self) -> i32 {
        0
    }

    fn template(&self) -> Option<&str> {
        None
    }

    fn template_options(&self) -> TemplateOptions {
        TemplateOptions::default()
    }

    fn remove(&self) -> bool {
        false
    }

    fn replace(&self) -> bool {
        false
    }

    fn transclude(&self) -> bool {
        true
    }

    fn terminal(&self) -> bool {
        false
    }

    fn require(&self) -> bool {
        false
    }

    fn copy(&self) -> bool {
        true
    }

    fn copy_children(&self) -> bool {
        true
    }

    /// Called once per match during the compile phase with the
    /// directive's instantiated template clone, if it has one.
    fn compile(&self, _ctx: &mut dyn ConvertContext, _template_node: Option<NodeId>, _info: &MatchInfo) {}

    /// Called during the link phase, top-down, after template splicing and
    /// transclusion have been applied to `node`.
    fn pre_link(&self, _ctx: &mut dyn ConvertContext, _node: NodeId) {}

    /// Called during the link phase, bottom-up, after all descendants of
    /// `node` have completed their own post_link.
    fn post_link(&self, _ctx: &mut dyn ConvertContext, _node: NodeId) {}

    /// Called on descent during the final rewrite walk. A returned node
    /// replaces `node` as the current output node.
    fn start(&self, _ctx: &mut dyn ConvertContext, node: NodeId) -> Option<NodeId> {
        let _ = node;
        None
    }

    /// Called on ascent during the final rewrite walk. A returned node
    /// replaces `node` in the output tree.
    fn end(&self, _ctx: &mut dyn ConvertContext, node: NodeId) -> Option<NodeId> {
        let _ = node;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Defaults;
    impl NodeConverter for Defaults {
        fn directive(&self) -> &str {
            "defaults"
        }
    }

    #[test]
    fn defaults_match_source_spec() {
        let d = Defaults;
        assert_eq!(d.restrict(), Restrict::ELEMENT);
        assert_eq!(d.priority(), 0);
        assert!(d.template().is_none());
        assert!(!d.remove());
        assert!(!d.replace());
        assert!(d.transclude());
        assert!(!d.terminal());
        assert!(!d.require());
        assert!(d.copy());
        assert!(d.copy_children());
    }
}
