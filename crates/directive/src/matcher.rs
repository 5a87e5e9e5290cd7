use std::rc::Rc;

use vellum_dom::{Document, NodeId};

use crate::converter::{MatchInfo, NodeConverter};
use crate::registry::DirectiveRegistry;
use crate::restrict::Restrict;

/// A single matched directive, ready for the compile phase to act on.
#[derive(Clone)]
pub struct Match {
    pub name: String,
    pub directive: Rc<dyn NodeConverter>,
    pub priority: i32,
}

/// Produces the priority-ordered directive matches for `node`, plus the
/// `remove` info bag.
///
/// Ordering: element-name match (if any) is considered before attribute
/// matches, attribute matches are tried in attribute-iteration (insertion)
/// order, and the whole list is then stable-sorted by priority descending —
/// so ties keep the element-before-attribute, insertion-order tie-break.
/// A `terminal` directive, once reached scanning in priority order,
/// discards every lower-priority match that follows it.
pub fn match_node(doc: &Document, node: NodeId, registry: &DirectiveRegistry) -> (Vec<Match>, MatchInfo) {
    let mut matches = Vec::new();

    let name = doc.name(node);
    if let Some(d) = registry.get(name) {
        if d.restrict().contains(Restrict::ELEMENT) {
            matches.push(Match {
                name: name.to_string(),
                directive: d.clone(),
                priority: d.priority(),
            });
        }
    }

    if doc.kind(node).can_have_attributes() {
        for attr_name in doc.node(node).attributes.keys() {
            if let Some(d) = registry.get(attr_name) {
                if d.restrict().contains(Restrict::ATTRIBUTE) {
                    matches.push(Match {
                        name: attr_name.clone(),
                        directive: d.clone(),
                        priority: d.priority(),
                    });
                }
            }
        }
    }

    matches.sort_by(|a, b| b.priority.cmp(&a.priority));

    if let Some(pos) = matches.iter().position(|m| m.directive.terminal()) {
        matches.truncate(pos + 1);
    }

    let mut info = MatchInfo::default();
    for m in &matches {
        if m.directive.remove() {
            info.remove.push(m.name.clone());
        }
    }

    (matches, info)
}
