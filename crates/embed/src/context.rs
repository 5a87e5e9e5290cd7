use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use vellum_dom::NodeId;

/// Metadata about the conversion that is currently executing embedded code,
/// pushed onto the converter stack so nested `include`/`import_module`
/// calls resolve relative paths against the right document.
#[derive(Debug, Clone)]
pub struct ConverterFrame {
    pub from_lang: String,
    pub to_lang: Option<String>,
    pub style: String,
    pub uri: Option<String>,
}

/// The reified, per-engine-instance holder of the shared execution
/// namespace and the current-node/converter stacks.
///
/// A host embedding the engine owns exactly one `EngineContext` per
/// concurrent conversion; sharing one across threads is not supported.
pub struct EngineContext {
    /// The shared variable namespace embedded scripts execute against
    /// (exposed to scripts as `__NAMESPACE__`, via `get`/`set` methods).
    /// Values set by one PI remain visible to later PIs in the same
    /// conversion.
    pub namespace: Rc<RefCell<HashMap<String, rhai::Dynamic>>>,
    current_node_stack: Vec<NodeId>,
    converter_stack: Vec<ConverterFrame>,
}

impl EngineContext {
    pub fn new() -> Self {
        EngineContext {
            namespace: Rc::new(RefCell::new(HashMap::new())),
            current_node_stack: Vec::new(),
            converter_stack: Vec::new(),
        }
    }

    pub fn push(&mut self, node: NodeId, frame: ConverterFrame) {
        self.current_node_stack.push(node);
        self.converter_stack.push(frame);
    }

    pub fn pop(&mut self) {
        self.current_node_stack.pop();
        self.converter_stack.pop();
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current_node_stack.last().copied()
    }

    pub fn current_frame(&self) -> Option<&ConverterFrame> {
        self.converter_stack.last()
    }

    pub fn depth(&self) -> usize {
        debug_assert_eq!(self.current_node_stack.len(), self.converter_stack.len());
        self.current_node_stack.len()
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
