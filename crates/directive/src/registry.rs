use std::collections::HashMap;
use std::rc::Rc;

use crate::converter::NodeConverter;
use crate::error::DirectiveError;

/// Holds every registered directive, keyed by both its class name and its
/// `directive` field. Both keys resolve to the same
/// shared instance.
#[derive(Default)]
pub struct DirectiveRegistry {
    by_key: HashMap<String, Rc<dyn NodeConverter>>,
    /// Registration order of directive names, used by the matcher to build
    /// a stable starting order before the priority sort.
    order: Vec<String>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        DirectiveRegistry {
            by_key: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers `instance` under `class_name` and under its own
    /// `directive()` name. Rejects an empty directive name, and rejects
    /// either key already being taken unless `override_existing` is true.
    pub fn register(
        &mut self,
        class_name: &str,
        instance: Rc<dyn NodeConverter>,
        override_existing: bool,
    ) -> Result<(), DirectiveError> {
        let name = instance.directive().to_string();
        if name.is_empty() {
            return Err(DirectiveError::MissingName(class_name.to_string()));
        }
        if !override_existing {
            if self.by_key.contains_key(class_name) {
                return Err(DirectiveError::Duplicate(class_name.to_string()));
            }
            if self.by_key.contains_key(&name) {
                return Err(DirectiveError::Duplicate(name));
            }
        }
        if !self.order.contains(&name) {
            self.order.push(name.clone());
        }
        self.by_key.insert(class_name.to_string(), instance.clone());
        self.by_key.insert(name, instance);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Rc<dyn NodeConverter>> {
        self.by_key.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restrict::Restrict;

    struct Hide;
    impl NodeConverter for Hide {
        fn directive(&self) -> &str {
            "hide"
        }
        fn restrict(&self) -> Restrict {
            Restrict::ATTRIBUTE
        }
        fn remove(&self) -> bool {
            true
        }
    }

    struct Unnamed;
    impl NodeConverter for Unnamed {
        fn directive(&self) -> &str {
            ""
        }
    }

    #[test]
    fn register_rejects_missing_name() {
        let mut reg = DirectiveRegistry::new();
        let err = reg.register("Unnamed", Rc::new(Unnamed), false);
        assert!(matches!(err, Err(DirectiveError::MissingName(_))));
    }

    #[test]
    fn register_rejects_duplicate_without_override() {
        let mut reg = DirectiveRegistry::new();
        reg.register("Hide", Rc::new(Hide), false).unwrap();
        let err = reg.register("Hide", Rc::new(Hide), false);
        assert!(matches!(err, Err(DirectiveError::Duplicate(_))));
    }

    #[test]
    fn register_allows_duplicate_with_override() {
        let mut reg = DirectiveRegistry::new();
        reg.register("Hide", Rc::new(Hide), false).unwrap();
        reg.register("Hide", Rc::new(Hide), true).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn register_is_keyed_by_both_class_and_directive_name() {
        let mut reg = DirectiveRegistry::new();
        reg.register("Hide", Rc::new(Hide), false).unwrap();
        assert!(reg.get("Hide").is_some());
        assert!(reg.get("hide").is_some());
    }
}
