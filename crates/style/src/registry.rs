use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StyleError;
use crate::module::StyleModule;

/// Builds the `"<from>-converter-<to>-<style>"` module key, omitting the
/// `-<to>` segment for within-language conversions.
pub fn module_key(from: &str, to: Option<&str>, style: &str) -> String {
    match to {
        Some(to) => format!("{from}-converter-{to}-{style}"),
        None => format!("{from}-converter-{style}"),
    }
}

/// An in-process substitute for filesystem-based style module discovery:
/// modules are registered by key at startup rather than imported by path.
#[derive(Default)]
pub struct StyleRegistry {
    modules: HashMap<String, Rc<dyn StyleModule>>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        StyleRegistry {
            modules: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        from: &str,
        to: Option<&str>,
        style: &str,
        module: Rc<dyn StyleModule>,
        override_existing: bool,
    ) -> Result<(), StyleError> {
        let key = module_key(from, to, style);
        if !override_existing && self.modules.contains_key(&key) {
            return Err(StyleError::Duplicate(key));
        }
        self.modules.insert(key, module);
        Ok(())
    }

    pub fn resolve(
        &self,
        from: &str,
        to: Option<&str>,
        style: &str,
    ) -> Result<Rc<dyn StyleModule>, StyleError> {
        let key = module_key(from, to, style);
        self.modules
            .get(&key)
            .cloned()
            .ok_or(StyleError::Unknown(key))
    }
}
