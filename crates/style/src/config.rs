use std::collections::HashMap;

/// A style module's in-memory default configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Merges a style module's declared defaults with caller-supplied
/// overrides, overrides winning on key collision.
pub fn merge_defaults(
    module_defaults: &HashMap<String, ConfigValue>,
    overrides: &HashMap<String, ConfigValue>,
) -> HashMap<String, ConfigValue> {
    let mut merged = module_defaults.clone();
    for (k, v) in overrides {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_on_collision() {
        let mut defaults = HashMap::new();
        defaults.insert("indent".to_string(), ConfigValue::Int(2));
        defaults.insert("verbose".to_string(), ConfigValue::Bool(false));
        let mut overrides = HashMap::new();
        overrides.insert("indent".to_string(), ConfigValue::Int(4));
        let merged = merge_defaults(&defaults, &overrides);
        assert_eq!(merged.get("indent").and_then(ConfigValue::as_int), Some(4));
        assert_eq!(merged.get("verbose").and_then(ConfigValue::as_bool), Some(false));
    }
}
