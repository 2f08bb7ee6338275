//! Naming-rule table driving layer classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a component prefix maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRule {
    /// Engine-side component type, e.g. `Button`. Empty for a plain component.
    pub engine_type: String,
    /// Stable lowercase tag used when building export names.
    pub tag: String,
}

impl ComponentRule {
    pub fn new(engine_type: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            engine_type: engine_type.into(),
            tag: tag.into(),
        }
    }
}

/// Layer-name conventions. An empty string disables the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRules {
    /// Marks a layer as shared across documents.
    pub common_prefix: String,
    /// Excludes a layer and its whole subtree from output.
    pub no_export_suffix: String,
    pub loader_suffix: String,
    pub input_suffix: String,
    pub rich_text_suffix: String,
    /// Forces a group to be flattened into a single image.
    pub image_suffix: String,
    /// Prepended to the file name of shared components.
    pub common_file_prefix: String,
    /// Component prefixes (written without the trailing `$`).
    pub components: BTreeMap<String, ComponentRule>,
}

impl Default for NamingRules {
    fn default() -> Self {
        let mut components = BTreeMap::new();
        components.insert("Com".to_string(), ComponentRule::new("", "com"));
        components.insert("Btn".to_string(), ComponentRule::new("Button", "btn"));
        components.insert("Label".to_string(), ComponentRule::new("Label", "label"));
        components.insert("Prog".to_string(), ComponentRule::new("ProgressBar", "progress"));
        components.insert("Slider".to_string(), ComponentRule::new("Slider", "slider"));
        components.insert("Scroll".to_string(), ComponentRule::new("ScrollBar", "scroll"));
        components.insert("Combo".to_string(), ComponentRule::new("ComboBox", "combo"));

        Self {
            common_prefix: "common_".to_string(),
            no_export_suffix: "@skip".to_string(),
            loader_suffix: "@loader".to_string(),
            input_suffix: "@input".to_string(),
            rich_text_suffix: "@rich".to_string(),
            image_suffix: "@img".to_string(),
            common_file_prefix: String::new(),
            components,
        }
    }
}

impl NamingRules {
    /// Component prefixes, longest first so `Btn` never shadows `BtnGroup`.
    pub fn component_prefixes(&self) -> Vec<(&str, &ComponentRule)> {
        let mut prefixes: Vec<(&str, &ComponentRule)> = self
            .components
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        prefixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let rules: NamingRules = serde_yaml::from_str("no_export_suffix: \"#\"").unwrap();
        assert_eq!(rules.no_export_suffix, "#");
        assert_eq!(rules.loader_suffix, "@loader");
        assert!(rules.components.contains_key("Btn"));
    }

    #[test]
    fn test_component_prefixes_longest_first() {
        let mut rules = NamingRules::default();
        rules
            .components
            .insert("BtnGroup".to_string(), ComponentRule::new("", "btngroup"));
        let prefixes = rules.component_prefixes();
        let btn_group = prefixes.iter().position(|(p, _)| *p == "BtnGroup").unwrap();
        let btn = prefixes.iter().position(|(p, _)| *p == "Btn").unwrap();
        assert!(btn_group < btn);
    }
}
