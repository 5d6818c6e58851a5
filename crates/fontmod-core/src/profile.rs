use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FontProfile {
    #[serde(default = "default_sans_variable")]
    pub sans_variable: String,
    #[serde(default = "default_serif_variable")]
    pub serif_variable: String,
    #[serde(default = "default_sans_static")]
    pub sans_static: String,
    #[serde(default = "default_serif_static")]
    pub serif_static: String,
    #[serde(default = "default_sans_weights")]
    pub sans_weights: Vec<u32>,
    #[serde(default = "default_serif_weights")]
    pub serif_weights: Vec<u32>,
    #[serde(default = "default_scripts")]
    pub scripts: Vec<ScriptFace>,
    #[serde(default = "default_alias_expansions")]
    pub alias_expansions: Vec<AliasExpansion>,
    #[serde(default = "default_legacy_markers")]
    pub legacy_markers: Vec<String>,
    #[serde(default)]
    pub customization: CustomizationProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptFace {
    pub lang: String,
    pub index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasExpansion {
    pub name: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomizationProfile {
    #[serde(default = "default_customization_marker")]
    pub marker: String,
    #[serde(default = "default_customization_rules")]
    pub rules: Vec<CustomizationRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomizationRule {
    pub name: String,
    pub to: String,
    pub weight: u32,
    #[serde(default)]
    pub style: Option<String>,
}

impl Default for FontProfile {
    fn default() -> Self {
        Self {
            sans_variable: default_sans_variable(),
            serif_variable: default_serif_variable(),
            sans_static: default_sans_static(),
            serif_static: default_serif_static(),
            sans_weights: default_sans_weights(),
            serif_weights: default_serif_weights(),
            scripts: default_scripts(),
            alias_expansions: default_alias_expansions(),
            legacy_markers: default_legacy_markers(),
            customization: CustomizationProfile::default(),
        }
    }
}

impl Default for CustomizationProfile {
    fn default() -> Self {
        Self {
            marker: default_customization_marker(),
            rules: default_customization_rules(),
        }
    }
}

impl FontProfile {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let profile: Self = toml::from_str(input).context("failed to parse font profile")?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read font profile: {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid font profile: {}", path.display()))
    }

    pub fn face_index(&self, lang: &str) -> Option<u32> {
        self.scripts
            .iter()
            .find(|script| script.lang == lang)
            .map(|script| script.index)
    }

    fn validate(&self) -> Result<()> {
        if self.scripts.is_empty() {
            return Err(anyhow!("profile must declare at least one script"));
        }
        let mut seen_langs = HashSet::new();
        for script in &self.scripts {
            if script.lang.trim().is_empty() {
                return Err(anyhow!("script lang must not be empty"));
            }
            if !seen_langs.insert(script.lang.as_str()) {
                return Err(anyhow!("duplicate script lang: {}", script.lang));
            }
        }
        if self.sans_weights.is_empty() || self.serif_weights.is_empty() {
            return Err(anyhow!("profile weight lists must not be empty"));
        }
        for weight in self.sans_weights.iter().chain(&self.serif_weights) {
            if *weight == 0 || *weight > 1000 {
                return Err(anyhow!("font weight out of range: {weight}"));
            }
        }
        if self.legacy_markers.is_empty() {
            return Err(anyhow!("profile must declare at least one legacy marker"));
        }
        for marker in &self.legacy_markers {
            if marker.trim().is_empty() {
                return Err(anyhow!("legacy marker must not be empty"));
            }
        }
        for expansion in &self.alias_expansions {
            if expansion.name.trim().is_empty() {
                return Err(anyhow!("alias expansion name must not be empty"));
            }
        }
        if self.customization.marker.trim().is_empty() {
            return Err(anyhow!("customization marker must not be empty"));
        }
        for rule in &self.customization.rules {
            if rule.name.trim().is_empty() {
                return Err(anyhow!("customization rule name must not be empty"));
            }
            if rule.to.trim().is_empty() {
                return Err(anyhow!(
                    "customization rule '{}' alias target must not be empty",
                    rule.name
                ));
            }
        }
        Ok(())
    }
}

fn default_sans_variable() -> String {
    "NotoSansCJK-VF.otf.ttc".to_string()
}

fn default_serif_variable() -> String {
    "NotoSerifCJK-VF.otf.ttc".to_string()
}

fn default_sans_static() -> String {
    "NotoSansCJK-Regular.ttc".to_string()
}

fn default_serif_static() -> String {
    "NotoSerifCJK-Regular.ttc".to_string()
}

fn default_sans_weights() -> Vec<u32> {
    vec![100, 300, 400, 500, 600, 700, 900]
}

fn default_serif_weights() -> Vec<u32> {
    vec![200, 300, 400, 500, 600, 700, 900]
}

fn default_scripts() -> Vec<ScriptFace> {
    [
        ("ja", 0),
        ("ko", 1),
        ("zh-Hans", 2),
        ("zh-Hant", 3),
        ("zh-Bopo", 3),
        ("zh-Hant zh-Bopo", 3),
        ("zh-Hant,zh-Bopo", 3),
    ]
    .into_iter()
    .map(|(lang, index)| ScriptFace {
        lang: lang.to_string(),
        index,
    })
    .collect()
}

fn default_alias_expansions() -> Vec<AliasExpansion> {
    [
        ("serif-thin", 100),
        ("serif-light", 300),
        ("serif-medium", 400),
        ("serif-semi-bold", 500),
        ("serif-black", 900),
    ]
    .into_iter()
    .map(|(name, weight)| AliasExpansion {
        name: name.to_string(),
        weight,
    })
    .collect()
}

fn default_legacy_markers() -> Vec<String> {
    vec!["Noto".to_string(), "CJK".to_string()]
}

fn default_customization_marker() -> String {
    "SysSans".to_string()
}

fn default_customization_rules() -> Vec<CustomizationRule> {
    [
        ("SysSans-En", 400),
        ("SysSans-Zh", 400),
        ("SysSans-En-Medium", 500),
        ("SysSans-Zh-Medium", 500),
    ]
    .into_iter()
    .map(|(name, weight)| CustomizationRule {
        name: name.to_string(),
        to: "sans-serif".to_string(),
        weight,
        style: None,
    })
    .collect()
}
