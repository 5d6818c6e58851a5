mod profile;
mod transform;

pub use profile::{
    AliasExpansion, CustomizationProfile, CustomizationRule, FontProfile, ScriptFace,
};
pub use transform::{
    expand_serif_aliases, has_customization_marker, replace_cjk_families, rewrite_customizations,
    transform_fonts_config,
};

#[cfg(test)]
mod tests;
