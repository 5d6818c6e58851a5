use std::ops::Range;

use anyhow::{Context, Result};

use crate::profile::{CustomizationRule, FontProfile, ScriptFace};

const SERIF_ALIAS_NAME: &str = "serif-bold";
const SERIF_ALIAS_TARGET: &str = "serif";
const SERIF_ALIAS_WEIGHT: u32 = 700;

pub fn transform_fonts_config(content: &str, profile: &FontProfile) -> Result<String> {
    let expanded = expand_serif_aliases(content, profile);
    replace_cjk_families(&expanded, profile)
}

pub fn expand_serif_aliases(content: &str, profile: &FontProfile) -> String {
    let already_expanded = profile
        .alias_expansions
        .iter()
        .any(|expansion| content.contains(&format!("name=\"{}\"", expansion.name)));
    if already_expanded {
        return content.to_string();
    }

    let mut out = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        out.push_str(line);
        if !is_serif_bold_alias(line) {
            continue;
        }
        if !line.ends_with('\n') {
            out.push('\n');
        }
        let indent = leading_whitespace(line);
        for expansion in &profile.alias_expansions {
            out.push_str(&format!(
                "{indent}<alias name=\"{}\" to=\"{SERIF_ALIAS_TARGET}\" weight=\"{}\"/>\n",
                expansion.name, expansion.weight
            ));
        }
    }
    out
}

pub fn replace_cjk_families(content: &str, profile: &FontProfile) -> Result<String> {
    let doc = roxmltree::Document::parse(content)
        .context("failed to parse font configuration as xml")?;

    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    for script in &profile.scripts {
        let blocks: Vec<Range<usize>> = doc
            .descendants()
            .filter(|node| node.has_tag_name("family"))
            .filter(|node| node.attribute("lang") == Some(script.lang.as_str()))
            .map(|node| node.range())
            .collect();

        // A language that already declares the variable font has been
        // rewritten by a previous run; all of its blocks stay untouched.
        let already_transformed = blocks
            .iter()
            .any(|range| content[range.clone()].contains(profile.sans_variable.as_str()));
        if already_transformed {
            continue;
        }

        for range in blocks {
            let block = &content[range.clone()];
            let is_legacy = profile
                .legacy_markers
                .iter()
                .all(|marker| block.contains(marker.as_str()));
            if !is_legacy {
                continue;
            }
            let indent = block_indent(content, range.start);
            edits.push((range, render_replacement_families(script, profile, &indent)));
        }
    }

    Ok(apply_edits(content, edits))
}

pub fn rewrite_customizations(content: &str, profile: &FontProfile) -> Result<String> {
    let doc = roxmltree::Document::parse(content)
        .context("failed to parse font customization as xml")?;

    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    for node in doc.descendants().filter(|node| node.has_tag_name("family")) {
        let Some(name) = node.attribute("name") else {
            continue;
        };
        let Some(rule) = profile
            .customization
            .rules
            .iter()
            .find(|rule| rule.name == name)
        else {
            continue;
        };
        edits.push((node.range(), render_customization_alias(rule)));
    }

    Ok(apply_edits(content, edits))
}

pub fn has_customization_marker(content: &str, profile: &FontProfile) -> bool {
    content.contains(profile.customization.marker.as_str())
}

fn is_serif_bold_alias(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("<alias")
        && trimmed.contains(&format!("name=\"{SERIF_ALIAS_NAME}\""))
        && trimmed.contains(&format!("to=\"{SERIF_ALIAS_TARGET}\""))
        && trimmed.contains(&format!("weight=\"{SERIF_ALIAS_WEIGHT}\""))
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn block_indent(content: &str, block_start: usize) -> String {
    let line_start = content[..block_start]
        .rfind('\n')
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let prefix = &content[line_start..block_start];
    if prefix.chars().all(|ch| ch == ' ' || ch == '\t') {
        prefix.to_string()
    } else {
        String::new()
    }
}

fn render_replacement_families(script: &ScriptFace, profile: &FontProfile, indent: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<family lang=\"{}\">\n", script.lang));
    for weight in &profile.sans_weights {
        out.push_str(&format!(
            "{indent}    <font weight=\"{weight}\" style=\"normal\" index=\"{}\" supportedAxes=\"wght\">{}<axis tag=\"wght\" stylevalue=\"{weight}\"/></font>\n",
            script.index, profile.sans_variable
        ));
    }
    for weight in &profile.serif_weights {
        out.push_str(&format!(
            "{indent}    <font weight=\"{weight}\" style=\"normal\" index=\"{}\" fallbackFor=\"serif\" supportedAxes=\"wght\">{}<axis tag=\"wght\" stylevalue=\"{weight}\"/></font>\n",
            script.index, profile.serif_variable
        ));
    }
    out.push_str(&format!("{indent}</family>\n"));
    out.push_str(&format!("{indent}<family lang=\"{}\">\n", script.lang));
    out.push_str(&format!(
        "{indent}    <font weight=\"400\" style=\"normal\" index=\"{}\">{}</font>\n",
        script.index, profile.sans_static
    ));
    out.push_str(&format!(
        "{indent}    <font weight=\"400\" style=\"normal\" index=\"{}\" fallbackFor=\"serif\">{}</font>\n",
        script.index, profile.serif_static
    ));
    out.push_str(&format!("{indent}</family>"));
    out
}

fn render_customization_alias(rule: &CustomizationRule) -> String {
    match &rule.style {
        Some(style) => format!(
            "<alias name=\"{}\" to=\"{}\" weight=\"{}\" style=\"{}\"/>",
            rule.name, rule.to, rule.weight, style
        ),
        None => format!(
            "<alias name=\"{}\" to=\"{}\" weight=\"{}\"/>",
            rule.name, rule.to, rule.weight
        ),
    }
}

fn apply_edits(content: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut out = content.to_string();
    for (range, replacement) in edits {
        out.replace_range(range, &replacement);
    }
    out
}
