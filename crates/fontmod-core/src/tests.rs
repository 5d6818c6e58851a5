use super::*;

const FONTS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<familyset version="23">
    <family name="sans-serif">
        <font weight="400" style="normal">Roboto-Regular.ttf</font>
        <font weight="700" style="normal">Roboto-Bold.ttf</font>
    </family>
    <alias name="serif-bold" to="serif" weight="700"/>
    <family lang="ja" variant="elegant">
        <font weight="400" style="normal" index="0">NotoSansCJK-Regular.ttc</font>
        <font weight="400" style="normal" index="0" fallbackFor="serif">NotoSerifCJK-Regular.ttc</font>
    </family>
    <family lang="ko">
        <font weight="400" style="normal" index="1">NotoSansCJK-Regular.ttc</font>
    </family>
    <family lang="zh-Hans">
        <font weight="400" style="normal" index="2">NotoSansCJK-Regular.ttc</font>
    </family>
    <family lang="zh-Hant zh-Bopo">
        <font weight="400" style="normal" index="3">NotoSansCJK-Regular.ttc</font>
    </family>
</familyset>
"#;

const CUSTOMIZATION_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<fonts-modification version="1">
    <family customizationType="new-named-family" name="SysSans-En">
        <font weight="400" style="normal">SysSans-En-Regular.ttf</font>
        <font weight="700" style="normal">SysSans-En-Bold.ttf</font>
    </family>
    <family customizationType="new-named-family" name="SysSans-Zh">
        <font weight="400" style="normal">SysSans-Zh-Regular.ttf</font>
    </family>
    <family customizationType="new-named-family" name="VendorClock">
        <font weight="400" style="normal">VendorClock-Regular.ttf</font>
    </family>
</fonts-modification>
"#;

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn serif_alias_expansion_yields_six_alias_lines() {
    let profile = FontProfile::default();
    let expanded = expand_serif_aliases(FONTS_XML, &profile);

    assert_eq!(count_occurrences(&expanded, "to=\"serif\""), 6);
    for needle in [
        "<alias name=\"serif-thin\" to=\"serif\" weight=\"100\"/>",
        "<alias name=\"serif-light\" to=\"serif\" weight=\"300\"/>",
        "<alias name=\"serif-medium\" to=\"serif\" weight=\"400\"/>",
        "<alias name=\"serif-semi-bold\" to=\"serif\" weight=\"500\"/>",
        "<alias name=\"serif-black\" to=\"serif\" weight=\"900\"/>",
    ] {
        assert_eq!(count_occurrences(&expanded, needle), 1, "missing {needle}");
    }
    assert_eq!(
        count_occurrences(&expanded, "<alias name=\"serif-bold\" to=\"serif\" weight=\"700\"/>"),
        1
    );
}

#[test]
fn serif_alias_expansion_is_idempotent() {
    let profile = FontProfile::default();
    let once = expand_serif_aliases(FONTS_XML, &profile);
    let twice = expand_serif_aliases(&once, &profile);
    assert_eq!(once, twice);
}

#[test]
fn serif_alias_expansion_preserves_indentation() {
    let profile = FontProfile::default();
    let expanded = expand_serif_aliases(FONTS_XML, &profile);
    assert!(expanded.contains("    <alias name=\"serif-thin\""));
}

#[test]
fn serif_alias_expansion_without_trigger_line_is_a_no_op() {
    let profile = FontProfile::default();
    let input = "<familyset>\n    <family name=\"sans-serif\"/>\n</familyset>\n";
    assert_eq!(expand_serif_aliases(input, &profile), input);
}

#[test]
fn ja_family_becomes_variable_block_plus_static_fallback() {
    let profile = FontProfile::default();
    let transformed = replace_cjk_families(FONTS_XML, &profile).expect("must transform");

    assert_eq!(count_occurrences(&transformed, "<family lang=\"ja\">"), 2);
    assert!(!transformed.contains("<family lang=\"ja\" variant=\"elegant\">"));

    for weight in [100, 300, 400, 500, 600, 700, 900] {
        assert!(
            transformed.contains(&format!(
                "<font weight=\"{weight}\" style=\"normal\" index=\"0\" supportedAxes=\"wght\">NotoSansCJK-VF.otf.ttc<axis tag=\"wght\" stylevalue=\"{weight}\"/></font>"
            )),
            "missing sans weight {weight}"
        );
    }
    for weight in [200, 300, 400, 500, 600, 700, 900] {
        assert!(
            transformed.contains(&format!(
                "<font weight=\"{weight}\" style=\"normal\" index=\"0\" fallbackFor=\"serif\" supportedAxes=\"wght\">NotoSerifCJK-VF.otf.ttc<axis tag=\"wght\" stylevalue=\"{weight}\"/></font>"
            )),
            "missing serif weight {weight}"
        );
    }
    assert!(transformed
        .contains("<font weight=\"400\" style=\"normal\" index=\"0\">NotoSansCJK-Regular.ttc</font>"));
    assert!(transformed.contains(
        "<font weight=\"400\" style=\"normal\" index=\"0\" fallbackFor=\"serif\">NotoSerifCJK-Regular.ttc</font>"
    ));
}

#[test]
fn replacement_uses_profile_face_indexes() {
    let profile = FontProfile::default();
    let transformed = replace_cjk_families(FONTS_XML, &profile).expect("must transform");

    assert!(transformed.contains(
        "<font weight=\"400\" style=\"normal\" index=\"1\" supportedAxes=\"wght\">NotoSansCJK-VF.otf.ttc"
    ));
    assert!(transformed.contains(
        "<font weight=\"400\" style=\"normal\" index=\"2\" supportedAxes=\"wght\">NotoSansCJK-VF.otf.ttc"
    ));
    assert!(transformed.contains(
        "<font weight=\"400\" style=\"normal\" index=\"3\" supportedAxes=\"wght\">NotoSansCJK-VF.otf.ttc"
    ));
}

#[test]
fn comma_separated_lang_variant_matches() {
    let profile = FontProfile::default();
    let input = r#"<familyset>
    <family lang="zh-Hant,zh-Bopo">
        <font weight="400" style="normal" index="3">NotoSansCJK-Regular.ttc</font>
    </family>
</familyset>
"#;
    let transformed = replace_cjk_families(input, &profile).expect("must transform");
    assert_eq!(
        count_occurrences(&transformed, "<family lang=\"zh-Hant,zh-Bopo\">"),
        2
    );
}

#[test]
fn family_without_legacy_markers_is_untouched() {
    let profile = FontProfile::default();
    let input = r#"<familyset>
    <family lang="ja">
        <font weight="400" style="normal">MPLUS1p-Regular.ttf</font>
    </family>
</familyset>
"#;
    let transformed = replace_cjk_families(input, &profile).expect("must transform");
    assert_eq!(transformed, input);
}

#[test]
fn non_cjk_families_are_preserved_byte_for_byte() {
    let profile = FontProfile::default();
    let transformed = replace_cjk_families(FONTS_XML, &profile).expect("must transform");
    assert!(transformed.contains(
        "    <family name=\"sans-serif\">\n        <font weight=\"400\" style=\"normal\">Roboto-Regular.ttf</font>"
    ));
}

#[test]
fn full_transform_is_idempotent() {
    let profile = FontProfile::default();
    let once = transform_fonts_config(FONTS_XML, &profile).expect("must transform");
    let twice = transform_fonts_config(&once, &profile).expect("must transform again");
    assert_eq!(once, twice);
}

#[test]
fn transform_rejects_malformed_xml() {
    let profile = FontProfile::default();
    let result = replace_cjk_families("<familyset><family lang=\"ja\">Noto CJK", &profile);
    assert!(result.is_err());
}

#[test]
fn customization_marker_detection_uses_profile_marker() {
    let profile = FontProfile::default();
    assert!(has_customization_marker(CUSTOMIZATION_XML, &profile));
    assert!(!has_customization_marker(
        "<fonts-modification/>",
        &profile
    ));
}

#[test]
fn customization_rewrite_collapses_named_blocks_to_aliases() {
    let profile = FontProfile::default();
    let rewritten = rewrite_customizations(CUSTOMIZATION_XML, &profile).expect("must rewrite");

    assert!(rewritten.contains("<alias name=\"SysSans-En\" to=\"sans-serif\" weight=\"400\"/>"));
    assert!(rewritten.contains("<alias name=\"SysSans-Zh\" to=\"sans-serif\" weight=\"400\"/>"));
    assert!(!rewritten.contains("SysSans-En-Regular.ttf"));
    assert!(!rewritten.contains("SysSans-En-Bold.ttf"));
    // Blocks the profile does not name survive untouched.
    assert!(rewritten.contains("VendorClock-Regular.ttf"));
}

#[test]
fn customization_rewrite_is_idempotent() {
    let profile = FontProfile::default();
    let once = rewrite_customizations(CUSTOMIZATION_XML, &profile).expect("must rewrite");
    let twice = rewrite_customizations(&once, &profile).expect("must rewrite again");
    assert_eq!(once, twice);
}

#[test]
fn customization_rule_with_style_renders_style_attribute() {
    let mut profile = FontProfile::default();
    profile.customization.rules = vec![CustomizationRule {
        name: "SysSans-En".to_string(),
        to: "sans-serif".to_string(),
        weight: 400,
        style: Some("italic".to_string()),
    }];
    let rewritten = rewrite_customizations(CUSTOMIZATION_XML, &profile).expect("must rewrite");
    assert!(rewritten
        .contains("<alias name=\"SysSans-En\" to=\"sans-serif\" weight=\"400\" style=\"italic\"/>"));
}

#[test]
fn default_profile_matches_noto_container_layout() {
    let profile = FontProfile::default();
    assert_eq!(profile.face_index("ja"), Some(0));
    assert_eq!(profile.face_index("ko"), Some(1));
    assert_eq!(profile.face_index("zh-Hans"), Some(2));
    assert_eq!(profile.face_index("zh-Hant"), Some(3));
    assert_eq!(profile.face_index("zh-Bopo"), Some(3));
    assert_eq!(profile.face_index("zh-Hant zh-Bopo"), Some(3));
    assert_eq!(profile.face_index("zh-Hant,zh-Bopo"), Some(3));
    assert_eq!(profile.face_index("th"), None);
    assert_eq!(profile.sans_weights, vec![100, 300, 400, 500, 600, 700, 900]);
    assert_eq!(profile.serif_weights, vec![200, 300, 400, 500, 600, 700, 900]);
}

#[test]
fn profile_toml_overrides_merge_with_defaults() {
    let profile = FontProfile::from_toml_str(
        r#"
sans_variable = "CustomSans-VF.otf.ttc"

[[scripts]]
lang = "ja"
index = 5
"#,
    )
    .expect("must parse");

    assert_eq!(profile.sans_variable, "CustomSans-VF.otf.ttc");
    assert_eq!(profile.serif_variable, "NotoSerifCJK-VF.otf.ttc");
    assert_eq!(profile.face_index("ja"), Some(5));
    assert_eq!(profile.face_index("ko"), None);
}

#[test]
fn profile_rejects_duplicate_script_lang() {
    let result = FontProfile::from_toml_str(
        r#"
[[scripts]]
lang = "ja"
index = 0

[[scripts]]
lang = "ja"
index = 1
"#,
    );
    assert!(result.is_err());
}

#[test]
fn profile_rejects_out_of_range_weight() {
    let result = FontProfile::from_toml_str("sans_weights = [0]");
    assert!(result.is_err());
}

#[test]
fn profile_rejects_empty_customization_marker() {
    let result = FontProfile::from_toml_str(
        r#"
[customization]
marker = " "
rules = []
"#,
    );
    assert!(result.is_err());
}
