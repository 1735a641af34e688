use code2clip::template::{interpret_escapes, Template, TemplatePreset};
use code2clip::ClipError;

#[test]
fn test_builtin_presets() {
    let markdown = Template::default();
    assert_eq!(markdown.prefix, "$filepath\\n```");
    assert_eq!(markdown.suffix, "```\\n");

    let xml = Template::from_preset(TemplatePreset::Xml, "ignored", "ignored");
    assert_eq!(xml.prefix, "<file filename=\"$filepath\">");
    assert_eq!(xml.suffix, "</file>");

    let custom = Template::from_preset(TemplatePreset::Custom, "// $filename", "// end");
    assert_eq!(custom, Template::new("// $filename", "// end"));
}

#[test]
fn test_detect_preset() {
    let xml = Template::from_preset(TemplatePreset::Xml, "", "");
    assert_eq!(TemplatePreset::detect(&xml.prefix, &xml.suffix), TemplatePreset::Xml);

    let md = Template::default();
    assert_eq!(TemplatePreset::detect(&md.prefix, &md.suffix), TemplatePreset::Markdown);

    assert_eq!(TemplatePreset::detect(&xml.prefix, &md.suffix), TemplatePreset::Custom);
    assert_eq!(TemplatePreset::detect("### $filepath", "---"), TemplatePreset::Custom);
}

#[test]
fn test_preset_names() {
    assert_eq!(TemplatePreset::from_name("xml"), Some(TemplatePreset::Xml));
    assert_eq!(TemplatePreset::from_name(" Markdown "), Some(TemplatePreset::Markdown));
    assert_eq!(TemplatePreset::from_name("json"), None);
}

#[test]
fn test_render_prefix_substitutes_placeholders() {
    let template = Template::new("== $filepath ($filename) ==", "");
    assert_eq!(
        template.render_prefix("src/utils/mod.rs"),
        "== src/utils/mod.rs (mod.rs) =="
    );
}

#[test]
fn test_interpret_common_escapes() {
    assert_eq!(interpret_escapes("a\\nb\\tc\\\\d").unwrap(), "a\nb\tc\\d");
    assert_eq!(interpret_escapes("\\'q\\\"").unwrap(), "'q\"");
    assert_eq!(interpret_escapes("\\x41\\u00e9\\U0001F600").unwrap(), "Aé😀");
    assert_eq!(interpret_escapes("\\101\\0").unwrap(), "A\0");
}

#[test]
fn test_interpret_keeps_unknown_escapes_and_unicode() {
    assert_eq!(interpret_escapes("C:\\dir\\q").unwrap(), "C:\\dir\\q");
    assert_eq!(interpret_escapes("ünïcødé → ok").unwrap(), "ünïcødé → ok");
}

#[test]
fn test_interpret_rejects_malformed_escapes() {
    assert!(matches!(interpret_escapes("bad\\x4"), Err(ClipError::EscapeError(_))));
    assert!(matches!(interpret_escapes("trailing\\"), Err(ClipError::EscapeError(_))));
    assert!(interpret_escapes("\\uD800").is_err());
}

#[test]
fn test_interpreted_markdown_template() {
    let template = Template::default().interpreted().unwrap();
    assert_eq!(template.prefix, "$filepath\n```");
    assert_eq!(template.suffix, "```\n");
}
