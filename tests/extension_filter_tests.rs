use code2clip::extensions::{
    build_extension_filters, compute_extension_filters, parse_extensions, subset_extensions,
    Category, ExtensionGroups, ExtensionMode, ExtensionSettings, ALL_CATEGORIES,
};

#[test]
fn test_parse_extensions_normalizes_and_dedupes() {
    let parsed = parse_extensions("py, .RS\n txt,,py .Md");
    assert_eq!(parsed, vec![".py", ".rs", ".txt", ".md"]);
}

#[test]
fn test_parse_extensions_empty_input() {
    assert!(parse_extensions("").is_empty());
    assert!(parse_extensions(" ,, \n").is_empty());
}

#[test]
fn test_default_settings_allow_all_categories() {
    let filters = compute_extension_filters(&ExtensionSettings::default());
    for ext in [".txt", ".md", ".json", ".csv", ".rs", ".py", ".sql"] {
        assert!(filters.contains(&ext.to_string()), "missing {}", ext);
    }
    let mut sorted = filters.clone();
    sorted.sort();
    assert_eq!(filters, sorted, "filters should be sorted");
}

#[test]
fn test_allow_all_mode_yields_empty_list() {
    let settings = ExtensionSettings {
        mode: ExtensionMode::AllowAll,
        excluded_extensions_text: ".rs".to_string(),
        ..ExtensionSettings::default()
    };
    assert!(compute_extension_filters(&settings).is_empty());
}

#[test]
fn test_disabled_category_is_removed() {
    let mut settings = ExtensionSettings::default();
    assert!(settings.set_category_enabled(Category::Code, false));
    assert!(!settings.set_category_enabled(Category::Code, false));

    let filters = compute_extension_filters(&settings);
    assert!(!filters.contains(&".rs".to_string()));
    assert!(!filters.contains(&".py".to_string()));
    assert!(filters.contains(&".txt".to_string()));
}

#[test]
fn test_excluded_subset_and_included_text() {
    let mut settings = ExtensionSettings::default();
    assert!(settings.set_subset_excluded("Code: Rust", true));
    settings.included_extensions_text = "foo, BAR".to_string();

    let filters = compute_extension_filters(&settings);
    assert!(!filters.contains(&".rs".to_string()));
    assert!(filters.contains(&".py".to_string()));
    assert!(filters.contains(&".foo".to_string()));
    assert!(filters.contains(&".bar".to_string()));

    assert!(settings.set_subset_excluded("Code: Rust", false));
    assert!(settings.excluded_subsets.is_empty());
    assert!(compute_extension_filters(&settings).contains(&".rs".to_string()));
}

#[test]
fn test_unknown_subset_is_ignored() {
    let mut settings = ExtensionSettings::default();
    assert!(!settings.set_subset_excluded("Code: Cobol", true));
    assert!(subset_extensions("Code: Cobol").is_empty());
}

#[test]
fn test_deny_list_wins_over_include_list() {
    let settings = ExtensionSettings {
        included_extensions_text: "foo".to_string(),
        excluded_extensions_text: "foo md".to_string(),
        ..ExtensionSettings::default()
    };
    let filters = compute_extension_filters(&settings);
    assert!(!filters.contains(&".foo".to_string()));
    assert!(!filters.contains(&".md".to_string()));
}

#[test]
fn test_custom_mode_uses_only_custom_text() {
    let settings = ExtensionSettings {
        mode: ExtensionMode::Custom,
        custom_extensions_text: "rs toml lock".to_string(),
        excluded_extensions_text: "lock".to_string(),
        ..ExtensionSettings::default()
    };
    assert_eq!(compute_extension_filters(&settings), vec![".rs", ".toml"]);
}

#[test]
fn test_every_subset_belongs_to_its_category() {
    for category in ALL_CATEGORIES {
        for subset in category.subsets() {
            assert_eq!(Category::of_subset(subset), Some(category));
            assert!(!subset_extensions(subset).is_empty(), "{} is empty", subset);
        }
    }
}

#[test]
fn test_extension_mode_from_str() {
    assert_eq!("allow-all".parse::<ExtensionMode>(), Ok(ExtensionMode::AllowAll));
    assert_eq!("custom".parse::<ExtensionMode>(), Ok(ExtensionMode::Custom));
    assert!("everything".parse::<ExtensionMode>().is_err());
}

#[test]
fn test_build_extension_filters_from_groups() {
    let groups = ExtensionGroups::default();
    let filters = build_extension_filters(
        &["Text Files".to_string(), "Unknown".to_string()],
        false,
        &groups,
    );
    assert!(filters.contains(&".md".to_string()));
    assert!(!filters.contains(&".rs".to_string()));

    let all = build_extension_filters(&["Code Files".to_string()], true, &groups);
    assert!(all.is_empty());
}
