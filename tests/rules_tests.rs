use import_guard::config::{GuardConfig, HookRegistry};
use import_guard::descriptor::{Location, WILDCARD};
use import_guard::matcher::{explicit, matches, negate, star, top_level};
use import_guard::{
    CallerChain, CallerFrame, DefendingObserver, Guard, GuardError, ImportDescriptor, Matcher,
    Observer, RuleValue,
};

const PROJECT_RULES: &str = r#"
[rules]
pkg = "csv"
"pkg.api" = ["bisect", { top_level = ["socket", "pkg.tasks"] }]
"pkg.core" = { matches = 'pkg\.(api|logic)' }
"pkg.logging" = { explicit = { not = ["logging", "yaml"] } }
"#;

fn project_guard() -> Guard {
    let guard = Guard::new();
    guard.set_deny_rules([
        ("pkg", RuleValue::from("csv")),
        (
            "pkg.api",
            vec![Matcher::from("bisect"), top_level(["socket", "pkg.tasks"])].into(),
        ),
        ("pkg.core", matches(r"pkg\.(api|logic)").unwrap().into()),
        ("pkg.logging", explicit(negate(["logging", "yaml"])).into()),
    ]);
    guard
}

fn configured_guard() -> Guard {
    GuardConfig::from_toml_str(PROJECT_RULES)
        .unwrap()
        .build_guard(&HookRegistry::new())
        .unwrap()
}

fn frame(component: &str, function: &str, depth: usize) -> CallerFrame {
    CallerFrame::new(component, function, Location::new("app.py", 1), depth)
}

fn assert_project_decisions(guard: &Guard) {
    assert!(!guard.is_import_allowed("pkg", "csv", true));
    assert!(!guard.is_import_allowed("pkg.api", "bisect", true));
    assert!(guard.is_import_allowed("pkg.api", "pkg.tasks", false));
    assert!(!guard.is_import_allowed("pkg.api", "pkg.tasks", true));
    assert!(!guard.is_import_allowed("pkg.core.db", "pkg.api", true));
    assert!(!guard.is_import_allowed("pkg.core.db", "pkg.logic", false));
    assert!(guard.is_import_allowed("pkg.core.db", "sqlite3", true));
    assert!(!guard.is_import_allowed("pkg.logging", "json", true));
    assert!(guard.is_import_allowed("pkg.logging", "yaml", true));
    assert!(guard.is_import_allowed("other", "csv", true));
}

#[test]
fn test_project_rules_decisions() {
    assert_project_decisions(&project_guard());
}

#[test]
fn test_toml_rules_match_builder_rules() {
    assert_project_decisions(&configured_guard());
}

#[test]
fn test_ancestor_rules_reach_descendants() {
    let guard = project_guard();
    assert!(!guard.is_import_allowed("pkg.core.db.models", "pkg.api", true));
    assert!(!guard.is_import_allowed("pkg.api.v2", "bisect", true));
    assert!(!guard.is_import_allowed("pkg.api.v2", "csv", true));
}

#[test]
fn test_explicit_ignores_transitive_frames() {
    let guard = project_guard();
    assert!(!guard.is_import_allowed(frame("pkg.logging", "<module>", 0), "json", true));
    assert!(guard.is_import_allowed(frame("pkg.logging", "<module>", 1), "json", true));
}

#[test]
fn test_star_rules_only_deny_wildcards() {
    let guard = Guard::new();
    guard.set_deny_rules([("pkg", star("os"))]);

    let wildcard = ImportDescriptor::new("os").with_sub_names([WILDCARD]);
    let named = ImportDescriptor::new("os").with_sub_names(["path"]);
    assert!(!guard.is_import_allowed("pkg", wildcard, true));
    assert!(guard.is_import_allowed("pkg", named, true));
    assert!(guard.is_import_allowed("pkg", "os", true));
}

#[test]
fn test_queries_do_not_touch_dedup_state() {
    let guard = project_guard();
    assert!(!guard.is_import_allowed("pkg", "csv", true));
    assert!(!guard.is_import_allowed("pkg", "csv", true));
    assert_eq!(guard.with_defender(DefendingObserver::seen_count), Some(0));
}

#[test]
fn test_dedup_by_caller_function() {
    let defender = DefendingObserver::new([("pkg", "csv")]);
    let import = ImportDescriptor::new("csv");
    let module_level = CallerChain::single(frame("pkg", "<module>", 0));
    let in_function = CallerChain::single(frame("pkg", "handler", 0));

    defender.on_begin(&import, &module_level, false).unwrap();
    defender.on_begin(&import, &module_level, false).unwrap();
    assert_eq!(defender.take_reported().len(), 1);

    defender.on_begin(&import, &in_function, false).unwrap();
    let reported = defender.take_reported();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].caller_function, "handler");
}

#[test]
fn test_resetting_rules_clears_dedup() {
    let guard = project_guard();
    guard.enable(false, None);
    let import = ImportDescriptor::new("csv");
    let chain = CallerChain::single(frame("pkg", "<module>", 0));

    guard.intercept(&import, &chain, || Ok(())).unwrap();
    guard.intercept(&import, &chain, || Ok(())).unwrap();
    assert_eq!(guard.take_warnings().len(), 1);

    guard.set_deny_rules([("pkg", "csv")]);
    guard.intercept(&import, &chain, || Ok(())).unwrap();
    assert_eq!(guard.take_warnings().len(), 1);
}

#[test]
fn test_toml_hook_rule() {
    let mut hooks = HookRegistry::new();
    hooks.register("test_helpers", |import: &ImportDescriptor, _: &CallerFrame| {
        import.component_path.ends_with("_test")
    });

    let config = GuardConfig::from_toml_str(
        r#"
[rules]
app = { hook = "test_helpers" }
"#,
    )
    .unwrap();
    let guard = config.build_guard(&hooks).unwrap();

    assert!(!guard.is_import_allowed("app.views", "fixtures_test", true));
    assert!(guard.is_import_allowed("app.views", "fixtures", true));
}

#[test]
fn test_toml_unknown_hook_is_rejected() {
    let config = GuardConfig::from_toml_str("[rules]\napp = { hook = \"missing\" }\n").unwrap();
    let err = config.build_guard(&HookRegistry::new()).err().unwrap();
    assert!(matches!(err, GuardError::InvalidHookPredicate(name) if name == "missing"));
}

#[test]
fn test_toml_unsupported_value_is_rejected() {
    let config = GuardConfig::from_toml_str("[rules]\napp = 3\n").unwrap();
    let err = config.build_guard(&HookRegistry::new()).err().unwrap();
    assert!(matches!(err, GuardError::UnsupportedRuleValue { path, .. } if path == "app"));
}

#[test]
fn test_rules_listing() {
    let guard = configured_guard();
    let listed = guard.rules_under("pkg.core");
    assert_eq!(
        listed,
        vec![("pkg.core".to_string(), r"re('pkg\.(api|logic)')".to_string())]
    );
    assert_eq!(guard.rules_under("").len(), 4);
}
