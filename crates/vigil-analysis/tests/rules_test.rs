//! Rule catalog and TOML rule loader tests.

use std::sync::Arc;

use vigil_analysis::rules::{
    ids, Applicability, CatalogOptions, RuleCatalog, Severity, TomlRuleLoader, UnitIdentity,
    UnitRole,
};
use vigil_analysis::Validator;
use vigil_core::config::ValidationConfig;
use vigil_core::errors::{CatalogError, DetectionError, VigilErrorCode};

const EXTRA_RULES: &str = r#"
[[rules]]
id = "no-eval"
label = "No eval"
severity = "critical"
roles = ["backend", "service"]
pattern = '\beval\s*\('
message = "eval() at lines {lines}"
suggestion = "Parse the input instead"
directive = "Remove the eval() calls at lines {lines}."

[[rules]]
id = "no-sync-fs"
severity = "medium"
pattern = '\breadFileSync\s*\('
unless = 'allow-sync-fs'

[[rules]]
id = "disabled-rule"
severity = "info"
pattern = "anything"
enabled = false
"#;

#[test]
fn builtin_catalog_is_ordered_and_unique() {
    let catalog = RuleCatalog::builtin(&CatalogOptions::default()).unwrap();
    let rule_ids: Vec<&str> = catalog.rules().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        rule_ids,
        vec![
            ids::NO_TYPE_HOLES,
            ids::TENANT_ISOLATION,
            ids::ASYNC_ERROR_CONTAINMENT,
            ids::NO_STAND_IN_CONTENT,
            ids::ARCHITECTURE_TRIAD,
            ids::INPUT_SCHEMA_VALIDATION,
            ids::IMPORT_PRESENCE,
            ids::STRUCTURED_LOGGING,
            ids::NO_HARDCODED_ENDPOINTS,
            ids::ENV_SOURCED_SECRETS,
        ]
    );
}

#[test]
fn applicability_filters_by_role() {
    let catalog = RuleCatalog::builtin(&CatalogOptions::default()).unwrap();
    let ids_for = |role| -> Vec<String> {
        catalog.applicable_rules(role).iter().map(|r| r.id.clone()).collect()
    };

    let frontend = ids_for(UnitRole::Frontend);
    assert!(!frontend.iter().any(|id| id == ids::TENANT_ISOLATION));
    assert!(!frontend.iter().any(|id| id == ids::ARCHITECTURE_TRIAD));
    assert!(!frontend.iter().any(|id| id == ids::INPUT_SCHEMA_VALIDATION));

    let service = ids_for(UnitRole::Service);
    assert!(service.iter().any(|id| id == ids::TENANT_ISOLATION));
    assert!(service.iter().any(|id| id == ids::ARCHITECTURE_TRIAD));

    assert_eq!(ids_for(UnitRole::Backend).len(), 9);
    assert_eq!(ids_for(UnitRole::Agent).len(), 8);
}

#[test]
fn toml_rules_load_and_skip_disabled() {
    let rules = TomlRuleLoader::load_from_str(EXTRA_RULES).unwrap();
    assert_eq!(rules.len(), 2);

    let eval = &rules[0];
    assert_eq!(eval.id, "no-eval");
    assert_eq!(eval.label, "No eval");
    assert_eq!(eval.severity, Severity::Critical);
    assert_eq!(
        eval.applicability,
        Applicability::Roles(vec![UnitRole::Backend, UnitRole::Service])
    );

    let sync_fs = &rules[1];
    assert_eq!(sync_fs.label, "no-sync-fs");
    assert_eq!(sync_fs.severity, Severity::Warning);
    assert_eq!(sync_fs.applicability, Applicability::Any);
}

#[test]
fn toml_rules_run_through_the_validator() {
    let catalog = RuleCatalog::builtin(&CatalogOptions::default())
        .unwrap()
        .with_rules(TomlRuleLoader::load_from_str(EXTRA_RULES).unwrap())
        .unwrap();
    let validator = Validator::new(Arc::new(catalog));
    let unit = UnitIdentity::new("handler.js", UnitRole::Backend);

    let result = validator.validate("const out = eval(input);\nconst raw = readFileSync(p);\n", &unit);
    let eval = result.violations.iter().find(|f| f.rule_id == "no-eval").unwrap();
    assert_eq!(eval.message, "eval() at lines 1");
    assert_eq!(eval.suggestion.as_deref(), Some("Parse the input instead"));
    assert!(result.warnings.iter().any(|f| f.rule_id == "no-sync-fs"));

    let cleared = validator.validate("// allow-sync-fs\nconst raw = readFileSync(p);\n", &unit);
    assert!(cleared.findings().all(|f| f.rule_id != "no-sync-fs"));
}

#[test]
fn toml_rule_errors_are_typed() {
    let bad_severity = "[[rules]]\nid = \"x\"\nseverity = \"fatal\"\npattern = \"a\"\n";
    assert!(matches!(
        TomlRuleLoader::load_from_str(bad_severity),
        Err(CatalogError::UnknownSeverity { ref value, .. }) if value == "fatal"
    ));

    let bad_role = "[[rules]]\nid = \"x\"\nseverity = \"high\"\nroles = [\"mainframe\"]\npattern = \"a\"\n";
    assert!(matches!(
        TomlRuleLoader::load_from_str(bad_role),
        Err(CatalogError::UnknownRole { ref value, .. }) if value == "mainframe"
    ));

    let bad_regex = "[[rules]]\nid = \"x\"\nseverity = \"high\"\npattern = \"(unclosed\"\n";
    let err = TomlRuleLoader::load_from_str(bad_regex).unwrap_err();
    assert!(matches!(err, CatalogError::Load(DetectionError::QueryCompilationFailed(_))));
    assert_eq!(err.error_code(), "DETECTION_ERROR");

    let not_toml = "[[rules]\nid =";
    assert!(matches!(
        TomlRuleLoader::load_from_str(not_toml),
        Err(CatalogError::Load(DetectionError::InvalidPattern(_)))
    ));
}

#[test]
fn duplicate_rule_ids_are_rejected() {
    let dup = "[[rules]]\nid = \"no-type-holes\"\nseverity = \"high\"\npattern = \"a\"\n";
    let err = RuleCatalog::builtin(&CatalogOptions::default())
        .unwrap()
        .with_rules(TomlRuleLoader::load_from_str(dup).unwrap())
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateRule(ref id) if id == ids::NO_TYPE_HOLES));
    assert_eq!(err.error_code(), "CATALOG_ERROR");
}

#[test]
fn without_drops_named_rules() {
    let catalog = RuleCatalog::builtin(&CatalogOptions::default())
        .unwrap()
        .without(&[ids::STRUCTURED_LOGGING.to_string(), "unknown".to_string()]);
    assert_eq!(catalog.len(), 9);
    assert!(catalog.get(ids::STRUCTURED_LOGGING).is_none());
    assert!(catalog.get(ids::NO_TYPE_HOLES).is_some());
}

#[test]
fn domain_vocabulary_is_configurable() {
    let options = CatalogOptions {
        ownership_fields: vec!["accountId".to_string()],
        architecture_triad: vec!["Gateway".to_string()],
    };
    let validator = Validator::new(Arc::new(RuleCatalog::builtin(&options).unwrap()));
    let unit = UnitIdentity::new("svc.ts", UnitRole::Service);

    let code = "import { db } from './db';\nclass S { gw: Gateway }\ndb.users.findMany({ where: { accountId } });\n";
    assert!(validator.validate(code, &unit).compliant);

    let tenant_only = "import { db } from './db';\nclass S { gw: Gateway }\ndb.users.findMany({ where: { tenantId } });\n";
    assert!(validator.validate(tenant_only, &unit).has_violation(ids::TENANT_ISOLATION));
}

#[test]
fn catalog_from_config_loads_rules_file_and_disables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("rules.toml"), EXTRA_RULES).unwrap();
    let config = ValidationConfig {
        rules_file: Some("rules.toml".to_string()),
        disabled_rules: vec![ids::ENV_SOURCED_SECRETS.to_string()],
        ..Default::default()
    };
    let catalog = RuleCatalog::from_config(&config, dir.path()).unwrap();
    assert_eq!(catalog.len(), 11);
    assert!(catalog.get("no-eval").is_some());
    assert!(catalog.get(ids::ENV_SOURCED_SECRETS).is_none());

    let missing = ValidationConfig {
        rules_file: Some("nope.toml".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        RuleCatalog::from_config(&missing, dir.path()),
        Err(CatalogError::Load(DetectionError::InvalidPattern(_)))
    ));
}

#[test]
fn roles_are_inferred_from_paths() {
    assert_eq!(UnitRole::infer_from_path("src/api/users.ts"), UnitRole::Backend);
    assert_eq!(UnitRole::infer_from_path("app/routes/index.js"), UnitRole::Backend);
    assert_eq!(UnitRole::infer_from_path("src/components/Nav.tsx"), UnitRole::Frontend);
    assert_eq!(UnitRole::infer_from_path("src/services/billing.ts"), UnitRole::Service);
    assert_eq!(UnitRole::infer_from_path("src/agents/planner.py"), UnitRole::Agent);
    assert_eq!(UnitRole::infer_from_path("src\\utils\\fmt.ts"), UnitRole::Utility);
    assert_eq!(UnitRole::infer_from_path("main.rs"), UnitRole::Unknown);
    // The file name itself is not a directory hint.
    assert_eq!(UnitRole::infer_from_path("src/api.ts"), UnitRole::Unknown);
}
