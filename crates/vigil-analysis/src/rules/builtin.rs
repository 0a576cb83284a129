//! Built-in rule set.

use vigil_core::errors::DetectionError;

use super::catalog::CatalogOptions;
use super::detectors::{AsyncContainmentDetector, MarkerDetector, PatternDetector, RequiredNamesDetector};
use super::exceptions::GenericPlaceholderException;
use super::ids;
use super::types::{Severity, UnitRole};
use super::Rule;

const TYPE_HOLES: &[&str] = &[
    r":\s*any\b",
    r"\bas\s+any\b",
    r"<\s*any\s*>",
    r"\bany\s*\[\s*\]",
    r",\s*any\s*>",
    r"=\s*any\s*[>,]",
    r"(?::|->)\s*Any\b",
    r"\binterface\s*\{\s*\}",
];

const STORAGE_OPERATIONS: &[&str] = &[
    r"\.(?:find|findOne|findMany|findFirst|findUnique|findById|insert|insertOne|insertMany|update|updateOne|updateMany|delete|deleteOne|deleteMany|create|createMany|upsert|aggregate|select|query)\s*\(",
    r"(?i:\bselect\s+[\w*,\s.]+?\s+from\s+\w|\binsert\s+into\s+\w|\bupdate\s+\w+\s+set\b|\bdelete\s+from\s+\w)",
];

const STORAGE_IMPORTS: &[&str] = &[
    r"(?m)^\s*(?:import|from|use|require|#include|const\s+[\w{}\s,]+=\s*require)\b.*(?i:db|database|prisma|mongo|sql|supabase|knex|sequelize|typeorm|drizzle|repositor|redis|dynamo|firestore|storage|orm)",
];

const STAND_IN_EXACT: &[&str] = &[
    // placeholders and unresolved work
    "TODO",
    "FIXME",
    "XXX",
    "HACK",
    "TBD",
    "PLACEHOLDER",
    "unimplemented!",
    "todo!(",
    "NotImplementedError",
    "NotImplementedException",
    // suppressed type checks
    "@ts-ignore",
    "@ts-nocheck",
    "@ts-expect-error",
    "# type: ignore",
    "eslint-disable",
];

const STAND_IN_FOLDED: &[&str] = &[
    "not implemented",
    "lorem ipsum",
    "coming soon",
    "replace_me",
    "your_api_key",
    "mockData",
    "mock_data",
    "mock data",
    "mockResponse",
    "mock_response",
    "fakeData",
    "fake_data",
    "dummyData",
    "dummy_data",
    "dummy data",
];

const UNTYPED_INPUT: &[&str] = &[
    r"\breq\.(?:body|query|params)\b",
    r"\brequest\.(?:body|query|params|form|args|get_json|json)\b",
    r"\bevent\.body\b",
    r"\bctx\.request\.body\b",
];

const SCHEMA_VALIDATION: &[&str] = &[
    r"\w*(?:[Ss]chema|Validator|Dto|DTO)\w*\s*\.\s*(?:parse|safeParse|parseAsync|safeParseAsync|validate|validateAsync|validateSync)\s*\(",
    r"\bz\.\w+\s*\(",
    r"\bJoi\.",
    r"\byup\.",
    r"\bvalidationResult\s*\(",
    r"\bBaseModel\b",
    r"\bplainToInstance\s*\(",
    r"\bajv\.compile\s*\(",
    r"\bvalidate\s*\(",
];

const AD_HOC_PRINTING: &[&str] = &[
    r"\bconsole\.(?:log|debug|info)\s*\(",
    r"\bprint\s*\(",
    r"\bprintln!\s*\(",
    r"\bSystem\.out\.print(?:ln)?\s*\(",
    r"\bfmt\.Print(?:ln|f)?\s*\(",
];

const HARDCODED_ENDPOINTS: &[&str] = &[
    r"(?i)\b(?:localhost|127\.0\.0\.1|0\.0\.0\.0)(?::\d+)?\b",
    r"https?://[\w.-]+:\d{2,5}\b",
];

const LITERAL_SECRETS: &[&str] = &[
    r#"(?i)\b(?:password|passwd|pwd|secret|client_secret|api[_-]?key|apikey|access[_-]?token|auth[_-]?token|private[_-]?key)\b["']?\s*[:=]\s*["'][^"'\s]{6,}["']"#,
];

/// Build the built-in rules in catalog order.
pub fn builtin_rules(options: &CatalogOptions) -> Result<Vec<Rule>, DetectionError> {
    Ok(vec![
        Rule::new(
            ids::NO_TYPE_HOLES,
            "No unchecked type holes",
            Severity::Critical,
            PatternDetector::new(TYPE_HOLES)?,
        )
        .with_exception(GenericPlaceholderException::new()?)
        .with_message("{count} unchecked type hole(s) erase type safety")
        .with_suggestion("Replace `any` with an explicit type, a generic parameter, or `unknown` plus narrowing")
        .with_directive("Remove the unchecked-type holes at lines {lines}; replace each with an explicit type."),
        Rule::new(
            ids::TENANT_ISOLATION,
            "Tenant/ownership isolation",
            Severity::Critical,
            PatternDetector::new(STORAGE_OPERATIONS)?.unless_words(&options.ownership_fields)?,
        )
        .applies_to(&[UnitRole::Backend, UnitRole::Service])
        .with_message("{count} storage operation(s) without a tenant/ownership filter")
        .with_suggestion(format!(
            "Filter every read and write by one of: {}",
            options.ownership_fields.join(", ")
        ))
        .with_directive(format!(
            "Add ownership/tenant filtering ({}) to every storage call, including the ones at lines {{lines}}.",
            options.ownership_fields.join(" or ")
        )),
        Rule::new(
            ids::ASYNC_ERROR_CONTAINMENT,
            "Async error containment",
            Severity::Critical,
            AsyncContainmentDetector::new()?,
        )
        .with_message("{count} async function(s) lack error containment")
        .with_suggestion("Wrap the awaited work of each async function in try/catch (or except) and handle the failure")
        .with_directive("Wrap the {count} async function(s) lacking error containment (lines {lines}) in try/catch blocks that handle the error."),
        Rule::new(
            ids::NO_STAND_IN_CONTENT,
            "No stand-in content",
            Severity::Critical,
            MarkerDetector::new(STAND_IN_EXACT, STAND_IN_FOLDED)?,
        )
        .with_message("{count} stand-in marker(s): {items}")
        .with_suggestion("Replace placeholders, mock data and suppressed checks with the real implementation")
        .with_directive("Remove each stand-in marker quoted below, exactly where it appears, and write the real implementation in its place.")
        .quoting_evidence(),
        Rule::new(
            ids::ARCHITECTURE_TRIAD,
            "Architectural shape",
            Severity::High,
            RequiredNamesDetector::new(&options.architecture_triad)?,
        )
        .applies_to(&[UnitRole::Service, UnitRole::Agent])
        .with_message("Missing required collaborator(s): {items}")
        .with_suggestion(format!(
            "Service units must reference {}",
            options.architecture_triad.join(", ")
        ))
        .with_directive("Reference and use the missing collaborator(s): {items}."),
        Rule::new(
            ids::INPUT_SCHEMA_VALIDATION,
            "Input schema validation",
            Severity::High,
            PatternDetector::new(UNTYPED_INPUT)?.unless(SCHEMA_VALIDATION)?,
        )
        .applies_to(&[UnitRole::Backend])
        .with_message("{count} untyped request input read(s) without schema validation")
        .with_suggestion("Parse request input through a schema (e.g. zod, Joi, pydantic) before use")
        .with_directive("Validate request input at lines {lines} with a schema-validation call before using it."),
        Rule::new(
            ids::IMPORT_PRESENCE,
            "Storage dependency declared",
            Severity::Warning,
            PatternDetector::new(STORAGE_OPERATIONS)?.unless(STORAGE_IMPORTS)?,
        )
        .with_message("Storage access without an import of a storage client")
        .with_suggestion("Import the storage client or repository the unit depends on"),
        Rule::new(
            ids::STRUCTURED_LOGGING,
            "Structured logging",
            Severity::Warning,
            PatternDetector::new(AD_HOC_PRINTING)?,
        )
        .with_message("Ad hoc printing at lines {lines}")
        .with_suggestion("Use the structured logger instead of printing"),
        Rule::new(
            ids::NO_HARDCODED_ENDPOINTS,
            "No hardcoded endpoints",
            Severity::Warning,
            PatternDetector::new(HARDCODED_ENDPOINTS)?,
        )
        .with_message("Hardcoded network endpoint(s): {items}")
        .with_suggestion("Read endpoints from configuration or the environment"),
        Rule::new(
            ids::ENV_SOURCED_SECRETS,
            "Secrets sourced from environment",
            Severity::Warning,
            PatternDetector::new(LITERAL_SECRETS)?,
        )
        .with_message("Literal secret(s) at lines {lines}")
        .with_suggestion("Load secrets from environment variables or a secret manager"),
    ])
}
