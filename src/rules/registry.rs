//! Registry mapping rule names to rule functions.

use super::exports::{check_default_export_function, check_single_function_export};
use super::naming::check_file_naming;
use super::params::{check_args_parameter, check_portal_parameter};
use super::portal::check_portal_database;
use super::returns::check_return_type;
use super::test_imports::check_test_imports_testing_db;
use super::{FileRole, RuleContext, RuleError, RuleName, RuleOutcome};

/// Signature shared by every rule.
pub type RuleFn = fn(&RuleContext<'_>) -> Result<RuleOutcome, RuleError>;

/// A registered rule.
#[derive(Clone, Copy)]
pub struct RuleEntry {
    pub name: RuleName,
    pub description: &'static str,
    /// File roles the rule may report on. Other files are skipped without
    /// invoking the rule.
    pub roles: &'static [FileRole],
    pub check: RuleFn,
}

impl std::fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEntry")
            .field("name", &self.name)
            .field("roles", &self.roles)
            .finish()
    }
}

const FUNCTION: &[FileRole] = &[FileRole::Function];
const TEST: &[FileRole] = &[FileRole::Test];
const FUNCTION_AND_TEST: &[FileRole] = &[FileRole::Function, FileRole::Test];

static RULES: &[RuleEntry] = &[
    RuleEntry {
        name: RuleName::FileNaming,
        description: "File names start with a naming-class prefix (pure., effect., effectRollback.)",
        roles: FUNCTION_AND_TEST,
        check: check_file_naming,
    },
    RuleEntry {
        name: RuleName::DefaultExportFunction,
        description: "The default export is a function",
        roles: FUNCTION,
        check: check_default_export_function,
    },
    RuleEntry {
        name: RuleName::SingleFunctionExport,
        description: "The default export is the only exported function",
        roles: FUNCTION,
        check: check_single_function_export,
    },
    RuleEntry {
        name: RuleName::PortalParameter,
        description: "Effectful functions take the portal as their first parameter",
        roles: FUNCTION,
        check: check_portal_parameter,
    },
    RuleEntry {
        name: RuleName::ArgsParameter,
        description: "The arguments parameter is typed with the args marker",
        roles: FUNCTION,
        check: check_args_parameter,
    },
    RuleEntry {
        name: RuleName::ReturnType,
        description: "Effectful functions return the tuple marker of their naming class",
        roles: FUNCTION,
        check: check_return_type,
    },
    RuleEntry {
        name: RuleName::PortalDatabase,
        description: "The portal's database property is typeof a known database variable",
        roles: FUNCTION,
        check: check_portal_database,
    },
    RuleEntry {
        name: RuleName::TestImportsTestingDb,
        description: "Tests of database-backed functions import the testing factory from the connection module",
        roles: TEST,
        check: check_test_imports_testing_db,
    },
];

/// All registered rules, in registry order.
pub fn all() -> &'static [RuleEntry] {
    RULES
}

pub fn lookup(name: RuleName) -> Option<&'static RuleEntry> {
    RULES.iter().find(|r| r.name == name)
}
