use serde::{Deserialize, Serialize};

/// Configuration for the law_office module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LawOfficeConfig {
    /// Reject writes whose `clientId`/`caseId` do not resolve to a stored record.
    #[serde(default)]
    pub enforce_references: bool,
}
