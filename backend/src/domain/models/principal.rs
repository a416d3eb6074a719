use serde::{Deserialize, Serialize};

/// The acting authenticated identity, as supplied by the external identity
/// provider. The domain layer only consumes it to stamp seller/buyer fields;
/// authentication itself happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl Principal {
    /// Display name falling back to a fixed label, matching what sellers see
    /// on issued records when no profile name is set.
    pub fn display_name_or(&self, fallback: &str) -> String {
        match &self.display_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => fallback.to_string(),
        }
    }
}
