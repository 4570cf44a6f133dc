// API credential vault
// Multiple keys per provider, at most one active. Validation happens at the
// call site (a live probe per provider); the vault itself only records the
// resulting status, which keeps every transition pure and testable.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Valid,
    Invalid,
    Unchecked,
}

impl CredentialStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CredentialStatus::Valid => "valid",
            CredentialStatus::Invalid => "invalid",
            CredentialStatus::Unchecked => "unchecked",
        }
    }
}

/// The three independent credential providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    YouTube,
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::YouTube => "YouTube",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAi => "OpenAI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "youtube" | "yt" => Some(ProviderKind::YouTube),
            "gemini" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiCredential {
    pub id: String,
    pub key: String,
    pub status: CredentialStatus,
}

fn generate_credential_id() -> String {
    format!("{}-{:08x}", Utc::now().timestamp_millis(), rand::random::<u32>())
}

/// Credentials known for one provider plus the active pointer.
/// Invariant: `active_id` references a credential in `keys`, and outside the
/// legacy-migration path that credential is marked `valid`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub keys: Vec<ApiCredential>,
    #[serde(rename = "activeId")]
    pub active_id: Option<String>,
}

impl ProviderCredentials {
    /// Store a new credential with its validation status. Duplicate secret
    /// values are rejected. A valid credential becomes active automatically
    /// when no credential is active yet.
    pub fn add(&mut self, key: &str, status: CredentialStatus) -> Result<&ApiCredential> {
        if self.keys.iter().any(|c| c.key == key) {
            return Err(AppError::InvalidInput(
                "This key is already stored for this provider".to_string(),
            ));
        }

        let credential = ApiCredential {
            id: generate_credential_id(),
            key: key.to_string(),
            status,
        };
        if status == CredentialStatus::Valid && self.active_id.is_none() {
            self.active_id = Some(credential.id.clone());
        }
        self.keys.push(credential);
        Ok(self.keys.last().unwrap())
    }

    /// Delete by id. If the removed credential was active, the pointer falls
    /// back to any remaining valid credential, or to none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|c| c.id != id);
        if self.keys.len() == before {
            return false;
        }

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self
                .keys
                .iter()
                .find(|c| c.status == CredentialStatus::Valid)
                .map(|c| c.id.clone());
        }
        true
    }

    /// Activate a credential. Only credentials currently marked valid may
    /// become active.
    pub fn set_active(&mut self, id: &str) -> Result<()> {
        let credential = self
            .keys
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::InvalidInput("No credential with that id".to_string()))?;

        if credential.status != CredentialStatus::Valid {
            return Err(AppError::InvalidInput(format!(
                "Cannot activate a credential marked '{}'",
                credential.status.label()
            )));
        }

        self.active_id = Some(id.to_string());
        Ok(())
    }

    /// Secret value of the active credential, if any.
    pub fn active_key(&self) -> Option<&str> {
        let active_id = self.active_id.as_deref()?;
        self.keys
            .iter()
            .find(|c| c.id == active_id)
            .map(|c| c.key.as_str())
    }
}

/// Consolidated persisted structure: all three providers' credential lists
/// and active pointers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialBundle {
    #[serde(default)]
    pub youtube: ProviderCredentials,
    #[serde(default)]
    pub gemini: ProviderCredentials,
    #[serde(default)]
    pub openai: ProviderCredentials,
}

impl CredentialBundle {
    pub fn provider(&self, kind: ProviderKind) -> &ProviderCredentials {
        match kind {
            ProviderKind::YouTube => &self.youtube,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAi => &self.openai,
        }
    }

    pub fn provider_mut(&mut self, kind: ProviderKind) -> &mut ProviderCredentials {
        match kind {
            ProviderKind::YouTube => &mut self.youtube,
            ProviderKind::Gemini => &mut self.gemini,
            ProviderKind::OpenAi => &mut self.openai,
        }
    }

    pub fn active_key(&self, kind: ProviderKind) -> Option<&str> {
        self.provider(kind).active_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_duplicate_secret() {
        let mut creds = ProviderCredentials::default();
        creds.add("secret-1", CredentialStatus::Valid).unwrap();
        assert!(creds.add("secret-1", CredentialStatus::Valid).is_err());
        assert_eq!(creds.keys.len(), 1);
    }

    #[test]
    fn test_first_valid_credential_auto_activates() {
        let mut creds = ProviderCredentials::default();
        let invalid_id = creds
            .add("bad", CredentialStatus::Invalid)
            .unwrap()
            .id
            .clone();
        assert_eq!(creds.active_id, None);

        let valid_id = creds.add("good", CredentialStatus::Valid).unwrap().id.clone();
        assert_eq!(creds.active_id, Some(valid_id.clone()));

        // A later valid key does not steal the active slot
        creds.add("also-good", CredentialStatus::Valid).unwrap();
        assert_eq!(creds.active_id, Some(valid_id));
        assert_ne!(creds.active_id, Some(invalid_id));
    }

    #[test]
    fn test_invalid_credential_can_never_activate() {
        let mut creds = ProviderCredentials::default();
        let id = creds
            .add("bad", CredentialStatus::Invalid)
            .unwrap()
            .id
            .clone();
        assert_eq!(creds.active_id, None);
        assert!(creds.set_active(&id).is_err());
        assert_eq!(creds.active_id, None);

        let unchecked = creds
            .add("maybe", CredentialStatus::Unchecked)
            .unwrap()
            .id
            .clone();
        assert!(creds.set_active(&unchecked).is_err());
    }

    #[test]
    fn test_remove_active_falls_back_to_valid() {
        let mut creds = ProviderCredentials::default();
        let first = creds.add("one", CredentialStatus::Valid).unwrap().id.clone();
        creds.add("bad", CredentialStatus::Invalid).unwrap();
        let second = creds.add("two", CredentialStatus::Valid).unwrap().id.clone();

        assert!(creds.remove(&first));
        assert_eq!(creds.active_id, Some(second.clone()));

        assert!(creds.remove(&second));
        // Only the invalid key remains, so nothing is active
        assert_eq!(creds.active_id, None);
        assert_eq!(creds.active_key(), None);
    }

    #[test]
    fn test_switch_active_between_valid_keys() {
        let mut creds = ProviderCredentials::default();
        creds.add("one", CredentialStatus::Valid).unwrap();
        let second = creds.add("two", CredentialStatus::Valid).unwrap().id.clone();

        creds.set_active(&second).unwrap();
        assert_eq!(creds.active_key(), Some("two"));
    }
}
