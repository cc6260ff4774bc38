//! Stored workspace OAuth tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;
use crate::store::CredentialRecord;

/// Provider-type tag for workspace directory credentials.
pub const WORKSPACE_DIRECTORY_CREDENTIAL: &str = "google_workspace_directory";

/// Token set restored from a credential record.
///
/// Every field is optional and unknown fields are ignored, so a partially
/// filled record still parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token expiry as epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl WorkspaceTokens {
    /// Parse the `key` payload of a credential record.
    ///
    /// The payload must be a JSON object; serde would otherwise accept an
    /// array positionally.
    pub fn from_record(record: &CredentialRecord) -> Result<Self, DirectoryError> {
        if !record.key.is_object() {
            return Err(DirectoryError::MalformedCredential {
                credential_id: record.id,
                reason: "token payload is not a JSON object".into(),
            });
        }
        serde_json::from_value(record.key.clone()).map_err(|e| {
            DirectoryError::MalformedCredential {
                credential_id: record.id,
                reason: e.to_string(),
            }
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    /// Access token usable at `now`, if any.
    ///
    /// A token without an expiry is assumed valid. A token within `skew` of
    /// its expiry counts as expired.
    pub fn usable_access_token(&self, now: DateTime<Utc>, skew: chrono::Duration) -> Option<&str> {
        let token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let Some(expires_at) = self.expires_at() else {
            return Some(token);
        };
        match expires_at.checked_sub_signed(skew) {
            Some(usable_until) if usable_until > now => Some(token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(key: serde_json::Value) -> CredentialRecord {
        CredentialRecord {
            id: 11,
            kind: WORKSPACE_DIRECTORY_CREDENTIAL.into(),
            user_id: 1,
            key,
        }
    }

    #[test]
    fn partial_record_parses_with_defaults() {
        let tokens = WorkspaceTokens::from_record(&record(json!({
            "refresh_token": "1//refresh",
            "access_token": "ya29.access"
        })))
        .unwrap();

        assert_eq!(tokens.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(tokens.access_token.as_deref(), Some("ya29.access"));
        assert!(tokens.expiry_date.is_none());
        assert!(tokens.token_type.is_none());
        assert!(tokens.id_token.is_none());
        assert!(tokens.scope.is_none());
    }

    #[test]
    fn empty_and_extra_fields_parse() {
        let tokens = WorkspaceTokens::from_record(&record(json!({}))).unwrap();
        assert_eq!(tokens, WorkspaceTokens::default());

        let tokens =
            WorkspaceTokens::from_record(&record(json!({"scope": "s", "invalid": true}))).unwrap();
        assert_eq!(tokens.scope.as_deref(), Some("s"));
    }

    #[test]
    fn wrong_types_are_malformed() {
        let err = WorkspaceTokens::from_record(&record(json!("not an object"))).unwrap_err();
        assert!(matches!(err, DirectoryError::MalformedCredential { credential_id: 11, .. }));

        let err = WorkspaceTokens::from_record(&record(json!({"expiry_date": "soon"}))).unwrap_err();
        assert!(matches!(err, DirectoryError::MalformedCredential { .. }));

        for key in [json!(["1//refresh"]), json!([]), json!(null), json!(42)] {
            let err = WorkspaceTokens::from_record(&record(key.clone())).unwrap_err();
            assert!(
                matches!(err, DirectoryError::MalformedCredential { credential_id: 11, .. }),
                "{key} should be malformed"
            );
        }
    }

    #[test]
    fn access_token_respects_expiry() {
        let now = Utc::now();
        let skew = chrono::Duration::seconds(60);
        let mut tokens = WorkspaceTokens {
            access_token: Some("tok".into()),
            ..Default::default()
        };
        assert_eq!(tokens.usable_access_token(now, skew), Some("tok"));

        tokens.expiry_date = Some((now + chrono::Duration::minutes(10)).timestamp_millis());
        assert_eq!(tokens.usable_access_token(now, skew), Some("tok"));

        tokens.expiry_date = Some((now + chrono::Duration::seconds(30)).timestamp_millis());
        assert_eq!(tokens.usable_access_token(now, skew), None);

        tokens.access_token = Some(String::new());
        tokens.expiry_date = None;
        assert_eq!(tokens.usable_access_token(now, skew), None);
    }

    #[test]
    fn expiry_at_the_earliest_instant_is_expired() {
        let tokens = WorkspaceTokens {
            access_token: Some("tok".into()),
            expiry_date: Some(DateTime::<Utc>::MIN_UTC.timestamp_millis()),
            ..Default::default()
        };
        let skew = chrono::Duration::seconds(60);
        assert_eq!(tokens.usable_access_token(Utc::now(), skew), None);
        assert_eq!(tokens.usable_access_token(DateTime::<Utc>::MIN_UTC, skew), None);
    }
}
