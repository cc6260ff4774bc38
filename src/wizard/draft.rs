//! Team draft — form values accumulated across wizard steps.
//!
//! The draft lives on the client. Each step submission sends the current
//! draft back along with the step's values and receives the updated draft.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// Role of a member within a team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
}

/// A pending team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub email_or_username: String,
    #[serde(default)]
    pub role: MemberRole,
}

impl TeamMember {
    pub fn new(email_or_username: impl Into<String>, role: MemberRole) -> Self {
        Self {
            email_or_username: email_or_username.into(),
            role,
        }
    }
}

/// Values collected by the create-a-new-team step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// In-progress team, held by the client between steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<TeamIdentity>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    /// Set once the team row has been created by the first step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
}

impl TeamDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the team identity, normalizing the name and slug.
    pub fn set_identity(&mut self, identity: TeamIdentity) -> Result<(), WizardError> {
        let name = identity.name.trim().to_string();
        if name.is_empty() {
            return Err(WizardError::InvalidDraft("team name is required".into()));
        }

        let slug = match identity.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => slugify(s),
            _ => slugify(&name),
        };
        if slug.is_empty() {
            return Err(WizardError::InvalidDraft(format!(
                "cannot derive a slug from team name {name:?}"
            )));
        }

        self.identity = Some(TeamIdentity {
            name,
            slug: Some(slug),
            logo: identity.logo.filter(|l| !l.trim().is_empty()),
        });
        Ok(())
    }

    /// Replace the member list. Blank entries are dropped and duplicates
    /// (case-insensitive) keep their first occurrence.
    pub fn set_members(&mut self, members: Vec<TeamMember>) {
        self.members.clear();
        for member in members {
            self.add_member(member);
        }
    }

    /// Add a member. Returns `false` if the entry was blank or already present.
    pub fn add_member(&mut self, member: TeamMember) -> bool {
        let handle = member.email_or_username.trim();
        if handle.is_empty() {
            return false;
        }
        let exists = self
            .members
            .iter()
            .any(|m| m.email_or_username.eq_ignore_ascii_case(handle));
        if exists {
            return false;
        }
        self.members.push(TeamMember::new(handle, member.role));
        true
    }

}

/// Lower-case ASCII alphanumerics separated by single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("  --Acme   & Sons!! "), "acme-sons");
        assert_eq!(slugify("Team_42"), "team-42");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn identity_derives_slug_from_name() {
        let mut draft = TeamDraft::new();
        draft
            .set_identity(TeamIdentity {
                name: "  Platform Team ".into(),
                slug: None,
                logo: Some("   ".into()),
            })
            .unwrap();
        let identity = draft.identity.unwrap();
        assert_eq!(identity.name, "Platform Team");
        assert_eq!(identity.slug.as_deref(), Some("platform-team"));
        assert!(identity.logo.is_none());
    }

    #[test]
    fn identity_keeps_explicit_slug() {
        let mut draft = TeamDraft::new();
        draft
            .set_identity(TeamIdentity {
                name: "Platform".into(),
                slug: Some("Infra Ops".into()),
                logo: None,
            })
            .unwrap();
        assert_eq!(draft.identity.unwrap().slug.as_deref(), Some("infra-ops"));
    }

    #[test]
    fn identity_requires_name() {
        let mut draft = TeamDraft::new();
        let err = draft
            .set_identity(TeamIdentity {
                name: "   ".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::InvalidDraft(_)));
        assert!(draft.identity.is_none());
    }

    #[test]
    fn members_are_deduplicated_case_insensitively() {
        let mut draft = TeamDraft::new();
        draft.set_members(vec![
            TeamMember::new("alice@example.com", MemberRole::Owner),
            TeamMember::new("ALICE@example.com", MemberRole::Member),
            TeamMember::new("  ", MemberRole::Member),
            TeamMember::new(" bob ", MemberRole::Admin),
        ]);
        assert_eq!(
            draft.members,
            vec![
                TeamMember::new("alice@example.com", MemberRole::Owner),
                TeamMember::new("bob", MemberRole::Admin),
            ]
        );
    }

    #[test]
    fn draft_deserializes_from_empty_object() {
        let draft: TeamDraft = serde_json::from_str("{}").unwrap();
        assert_eq!(draft, TeamDraft::new());

        let member: TeamMember =
            serde_json::from_str(r#"{"email_or_username":"x@y.z"}"#).unwrap();
        assert_eq!(member.role, MemberRole::Member);
    }
}
