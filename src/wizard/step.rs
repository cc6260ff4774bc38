//! Wizard steps — the fixed, ordered sequence of team creation stages.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// The stages of the team creation wizard, in order.
///
/// Progresses: CreateNewTeam → AddTeamMembers. A general settings stage may
/// slot in between later; the ordering below is the only source of truth for
/// step indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    CreateANewTeam,
    AddTeamMembers,
}

/// Step order. Index 0 is the initial step.
pub const STEPS: [WizardStep; 2] = [WizardStep::CreateANewTeam, WizardStep::AddTeamMembers];

/// How to treat a step identifier that is present but not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepFallback {
    /// Resolve to the first step (product default).
    #[default]
    FirstStep,
    /// Report the identifier as unknown.
    Reject,
}

/// Title and subtitle translation keys shown above a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepHeader {
    pub title: &'static str,
    pub subtitle: Vec<&'static str>,
}

impl WizardStep {
    /// The step a wizard starts on.
    pub const fn initial() -> Self {
        STEPS[0]
    }

    /// Canonical identifier used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateANewTeam => "create-a-new-team",
            Self::AddTeamMembers => "add-team-members",
        }
    }

    /// Position of this step in [`STEPS`].
    pub fn index(&self) -> usize {
        STEPS.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Look up a step by its exact identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        STEPS.iter().copied().find(|s| s.as_str() == id)
    }

    /// Resolve a requested identifier, falling back to the first step.
    ///
    /// Same as [`WizardStep::resolve_with`] under [`StepFallback::FirstStep`],
    /// which never fails.
    pub fn resolve(requested: Option<&str>) -> Self {
        Self::resolve_with(requested, StepFallback::FirstStep).unwrap_or_else(|_| Self::initial())
    }

    /// Resolve a requested identifier under an explicit fallback policy.
    ///
    /// Absent and empty input maps to the first step under every policy;
    /// only a non-empty unknown identifier can be rejected.
    pub fn resolve_with(requested: Option<&str>, fallback: StepFallback) -> Result<Self, WizardError> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self::initial()),
            Some(id) => match (Self::from_id(id), fallback) {
                (Some(step), _) => Ok(step),
                (None, StepFallback::FirstStep) => Ok(Self::initial()),
                (None, StepFallback::Reject) => Err(WizardError::UnknownStep(id.to_string())),
            },
        }
    }

    /// Header translation keys for this step.
    pub fn header(&self) -> StepHeader {
        match self {
            Self::CreateANewTeam => StepHeader {
                title: "create_new_team",
                subtitle: vec!["create_new_team_description"],
            },
            Self::AddTeamMembers => StepHeader {
                title: "add_team_members",
                subtitle: vec!["add_team_members_description"],
            },
        }
    }

    /// Whether completing this step completes the wizard.
    pub fn is_last(&self) -> bool {
        self.index() + 1 == STEPS.len()
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
