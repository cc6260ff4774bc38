//! Wizard controller — resolves the active step and produces navigation
//! commands. Pure: no I/O, no routing side effects.

use serde::{Deserialize, Serialize};

use super::draft::{TeamDraft, TeamIdentity, TeamMember};
use super::step::{STEPS, StepFallback, StepHeader, WizardStep};
use crate::error::WizardError;

/// Route prefix for the wizard pages.
pub const WIZARD_BASE_PATH: &str = "/settings/teams/new";

/// A request to move the client to another step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub step: WizardStep,
    pub index: usize,
    pub path: String,
}

impl Navigation {
    fn to(step: WizardStep) -> Self {
        Self {
            step,
            index: step.index(),
            path: format!("{WIZARD_BASE_PATH}/{}", step.as_str()),
        }
    }
}

/// What the client needs to render the current step.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: WizardStep,
    pub index: usize,
    pub max_steps: usize,
    pub header: StepHeader,
    pub path: String,
}

/// Form values submitted by one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum StepSubmission {
    CreateANewTeam {
        #[serde(flatten)]
        identity: TeamIdentity,
        /// Id of the team created for this draft, if the client already has one.
        #[serde(default)]
        team_id: Option<i64>,
    },
    AddTeamMembers { members: Vec<TeamMember> },
}

impl StepSubmission {
    /// The step this submission belongs to.
    pub fn step(&self) -> WizardStep {
        match self {
            Self::CreateANewTeam { .. } => WizardStep::CreateANewTeam,
            Self::AddTeamMembers { .. } => WizardStep::AddTeamMembers,
        }
    }
}

/// Result of applying a step submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Continue to another step with the updated draft.
    Continue {
        draft: TeamDraft,
        navigation: Navigation,
    },
    /// The last step was submitted; the draft is final.
    Complete { draft: TeamDraft },
}

/// Step-wizard state machine.
///
/// States are the entries of [`STEPS`]; any index is directly reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wizard {
    fallback: StepFallback,
}

impl Wizard {
    pub fn new(fallback: StepFallback) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> StepFallback {
        self.fallback
    }

    pub fn step_count(&self) -> usize {
        STEPS.len()
    }

    /// Resolve the active step from a route parameter.
    pub fn resolve(&self, requested: Option<&str>) -> Result<WizardStep, WizardError> {
        WizardStep::resolve_with(requested, self.fallback)
    }

    /// Navigation to the step at `index`, or `None` when out of range.
    pub fn go_to_index(&self, index: usize) -> Option<Navigation> {
        STEPS.get(index).copied().map(Navigation::to)
    }

    pub fn view(&self, step: WizardStep) -> WizardView {
        let navigation = Navigation::to(step);
        WizardView {
            step,
            index: navigation.index,
            max_steps: self.step_count(),
            header: step.header(),
            path: navigation.path,
        }
    }

    /// Apply a step's submission to the draft.
    pub fn submit(
        &self,
        step: WizardStep,
        mut draft: TeamDraft,
        submission: StepSubmission,
    ) -> Result<StepOutcome, WizardError> {
        if submission.step() != step {
            return Err(WizardError::SubmissionMismatch {
                step: step.to_string(),
                submitted: submission.step().to_string(),
            });
        }

        match submission {
            StepSubmission::CreateANewTeam { identity, team_id } => {
                draft.set_identity(identity)?;
                if team_id.is_some() {
                    draft.team_id = team_id;
                }
            }
            StepSubmission::AddTeamMembers { members } => draft.set_members(members),
        }

        if step.is_last() {
            tracing::debug!(step = %step, members = draft.members.len(), "Team wizard completed");
            return Ok(StepOutcome::Complete { draft });
        }

        match self.go_to_index(step.index() + 1) {
            Some(navigation) => Ok(StepOutcome::Continue { draft, navigation }),
            None => Ok(StepOutcome::Complete { draft }),
        }
    }
}
