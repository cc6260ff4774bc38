//! Team creation wizard — a linear multi-step flow driven by the URL.
//!
//! The active step is derived from the `/settings/teams/new/<step-id>` path
//! on every request. Moving between steps is expressed as a `Navigation`
//! command the client follows; nothing about wizard progress is stored on
//! the server.

pub mod controller;
pub mod draft;
pub mod routes;
pub mod step;

pub use controller::{Navigation, StepOutcome, StepSubmission, Wizard, WizardView};
pub use draft::{MemberRole, TeamDraft, TeamIdentity, TeamMember};
pub use routes::{WizardRouteState, wizard_routes};
pub use step::{STEPS, StepFallback, WizardStep};
