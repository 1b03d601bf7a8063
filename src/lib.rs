pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod wizard;

pub use error::{FieldErrors, OnboardingError, StepFailure};
pub use wizard::{StepData, StepGateway, Wizard, WizardStep};
