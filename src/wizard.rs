//! The onboarding wizard: a strictly linear `Business → TaxInfo → Preferences →
//! Complete` sequence that only moves forward once the current step has been
//! validated locally and accepted by the gateway.
//!
//! Drafts hold what has been typed for every step and survive back navigation.
//! Committed data is only merged in after a successful submission, and the
//! completion summary is built from that committed copy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{FieldErrors, StepFailure};
use crate::models::{BusinessInput, PreferencesInput, TaxInput};
use crate::services::onboarding::{
    COMPLETE_FAILED, SAVE_BUSINESS_FAILED, SAVE_PREFERENCES_FAILED, SAVE_TAX_FAILED,
};
use crate::services::OnboardingService;
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Business,
    TaxInfo,
    Preferences,
    Complete,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Business,
        WizardStep::TaxInfo,
        WizardStep::Preferences,
        WizardStep::Complete,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Business => "Business",
            WizardStep::TaxInfo => "Tax Info",
            WizardStep::Preferences => "Preferences",
            WizardStep::Complete => "Complete",
        }
    }
}

/// One step's fields, tagged by the step they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "fields", rename_all = "snake_case")]
pub enum StepData {
    Business(BusinessInput),
    Tax(TaxInput),
    Preferences(PreferencesInput),
}

impl StepData {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        match self {
            StepData::Business(input) => validation::validate_business(input).map(|_| ()),
            StepData::Tax(input) => validation::validate_tax(input).map(|_| ()),
            StepData::Preferences(input) => validation::validate_preferences(input).map(|_| ()),
        }
    }
}

/// Where the wizard sends a step once it passes local validation.
#[async_trait]
pub trait StepGateway: Send + Sync {
    async fn submit(&self, data: &StepData) -> Result<(), StepFailure>;

    /// Confirms every onboarding record exists remotely.
    async fn complete(&self) -> Result<(), StepFailure>;
}

#[async_trait]
impl<T: StepGateway + ?Sized> StepGateway for Arc<T> {
    async fn submit(&self, data: &StepData) -> Result<(), StepFailure> {
        self.as_ref().submit(data).await
    }

    async fn complete(&self) -> Result<(), StepFailure> {
        self.as_ref().complete().await
    }
}

/// Calls the onboarding service directly with a fixed session token.
#[derive(Clone)]
pub struct InProcessGateway {
    service: OnboardingService,
    token: Option<String>,
}

impl InProcessGateway {
    pub fn new(service: OnboardingService, token: Option<String>) -> Self {
        Self { service, token }
    }
}

#[async_trait]
impl StepGateway for InProcessGateway {
    async fn submit(&self, data: &StepData) -> Result<(), StepFailure> {
        let token = self.token.as_deref();
        match data {
            StepData::Business(input) => self
                .service
                .save_business(token, input)
                .await
                .map_err(|e| e.into_failure(SAVE_BUSINESS_FAILED)),
            StepData::Tax(input) => self
                .service
                .save_tax_info(token, input)
                .await
                .map_err(|e| e.into_failure(SAVE_TAX_FAILED)),
            StepData::Preferences(input) => self
                .service
                .save_preferences(token, input)
                .await
                .map_err(|e| e.into_failure(SAVE_PREFERENCES_FAILED)),
        }
    }

    async fn complete(&self) -> Result<(), StepFailure> {
        self.service
            .complete_onboarding(self.token.as_deref())
            .await
            .map_err(|e| e.into_failure(COMPLETE_FAILED))
    }
}

/// Everything typed so far, one draft per step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDrafts {
    pub business: BusinessInput,
    pub tax: TaxInput,
    pub preferences: PreferencesInput,
}

/// Steps the gateway has accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Committed {
    business: Option<BusinessInput>,
    tax: Option<TaxInput>,
    preferences: Option<PreferencesInput>,
}

impl Committed {
    fn merge(&mut self, data: StepData) {
        match data {
            StepData::Business(input) => self.business = Some(input),
            StepData::Tax(input) => self.tax = Some(input),
            StepData::Preferences(input) => self.preferences = Some(input),
        }
    }
}

/// Read-only view shown on the final step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub business_name: String,
    pub business_type: String,
    pub industry: String,
    pub tin_number: String,
    pub vat_registered: bool,
    pub fiscal_year_end: String,
    pub accounting_method: String,
    pub chart_of_accounts: String,
    pub currency_preference: String,
    pub digital_receipts: bool,
}

/// Shared view of the in-flight flag so controls can be disabled while a
/// submission is awaiting the gateway. Advisory only.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clears the flag on drop, including when the submission future is abandoned.
struct InFlightGuard<'a>(&'a InFlight);

impl<'a> InFlightGuard<'a> {
    fn start(flag: &'a InFlight) -> Self {
        flag.0.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.store(false, Ordering::SeqCst);
    }
}

pub struct Wizard<G> {
    gateway: G,
    current: usize,
    drafts: FormDrafts,
    committed: Committed,
    failure: Option<StepFailure>,
    in_flight: InFlight,
    finished: bool,
}

impl<G: StepGateway> Wizard<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            current: 0,
            drafts: FormDrafts::default(),
            committed: Committed::default(),
            failure: None,
            in_flight: InFlight::default(),
            finished: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ALL[self.current]
    }

    pub fn step_titles() -> Vec<&'static str> {
        WizardStep::ALL.iter().map(WizardStep::title).collect()
    }

    /// True on the last data step, where "next" reads as "submit".
    pub fn is_last_step(&self) -> bool {
        self.current == WizardStep::ALL.len() - 2
    }

    pub fn is_complete(&self) -> bool {
        self.current_step() == WizardStep::Complete
    }

    /// Set once `complete()` has succeeded; the dashboard is reachable.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    pub fn in_flight_handle(&self) -> InFlight {
        self.in_flight.clone()
    }

    pub fn can_navigate(&self) -> bool {
        !self.is_in_flight()
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        self.failure.as_ref()
    }

    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        self.failure.as_ref().and_then(|f| f.field_errors(field))
    }

    pub fn drafts(&self) -> &FormDrafts {
        &self.drafts
    }

    pub fn business_mut(&mut self) -> &mut BusinessInput {
        &mut self.drafts.business
    }

    pub fn tax_mut(&mut self) -> &mut TaxInput {
        &mut self.drafts.tax
    }

    pub fn preferences_mut(&mut self) -> &mut PreferencesInput {
        &mut self.drafts.preferences
    }

    /// Stores the TIN through the input mask (see `validation::format_tin`).
    pub fn set_tin_input(&mut self, raw: &str) {
        self.drafts.tax.tin_number = validation::format_tin(raw);
    }

    fn current_data(&self) -> Option<StepData> {
        match self.current_step() {
            WizardStep::Business => Some(StepData::Business(self.drafts.business.clone())),
            WizardStep::TaxInfo => Some(StepData::Tax(self.drafts.tax.clone())),
            WizardStep::Preferences => Some(StepData::Preferences(self.drafts.preferences.clone())),
            WizardStep::Complete => None,
        }
    }

    fn fail(&mut self, failure: StepFailure) -> Option<StepFailure> {
        self.failure = Some(failure.clone());
        Some(failure)
    }

    /// Validates and submits the current step. `None` means the step was
    /// committed and the wizard moved forward; otherwise the position holds.
    pub async fn advance(&mut self) -> Option<StepFailure> {
        if self.is_in_flight() {
            return Some(StepFailure::message("A submission is already in progress"));
        }
        let Some(data) = self.current_data() else {
            return self.fail(StepFailure::message("Onboarding steps are already finished"));
        };

        if let Err(errors) = data.validate() {
            return self.fail(StepFailure {
                message: "Validation failed".to_string(),
                errors: Some(errors),
            });
        }

        let result = {
            let _guard = InFlightGuard::start(&self.in_flight);
            self.gateway.submit(&data).await
        };

        match result {
            Ok(()) => {
                tracing::debug!(step = self.current_step().title(), "step committed");
                self.committed.merge(data);
                self.failure = None;
                self.current += 1;
                None
            }
            Err(failure) => self.fail(failure),
        }
    }

    /// Steps back one page. Drafts are left untouched and nothing is re-sent.
    pub fn retreat(&mut self) {
        if self.is_in_flight() {
            return;
        }
        if self.current > 0 {
            self.current -= 1;
            self.failure = None;
        }
    }

    pub fn summary(&self) -> Option<CompletionSummary> {
        if !self.is_complete() {
            return None;
        }
        let business = self.committed.business.as_ref()?;
        let tax = self.committed.tax.as_ref()?;
        let prefs = self.committed.preferences.as_ref()?;
        Some(CompletionSummary {
            business_name: business.business_name.clone(),
            business_type: business.business_type.clone(),
            industry: business.industry.clone(),
            tin_number: tax.tin_number.clone(),
            vat_registered: tax.vat_registered,
            fiscal_year_end: tax.fiscal_year_end.clone(),
            accounting_method: prefs.accounting_method.clone(),
            chart_of_accounts: prefs.chart_of_accounts.clone(),
            currency_preference: prefs.currency_preference.clone(),
            digital_receipts: prefs.digital_receipts,
        })
    }

    /// Explicit completion call, only valid on the final step.
    pub async fn complete(&mut self) -> Option<StepFailure> {
        if !self.is_complete() {
            return self.fail(StepFailure::message("Onboarding not complete"));
        }
        if self.is_in_flight() {
            return Some(StepFailure::message("A submission is already in progress"));
        }

        let result = {
            let _guard = InFlightGuard::start(&self.in_flight);
            self.gateway.complete().await
        };

        match result {
            Ok(()) => {
                self.failure = None;
                self.finished = true;
                None
            }
            Err(failure) => self.fail(failure),
        }
    }
}
