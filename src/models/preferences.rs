use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::StepFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountingMethod {
    Cash,
    Accrual,
}

impl AccountingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountingMethod::Cash => "cash",
            AccountingMethod::Accrual => "accrual",
        }
    }
}

impl fmt::Display for AccountingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountingMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(AccountingMethod::Cash),
            "accrual" => Ok(AccountingMethod::Accrual),
            _ => Err(()),
        }
    }
}

/// Row in `bookkeeping_preferences`, at most one per business.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookkeepingPreferences {
    pub id: String,
    pub business_id: String,
    pub accounting_method: AccountingMethod,
    pub chart_of_accounts: String,
    pub currency_preference: String,
    pub digital_receipts: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesInput {
    pub accounting_method: String,
    pub chart_of_accounts: String,
    pub currency_preference: String,
    pub digital_receipts: bool,
}

impl Default for PreferencesInput {
    fn default() -> Self {
        Self {
            accounting_method: "accrual".to_string(),
            chart_of_accounts: "standard".to_string(),
            currency_preference: "PHP".to_string(),
            digital_receipts: true,
        }
    }
}

impl PreferencesInput {
    pub fn from_fields(fields: &StepFields) -> Self {
        Self {
            accounting_method: fields.text("accountingMethod"),
            chart_of_accounts: fields.text("chartOfAccounts"),
            currency_preference: fields.text("currencyPreference"),
            digital_receipts: fields.flag("digitalReceipts"),
        }
    }

    pub fn to_fields(&self) -> StepFields {
        StepFields::new()
            .with("accountingMethod", self.accounting_method.as_str())
            .with("chartOfAccounts", self.chart_of_accounts.as_str())
            .with("currencyPreference", self.currency_preference.as_str())
            .with("digitalReceipts", self.digital_receipts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub accounting_method: AccountingMethod,
    pub chart_of_accounts: String,
    pub currency_preference: String,
    pub digital_receipts: bool,
}
