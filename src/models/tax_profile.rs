use serde::{Deserialize, Serialize};

use super::{non_empty, StepFields};

/// Row in `tax_profiles`, at most one per business.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaxProfile {
    pub id: String,
    pub business_id: String,
    pub tin_number: String,
    pub vat_registered: bool,
    pub fiscal_year_end: String,
    pub bir_registration_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxInput {
    pub tin_number: String,
    pub vat_registered: bool,
    pub fiscal_year_end: String,
    pub bir_registration_date: String,
}

impl TaxInput {
    pub fn from_fields(fields: &StepFields) -> Self {
        Self {
            tin_number: fields.text("tinNumber"),
            vat_registered: fields.flag("vatRegistered"),
            fiscal_year_end: fields.text("fiscalYearEnd"),
            bir_registration_date: fields.text("birRegistrationDate"),
        }
    }

    pub fn to_fields(&self) -> StepFields {
        StepFields::new()
            .with("tinNumber", self.tin_number.as_str())
            .with("vatRegistered", self.vat_registered)
            .with("fiscalYearEnd", self.fiscal_year_end.as_str())
            .with("birRegistrationDate", self.bir_registration_date.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxInfo {
    pub tin_number: String,
    pub vat_registered: bool,
    pub fiscal_year_end: String,
    pub bir_registration_date: Option<String>,
}

impl TaxInfo {
    pub(crate) fn from_checked(input: &TaxInput) -> Self {
        Self {
            tin_number: input.tin_number.trim().to_string(),
            vat_registered: input.vat_registered,
            fiscal_year_end: input.fiscal_year_end.trim().to_string(),
            bir_registration_date: non_empty(&input.bir_registration_date),
        }
    }
}
