use serde::{Deserialize, Serialize};

use super::{non_empty, StepFields};

/// Row in `businesses`. One per owner.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Business {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub business_type: String,
    pub business_size: Option<String>,
    pub industry: String,
    pub business_address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Raw Business step fields as typed by the user.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessInput {
    pub business_name: String,
    pub business_type: String,
    pub business_size: String,
    pub industry: String,
    pub business_address: String,
}

impl BusinessInput {
    pub fn from_fields(fields: &StepFields) -> Self {
        Self {
            business_name: fields.text("businessName"),
            business_type: fields.text("businessType"),
            business_size: fields.text("businessSize"),
            industry: fields.text("industry"),
            business_address: fields.text("businessAddress"),
        }
    }

    pub fn to_fields(&self) -> StepFields {
        StepFields::new()
            .with("businessName", self.business_name.as_str())
            .with("businessType", self.business_type.as_str())
            .with("businessSize", self.business_size.as_str())
            .with("industry", self.industry.as_str())
            .with("businessAddress", self.business_address.as_str())
    }
}

/// Validated Business step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessInfo {
    pub name: String,
    pub business_type: String,
    pub business_size: Option<String>,
    pub industry: String,
    pub business_address: Option<String>,
}

impl BusinessInfo {
    pub(crate) fn from_checked(input: &BusinessInput) -> Self {
        Self {
            name: input.business_name.trim().to_string(),
            business_type: input.business_type.trim().to_string(),
            business_size: non_empty(&input.business_size),
            industry: input.industry.trim().to_string(),
            business_address: non_empty(&input.business_address),
        }
    }
}
