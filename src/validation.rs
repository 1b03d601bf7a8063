//! Field-level checks for each onboarding step.
//!
//! Every check runs independently so a single submission can report several
//! fields (and several messages per field) at once. Nothing here touches the
//! store; a `FieldErrors` result means the caller must not persist anything.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::FieldErrors;
use crate::models::{
    AccountingMethod, BusinessInfo, BusinessInput, LoginInput, Preferences, PreferencesInput,
    RegisterInput, TaxInfo, TaxInput,
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});

// ASCII digits only; `\d` would also admit other Unicode digit classes.
static TIN_DASHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{3}-[0-9]{3}$").unwrap());
static TIN_RAW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{9}$").unwrap());

pub type Validated<T> = Result<T, FieldErrors>;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Accepts `123-456-789-000` or nine raw digits.
pub fn is_valid_tin(tin: &str) -> bool {
    TIN_DASHED_RE.is_match(tin) || TIN_RAW_RE.is_match(tin)
}

/// Input mask for the TIN field. Strips non-digits; up to nine digits stay bare,
/// longer input is regrouped as `XXX-XXX-XXX-XXX`.
pub fn format_tin(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).take(12).collect();
    if digits.len() <= 9 {
        return digits;
    }
    let groups: Vec<&str> = (0..digits.len())
        .step_by(3)
        .map(|start| &digits[start..(start + 3).min(digits.len())])
        .collect();
    groups.join("-")
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

fn finish<T>(errors: FieldErrors, value: impl FnOnce() -> T) -> Validated<T> {
    if errors.is_empty() {
        Ok(value())
    } else {
        Err(errors)
    }
}

pub fn validate_registration(input: &RegisterInput) -> Validated<RegisterInput> {
    let mut errors = FieldErrors::new();

    if input.first_name.trim().chars().count() < 2 {
        errors.push("firstName", "First name must be at least 2 characters");
    }
    if input.last_name.trim().chars().count() < 2 {
        errors.push("lastName", "Last name must be at least 2 characters");
    }
    if !is_valid_email(input.email.trim()) {
        errors.push("email", "Invalid email address");
    }

    let password = &input.password;
    if password.chars().count() < 8 {
        errors.push("password", "Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        errors.push("password", "Password must contain at least one letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password", "Password must contain at least one number");
    }

    finish(errors, || RegisterInput {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email: input.email.trim().to_lowercase(),
        password: input.password.clone(),
    })
}

pub fn validate_login(input: &LoginInput) -> Validated<LoginInput> {
    let mut errors = FieldErrors::new();
    if !is_valid_email(input.email.trim()) {
        errors.push("email", "Invalid email address");
    }
    if input.password.is_empty() {
        errors.push("password", "Password is required");
    }
    finish(errors, || LoginInput {
        email: input.email.trim().to_lowercase(),
        password: input.password.clone(),
    })
}

pub fn validate_business(input: &BusinessInput) -> Validated<BusinessInfo> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "businessName", &input.business_name, "Business name is required");
    require(&mut errors, "businessType", &input.business_type, "Business type is required");
    require(&mut errors, "industry", &input.industry, "Industry is required");
    finish(errors, || BusinessInfo::from_checked(input))
}

pub fn validate_tax(input: &TaxInput) -> Validated<TaxInfo> {
    let mut errors = FieldErrors::new();

    let tin = input.tin_number.trim();
    if tin.is_empty() {
        errors.push("tinNumber", "TIN number is required");
    } else if !is_valid_tin(tin) {
        errors.push("tinNumber", "TIN number format is invalid");
    }
    require(&mut errors, "fiscalYearEnd", &input.fiscal_year_end, "Fiscal year end is required");

    finish(errors, || TaxInfo::from_checked(input))
}

pub fn validate_preferences(input: &PreferencesInput) -> Validated<Preferences> {
    let Ok(accounting_method) = input.accounting_method.trim().parse::<AccountingMethod>() else {
        let mut errors = FieldErrors::new();
        errors.push("accountingMethod", "Accounting method must be either cash or accrual");
        return Err(errors);
    };
    Ok(Preferences {
        accounting_method,
        chart_of_accounts: input.chart_of_accounts.trim().to_string(),
        currency_preference: input.currency_preference.trim().to_string(),
        digital_receipts: input.digital_receipts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(first: &str, last: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn tin_formats() {
        assert!(is_valid_tin("123456789"));
        assert!(is_valid_tin("123-456-789-000"));
        assert!(!is_valid_tin("12-3456789"));
        assert!(!is_valid_tin("1234567890"));
        assert!(!is_valid_tin("123-456-789"));
        assert!(!is_valid_tin("１２３４５６７８９"));
    }

    #[test]
    fn registration_reports_every_failing_field() {
        let errors = validate_registration(&registration("J", "D", "not-an-email", "short"))
            .unwrap_err();
        assert!(errors.contains("firstName"));
        assert!(errors.contains("lastName"));
        assert!(errors.contains("email"));
        assert_eq!(
            errors.get("password").unwrap(),
            &[
                "Password must be at least 8 characters".to_string(),
                "Password must contain at least one number".to_string(),
            ]
        );
    }

    #[test]
    fn password_needs_letter_and_digit() {
        let errors = validate_registration(&registration("Juan", "Dela Cruz", "juan@example.com", "12345678"))
            .unwrap_err();
        assert_eq!(
            errors.get("password").unwrap(),
            &["Password must contain at least one letter".to_string()]
        );
        assert!(validate_registration(&registration("Juan", "Dela Cruz", "juan@example.com", "abcd1234")).is_ok());
    }

    #[test]
    fn registration_normalizes_email() {
        let valid = validate_registration(&registration(" Juan ", "Dela Cruz", " Juan@Example.com ", "abcd1234"))
            .unwrap();
        assert_eq!(valid.first_name, "Juan");
        assert_eq!(valid.email, "juan@example.com");
    }

    #[test]
    fn names_are_measured_after_trimming() {
        let errors = validate_registration(&registration("J ", " D ", "juan@example.com", "abcd1234"))
            .unwrap_err();
        assert_eq!(
            errors.get("firstName").unwrap(),
            &["First name must be at least 2 characters".to_string()]
        );
        assert!(errors.contains("lastName"));
        assert!(validate_registration(&registration(" Jo ", "Li", "juan@example.com", "abcd1234")).is_ok());
    }

    #[test]
    fn business_requires_name_type_industry() {
        let errors = validate_business(&BusinessInput::default()).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["businessName", "businessType", "industry"]);
    }

    #[test]
    fn business_optional_fields_become_none() {
        let info = validate_business(&BusinessInput {
            business_name: "Sari-Sari Store".into(),
            business_type: "Sole Proprietorship".into(),
            industry: "Retail".into(),
            business_size: "  ".into(),
            business_address: String::new(),
        })
        .unwrap();
        assert_eq!(info.business_size, None);
        assert_eq!(info.business_address, None);
    }

    #[test]
    fn tax_rejects_short_tin() {
        let errors = validate_tax(&TaxInput {
            tin_number: "12-34".into(),
            fiscal_year_end: "December 31".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            errors.get("tinNumber").unwrap(),
            &["TIN number format is invalid".to_string()]
        );
        assert!(!errors.contains("fiscalYearEnd"));
    }

    #[test]
    fn tax_missing_tin_is_required_not_malformed() {
        let errors = validate_tax(&TaxInput::default()).unwrap_err();
        assert_eq!(errors.get("tinNumber").unwrap(), &["TIN number is required".to_string()]);
        assert!(errors.contains("fiscalYearEnd"));
    }

    #[test]
    fn preferences_method_must_be_cash_or_accrual() {
        let mut input = PreferencesInput::default();
        assert_eq!(
            validate_preferences(&input).unwrap().accounting_method,
            AccountingMethod::Accrual
        );
        input.accounting_method = "hybrid".into();
        assert!(validate_preferences(&input).unwrap_err().contains("accountingMethod"));
    }

    #[test]
    fn login_requires_password() {
        let errors = validate_login(&LoginInput {
            email: "juan@example.com".into(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(errors.get("password").unwrap(), &["Password is required".to_string()]);
    }

    #[test]
    fn tin_mask_groups_digits() {
        assert_eq!(format_tin("123"), "123");
        assert_eq!(format_tin("1234"), "1234");
        assert_eq!(format_tin("123-456-789"), "123456789");
        assert_eq!(format_tin("1234567890"), "123-456-789-0");
        assert_eq!(format_tin("123 456 789 000 99"), "123-456-789-000");
        assert_eq!(format_tin("abc"), "");
    }

    #[test]
    fn masked_tin_is_accepted_at_both_lengths() {
        assert!(is_valid_tin(&format_tin("123 456 789")));
        assert!(is_valid_tin(&format_tin("123456789000")));
    }
}
