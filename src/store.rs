//! Record access for users and the three onboarding tables.
//!
//! Each step write is a single `INSERT ... ON CONFLICT DO UPDATE` keyed on the
//! parent id (`owner_id` for businesses, `business_id` for the rest), so a
//! repeated submission updates the existing row instead of adding another.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{OnboardingError, OnboardingResult};
use crate::models::{
    AccountingMethod, BookkeepingPreferences, Business, BusinessInfo, Preferences, TaxInfo,
    TaxProfile, User,
};

/// Which onboarding records exist for an owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnboardingStatus {
    pub business: bool,
    pub tax_profile: bool,
    pub preferences: bool,
}

impl OnboardingStatus {
    pub fn is_complete(&self) -> bool {
        self.business && self.tax_profile && self.preferences
    }
}

#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // --------- users ---------

    pub async fn insert_user(&self, user: &User) -> OnboardingResult<()> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, is_email_verified, verification_token, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_email_verified)
        .bind(&user.verification_token)
        .bind(&user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn email_exists(&self, email: &str) -> OnboardingResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_user(&self, id: &str) -> OnboardingResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, password_hash, is_email_verified, verification_token, created_at \
             FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            first_name: r.get("first_name"),
            last_name: r.get("last_name"),
            email: r.get("email"),
            password_hash: r.get("password_hash"),
            is_email_verified: r.get("is_email_verified"),
            verification_token: r.get("verification_token"),
            created_at: r.get("created_at"),
        }))
    }

    // --------- businesses ---------

    pub async fn find_business_id(&self, owner_id: &str) -> OnboardingResult<Option<String>> {
        let id = sqlx::query_scalar::<_, String>("SELECT id FROM businesses WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn find_business(&self, owner_id: &str) -> OnboardingResult<Option<Business>> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, business_type, business_size, industry, business_address, created_at, updated_at \
             FROM businesses WHERE owner_id = ?"
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Business {
            id: r.get("id"),
            owner_id: r.get("owner_id"),
            name: r.get("name"),
            business_type: r.get("business_type"),
            business_size: r.get("business_size"),
            industry: r.get("industry"),
            business_address: r.get("business_address"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// Returns the business id, new or existing.
    pub async fn upsert_business(&self, owner_id: &str, info: &BusinessInfo) -> OnboardingResult<String> {
        let id = sqlx::query_scalar::<_, String>(
            "INSERT INTO businesses (id, owner_id, name, business_type, business_size, industry, business_address) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(owner_id) DO UPDATE SET \
                name = excluded.name, \
                business_type = excluded.business_type, \
                business_size = excluded.business_size, \
                industry = excluded.industry, \
                business_address = excluded.business_address, \
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now') \
             RETURNING id"
        )
        .bind(Uuid::new_v4().to_string())
        .bind(owner_id)
        .bind(&info.name)
        .bind(&info.business_type)
        .bind(&info.business_size)
        .bind(&info.industry)
        .bind(&info.business_address)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    // --------- tax_profiles ---------

    pub async fn find_tax_profile(&self, business_id: &str) -> OnboardingResult<Option<TaxProfile>> {
        let row = sqlx::query(
            "SELECT id, business_id, tin_number, vat_registered, fiscal_year_end, bir_registration_date, created_at, updated_at \
             FROM tax_profiles WHERE business_id = ?"
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| TaxProfile {
            id: r.get("id"),
            business_id: r.get("business_id"),
            tin_number: r.get("tin_number"),
            vat_registered: r.get("vat_registered"),
            fiscal_year_end: r.get("fiscal_year_end"),
            bir_registration_date: r.get("bir_registration_date"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    pub async fn upsert_tax_profile(&self, business_id: &str, info: &TaxInfo) -> OnboardingResult<()> {
        sqlx::query(
            "INSERT INTO tax_profiles (id, business_id, tin_number, vat_registered, fiscal_year_end, bir_registration_date) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(business_id) DO UPDATE SET \
                tin_number = excluded.tin_number, \
                vat_registered = excluded.vat_registered, \
                fiscal_year_end = excluded.fiscal_year_end, \
                bir_registration_date = excluded.bir_registration_date, \
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')"
        )
        .bind(Uuid::new_v4().to_string())
        .bind(business_id)
        .bind(&info.tin_number)
        .bind(info.vat_registered)
        .bind(&info.fiscal_year_end)
        .bind(&info.bir_registration_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --------- bookkeeping_preferences ---------

    pub async fn find_preferences(&self, business_id: &str) -> OnboardingResult<Option<BookkeepingPreferences>> {
        let row = sqlx::query(
            "SELECT id, business_id, accounting_method, chart_of_accounts, currency_preference, digital_receipts, created_at, updated_at \
             FROM bookkeeping_preferences WHERE business_id = ?"
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(preferences_from_row).transpose()
    }

    pub async fn upsert_preferences(&self, business_id: &str, prefs: &Preferences) -> OnboardingResult<()> {
        sqlx::query(
            "INSERT INTO bookkeeping_preferences (id, business_id, accounting_method, chart_of_accounts, currency_preference, digital_receipts) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(business_id) DO UPDATE SET \
                accounting_method = excluded.accounting_method, \
                chart_of_accounts = excluded.chart_of_accounts, \
                currency_preference = excluded.currency_preference, \
                digital_receipts = excluded.digital_receipts, \
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')"
        )
        .bind(Uuid::new_v4().to_string())
        .bind(business_id)
        .bind(prefs.accounting_method.as_str())
        .bind(&prefs.chart_of_accounts)
        .bind(&prefs.currency_preference)
        .bind(prefs.digital_receipts)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --------- completion ---------

    pub async fn onboarding_status(&self, owner_id: &str) -> OnboardingResult<OnboardingStatus> {
        let row = sqlx::query(
            "SELECT b.id AS business_id, \
                EXISTS(SELECT 1 FROM tax_profiles t WHERE t.business_id = b.id) AS has_tax, \
                EXISTS(SELECT 1 FROM bookkeeping_preferences p WHERE p.business_id = b.id) AS has_prefs \
             FROM businesses b WHERE b.owner_id = ?"
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(r) => OnboardingStatus {
                business: true,
                tax_profile: r.get::<i64, _>("has_tax") != 0,
                preferences: r.get::<i64, _>("has_prefs") != 0,
            },
            None => OnboardingStatus::default(),
        })
    }
}

fn preferences_from_row(r: SqliteRow) -> OnboardingResult<BookkeepingPreferences> {
    let method: String = r.get("accounting_method");
    let accounting_method = method.parse::<AccountingMethod>().map_err(|_| {
        OnboardingError::Store(format!("unknown accounting method '{}'", method))
    })?;

    Ok(BookkeepingPreferences {
        id: r.get("id"),
        business_id: r.get("business_id"),
        accounting_method,
        chart_of_accounts: r.get("chart_of_accounts"),
        currency_preference: r.get("currency_preference"),
        digital_receipts: r.get("digital_receipts"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}
