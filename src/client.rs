use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::StepFailure;
use crate::models::StepFields;
use crate::services::auth::LOGIN_FAILED;
use crate::services::onboarding::{
    COMPLETE_FAILED, SAVE_BUSINESS_FAILED, SAVE_PREFERENCES_FAILED, SAVE_TAX_FAILED,
};
use crate::wizard::{StepData, StepGateway};

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    token: String,
}

/// Drives the wizard against a running server over HTTP.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Signs in and returns a gateway carrying the issued session token.
    pub async fn login(base_url: &str, email: &str, password: &str) -> Result<Self, StepFailure> {
        let mut gateway = Self::new(base_url, None);
        let res = gateway
            .client
            .post(gateway.url("/api/auth/login"))
            .json(&LoginBody { email, password })
            .send()
            .await
            .map_err(|e| transport_failure(e, LOGIN_FAILED))?;

        if !res.status().is_success() {
            return Err(failure_from(res, LOGIN_FAILED).await);
        }
        let reply: LoginReply = res
            .json()
            .await
            .map_err(|e| transport_failure(e, LOGIN_FAILED))?;
        gateway.token = Some(reply.token);
        Ok(gateway)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Option<&StepFields>, fallback: &str) -> Result<(), StepFailure> {
        let mut req = self.client.post(self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req = match body {
            Some(fields) => req.json(fields),
            None => req.json(&serde_json::Value::Null),
        };

        let res = req.send().await.map_err(|e| transport_failure(e, fallback))?;
        if res.status().is_success() {
            Ok(())
        } else {
            Err(failure_from(res, fallback).await)
        }
    }
}

pub(crate) fn step_path(data: &StepData) -> &'static str {
    match data {
        StepData::Business(_) => "/api/onboarding/business",
        StepData::Tax(_) => "/api/onboarding/tax",
        StepData::Preferences(_) => "/api/onboarding/preferences",
    }
}

fn transport_failure(err: reqwest::Error, fallback: &str) -> StepFailure {
    tracing::error!(error = %err, "request to onboarding server failed");
    StepFailure::message(fallback)
}

async fn failure_from(res: reqwest::Response, fallback: &str) -> StepFailure {
    let status = res.status();
    match res.json::<StepFailure>().await {
        Ok(failure) => failure,
        Err(e) => {
            tracing::warn!(%status, error = %e, "unreadable error body");
            StepFailure::message(fallback)
        }
    }
}

#[async_trait]
impl StepGateway for HttpGateway {
    async fn submit(&self, data: &StepData) -> Result<(), StepFailure> {
        let (fields, fallback) = match data {
            StepData::Business(input) => (input.to_fields(), SAVE_BUSINESS_FAILED),
            StepData::Tax(input) => (input.to_fields(), SAVE_TAX_FAILED),
            StepData::Preferences(input) => (input.to_fields(), SAVE_PREFERENCES_FAILED),
        };
        self.post(step_path(data), Some(&fields), fallback).await
    }

    async fn complete(&self) -> Result<(), StepFailure> {
        self.post("/api/onboarding/complete", None, COMPLETE_FAILED).await
    }
}
