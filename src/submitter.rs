//! Plan submission to the planning backend
//!
//! One POST per plan, no retries and no caching. Transport failures, non-success
//! statuses and unreadable bodies are kept apart in `SubmitError` for logging,
//! but all of them read the same to the user.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::PlannerConfig;
use crate::error::SubmitError;
use crate::models::{DayPlan, PlanRequest};

const PLAN_PATH: &str = "/api/plan";

/// Anything that can turn a plan request into a day plan
#[async_trait]
pub trait PlanningBackend: Send + Sync {
    async fn submit(&self, request: &PlanRequest) -> Result<DayPlan, SubmitError>;
}

/// HTTP client for the planning backend
pub struct PlanSubmitter {
    client: Client,
    endpoint: String,
}

impl PlanSubmitter {
    pub fn new(config: &PlannerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("PlanMyDay/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), PLAN_PATH),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PlanningBackend for PlanSubmitter {
    #[instrument(skip_all, fields(budget = request.budget()))]
    async fn submit(&self, request: &PlanRequest) -> Result<DayPlan, SubmitError> {
        let start_time = Instant::now();
        debug!(
            "Submitting plan request for '{}' to {}",
            request.location().display_address(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmitError::Timeout(start_time.elapsed())
                } else {
                    SubmitError::Transport {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Planner answered with status {}", status);
            return Err(SubmitError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| SubmitError::Transport {
            message: e.to_string(),
        })?;

        let plan: DayPlan =
            serde_json::from_slice(&body).map_err(|e| SubmitError::MalformedBody {
                message: e.to_string(),
            })?;

        info!(
            "Received plan with {} stops in {:.3}s",
            plan.itinerary.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(plan)
    }
}
