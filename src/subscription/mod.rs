//! Subscription tier
//!
//! The active subscription is kept as a small JSON document on disk so it
//! survives restarts. Payment itself goes through a [`PaymentGateway`];
//! only a test-mode stub ships with the crate.

pub mod payment;

use crate::types::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use payment::{plan_price, CheckoutSession, PaymentGateway, PlanPrice, StubCheckout, PRICES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub fn period(self) -> Option<Duration> {
        match self {
            SubscriptionPlan::Free => None,
            SubscriptionPlan::Monthly => Some(Duration::days(30)),
            SubscriptionPlan::Yearly => Some(Duration::days(365)),
        }
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionPlan::Free),
            "monthly" => Ok(SubscriptionPlan::Monthly),
            "yearly" => Ok(SubscriptionPlan::Yearly),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    PastDue,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan_id: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl Subscription {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date.is_some_and(|end| end > now)
    }
}

pub struct SubscriptionManager {
    state_file: Option<PathBuf>,
    current: Option<Subscription>,
    payments: Arc<dyn PaymentGateway>,
}

impl SubscriptionManager {
    pub fn new(state_file: impl Into<PathBuf>, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            state_file: Some(state_file.into()),
            current: None,
            payments,
        }
    }

    /// No state file; the subscription lives as long as the manager.
    pub fn in_memory(payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            state_file: None,
            current: None,
            payments,
        }
    }

    pub fn current(&self) -> Option<&Subscription> {
        self.current.as_ref()
    }

    pub fn is_premium(&self, now: DateTime<Utc>) -> bool {
        self.current.as_ref().is_some_and(|s| s.is_active_at(now))
    }

    /// Reload from disk, dropping an expired subscription.
    pub async fn check(&mut self, now: DateTime<Utc>) -> Result<Option<&Subscription>> {
        let stored = match &self.state_file {
            Some(path) => read_state(path).await?,
            None => self.current.take(),
        };

        self.current = match stored {
            Some(sub) if sub.end_date.is_some_and(|end| end < now) => {
                tracing::info!(plan = ?sub.plan_id, "Subscription expired");
                self.clear_state().await?;
                None
            }
            other => other,
        };
        Ok(self.current.as_ref())
    }

    pub async fn subscribe(
        &mut self,
        plan: SubscriptionPlan,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        let (price, period) = match (plan_price(plan), plan.period()) {
            (Some(price), Some(period)) => (price, period),
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "plan {:?} cannot be purchased",
                    plan
                )))
            }
        };

        let session = self.payments.create_checkout_session(price.id).await?;
        if !self.payments.verify_payment(&session.id).await? {
            return Err(AppError::Transport(format!(
                "payment for session {} was not confirmed",
                session.id
            )));
        }

        let subscription = Subscription {
            plan_id: plan,
            status: SubscriptionStatus::Active,
            start_date: Some(now),
            end_date: Some(now + period),
            cancel_at_period_end: false,
        };
        self.write_state(&subscription).await?;
        self.current = Some(subscription.clone());
        tracing::info!(plan = ?plan, "Subscription activated");
        Ok(subscription)
    }

    pub async fn cancel(&mut self) -> Result<()> {
        self.clear_state().await?;
        self.current = None;
        tracing::info!("Subscription canceled");
        Ok(())
    }

    async fn write_state(&self, subscription: &Subscription) -> Result<()> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(subscription)
            .map_err(|e| AppError::Database(format!("Failed to encode subscription: {}", e)))?;
        tokio::fs::write(path, json).await.map_err(|e| {
            AppError::Database(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    async fn clear_state(&self) -> Result<()> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Database(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

async fn read_state(path: &Path) -> Result<Option<Subscription>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
            AppError::Database(format!("Corrupt subscription state {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Database(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}
