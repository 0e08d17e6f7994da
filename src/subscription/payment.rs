//! Plan prices and the checkout boundary.

use crate::i18n::Language;
use crate::subscription::SubscriptionPlan;
use crate::types::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingInterval {
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPrice {
    /// Price id at the payment provider
    pub id: &'static str,
    pub plan: SubscriptionPlan,
    /// Amount in US cents
    pub amount_cents: u32,
    pub currency: &'static str,
    pub interval: BillingInterval,
}

pub const PRICES: [PlanPrice; 2] = [
    PlanPrice {
        id: "price_monthly",
        plan: SubscriptionPlan::Monthly,
        amount_cents: 499,
        currency: "usd",
        interval: BillingInterval::Month,
    },
    PlanPrice {
        id: "price_yearly",
        plan: SubscriptionPlan::Yearly,
        amount_cents: 4799,
        currency: "usd",
        interval: BillingInterval::Year,
    },
];

/// CNY per USD used for display only.
const CNY_RATE: u32 = 7;

pub fn plan_price(plan: SubscriptionPlan) -> Option<&'static PlanPrice> {
    PRICES.iter().find(|p| p.plan == plan)
}

impl PlanPrice {
    /// `$4.99` for English, whole yuan at 7:1 for Chinese.
    pub fn format(&self, lang: Language) -> String {
        match lang {
            Language::Zh => {
                let fen = self.amount_cents * CNY_RATE;
                format!("¥{}", (fen + 50) / 100)
            }
            Language::En => format!("${:.2}", f64::from(self.amount_cents) / 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, price_id: &str) -> Result<CheckoutSession>;

    async fn verify_payment(&self, session_id: &str) -> Result<bool>;
}

/// Test-mode checkout that always succeeds.
#[derive(Debug, Default, Clone)]
pub struct StubCheckout;

#[async_trait]
impl PaymentGateway for StubCheckout {
    async fn create_checkout_session(&self, price_id: &str) -> Result<CheckoutSession> {
        let id = format!("cs_test_{}", uuid::Uuid::new_v4().simple());
        tracing::info!(price_id, session_id = %id, "Created stub checkout session");
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.com/pay/{}", id),
            id,
        })
    }

    async fn verify_payment(&self, session_id: &str) -> Result<bool> {
        tracing::debug!(session_id, "Verifying stub checkout session");
        Ok(true)
    }
}
