//! Coupon records.
//!
//! Coupons are created by admin action and stored in the coupon store. The
//! pricing engine validates and prices them; the only mutation it ever asks
//! for is the single usage-counter increment after a successful payment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a coupon's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a percentage of the discount base (0-100).
    Percent,
    /// `value` is a flat dollar amount.
    Fixed,
}

/// A discount coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Redemption code, matched case-insensitively at checkout.
    pub code: String,
    /// Percent or fixed.
    pub kind: DiscountKind,
    /// Percentage (0-100) or dollar amount, per `kind`.
    pub value: Decimal,
    /// Expiry; `None` never expires.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum redemptions; `None` is unlimited.
    #[serde(default)]
    pub usage_cap: Option<u32>,
    /// Redemptions so far.
    #[serde(default)]
    pub used: u32,
    /// When non-empty, only these emails may redeem (case-insensitive).
    #[serde(default)]
    pub allowed_emails: Vec<String>,
}

impl Coupon {
    /// Whether the coupon has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether the usage cap has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_cap.is_some_and(|cap| self.used >= cap)
    }

    /// Whether `email` may redeem this coupon.
    ///
    /// An unrestricted coupon allows anyone, including anonymous checkouts.
    #[must_use]
    pub fn allows(&self, email: Option<&str>) -> bool {
        if self.allowed_emails.is_empty() {
            return true;
        }
        email.is_some_and(|email| {
            self.allowed_emails
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(email))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coupon() -> Coupon {
        Coupon {
            code: "SAVE10".to_owned(),
            kind: DiscountKind::Percent,
            value: Decimal::from(10),
            expires_at: None,
            usage_cap: Some(2),
            used: 0,
            allowed_emails: Vec::new(),
        }
    }

    #[test]
    fn test_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let mut c = coupon();
        assert!(!c.is_expired(now));

        c.expires_at = Some(now);
        assert!(c.is_expired(now));
        assert!(!c.is_expired(now - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_usage_cap() {
        let mut c = coupon();
        assert!(!c.is_exhausted());
        c.used = 2;
        assert!(c.is_exhausted());
    }

    #[test]
    fn test_email_restriction() {
        let mut c = coupon();
        assert!(c.allows(None));

        c.allowed_emails = vec!["vip@example.com".to_owned()];
        assert!(!c.allows(None));
        assert!(!c.allows(Some("someone@example.com")));
        assert!(c.allows(Some("VIP@example.com")));
    }
}
