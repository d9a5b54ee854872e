use super::money::Currency;
use crate::error::{ChargeError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How often a coupon applies. Only `Once` coupons may discount a one-off charge.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CouponDuration {
    Once,
    Repeating,
    Forever,
}

/// Coupon payload as returned by the payment processor.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RawCoupon {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount_off: Option<i64>,
    #[serde(default)]
    pub percent_off: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub duration: CouponDuration,
    #[serde(default)]
    pub duration_in_months: Option<u32>,
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

/// A processor coupon that passed structural validation.
///
/// Serializes to the same shape the billing UI consumes:
/// `{id, amount_off, duration, duration_in_months, percent_off}`.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Discount {
    pub id: String,
    pub amount_off: Option<i64>,
    pub duration: CouponDuration,
    pub duration_in_months: Option<u32>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub percent_off: Option<Decimal>,
    #[serde(skip)]
    raw: RawCoupon,
}

impl Discount {
    pub fn name(&self) -> Option<&str> {
        self.raw.name.as_deref()
    }

    pub fn currency(&self) -> Option<&Currency> {
        self.raw.currency.as_ref()
    }

    /// The processor payload this discount was built from.
    pub fn as_raw(&self) -> &RawCoupon {
        &self.raw
    }
}

impl TryFrom<RawCoupon> for Discount {
    type Error = ChargeError;

    fn try_from(raw: RawCoupon) -> Result<Self> {
        let invalid = || ChargeError::InvalidCoupon(raw.id.clone());

        if !raw.valid {
            return Err(invalid());
        }
        if raw.amount_off.is_some() && raw.percent_off.is_some() {
            return Err(invalid());
        }
        if raw.amount_off.is_some_and(|off| off < 0) {
            return Err(invalid());
        }
        if raw
            .percent_off
            .is_some_and(|pct| pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED)
        {
            return Err(invalid());
        }

        Ok(Self {
            id: raw.id.clone(),
            amount_off: raw.amount_off,
            duration: raw.duration,
            duration_in_months: raw.duration_in_months,
            percent_off: raw.percent_off,
            raw,
        })
    }
}

/// Coupon eligibility and amount adjustment for one-off charges.
pub struct DiscountPolicy;

impl DiscountPolicy {
    /// Recurring coupons never apply to a single charge.
    pub fn is_eligible_for_charge(discount: &Discount) -> bool {
        discount.duration == CouponDuration::Once
    }

    /// Amount-off coupons only apply to charges in their own currency.
    pub fn applies_to_currency(discount: &Discount, currency: &Currency) -> bool {
        match (discount.amount_off, discount.currency()) {
            (Some(_), Some(coupon_currency)) => coupon_currency == currency,
            _ => true,
        }
    }

    /// Applies `discount` to a per-unit `amount`.
    ///
    /// Percentages are rounded half-up to whole minor units and the result never drops below zero.
    pub fn calculate_final_amount(amount: i64, discount: Option<&Discount>) -> i64 {
        let Some(discount) = discount.filter(|d| Self::is_eligible_for_charge(d)) else {
            return amount;
        };

        let discounted = if let Some(amount_off) = discount.amount_off {
            Decimal::from(amount) - Decimal::from(amount_off)
        } else if let Some(percent_off) = discount.percent_off {
            Decimal::from(amount) * (Decimal::ONE_HUNDRED - percent_off) / Decimal::ONE_HUNDRED
        } else {
            Decimal::from(amount)
        };

        discounted
            .max(Decimal::ZERO)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(amount)
    }
}
