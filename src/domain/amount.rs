use crate::error::{PaymentError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound for a single assisted transfer.
pub const MAX_AMOUNT: Decimal = dec!(100000);

/// Currency glyph used for presentation. The engine only assists INR
/// transfers; descriptors carrying another `cu` code are still decoded but
/// rendered with this glyph.
pub const CURRENCY_GLYPH: &str = "₹";

/// A positive monetary amount within the assisted-transfer cap.
///
/// Wraps `rust_decimal::Decimal` so that every amount stored in a session has
/// already passed the bounds check.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            Err(PaymentError::InvalidAmount(format!(
                "{value} is not positive"
            )))
        } else if value > MAX_AMOUNT {
            Err(PaymentError::InvalidAmount(format!(
                "{value} exceeds the {MAX_AMOUNT} cap"
            )))
        } else {
            Ok(Self(value))
        }
    }

    /// Parses user-entered text into a bounded amount.
    pub fn parse(text: &str) -> Result<Self> {
        let value = Decimal::from_str(text.trim())
            .map_err(|_| PaymentError::InvalidAmount(text.to_string()))?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Renders the amount with the currency glyph, ready for an instruction
    /// step or a status line.
    pub fn formatted(&self) -> String {
        format_currency(self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns whether `text` parses to a finite decimal with `0 < v <= 100000`.
pub fn is_valid_amount(text: &str) -> bool {
    Amount::parse(text).is_ok()
}

/// Renders a monetary value with exactly two fraction digits, Indian (en-IN)
/// digit grouping and the currency glyph. Presentation only; the stored
/// precision is untouched.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{rounded:.2}");
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{CURRENCY_GLYPH}{}.{frac_part}", group_indian(int_part))
}

/// Indian grouping: the last three digits form one group, every group before
/// that holds two digits (`1234567` -> `12,34,567`).
fn group_indian(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    if digits.len() <= 3 {
        return format!("{sign}{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    let mut out = String::from(sign);
    out.push_str(&groups.join(","));
    out.push(',');
    out.push_str(tail);
    out
}
