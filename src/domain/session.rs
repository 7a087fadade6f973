use crate::domain::amount::Amount;
use crate::domain::descriptor::PaymentDescriptor;
use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a confirmed payment attempt.
///
/// `Success` and `Failed` are terminal; `Pending` represents "awaiting
/// external verification" and can still resolve either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Confirmed,
    Processing,
    Success,
    Failed,
    Pending,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Pending => "pending",
        };
        write!(f, "{label}")
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(PaymentStatus::Created),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "processing" => Ok(PaymentStatus::Processing),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            "pending" => Ok(PaymentStatus::Pending),
            other => Err(PaymentError::UnknownStatus(other.to_string())),
        }
    }
}

/// Out-of-band assistance channel used to authorize the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Dial the shared `*99#` short code and follow the menu.
    Ussd,
    /// Call one of the fixed assistance numbers and use the keypad.
    Ivr,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Ussd => write!(f, "ussd"),
            Channel::Ivr => write!(f, "ivr"),
        }
    }
}

impl FromStr for Channel {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ussd" => Ok(Channel::Ussd),
            "ivr" => Ok(Channel::Ivr),
            other => Err(PaymentError::UnknownChannel(other.to_string())),
        }
    }
}

/// Immutable snapshot of the single in-flight payment attempt.
///
/// Populated incrementally by the session store's transitions: capture fills
/// the descriptor (and possibly the amount), amount entry fills the amount,
/// confirm fills channel/instructions/ids/status, polling overwrites status.
/// A snapshot handed to a reader never changes; every transition produces a
/// new one.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PaymentSession {
    pub descriptor: Option<PaymentDescriptor>,
    pub amount: Option<Amount>,
    /// Locally generated correlation id, set at confirmation time.
    pub local_correlation_id: Option<String>,
    /// Identifier assigned by the transaction-creation collaborator, if any.
    pub remote_transaction_id: Option<String>,
    pub channel: Option<Channel>,
    pub instructions: Option<Vec<String>>,
    pub status: Option<PaymentStatus>,
}

impl PaymentSession {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True once the attempt has been confirmed and assigned a channel.
    pub fn is_confirmed(&self) -> bool {
        self.channel.is_some()
    }

    /// True when the attempt reached `success` or `failed`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(PaymentStatus::is_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Created.is_terminal());
        assert!(!PaymentStatus::Confirmed.is_terminal());
        assert!(!PaymentStatus::Processing.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            PaymentStatus::Created,
            PaymentStatus::Confirmed,
            PaymentStatus::Processing,
            PaymentStatus::Success,
            PaymentStatus::Failed,
            PaymentStatus::Pending,
        ] {
            assert_eq!(status.to_string().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("settled".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Processing).unwrap(),
            "\"processing\""
        );
        let status: PaymentStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, PaymentStatus::Pending);
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("ussd".parse::<Channel>().unwrap(), Channel::Ussd);
        assert_eq!("ivr".parse::<Channel>().unwrap(), Channel::Ivr);
        assert!("sms".parse::<Channel>().is_err());
    }

    #[test]
    fn test_empty_session() {
        let session = PaymentSession::empty();
        assert!(!session.is_confirmed());
        assert!(!session.is_terminal());
        assert!(session.descriptor.is_none());
        assert!(session.status.is_none());
    }
}
