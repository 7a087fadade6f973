use crate::domain::amount::Amount;
use crate::domain::session::Channel;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared NUUP short code for USSD-based transfers.
pub const USSD_SHORT_CODE: &str = "*99#";

/// IVR assistance line for SBI, HDFC, ICICI and Axis account holders.
pub const IVR_PRIMARY_NUMBER: &str = "080-4516-3666";

/// IVR assistance line for Canara Bank, PNB and NSDL account holders.
pub const IVR_SECONDARY_NUMBER: &str = "6366-200-200";

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produces the ordered, human-readable steps for completing the transfer
/// over the chosen out-of-band channel.
///
/// Deterministic given the same inputs. Both variants reference the payee
/// identifier and the formatted amount inline and end with the expected
/// confirmation step.
pub fn generate_instructions(channel: Channel, payee_identifier: &str, amount: Amount) -> Vec<String> {
    match channel {
        Channel::Ussd => generate_ussd_steps(payee_identifier, amount),
        Channel::Ivr => generate_ivr_steps(payee_identifier, amount),
    }
}

fn generate_ussd_steps(payee_identifier: &str, amount: Amount) -> Vec<String> {
    vec![
        format!("Dial {USSD_SHORT_CODE} from your bank-registered mobile number. No internet is needed."),
        "Choose 'Send Money', then pick 'UPI ID' as the transfer method.".to_string(),
        format!("Enter the payee UPI ID {payee_identifier} when prompted."),
        format!("Enter the amount {} and an optional remark.", amount.formatted()),
        "Enter your UPI PIN to authorize the transfer.".to_string(),
        "You will see an on-screen confirmation, and an SMS follows once the transfer completes.".to_string(),
    ]
}

fn generate_ivr_steps(payee_identifier: &str, amount: Amount) -> Vec<String> {
    vec![
        format!(
            "Call {IVR_PRIMARY_NUMBER} (SBI, HDFC, ICICI, Axis) or {IVR_SECONDARY_NUMBER} (Canara Bank, PNB, NSDL) from your registered number."
        ),
        "Select your language, then choose the money transfer option.".to_string(),
        format!("When asked for the beneficiary, key in the UPI ID {payee_identifier}."),
        format!("Key in the amount {} using the keypad.", amount.formatted()),
        "Authorize the transfer with your UPI PIN on the keypad.".to_string(),
        "The call announces the result, and an SMS follows once the transfer is processed.".to_string(),
    ]
}

/// Generates a client-side reference of the form
/// `txn-<base36 millis>-<6 random base36 chars>`.
///
/// Unique enough for a single device's session lifetime; a remote identifier
/// supersedes it when the transaction-creation collaborator is available.
pub fn generate_local_correlation_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
        .collect();

    format!("txn-{}-{}", to_base36(millis), suffix)
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    // The alphabet is ASCII, so the digit buffer is valid UTF-8.
    String::from_utf8(digits).unwrap_or_default()
}
