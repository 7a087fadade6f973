use rust_decimal_macros::dec;
use upi_assist::domain::amount::{format_currency, is_valid_amount};
use upi_assist::domain::descriptor::decode;
use upi_assist::error::PaymentError;

#[test]
fn test_decode_returns_exact_payee_id() {
    let cases = [
        ("upi://pay?pa=merchant@upi", "merchant@upi"),
        ("upi://pay?pa=ravi.kumar@okaxis&am=150", "ravi.kumar@okaxis"),
        ("upi://pay?pn=Store&pa=9876543210@paytm", "9876543210@paytm"),
        ("upi://pay?pa=a@b&tn=hello&mc=5411&cu=INR", "a@b"),
    ];

    for (raw, payee) in cases {
        let descriptor = decode(raw).unwrap();
        assert_eq!(descriptor.payee_identifier(), payee, "input: {raw}");
    }
}

#[test]
fn test_decode_rejects_non_pay_prefixes() {
    let rejected = [
        "",
        "hello",
        "upi://collect?pa=x@upi",
        "https://example.com?pa=x@upi",
        "UPI://PAY?pa=x@upi",
        "tel:*99%23",
    ];

    for raw in rejected {
        assert!(
            matches!(decode(raw), Err(PaymentError::NotPaymentUri)),
            "input should be rejected: {raw:?}"
        );
    }
}

#[test]
fn test_decode_is_deterministic() {
    let raw = "upi://pay?pa=merchant@upi&pn=Corner%20Store&am=150.50&tn=note";
    let first = decode(raw).unwrap();
    let second = decode(raw).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_decode_never_panics_on_hostile_input() {
    let hostile = [
        "upi://pay",
        "upi://pay?",
        "upi://pay?pa",
        "upi://pay?=&==&&&",
        "upi://pay?pa=%ff%fe",
        "upi://pay?pa=x@upi&am=1e400",
        "upi://pay?pa=x@upi&am=NaN",
        "upi://pay?pa=x@upi&am=-0.0",
    ];

    for raw in hostile {
        // Failure classification may vary; the contract is "no panic".
        let _ = decode(raw);
    }
}

#[test]
fn test_amount_boundaries() {
    assert!(is_valid_amount("100000"));
    assert!(is_valid_amount("0.01"));
    assert!(!is_valid_amount("100000.01"));
    assert!(!is_valid_amount("0"));
    assert!(!is_valid_amount("abc"));
    assert!(!is_valid_amount(""));
}

#[test]
fn test_format_currency_shows_two_decimals_and_glyph() {
    assert_eq!(format_currency(dec!(150)), "₹150.00");
    assert_eq!(format_currency(dec!(100000)), "₹1,00,000.00");
}
