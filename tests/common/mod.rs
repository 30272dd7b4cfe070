//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use recibo::PrinterProfile;
use recibo::sale::{MerchantProfile, Payment, Sale, SaleItem};

pub fn item(name: &str, quantity: u32, unit_price: i64) -> SaleItem {
    SaleItem {
        name: name.to_string(),
        code: None,
        quantity,
        unit_price,
        total: None,
        toppings: Vec::new(),
        variations: BTreeMap::new(),
    }
}

/// One item, quantity 2 at 15000: subtotal and total 30000.
pub fn simple_sale() -> Sale {
    Sale {
        id: "V-1042".to_string(),
        timestamp: "2026-10-16T19:05:00Z".parse().unwrap(),
        cashier: "Laura".to_string(),
        items: vec![item("Arepa de queso", 2, 15000)],
        payment: Payment::simple("efectivo"),
        change: 0,
        discount: None,
        subtotal: 30000,
        total: 30000,
        order_ref: None,
        customer: None,
    }
}

pub fn merchant() -> MerchantProfile {
    MerchantProfile {
        business_name: "LA AREPERA".to_string(),
        address: Some("Calle 10 # 43-12".to_string()),
        city: Some("Medellín".to_string()),
        phone: Some("604 555 0101".to_string()),
        email: None,
        tax_id: Some("900.123.456-7".to_string()),
        footer_message: None,
    }
}

/// Default profile without pacing delays.
pub fn fast_profile() -> PrinterProfile {
    PrinterProfile::default().without_delays()
}

/// Non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    let mut n = 0;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            n += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    n
}

/// `$20.000` → 20000, `-$1.500` → -1500
pub fn parse_money(s: &str) -> i64 {
    let negative = s.starts_with('-');
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    let value: i64 = digits.parse().unwrap();
    if negative { -value } else { value }
}

/// Right-hand value of a label/value row.
pub fn row_value(line: &str) -> &str {
    line.rsplit(' ').next().unwrap()
}
