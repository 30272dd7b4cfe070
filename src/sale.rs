//! # Sale Data Model
//!
//! The records a point-of-sale application hands over for printing. Amounts
//! are whole currency units (`i64`); the receipt never prints decimals.
//!
//! All types deserialize from the JSON the retail application already
//! stores, e.g.:
//!
//! ```json
//! {
//!   "id": "V-1042",
//!   "timestamp": "2026-10-16T19:05:00Z",
//!   "cashier": "Laura",
//!   "items": [{ "name": "Arepa", "quantity": 2, "unit_price": 15000 }],
//!   "payment": { "method": "efectivo" },
//!   "subtotal": 30000,
//!   "total": 30000
//! }
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format;

/// One completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub cashier: String,
    pub items: Vec<SaleItem>,
    pub payment: Payment,
    #[serde(default)]
    pub change: i64,
    #[serde(default)]
    pub discount: Option<Discount>,
    pub subtotal: i64,
    pub total: i64,
    /// Order number or table reference.
    #[serde(default)]
    pub order_ref: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
}

impl Sale {
    /// Discount actually applied, zero when there is none.
    pub fn discount_amount(&self) -> i64 {
        self.discount.as_ref().map_or(0, |d| d.amount)
    }

    /// Check `total == subtotal - discount`.
    pub fn check_totals(&self) -> Result<(), String> {
        let expected = self.subtotal - self.discount_amount();
        if self.total == expected {
            Ok(())
        } else {
            Err(format!(
                "total {} does not match subtotal {} minus discount {}",
                self.total,
                self.subtotal,
                self.discount_amount()
            ))
        }
    }
}

/// One line of the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub quantity: u32,
    pub unit_price: i64,
    /// Explicit line total, overriding the computed one.
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub toppings: Vec<Topping>,
    #[serde(default)]
    pub variations: BTreeMap<String, VariationValue>,
}

impl SaleItem {
    /// Price of a single unit's toppings.
    pub fn toppings_per_unit(&self) -> i64 {
        self.toppings
            .iter()
            .map(Topping::line_price)
            .fold(0, i64::saturating_add)
    }

    /// Base price plus toppings, for one unit.
    pub fn unit_price_with_toppings(&self) -> i64 {
        self.unit_price.saturating_add(self.toppings_per_unit())
    }

    /// Line total: the explicit override if present, otherwise
    /// `(unit_price + toppings) * quantity`. Saturates instead of
    /// overflowing.
    pub fn line_total(&self) -> i64 {
        self.total.unwrap_or_else(|| {
            self.unit_price_with_toppings()
                .saturating_mul(i64::from(self.quantity))
        })
    }
}

/// An add-on priced per unit of the item it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
    pub name: String,
    pub price: i64,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

impl Topping {
    pub fn line_price(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

/// Selected value of an item variation ("Tamaño": "Grande", "Hielo": true).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariationValue {
    Flag(bool),
    Text(String),
}

impl VariationValue {
    /// Text printed on the receipt; flags become `Sí` / `No`.
    pub fn display(&self) -> &str {
        match self {
            VariationValue::Flag(true) => "Sí",
            VariationValue::Flag(false) => "No",
            VariationValue::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    #[serde(alias = "porcentaje")]
    Percentage,
    #[serde(alias = "fijo")]
    Fixed,
}

/// What the discount was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountScope {
    #[default]
    Total,
    #[serde(alias = "productos", alias = "items")]
    Products,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    #[serde(default)]
    pub scope: DiscountScope,
    /// Percentage (e.g. `10.0`) or fixed amount, as entered by the cashier.
    pub value: f64,
    /// Amount subtracted from the subtotal.
    pub amount: i64,
}

/// Payment method and, for mixed payments, the two-way breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub method: String,
    #[serde(default)]
    pub split: Option<SplitPayment>,
}

impl Payment {
    pub fn simple(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            split: None,
        }
    }

    /// Whether the method string names a mixed payment
    /// (`mixto`, `mixed`, or `efectivo+tarjeta` style).
    pub fn method_is_mixed(&self) -> bool {
        let method = self.method.trim().to_lowercase();
        method.starts_with("mixto") || method.starts_with("mixed") || method.contains('+')
    }

    /// The breakdown to print for a mixed payment.
    ///
    /// An explicit `split` wins. Otherwise the amounts are read from a
    /// method string such as `Mixto (Efectivo: $20.000 + Tarjeta: $10.000)`.
    pub fn mixed_breakdown(&self) -> Option<Cow<'_, SplitPayment>> {
        if let Some(split) = &self.split {
            return Some(Cow::Borrowed(split));
        }
        if !self.method_is_mixed() {
            return None;
        }
        SplitPayment::parse(&self.method).map(Cow::Owned)
    }

    pub fn is_mixed(&self) -> bool {
        self.split.is_some() || self.method_is_mixed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPayment {
    pub method1: String,
    pub amount1: i64,
    pub method2: String,
    pub amount2: i64,
}

impl SplitPayment {
    pub fn sum(&self) -> i64 {
        self.amount1.saturating_add(self.amount2)
    }

    /// Read `method: amount + method: amount`, optionally wrapped in a
    /// label and parentheses. The colon may be left out
    /// (`Efectivo $20.000 + Tarjeta $10.000`).
    pub fn parse(text: &str) -> Option<Self> {
        let body = match (text.find('('), text.rfind(')')) {
            (Some(open), Some(close)) if open < close => &text[open + 1..close],
            _ => text,
        };

        let (first, second) = body.split_once('+')?;
        let (method1, amount1) = method_and_amount(first)?;
        let (method2, amount2) = method_and_amount(second)?;
        Some(Self {
            method1,
            amount1,
            method2,
            amount2,
        })
    }
}

fn method_and_amount(part: &str) -> Option<(String, i64)> {
    let part = part.trim();
    let (method, amount) = part
        .rsplit_once(':')
        .or_else(|| part.rsplit_once(char::is_whitespace))?;
    let method = method.trim();
    if method.is_empty() {
        return None;
    }
    Some((method.to_string(), format::parse_money(amount)?))
}

/// Customer block printed under the sale header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub name: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Customer {
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.document, &self.phone, &self.address]
            .iter()
            .all(|field| field.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

/// Business details printed in the receipt header and footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantProfile {
    pub business_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub footer_message: Option<String>,
}

impl MerchantProfile {
    pub fn new(business_name: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            ..Default::default()
        }
    }
}

/// A previously paired printer, saved by the caller to skip device selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterIdentity {
    pub device_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
