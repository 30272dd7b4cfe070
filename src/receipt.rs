//! # Sale Receipt Encoder
//!
//! Builds the ESC/POS stream for one sale, mirroring the on-screen receipt.
//!
//! ## Layout (32 columns)
//!
//! ```text
//!            LA AREPERA                 ← double height, bold
//!       Calle 10 # 43-12
//!         Tel: 604 555 0101
//! --------------------------------
//!         VENTA CONFIRMADA
//! Recibo: V-1042
//! Fecha: 16/10/2026 14:05
//! Cajero: Laura
//! --------------------------------
//!             DETALLE
//! --------------------------------
//! 2x Arepa de queso        $30.000
//!   Tamaño: Grande
//!   Adiciones:
//!     Queso (x1)            $2.000
//!   $13.000 + $2.000 = $15.000
//! --------------------------------
//! Subtotal:                $30.000
//! --------------------------------
//! TOTAL:                   $30.000  ← double height, bold
//! --------------------------------
//! Método de pago:         Efectivo
//!
//!     ¡Gracias por su compra!
//! ```
//!
//! The encoder does no I/O; the same sale, merchant and profile always give
//! the same bytes.

use crate::components::{
    BlankLine, Columns, ComponentExt, Divider, Header, Paragraph, Receipt, Text,
};
use crate::format;
use crate::ir::Program;
use crate::layout;
use crate::printer::PrinterProfile;
use crate::sale::{Discount, DiscountKind, DiscountScope, MerchantProfile, Payment, Sale, SaleItem};

/// Footer printed when the merchant has none.
pub const DEFAULT_FOOTER: &str = "¡Gracias por su compra!";

/// Indent for item detail lines.
const DETAIL_INDENT: usize = 2;

/// Indent for topping rows under the "Adiciones" heading.
const TOPPING_INDENT: usize = 4;

/// Final byte stream for one print job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedStream {
    bytes: Vec<u8>,
}

impl EncodedStream {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Program> for EncodedStream {
    fn from(program: Program) -> Self {
        Self {
            bytes: program.to_bytes(),
        }
    }
}

impl AsRef<[u8]> for EncodedStream {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Optimized IR for a sale receipt.
pub fn receipt_program(sale: &Sale, merchant: &MerchantProfile, profile: &PrinterProfile) -> Program {
    SaleReceipt::new(sale, merchant, profile)
        .component()
        .compile()
        .optimize()
}

/// Encode a sale receipt to ESC/POS bytes.
///
/// ```
/// use recibo::printer::PrinterProfile;
/// use recibo::receipt::encode_receipt;
/// use recibo::sale::{MerchantProfile, Payment, Sale, SaleItem};
///
/// let sale = Sale {
///     id: "V-1".into(),
///     timestamp: "2026-10-16T19:05:00Z".parse().unwrap(),
///     cashier: "Laura".into(),
///     items: vec![SaleItem {
///         name: "Arepa".into(),
///         code: None,
///         quantity: 2,
///         unit_price: 15000,
///         total: None,
///         toppings: vec![],
///         variations: Default::default(),
///     }],
///     payment: Payment::simple("efectivo"),
///     change: 0,
///     discount: None,
///     subtotal: 30000,
///     total: 30000,
///     order_ref: None,
///     customer: None,
/// };
///
/// let stream = encode_receipt(&sale, &MerchantProfile::new("LA AREPERA"), &PrinterProfile::default());
/// assert!(stream.as_bytes().ends_with(&[0x1D, 0x56, 0x00]));
/// ```
pub fn encode_receipt(sale: &Sale, merchant: &MerchantProfile, profile: &PrinterProfile) -> EncodedStream {
    receipt_program(sale, merchant, profile).into()
}

/// Plain-text lines of the receipt, as the printer would lay them out.
pub fn preview_lines(sale: &Sale, merchant: &MerchantProfile, profile: &PrinterProfile) -> Vec<String> {
    receipt_program(sale, merchant, profile).to_plain_text(profile.columns)
}

/// Short fixed ticket for checking that a printer is paired and printing.
pub fn test_page_program(profile: &PrinterProfile) -> Program {
    let w = profile.columns;
    Receipt::new()
        .codepage(profile.codepage)
        .child(Header::new("PRUEBA DE IMPRESIÓN", w))
        .child(Divider::dashed().width(w))
        .child(Paragraph::new(format!("Perfil: {}", profile.name)).width(w))
        .child(Paragraph::new(format!("Columnas: {}", w)).width(w))
        .child(Paragraph::new("áéíóú ñ ¿? ¡!").width(w))
        .child(Columns::new("Importe:", format::money(1_234_567, &profile.currency_symbol)).width(w))
        .child(Divider::equals().width(w))
        .child(Text::new("OK").center().bold())
        .feed(profile.feed_lines)
        .cut()
        .compile()
        .optimize()
}

pub fn test_page(profile: &PrinterProfile) -> EncodedStream {
    test_page_program(profile).into()
}

// ============================================================================
// SECTIONS
// ============================================================================

struct SaleReceipt<'a> {
    sale: &'a Sale,
    merchant: &'a MerchantProfile,
    profile: &'a PrinterProfile,
    width: usize,
}

impl<'a> SaleReceipt<'a> {
    fn new(sale: &'a Sale, merchant: &'a MerchantProfile, profile: &'a PrinterProfile) -> Self {
        Self {
            sale,
            merchant,
            profile,
            width: profile.columns,
        }
    }

    fn money(&self, amount: i64) -> String {
        format::money(amount, &self.profile.currency_symbol)
    }

    fn divider(&self) -> Divider {
        Divider::dashed().width(self.width)
    }

    fn row(&self, left: impl Into<String>, right: impl Into<String>) -> Columns {
        Columns::new(left, right).width(self.width)
    }

    fn para(&self, content: impl Into<String>) -> Paragraph {
        Paragraph::new(content).width(self.width).left()
    }

    fn component(&self) -> Receipt {
        let mut receipt = Receipt::new().codepage(self.profile.codepage);
        self.header(&mut receipt);
        self.sale_info(&mut receipt);
        for item in &self.sale.items {
            self.item(&mut receipt, item);
        }
        self.totals(&mut receipt);
        self.payment(&mut receipt, &self.sale.payment);
        self.footer(&mut receipt);
        receipt.feed(self.profile.feed_lines).cut()
    }

    fn header(&self, receipt: &mut Receipt) {
        let m = self.merchant;
        receipt.push(Header::new(&m.business_name, self.width));

        let lines = [
            m.address.clone(),
            m.city.clone(),
            m.phone.as_ref().map(|p| format!("Tel: {}", p)),
            m.email.clone(),
            m.tax_id.as_ref().map(|t| format!("NIT: {}", t)),
        ];
        for line in lines.into_iter().flatten().filter(|l| !l.trim().is_empty()) {
            receipt.push(self.para(line).center());
        }
    }

    fn sale_info(&self, receipt: &mut Receipt) {
        let sale = self.sale;
        receipt.push(self.divider());
        receipt.push(Text::new("VENTA CONFIRMADA").center().bold());

        let mut lines = vec![
            format!("Recibo: {}", sale.id),
            format!(
                "Fecha: {}",
                format::timestamp(&sale.timestamp, self.profile.utc_offset())
            ),
            format!("Cajero: {}", sale.cashier),
        ];
        if let Some(order) = sale.order_ref.as_deref().filter(|o| !o.trim().is_empty()) {
            lines.push(format!("Pedido: {}", order));
        }
        if let Some(customer) = sale.customer.as_ref().filter(|c| !c.is_empty()) {
            let fields = [
                ("Cliente", &customer.name),
                ("Doc", &customer.document),
                ("Tel", &customer.phone),
                ("Dir", &customer.address),
            ];
            for (label, value) in fields {
                if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                    lines.push(format!("{}: {}", label, v));
                }
            }
        }

        for line in lines {
            receipt.push(self.para(line));
        }

        receipt.push(self.divider());
        receipt.push(Text::new("DETALLE").center().bold());
        receipt.push(self.divider());
    }

    fn item(&self, receipt: &mut Receipt, item: &SaleItem) {
        let prefix = format!("{}x ", item.quantity);
        let total = self.money(item.line_total());

        // Room left for the name on the first row, keeping one space before the price
        let name_width = self
            .width
            .saturating_sub(prefix.chars().count() + total.chars().count() + 1)
            .max(1);
        let name_lines = layout::wrap(&item.name, name_width);
        let (first, rest) = name_lines.split_first().map_or(("", &[][..]), |(f, r)| (f.as_str(), r));

        receipt.push(self.row(format!("{}{}", prefix, first), total));
        for line in rest {
            receipt.push(self.para(line.as_str()).indent(prefix.chars().count()));
        }

        if let Some(code) = item.code.as_deref().filter(|c| !c.trim().is_empty()) {
            receipt.push(self.para(format!("Cód: {}", code)).indent(DETAIL_INDENT));
        }

        for (name, value) in &item.variations {
            receipt.push(
                self.para(format!("{}: {}", name, value.display()))
                    .indent(DETAIL_INDENT),
            );
        }

        if !item.toppings.is_empty() {
            receipt.push(self.para("Adiciones:").indent(DETAIL_INDENT));
            for topping in &item.toppings {
                receipt.push(
                    self.row(
                        format!("{} (x{})", topping.name, topping.quantity),
                        self.money(topping.line_price()),
                    )
                    .indent(TOPPING_INDENT),
                );
            }
            receipt.push(
                self.para(format!(
                    "{} + {} = {}",
                    self.money(item.unit_price),
                    self.money(item.toppings_per_unit()),
                    self.money(item.unit_price_with_toppings())
                ))
                .indent(DETAIL_INDENT),
            );
        }

        receipt.push(self.divider());
    }

    fn totals(&self, receipt: &mut Receipt) {
        let sale = self.sale;
        receipt.push(self.row("Subtotal:", self.money(sale.subtotal)));

        if let Some(discount) = sale.discount.as_ref().filter(|d| d.amount > 0) {
            receipt.push(self.row(discount_label(discount), self.money(-discount.amount)));
        }

        receipt.push(self.divider());
        receipt.push(
            self.row("TOTAL:", self.money(sale.total))
                .bold()
                .double_height(),
        );
        receipt.push(self.divider());
    }

    fn payment(&self, receipt: &mut Receipt, payment: &Payment) {
        let method = if payment.is_mixed() {
            "Mixto".to_string()
        } else {
            capitalize(payment.method.trim())
        };
        receipt.push(self.row("Método de pago:", method));

        if let Some(split) = payment.mixed_breakdown() {
            for (method, amount) in [(&split.method1, split.amount1), (&split.method2, split.amount2)] {
                receipt.push(
                    self.row(format!("{}:", capitalize(method.trim())), self.money(amount))
                        .indent(DETAIL_INDENT),
                );
            }
        }

        if self.sale.change > 0 {
            receipt.push(self.row("Cambio:", self.money(self.sale.change)));
        }
    }

    fn footer(&self, receipt: &mut Receipt) {
        receipt.push(BlankLine);
        let message = self
            .merchant
            .footer_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_FOOTER);
        for line in message.lines().filter(|l| !l.trim().is_empty()) {
            receipt.push(self.para(line).center());
        }
    }
}

/// `Desc. 10% (total):`, `Desc. fijo (productos):`
fn discount_label(discount: &Discount) -> String {
    let kind = match discount.kind {
        DiscountKind::Percentage => format!("{}%", format::percent(discount.value)),
        DiscountKind::Fixed => "fijo".to_string(),
    };
    let scope = match discount.scope {
        DiscountScope::Total => "total",
        DiscountScope::Products => "productos",
    };
    format!("Desc. {} ({}):", kind, scope)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
