//! # Print Session
//!
//! One print job end to end: validate, negotiate, encode, send.
//!
//! ```text
//! print_receipt ─► negotiate ─► encode_receipt ─► send ─► PrintOutcome
//!                     │                            │
//!                     └──────── PrintError ◄───────┘
//! ```
//!
//! A session owns no connection between calls. Each `print_*` call
//! negotiates a fresh one and leaves it open when it returns successfully;
//! callers that drive the steps themselves use [`PrintSession::connect`],
//! [`PrintSession::send`] and [`PrintSession::disconnect`].
//!
//! ```no_run
//! # async fn run() -> Result<(), recibo::error::PrintError> {
//! use recibo::printer::PrinterProfile;
//! use recibo::session::PrintSession;
//! use recibo::transport::mock::MockHost;
//! # let sale: recibo::sale::Sale = todo!();
//! # let merchant: recibo::sale::MerchantProfile = todo!();
//!
//! let session = PrintSession::new(MockHost::new(), PrinterProfile::default());
//! let outcome = session.print_receipt(&sale, &merchant, None).await?;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::PrintError;
use crate::printer::PrinterProfile;
use crate::receipt::{self, EncodedStream};
use crate::sale::{MerchantProfile, PrinterIdentity, Sale};
use crate::transport::{self, BleHost, GattDevice, NegotiatedConnection, SendReport};

/// Result of a successful print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintOutcome {
    /// Message for the cashier
    pub message: String,
    pub report: SendReport,
}

/// Prints receipts through a Bluetooth host.
pub struct PrintSession<H> {
    host: H,
    profile: PrinterProfile,
}

impl<H: BleHost> PrintSession<H> {
    pub fn new(host: H, profile: PrinterProfile) -> Self {
        Self { host, profile }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn profile(&self) -> &PrinterProfile {
        &self.profile
    }

    /// Print one sale receipt.
    #[instrument(skip_all, fields(sale_id = %sale.id, items = sale.items.len()))]
    pub async fn print_receipt(
        &self,
        sale: &Sale,
        merchant: &MerchantProfile,
        saved: Option<&PrinterIdentity>,
    ) -> Result<PrintOutcome, PrintError> {
        validate(sale, merchant)?;

        let mut conn = self.connect(saved).await?;
        let stream = receipt::encode_receipt(sale, merchant, &self.profile);
        info!(bytes = stream.len(), "Encoded receipt");

        let report = self.send(&mut conn, &stream).await?;
        Ok(PrintOutcome {
            message: "Recibo impreso correctamente".to_string(),
            report,
        })
    }

    /// Print the fixed test ticket.
    #[instrument(skip_all)]
    pub async fn print_test_page(
        &self,
        saved: Option<&PrinterIdentity>,
    ) -> Result<PrintOutcome, PrintError> {
        let mut conn = self.connect(saved).await?;
        let stream = receipt::test_page(&self.profile);
        let report = self.send(&mut conn, &stream).await?;
        Ok(PrintOutcome {
            message: "Página de prueba impresa".to_string(),
            report,
        })
    }

    /// Select and connect a printer.
    pub async fn connect(
        &self,
        saved: Option<&PrinterIdentity>,
    ) -> Result<NegotiatedConnection<H::Device>, PrintError> {
        transport::negotiate(&self.host, &self.profile, saved).await
    }

    /// Send an already encoded stream.
    pub async fn send(
        &self,
        conn: &mut NegotiatedConnection<H::Device>,
        stream: &EncodedStream,
    ) -> Result<SendReport, PrintError> {
        let result = transport::send(conn, stream.as_bytes(), &self.profile).await;
        if let Err(e) = &result {
            warn!(kind = ?e.kind(), partial = e.is_partial(), error = %e, "Print failed");
        }
        result
    }

    /// Close a connection. Failures are logged, never returned: the receipt
    /// is already on paper at this point.
    pub async fn disconnect(&self, conn: NegotiatedConnection<H::Device>) {
        let id = conn.device().id();
        if let Err(e) = conn.disconnect().await {
            warn!(device_id = %id, error = %e, "Disconnect failed");
        }
    }
}

/// Reject requests the encoder cannot render meaningfully.
pub fn validate(sale: &Sale, merchant: &MerchantProfile) -> Result<(), PrintError> {
    if merchant.business_name.trim().is_empty() {
        return Err(PrintError::InvalidInput(
            "merchant profile has no business name".to_string(),
        ));
    }
    if sale.items.is_empty() {
        return Err(PrintError::InvalidInput(format!("sale {} has no items", sale.id)));
    }
    if let Some(item) = sale.items.iter().find(|item| item.quantity == 0) {
        return Err(PrintError::InvalidInput(format!(
            "item {:?} of sale {} has quantity 0",
            item.name, sale.id
        )));
    }
    if let Err(reason) = sale.check_totals() {
        // Printed as given; the amounts come from the point of sale
        warn!(sale_id = %sale.id, %reason, "Sale totals are inconsistent");
    }
    Ok(())
}
