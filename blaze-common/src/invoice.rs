//! Offline inspection of bolt11 invoices.
use std::str::FromStr;

use lightning_invoice::Bolt11Invoice;

use crate::model::response::DecodedInvoice;
use crate::types::msat_to_sats;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Invoice is required")]
    EmptyInvoice,
    #[error("Invalid invoice: {0}")]
    Malformed(String),
}

/// Decode a bolt11 string, nothing here talks to a node.
pub fn decode(bolt11: &str) -> Result<DecodedInvoice, DecodeError> {
    let bolt11 = bolt11.trim();
    if bolt11.is_empty() {
        return Err(DecodeError::EmptyInvoice);
    }
    let invoice =
        Bolt11Invoice::from_str(bolt11).map_err(|err| DecodeError::Malformed(err.to_string()))?;
    let amount_msat = invoice.amount_milli_satoshis();
    Ok(DecodedInvoice {
        payment_hash: invoice.payment_hash().to_string(),
        amount_sats: amount_msat.map(msat_to_sats),
        amount_msat,
        timestamp: invoice.duration_since_epoch().as_secs(),
        expiry_secs: invoice.expiry_time().as_secs(),
        expired: invoice.is_expired(),
        network: invoice.network().to_string(),
    })
}
