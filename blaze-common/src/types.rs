//! Blaze common types.
use serde::{Deserialize, Serialize};

/// Number of millisatoshi in one satoshi.
pub const MSAT_PER_SAT: u64 = 1000;

/// Scale an amount in satoshi up to millisatoshi.
///
/// The conversion is exact, `None` is returned only when the
/// result does not fit inside a `u64`.
pub fn sats_to_msat(amount_sats: u64) -> Option<u64> {
    amount_sats.checked_mul(MSAT_PER_SAT)
}

/// Convert an amount in millisatoshi down to satoshi.
///
/// This is a lossy conversion: the sub-satoshi part is truncated,
/// so `1500` msat become `1` sat. Callers must not expect to get
/// back the original amount of an invoice that is not a multiple
/// of 1000 msat.
pub fn msat_to_sats(amount_msat: u64) -> u64 {
    amount_msat / MSAT_PER_SAT
}

/// The connection state of a node session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Disconnected,
    Connected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Sent,
    Received,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Complete,
    Failed,
}
