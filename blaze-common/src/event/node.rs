use serde::{Deserialize, Serialize};

use crate::json;

/// Events produced by the backend node while a session is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeEvent {
    NewBlock {
        height: u32,
    },
    Synced,
    #[serde(rename_all = "camelCase")]
    InvoicePaid {
        payment_hash: String,
        bolt11: String,
    },
    #[serde(rename_all = "camelCase")]
    PaymentSucceeded {
        payment_hash: String,
    },
    PaymentFailed {
        bolt11: Option<String>,
        error: String,
    },
    /// Any other backend notification, forwarded untouched.
    Other {
        kind: String,
        payload: json::Value,
    },
}
