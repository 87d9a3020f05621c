//! Model for the invoice stuff

pub mod request {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateInvoice {
        pub amount_sats: u64,
        #[serde(default)]
        pub description: Option<String>,
    }

    impl CreateInvoice {
        pub fn new(amount_sats: u64, description: &str) -> Self {
            Self {
                amount_sats,
                description: Some(description.to_owned()),
            }
        }
    }

    #[derive(Serialize, Deserialize, Debug, Clone)]
    pub struct DecodeInvoice {
        pub bolt11: String,
    }
}

pub mod response {
    use serde::{Deserialize, Serialize};

    use crate::backend::BackendInvoice;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Invoice {
        pub bolt11: String,
        pub payment_hash: String,
    }

    impl From<BackendInvoice> for Invoice {
        fn from(invoice: BackendInvoice) -> Self {
            Self {
                bolt11: invoice.bolt11,
                payment_hash: invoice.payment_hash,
            }
        }
    }

    /// What can be read from a bolt11 string without a node.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct DecodedInvoice {
        pub payment_hash: String,
        /// Amount truncated to satoshi, `None` for zero amount invoices.
        pub amount_sats: Option<u64>,
        pub amount_msat: Option<u64>,
        pub timestamp: u64,
        pub expiry_secs: u64,
        pub expired: bool,
        pub network: String,
    }
}
