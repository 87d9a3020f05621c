pub mod request {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone)]
    pub struct PayInvoice {
        pub bolt11: String,
    }
}

pub mod response {
    use serde::{Deserialize, Serialize};

    use crate::backend::BackendPayment;
    use crate::types::msat_to_sats;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct PayResult {
        pub payment_hash: String,
        /// Amount paid, truncated from msat. It does not round-trip
        /// with the invoice amount when that is not a multiple of 1000 msat.
        pub amount_sats: u64,
    }

    impl From<BackendPayment> for PayResult {
        fn from(payment: BackendPayment) -> Self {
            Self {
                payment_hash: payment.payment_id,
                amount_sats: msat_to_sats(payment.amount_msat),
            }
        }
    }
}
