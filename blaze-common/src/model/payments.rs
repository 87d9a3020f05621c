pub mod response {
    use serde::{Deserialize, Serialize};

    use crate::backend::BackendPaymentRecord;
    use crate::types::{msat_to_sats, PaymentStatus, PaymentType};

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Payment {
        pub id: String,
        pub payment_type: PaymentType,
        pub payment_time: i64,
        pub amount_sats: u64,
        pub fee_sats: u64,
        pub status: PaymentStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub bolt11: Option<String>,
    }

    impl From<BackendPaymentRecord> for Payment {
        fn from(record: BackendPaymentRecord) -> Self {
            Self {
                id: record.id,
                payment_type: record.payment_type,
                payment_time: record.payment_time,
                amount_sats: msat_to_sats(record.amount_msat),
                fee_sats: msat_to_sats(record.fee_msat),
                status: record.status,
                description: record.description,
                bolt11: record.bolt11,
            }
        }
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct Payments {
        pub payments: Vec<Payment>,
    }
}
