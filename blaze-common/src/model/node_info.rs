pub mod response {
    use serde::{Deserialize, Serialize};

    use crate::backend::BackendNodeInfo;
    use crate::types::msat_to_sats;

    /// A fresh snapshot of the node, amounts truncated to satoshi.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct NodeInfo {
        pub id: String,
        pub max_payable_sats: u64,
        pub max_receivable_sats: u64,
        pub channels_balance_sats: u64,
    }

    impl From<BackendNodeInfo> for NodeInfo {
        fn from(info: BackendNodeInfo) -> Self {
            Self {
                id: info.id,
                max_payable_sats: msat_to_sats(info.max_payable_msat),
                max_receivable_sats: msat_to_sats(info.max_receivable_msat),
                channels_balance_sats: msat_to_sats(info.channels_balance_msat),
            }
        }
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Balance {
        pub balance_sats: u64,
    }
}
