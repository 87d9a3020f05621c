pub mod backend;
pub mod conf;
pub mod event;
pub mod handler;
pub mod invoice;
pub mod logger;
pub mod model;
pub mod rpc;
pub mod types;

pub mod error {
    pub use anyhow::*;
}

pub mod json {
    pub use serde::de::DeserializeOwned;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::*;

    pub mod prelude {
        pub use serde::*;
    }
}

pub mod chan {
    pub use crossbeam_channel::*;
}

pub use bitcoin;
