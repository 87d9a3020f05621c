//! Payloads exchanged with the caller.
//!
//! Field names are camelCase on the wire, the bridge layer talks to
//! a JavaScript UI.
mod connect;
mod invoice;
mod node_info;
mod pay;
mod payments;

pub mod request {
    pub use crate::model::connect::request::*;
    pub use crate::model::invoice::request::*;
    pub use crate::model::pay::request::*;
}

pub mod response {
    pub use crate::model::connect::response::*;
    pub use crate::model::invoice::response::*;
    pub use crate::model::node_info::response::*;
    pub use crate::model::pay::response::*;
    pub use crate::model::payments::response::*;
}
