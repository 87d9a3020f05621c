//! Connect model

pub mod request {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug)]
    pub struct Connect {
        /// Node certificate, used as-is as identity bytes.
        pub certificate: String,
    }
}

pub mod response {
    use serde::{Deserialize, Serialize};

    use crate::types::SessionState;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct Status {
        pub connected: bool,
        pub state: SessionState,
    }

    impl From<SessionState> for Status {
        fn from(state: SessionState) -> Self {
            Self {
                connected: state == SessionState::Connected,
                state,
            }
        }
    }
}
