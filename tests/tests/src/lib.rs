#[cfg(test)]
mod concurrency_tests;

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use blaze_common::error;
#[cfg(test)]
use blaze_session::NodeSession;
#[cfg(test)]
use blaze_testing::MockBackend;

#[cfg(test)]
fn init() {
    blaze_testing::init();
}

/// Build a session over a fresh mock, the `TempDir` must outlive the test.
#[cfg(test)]
fn session(
    backend: &MockBackend,
) -> error::Result<(Arc<NodeSession>, blaze_testing::TempDir)> {
    let (conf, dir) = blaze_testing::test_conf()?;
    let session = NodeSession::new(conf, Arc::new(backend.clone()));
    Ok((Arc::new(session), dir))
}
