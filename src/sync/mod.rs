pub mod mpsc;

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::time::Instant;


#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveTimeoutError {
    #[error("timed out waiting for message")]
    Timeout,
    #[error("channel closed")]
    Closed,
}

/// Channel receivers that can timeout when receiving messages
pub trait TimeoutReceiver<T> {
    fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<T, ReceiveTimeoutError>> + Send;

    /// Wait for a message until the given deadline. Without a deadline this
    /// waits until a message arrives or the channel closes.
    fn recv_until(
        &mut self,
        deadline: Option<Instant>,
    ) -> impl Future<Output = Result<T, ReceiveTimeoutError>> + Send;
}
