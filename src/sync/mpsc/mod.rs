use std::time::Duration;

use tokio::{
    sync::mpsc::Receiver,
    time::{timeout, timeout_at, Instant},
};

use super::{ReceiveTimeoutError, TimeoutReceiver};

impl<T> TimeoutReceiver<T> for Receiver<T>
where
    T: Send + Sync,
{
    async fn recv_timeout(&mut self, duration: Duration) -> Result<T, ReceiveTimeoutError> {
        let result = timeout(duration, self.recv()).await;
        match result {
            Ok(value) => value.ok_or(ReceiveTimeoutError::Closed),
            Err(_) => Err(ReceiveTimeoutError::Timeout),
        }
    }

    async fn recv_until(&mut self, deadline: Option<Instant>) -> Result<T, ReceiveTimeoutError> {
        let Some(deadline) = deadline else {
            return self.recv().await.ok_or(ReceiveTimeoutError::Closed);
        };
        match timeout_at(deadline, self.recv()).await {
            Ok(value) => value.ok_or(ReceiveTimeoutError::Closed),
            Err(_) => Err(ReceiveTimeoutError::Timeout),
        }
    }
}
