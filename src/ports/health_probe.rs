//! HealthProbe port - Reachability of the backing store.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), DomainError>;
}
