use crate::types::Result;
use async_trait::async_trait;

/// Trait for durable string slots (the on-device key/value store)
#[async_trait]
pub trait SlotStorage: Send + Sync {
    /// Human-readable name for this backend
    fn backend_name(&self) -> String;

    /// Read a slot, `None` if it was never written
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}
