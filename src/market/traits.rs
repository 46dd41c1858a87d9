// src/market/traits.rs
use crate::types::Quote;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> String;

    async fn fetch(&self, symbol: &str) -> Result<Quote>;
}
