// src/strategies/traits.rs
use crate::types::{Quote, Recommendation};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[async_trait]
pub trait Advisor: Send + Sync {
    fn name(&self) -> String;

    // Suggest the next automated trade given the market and what is held
    async fn analyze(
        &self,
        quotes: &[Quote],
        positions: &BTreeMap<String, u64>,
    ) -> Result<Recommendation>;
}
