use crate::strategies::heuristic::HeuristicAdvisor;
use crate::strategies::traits::Advisor;
use crate::types::{Quote, Recommendation};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Heuristic,
    OpenAi,
    Anthropic,
    Gemini,
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiProvider::Heuristic => "heuristic",
            AiProvider::OpenAi => "openai",
            AiProvider::Anthropic => "anthropic",
            AiProvider::Gemini => "gemini",
        };
        f.write_str(name)
    }
}

/// Advisor slot for a hosted model provider.
///
/// No provider integration ships with the desk, so analysis is always served
/// by the wrapped heuristic and tagged with the provider it stood in for.
pub struct ProviderAdvisor {
    provider: AiProvider,
    fallback: HeuristicAdvisor,
}

impl ProviderAdvisor {
    pub fn new(provider: AiProvider, api_key: Option<String>, fallback: HeuristicAdvisor) -> Self {
        match api_key.as_deref().map(str::trim) {
            None | Some("") => warn!(
                "{} selected without an API key; falling back to heuristic analysis",
                provider
            ),
            Some(_) => warn!(
                "{} integration is not available; falling back to heuristic analysis",
                provider
            ),
        }
        Self { provider, fallback }
    }
}

#[async_trait]
impl Advisor for ProviderAdvisor {
    fn name(&self) -> String {
        self.provider.to_string()
    }

    async fn analyze(
        &self,
        quotes: &[Quote],
        positions: &BTreeMap<String, u64>,
    ) -> Result<Recommendation> {
        debug!("{}: serving analysis from heuristic fallback", self.provider);
        let mut rec = self.fallback.recommend(quotes, positions);
        rec.provider = format!("{} (heuristic fallback)", self.provider);
        Ok(rec)
    }
}
