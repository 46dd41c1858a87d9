pub mod heuristic;
pub mod remote;
pub mod traits;

use crate::config::BotConfig;
use heuristic::HeuristicAdvisor;
use remote::{AiProvider, ProviderAdvisor};
use traits::Advisor;

pub fn build_advisor(cfg: &BotConfig) -> Box<dyn Advisor> {
    let heuristic = HeuristicAdvisor::new(cfg.order_budget);
    match cfg.provider {
        AiProvider::Heuristic => Box::new(heuristic),
        provider => Box::new(ProviderAdvisor::new(
            provider,
            cfg.api_key.clone(),
            heuristic,
        )),
    }
}
