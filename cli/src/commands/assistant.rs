use std::sync::Arc;

use anyhow::Result;

use sprout_core::assistant::{Assistant, AssistantContext, ReplyKind, TextGenerator};
use sprout_core::entries::EntryStore;
use sprout_core::goals::GoalTracker;

use super::open_store;
use crate::config::Config;
use crate::gemini::GeminiClient;

pub(crate) async fn cmd_ask(config: &Config, question: &str, json: bool) -> Result<()> {
    let context = AssistantContext {
        goals: Some(GoalTracker::new(open_store(config)?).summary()?),
        calories: {
            let summary = EntryStore::new(open_store(config)?).summary()?;
            Some((summary.consumed, summary.daily_goal))
        },
    };

    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(key)?)),
        None => None,
    };
    let assistant = Assistant::new(open_store(config)?, generator);
    let reply = assistant.ask(question, &context).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!("{}", reply.text);
        if reply.kind == ReplyKind::NotConfigured {
            eprintln!("Set SPROUT_GEMINI_API_KEY to enable the assistant.");
        }
    }
    Ok(())
}
