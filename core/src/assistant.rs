//! Growth assistant: topic guardrail, prompt context, and graceful
//! degradation around an external text generator.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::GoalSummary;
use crate::remote::RemoteError;
use crate::store::{KeyValueStore, read_json_or_default, to_json};

pub const KEY_RECENT_TOPICS: &str = "assistant-recent-topics";
pub const RECENT_TOPIC_LIMIT: usize = 5;

const INSTRUCTIONS: &str = "You are an encouraging growth coach inside a daily habit tracker. \
The user tracks calories, meals, and personal goals. Answer questions about habits, \
productivity, goal setting, time management, mindset, workouts, yoga, running, and \
nutrition. Keep answers short, practical, and friendly.";

const REDIRECT_REPLY: &str = "I can help with habits, productivity, goals, fitness, and \
nutrition. Try asking something in one of those areas!";
const BLOCKED_REPLY: &str = "That's not something I can help with. Let's keep the focus on \
your growth: habits, goals, fitness, or nutrition.";
const RATE_LIMITED_REPLY: &str =
    "I'm getting a lot of questions right now. Please try again in a minute.";
const FALLBACK_REPLY: &str =
    "Sorry, I ran into a problem answering that. Please try asking again!";
const NOT_CONFIGURED_REPLY: &str =
    "The assistant isn't configured yet. Set an API key to start chatting.";

#[derive(Debug, Default, Deserialize)]
struct Lexicon {
    allow: Vec<String>,
    deny: Vec<String>,
}

fn lexicon() -> &'static Lexicon {
    static LEXICON: OnceLock<Lexicon> = OnceLock::new();
    LEXICON.get_or_init(|| {
        serde_json::from_str(include_str!("lexicon.json")).unwrap_or_else(|err| {
            tracing::error!(%err, "topic lexicon failed to parse");
            Lexicon::default()
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicVerdict {
    OnTopic,
    OffTopic,
    Blocked,
}

/// Lowercase words separated by single spaces, padded so that phrases can be
/// matched on word boundaries.
fn normalize(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!(" {} ", words.join(" "))
}

fn mentions(haystack: &str, term: &str) -> bool {
    haystack.contains(&format!(" {term} "))
}

#[must_use]
pub fn classify(prompt: &str) -> TopicVerdict {
    let text = normalize(prompt);
    let lex = lexicon();
    if lex.deny.iter().any(|t| mentions(&text, t)) {
        TopicVerdict::Blocked
    } else if lex.allow.iter().any(|t| mentions(&text, t)) {
        TopicVerdict::OnTopic
    } else {
        TopicVerdict::OffTopic
    }
}

/// Snapshot of the user's progress handed to the generator.
#[derive(Debug, Clone, Default)]
pub struct AssistantContext {
    pub goals: Option<GoalSummary>,
    pub calories: Option<(u64, u32)>,
}

#[must_use]
pub fn build_prompt(question: &str, context: &AssistantContext, recent: &[String]) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push_str("\n\n");

    if let Some(goals) = &context.goals {
        prompt.push_str(&format!(
            "Goals: {} of {} completed ({}%).\n",
            goals.completed, goals.total, goals.completion_rate
        ));
    }
    if let Some((consumed, goal)) = context.calories {
        prompt.push_str(&format!("Calories today: {consumed} of {goal} kcal.\n"));
    }
    if !recent.is_empty() {
        prompt.push_str("Recently asked:\n");
        for topic in recent {
            prompt.push_str(&format!("- {topic}\n"));
        }
    }

    prompt.push_str(&format!("\nUser question: {question}"));
    prompt
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, RemoteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Answer,
    Redirect,
    RateLimited,
    Fallback,
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    fn canned(kind: ReplyKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

pub struct Assistant<S> {
    store: S,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl<S: KeyValueStore> Assistant<S> {
    pub fn new(store: S, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { store, generator }
    }

    pub fn recent_topics(&self) -> Result<Vec<String>> {
        read_json_or_default(&self.store, KEY_RECENT_TOPICS)
    }

    fn remember(&self, question: &str) -> Result<()> {
        let mut recent = self.recent_topics()?;
        recent.push(question.to_string());
        if recent.len() > RECENT_TOPIC_LIMIT {
            let excess = recent.len() - RECENT_TOPIC_LIMIT;
            recent.drain(..excess);
        }
        self.store
            .set(KEY_RECENT_TOPICS, &to_json(KEY_RECENT_TOPICS, &recent)?)
    }

    /// Answer a question. Generator failures never surface as errors; they
    /// become canned replies. Only an empty question is rejected.
    pub async fn ask(&self, question: &str, context: &AssistantContext) -> Result<Reply> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::validation("question", "please enter a question"));
        }

        match classify(question) {
            TopicVerdict::Blocked => return Ok(Reply::canned(ReplyKind::Redirect, BLOCKED_REPLY)),
            TopicVerdict::OffTopic => {
                return Ok(Reply::canned(ReplyKind::Redirect, REDIRECT_REPLY));
            }
            TopicVerdict::OnTopic => {}
        }

        let Some(generator) = &self.generator else {
            return Ok(Reply::canned(ReplyKind::NotConfigured, NOT_CONFIGURED_REPLY));
        };

        let prompt = build_prompt(question, context, &self.recent_topics()?);
        let reply = match generator.generate(&prompt).await {
            Ok(text) => Reply {
                kind: ReplyKind::Answer,
                text,
            },
            Err(RemoteError::RateLimited) => {
                tracing::warn!("assistant rate limited");
                Reply::canned(ReplyKind::RateLimited, RATE_LIMITED_REPLY)
            }
            Err(err) => {
                tracing::warn!(error = %err, "assistant request failed");
                Reply::canned(ReplyKind::Fallback, FALLBACK_REPLY)
            }
        };
        self.remember(question)?;
        Ok(reply)
    }
}
