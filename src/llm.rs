//! Natural-language query adapter: formats the club data into a prompt and
//! forwards free-text questions to a hosted language model.
//!
//! Boundary-only: any transport or parse failure becomes an error the web
//! layer shows as a message; club state is never touched from here.

use crate::logic;
use crate::models::Club;
use crate::storage::QaEntry;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How many prior question/answer pairs to send for context.
pub const CONTEXT_QA_LIMIT: usize = 5;

/// Query adapter errors (all user-visible as plain messages).
#[derive(Debug)]
pub enum LlmError {
    /// `LLM_API_KEY` is not configured.
    NotConfigured,
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status(reqwest::StatusCode),
    /// The response body did not contain an answer.
    BadResponse,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::NotConfigured => write!(f, "Assistant is not configured on this server"),
            LlmError::Http(e) => write!(f, "Assistant request failed: {}", e),
            LlmError::Status(code) => write!(f, "Assistant service returned {}", code),
            LlmError::BadResponse => write!(f, "Assistant returned an unreadable response"),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for a hosted chat-completion endpoint.
#[derive(Clone, Debug)]
pub struct QueryAdapter {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl QueryAdapter {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_url,
            api_key,
            model,
        }
    }

    /// Adapter from `LLM_API_URL` / `LLM_API_KEY` / `LLM_MODEL` env vars.
    /// None when no API key is set (the rest of the app works without it).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty())?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(api_url, api_key, model))
    }

    /// Answer a free-text question about the club data. `recent` carries up
    /// to the last five prior Q&A pairs for conversational context.
    pub async fn ask(
        &self,
        snapshot: &str,
        question: &str,
        recent: &[QaEntry],
    ) -> Result<String, LlmError> {
        let mut messages = vec![json!({
            "role": "system",
            "content": format!(
                "You answer questions about a recreational badminton group. \
                 Use only the data below; say so when the data cannot answer.\n\n{}",
                snapshot
            ),
        })];
        for qa in recent.iter().rev().take(CONTEXT_QA_LIMIT).rev() {
            messages.push(json!({ "role": "user", "content": qa.question }));
            messages.push(json!({ "role": "assistant", "content": qa.answer }));
        }
        messages.push(json!({ "role": "user", "content": question }));

        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "messages": messages }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(LlmError::Status(resp.status()));
        }
        let body: ChatResponse = resp.json().await.map_err(|_| LlmError::BadResponse)?;
        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(LlmError::BadResponse)?;
        if answer.trim().is_empty() {
            return Err(LlmError::BadResponse);
        }
        Ok(answer)
    }
}

/// Serialize the current club data as structured text for the prompt:
/// roster with stats, the match ledger, and rotation history.
pub fn snapshot_text(club: &Club) -> String {
    let mut out = String::new();

    out.push_str("PLAYERS (name, skill, games, wins, points):\n");
    for p in club.all_players() {
        out.push_str(&format!(
            "- {} | skill {} | games {} | wins {} | points {}\n",
            p.name, p.skill_level, p.games_played, p.wins, p.points_scored
        ));
    }

    out.push_str("\nMATCHES (oldest first):\n");
    if club.match_history.is_empty() {
        out.push_str("- none recorded\n");
    }
    for m in &club.match_history {
        let names = |ids: &[crate::models::PlayerId]| -> String {
            ids.iter()
                .filter_map(|&id| club.player_name(id))
                .collect::<Vec<_>>()
                .join(" & ")
        };
        out.push_str(&format!(
            "- {} | {} vs {} | {}-{} | winner {:?} | notes: {}\n",
            m.timestamp,
            names(&m.team_a),
            names(&m.team_b),
            m.score_a,
            m.score_b,
            m.winning_team,
            if m.notes.is_empty() { "-" } else { &m.notes }
        ));
    }

    out.push_str("\nROTATION (sat out, consecutive plays):\n");
    for (id, rec) in &club.rotation_history {
        if let Some(name) = club.player_name(*id) {
            out.push_str(&format!(
                "- {} | sat out {} | consecutive {}\n",
                name, rec.sat_out_count, rec.consecutive_plays
            ));
        }
    }

    out.push_str("\nTEAM COMBINATIONS:\n");
    for row in logic::team_combinations(club) {
        out.push_str(&format!(
            "- {} | matches {} | wins {} | win rate {}%\n",
            row.team, row.matches, row.wins, row.win_rate
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lists_roster_and_empty_ledger() {
        let club = Club::new();
        let text = snapshot_text(&club);
        assert!(text.contains("Saurabh"));
        assert!(text.contains("none recorded"));
    }
}
