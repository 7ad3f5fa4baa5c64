// McNotify - platform/discord.rs
//
// Discord REST delivery. Posts each notification as a plain message to one
// channel using a bot token:
//
//   readiness: GET  {api}/channels/{id}           (channel must be visible)
//   send:      POST {api}/channels/{id}/messages  {"content": "..."}
//
// The HTTP client carries its own request timeout; the delivery loop adds
// none. Non-2xx answers become `DeliveryError::Rejected` with a shortened
// body so the log line stays readable. The token is never logged.
//
// The token comes from the environment, optionally seeded from a `.env`
// file next to the server (see `load_token`).

use crate::app::delivery::NotificationSink;
use crate::util::constants::{
    DISCORD_API_BASE, DISCORD_HTTP_TIMEOUT_SECS, DISCORD_USER_AGENT, MAX_ERROR_BODY_CHARS,
};
use crate::util::error::DeliveryError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::path::Path;
use std::time::Duration;

/// Read the bot token from the environment variable `var`, after loading
/// `dotenv_file` if it exists.
///
/// Variables already set in the environment are not overridden by the
/// file. A blank value counts as missing.
pub fn load_token(dotenv_file: &Path, var: &str) -> Option<String> {
    match dotenvy::from_path(dotenv_file) {
        Ok(()) => tracing::debug!(path = %dotenv_file.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(
            path = %dotenv_file.display(),
            error = %e,
            "Cannot load .env file"
        ),
    }

    std::env::var(var)
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Sends notifications to a Discord channel through the REST API.
pub struct DiscordSink {
    client: reqwest::Client,
    api_base: String,
    channel_id: u64,
}

impl DiscordSink {
    /// Build a sink for `channel_id` authenticated with the bot `token`.
    pub fn new(token: &str, channel_id: u64) -> Result<Self, DeliveryError> {
        Self::with_api_base(token, channel_id, DISCORD_API_BASE)
    }

    /// Same as `new`, against a different API base URL.
    pub fn with_api_base(
        token: &str,
        channel_id: u64,
        api_base: &str,
    ) -> Result<Self, DeliveryError> {
        let mut auth = HeaderValue::from_str(&format!("Bot {}", token.trim())).map_err(|_| {
            DeliveryError::Sink {
                reason: "bot token contains characters that are not valid in an HTTP header"
                    .to_string(),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent(DISCORD_USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(DISCORD_HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            channel_id,
        })
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    fn channel_url(&self) -> String {
        format!("{}/channels/{}", self.api_base, self.channel_id)
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.channel_url())
    }
}

impl NotificationSink for DiscordSink {
    async fn ready(&mut self) -> Result<(), DeliveryError> {
        let response = self.client.get(self.channel_url()).send().await?;
        check_status(response).await?;
        tracing::info!(channel_id = self.channel_id, "Discord channel reachable");
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.messages_url())
            .json(&serde_json::json!({ "content": text }))
            .send()
            .await?;
        check_status(response).await
    }
}

/// Map a non-success response to `DeliveryError::Rejected`.
async fn check_status(response: reqwest::Response) -> Result<(), DeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(DeliveryError::Rejected {
        status: status.as_u16(),
        body: shorten(&body, MAX_ERROR_BODY_CHARS),
    })
}

fn shorten(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let sink = DiscordSink::with_api_base("token", 42, "http://localhost:9/api/").unwrap();
        assert_eq!(sink.channel_url(), "http://localhost:9/api/channels/42");
        assert_eq!(sink.messages_url(), "http://localhost:9/api/channels/42/messages");
        assert_eq!(sink.channel_id(), 42);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let err = DiscordSink::new("bad\ntoken", 1).err().expect("newline is not a valid header");
        assert!(matches!(err, DeliveryError::Sink { .. }));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("abcdef", 3), "abc...");
        assert_eq!(shorten("abc", 3), "abc");
        assert_eq!(shorten("ñññ", 2), "ññ...");
    }

    /// A token written only to the .env file is picked up.
    #[test]
    fn test_load_token_from_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "MCNOTIFY_DOTENV_TEST_TOKEN=abc.def.ghi\n").unwrap();

        assert_eq!(
            load_token(&env_file, "MCNOTIFY_DOTENV_TEST_TOKEN").as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_load_token_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load_token(&dir.path().join(".env"), "MCNOTIFY_UNSET_TEST_TOKEN"),
            None
        );
    }

    /// An unreachable API surfaces as an HTTP error, not a panic.
    #[tokio::test]
    async fn test_send_to_unreachable_api_is_error() {
        let mut sink = DiscordSink::with_api_base("token", 1, "http://127.0.0.1:9").unwrap();
        let err = sink.send("hello").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Http { .. }), "got {err:?}");
    }
}
