use clap::Parser;
use std::time::Duration;

use crate::llm::{ LlmConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// API Key for the Gemini generation endpoint
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gemini-1.5-flash-latest)
    #[arg(long, env = "CHAT_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub chat_model: String,

    /// Base URL of the generation API, without the model route
    #[arg(long, env = "CHAT_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub chat_base_url: String,

    /// Timeout in seconds for one generation call. 0 disables the timeout.
    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "60")]
    pub chat_timeout_secs: u64,

    // --- Conversation Store Args ---
    /// JSON file holding the conversation list. Conversations stay in memory when unset.
    #[arg(long, env = "STATE_PATH")]
    pub state_path: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional API Key required for clients to connect to the WebSocket server. If set, clients must provide this key.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,

    /// Optional path to the TLS certificate file (PEM format) for enabling WSS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling WSS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: Some(self.chat_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: Some(self.chat_model.clone()),
            base_url: Some(self.chat_base_url.clone()),
            timeout: match self.chat_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["chat-interface"]).unwrap();
        assert_eq!(args.server_addr, "127.0.0.1:4000");
        assert_eq!(args.chat_model, DEFAULT_GEMINI_MODEL);
        assert!(!args.enable_tls);
    }

    #[test]
    fn test_llm_config_mapping() {
        let args = Args::try_parse_from([
            "chat-interface",
            "--chat-api-key",
            "abc",
            "--chat-timeout-secs",
            "0",
        ]).unwrap();
        let config = args.llm_config();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout, None);

        let args = Args::try_parse_from(["chat-interface", "--chat-timeout-secs", "5"]).unwrap();
        assert_eq!(args.llm_config().timeout, Some(Duration::from_secs(5)));
    }
}
