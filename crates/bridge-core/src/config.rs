//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. line-bridge.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Error;

/// Default config file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "line-bridge.toml";

/// Discord side of the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Discord bot token
    #[serde(default)]
    pub token: String,

    /// Only relay thread events whose parent channel has this name
    pub category_name: Option<String>,

    /// Only relay plain messages posted in a channel/thread with this name
    pub message_channel_name: Option<String>,

    /// Relay plain (non-thread) messages
    #[serde(default = "default_relay_messages")]
    pub relay_messages: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            category_name: None,
            message_channel_name: None,
            relay_messages: default_relay_messages(),
        }
    }
}

/// LINE side of the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Channel access token used for push/reply
    #[serde(default)]
    pub channel_access_token: String,

    /// Channel secret used to validate webhook signatures
    #[serde(default)]
    pub channel_secret: String,

    /// Push destinations (user, group or room ids)
    #[serde(default)]
    pub destination_ids: Vec<String>,

    /// Webhook server port
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            destination_ids: Vec::new(),
            webhook_port: default_webhook_port(),
        }
    }
}

/// Relay tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Attempts made to fetch the starter message of a new thread
    #[serde(default = "default_starter_max_retries")]
    pub starter_max_retries: u32,

    /// Delay before each starter message attempt, in milliseconds
    #[serde(default = "default_starter_retry_delay_ms")]
    pub starter_retry_delay_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            starter_max_retries: default_starter_max_retries(),
            starter_retry_delay_ms: default_starter_retry_delay_ms(),
        }
    }
}

impl RelayConfig {
    /// Delay before each starter message attempt
    pub fn starter_retry_delay(&self) -> Duration {
        Duration::from_millis(self.starter_retry_delay_ms)
    }
}

/// Main configuration for line-bridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub line: LineConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

fn default_relay_messages() -> bool {
    true
}

fn default_webhook_port() -> u16 {
    3000
}

fn default_starter_max_retries() -> u32 {
    3
}

fn default_starter_retry_delay_ms() -> u64 {
    2000
}

/// 単一 ID またはカンマ区切りの ID リストを分解する
pub fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off")
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    var_name.push(c);
                }

                if !closed {
                    // 閉じ括弧がなければそのまま残す
                    result.push_str("${");
                    result.push_str(&var_name);
                } else if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 文字列から設定を構築する (環境変数の上書きなし)
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let mut config: Self = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        // "${TARGET_GROUP_ID}" expands to "" when unset
        config.line.destination_ids.retain(|id| !id.trim().is_empty());
        Ok(config)
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 読み込み後、環境変数で上書きされます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./line-bridge.toml` があればそれを使い、なければ環境変数のみ。
    pub fn load() -> crate::Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Discord 設定の上書き
        if let Some(token) = lookup("DISCORD_BOT_TOKEN") {
            self.discord.token = token;
        }
        if let Some(name) = lookup("TARGET_CATEGORY_NAME").filter(|s| !s.is_empty()) {
            self.discord.category_name = Some(name);
        }
        if let Some(name) = lookup("TARGET_THREAD_NAME").filter(|s| !s.is_empty()) {
            self.discord.message_channel_name = Some(name);
        }
        if let Some(flag) = lookup("RELAY_MESSAGES") {
            self.discord.relay_messages = parse_flag(&flag);
        }

        // LINE 設定の上書き
        if let Some(token) = lookup("LINE_BOT_TOKEN") {
            self.line.channel_access_token = token;
        }
        if let Some(secret) = lookup("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = secret;
        }
        // TARGET_IDS (list) wins over the single TARGET_GROUP_ID
        // A set-but-blank variable counts as unset
        let present = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        if let Some(ids) = present("TARGET_IDS").or_else(|| present("TARGET_GROUP_ID")) {
            let ids = parse_id_list(&ids);
            if !ids.is_empty() {
                self.line.destination_ids = ids;
            }
        }
        if let Some(port) = present("WEBHOOK_PORT").or_else(|| present("PORT")) {
            if let Ok(p) = port.trim().parse() {
                self.line.webhook_port = p;
            }
        }

        // Relay 設定の上書き
        if let Some(n) = lookup("STARTER_MAX_RETRIES") {
            if let Ok(n) = n.trim().parse() {
                self.relay.starter_max_retries = n;
            }
        }
        if let Some(ms) = lookup("STARTER_RETRY_DELAY_MS") {
            if let Ok(ms) = ms.trim().parse() {
                self.relay.starter_retry_delay_ms = ms;
            }
        }
    }

    /// 起動前の検証。失敗した場合はサービスを開始しない
    pub fn validate(&self) -> crate::Result<()> {
        if self.discord.token.is_empty() {
            return Err(Error::Config("DISCORD_BOT_TOKEN not set".to_string()));
        }
        if self.line.channel_access_token.is_empty() {
            return Err(Error::Config("LINE_BOT_TOKEN not set".to_string()));
        }
        if self.line.channel_secret.is_empty() {
            return Err(Error::Config("LINE_CHANNEL_SECRET not set".to_string()));
        }
        if self.line.destination_ids.is_empty() {
            return Err(Error::Config(
                "no LINE destination configured (TARGET_GROUP_ID or TARGET_IDS)".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "discord"),
            ("LINE_BOT_TOKEN", "line"),
            ("LINE_CHANNEL_SECRET", "secret"),
            ("TARGET_GROUP_ID", "G1"),
        ]));
        config
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.discord.token.is_empty());
        assert!(config.discord.relay_messages);
        assert_eq!(config.line.webhook_port, 3000);
        assert!(config.line.destination_ids.is_empty());
        assert_eq!(config.relay.starter_max_retries, 3);
        assert_eq!(config.relay.starter_retry_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("G1"), vec!["G1"]);
        assert_eq!(parse_id_list(" G1, U2 ,,R3 "), vec!["G1", "U2", "R3"]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_overrides_single_destination() {
        let config = valid_config();
        assert_eq!(config.discord.token, "discord");
        assert_eq!(config.line.channel_access_token, "line");
        assert_eq!(config.line.destination_ids, vec!["G1"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_destination_list_wins() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("TARGET_GROUP_ID", "G1"),
            ("TARGET_IDS", "U1,U2"),
        ]));
        assert_eq!(config.line.destination_ids, vec!["U1", "U2"]);
    }

    #[test]
    fn test_overrides_filters_and_tuning() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("TARGET_CATEGORY_NAME", "requests"),
            ("TARGET_THREAD_NAME", ""),
            ("RELAY_MESSAGES", "false"),
            ("PORT", "8080"),
            ("STARTER_MAX_RETRIES", "5"),
            ("STARTER_RETRY_DELAY_MS", "250"),
        ]));
        assert_eq!(config.discord.category_name.as_deref(), Some("requests"));
        assert!(config.discord.message_channel_name.is_none());
        assert!(!config.discord.relay_messages);
        assert_eq!(config.line.webhook_port, 8080);
        assert_eq!(config.relay.starter_max_retries, 5);
        assert_eq!(config.relay.starter_retry_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_port_keeps_default() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("WEBHOOK_PORT", "not-a-port")]));
        assert_eq!(config.line.webhook_port, 3000);
    }

    #[test]
    fn test_blank_primary_vars_fall_back() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("TARGET_IDS", ""),
            ("TARGET_GROUP_ID", "G1"),
            ("WEBHOOK_PORT", " "),
            ("PORT", "8080"),
        ]));
        assert_eq!(config.line.destination_ids, vec!["G1".to_string()]);
        assert_eq!(config.line.webhook_port, 8080);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert!(Config::default().validate().is_err());

        let mut config = valid_config();
        config.line.destination_ids.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = valid_config();
        config.line.channel_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_env_vars_missing_var() {
        let result = Config::expand_env_vars("prefix_${LINE_BRIDGE_SURELY_UNSET_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("$HOME"), "$HOME");
    }

    #[test]
    fn test_expand_env_vars_unterminated() {
        let input = "token = \"abc${LINE_BRIDGE_UNTERMINATED\"";
        assert_eq!(Config::expand_env_vars(input), input);
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[discord]
token = "discord_token"
category_name = "requests"

[line]
channel_access_token = "line_token"
channel_secret = "line_secret"
destination_ids = ["G1", "U2"]
webhook_port = 8080

[relay]
starter_max_retries = 4
"#;

        let config = Config::from_toml_str(toml_content).unwrap();
        assert_eq!(config.discord.token, "discord_token");
        assert_eq!(config.discord.category_name.as_deref(), Some("requests"));
        assert!(config.discord.relay_messages);
        assert_eq!(config.line.destination_ids, vec!["G1", "U2"]);
        assert_eq!(config.line.webhook_port, 8080);
        assert_eq!(config.relay.starter_max_retries, 4);
        assert_eq!(config.relay.starter_retry_delay_ms, 2000);
    }

    #[test]
    fn test_toml_drops_empty_destinations() {
        let toml_content = r#"
[line]
destination_ids = ["${LINE_BRIDGE_SURELY_UNSET_VAR}", "G1"]
"#;

        let config = Config::from_toml_str(toml_content).unwrap();
        assert_eq!(config.line.destination_ids, vec!["G1"]);
    }

    #[test]
    fn test_toml_file_not_found() {
        let result = Config::from_toml_file("/nonexistent/line-bridge.toml");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_toml_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line-bridge.toml");
        std::fs::write(&path, "[line\nbroken").unwrap();

        assert!(Config::from_toml_file(&path).is_err());
    }
}
