use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorKind {
    /// Headless Chromium over CDP; sees computed styles, globals and timing.
    Browser,
    /// Fetch and parse the HTML only.
    Static,
}

impl FromStr for InspectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "browser" | "chrome" | "chromium" => Ok(Self::Browser),
            "static" | "html" => Ok(Self::Static),
            other => Err(format!("unknown inspector: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    pub api_key: Option<String>,

    #[serde(default = "default_inspector")]
    pub inspector: InspectorKind,

    #[serde(default = "default_chrome_path")]
    pub chrome_path: String,

    pub chrome_ws_url: Option<String>,

    #[serde(default = "default_browser_pool_size")]
    pub browser_pool_size: usize,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_inspection_timeout")]
    pub inspection_timeout: u64,

    #[serde(default)]
    pub allow_file_urls: bool,

    pub store_path: Option<PathBuf>,

    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    #[serde(default = "default_copy_to_clipboard")]
    pub copy_to_clipboard: bool,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_api_port() -> u16 { 14786 }
fn default_inspector() -> InspectorKind { InspectorKind::Browser }
fn default_chrome_path() -> String { "/usr/bin/chromium".to_string() }
fn default_browser_pool_size() -> usize { 2 }
fn default_window_width() -> u32 { 1920 }
fn default_window_height() -> u32 { 1080 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_request_timeout() -> u64 { 30 }
fn default_settle_delay_ms() -> u64 { 500 }
fn default_inspection_timeout() -> u64 { 45 }
fn default_export_dir() -> PathBuf { PathBuf::from("./reports") }
fn default_copy_to_clipboard() -> bool { true }
fn default_log_format() -> LogFormat { LogFormat::Text }

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| parse_bool(&v))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            api_port: env_parse("API_PORT").unwrap_or_else(default_api_port),
            api_key: non_empty_env("API_KEY"),
            inspector: env_parse("INSPECTOR").unwrap_or_else(default_inspector),
            chrome_path: std::env::var("CHROME_PATH")
                .unwrap_or_else(|_| default_chrome_path()),
            chrome_ws_url: non_empty_env("CHROME_WS_URL"),
            browser_pool_size: env_parse("BROWSER_POOL_SIZE")
                .filter(|n: &usize| *n > 0)
                .unwrap_or_else(default_browser_pool_size),
            window_width: env_parse("WINDOW_WIDTH").unwrap_or_else(default_window_width),
            window_height: env_parse("WINDOW_HEIGHT").unwrap_or_else(default_window_height),
            user_agent: non_empty_env("USER_AGENT").unwrap_or_else(default_user_agent),
            request_timeout: env_parse("REQUEST_TIMEOUT").unwrap_or_else(default_request_timeout),
            settle_delay_ms: env_parse("SETTLE_DELAY_MS").unwrap_or_else(default_settle_delay_ms),
            inspection_timeout: env_parse("INSPECTION_TIMEOUT")
                .filter(|n: &u64| *n > 0)
                .unwrap_or_else(default_inspection_timeout),
            allow_file_urls: env_bool("ALLOW_FILE_URLS").unwrap_or(false),
            store_path: non_empty_env("STORE_PATH").map(PathBuf::from),
            export_dir: non_empty_env("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_export_dir),
            copy_to_clipboard: env_bool("COPY_TO_CLIPBOARD")
                .unwrap_or_else(default_copy_to_clipboard),
            log_format: match std::env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => default_log_format(),
            },
        };

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_port: default_api_port(),
            api_key: None,
            inspector: default_inspector(),
            chrome_path: default_chrome_path(),
            chrome_ws_url: None,
            browser_pool_size: default_browser_pool_size(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            settle_delay_ms: default_settle_delay_ms(),
            inspection_timeout: default_inspection_timeout(),
            allow_file_urls: false,
            store_path: None,
            export_dir: default_export_dir(),
            copy_to_clipboard: default_copy_to_clipboard(),
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspector_kind_accepts_aliases() {
        assert_eq!("Chromium".parse::<InspectorKind>(), Ok(InspectorKind::Browser));
        assert_eq!(" static ".parse::<InspectorKind>(), Ok(InspectorKind::Static));
        assert!("firefox".parse::<InspectorKind>().is_err());
    }

    #[test]
    fn bool_values() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults_keep_file_urls_locked() {
        let config = Config::default();
        assert!(!config.allow_file_urls);
        assert!(config.store_path.is_none());
        assert_eq!(config.inspection_timeout, 45);
    }
}
