use crate::config::Config;
use crate::error::{AppError, Restriction, Result};
use tracing::warn;
use url::Url;

const INTERNAL_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-search",
    "chrome-untrusted",
    "edge",
    "about",
    "brave",
    "opera",
    "vivaldi",
    "devtools",
    "view-source",
];

const EXTENSION_SCHEMES: &[&str] = &[
    "chrome-extension",
    "moz-extension",
    "edge-extension",
    "extension",
];

/// (host, path prefix) pairs of extension marketplaces.
const MARKETPLACES: &[(&str, &str)] = &[
    ("chrome.google.com", "/webstore"),
    ("chromewebstore.google.com", "/"),
    ("microsoftedge.microsoft.com", "/addons"),
    ("addons.mozilla.org", "/"),
];

/// A page that passed the restricted-target guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub url: Url,
    pub wait_for_selector: Option<String>,
}

impl PageTarget {
    pub fn is_local_file(&self) -> bool {
        self.url.scheme() == "file"
    }
}

pub struct SecurityService {
    allow_file_urls: bool,
}

impl SecurityService {
    pub fn new(config: &Config) -> Self {
        Self {
            allow_file_urls: config.allow_file_urls,
        }
    }

    /// Rejects pages that must never reach the inspector.
    pub fn check_target(&self, url_str: &str) -> Result<PageTarget> {
        let url = Url::parse(url_str.trim())
            .map_err(|e| AppError::InvalidUrl(format!("Invalid URL format: {}", e)))?;

        if let Some(restriction) = self.restriction_for(&url) {
            warn!("Refusing to inspect {}: {}", url, restriction);
            return Err(AppError::RestrictedPage(restriction));
        }

        match url.scheme() {
            "http" | "https" | "file" => {}
            other => {
                return Err(AppError::InvalidUrl(format!(
                    "Invalid scheme: {}. Only http, https and file are supported",
                    other
                )))
            }
        }

        if url.scheme() != "file" && url.host_str().is_none() {
            return Err(AppError::InvalidUrl("URL must have a host".to_string()));
        }

        Ok(PageTarget {
            url,
            wait_for_selector: None,
        })
    }

    /// Re-applies the guard to the address the page ended up at after
    /// redirects.
    pub fn check_landing(&self, url_str: &str) -> Result<()> {
        let url = Url::parse(url_str)
            .map_err(|e| AppError::InvalidUrl(format!("Invalid landing URL: {}", e)))?;

        match self.restriction_for(&url) {
            Some(restriction) => {
                warn!("Inspected page landed on {}: {}", url, restriction);
                Err(AppError::RestrictedPage(restriction))
            }
            None => Ok(()),
        }
    }

    fn restriction_for(&self, url: &Url) -> Option<Restriction> {
        let scheme = url.scheme();

        if INTERNAL_SCHEMES.contains(&scheme) {
            return Some(Restriction::InternalPage);
        }

        if EXTENSION_SCHEMES.contains(&scheme) {
            return Some(Restriction::ExtensionPage);
        }

        if scheme == "file" && !self.allow_file_urls {
            return Some(Restriction::LocalFile);
        }

        if Self::is_marketplace(url) {
            return Some(Restriction::Marketplace);
        }

        None
    }

    fn is_marketplace(url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_lowercase();

        MARKETPLACES
            .iter()
            .any(|(market, prefix)| host == *market && url.path().starts_with(prefix))
    }
}

impl Default for SecurityService {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn restriction(service: &SecurityService, url: &str) -> Option<Restriction> {
        match service.check_target(url) {
            Err(AppError::RestrictedPage(r)) => Some(r),
            _ => None,
        }
    }

    #[test]
    fn internal_pages_are_rejected() {
        let guard = SecurityService::default();
        for url in ["chrome://settings", "edge://flags", "about:blank", "view-source:https://a.com"] {
            assert_eq!(restriction(&guard, url), Some(Restriction::InternalPage), "{}", url);
        }
    }

    #[test]
    fn extension_pages_are_rejected() {
        let guard = SecurityService::default();
        assert_eq!(
            restriction(&guard, "chrome-extension://abcdef/report.html"),
            Some(Restriction::ExtensionPage)
        );
        assert_eq!(
            restriction(&guard, "moz-extension://1234/popup.html"),
            Some(Restriction::ExtensionPage)
        );
    }

    #[test]
    fn marketplaces_are_rejected() {
        let guard = SecurityService::default();
        assert_eq!(
            restriction(&guard, "https://chrome.google.com/webstore/detail/xyz"),
            Some(Restriction::Marketplace)
        );
        assert_eq!(
            restriction(&guard, "https://chromewebstore.google.com/detail/xyz"),
            Some(Restriction::Marketplace)
        );
        assert_eq!(restriction(&guard, "https://chrome.google.com/intl/en/"), None);
    }

    #[test]
    fn local_files_need_permission() {
        let locked = SecurityService::default();
        assert_eq!(
            restriction(&locked, "file:///tmp/index.html"),
            Some(Restriction::LocalFile)
        );

        let config = Config {
            allow_file_urls: true,
            ..Config::default()
        };
        let open = SecurityService::new(&config);
        let target = open.check_target("file:///tmp/index.html").unwrap();
        assert!(target.is_local_file());
    }

    #[test]
    fn ordinary_pages_pass() {
        let guard = SecurityService::default();
        let target = guard.check_target(" https://example.com/path?q=1 ").unwrap();
        assert_eq!(target.url.as_str(), "https://example.com/path?q=1");
        assert!(guard.check_target("http://localhost:3000/").is_ok());
    }

    #[test]
    fn landing_address_is_checked_again() {
        let guard = SecurityService::default();
        assert!(guard.check_landing("https://example.com/after-redirect").is_ok());
        assert!(matches!(
            guard.check_landing("https://addons.mozilla.org/en-US/firefox/addon/x/"),
            Err(AppError::RestrictedPage(Restriction::Marketplace))
        ));
        assert!(matches!(
            guard.check_landing("chrome://newtab/"),
            Err(AppError::RestrictedPage(Restriction::InternalPage))
        ));
    }

    #[test]
    fn unsupported_or_malformed_urls_are_invalid() {
        let guard = SecurityService::default();
        assert!(matches!(guard.check_target("not a url"), Err(AppError::InvalidUrl(_))));
        assert!(matches!(
            guard.check_target("javascript:alert(1)"),
            Err(AppError::InvalidUrl(_))
        ));
    }
}
