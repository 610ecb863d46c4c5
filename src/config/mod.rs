use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};

use crate::errors::WikiError;

/// Server configuration and constants
pub struct Config {
    pub base_dir: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
    pub port: u16,
    pub host: String,
    /// Whether the bundled page store reports pages as writable.
    pub allow_write: bool,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            base_dir: Arc::new(PathBuf::from("wiki")),
            static_dir: Arc::new(PathBuf::from("static")),
            port: 5004,
            host: "0.0.0.0".to_string(),
            allow_write: false,
        }
    }

    /// Create configuration with custom values
    pub fn with_custom(
        base_dir: PathBuf,
        static_dir: PathBuf,
        port: Option<u16>,
        host: Option<String>,
    ) -> Self {
        Self {
            base_dir: Arc::new(base_dir),
            static_dir: Arc::new(static_dir),
            port: port.unwrap_or(5004),
            host: host.unwrap_or_else(|| "0.0.0.0".to_string()),
            allow_write: false,
        }
    }

    /// Build configuration from `WIKITHEME_*` environment variables
    pub fn from_env() -> Result<Self, WikiError> {
        let base_dir = std::env::var("WIKITHEME_DIR").ok().map(PathBuf::from);
        let static_dir = std::env::var("WIKITHEME_STATIC").ok().map(PathBuf::from);
        let host = std::env::var("WIKITHEME_HOST").ok();
        let port = match std::env::var("WIKITHEME_PORT") {
            Ok(raw) => Some(raw.parse::<u16>().map_err(|e| {
                WikiError::ConfigError(format!("WIKITHEME_PORT '{}': {}", raw, e))
            })?),
            Err(_) => None,
        };

        let mut config = Self::with_custom(
            base_dir.unwrap_or_else(|| PathBuf::from("wiki")),
            static_dir.unwrap_or_else(|| PathBuf::from("static")),
            port,
            host,
        );
        config.allow_write = env_flag("WIKITHEME_ALLOW_WRITE").unwrap_or(false);
        debug!(
            "Server config: base_dir={:?} static_dir={:?} port={}",
            config.base_dir, config.static_dir, config.port
        );
        Ok(config)
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => std::net::SocketAddr::new(ip, self.port),
            Err(_) => {
                warn!("Invalid host '{}', binding to 0.0.0.0", self.host);
                std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Which editor links the edit bar offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorUi {
    /// Offer both the text and the GUI editor
    FreeChoice,
    /// Offer a single "Edit" link
    TheOne,
}

/// Footer credits, either a list of items or a preformatted HTML string
#[derive(Debug, Clone)]
pub enum Credits {
    List(Vec<String>),
    Html(String),
}

/// One entry of the page icons table used by icon links
#[derive(Debug, Clone)]
pub struct PageIcon {
    /// Link target template, `%(key)s` placeholders
    pub params: String,
    /// Link title template
    pub title: String,
    /// Icon key in the theme icon table
    pub icon: String,
}

impl PageIcon {
    fn new(params: &str, title: &str, icon: &str) -> Self {
        Self {
            params: params.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Site-wide presentation settings consumed by the theme
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub theme_name: String,
    pub sitename: String,
    /// This wiki's own interwiki identifier
    pub interwikiname: Option<String>,
    pub url_prefix: String,
    pub page_front_page: String,
    /// Configured navigation bar entries (link mini-syntax)
    pub navi_bar: Vec<String>,
    /// Accepted URL schemes, without the trailing colon
    pub url_schemes: Vec<String>,
    pub logo_string: Option<String>,
    pub show_interwiki: bool,
    pub show_login: bool,
    pub show_version: bool,
    pub mail_enabled: bool,
    pub editor_ui: EditorUi,
    /// Extra stylesheets as (media, href)
    pub stylesheets: Vec<(String, String)>,
    pub page_credits: Credits,
    /// Site markup inserted before the header and after the footer
    pub page_header: Option<String>,
    pub page_footer: Option<String>,
    pub page_icons_table: BTreeMap<String, PageIcon>,
    /// Whether RSS feeds can be offered; decided at startup
    pub rss_supported: bool,
    pub ie7_hack: bool,
    pub release: String,
    pub revision: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let icons: BTreeMap<String, PageIcon> = [
            ("diff", "%(q_page_name)s?action=diff", "Diffs"),
            ("info", "%(q_page_name)s?action=info", "Info"),
            ("edit", "%(q_page_name)s?action=edit", "Edit"),
            ("unsubscribe", "%(q_page_name)s?action=subscribe", "UnSubscribe"),
            ("subscribe", "%(q_page_name)s?action=subscribe", "Subscribe"),
            ("raw", "%(q_page_name)s?action=raw", "Raw"),
            ("print", "%(q_page_name)s?action=print", "Print"),
            ("view", "%(q_page_name)s", "View"),
            ("home", "%(q_page_front_page)s", "Home"),
        ]
        .into_iter()
        .map(|(key, params, title)| (key.to_string(), PageIcon::new(params, title, key)))
        .collect();

        Self {
            theme_name: "classic".to_string(),
            sitename: "Untitled Wiki".to_string(),
            interwikiname: None,
            url_prefix: "/static".to_string(),
            page_front_page: "FrontPage".to_string(),
            navi_bar: vec![
                "FrontPage".to_string(),
                "RecentChanges".to_string(),
                "FindPage".to_string(),
                "HelpContents".to_string(),
            ],
            url_schemes: [
                "http", "https", "ftp", "file", "mailto", "nntp", "news", "ssh",
                "telnet", "irc", "ircs", "xmpp", "webcal", "svn",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            logo_string: None,
            show_interwiki: false,
            show_login: true,
            show_version: false,
            mail_enabled: false,
            editor_ui: EditorUi::FreeChoice,
            stylesheets: Vec::new(),
            page_credits: Credits::List(vec![
                "<a href=\"https://www.rust-lang.org/\">Rust Powered</a>".to_string(),
            ]),
            page_header: None,
            page_footer: None,
            page_icons_table: icons,
            rss_supported: false,
            ie7_hack: false,
            release: env!("CARGO_PKG_VERSION").to_string(),
            revision: "release".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Overlay `WIKITHEME_*` environment variables on the defaults
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(name) = std::env::var("WIKITHEME_SITENAME") {
            cfg.sitename = name;
        }
        if let Ok(name) = std::env::var("WIKITHEME_INTERWIKINAME") {
            cfg.interwikiname = Some(name).filter(|n| !n.is_empty());
        }
        if let Ok(raw) = std::env::var("WIKITHEME_NAVI_BAR") {
            cfg.navi_bar = parse_navi_bar(&raw);
        }
        if let Some(rss) = env_flag("WIKITHEME_RSS") {
            cfg.rss_supported = rss;
        }
        if let Some(show) = env_flag("WIKITHEME_SHOW_INTERWIKI") {
            cfg.show_interwiki = show;
        }
        debug!("Theme config: sitename='{}' navi_bar={:?}", cfg.sitename, cfg.navi_bar);
        cfg
    }

    /// Accepted schemes as link prefixes, `http:` style
    pub fn link_schemes(&self) -> impl Iterator<Item = String> + '_ {
        self.url_schemes.iter().map(|s| format!("{}:", s))
    }
}

/// Split a `|`-separated list of navigation entries
pub fn parse_navi_bar(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
    })
}
