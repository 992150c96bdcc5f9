use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use axum::http::{header, HeaderMap};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::telemetry::models::ParseEnumError;

/// Cookie remembering the selected theme across requests.
pub const THEME_COOKIE: &str = "agrochain-theme";

/// Dashboard refresh choices in seconds.
pub const REFRESH_INTERVALS: [u64; 4] = [10, 30, 60, 300];

/// Session timeout choices in minutes.
pub const SESSION_TIMEOUTS: [u32; 4] = [15, 30, 60, 240];

// ---------------------------------------------------------------------------
// Theme / Language
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Claro",
            Theme::Dark => "Escuro",
            Theme::System => "Sistema",
        }
    }

    /// Header button: dark becomes light, anything else becomes dark.
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light | Theme::System => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("theme", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Pt,
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Pt, Language::En, Language::Es];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Pt => "Português",
            Language::En => "English",
            Language::Es => "Español",
        }
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("language", s))
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub theme: Theme,
    pub language: Language,
    pub temperature_alerts: bool,
    pub humidity_alerts: bool,
    pub email_alerts: bool,
    pub alert_email: String,
    pub api_url: String,
    pub refresh_interval_secs: u64,
    pub developer_mode: bool,
    pub two_factor: bool,
    pub session_timeout_mins: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: Language::Pt,
            temperature_alerts: true,
            humidity_alerts: true,
            email_alerts: false,
            alert_email: String::new(),
            api_url: String::new(),
            refresh_interval_secs: 30,
            developer_mode: false,
            two_factor: false,
            session_timeout_mins: 60,
        }
    }
}

impl Settings {
    /// Defaults with the refresh interval taken from the environment.
    pub fn with_refresh_interval(refresh_interval_secs: u64) -> Self {
        Self {
            refresh_interval_secs,
            ..Self::default()
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Validation failure of the settings form, shown verbatim above the form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Tema inválido: {0:?}")]
    Theme(String),
    #[error("Idioma inválido: {0:?}")]
    Language(String),
    #[error("Taxa de atualização inválida: {0:?}")]
    RefreshInterval(String),
    #[error("Timeout de sessão inválido: {0:?}")]
    SessionTimeout(String),
    #[error("E-mail para alertas inválido: {0:?}")]
    Email(String),
    #[error("Indique um e-mail para receber alertas críticos")]
    EmailRequired,
    #[error("URL da API inválida: {0:?}")]
    ApiUrl(String),
}

/// Raw `POST /settings` body. Unchecked switches are absent from the form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub theme: String,
    pub language: String,
    pub temperature_alerts: Option<String>,
    pub humidity_alerts: Option<String>,
    pub email_alerts: Option<String>,
    pub alert_email: String,
    pub api_url: String,
    pub refresh_interval: String,
    pub developer_mode: Option<String>,
    pub two_factor: Option<String>,
    pub session_timeout: String,
}

impl SettingsForm {
    pub fn validate(&self) -> Result<Settings, SettingsError> {
        let theme = self
            .theme
            .trim()
            .parse()
            .map_err(|_| SettingsError::Theme(self.theme.clone()))?;
        let language = self
            .language
            .trim()
            .parse()
            .map_err(|_| SettingsError::Language(self.language.clone()))?;

        let refresh_interval_secs = self
            .refresh_interval
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|v| REFRESH_INTERVALS.contains(v))
            .ok_or_else(|| SettingsError::RefreshInterval(self.refresh_interval.clone()))?;
        let session_timeout_mins = self
            .session_timeout
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|v| SESSION_TIMEOUTS.contains(v))
            .ok_or_else(|| SettingsError::SessionTimeout(self.session_timeout.clone()))?;

        let email_alerts = self.email_alerts.is_some();
        let alert_email = self.alert_email.trim().to_owned();
        if !alert_email.is_empty() && !looks_like_email(&alert_email) {
            return Err(SettingsError::Email(alert_email));
        }
        if email_alerts && alert_email.is_empty() {
            return Err(SettingsError::EmailRequired);
        }

        let api_url = self.api_url.trim().to_owned();
        if !api_url.is_empty() {
            let valid = Url::parse(&api_url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                return Err(SettingsError::ApiUrl(api_url));
            }
        }

        Ok(Settings {
            theme,
            language,
            temperature_alerts: self.temperature_alerts.is_some(),
            humidity_alerts: self.humidity_alerts.is_some(),
            email_alerts,
            alert_email,
            api_url,
            refresh_interval_secs,
            developer_mode: self.developer_mode.is_some(),
            two_factor: self.two_factor.is_some(),
            session_timeout_mins,
        })
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Process-wide settings, kept in memory only.
#[derive(Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
    /// Restored by "Restaurar Padrões".
    defaults: Arc<Settings>,
}

impl SettingsStore {
    pub fn new(defaults: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(defaults.clone())),
            defaults: Arc::new(defaults),
        }
    }

    /// Restores the start-up settings and returns them.
    pub async fn reset(&self) -> Settings {
        let defaults = Settings::clone(&self.defaults);
        *self.inner.write().await = defaults.clone();
        defaults
    }

    pub async fn get(&self) -> Settings {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, settings: Settings) {
        *self.inner.write().await = settings;
    }

    /// Switches the theme without touching the other settings.
    pub async fn set_theme(&self, theme: Theme) {
        self.inner.write().await.theme = theme;
    }
}

// ---------------------------------------------------------------------------
// Theme cookie
// ---------------------------------------------------------------------------

/// Raw value of the request cookie called `name`.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Theme stored in the request cookie, if present and valid.
pub fn theme_from_cookie(headers: &HeaderMap) -> Option<Theme> {
    cookie_value(headers, THEME_COOKIE).and_then(|value| value.parse().ok())
}

/// `Set-Cookie` value persisting `theme` for a year.
pub fn theme_cookie(theme: Theme) -> String {
    format!("{THEME_COOKIE}={theme}; Path=/; Max-Age=31536000; SameSite=Lax")
}

/// Cookie wins over the stored setting.
pub fn effective_theme(headers: &HeaderMap, settings: &Settings) -> Theme {
    theme_from_cookie(headers).unwrap_or(settings.theme)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn form() -> SettingsForm {
        SettingsForm {
            theme: "dark".to_owned(),
            language: "en".to_owned(),
            temperature_alerts: Some("on".to_owned()),
            humidity_alerts: None,
            email_alerts: Some("on".to_owned()),
            alert_email: " agro@example.com ".to_owned(),
            api_url: "https://api.agrochain.com".to_owned(),
            refresh_interval: "10".to_owned(),
            developer_mode: None,
            two_factor: Some("on".to_owned()),
            session_timeout: "240".to_owned(),
        }
    }

    #[test]
    fn defaults_match_initial_form() {
        let s = Settings::default();
        assert_eq!(s.theme, Theme::Light);
        assert_eq!(s.language, Language::Pt);
        assert!(s.temperature_alerts && s.humidity_alerts);
        assert!(!s.email_alerts && !s.developer_mode && !s.two_factor);
        assert_eq!(s.refresh_interval_secs, 30);
        assert_eq!(s.session_timeout_mins, 60);
    }

    #[test]
    fn valid_form_is_accepted() {
        let s = form().validate().unwrap();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.language, Language::En);
        assert!(s.temperature_alerts);
        assert!(!s.humidity_alerts);
        assert_eq!(s.alert_email, "agro@example.com");
        assert_eq!(s.refresh_interval(), Duration::from_secs(10));
        assert_eq!(s.session_timeout_mins, 240);
    }

    #[test]
    fn intervals_outside_choices_are_rejected() {
        let mut f = form();
        f.refresh_interval = "15".to_owned();
        assert_eq!(f.validate().unwrap_err(), SettingsError::RefreshInterval("15".to_owned()));

        let mut f = form();
        f.session_timeout = "abc".to_owned();
        assert!(matches!(f.validate(), Err(SettingsError::SessionTimeout(_))));
    }

    #[test]
    fn unknown_theme_and_language_are_rejected() {
        let mut f = form();
        f.theme = "sepia".to_owned();
        assert!(matches!(f.validate(), Err(SettingsError::Theme(_))));

        let mut f = form();
        f.language = "fr".to_owned();
        assert!(matches!(f.validate(), Err(SettingsError::Language(_))));
    }

    #[test]
    fn email_alerts_need_an_address() {
        let mut f = form();
        f.alert_email = String::new();
        assert_eq!(f.validate().unwrap_err(), SettingsError::EmailRequired);

        f.email_alerts = None;
        assert!(f.validate().is_ok());

        f.alert_email = "agro@".to_owned();
        assert!(matches!(f.validate(), Err(SettingsError::Email(_))));
    }

    #[test]
    fn api_url_must_be_http() {
        let mut f = form();
        f.api_url = "ftp://files".to_owned();
        assert!(matches!(f.validate(), Err(SettingsError::ApiUrl(_))));
        f.api_url = String::new();
        assert!(f.validate().is_ok());
    }

    #[test]
    fn toggle_switches_between_light_and_dark() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::System.toggled(), Theme::Dark);
    }

    #[test]
    fn theme_cookie_is_read_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=abc; agrochain-theme=dark; other=1"),
        );
        assert_eq!(theme_from_cookie(&headers), Some(Theme::Dark));
        assert_eq!(effective_theme(&headers, &Settings::default()), Theme::Dark);
    }

    #[test]
    fn invalid_cookie_falls_back_to_setting() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("agrochain-theme=neon"));
        let settings = Settings {
            theme: Theme::System,
            ..Settings::default()
        };
        assert_eq!(effective_theme(&headers, &settings), Theme::System);
        assert_eq!(effective_theme(&HeaderMap::new(), &settings), Theme::System);
    }

    #[test]
    fn cookie_value_round_trips() {
        let mut headers = HeaderMap::new();
        let cookie = theme_cookie(Theme::System);
        let pair = cookie.split(';').next().unwrap().to_owned();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        assert_eq!(theme_from_cookie(&headers), Some(Theme::System));
    }

    #[tokio::test]
    async fn store_replaces_and_sets_theme() {
        let store = SettingsStore::new(Settings::with_refresh_interval(60));
        assert_eq!(store.get().await.refresh_interval_secs, 60);

        store.set_theme(Theme::Dark).await;
        assert_eq!(store.get().await.theme, Theme::Dark);
        assert_eq!(store.get().await.refresh_interval_secs, 60);

        store.replace(Settings::default()).await;
        assert_eq!(store.get().await, Settings::default());

        let restored = store.reset().await;
        assert_eq!(restored.refresh_interval_secs, 60);
        assert_eq!(store.get().await, restored);
    }
}
