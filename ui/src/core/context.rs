//! Application-wide configuration, provided once by the launcher.

use api::ApiClient;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    /// Accepts `light`/`dark` in any case; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ColorMode::Light),
            "dark" => Some(ColorMode::Dark),
            _ => None,
        }
    }

    pub fn as_attr(&self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

/// Read-only settings every view may need. Launchers build one and hand it to
/// `use_context_provider`; views read it with `use_context::<AppContext>()`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppContext {
    pub api: ApiClient,
    pub timezone: String,
    pub color_mode: ColorMode,
}

impl AppContext {
    pub fn new(api_base_url: &str, timezone: impl Into<String>, color_mode: ColorMode) -> Self {
        Self {
            api: ApiClient::new(api_base_url),
            timezone: timezone.into(),
            color_mode,
        }
    }

    /// Build from optional raw settings, falling back to the defaults for anything unset
    /// or unparseable.
    pub fn from_settings(
        api_url: Option<&str>,
        timezone: Option<&str>,
        color_mode: Option<&str>,
    ) -> Self {
        let api_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        let timezone = timezone
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .map(str::to_string)
            .unwrap_or_else(super::platform::detect_timezone);
        let color_mode = match color_mode {
            Some(raw) => ColorMode::parse(raw).unwrap_or_else(|| {
                tracing::warn!(value = raw, "unknown color mode, using light");
                ColorMode::Light
            }),
            None => ColorMode::Light,
        };

        Self::new(api_url, timezone, color_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_settings_win() {
        let ctx = AppContext::from_settings(
            Some("https://admin.example.org/api/"),
            Some("Europe/Madrid"),
            Some("DARK"),
        );
        assert_eq!(ctx.api.base_url(), "https://admin.example.org/api");
        assert_eq!(ctx.timezone, "Europe/Madrid");
        assert_eq!(ctx.color_mode, ColorMode::Dark);
    }

    #[test]
    fn blanks_fall_back_to_defaults() {
        let ctx = AppContext::from_settings(Some("  "), Some("America/Chicago"), Some("sepia"));
        assert_eq!(ctx.api.base_url(), DEFAULT_API_URL);
        assert_eq!(ctx.color_mode, ColorMode::Light);
    }
}
