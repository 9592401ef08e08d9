use snafu::{OptionExt as _, Snafu};

/// Attribute on the loading `<script>` tag that carries the backend base URL.
pub const API_URL_ATTR: &str = "data-api-url";

/// Path appended to the configured base URL for each send.
pub const MESSAGE_PATH: &str = "/chat/message";

/// Script filename suffix replaced to locate the companion stylesheet.
pub const SCRIPT_SUFFIX: &str = "widget.js";
/// Stylesheet filename substituted for [`SCRIPT_SUFFIX`].
pub const STYLESHEET_SUFFIX: &str = "widget.css";

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("missing '{API_URL_ATTR}' attribute on the widget script tag"))]
    MissingApiUrl { stage: &'static str },
    #[snafu(display("'{API_URL_ATTR}' attribute on the widget script tag is empty"))]
    EmptyApiUrl { stage: &'static str },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Validated embedding configuration for one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    api_url: String,
}

impl WidgetConfig {
    /// Builds a config from the raw attribute value as read off the script
    /// tag. `None` means the attribute was absent entirely; both absence
    /// and a blank value are fatal initialization errors.
    ///
    /// A trailing slash on the base URL is tolerated and stripped before
    /// path concatenation.
    pub fn from_attribute(raw: Option<&str>) -> ConfigResult<Self> {
        let raw = raw.context(MissingApiUrlSnafu {
            stage: "read-script-attribute",
        })?;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return EmptyApiUrlSnafu {
                stage: "read-script-attribute",
            }
            .fail();
        }

        Ok(Self {
            api_url: trimmed.trim_end_matches('/').to_string(),
        })
    }

    /// Normalized base URL, with no trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full URL of the chat message endpoint.
    pub fn message_endpoint(&self) -> String {
        format!("{}{MESSAGE_PATH}", self.api_url)
    }
}

/// Derives the companion stylesheet URL from the widget script's own `src`.
///
/// The stylesheet is served as a sibling of the script, so the trailing
/// `widget.js` (plus any query string) is replaced with `widget.css`.
/// Returns `None` when the src does not end in the expected filename, in
/// which case no stylesheet is injected.
pub fn stylesheet_href(script_src: &str) -> Option<String> {
    let path = script_src.split('?').next().unwrap_or(script_src);
    let prefix = path.strip_suffix(SCRIPT_SUFFIX)?;
    Some(format!("{prefix}{STYLESHEET_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = WidgetConfig::from_attribute(Some("https://api.example.com/")).unwrap();
        assert_eq!(config.api_url(), "https://api.example.com");
        assert_eq!(
            config.message_endpoint(),
            "https://api.example.com/chat/message"
        );
    }

    #[test]
    fn plain_base_url_is_kept() {
        let config = WidgetConfig::from_attribute(Some("https://api.example.com")).unwrap();
        assert_eq!(
            config.message_endpoint(),
            "https://api.example.com/chat/message"
        );
    }

    #[test]
    fn missing_attribute_is_fatal() {
        assert!(matches!(
            WidgetConfig::from_attribute(None),
            Err(ConfigError::MissingApiUrl { .. })
        ));
    }

    #[test]
    fn blank_attribute_is_fatal() {
        assert!(matches!(
            WidgetConfig::from_attribute(Some("   ")),
            Err(ConfigError::EmptyApiUrl { .. })
        ));
    }

    #[test]
    fn stylesheet_href_replaces_suffix() {
        assert_eq!(
            stylesheet_href("https://cdn.example.com/assets/widget.js"),
            Some("https://cdn.example.com/assets/widget.css".to_string())
        );
    }

    #[test]
    fn stylesheet_href_ignores_query_string() {
        assert_eq!(
            stylesheet_href("https://cdn.example.com/widget.js?v=3"),
            Some("https://cdn.example.com/widget.css".to_string())
        );
    }

    #[test]
    fn stylesheet_href_rejects_unexpected_filename() {
        assert_eq!(stylesheet_href("https://cdn.example.com/loader.js"), None);
    }
}
