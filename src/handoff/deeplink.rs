//! ChatGPT deeplink construction.
//!
//! A deeplink pre-fills the ChatGPT composer through the `q` query parameter.
//! Browsers and the OS launchers behind them truncate or reject very long
//! URLs, so callers only open links within [`DEFAULT_MAX_LENGTH`] (or a
//! configured limit).

/// Base URL; the percent-encoded prompt is appended directly.
pub const BASE_URL: &str = "https://chatgpt.com/?q=";

/// Longest deeplink that is still opened in a browser by default.
pub const DEFAULT_MAX_LENGTH: usize = 1800;

/// A ChatGPT URL carrying an encoded prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deeplink {
    url: String,
}

impl Deeplink {
    /// Builds the deeplink for `prompt`.
    ///
    /// Everything except RFC 3986 unreserved characters is encoded as `%XX`
    /// over its UTF-8 bytes, so a space becomes `%20`.
    #[must_use]
    pub fn build(prompt: &str) -> Self {
        let encoded = urlencoding::encode(prompt);
        let mut url = String::with_capacity(BASE_URL.len() + encoded.len());
        url.push_str(BASE_URL);
        url.push_str(&encoded);
        Self { url }
    }

    /// Returns the full URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Length of the URL in characters. The URL is pure ASCII, so this is
    /// also its byte length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.url.len()
    }

    /// Always false; a deeplink contains at least the base URL.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }

    /// Whether the URL is short enough to open (`len <= max_length`).
    #[must_use]
    pub fn fits_within(&self, max_length: usize) -> bool {
        self.len() <= max_length
    }
}

impl std::fmt::Display for Deeplink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_characters() {
        let link = Deeplink::build("a b&c=d?e/f#g");
        assert_eq!(
            link.as_str(),
            "https://chatgpt.com/?q=a%20b%26c%3Dd%3Fe%2Ff%23g"
        );
    }

    #[test]
    fn keeps_unreserved_characters() {
        let link = Deeplink::build("Az09-_.~");
        assert_eq!(link.as_str(), "https://chatgpt.com/?q=Az09-_.~");
    }

    #[test]
    fn encodes_utf8_bytes() {
        let link = Deeplink::build("café\n");
        assert_eq!(link.as_str(), "https://chatgpt.com/?q=caf%C3%A9%0A");
    }

    #[test]
    fn length_counts_encoded_url() {
        let link = Deeplink::build("Research X");
        assert_eq!(link.len(), BASE_URL.len() + "Research%20X".len());
        assert!(!link.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let room = DEFAULT_MAX_LENGTH - BASE_URL.len();

        let at_limit = Deeplink::build(&"a".repeat(room));
        assert_eq!(at_limit.len(), DEFAULT_MAX_LENGTH);
        assert!(at_limit.fits_within(DEFAULT_MAX_LENGTH));

        let under = Deeplink::build(&"a".repeat(room - 1));
        assert!(under.fits_within(DEFAULT_MAX_LENGTH));

        let over = Deeplink::build(&"a".repeat(room + 1));
        assert_eq!(over.len(), DEFAULT_MAX_LENGTH + 1);
        assert!(!over.fits_within(DEFAULT_MAX_LENGTH));
    }

    #[test]
    fn display_matches_url() {
        let link = Deeplink::build("hi");
        assert_eq!(link.to_string(), link.as_str());
    }
}
