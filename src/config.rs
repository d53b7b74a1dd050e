use std::path::PathBuf;
use std::time::Duration;

/// Engine-level knobs shared by every session of one crawl.
///
/// Selector candidates live in [`crate::selectors::SelectorTable`]; this
/// struct only carries timing bounds, directories and the target origin.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Pause between scroll iterations.
    pub scroll_pause: Duration,
    /// Hard ceiling on scroll iterations per page.
    pub max_scroll_rounds: usize,
    /// Consecutive no-growth rounds before a load-more/next attempt.
    pub stability_threshold: u32,
    /// Delay between property-type passes.
    pub inter_pass_delay: Duration,
    /// Bounded poll rounds (500ms each) for the list container.
    pub container_poll_rounds: usize,
    pub output_dir: PathBuf,
    pub debug_dir: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.dabangapp.com".to_string(),
            timeout: Duration::from_secs(60),
            scroll_pause: Duration::from_millis(1200),
            max_scroll_rounds: 50,
            stability_threshold: 4,
            inter_pass_delay: Duration::from_secs(2),
            container_poll_rounds: 20,
            output_dir: PathBuf::from("./output"),
            debug_dir: PathBuf::from("./debug"),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scroll_pause(mut self, pause: Duration) -> Self {
        self.scroll_pause = pause;
        self
    }

    pub fn with_max_scroll_rounds(mut self, rounds: usize) -> Self {
        self.max_scroll_rounds = rounds;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new()
            .with_base_url("https://example.test")
            .with_timeout(Duration::from_secs(120))
            .with_output_dir("/tmp/out");

        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        // untouched defaults
        assert_eq!(config.stability_threshold, 4);
        assert_eq!(config.max_scroll_rounds, 50);
    }
}
