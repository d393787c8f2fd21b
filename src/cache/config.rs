//! Cache policy: whether caching runs at all and how long each route lives.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::CacheSettings;

pub const SUGGESTIONS_PATH: &str = "/api/search/suggestions";
pub const POPULAR_PATH: &str = "/api/search/popular";

#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub enabled: bool,
    default_ttl: Duration,
    route_ttls: HashMap<&'static str, Duration>,
}

impl CachePolicy {
    pub fn new(enabled: bool, default_ttl: Duration) -> Self {
        Self {
            enabled,
            default_ttl,
            route_ttls: HashMap::new(),
        }
    }

    pub fn with_route(mut self, path: &'static str, ttl: Duration) -> Self {
        self.route_ttls.insert(path, ttl);
        self
    }

    /// TTL for a request path (query excluded). Overrides match the exact path.
    pub fn ttl_for(&self, path: &str) -> Duration {
        self.route_ttls
            .get(path)
            .copied()
            .unwrap_or(self.default_ttl)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}

impl From<&CacheSettings> for CachePolicy {
    fn from(settings: &CacheSettings) -> Self {
        Self::new(settings.enabled, settings.default_ttl)
            .with_route(SUGGESTIONS_PATH, settings.suggestions_ttl)
            .with_route(POPULAR_PATH, settings.popular_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_overrides_apply_to_exact_paths() {
        let policy = CachePolicy::default();
        assert_eq!(policy.ttl_for("/api/projects"), Duration::from_secs(300));
        assert_eq!(policy.ttl_for(SUGGESTIONS_PATH), Duration::from_secs(120));
        assert_eq!(policy.ttl_for(POPULAR_PATH), Duration::from_secs(3600));
        assert_eq!(
            policy.ttl_for("/api/search/popular/extra"),
            Duration::from_secs(300)
        );
    }
}
