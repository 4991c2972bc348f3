use serde::Serialize;

/// How a container was obtained for a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Already cached, or produced by a concurrent request this one waited on.
    Hit,
    /// Computed by this request.
    Miss,
    /// A pre-built `.fastdog` file was served without touching the cache.
    Direct,
}

impl CacheStatus {
    /// Value of the `X-Cache-Status` response header.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Direct => "FASTDOG_DIRECT",
        }
    }
}

/// A consistent snapshot of cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// Finished containers currently held.
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Percentage of requests served without computing, `0.0` before any request.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        percentage(self.hits as f64, self.total_requests as f64)
    }

    /// Percentage of capacity in use.
    #[must_use]
    pub fn occupancy(&self) -> f64 {
        percentage(self.size as f64, self.capacity as f64)
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(1, 4, 25.0)]
    #[case(3, 3, 100.0)]
    fn hit_rate(#[case] hits: u64, #[case] total_requests: u64, #[case] expected: f64) {
        let stats = CacheStats { hits, total_requests, ..CacheStats::default() };
        assert_eq!(stats.hit_rate(), expected);
    }

    #[test]
    fn occupancy() {
        let stats = CacheStats { size: 5, capacity: 50, ..CacheStats::default() };
        assert_eq!(stats.occupancy(), 10.0);
        assert_eq!(CacheStats::default().occupancy(), 0.0);
    }

    #[test]
    fn status_header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.as_str(), "MISS");
        assert_eq!(CacheStatus::Direct.as_str(), "FASTDOG_DIRECT");
    }
}
