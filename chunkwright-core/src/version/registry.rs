use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::features::{Feature, FeatureTable};
use crate::error::{ChunkError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Java,
    Bedrock,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Java => f.write_str("java"),
            Platform::Bedrock => f.write_str("bedrock"),
        }
    }
}

impl FromStr for Platform {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(Platform::Java),
            "bedrock" => Ok(Platform::Bedrock),
            other => Err(ChunkError::value(format!("unknown platform {other:?}"))),
        }
    }
}

/// Half-open version range `[start, end)`; `end: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionRange {
    start: i32,
    end: Option<i32>,
}

impl VersionRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end: Some(end) }
    }

    pub const fn starting_at(start: i32) -> Self {
        Self { start, end: None }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> Option<i32> {
        self.end
    }

    pub fn contains(&self, version: i32) -> bool {
        version >= self.start && self.end.is_none_or(|end| version < end)
    }

    /// Number of versions covered; used to rank matches.
    fn width(&self) -> u64 {
        match self.end {
            Some(end) => (end as i64 - self.start as i64).max(0) as u64,
            None => u64::MAX,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {end})", self.start),
            None => write!(f, "[{}, ..)", self.start),
        }
    }
}

/// A resolved version interface. Immutable once registered.
#[derive(Debug, Serialize)]
pub struct VersionInterface {
    name: String,
    platform: Platform,
    range: VersionRange,
    features: FeatureTable,
}

impl VersionInterface {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn range(&self) -> VersionRange {
        self.range
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    pub fn matches(&self, platform: Platform, version: i32) -> bool {
        self.platform == platform && self.range.contains(version)
    }
}

struct Entry {
    seq: usize,
    interface: Arc<VersionInterface>,
}

/// Every known version interface, kept most-specific-first.
///
/// Built once at startup and then only read, so it can be shared between
/// threads behind an `Arc`.
#[derive(Default)]
pub struct VersionRegistry {
    entries: Vec<Entry>,
    next_seq: usize,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interface whose table is `parent`'s (or the default
    /// table) with `overrides` folded on top.
    pub fn register(
        &mut self,
        platform: Platform,
        name: impl Into<String>,
        range: VersionRange,
        overrides: impl IntoIterator<Item = Feature>,
        parent: Option<&VersionInterface>,
    ) -> Arc<VersionInterface> {
        let name = name.into();
        let features = match parent {
            Some(parent) => parent.features.with(overrides),
            None => FeatureTable::default().with(overrides),
        };
        if let Some(parent) = parent {
            if parent.platform != platform {
                log::warn!("{name} ({platform}) inherits from {} ({})", parent.name, parent.platform);
            }
        }
        log::debug!("registered {platform} interface {name} for {range}");

        let interface = Arc::new(VersionInterface {
            name,
            platform,
            range,
            features,
        });
        self.entries.push(Entry {
            seq: self.next_seq,
            interface: Arc::clone(&interface),
        });
        self.next_seq += 1;
        // narrowest range first, newest registration breaks ties
        self.entries
            .sort_by_key(|e| (e.interface.range.width(), std::cmp::Reverse(e.seq)));
        interface
    }

    /// First interface, most specific first, whose range holds `version`.
    pub fn resolve(&self, platform: Platform, version: i32) -> Result<Arc<VersionInterface>> {
        self.entries
            .iter()
            .find(|e| e.interface.matches(platform, version))
            .map(|e| Arc::clone(&e.interface))
            .ok_or(ChunkError::UnsupportedVersion { platform, version })
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Arc<VersionInterface>> {
        self.entries.iter().map(|e| &e.interface)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitpack::PackLayout;
    use crate::version::features::StatusFormat;

    #[test]
    fn test_child_range_resolution() {
        let mut registry = VersionRegistry::new();
        let a = registry.register(
            Platform::Java,
            "a",
            VersionRange::new(1444, 1466),
            [Feature::Status(StatusFormat::Plain)],
            None,
        );
        let a_prime = registry.register(
            Platform::Java,
            "a_prime",
            VersionRange::new(1466, 1480),
            [Feature::LongArray(PackLayout::Sparse)],
            Some(&a),
        );

        assert!(Arc::ptr_eq(&registry.resolve(Platform::Java, 1450).unwrap(), &a));
        assert!(Arc::ptr_eq(&registry.resolve(Platform::Java, 1470).unwrap(), &a_prime));
        assert!(matches!(
            registry.resolve(Platform::Java, 2000),
            Err(ChunkError::UnsupportedVersion { platform: Platform::Java, version: 2000 })
        ));

        // the child inherits what it does not override
        assert_eq!(a_prime.features().status(), StatusFormat::Plain);
        assert_eq!(a_prime.features().long_array(), PackLayout::Sparse);
        assert_eq!(a.features().long_array(), PackLayout::Dense);
    }

    #[test]
    fn test_most_specific_wins() {
        let mut registry = VersionRegistry::new();
        registry.register(Platform::Java, "wide", VersionRange::starting_at(100), [], None);
        registry.register(Platform::Java, "narrow", VersionRange::new(150, 160), [], None);
        assert_eq!(registry.resolve(Platform::Java, 155).unwrap().name(), "narrow");
        assert_eq!(registry.resolve(Platform::Java, 165).unwrap().name(), "wide");
        assert_eq!(registry.resolve(Platform::Java, 1_000_000).unwrap().name(), "wide");
    }

    #[test]
    fn test_same_width_newest_wins() {
        let mut registry = VersionRegistry::new();
        registry.register(Platform::Java, "old", VersionRange::new(0, 10), [], None);
        registry.register(Platform::Java, "new", VersionRange::new(0, 10), [], None);
        assert_eq!(registry.resolve(Platform::Java, 5).unwrap().name(), "new");
    }

    #[test]
    fn test_platforms_are_separate() {
        let mut registry = VersionRegistry::new();
        registry.register(Platform::Bedrock, "b", VersionRange::new(0, 30), [], None);
        assert!(registry.resolve(Platform::Bedrock, 9).is_ok());
        assert!(registry.resolve(Platform::Java, 9).is_err());
    }

    #[test]
    fn test_range_bounds() {
        let range = VersionRange::new(1444, 1466);
        assert!(!range.contains(1443));
        assert!(range.contains(1444));
        assert!(range.contains(1465));
        assert!(!range.contains(1466));
        assert_eq!(range.to_string(), "[1444, 1466)");
        assert_eq!(VersionRange::starting_at(2844).to_string(), "[2844, ..)");
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("Java".parse::<Platform>().unwrap(), Platform::Java);
        assert_eq!("bedrock".parse::<Platform>().unwrap(), Platform::Bedrock);
        assert!("console".parse::<Platform>().is_err());
    }
}
