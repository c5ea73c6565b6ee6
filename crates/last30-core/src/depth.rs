//! Depth presets.
//!
//! Each [`Depth`] maps to per-source result bounds for Phase 1, a per-seed
//! bound for Phase 2, and the small fixed counts that cap Phase 2 fan-out and
//! enrichment cost.

use serde::{Deserialize, Serialize};

use crate::enums::{Depth, SourceKind};

/// Inclusive result-count range requested from a source.
///
/// LLM-backed sources are asked for "between `min` and `max`" items; API
/// sources request `max`. Clients always truncate to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultBounds {
    pub min: usize,
    pub max: usize,
}

impl ResultBounds {
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Bounds with `min == max`.
    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: n }
    }
}

impl Depth {
    /// Phase 1 bounds for `source`.
    #[must_use]
    pub const fn discovery_bounds(self, source: SourceKind) -> ResultBounds {
        match (self, source) {
            (Self::Quick, SourceKind::Reddit | SourceKind::X) => ResultBounds::new(8, 12),
            (Self::Default, SourceKind::Reddit | SourceKind::X) => ResultBounds::new(20, 30),
            (Self::Deep, SourceKind::Reddit | SourceKind::X) => ResultBounds::new(50, 70),
            (Self::Quick, SourceKind::Youtube) => ResultBounds::exactly(10),
            (Self::Default, SourceKind::Youtube) => ResultBounds::exactly(20),
            (Self::Deep, SourceKind::Youtube) => ResultBounds::exactly(40),
            (Self::Quick, SourceKind::Web) => ResultBounds::exactly(8),
            (Self::Default, SourceKind::Web) => ResultBounds::exactly(15),
            (Self::Deep, SourceKind::Web) => ResultBounds::exactly(25),
        }
    }

    /// Phase 2 bounds for one targeted follow-up.
    #[must_use]
    pub const fn supplemental_bounds(self) -> ResultBounds {
        match self {
            Self::Quick => ResultBounds::new(3, 5),
            Self::Default => ResultBounds::new(5, 8),
            Self::Deep => ResultBounds::new(10, 15),
        }
    }

    /// Maximum number of entities that seed Phase 2.
    #[must_use]
    pub const fn entity_seeds(self) -> usize {
        match self {
            Self::Quick => 2,
            Self::Default => 3,
            Self::Deep => 5,
        }
    }

    /// Number of top YouTube findings that get a transcript lookup.
    #[must_use]
    pub const fn transcript_limit(self) -> usize {
        match self {
            Self::Quick => 3,
            Self::Default => 5,
            Self::Deep => 8,
        }
    }

    /// Number of natural-language questions sent to AI-overview web providers.
    #[must_use]
    pub const fn web_question_count(self) -> usize {
        match self {
            Self::Quick => 1,
            Self::Default => 2,
            Self::Deep => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SourceKind::Reddit)]
    #[case(SourceKind::X)]
    #[case(SourceKind::Youtube)]
    #[case(SourceKind::Web)]
    fn quick_is_smaller_than_deep(#[case] source: SourceKind) {
        let quick = Depth::Quick.discovery_bounds(source);
        let default = Depth::Default.discovery_bounds(source);
        let deep = Depth::Deep.discovery_bounds(source);
        assert!(quick.max < default.max);
        assert!(default.max < deep.max);
    }

    #[rstest]
    #[case(Depth::Quick)]
    #[case(Depth::Default)]
    #[case(Depth::Deep)]
    fn bounds_are_ordered(#[case] depth: Depth) {
        for source in SourceKind::ALL {
            let b = depth.discovery_bounds(source);
            assert!(b.min <= b.max, "{depth} {source}");
            assert!(b.min > 0);
        }
        let s = depth.supplemental_bounds();
        assert!(s.min <= s.max);
    }

    #[test]
    fn quick_reddit_matches_documented_range() {
        assert_eq!(
            Depth::Quick.discovery_bounds(SourceKind::Reddit),
            ResultBounds::new(8, 12)
        );
        assert_eq!(
            Depth::Deep.discovery_bounds(SourceKind::X),
            ResultBounds::new(50, 70)
        );
    }

    #[test]
    fn fan_out_caps_grow_with_depth() {
        assert!(Depth::Quick.entity_seeds() < Depth::Deep.entity_seeds());
        assert!(Depth::Quick.transcript_limit() < Depth::Deep.transcript_limit());
        assert_eq!(Depth::Default.web_question_count(), 2);
    }
}
