use tracing::{debug, instrument};

use crate::{
    application::ports::{Clock, RevisionSource},
    domain::{Configuration, TagPair, resolve_version_tag},
};

/// Resolves the tag pair for a push from the revision source, the configured
/// tag and the clock. Nothing is cached: every call looks again.
pub struct TagResolver {
    revision: Box<dyn RevisionSource>,
    clock: Box<dyn Clock>,
}

impl TagResolver {
    pub fn new(revision: Box<dyn RevisionSource>, clock: Box<dyn Clock>) -> Self {
        Self { revision, clock }
    }

    #[instrument(skip(self))]
    pub fn resolve(&self, explicit: &str) -> TagPair {
        let revision = self.revision.short_revision();
        let pair = resolve_version_tag(revision.as_deref(), explicit, self.clock.now());
        debug!(version = %pair.version, source = %pair.source, "Version tag resolved");
        pair
    }

    /// Resolve using `REGISTRY_TAG` as the explicit tag.
    pub fn resolve_for(&self, config: &Configuration) -> TagPair {
        self.resolve(config.registry.tag.as_str())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::application::ports::{MockClock, MockRevisionSource};
    use crate::domain::TagSource;

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().returning(|| {
            NaiveDate::from_ymd_opt(2026, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap()
        });
        clock
    }

    #[test]
    fn hash_beats_explicit_tag_and_clock() {
        let mut revision = MockRevisionSource::new();
        revision
            .expect_short_revision()
            .returning(|| Some("9f8e7d6".into()));

        let resolver = TagResolver::new(Box::new(revision), Box::new(clock()));
        let config = Configuration::builder()
            .registry("alice", "t", "terminal")
            .registry_tag("v2")
            .build();

        let pair = resolver.resolve_for(&config);
        assert_eq!(pair.version.as_str(), "9f8e7d6");
        assert_eq!(pair.source, TagSource::Revision);
    }

    #[test]
    fn falls_back_to_timestamp_outside_a_repository() {
        let mut revision = MockRevisionSource::new();
        revision.expect_short_revision().returning(|| None);

        let resolver = TagResolver::new(Box::new(revision), Box::new(clock()));
        let pair = resolver.resolve("");
        assert_eq!(pair.version.as_str(), "20260102-030405");
        assert!(pair.latest.is_latest);
    }

    #[test]
    fn every_call_looks_up_the_revision_again() {
        let mut revision = MockRevisionSource::new();
        revision.expect_short_revision().times(2).returning(|| None);

        let resolver = TagResolver::new(Box::new(revision), Box::new(clock()));
        resolver.resolve("v1");
        resolver.resolve("v1");
    }
}
