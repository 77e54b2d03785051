//! Publish Service - tag the built image and push it to the registry.
//!
//! The versioned tag is pushed first, then `latest`. Each gets its own
//! outcome; a successful first push never hides a failed second one.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        error::PushError,
        ports::ContainerEngine,
        services::TagResolver,
    },
    domain::{Configuration, Tag, TagPair, contract::local_image, validate},
    error::PodgenResult,
};

/// What a push would do, resolved but not executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushPlan {
    pub local_image: String,
    pub registry: String,
    pub tags: TagPair,
    /// Full remote references, versioned first.
    pub references: Vec<String>,
}

/// Result of pushing one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutcome {
    pub tag: Tag,
    pub reference: String,
    pub error: Option<PushError>,
}

impl TagOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub plan: PushPlan,
    pub outcomes: Vec<TagOutcome>,
}

impl PushReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TagOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TagOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

pub struct PublishService {
    engine: Box<dyn ContainerEngine>,
    tags: TagResolver,
}

impl PublishService {
    pub fn new(engine: Box<dyn ContainerEngine>, tags: TagResolver) -> Self {
        Self { engine, tags }
    }

    /// Check the registry group and resolve tags and references.
    pub fn plan(&self, config: &Configuration) -> PodgenResult<PushPlan> {
        if !config.registry.is_enabled() {
            return Err(ApplicationError::RegistryDisabled.into());
        }

        let report = validate(config);
        if !report.is_valid() {
            return Err(ApplicationError::InvalidConfiguration {
                issues: report.errors().cloned().collect(),
            }
            .into());
        }

        let tags = self.tags.resolve_for(config);
        let remote = config.registry.remote_repository();
        let references = tags
            .in_push_order()
            .iter()
            .map(|tag| format!("{remote}:{tag}"))
            .collect();

        Ok(PushPlan {
            local_image: local_image(config.name()),
            registry: config.registry.host.as_str().to_owned(),
            tags,
            references,
        })
    }

    /// Log in, tag both references and push them in order.
    ///
    /// Returns `Ok` with per-tag outcomes even when pushes fail; `Err` is
    /// reserved for problems found before contacting the engine.
    #[instrument(skip_all, fields(name = %config.name()))]
    pub fn publish(&self, config: &Configuration) -> PodgenResult<PushReport> {
        let plan = self.plan(config)?;
        info!(image = %plan.local_image, version = %plan.tags.version, "Publishing");

        if let Err(e) = self.prepare(config, &plan) {
            warn!(error = %e, "Push aborted before any tag was sent");
            return Ok(self.fail_all(plan, e));
        }

        let outcomes = plan
            .tags
            .in_push_order()
            .into_iter()
            .zip(&plan.references)
            .map(|(tag, reference)| {
                let error = self.push_one(&plan.local_image, reference).err();
                match &error {
                    None => info!(reference = %reference, "Pushed"),
                    Some(e) => warn!(reference = %reference, error = %e, "Push failed"),
                }
                TagOutcome {
                    tag: tag.clone(),
                    reference: reference.clone(),
                    error,
                }
            })
            .collect();

        Ok(PushReport { plan, outcomes })
    }

    fn prepare(&self, config: &Configuration, plan: &PushPlan) -> Result<(), PushError> {
        if !self.engine.image_exists(&plan.local_image)? {
            return Err(PushError::ImageNotFound {
                image: plan.local_image.clone(),
            });
        }
        self.engine.login(
            &plan.registry,
            config.registry.username.as_str(),
            config.registry.token.as_str(),
        )
    }

    fn push_one(&self, local: &str, reference: &str) -> Result<(), PushError> {
        self.engine.tag(local, reference)?;
        self.engine.push(reference)
    }

    fn fail_all(&self, plan: PushPlan, error: PushError) -> PushReport {
        let outcomes = plan
            .tags
            .in_push_order()
            .into_iter()
            .zip(&plan.references)
            .map(|(tag, reference)| TagOutcome {
                tag: tag.clone(),
                reference: reference.clone(),
                error: Some(error.clone()),
            })
            .collect();
        PushReport { plan, outcomes }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mockall::predicate::*;

    use super::*;
    use crate::application::ports::{MockClock, MockContainerEngine, MockRevisionSource};
    use crate::error::{ErrorCategory, PodgenError};

    fn resolver() -> TagResolver {
        let mut revision = MockRevisionSource::new();
        revision
            .expect_short_revision()
            .returning(|| Some("abc1234".into()));
        let mut clock = MockClock::new();
        clock.expect_now().returning(|| {
            NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        });
        TagResolver::new(Box::new(revision), Box::new(clock))
    }

    fn config() -> Configuration {
        Configuration::builder()
            .name("web-terminal")
            .port(7681)
            .registry("alice", "s3cret", "terminal")
            .build()
    }

    fn ready_engine() -> MockContainerEngine {
        let mut engine = MockContainerEngine::new();
        engine.expect_image_exists().returning(|_| Ok(true));
        engine
            .expect_login()
            .with(eq("docker.io"), eq("alice"), eq("s3cret"))
            .returning(|_, _, _| Ok(()));
        engine.expect_tag().returning(|_, _| Ok(()));
        engine
    }

    #[test]
    fn disabled_registry_is_refused() {
        let service = PublishService::new(Box::new(MockContainerEngine::new()), resolver());
        let config = Configuration::builder().name("web-terminal").port(7681).build();
        let err = service.publish(&config).unwrap_err();
        assert!(matches!(
            err,
            PodgenError::Application(ApplicationError::RegistryDisabled)
        ));
    }

    #[test]
    fn incomplete_credentials_fail_validation() {
        let service = PublishService::new(Box::new(MockContainerEngine::new()), resolver());
        let config = Configuration::builder()
            .name("web-terminal")
            .port(7681)
            .registry("alice", "", "terminal")
            .build();
        assert_eq!(
            service.publish(&config).unwrap_err().category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn pushes_versioned_then_latest() {
        let mut engine = ready_engine();
        let mut seq = mockall::Sequence::new();
        engine
            .expect_push()
            .with(eq("docker.io/alice/terminal:abc1234"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        engine
            .expect_push()
            .with(eq("docker.io/alice/terminal:latest"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let service = PublishService::new(Box::new(engine), resolver());
        let report = service.publish(&config()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.plan.local_image, "web-terminal:latest");
        assert_eq!(report.outcomes.len(), 2);
        assert!(!report.outcomes[0].tag.is_latest);
    }

    #[test]
    fn second_failure_is_not_masked_by_first_success() {
        let mut engine = ready_engine();
        engine
            .expect_push()
            .with(eq("docker.io/alice/terminal:abc1234"))
            .returning(|_| Ok(()));
        engine
            .expect_push()
            .with(eq("docker.io/alice/terminal:latest"))
            .returning(|_| {
                Err(PushError::Network {
                    reason: "connection reset".into(),
                })
            });

        let service = PublishService::new(Box::new(engine), resolver());
        let report = service.publish(&config()).unwrap();

        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].tag.is_latest);
        assert!(report.outcomes[0].is_success());
    }

    #[test]
    fn missing_image_fails_both_tags_without_login() {
        let mut engine = MockContainerEngine::new();
        engine.expect_image_exists().returning(|_| Ok(false));
        engine.expect_login().never();
        engine.expect_push().never();

        let service = PublishService::new(Box::new(engine), resolver());
        let report = service.publish(&config()).unwrap();

        assert_eq!(report.failures().count(), 2);
        assert!(report.outcomes.iter().all(|o| matches!(
            o.error,
            Some(PushError::ImageNotFound { .. })
        )));
    }

    #[test]
    fn plan_uses_repository_namespace_when_given() {
        let service = PublishService::new(Box::new(MockContainerEngine::new()), resolver());
        let config = Configuration::builder()
            .name("web-terminal")
            .port(7681)
            .registry("alice", "s3cret", "team/terminal")
            .registry_host("ghcr.io")
            .build();

        let plan = service.plan(&config).unwrap();
        assert_eq!(
            plan.references,
            vec!["ghcr.io/team/terminal:abc1234", "ghcr.io/team/terminal:latest"]
        );
    }
}
