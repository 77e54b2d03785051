//! Orchestration-manifest (compose file) renderer.
//!
//! Built from the configuration directly, never from the rendered build
//! manifest. Every name shared with the build manifest comes from
//! `podgen_core::domain::contract`.

use serde::Serialize;
use tracing::instrument;

use podgen_core::{
    application::{ApplicationError, ports::OrchestrationRenderer},
    domain::{
        ArtifactKind, Configuration, ProxyGroup,
        contract::{
            BUILD_PROXY_ARGS, INTEGRATION_ENV_VARS, NETWORK_NAME, PROXY_ENV_VARS,
            RUNTIME_PROXY_ARGS, WORKSPACE_DIR, WORKSPACE_SOURCE, local_image,
        },
    },
    error::PodgenResult,
};

const HEADER: &str = "# Generated by podgen. Edit the settings file and regenerate instead.\n";

#[derive(Debug, Serialize)]
struct ComposeFile {
    services: Single<Service>,
    networks: Single<Network>,
}

/// A one-entry mapping; serialises as `{ key: value }` without pulling in a
/// map type whose ordering would need thought.
#[derive(Debug)]
struct Single<T> {
    key: String,
    value: T,
}

impl<T: Serialize> Serialize for Single<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

#[derive(Debug, Serialize)]
struct Service {
    image: String,
    container_name: String,
    build: Build,
    ports: Vec<String>,
    environment: Vec<String>,
    volumes: Vec<String>,
    networks: Vec<String>,
    restart: &'static str,
}

#[derive(Debug, Serialize)]
struct Build {
    context: &'static str,
    dockerfile: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Network {
    driver: &'static str,
}

/// Renders the compose file for one service.
#[derive(Debug, Clone)]
pub struct ComposeRenderer {
    build_manifest_name: String,
}

impl ComposeRenderer {
    /// `build_manifest_name` is the file the `build.dockerfile` key points at,
    /// relative to the compose file.
    pub fn new(build_manifest_name: impl Into<String>) -> Self {
        Self {
            build_manifest_name: build_manifest_name.into(),
        }
    }

    fn document(&self, config: &Configuration) -> ComposeFile {
        let name = config.name().to_owned();
        let port = config.port();

        ComposeFile {
            services: Single {
                key: name.clone(),
                value: Service {
                    image: local_image(&name),
                    container_name: name,
                    build: Build {
                        context: ".",
                        dockerfile: self.build_manifest_name.clone(),
                        args: build_args(config),
                    },
                    ports: vec![format!("{port}:{port}")],
                    environment: environment(config),
                    volumes: vec![format!("{WORKSPACE_SOURCE}:{WORKSPACE_DIR}")],
                    networks: vec![NETWORK_NAME.to_owned()],
                    restart: "unless-stopped",
                },
            },
            networks: Single {
                key: NETWORK_NAME.to_owned(),
                value: Network { driver: "bridge" },
            },
        }
    }
}

impl OrchestrationRenderer for ComposeRenderer {
    #[instrument(skip_all, fields(name = %config.name()))]
    fn render(&self, config: &Configuration) -> PodgenResult<String> {
        let body = serde_yaml::to_string(&self.document(config)).map_err(|e| {
            ApplicationError::RenderingFailed {
                artifact: ArtifactKind::OrchestrationManifest,
                reason: e.to_string(),
            }
        })?;
        Ok(format!("{HEADER}{body}"))
    }
}

/// Build arguments of the enabled proxy groups only, named exactly as the
/// build manifest declares them.
fn build_args(config: &Configuration) -> Vec<String> {
    let mut args = Vec::new();
    if config.build_proxy.is_enabled() {
        args.extend(assignments(&BUILD_PROXY_ARGS, &config.build_proxy));
    }
    if config.runtime_proxy.is_enabled() {
        args.extend(assignments(&RUNTIME_PROXY_ARGS, &config.runtime_proxy));
    }
    args
}

/// Integration variables pass through from the host; the proxy variables are
/// always present and fall back to empty strings.
fn environment(config: &Configuration) -> Vec<String> {
    let passthrough = INTEGRATION_ENV_VARS
        .iter()
        .map(|var| format!("{var}=${{{var}:-}}"));

    let proxy = if config.runtime_proxy.is_enabled() {
        assignments(&PROXY_ENV_VARS, &config.runtime_proxy)
    } else {
        PROXY_ENV_VARS.iter().map(|var| format!("{var}=")).collect()
    };

    passthrough.chain(proxy).collect()
}

fn assignments(names: &[&str; 3], group: &ProxyGroup) -> Vec<String> {
    names
        .iter()
        .zip(group.values())
        .map(|(name, value)| format!("{name}={}", escape_interpolation(value)))
        .collect()
}

/// Compose expands `$` in values; literal settings must not be expanded.
fn escape_interpolation(value: &str) -> String {
    value.replace('$', "$$")
}
