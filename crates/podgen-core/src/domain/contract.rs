//! Names and paths both manifests must agree on.
//!
//! The build manifest and the orchestration manifest are rendered
//! independently; anything that appears in both is defined once here.

/// External image the base stage is built from.
pub const BASE_IMAGE: &str = "docker.io/library/ubuntu:24.04";

pub const STAGE_BASE: &str = "base";
pub const STAGE_BUILD: &str = "build";
pub const STAGE_CLONE: &str = "clone";
pub const STAGE_RUNTIME: &str = "runtime";

/// Working directory inside the image; also the volume mount target.
pub const WORKSPACE_DIR: &str = "/workspace";

/// Host side of the workspace volume, relative to the compose file.
pub const WORKSPACE_SOURCE: &str = "./workspace";

/// Where the build stage installs the terminal server.
pub const TERMINAL_BINARY: &str = "/usr/local/bin/ttyd";

/// Build arguments declared when the build proxy group is enabled.
pub const BUILD_PROXY_ARGS: [&str; 3] = ["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY"];

/// Build arguments declared when the runtime proxy group is enabled.
pub const RUNTIME_PROXY_ARGS: [&str; 3] =
    ["RUNTIME_HTTP_PROXY", "RUNTIME_HTTPS_PROXY", "RUNTIME_NO_PROXY"];

/// Environment variables the running container reads its proxy from.
pub const PROXY_ENV_VARS: [&str; 3] = ["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY"];

/// Host variables always passed through to the container.
pub const INTEGRATION_ENV_VARS: [&str; 3] = ["ANTHROPIC_API_KEY", "OPENAI_API_KEY", "GITHUB_TOKEN"];

/// Network the service joins.
pub const NETWORK_NAME: &str = "terminal";

/// Local image reference the build produces for a given name.
pub fn local_image(name: &str) -> String {
    format!("{name}:latest")
}
