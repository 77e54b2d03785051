//! Stage composition.
//!
//! Turns a [`Configuration`] into the ordered stage list of the build
//! manifest: `base`, `build`, optionally `clone`, then `runtime`. Every stage
//! after `base` is parented to `base`, so the chain stays linear however the
//! optional stage is spliced in.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{
    config::{Configuration, ProxyGroup},
    contract::{
        BASE_IMAGE, BUILD_PROXY_ARGS, PROXY_ENV_VARS, RUNTIME_PROXY_ARGS, STAGE_BASE, STAGE_BUILD,
        STAGE_CLONE, STAGE_RUNTIME, TERMINAL_BINARY, WORKSPACE_DIR,
    },
    error::DomainError,
    stage::{Instruction, PackageManager, Parent, Stage},
};

/// Tools needed to compile the terminal server.
pub const BUILD_PACKAGES: &[&str] = &[
    "build-essential",
    "ca-certificates",
    "cmake",
    "git",
    "libjson-c-dev",
    "libwebsockets-dev",
    "pkg-config",
];

/// Minimal set needed to fetch repositories.
pub const CLONE_PACKAGES: &[&str] = &["ca-certificates", "git"];

/// Packages every runtime image gets before any extras.
pub const RUNTIME_PACKAGES: &[&str] = &[
    "ca-certificates",
    "git",
    "libjson-c5",
    "libwebsockets19t64",
    "locales",
    "python3",
    "python3-pip",
    "sudo",
    "tmux",
    "vim",
];

const TERMINAL_SOURCE: &str = "https://github.com/tsl0922/ttyd.git";
const TERMINAL_VERSION: &str = "1.7.7";
const TMUX_SESSION: &str = "main";

/// The ordered result of composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    stages: Vec<Stage>,
}

impl Composition {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name() == name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// True when every stage-parent refers to a stage defined before it and
    /// no name repeats.
    pub fn is_linear(&self) -> bool {
        let mut seen: Vec<&str> = Vec::new();
        for stage in &self.stages {
            if seen.contains(&stage.name()) {
                return false;
            }
            if let Parent::Stage(parent) = stage.parent() {
                if !seen.contains(&parent.as_str()) {
                    return false;
                }
            }
            seen.push(stage.name());
        }
        true
    }
}

/// Compose the build-manifest stages for `config`.
///
/// The configuration is expected to have passed validation; the only error
/// raised here is a clone destination that cannot be derived or that two
/// repositories share.
pub fn compose(config: &Configuration) -> Result<Composition, DomainError> {
    let mut stages = vec![base_stage(), build_stage(config)];

    if config.clone.is_enabled() {
        stages.push(clone_stage(config)?);
    }

    stages.push(runtime_stage(config));

    let composition = Composition { stages };
    debug_assert!(composition.is_linear());
    debug!(stages = ?composition.stage_names(), "Stages composed");

    Ok(composition)
}

/// Directory a repository is cloned into: the final URL path segment with a
/// trailing `.git` removed.
pub fn repository_dir_name(url: &str) -> Option<String> {
    let path = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let (_, tail) = path.trim_end_matches('/').rsplit_once('/')?;
    let name = tail.strip_suffix(".git").unwrap_or(tail);

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_owned())
    }
}

fn base_stage() -> Stage {
    let mut stage = Stage::new(STAGE_BASE, Parent::Image(BASE_IMAGE.to_owned()));
    stage.push(Instruction::env("DEBIAN_FRONTEND", "noninteractive"));
    stage
}

fn build_stage(config: &Configuration) -> Stage {
    let mut stage = Stage::new(STAGE_BUILD, Parent::Stage(STAGE_BASE.to_owned()));

    if config.build_proxy.is_enabled() {
        stage.extend(proxy_instructions(&config.build_proxy, BUILD_PROXY_ARGS));
    }

    stage.push(Instruction::install(
        PackageManager::Apt,
        BUILD_PACKAGES.iter().copied(),
    ));
    stage.push(Instruction::run(format!(
        "git clone --depth 1 --branch {TERMINAL_VERSION} {TERMINAL_SOURCE} /tmp/ttyd \
         && cmake -S /tmp/ttyd -B /tmp/ttyd/build \
         && cmake --build /tmp/ttyd/build \
         && cmake --install /tmp/ttyd/build"
    )));

    stage
}

fn clone_stage(config: &Configuration) -> Result<Stage, DomainError> {
    let mut stage = Stage::new(STAGE_CLONE, Parent::Stage(STAGE_BASE.to_owned()));

    // Cloning happens at build time, so it goes through the build proxy.
    if config.build_proxy.is_enabled() {
        stage.extend(proxy_instructions(&config.build_proxy, BUILD_PROXY_ARGS));
    }

    stage.push(Instruction::install(
        PackageManager::Apt,
        CLONE_PACKAGES.iter().copied(),
    ));

    let base_path = clone_base_path(config);
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();

    for url in config.clone.repositories.as_slice() {
        let name = repository_dir_name(url)
            .ok_or_else(|| DomainError::UnderivableRepositoryName { url: url.clone() })?;

        if let Some(first) = claimed.get(&name) {
            return Err(DomainError::RepositoryNameCollision {
                name,
                first: (*first).to_owned(),
                second: url.clone(),
            });
        }

        stage.push(Instruction::run(format!(
            "git clone --depth 1 {url} {base_path}/{name}"
        )));
        claimed.insert(name, url);
    }

    Ok(stage)
}

fn runtime_stage(config: &Configuration) -> Stage {
    let mut stage = Stage::new(STAGE_RUNTIME, Parent::Stage(STAGE_BASE.to_owned()));

    if config.runtime_proxy.is_enabled() {
        stage.extend(proxy_instructions(&config.runtime_proxy, RUNTIME_PROXY_ARGS));
    }

    stage.push(Instruction::install(
        PackageManager::Apt,
        RUNTIME_PACKAGES
            .iter()
            .map(|p| (*p).to_owned())
            .chain(config.packages.os.as_slice().iter().cloned()),
    ));

    let language_packages = config.packages.language.as_slice();
    if !language_packages.is_empty() {
        stage.push(Instruction::install(
            PackageManager::Pip,
            language_packages.iter().cloned(),
        ));
    }

    stage.push(Instruction::copy_from(
        STAGE_BUILD,
        TERMINAL_BINARY,
        TERMINAL_BINARY,
    ));

    if config.clone.is_enabled() {
        let base_path = clone_base_path(config);
        stage.push(Instruction::copy_from(STAGE_CLONE, base_path, base_path));
    }

    stage.push(Instruction::run(format!("mkdir -p {WORKSPACE_DIR}")));
    stage.push(Instruction::SetWorkingDirectory(WORKSPACE_DIR.to_owned()));
    stage.push(Instruction::ExposePort(config.port()));

    let port = config.port().to_string();
    stage.push(Instruction::entrypoint(
        "ttyd",
        [
            "--writable",
            "--port",
            port.as_str(),
            "tmux",
            "new-session",
            "-A",
            "-s",
            TMUX_SESSION,
        ],
    ));

    stage
}

/// Declare the group's URLs as build arguments, then export them under the
/// standard proxy variable names.
fn proxy_instructions(group: &ProxyGroup, arg_names: [&str; 3]) -> Vec<Instruction> {
    let declared = arg_names
        .iter()
        .zip(group.values())
        .map(|(name, value)| Instruction::arg(*name, value));

    let exported = PROXY_ENV_VARS
        .iter()
        .zip(arg_names)
        .map(|(env, arg)| Instruction::env(*env, format!("${{{arg}}}")));

    declared.chain(exported).collect()
}

fn clone_base_path(config: &Configuration) -> &str {
    let path = config.clone.base_path.as_str().trim_end_matches('/');
    if path.is_empty() { "/" } else { path }
}
