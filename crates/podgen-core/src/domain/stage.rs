//! Stages and the instructions inside them.
//!
//! This is the data the composer produces and the build-manifest renderer
//! consumes. No conditional logic lives here.

use std::fmt;

/// Package manager an [`Instruction::InstallPackages`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Apt,
    Pip,
}

impl PackageManager {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Pip => "pip",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One build-manifest instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    SetEnvironment {
        key: String,
        value: String,
    },
    DeclareBuildArgument {
        key: String,
        default: String,
    },
    /// Packages are deduplicated and kept in a deterministic order.
    InstallPackages {
        manager: PackageManager,
        packages: Vec<String>,
    },
    RunCommand(String),
    CopyFromStage {
        stage: String,
        source: String,
        destination: String,
    },
    ExposePort(u16),
    SetWorkingDirectory(String),
    SetEntrypoint {
        executable: String,
        args: Vec<String>,
    },
}

impl Instruction {
    pub fn env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetEnvironment {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn arg(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self::DeclareBuildArgument {
            key: key.into(),
            default: default.into(),
        }
    }

    /// Install `packages`, dropping repeats but keeping first-seen order.
    pub fn install<I, S>(manager: PackageManager, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for package in packages {
            let package = package.into();
            if !unique.contains(&package) {
                unique.push(package);
            }
        }
        Self::InstallPackages {
            manager,
            packages: unique,
        }
    }

    pub fn run(command: impl Into<String>) -> Self {
        Self::RunCommand(command.into())
    }

    pub fn copy_from(
        stage: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self::CopyFromStage {
            stage: stage.into(),
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn entrypoint<I, S>(executable: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SetEntrypoint {
            executable: executable.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_proxy_related(&self) -> bool {
        match self {
            Self::SetEnvironment { key, .. } | Self::DeclareBuildArgument { key, .. } => {
                key.ends_with("_PROXY")
            }
            _ => false,
        }
    }
}

/// What a stage is built `FROM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    /// An external image reference.
    Image(String),
    /// A stage defined earlier in the same manifest.
    Stage(String),
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(image) => f.write_str(image),
            Self::Stage(name) => f.write_str(name),
        }
    }
}

/// One named phase of the build manifest.
///
/// Built once by the composer; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    name: String,
    parent: Parent,
    instructions: Vec<Instruction>,
}

impl Stage {
    pub(crate) fn new(name: impl Into<String>, parent: Parent) -> Self {
        Self {
            name: name.into(),
            parent,
            instructions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub(crate) fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) {
        self.instructions.extend(instructions);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The port of the stage's `ExposePort`, if it has one.
    pub fn exposed_port(&self) -> Option<u16> {
        self.instructions.iter().find_map(|i| match i {
            Instruction::ExposePort(port) => Some(*port),
            _ => None,
        })
    }

    /// Names of every build argument the stage declares.
    pub fn build_arguments(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::DeclareBuildArgument { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names of every environment variable the stage sets.
    pub fn environment_keys(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::SetEnvironment { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}
