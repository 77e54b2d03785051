//! Settings-file loader.
//!
//! Reads the flat `KEY=value` settings a [`Configuration`] is built from.
//! Two formats are accepted, picked by extension:
//!
//! ```text
//! podgen.env     dotenv syntax: comments, quoting, `export KEY=value`
//! podgen.toml    same keys at top level; strings, booleans, integers,
//!                and string arrays
//! ```
//!
//! ```toml
//! CONTAINER_NAME = "web-terminal"
//! PORT = 7681
//! CLONE_ENABLED = true
//! CLONE_REPOS = ["https://github.com/org/one.git", "https://github.com/org/two.git"]
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use podgen_core::{
    application::ApplicationError,
    domain::{Configuration, keys},
    error::PodgenResult,
};

/// Loads settings from one file.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: PathBuf,
}

impl SettingsLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_toml(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
    }

    /// Raw key/value pairs in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load_pairs(&self) -> PodgenResult<Vec<(String, String)>> {
        let pairs = if self.is_toml() {
            self.read_toml()?
        } else {
            self.read_dotenv()?
        };
        debug!(count = pairs.len(), "Settings read");
        Ok(pairs)
    }

    /// Load and parse into a [`Configuration`]. Every unparseable value is
    /// reported together.
    pub fn load(&self) -> PodgenResult<Configuration> {
        let pairs = self.load_pairs()?;
        Configuration::from_pairs(pairs)
            .map_err(|errors| ApplicationError::InvalidSettings { errors }.into())
    }

    fn read_dotenv(&self) -> PodgenResult<Vec<(String, String)>> {
        let iter = dotenvy::from_path_iter(&self.path).map_err(|e| self.unreadable(e))?;
        iter.map(|item| item.map_err(|e| self.unreadable(e)))
            .collect()
    }

    fn read_toml(&self) -> PodgenResult<Vec<(String, String)>> {
        let raw = fs::read_to_string(&self.path).map_err(|e| self.unreadable(e))?;
        let table: toml::Table = toml::from_str(&raw).map_err(|e| self.unreadable(e))?;

        table
            .into_iter()
            .map(|(key, value)| -> PodgenResult<(String, String)> {
                let flat = flatten(&value).ok_or_else(|| ApplicationError::SettingsUnreadable {
                    path: self.path.clone(),
                    reason: format!("{key} must be a string, boolean, integer, or string array"),
                })?;
                Ok((key, flat))
            })
            .collect()
    }

    fn unreadable(&self, e: impl std::fmt::Display) -> podgen_core::error::PodgenError {
        ApplicationError::SettingsUnreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        }
        .into()
    }
}

fn flatten(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(|list| list.join(" ")),
        _ => None,
    }
}

/// Commented settings file written by `podgen init`.
pub fn settings_template(name: &str, port: u16) -> String {
    let mut out = String::from(
        "# podgen settings. Lists are separated by spaces or commas.\n\
         # Booleans accept true/false, yes/no, on/off, 1/0.\n",
    );

    let section = |out: &mut String, title: &str| {
        out.push('\n');
        out.push_str("# ");
        out.push_str(title);
        out.push('\n');
    };

    section(&mut out, "Identity (required)");
    out.push_str(&format!("{}={name}\n{}={port}\n", keys::CONTAINER_NAME, keys::PORT));

    section(&mut out, "Proxy used while building the image");
    for key in [
        keys::BUILD_PROXY_ENABLED,
        keys::BUILD_HTTP_PROXY,
        keys::BUILD_HTTPS_PROXY,
        keys::BUILD_NO_PROXY,
    ] {
        out.push_str(&commented(key));
    }

    section(&mut out, "Proxy exported inside the running container");
    for key in [
        keys::RUNTIME_PROXY_ENABLED,
        keys::RUNTIME_HTTP_PROXY,
        keys::RUNTIME_HTTPS_PROXY,
        keys::RUNTIME_NO_PROXY,
    ] {
        out.push_str(&commented(key));
    }

    section(&mut out, "Extra packages");
    out.push_str(&commented(keys::EXTRA_APT_PACKAGES));
    out.push_str(&commented(keys::EXTRA_PIP_PACKAGES));

    section(&mut out, "Repositories cloned into the image");
    for key in [keys::CLONE_ENABLED, keys::CLONE_REPOS, keys::CLONE_BASE_PATH] {
        out.push_str(&commented(key));
    }

    section(&mut out, "Registry publishing");
    for key in [
        keys::REGISTRY_ENABLED,
        keys::REGISTRY_HOST,
        keys::REGISTRY_USERNAME,
        keys::REGISTRY_TOKEN,
        keys::REGISTRY_REPOSITORY,
        keys::REGISTRY_TAG,
    ] {
        out.push_str(&commented(key));
    }

    out
}

fn commented(key: &str) -> String {
    let example = match key {
        k if k.ends_with("_ENABLED") => "false",
        k if k == keys::CLONE_BASE_PATH => podgen_core::domain::config::DEFAULT_CLONE_BASE_PATH,
        k if k == keys::REGISTRY_HOST => podgen_core::domain::config::DEFAULT_REGISTRY_HOST,
        _ => "",
    };
    format!("# {key}={example}\n")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use podgen_core::domain::Provenance;
    use podgen_core::error::{ErrorCategory, PodgenError};

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn dotenv_with_comments_quotes_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "podgen.env",
            "# identity\nexport CONTAINER_NAME=web-terminal\nPORT=\"7681\"\nEXTRA_APT_PACKAGES='jq htop'\n",
        );

        let config = SettingsLoader::new(&path).load().unwrap();
        assert_eq!(config.name(), "web-terminal");
        assert_eq!(config.port(), 7681);
        assert_eq!(config.packages.os.as_slice(), ["jq", "htop"]);
        assert_eq!(config.clone.base_path.provenance(), Provenance::Default);
    }

    #[test]
    fn toml_values_are_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "podgen.toml",
            r#"
CONTAINER_NAME = "web-terminal"
PORT = 7681
CLONE_ENABLED = true
CLONE_REPOS = ["https://host/a/one", "https://host/b/two"]
"#,
        );

        let config = SettingsLoader::new(&path).load().unwrap();
        assert!(config.clone.is_enabled());
        assert_eq!(config.clone.repositories.as_slice().len(), 2);
    }

    #[test]
    fn toml_tables_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "podgen.toml", "[registry]\nhost = \"x\"\n");
        assert!(SettingsLoader::new(&path).load_pairs().is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = SettingsLoader::new("/definitely/not/here.env")
            .load()
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn parse_errors_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "podgen.env", "PORT=http\nCLONE_ENABLED=maybe\n");

        match SettingsLoader::new(&path).load().unwrap_err() {
            PodgenError::Application(ApplicationError::InvalidSettings { errors }) => {
                assert_eq!(errors.len(), 2)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn template_round_trips_through_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "podgen.env", &settings_template("web-terminal", 7681));

        let config = SettingsLoader::new(&path).load().unwrap();
        assert_eq!(config.name(), "web-terminal");
        assert_eq!(config.port(), 7681);
        assert!(!config.registry.is_enabled());

        let text = settings_template("x", 1);
        for key in keys::ALL {
            assert!(text.contains(key), "{key} missing from template");
        }
    }
}
