use anyhow::{anyhow, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Connection settings for one GitLab instance and project
#[derive(Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Instance root, e.g. https://gitlab.com
    pub gitlab_url: Option<String>,
    pub auth_token: Option<String>,
    pub project_id: Option<u64>,
    /// Act as this user (admin tokens only)
    pub sudo: Option<u64>,
}

/// Settings every API call needs, once validated
#[derive(Debug, PartialEq, Eq)]
pub struct Connection<'a> {
    pub gitlab_url: &'a str,
    pub auth_token: &'a str,
}

impl Config {
    /// Layer defaults, config files and `MARGE_*` environment variables.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let explicit_path = config_path.as_deref();
        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
        }

        for path in config_paths(explicit_path) {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
            .merge(Env::prefixed("MARGE_").ignore(&["config"]))
            .extract()
            .map_err(|e| anyhow!("Failed to load config: {}", e))
    }

    pub fn merge_with_cli(
        &mut self,
        gitlab_url: Option<String>,
        auth_token: Option<String>,
        project_id: Option<u64>,
    ) {
        if let Some(url) = gitlab_url {
            self.gitlab_url = Some(url);
        }
        if let Some(token) = auth_token {
            self.auth_token = Some(token);
        }
        if let Some(id) = project_id {
            self.project_id = Some(id);
        }
    }

    pub fn validate(&self) -> Result<Connection<'_>> {
        let gitlab_url = self.gitlab_url.as_deref().ok_or_else(|| {
            anyhow!("GitLab URL not configured. Set via --gitlab-url, MARGE_GITLAB_URL env var, or config file")
        })?;
        let auth_token = self.auth_token.as_deref().ok_or_else(|| {
            anyhow!("GitLab token not configured. Set via --auth-token, MARGE_AUTH_TOKEN env var, or config file")
        })?;

        Ok(Connection {
            gitlab_url,
            auth_token,
        })
    }

    pub fn require_project_id(&self) -> Result<u64> {
        self.project_id.ok_or_else(|| {
            anyhow!("Project not configured. Set via --project-id, MARGE_PROJECT_ID env var, or config file")
        })
    }
}

fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
        return paths;
    }

    if let Some(path) = get_project_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_xdg_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_local_config_path() {
        push_unique(&mut paths, path);
    }

    paths
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn get_project_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "marge").map(|d| d.config_dir().join("config.toml"))
}

fn get_xdg_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("marge").join("config.toml"));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("marge")
            .join("config.toml")
    })
}

fn get_local_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join("marge.toml"))
}
