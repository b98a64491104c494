use serde::{Deserialize, Serialize};
use tracing::warn;

/// Portfolio content served read-only by `GET /api/profile`.
///
/// Loaded once at startup from a TOML file; edits require a restart, which
/// is fine for a personal site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Portfolio Owner".to_string(),
            title: "Software Engineer".to_string(),
            summary: String::new(),
            links: Vec::new(),
            projects: Vec::new(),
            experience: Vec::new(),
        }
    }
}

impl Profile {
    /// Load the profile from `path`, falling back to the placeholder on any
    /// read or parse failure so a bad content file never prevents startup.
    pub fn load(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<Profile>(&raw) {
                Ok(profile) => profile,
                Err(err) => {
                    warn!(path, error = %err, "profile TOML did not parse, using placeholder");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path, error = %err, "profile file unreadable, using placeholder");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_profile_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("tmpfile");
        write!(
            file,
            r#"
name = "Ada"
title = "Developer"
summary = "Builds things."

[[links]]
label = "GitHub"
url = "https://github.com/ada"

[[projects]]
name = "Demo"
description = "A demo project"
tech = ["rust", "axum"]

[[experience]]
company = "Acme"
role = "Engineer"
period = "2022-2024"
highlights = ["shipped the thing"]
"#
        )
        .unwrap();

        let profile = Profile::load(Some(file.path().to_str().unwrap()));
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.projects.len(), 1);
        assert_eq!(profile.projects[0].tech, vec!["rust", "axum"]);
        assert_eq!(profile.experience[0].company, "Acme");
    }

    #[test]
    fn falls_back_on_missing_file() {
        let profile = Profile::load(Some("/nonexistent/profile.toml"));
        assert_eq!(profile.name, "Portfolio Owner");
    }

    #[test]
    fn no_path_gives_placeholder() {
        let profile = Profile::load(None);
        assert!(profile.projects.is_empty());
    }
}
