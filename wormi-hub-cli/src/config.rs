use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use wormi_hub_core::{
    forms::{FormKind, FormRelay},
    source::{DataSource, DirSource, HttpSource},
};

pub const DATA_DIR_ENV: &str = "WORMI_DATA_DIR";
pub const DATA_URL_ENV: &str = "WORMI_DATA_URL";
pub const DOWNLOAD_DIR_ENV: &str = "WORMI_DOWNLOAD_DIR";

const DEFAULT_DATA_DIR: &str = "data";

const RELAY_ENV: [(FormKind, &str); 3] = [
    (FormKind::Volunteer, "WORMI_VOLUNTEER_FORM_URL"),
    (FormKind::Host, "WORMI_HOST_FORM_URL"),
    (FormKind::Newsletter, "WORMI_NEWSLETTER_FORM_URL"),
];

/// Data source flags
pub struct DataOptions {
    pub data_dir: Option<String>,
    pub data_url: Option<String>,
}

impl DataOptions {
    /// Flags win over the environment; a URL wins over a directory.
    pub fn open(&self) -> Result<Box<dyn DataSource>> {
        if let Some(dir) = self.data_dir.clone() {
            return Ok(Box::new(DirSource::new(dir)));
        }

        if let Some(url) = self.data_url.clone().or_else(|| env_value(DATA_URL_ENV)) {
            tracing::debug!("using HTTP data source: {}", url);
            let source = HttpSource::new(url).context("failed to create HTTP data source")?;
            return Ok(Box::new(source));
        }

        let dir = env_value(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        tracing::debug!("using data directory: {}", dir);
        Ok(Box::new(DirSource::new(dir)))
    }
}

/// Where exported calendar files go
pub fn download_dir(out_dir: Option<String>) -> PathBuf {
    out_dir
        .or_else(|| env_value(DOWNLOAD_DIR_ENV))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Relay client with every endpoint found in the environment
pub fn form_relay() -> Result<FormRelay> {
    let client = reqwest_client()?;
    let relay = RELAY_ENV
        .iter()
        .fold(FormRelay::new(client), |relay, (kind, var)| {
            match env_value(var) {
                Some(url) => relay.with_endpoint(*kind, url),
                None => relay,
            }
        });
    Ok(relay)
}

fn reqwest_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("wormi-hub-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to create HTTP client")
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_out_dir_wins() {
        assert_eq!(download_dir(Some("exports".to_string())), PathBuf::from("exports"));
    }

    #[test]
    fn data_dir_flag_selects_directory_source() {
        let options = DataOptions {
            data_dir: Some("fixtures".to_string()),
            data_url: None,
        };
        assert_eq!(options.open().unwrap().describe(), "fixtures");
    }

    #[test]
    fn data_url_flag_selects_http_source() {
        let options = DataOptions {
            data_dir: None,
            data_url: Some("https://wormihub.org/data".to_string()),
        };
        assert_eq!(options.open().unwrap().describe(), "https://wormihub.org/data");
    }
}
