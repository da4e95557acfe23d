use std::net::IpAddr;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use url::Url;

use crate::auth::Credentials;
use crate::config::JenkinsConfig;
use crate::error::{ExporterError, Result};

use super::types::{Job, JobsResponse, Slot};

/// Fields requested for every build slot.
const BUILD_TREE: &str = "number,timestamp,duration,result,\
    actions[_class,queuingDurationMillis,totalDurationMillis,\
    skipCount,failCount,totalCount,passCount,\
    causes[_class,shortDescription]]";

/// Value of the `tree` query parameter selecting jobs and their seven build slots.
pub fn tree_query() -> String {
    let slots = Slot::ALL
        .iter()
        .map(|slot| format!("{}[{BUILD_TREE}]", slot.api_name()))
        .collect::<Vec<_>>()
        .join(",");
    format!("jobs[name,fullName,url,color,{slots}]")
}

/// Client for the Jenkins JSON API.
pub struct JenkinsClient {
    client: Client,
    api_url: Url,
    credentials: Option<Credentials>,
}

impl JenkinsClient {
    pub fn new(config: &JenkinsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jenkins-exporter/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExporterError::Config(format!("Failed to create HTTP client: {e}")))?;

        let credentials = Credentials::resolve(
            config.username.as_deref(),
            config.password.as_deref(),
            config.token.as_deref(),
        );
        if credentials.is_some() {
            debug!("Using Jenkins credentials");
        }

        Ok(Self {
            client,
            api_url: api_url(config)?,
            credentials,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Fetches every top-level job with its build slots.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx responses and bodies that are not a
    /// `{"jobs": [...]}` document.
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>> {
        debug!("Getting data from Jenkins API at {}", self.api_url.path());

        let mut request = self.client.get(self.api_url.clone());
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(credentials.username(), Some(credentials.secret()));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ExporterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let decoded: JobsResponse = serde_json::from_slice(&body)?;
        debug!("Jenkins API returned {} jobs", decoded.jobs.len());

        Ok(decoded.jobs)
    }
}

fn api_url(config: &JenkinsConfig) -> Result<Url> {
    let invalid_host = || ExporterError::Config(format!("Invalid Jenkins host: {}", config.host));

    let scheme = if config.ssl { "https" } else { "http" };
    let mut base = Url::parse(&format!("{scheme}://localhost"))
        .map_err(|e| ExporterError::Config(format!("Invalid Jenkins URL: {e}")))?;
    // Bare IPv6 literals are only accepted in bracketed form by the URL parser.
    match config.host.parse::<IpAddr>() {
        Ok(ip) => base.set_ip_host(ip).map_err(|()| invalid_host())?,
        Err(_) => base.set_host(Some(&config.host)).map_err(|_| invalid_host())?,
    }
    base.set_port(Some(config.port)).map_err(|()| invalid_host())?;

    let mut url = base
        .join(&config.path)
        .map_err(|e| ExporterError::Config(format!("Invalid Jenkins API path: {e}")))?;
    url.query_pairs_mut().append_pair("tree", &tree_query());

    Ok(url)
}
