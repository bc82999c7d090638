use crate::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "https://datastore.googleapis.com/v1";

pub const EMULATOR_HOST_ENV: &str = "DATASTORE_EMULATOR_HOST";
pub const PROJECT_ID_ENV: &str = "DATASTORE_PROJECT_ID";
pub const FALLBACK_PROJECT_ID_ENV: &str = "GOOGLE_CLOUD_PROJECT";
pub const NAMESPACE_ENV: &str = "DATASTORE_NAMESPACE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Cloud { base_url: String },
    /// Local emulator over plain http; requests carry no auth header.
    Emulator { host: String },
}

impl Endpoint {
    pub fn base_url(&self) -> String {
        match self {
            Self::Cloud { base_url } => base_url.trim_end_matches('/').to_string(),
            Self::Emulator { host } => format!("http://{}/v1", host.trim_end_matches('/')),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Cloud { .. })
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Cloud {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatastoreConfig {
    pub project_id: String,
    /// Empty means the default namespace.
    pub namespace: String,
    pub endpoint: Endpoint,
}

impl DatastoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            namespace: String::new(),
            endpoint: Endpoint::default(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.endpoint = Endpoint::Emulator { host: host.into() };
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint = Endpoint::Cloud {
            base_url: base_url.into(),
        };
        self
    }

    pub fn from_env(project_id: Option<&str>) -> ClientResult<Self> {
        Self::from_lookup(project_id, |name| std::env::var(name).ok())
    }

    /// Same resolution as [`DatastoreConfig::from_env`] over an arbitrary
    /// variable source. Blank values count as unset.
    pub fn from_lookup<F>(project_id: Option<&str>, lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let project_id = project_id
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
            .or_else(|| var(PROJECT_ID_ENV))
            .or_else(|| var(FALLBACK_PROJECT_ID_ENV))
            .ok_or_else(|| ClientError::Configuration("project id not set".to_string()))?;

        let mut config = Self::new(project_id);
        if let Some(namespace) = var(NAMESPACE_ENV) {
            config = config.with_namespace(namespace);
        }
        if let Some(host) = var(EMULATOR_HOST_ENV) {
            config = config.with_emulator_host(host);
        }
        Ok(config)
    }

    /// `{base}/projects/{project_id}:{operation}`
    pub fn endpoint_url(&self, operation: &str) -> String {
        format!(
            "{}/projects/{}:{operation}",
            self.endpoint.base_url(),
            self.project_id
        )
    }

    pub fn is_emulator(&self) -> bool {
        !self.endpoint.requires_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn endpoint_urls_follow_project_operation_shape() {
        let config = DatastoreConfig::new("p1");
        assert_eq!(
            config.endpoint_url("runQuery"),
            "https://datastore.googleapis.com/v1/projects/p1:runQuery"
        );

        let emulator = DatastoreConfig::new("p1").with_emulator_host("localhost:8081");
        assert_eq!(
            emulator.endpoint_url("commit"),
            "http://localhost:8081/v1/projects/p1:commit"
        );
        assert!(emulator.is_emulator());

        let custom = DatastoreConfig::new("p1").with_base_url("http://proxy.local/v1/");
        assert_eq!(
            custom.endpoint_url("lookup"),
            "http://proxy.local/v1/projects/p1:lookup"
        );
        assert!(!custom.is_emulator());
    }

    #[test]
    fn explicit_project_id_wins_over_environment() {
        let config = DatastoreConfig::from_lookup(
            Some("explicit"),
            lookup(&[(PROJECT_ID_ENV, "env-project")]),
        )
        .unwrap();
        assert_eq!(config.project_id, "explicit");
        assert_eq!(config.endpoint, Endpoint::default());
    }

    #[test]
    fn project_id_falls_back_through_variables() {
        let config = DatastoreConfig::from_lookup(
            None,
            lookup(&[(PROJECT_ID_ENV, "  "), (FALLBACK_PROJECT_ID_ENV, "gcp-project")]),
        )
        .unwrap();
        assert_eq!(config.project_id, "gcp-project");
    }

    #[test]
    fn emulator_and_namespace_come_from_environment() {
        let config = DatastoreConfig::from_lookup(
            None,
            lookup(&[
                (PROJECT_ID_ENV, "p1"),
                (NAMESPACE_ENV, "ns1"),
                (EMULATOR_HOST_ENV, "127.0.0.1:8081"),
            ]),
        )
        .unwrap();
        assert_eq!(config.namespace, "ns1");
        assert_eq!(
            config.endpoint,
            Endpoint::Emulator {
                host: "127.0.0.1:8081".to_string()
            }
        );
    }

    #[test]
    fn missing_project_id_is_a_configuration_error() {
        let error = DatastoreConfig::from_lookup(None, lookup(&[])).unwrap_err();
        assert!(matches!(error, ClientError::Configuration(message) if message == "project id not set"));
    }
}
