use std::error::Error as StdError;
use std::io;

use serde::de::DeserializeOwned;

use crate::config::Config;

use super::PackageRegistry;
use super::types::{CondaPackage, LookupError, PypiPackage};

/// Blocking JSON client for the Anaconda and PyPI APIs.
pub struct HttpRegistry {
    agent: ureq::Agent,
    anaconda_api: String,
    pypi_api: String,
}

impl HttpRegistry {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            anaconda_api: config.anaconda_api.trim_end_matches('/').to_string(),
            pypi_api: config.pypi_api.trim_end_matches('/').to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, LookupError> {
        log::debug!("GET {url}");
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(status, _) => LookupError::NotFound {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => {
                if is_timeout(&transport) {
                    LookupError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    LookupError::Connection {
                        url: url.to_string(),
                        reason: transport.to_string(),
                    }
                }
            }
        })?;

        response.into_json::<T>().map_err(|err| {
            if matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
                LookupError::Timeout {
                    url: url.to_string(),
                }
            } else {
                LookupError::Invalid {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            }
        })
    }
}

impl PackageRegistry for HttpRegistry {
    fn conda_url(&self, channel: &str, name: &str) -> String {
        format!("{}/{channel}/{name}", self.anaconda_api)
    }

    fn pypi_url(&self, name: &str) -> String {
        format!("{}/{name}/json", self.pypi_api)
    }

    fn conda_package(&self, channel: &str, name: &str) -> Result<CondaPackage, LookupError> {
        self.get_json(&self.conda_url(channel, name))
    }

    fn pypi_package(&self, name: &str) -> Result<PypiPackage, LookupError> {
        self.get_json(&self.pypi_url(name))
    }
}

/// Walk the error chain looking for an I/O timeout.
fn is_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>()
            && matches!(io_err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
        {
            return true;
        }
        current = e.source();
    }
    false
}
