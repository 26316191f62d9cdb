use crate::{Problem, Settings};
use std::path::PathBuf;
use std::time::Duration;

/// Maximum number of events returned by `Client::recent_events`.
pub const RECENT_EVENTS_LIMIT: u32 = 1000;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("reading CA file {path:?}")]
    CaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("loading certificates of CA file {path:?}")]
    Certificate {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
    #[error("CA file {path:?} holds no PEM certificates")]
    NoCertificates { path: PathBuf },
    #[error("building the API HTTP client")]
    Build(#[source] reqwest::Error),
    #[error("{method} request failed")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned HTTP {status}: {body}")]
    Status {
        method: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{method} returned a malformed response")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{method} failed: {error}")]
    Api { method: String, error: RpcError },
    #[error("{method} returned neither a result nor an error")]
    MissingResult { method: String },
}

/// Error object of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: String,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} (code {})", self.message, self.data, self.code)
    }
}

#[derive(serde::Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    auth: &'a str,
    id: u32,
}

#[derive(serde::Deserialize)]
struct Response<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

/// Client of a Zabbix JSON-RPC API endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    url: url::Url,
    token: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Build a Client from Settings, applying its TLS options.
    /// Requests fail after `timeout`.
    pub fn from_settings(settings: &Settings, timeout: Duration) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().timeout(timeout);

        match (settings.verify_tls, &settings.cafile) {
            (true, Some(path)) => {
                let pem = std::fs::read(path).map_err(|source| Error::CaFile {
                    path: path.clone(),
                    source,
                })?;
                let certs = reqwest::Certificate::from_pem_bundle(&pem).map_err(|source| {
                    Error::Certificate {
                        path: path.clone(),
                        source,
                    }
                })?;
                if certs.is_empty() {
                    return Err(Error::NoCertificates { path: path.clone() });
                }

                builder = builder.tls_built_in_root_certs(false);
                for cert in certs {
                    builder = builder.add_root_certificate(cert);
                }
            }
            (true, None) => {}
            (false, _) => {
                tracing::warn!(url = %settings.url, "TLS certificate verification is disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        Ok(Self {
            url: settings.url.clone(),
            token: settings.token.clone(),
            http_client: builder.build().map_err(Error::Build)?,
        })
    }

    /// Invoke `method` with `params`, returning its decoded `result`.
    #[tracing::instrument(skip(self, params), err)]
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, Error>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let request = Request {
            jsonrpc: "2.0",
            method,
            params,
            auth: &self.token,
            id: 1,
        };

        let response = self
            .http_client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json-rpc")
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::Transport {
                method: method.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Transport {
            method: method.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(Error::Status {
                method: method.to_string(),
                status,
                body,
            });
        }

        let response: Response<R> =
            serde_json::from_str(&body).map_err(|source| Error::Decode {
                method: method.to_string(),
                source,
            })?;

        match response {
            Response {
                error: Some(error), ..
            } => Err(Error::Api {
                method: method.to_string(),
                error,
            }),
            Response {
                result: Some(result),
                ..
            } => Ok(result),
            Response { result: None, .. } => Err(Error::MissingResult {
                method: method.to_string(),
            }),
        }
    }

    /// Fetch up to RECENT_EVENTS_LIMIT trigger events with a clock in
    /// `[time_from, time_till]` (unix seconds), newest first.
    pub async fn recent_events(
        &self,
        time_from: i64,
        time_till: i64,
    ) -> Result<Vec<Problem>, Error> {
        self.call(
            "event.get",
            serde_json::json!({
                "output": ["eventid", "name", "severity", "clock", "value"],
                "time_from": time_from,
                "time_till": time_till,
                "selectHosts": ["host"],
                "selectTags": ["tag", "value"],
                "source": 0, // Trigger events.
                "sortfield": ["clock"],
                "sortorder": "DESC",
                "limit": RECENT_EVENTS_LIMIT,
            }),
        )
        .await
    }

    /// Fetch current problems, including recently resolved ones.
    pub async fn current_problems(&self) -> Result<Vec<Problem>, Error> {
        self.call(
            "problem.get",
            serde_json::json!({
                "output": "extend",
                "selectHosts": ["host"],
                "selectTags": ["tag", "value"],
                "recent": true,
            }),
        )
        .await
    }
}
