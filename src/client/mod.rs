//! Authenticated HTTP transport for the storage API
//!
//! [`ApiClient`] owns one immutable [`ClientConfig`] and a blocking `reqwest`
//! client. Every operation resolves its URL against the configured base,
//! attaches the active credential, and turns failure statuses into
//! [`ApiError`] before any attempt is made to decode the body.

pub mod api_error;
pub mod credential;
pub mod download;
pub mod upload;

pub use api_error::ApiError;
pub use credential::{ClientConfig, Credential, API_KEY_HEADER, AUTHORIZATION_HEADER};

use crate::error::{CliError, Result};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

const APPLICATION_JSON: &str = "application/json";
const ACCEPT_ANY: &str = "*/*";

/// Blocking client for the storage API
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client from a resolved configuration
    ///
    /// # Errors
    ///
    /// Returns [`CliError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("cloud-storage-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::ClientBuild(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Configuration this client was built with
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a request path against the base URL.
    ///
    /// Trailing slashes are stripped from the base and a leading slash is
    /// added to the path when missing.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidUrl`] if the result is not a valid URL.
    pub fn build_url(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url().trim_end_matches('/');
        let full = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };

        Url::parse(&full).map_err(|e| CliError::InvalidUrl {
            url: full,
            reason: e.to_string(),
        })
    }

    /// GET `path` and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Api`] for failure statuses, or a construction,
    /// transport or decoding error.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send_json::<()>(Method::GET, path, None)?;
        decode_json(response)
    }

    /// POST an optional JSON body to `path` and decode the JSON response
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`]; also fails if `body` cannot be serialized.
    pub fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_json(Method::POST, path, body)?;
        decode_json(response)
    }

    /// POST an optional JSON body to `path`, ignoring the response body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub fn post_discard<B>(&self, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body).map(drop)
    }

    /// PUT a JSON body to `path` and decode the JSON response
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_json(Method::PUT, path, Some(body))?;
        decode_json(response)
    }

    /// PUT a JSON body to `path`, ignoring the response body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub fn put_discard<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, Some(body)).map(drop)
    }

    /// DELETE `path`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub fn delete(&self, path: &str) -> Result<()> {
        self.send_json::<()>(Method::DELETE, path, None).map(drop)
    }

    /// Upload `local_file` as a multipart form to `path`
    ///
    /// `folder_path` and `filename` are sent as the `folderPath` and
    /// `filename` form fields when non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::FileError`] if the file cannot be read, otherwise
    /// the same errors as [`ApiClient::post`].
    pub fn upload_file<T: DeserializeOwned>(
        &self,
        path: &str,
        local_file: &Path,
        folder_path: Option<&str>,
        filename: Option<&str>,
    ) -> Result<T> {
        let form = upload::build_form(local_file, folder_path, filename)?;
        let url = self.build_url(path)?;

        let request = self
            .http
            .post(url.clone())
            .header(ACCEPT, APPLICATION_JSON)
            .multipart(form);

        let response = self.execute(&Method::POST, &url, request)?;
        decode_json(response)
    }

    /// Download `path` to disk and return where the file was saved
    ///
    /// `output` may be an existing directory, an explicit file path, or
    /// empty for the current directory; see
    /// [`download::resolve_destination`].
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Api`] for failure statuses, [`CliError::DirError`]
    /// or [`CliError::FileError`] if the output cannot be created or
    /// written, or a transport error.
    pub fn download_file(&self, path: &str, output: &Path) -> Result<PathBuf> {
        let url = self.build_url(path)?;
        let request = self.http.get(url.clone()).header(ACCEPT, ACCEPT_ANY);
        let response = self.execute(&Method::GET, &url, request)?;

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        let filename = download::resolve_filename(content_disposition.as_deref(), path);
        let destination = download::resolve_destination(output, &filename)?;

        download::write_body(response, &destination)?;
        Ok(destination)
    }

    fn send_json<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path)?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON);

        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| CliError::SerializationError(e.to_string()))?;
            request = request.body(payload);
        }

        self.execute(&method, &url, request)
    }

    /// Attach credentials, send, and split failure statuses off into
    /// [`ApiError`].
    fn execute(&self, method: &Method, url: &Url, request: RequestBuilder) -> Result<Response> {
        debug!("{method} {url}");

        let response = self
            .config
            .credential()
            .apply(request)
            .send()
            .map_err(|e| CliError::from_transport(method, url.as_str(), &e))?;

        let status = response.status();
        debug!("{method} {url} -> {status}");

        if status.is_client_error() || status.is_server_error() {
            let err = ApiError::from_response(response, method.as_str(), url.as_str());
            warn!("{err}");
            return Err(err.into());
        }

        Ok(response)
    }
}

fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response
        .bytes()
        .map_err(|e| CliError::ResponseRead(e.to_string()))?;
    Ok(serde_json::from_slice(&body)?)
}
