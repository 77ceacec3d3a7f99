//! Default configuration values

/// Default API server URL
pub fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

/// Default request timeout in seconds
pub const fn default_timeout() -> u64 {
    30
}

/// Directory under the config home holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "cloud-storage";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the API URL
pub const ENV_API_URL: &str = "CLOUD_STORAGE_API_URL";

/// Environment variable overriding the access token
pub const ENV_ACCESS_TOKEN: &str = "CLOUD_STORAGE_ACCESS_TOKEN";

/// Environment variable overriding the refresh token
pub const ENV_REFRESH_TOKEN: &str = "CLOUD_STORAGE_REFRESH_TOKEN";

/// Environment variable overriding the API key
pub const ENV_API_KEY: &str = "CLOUD_STORAGE_API_KEY";
