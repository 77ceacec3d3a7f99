//! Command handlers
//!
//! Each handler resolves configuration, calls one API wrapper and prints the
//! result to stdout as pretty JSON. Diagnostics go through the logger.

use crate::api::{api_keys, auth, batches, files, folders};
use crate::cli::{
    ApiKeyCommand, AuthCommand, BatchCommand, Cli, Commands, ConfigCommand, FileCommand,
    FolderCommand, PageArgs,
};
use crate::client::ApiClient;
use crate::config::{is_sensitive_key, mask_value, Config, ConfigKey};
use crate::error::CliError;
use anyhow::{Context as _, Result};
use console::Term;
use dialoguer::{Confirm, Password};
use log::{debug, warn};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Configuration for one invocation
#[derive(Debug)]
pub struct Context {
    config_path: PathBuf,
    /// Contents of the config file, written back when settings change
    file_config: Config,
    /// File contents with environment and flag overrides applied
    resolved: Config,
}

impl Context {
    /// Load the config file and apply overrides from the environment and
    /// `--api-url`.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be located, read or parsed.
    pub fn load(config_path: Option<&Path>, api_url: Option<&str>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Config::config_path()?,
        };
        let file_config = Config::load(Some(&config_path))
            .with_context(|| format!("failed to load {}", config_path.display()))?;

        let mut resolved = file_config.clone().with_env_overrides();
        if let Some(url) = api_url.filter(|url| !url.is_empty()) {
            resolved.api_url = url.to_string();
        }
        debug!("Using API at {}", resolved.api_url);

        Ok(Self {
            config_path,
            file_config,
            resolved,
        })
    }

    /// Build a client from the resolved settings
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the HTTP client cannot be built.
    pub fn client(&self) -> Result<ApiClient> {
        self.resolved.validate()?;
        Ok(ApiClient::new(self.resolved.client_config())?)
    }

    fn save(&self) -> Result<()> {
        self.file_config
            .save_to(&self.config_path)
            .context("failed to save configuration")
    }
}

/// Run the parsed command line
///
/// # Errors
///
/// Returns the first error from configuration, validation or the API.
pub fn execute(cli: Cli) -> Result<()> {
    let mut context = Context::load(cli.config.as_deref(), cli.api_url.as_deref())?;

    match cli.command {
        Commands::Auth(command) => handle_auth(&mut context, command),
        Commands::File(command) => handle_file(&context, command),
        Commands::Folder(command) => handle_folder(&context, command),
        Commands::Apikey(command) => handle_apikey(&context, command),
        Commands::Batch(command) => handle_batch(&context, command),
        Commands::Config(command) => handle_config(&mut context, command),
    }
}

fn handle_auth(context: &mut Context, command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login { username, password } => {
            let password = resolve_password(password)?;
            let response = auth::login(&context.client()?, &username, &password)
                .context("login failed")?;

            context
                .file_config
                .save_tokens(&response.access_token, Some(response.refresh_token.as_str()));
            context.save()?;
            print_json(&response.user)
        }
        AuthCommand::Register {
            username,
            email,
            password,
        } => {
            let password = resolve_password(password)?;
            let user = auth::register(&context.client()?, &username, &email, &password)
                .context("registration failed")?;
            print_json(&user)
        }
        AuthCommand::Logout => {
            let refresh_token = context.resolved.auth.refresh_token.clone();
            if !refresh_token.is_empty() {
                let result = context
                    .client()
                    .and_then(|client| Ok(auth::logout(&client, &refresh_token)?));
                if let Err(e) = result {
                    warn!("Server logout failed, clearing local tokens anyway: {e:#}");
                }
            }

            context.file_config.clear_tokens();
            context.save()?;
            print_json(&json!({ "loggedOut": true }))
        }
        AuthCommand::Refresh => {
            let refresh_token = context.resolved.auth.refresh_token.clone();
            let response = auth::refresh(&context.client()?, &refresh_token)
                .context("token refresh failed")?;

            context.file_config.save_tokens(&response.access_token, None);
            context.save()?;
            print_json(&json!({
                "tokenType": response.token_type,
                "expiresIn": response.expires_in,
            }))
        }
        AuthCommand::Me => {
            let user = auth::me(&context.client()?).context("failed to get user information")?;
            print_json(&user)
        }
    }
}

fn list_query(page: PageArgs, sort: Option<String>) -> files::ListQuery {
    files::ListQuery {
        page: page.page,
        size: page.size,
        sort,
        content_type: page.content_type,
        folder_path: page.folder_path,
    }
}

fn handle_file(context: &Context, command: FileCommand) -> Result<()> {
    let client = context.client()?;

    match command {
        FileCommand::Upload {
            file,
            folder_path,
            filename,
        } => {
            let uploaded = files::upload(&client, &file, folder_path.as_deref(), filename.as_deref())
                .context("upload failed")?;
            print_json(&uploaded)
        }
        FileCommand::List { page, sort } => {
            let page = files::list(&client, &list_query(page, sort))
                .context("failed to list files")?;
            print_json(&page)
        }
        FileCommand::Search { query, page } => {
            let page = files::search(&client, &query, &list_query(page, None))
                .context("search failed")?;
            print_json(&page)
        }
        FileCommand::Info => {
            let stats = files::statistics(&client).context("failed to get file information")?;
            print_json(&stats)
        }
        FileCommand::Download { identifier, output } => {
            let output = output.unwrap_or_default();
            let saved = files::download(&client, &identifier, &output)
                .context("download failed")?;
            print_json(&json!({ "savedTo": saved }))
        }
        FileCommand::Update {
            id,
            filename,
            folder_path,
        } => {
            let updated = files::update(&client, &id, filename.as_deref(), folder_path.as_deref())
                .context("update failed")?;
            print_json(&updated)
        }
        FileCommand::Delete { id, yes } => {
            confirm(yes, &format!("Delete file {id}? This cannot be undone."))?;
            files::delete(&client, &id).context("delete failed")?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

fn handle_folder(context: &Context, command: FolderCommand) -> Result<()> {
    let client = context.client()?;

    match command {
        FolderCommand::Create { path, description } => {
            let folder = folders::create(&client, &path, description.as_deref())
                .context("failed to create folder")?;
            print_json(&folder)
        }
        FolderCommand::List { parent_path } => {
            let list = folders::list(&client, parent_path.as_deref())
                .context("failed to list folders")?;
            print_json(&list)
        }
        FolderCommand::Delete { path, yes } => {
            confirm(yes, &format!("Delete folder '{path}'? This cannot be undone."))?;
            folders::delete(&client, &path).context("failed to delete folder")?;
            print_json(&json!({ "deleted": path }))
        }
        FolderCommand::Info { path } => {
            let stats = folders::statistics(&client, &path)
                .context("failed to get folder information")?;
            print_json(&stats)
        }
    }
}

fn handle_apikey(context: &Context, command: ApiKeyCommand) -> Result<()> {
    let client = context.client()?;

    match command {
        ApiKeyCommand::Generate { name, expires_at } => {
            let key = api_keys::generate(&client, &name, expires_at)
                .context("failed to generate API key")?;
            warn!("Store the key now; it cannot be shown again");
            print_json(&key)
        }
        ApiKeyCommand::List => {
            let keys = api_keys::list(&client).context("failed to list API keys")?;
            print_json(&keys)
        }
        ApiKeyCommand::Get { id } => {
            let key = api_keys::get(&client, &id).context("failed to get API key")?;
            print_json(&key)
        }
        ApiKeyCommand::Revoke { id, yes } => {
            confirm(yes, &format!("Revoke API key {id}? This cannot be undone."))?;
            api_keys::revoke(&client, &id).context("failed to revoke API key")?;
            print_json(&json!({ "revoked": id }))
        }
    }
}

fn handle_batch(context: &Context, command: BatchCommand) -> Result<()> {
    match command {
        BatchCommand::Status { id } => {
            let batch = batches::status(&context.client()?, &id)
                .context("failed to get batch job status")?;
            print_json(&batch)
        }
    }
}

fn handle_config(context: &mut Context, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = &context.resolved;
            print_json(&json!({
                "configFile": context.config_path,
                "apiUrl": config.api_url,
                "timeoutSecs": config.timeout_secs,
                "accessToken": mask_value(&config.auth.access_token),
                "refreshToken": mask_value(&config.auth.refresh_token),
                "apiKey": mask_value(&config.auth.api_key),
            }))
        }
        ConfigCommand::Get { key, reveal } => {
            let config_key: ConfigKey = key.parse()?;
            let value = context.resolved.get_value(config_key);
            if is_sensitive_key(&key) && !reveal {
                print_line(&mask_value(&value))
            } else {
                print_line(&value)
            }
        }
        ConfigCommand::Set { key, value } => {
            let config_key: ConfigKey = key.parse()?;
            context.file_config.set_value(config_key, &value)?;
            context.save()?;

            let shown = if config_key.is_sensitive() {
                mask_value(&value)
            } else {
                value
            };
            print_line(&format!("{config_key} = {shown}"))
        }
        ConfigCommand::Path => print_line(&context.config_path.display().to_string()),
    }
}

/// Password from the flag or environment, else an interactive prompt.
fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password.filter(|p| !p.is_empty()) {
        return Ok(password);
    }
    if !Term::stderr().is_term() {
        return Err(CliError::MissingArgument(
            "--password (or CLOUD_STORAGE_PASSWORD) when not running interactively".to_string(),
        )
        .into());
    }

    Password::new()
        .with_prompt("Password")
        .interact()
        .context("failed to read password")
}

/// Ask before destructive operations unless `--yes` was given.
fn confirm(yes: bool, prompt: &str) -> Result<()> {
    if yes {
        return Ok(());
    }
    if !Term::stderr().is_term() {
        return Err(CliError::MissingArgument("--yes to confirm".to_string()).into());
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("failed to read confirmation")?;
    if confirmed {
        Ok(())
    } else {
        Err(CliError::Cancelled.into())
    }
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) -> Result<()> {
    println!("{line}");
    Ok(())
}

/// Exit code for an error returned by [`execute`]
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CliError>())
        .map_or(1, CliError::exit_code)
}
