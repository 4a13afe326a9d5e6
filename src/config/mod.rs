//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::segment::DEFAULT_DELIMITER;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "md2slides";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_SLIDES_API_BASE: &str = "https://slides.googleapis.com/";
const DEFAULT_PRESENTATION_TITLE: &str = "Markdown Presentation";

/// Command-line arguments for the md2slides binary.
#[derive(Debug, Parser)]
#[command(
    name = "md2slides",
    version,
    about = "Turn Markdown into Google Slides presentations"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "MD2SLIDES_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the web server (the default).
    Serve,
    /// Print the batchUpdate body for a Markdown file without calling Google.
    Batch(BatchArgs),
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Markdown file to convert; `-` or nothing reads stdin.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Override the slide delimiter.
    #[arg(long = "delimiter", value_name = "TEXT")]
    pub delimiter: Option<String>,

    /// Use a fixed object id prefix instead of a random one.
    #[arg(long = "id-prefix", value_name = "PREFIX")]
    pub id_prefix: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST", global = true)]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "port", env = "PORT", value_name = "PORT", global = true)]
    pub port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(
        long = "server-graceful-shutdown-seconds",
        value_name = "SECONDS",
        global = true
    )]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// OAuth client id issued by the Google Cloud console.
    #[arg(
        long = "google-client-id",
        env = "GOOGLE_CLIENT_ID",
        value_name = "ID",
        hide_env_values = true,
        global = true
    )]
    pub google_client_id: Option<String>,

    /// OAuth client secret issued by the Google Cloud console.
    #[arg(
        long = "google-client-secret",
        env = "GOOGLE_CLIENT_SECRET",
        value_name = "SECRET",
        hide_env_values = true,
        global = true
    )]
    pub google_client_secret: Option<String>,

    /// Callback URL registered for the OAuth client.
    #[arg(
        long = "google-redirect-uri",
        env = "GOOGLE_REDIRECT_URI",
        value_name = "URL",
        global = true
    )]
    pub google_redirect_uri: Option<String>,

    /// Mark the session cookie `Secure` (serve over HTTPS).
    #[arg(
        long = "session-cookie-secure",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub session_cookie_secure: Option<bool>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub google: GoogleSettings,
    pub slides: SlidesSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct GoogleSettings {
    /// Present only when both id and secret are configured.
    pub client: Option<GoogleClientSettings>,
    pub redirect_uri: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub slides_api_base: Url,
    pub request_timeout: Duration,
}

impl GoogleSettings {
    pub fn require_client(&self) -> Result<GoogleClientSettings, LoadError> {
        self.client.clone().ok_or_else(|| {
            LoadError::invalid(
                "google.client_id",
                "an OAuth client id and secret are required to serve",
            )
        })
    }
}

#[derive(Clone)]
pub struct GoogleClientSettings {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for GoogleClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleClientSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SlidesSettings {
    pub delimiter: String,
    pub default_title: String,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_secure: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("MD2SLIDES").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_serve_overrides(&cli.overrides);
    if let Some(Command::Batch(args)) = cli.command.as_ref() {
        raw.apply_batch_overrides(args);
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    google: RawGoogleSettings,
    slides: RawSlidesSettings,
    session: RawSessionSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(id) = overrides.google_client_id.as_ref() {
            self.google.client_id = Some(id.clone());
        }
        if let Some(secret) = overrides.google_client_secret.as_ref() {
            self.google.client_secret = Some(secret.clone());
        }
        if let Some(uri) = overrides.google_redirect_uri.as_ref() {
            self.google.redirect_uri = Some(uri.clone());
        }
        if let Some(secure) = overrides.session_cookie_secure {
            self.session.cookie_secure = Some(secure);
        }
    }

    fn apply_batch_overrides(&mut self, args: &BatchArgs) {
        if let Some(delimiter) = args.delimiter.as_ref() {
            self.slides.delimiter = Some(delimiter.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            google,
            slides,
            session,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let google = build_google_settings(google, server.addr.port())?;
        let slides = build_slides_settings(slides)?;
        let session = SessionSettings {
            cookie_secure: session.cookie_secure.unwrap_or(false),
        };

        Ok(Self {
            server,
            logging,
            google,
            slides,
            session,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.host", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_google_settings(google: RawGoogleSettings, port: u16) -> Result<GoogleSettings, LoadError> {
    let client_id = non_blank(google.client_id);
    let client_secret = non_blank(google.client_secret);
    let client = match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Some(GoogleClientSettings {
            client_id,
            client_secret,
        }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(LoadError::invalid(
                "google.client_secret",
                "must be set together with google.client_id",
            ));
        }
        (None, Some(_)) => {
            return Err(LoadError::invalid(
                "google.client_id",
                "must be set together with google.client_secret",
            ));
        }
    };

    let redirect_uri = match non_blank(google.redirect_uri) {
        Some(value) => parse_url("google.redirect_uri", &value)?,
        None => parse_url(
            "google.redirect_uri",
            &format!("http://localhost:{port}/auth/google/callback"),
        )?,
    };
    let auth_url = parse_url(
        "google.auth_url",
        google.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL),
    )?;
    let token_url = parse_url(
        "google.token_url",
        google.token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL),
    )?;

    let base = google
        .slides_api_base
        .unwrap_or_else(|| DEFAULT_SLIDES_API_BASE.to_string());
    // Relative joins drop the last path segment unless the base ends in `/`.
    let base = if base.ends_with('/') {
        base
    } else {
        format!("{base}/")
    };
    let slides_api_base = parse_url("google.slides_api_base", &base)?;

    let timeout_secs = google
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "google.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(GoogleSettings {
        client,
        redirect_uri,
        auth_url,
        token_url,
        slides_api_base,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_slides_settings(slides: RawSlidesSettings) -> Result<SlidesSettings, LoadError> {
    let delimiter = slides
        .delimiter
        .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());
    if delimiter.trim().is_empty() {
        return Err(LoadError::invalid(
            "slides.delimiter",
            "delimiter must not be blank",
        ));
    }

    let default_title = non_blank(slides.default_title)
        .unwrap_or_else(|| DEFAULT_PRESENTATION_TITLE.to_string());

    Ok(SlidesSettings {
        delimiter,
        default_title,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGoogleSettings {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    auth_url: Option<String>,
    token_url: Option<String>,
    slides_api_base: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSlidesSettings {
    delimiter: Option<String>,
    default_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    cookie_secure: Option<bool>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, LoadError> {
    Url::parse(value).map_err(|err| LoadError::invalid(key, format!("invalid url `{value}`: {err}")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
