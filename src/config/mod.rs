// Configuration module entry point
// Layers defaults, an optional config file and the process environment

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{BackupConfig, Config, MailConfig, StaticFilesConfig};

/// Plain environment keys understood without the `CONTACT_` prefix
const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("SMTP_SERVER", "mail.smtp_server"),
    ("SMTP_PORT", "mail.smtp_port"),
    ("EMAIL_ADDRESS", "mail.sender"),
    ("EMAIL_PASSWORD", "mail.password"),
    ("RECIPIENT_EMAIL", "mail.recipient"),
    ("PORT", "server.port"),
];

/// Either of these set to `development` turns on debug mode
const DEBUG_ENV_KEYS: [&str; 2] = ["FLASK_ENV", "APP_ENV"];

impl Config {
    /// Load configuration from the given file path (without extension) and
    /// the current process environment
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(config_path, std::env::vars().collect())
    }

    /// Load configuration against an explicit environment snapshot
    pub fn load_with(
        config_path: &str,
        env: config::Map<String, String>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CONTACT")
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(env.clone())),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.debug", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("http.server_name", "folio-contact")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("static_files.root", ".")?
            .set_default("static_files.index_file", "index.html")?
            .set_default("backup.dir", "submissions")?
            .set_default("mail.smtp_server", "smtp.gmail.com")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.sender", "your-email@gmail.com")?
            .set_default("mail.password", "your-app-password")?
            .set_default("mail.recipient", "hello@zolabecker.com")?
            .set_default("mail.timeout_secs", 10)?;

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, env.get(var).cloned())?;
        }
        if DEBUG_ENV_KEYS
            .iter()
            .any(|key| env.get(*key).is_some_and(|v| v == "development"))
        {
            builder = builder.set_override("server.debug", true)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
