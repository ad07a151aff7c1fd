use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub admin_key: String,
    /// Origins always allowed, before any tenant registers its own.
    /// Set via GESTOR_ALLOWED_ORIGINS (comma-separated).
    pub allowed_origins: Vec<String>,
    pub mail: MailConfig,
}

/// Transactional-mail provider settings. An empty API key disables
/// outbound mail entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_key: String,
    pub api_url: String,
    pub from_email: String,
    pub from_name: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let admin_key =
        std::env::var("GESTOR_ADMIN_KEY").unwrap_or_else(|_| "CHANGE_ME_ADMIN_KEY".into());

    if admin_key == "CHANGE_ME_ADMIN_KEY" {
        let env_mode = std::env::var("GESTOR_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "GESTOR_ADMIN_KEY is still the insecure placeholder. \
                 Set a proper key before running in production."
            );
        }
        eprintln!("⚠️  GESTOR_ADMIN_KEY is not set — using insecure placeholder. Set a real key for production.");
    }

    Ok(Config {
        port: std::env::var("GESTOR_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/gestor".into()),
        admin_key,
        allowed_origins: std::env::var("GESTOR_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        mail: MailConfig {
            api_key: std::env::var("GESTOR_BREVO_API_KEY").unwrap_or_default(),
            api_url: std::env::var("GESTOR_BREVO_API_URL")
                .unwrap_or_else(|_| "https://api.brevo.com/v3".into()),
            from_email: std::env::var("GESTOR_MAIL_FROM")
                .unwrap_or_else(|_| "nao-responda@gestor.app".into()),
            from_name: std::env::var("GESTOR_MAIL_FROM_NAME").unwrap_or_else(|_| "Gestor".into()),
        },
    })
}
