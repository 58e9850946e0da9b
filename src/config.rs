use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// SendGrid API key. Without one, outgoing mail is only logged.
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub enum StorageConfig {
    Local {
        upload_dir: String,
    },
    S3 {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        region: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Public base URL used in email links and uploaded file URLs, without trailing slash.
    pub public_domain: String,
    pub jwt: JwtConfig,
    pub reset_token_ttl_minutes: i64,
    pub mail: MailConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .context("APP_PORT must be a port number")?
            .unwrap_or(8080);
        let public_domain = normalize_domain(
            &std::env::var("APP_DOMAIN").unwrap_or_else(|_| format!("http://localhost:{port}")),
        );

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "postboard".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "postboard-users".into()),
            ttl_minutes: env_i64("JWT_TTL_MINUTES", 60 * 24),
        };

        let mail = MailConfig {
            sendgrid_api_key: std::env::var("SENDGRID_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            from_email: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@postboard.local".into()),
            from_name: std::env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Postboard".into()),
        };

        let storage = match std::env::var("STORAGE_BACKEND").as_deref() {
            Ok("s3") => StorageConfig::S3 {
                endpoint: std::env::var("S3_ENDPOINT").context("S3_ENDPOINT is not set")?,
                bucket: std::env::var("S3_BUCKET").context("S3_BUCKET is not set")?,
                access_key: std::env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY is not set")?,
                secret_key: std::env::var("S3_SECRET_KEY").context("S3_SECRET_KEY is not set")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            },
            Ok("local") | Err(_) => StorageConfig::Local {
                upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            },
            Ok(other) => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        };

        Ok(Self {
            database_url,
            host,
            port,
            public_domain,
            jwt,
            reset_token_ttl_minutes: env_i64("RESET_TOKEN_TTL_MINUTES", 60),
            mail,
            storage,
        })
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

fn normalize_domain(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize_domain;

    #[test]
    fn domain_loses_trailing_slashes() {
        assert_eq!(normalize_domain("https://example.com/"), "https://example.com");
        assert_eq!(normalize_domain(" http://localhost:8080 "), "http://localhost:8080");
        assert_eq!(normalize_domain("https://a.b//"), "https://a.b");
    }
}
