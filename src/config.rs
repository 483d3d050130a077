use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// S3/MinIO connection for uploaded profile media.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres when set, in-memory tables otherwise.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// S3 media when set, in-memory objects otherwise.
    pub media: Option<MediaConfig>,
    pub media_presign_seconds: u64,
    pub allow_duplicate_applications: bool,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "joblink".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "joblink-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        let media = match (
            non_empty("MINIO_ENDPOINT"),
            non_empty("MINIO_BUCKET"),
            non_empty("MINIO_ACCESS_KEY"),
            non_empty("MINIO_SECRET_KEY"),
        ) {
            (Some(endpoint), Some(bucket), Some(access_key), Some(secret_key)) => Some(MediaConfig {
                endpoint,
                bucket,
                access_key,
                secret_key,
                region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            jwt,
            media,
            media_presign_seconds: std::env::var("MEDIA_PRESIGN_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(600),
            allow_duplicate_applications: flag("ALLOW_DUPLICATE_APPLICATIONS"),
            seed_demo_data: flag("SEED_DEMO_DATA"),
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
