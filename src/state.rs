use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, JwtConfig};
use crate::media::{MediaStore, MemoryMediaStore, S3MediaStore};
use crate::store::{JobStore, MemStore, PgStore, StoreOptions};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn JobStore>,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let options = StoreOptions {
            allow_duplicate_applications: config.allow_duplicate_applications,
        };

        let store = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url, options).await?;
                pg.migrate().await?;
                info!("using postgres store");
                Arc::new(pg) as Arc<dyn JobStore>
            }
            None => {
                info!("DATABASE_URL not set; using in-memory store");
                Arc::new(MemStore::new(options)) as Arc<dyn JobStore>
            }
        };

        let media = match &config.media {
            Some(media) => {
                let s3 = S3MediaStore::new(media, config.media_presign_seconds).await?;
                info!(bucket = %media.bucket, "using s3 media store");
                Arc::new(s3) as Arc<dyn MediaStore>
            }
            None => {
                info!("MINIO_* not set; keeping uploads in memory");
                Arc::new(MemoryMediaStore::new()) as Arc<dyn MediaStore>
            }
        };

        Ok(Self::from_parts(config, store, media))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn JobStore>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            config,
            store,
            media,
        }
    }

    /// Memory-backed state with a fixed JWT setup, for tests.
    pub fn fake() -> Self {
        Self::fake_with(StoreOptions::default())
    }

    pub fn fake_with(options: StoreOptions) -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            media: None,
            media_presign_seconds: 600,
            allow_duplicate_applications: options.allow_duplicate_applications,
            seed_demo_data: false,
        });
        Self::from_parts(
            config,
            Arc::new(MemStore::new(options)),
            Arc::new(MemoryMediaStore::new()),
        )
    }
}
