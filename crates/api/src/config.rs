use std::time::Duration;

use creatorify_cloud::media::CloudinaryConfig;
use creatorify_cloud::platform::PlatformConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the GPU platform URL have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Expected `X-API-Key` value. Protected routes fail with 500 when unset.
    pub api_key: Option<String>,
    /// Pending uploads the background uploader buffers (default: `64`).
    pub upload_queue_capacity: usize,
    pub platform: PlatformConfig,
    /// `None` when any of the three Cloudinary variables is missing.
    pub cloudinary: Option<CloudinaryConfig>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `API_KEY`                  | unset                   |
    /// | `UPLOAD_QUEUE_CAPACITY`    | `64`                    |
    /// | `GPU_PLATFORM_URL`         | required                |
    /// | `GPU_PLATFORM_TOKEN`       | unset                   |
    /// | `GPU_APP_NAME`             | `creatorify`            |
    /// | `GPU_REQUEST_TIMEOUT_SECS` | `60`                    |
    /// | `CLOUDINARY_CLOUD_NAME`    | unset                   |
    /// | `CLOUDINARY_API_KEY`       | unset                   |
    /// | `CLOUDINARY_API_SECRET`    | unset                   |
    /// | `CLOUDINARY_TIMEOUT_SECS`  | `120`                   |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_queue_capacity: usize = env_or("UPLOAD_QUEUE_CAPACITY", "64")
            .parse()
            .expect("UPLOAD_QUEUE_CAPACITY must be a valid usize");

        let gpu_timeout_secs: u64 = env_or("GPU_REQUEST_TIMEOUT_SECS", "60")
            .parse()
            .expect("GPU_REQUEST_TIMEOUT_SECS must be a valid u64");

        let media_timeout_secs: u64 = env_or("CLOUDINARY_TIMEOUT_SECS", "120")
            .parse()
            .expect("CLOUDINARY_TIMEOUT_SECS must be a valid u64");

        let platform = PlatformConfig {
            base_url: std::env::var("GPU_PLATFORM_URL").expect("GPU_PLATFORM_URL must be set"),
            app_name: env_or("GPU_APP_NAME", "creatorify"),
            token: env_nonempty("GPU_PLATFORM_TOKEN"),
            timeout: Duration::from_secs(gpu_timeout_secs),
        };

        let cloudinary = match (
            env_nonempty("CLOUDINARY_CLOUD_NAME"),
            env_nonempty("CLOUDINARY_API_KEY"),
            env_nonempty("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                timeout: Duration::from_secs(media_timeout_secs),
            }),
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            api_key: env_nonempty("API_KEY"),
            upload_queue_capacity: upload_queue_capacity.max(1),
            platform,
            cloudinary,
        }
    }
}
