use serde::{Deserialize, Serialize};
use std::env;

/// Process-wide configuration, built once in `main` and passed by reference
/// into the components that need it. There is no global config lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub imaging: ImagingConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Credentials and endpoint for the external image-hosting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingConfig {
    pub api_base: String,
    pub api_key: String,
    pub api_secret: String,
    pub upload_folder: String,
}

/// Default page sizes for the listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub product_page_size: i64,
    pub order_page_size: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: "postgres://localhost/storefront".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
            imaging: ImagingConfig {
                api_base: "https://api.imagehost.example.com/v1".to_string(),
                api_key: String::new(),
                api_secret: String::new(),
                upload_folder: "product-images".to_string(),
            },
            listing: ListingConfig {
                product_page_size: 14,
                order_page_size: 3,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        if let Ok(v) = env::var("IMAGE_HOST_API_BASE") {
            self.imaging.api_base = v;
        }
        if let Ok(v) = env::var("IMAGE_HOST_API_KEY") {
            self.imaging.api_key = v;
        }
        if let Ok(v) = env::var("IMAGE_HOST_API_SECRET") {
            self.imaging.api_secret = v;
        }
        if let Ok(v) = env::var("IMAGE_HOST_UPLOAD_FOLDER") {
            self.imaging.upload_folder = v;
        }

        if let Ok(v) = env::var("LISTING_PRODUCT_PAGE_SIZE") {
            self.listing.product_page_size =
                v.parse().unwrap_or(self.listing.product_page_size);
        }
        if let Ok(v) = env::var("LISTING_ORDER_PAGE_SIZE") {
            self.listing.order_page_size = v.parse().unwrap_or(self.listing.order_page_size);
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_sizes_match_listing_endpoints() {
        let config = AppConfig::default();
        assert_eq!(config.listing.product_page_size, 14);
        assert_eq!(config.listing.order_page_size, 3);
    }

    #[test]
    fn default_server_port() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
    }
}
