use crate::domain::model::{AuthResult, BoundaryQuery, Crs, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Stores `data` at `path` and returns where it ended up.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// The SGIS operations the command layer needs.
#[async_trait]
pub trait SgisApi: Send + Sync {
    async fn auth(&self) -> Result<AuthResult>;

    async fn geocode(&self, crs: Crs, address: &str, page: u32, limit: u32) -> Result<Vec<Record>>;

    /// Boundary GeoJSON in WGS84, serialised compactly.
    async fn hadm_area(&self, query: &BoundaryQuery) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> &str;
    fn api_sec(&self) -> &str;
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn output_dir(&self) -> &str;
}
