use crate::core::geojson::reproject_feature_collection;
use crate::core::token::AccessToken;
use crate::domain::model::{AuthResult, BoundaryQuery, Crs, LowSearch, Record};
use crate::domain::ports::{ConfigProvider, SgisApi};
use crate::utils::error::{Result, SgisError, ERR_CD_AUTH};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_BASE_URL: &str = "https://sgisapi.kostat.go.kr/OpenAPI3";

const AUTH_PATH: &str = "/auth/authentication.json";
const GEOCODE_WGS84_PATH: &str = "/addr/geocodewgs84.json";
const GEOCODE_UTMK_PATH: &str = "/addr/geocode.json";
const HADM_AREA_PATH: &str = "/boundary/hadmarea.geojson";

/// Client for the SGIS (통계지리정보서비스) open API.
///
/// The access token is fetched lazily and cached until ten seconds before it
/// expires. Concurrent callers share the cache; only one of them
/// re-authenticates.
pub struct Sgis {
    api_key: String,
    api_sec: String,
    base_url: String,
    client: Client,
    token: Mutex<Option<AccessToken>>,
}

impl Sgis {
    pub fn new(api_key: impl Into<String>, api_sec: impl Into<String>) -> Self {
        Self::with_base_url(api_key, api_sec, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        api_sec: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_client(api_key, api_sec, base_url, Client::new())
    }

    /// Uses a caller-supplied client, e.g. to share a connection pool.
    pub fn with_client(
        api_key: impl Into<String>,
        api_sec: impl Into<String>,
        base_url: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key: api_key.into(),
            api_sec: api_sec.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: Mutex::new(None),
        }
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        api_sec: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(api_key, api_sec, base_url, client))
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::with_timeout(
            config.api_key(),
            config.api_sec(),
            config.base_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fails with the service's code and message when `errCd` is set and non-zero.
    pub fn check_err_cd(parsed: &Value) -> Result<()> {
        let code = match parsed.get("errCd") {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(-1),
            Some(Value::String(s)) if s.trim().is_empty() => 0,
            Some(Value::String(s)) => s.trim().parse().unwrap_or(-1),
            Some(Value::Bool(b)) => i64::from(*b),
            Some(_) => -1,
        };

        if code == 0 {
            return Ok(());
        }

        let message = match parsed.get("errMsg") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "0".to_string(),
        };
        Err(SgisError::Service { code, message })
    }

    /// Requests a fresh token and stores it in the cache.
    pub async fn auth(&self) -> Result<AuthResult> {
        let mut cached = self.token.lock().await;
        let result = self.authenticate().await?;
        *cached = Some(AccessToken::from(&result));
        Ok(result)
    }

    /// Returns the cached token, re-authenticating when absent or stale.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        tracing::debug!("🔑 Access token missing or stale, authenticating");
        let result = self.authenticate().await?;
        let token = AccessToken::from(&result);
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    pub async fn geocode_wgs84(&self, address: &str, page: u32, limit: u32) -> Result<Vec<Record>> {
        self.geocode_at(GEOCODE_WGS84_PATH, address, page, limit)
            .await
    }

    pub async fn geocode_utmk(&self, address: &str, page: u32, limit: u32) -> Result<Vec<Record>> {
        self.geocode_at(GEOCODE_UTMK_PATH, address, page, limit)
            .await
    }

    /// Administrative boundaries as compact WGS84 GeoJSON.
    pub async fn hadm_area(
        &self,
        adm_cd: Option<&str>,
        low_search: LowSearch,
        year: &str,
    ) -> Result<String> {
        let mut params = Vec::with_capacity(3);
        if let Some(code) = adm_cd {
            params.push(("adm_cd", code.to_string()));
        }
        params.push(("low_search", low_search.as_str().to_string()));
        params.push(("year", year.to_string()));

        let parsed = self.get_with_token(HADM_AREA_PATH, &params).await?;
        let collection = reproject_feature_collection(parsed)?;

        let features = collection["features"].as_array().map_or(0, Vec::len);
        tracing::info!("🗺️ Fetched {} boundary features", features);

        Ok(serde_json::to_string(&collection)?)
    }

    async fn geocode_at(
        &self,
        path: &str,
        address: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Record>> {
        let params = [
            ("address", address.to_string()),
            ("pagenum", page.to_string()),
            ("resultcount", limit.to_string()),
        ];
        let parsed = self.get_with_token(path, &params).await?;

        let records = match parsed.get("result").and_then(|r| r.get("resultdata")) {
            Some(data) if !data.is_null() => serde_json::from_value::<Vec<Record>>(data.clone())?,
            _ => Vec::new(),
        };
        tracing::info!("📍 Geocoded '{}' to {} result(s)", address, records.len());
        Ok(records)
    }

    async fn authenticate(&self) -> Result<AuthResult> {
        let params = [
            ("consumer_key", self.api_key.clone()),
            ("consumer_secret", self.api_sec.clone()),
        ];
        let parsed = self.get_json(AUTH_PATH, &params).await?;

        let result = match parsed.get("result") {
            Some(result) if !result.is_null() => serde_json::from_value(result.clone())?,
            _ => AuthResult {
                access_token: String::new(),
                access_timeout: 0,
            },
        };
        tracing::info!("🔑 Authenticated with SGIS (expires at {} ms)", result.access_timeout);
        Ok(result)
    }

    /// Calls an endpoint that needs `accessToken`. An auth rejection drops the
    /// cached token and the call is retried once with a fresh one.
    async fn get_with_token(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value> {
        let token = self.access_token().await?;
        match self.get_json(path, &with_token(token, params)).await {
            Err(SgisError::Service { code, .. }) if code == ERR_CD_AUTH => {
                tracing::warn!("🔑 SGIS rejected the cached token, retrying once");
                self.token.lock().await.take();
                let token = self.access_token().await?;
                self.get_json(path, &with_token(token, params)).await
            }
            other => other,
        }
    }

    async fn get_json(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("📡 GET {}", url);

        // reqwest errors carry the full URL, including consumer_secret or accessToken
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(redact)?;
        let status = response.status();
        tracing::debug!("📡 {} responded with {}", path, status);

        if !status.is_success() {
            return Err(SgisError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let parsed: Value = response.json().await.map_err(redact)?;
        Self::check_err_cd(&parsed)?;
        Ok(parsed)
    }
}

fn redact(err: reqwest::Error) -> SgisError {
    SgisError::ApiError(err.without_url())
}

fn with_token(token: String, params: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
    let mut all = Vec::with_capacity(params.len() + 1);
    all.push(("accessToken", token));
    all.extend(params.iter().cloned());
    all
}

#[async_trait::async_trait]
impl SgisApi for Sgis {
    async fn auth(&self) -> Result<AuthResult> {
        Sgis::auth(self).await
    }

    async fn geocode(&self, crs: Crs, address: &str, page: u32, limit: u32) -> Result<Vec<Record>> {
        match crs {
            Crs::Wgs84 => self.geocode_wgs84(address, page, limit).await,
            Crs::Utmk => self.geocode_utmk(address, page, limit).await,
        }
    }

    async fn hadm_area(&self, query: &BoundaryQuery) -> Result<String> {
        Sgis::hadm_area(self, query.adm_cd.as_deref(), query.low_search, &query.year).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_err_cd_success_cases() {
        assert!(Sgis::check_err_cd(&json!({})).is_ok());
        assert!(Sgis::check_err_cd(&json!({"errCd": 0, "errMsg": "Success"})).is_ok());
        assert!(Sgis::check_err_cd(&json!({"errCd": "0"})).is_ok());
        assert!(Sgis::check_err_cd(&json!({"errCd": null})).is_ok());
        assert!(Sgis::check_err_cd(&json!({"errCd": 0.0})).is_ok());
    }

    #[test]
    fn test_check_err_cd_float_codes() {
        let err = Sgis::check_err_cd(&json!({"errCd": -401.0, "errMsg": "x"})).unwrap_err();
        assert!(matches!(err, SgisError::Service { code: -401, .. }));
    }

    #[test]
    fn test_check_err_cd_failure_carries_code_and_message() {
        let err = Sgis::check_err_cd(&json!({"errCd": -401, "errMsg": "인증 실패"})).unwrap_err();
        match err {
            SgisError::Service { code, message } => {
                assert_eq!(code, -401);
                assert_eq!(message, "인증 실패");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_check_err_cd_defaults_message() {
        let err = Sgis::check_err_cd(&json!({"errCd": "-100"})).unwrap_err();
        assert_eq!(err.to_string(), "[-100] 0");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let sgis = Sgis::with_base_url("k", "s", "http://localhost:1234/OpenAPI3/");
        assert_eq!(sgis.base_url(), "http://localhost:1234/OpenAPI3");
        assert_eq!(Sgis::new("k", "s").base_url(), DEFAULT_BASE_URL);
    }
}
