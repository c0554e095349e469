use crate::core::export::{render_records, OutputFormat};
use crate::core::{BoundaryQuery, Crs, SgisApi, Storage};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_year, Validate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest {
    pub address: String,
    pub crs: Crs,
    pub page: u32,
    pub limit: u32,
    pub format: OutputFormat,
}

impl GeocodeRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            crs: Crs::default(),
            page: 0,
            limit: 5,
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Auth,
    Geocode(GeocodeRequest),
    Boundary(BoundaryQuery),
}

impl Validate for Request {
    fn validate(&self) -> Result<()> {
        match self {
            Request::Auth => Ok(()),
            Request::Geocode(req) => {
                validate_non_empty_string("address", &req.address)?;
                validate_positive_number("limit", req.limit as usize, 1)
            }
            Request::Boundary(query) => {
                if let Some(code) = &query.adm_cd {
                    validate_non_empty_string("adm_cd", code)?;
                }
                validate_year("year", &query.year)
            }
        }
    }
}

/// Where a command's result ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Stdout(String),
    Saved(String),
}

pub struct CommandRunner<A: SgisApi, S: Storage> {
    api: A,
    storage: S,
}

impl<A: SgisApi, S: Storage> CommandRunner<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self { api, storage }
    }

    /// Runs the request; with `output` set, the rendered result is written to
    /// storage instead of being returned for printing.
    pub async fn execute(&self, request: Request, output: Option<&str>) -> Result<CommandOutput> {
        request.validate()?;

        let rendered = match &request {
            Request::Auth => {
                let result = self.api.auth().await?;
                serde_json::to_string_pretty(&result)?
            }
            Request::Geocode(req) => {
                let records = self
                    .api
                    .geocode(req.crs, &req.address, req.page, req.limit)
                    .await?;
                render_records(&records, req.format)?
            }
            Request::Boundary(query) => self.api.hadm_area(query).await?,
        };

        match output {
            Some(path) => {
                let saved = self.storage.write_file(path, rendered.as_bytes()).await?;
                tracing::info!("💾 Saved output to {}", saved);
                Ok(CommandOutput::Saved(saved))
            }
            None => Ok(CommandOutput::Stdout(rendered)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AuthResult, Record};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(format!("mem://{}", path))
        }
    }

    #[derive(Default)]
    struct MockApi {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl SgisApi for MockApi {
        async fn auth(&self) -> Result<AuthResult> {
            self.calls.lock().await.push("auth".to_string());
            Ok(AuthResult {
                access_token: "tok".to_string(),
                access_timeout: 1_700_000_000_000,
            })
        }

        async fn geocode(
            &self,
            crs: Crs,
            address: &str,
            page: u32,
            limit: u32,
        ) -> Result<Vec<Record>> {
            self.calls
                .lock()
                .await
                .push(format!("geocode {:?} {} {} {}", crs, address, page, limit));
            let mut data = serde_json::Map::new();
            data.insert("x".to_string(), serde_json::json!("127.38"));
            data.insert("y".to_string(), serde_json::json!("36.35"));
            Ok(vec![Record { data }])
        }

        async fn hadm_area(&self, query: &BoundaryQuery) -> Result<String> {
            self.calls
                .lock()
                .await
                .push(format!("hadm {:?} {}", query.adm_cd, query.year));
            Ok(r#"{"type":"FeatureCollection","features":[]}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_geocode_renders_csv_to_stdout() {
        let api = MockApi::default();
        let calls = api.calls.clone();
        let runner = CommandRunner::new(api, MockStorage::default());

        let mut req = GeocodeRequest::new("대전광역시 서구 청사로 189");
        req.format = OutputFormat::Csv;
        req.crs = Crs::Utmk;

        let out = runner.execute(Request::Geocode(req), None).await.unwrap();
        assert_eq!(out, CommandOutput::Stdout("x,y\n127.38,36.35\n".to_string()));
        assert_eq!(
            calls.lock().await.as_slice(),
            ["geocode Utmk 대전광역시 서구 청사로 189 0 5".to_string()]
        );
    }

    #[tokio::test]
    async fn test_boundary_is_saved_to_storage() {
        let storage = MockStorage::default();
        let runner = CommandRunner::new(MockApi::default(), storage.clone());

        let query = BoundaryQuery {
            adm_cd: Some("25".to_string()),
            ..Default::default()
        };
        let out = runner
            .execute(Request::Boundary(query), Some("daejeon.geojson"))
            .await
            .unwrap();

        assert_eq!(out, CommandOutput::Saved("mem://daejeon.geojson".to_string()));
        let saved = storage.files.lock().await.get("daejeon.geojson").cloned().unwrap();
        assert!(String::from_utf8(saved).unwrap().contains("FeatureCollection"));
    }

    #[tokio::test]
    async fn test_auth_prints_result_json() {
        let runner = CommandRunner::new(MockApi::default(), MockStorage::default());
        let CommandOutput::Stdout(text) = runner.execute(Request::Auth, None).await.unwrap() else {
            panic!("expected stdout output");
        };
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["accessToken"], "tok");
        assert_eq!(parsed["accessTimeout"], 1_700_000_000_000i64);
    }

    #[tokio::test]
    async fn test_invalid_requests_never_reach_the_api() {
        let api = MockApi::default();
        let calls = api.calls.clone();
        let runner = CommandRunner::new(api, MockStorage::default());

        let mut req = GeocodeRequest::new("  ");
        assert!(runner.execute(Request::Geocode(req.clone()), None).await.is_err());
        req.address = "서울".to_string();
        req.limit = 0;
        assert!(runner.execute(Request::Geocode(req), None).await.is_err());

        let query = BoundaryQuery {
            year: "1999".to_string(),
            ..Default::default()
        };
        assert!(runner.execute(Request::Boundary(query), None).await.is_err());

        assert!(calls.lock().await.is_empty());
    }
}
