use anyhow::Result;
use datakart::config::settings::Overrides;
use datakart::core::export::OutputFormat;
use datakart::core::BoundaryQuery;
use datakart::{
    CommandOutput, CommandRunner, GeocodeRequest, LocalStorage, Request, Settings, Sgis,
    TomlConfig,
};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn mock_auth(server: &MockServer) {
    let timeout = chrono::Utc::now().timestamp_millis() + 3_600_000;
    server.mock(|when, then| {
        when.method(GET).path("/auth/authentication.json");
        then.status(200).json_body(json!({
            "errCd": 0,
            "result": {"accessToken": "tok", "accessTimeout": timeout.to_string()}
        }));
    });
}

fn settings_for(server: &MockServer, output_dir: &str) -> Result<Settings> {
    let file = TomlConfig::from_toml_str(&format!(
        r#"
[sgis]
api_key = "file-key"
api_sec = "file-secret"
base_url = "{}"
timeout_seconds = 5

[output]
directory = "{}"
"#,
        server.base_url(),
        output_dir.replace('\\', "/")
    ))?;
    Ok(Settings::resolve(Overrides::default(), Some(file))?)
}

#[tokio::test]
async fn test_boundary_command_writes_geojson_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    mock_auth(&server);
    let hadm_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/boundary/hadmarea.geojson")
            .query_param("adm_cd", "25");
        then.status(200).json_body(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": 1,
                "properties": {"adm_cd": "25010", "x": 990000.0, "y": 1815000.0},
                "geometry": {"type": "Point", "coordinates": [990000.0, 1815000.0]}
            }]
        }));
    });

    let settings = settings_for(&server, temp_dir.path().to_str().unwrap())?;
    let runner = CommandRunner::new(
        Sgis::from_config(&settings)?,
        LocalStorage::from_config(&settings),
    );

    let query = BoundaryQuery {
        adm_cd: Some("25".to_string()),
        ..Default::default()
    };
    let out = runner
        .execute(Request::Boundary(query), Some("daejeon.geojson"))
        .await?;

    hadm_mock.assert();
    assert!(matches!(out, CommandOutput::Saved(ref p) if p.ends_with("daejeon.geojson")));

    let written = std::fs::read_to_string(temp_dir.path().join("daejeon.geojson"))?;
    let parsed: serde_json::Value = serde_json::from_str(&written)?;
    let feature = &parsed["features"][0];
    assert_eq!(feature["properties"], json!({"adm_cd": "25010"}));
    let lon = feature["geometry"]["coordinates"][0].as_f64().unwrap();
    let lat = feature["geometry"]["coordinates"][1].as_f64().unwrap();
    assert!(lon > 127.0 && lon < 127.5, "lon = {}", lon);
    assert!(lat > 36.0 && lat < 36.5, "lat = {}", lat);
    Ok(())
}

#[tokio::test]
async fn test_geocode_command_csv_to_stdout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    mock_auth(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/addr/geocodewgs84.json")
            .query_param("accessToken", "tok");
        then.status(200).json_body(json!({
            "errCd": 0,
            "result": {"resultdata": [
                {"adm_nm": "대전광역시 서구 둔산동", "x": "127.3845", "y": "36.3587"},
                {"adm_nm": "대전광역시 서구 월평동", "x": "127.3710", "y": "36.3550"}
            ]}
        }));
    });

    let settings = settings_for(&server, temp_dir.path().to_str().unwrap())?;
    let runner = CommandRunner::new(
        Sgis::from_config(&settings)?,
        LocalStorage::from_config(&settings),
    );

    let mut request = GeocodeRequest::new("대전 서구");
    request.format = OutputFormat::Csv;
    let out = runner.execute(Request::Geocode(request), None).await?;

    let CommandOutput::Stdout(csv) = out else {
        panic!("expected stdout output");
    };
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "adm_nm,x,y");
    assert_eq!(lines[1], "대전광역시 서구 둔산동,127.3845,36.3587");
    assert_eq!(lines.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_auth_command_surfaces_service_errors() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auth/authentication.json");
        then.status(200)
            .json_body(json!({"errCd": -401, "errMsg": "invalid consumer key"}));
    });

    let settings = settings_for(&server, temp_dir.path().to_str().unwrap())?;
    let runner = CommandRunner::new(
        Sgis::from_config(&settings)?,
        LocalStorage::from_config(&settings),
    );

    let err = runner.execute(Request::Auth, None).await.unwrap_err();
    assert_eq!(err.user_friendly_message(), "SGIS rejected the request (-401): invalid consumer key");
    Ok(())
}
