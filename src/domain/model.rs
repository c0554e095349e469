use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of a geocode `resultdata` array. Field sets differ between the
/// WGS84 and UTM-K endpoints, so the record stays an open JSON object in the
/// field order SGIS sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    #[serde(rename = "accessToken", default)]
    pub access_token: String,
    /// Expiry as epoch milliseconds.
    #[serde(
        rename = "accessTimeout",
        default,
        deserialize_with = "deserialize_string_or_number"
    )]
    pub access_timeout: i64,
}

fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) => Ok(f as i64),
        Raw::Text(s) if s.trim().is_empty() => Ok(0),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Raw::Null => Ok(0),
    }
}

/// How many levels of sub-areas `hadm_area` returns below the requested code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LowSearch {
    #[serde(rename = "0")]
    None,
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl LowSearch {
    pub fn as_str(&self) -> &'static str {
        match self {
            LowSearch::None => "0",
            LowSearch::One => "1",
            LowSearch::Two => "2",
        }
    }
}

impl fmt::Display for LowSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LowSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(LowSearch::None),
            "1" => Ok(LowSearch::One),
            "2" => Ok(LowSearch::Two),
            other => Err(format!("low_search must be 0, 1 or 2, got '{}'", other)),
        }
    }
}

/// Coordinate system of geocode results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    #[default]
    Wgs84,
    Utmk,
}

impl FromStr for Crs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wgs84" | "epsg:4326" => Ok(Crs::Wgs84),
            "utmk" | "utm-k" | "epsg:5179" => Ok(Crs::Utmk),
            other => Err(format!("unknown coordinate system '{}'", other)),
        }
    }
}

/// Parameters of an administrative boundary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryQuery {
    pub adm_cd: Option<String>,
    pub low_search: LowSearch,
    pub year: String,
}

impl Default for BoundaryQuery {
    fn default() -> Self {
        Self {
            adm_cd: None,
            low_search: LowSearch::default(),
            year: "2023".to_string(),
        }
    }
}
