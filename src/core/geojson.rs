use crate::core::projection::utmk_to_wgs84;
use crate::utils::error::{Result, SgisError};
use serde_json::{Map, Value};

/// Properties SGIS attaches to every boundary feature that only repeat the
/// label point in UTM-K.
const DROPPED_PROPERTIES: [&str; 2] = ["x", "y"];

/// Rewrites an SGIS boundary FeatureCollection from UTM-K to WGS84.
///
/// Feature ids and the `x`/`y` label properties are removed, every position
/// is reprojected, and top-level members other than `type` and `features`
/// (SGIS status fields, `crs`, `bbox`) are discarded. Feature and geometry
/// `bbox` members are in UTM-K metres, so they are dropped as well.
pub fn reproject_feature_collection(collection: Value) -> Result<Value> {
    let Value::Object(mut root) = collection else {
        return Err(processing("boundary response is not a JSON object"));
    };

    match root.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        other => {
            return Err(processing(&format!(
                "expected a FeatureCollection, got {:?}",
                other
            )))
        }
    }

    let features = match root.remove("features") {
        Some(Value::Array(features)) => features,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(processing("'features' is not an array")),
    };

    let features = features
        .into_iter()
        .map(reproject_feature)
        .collect::<Result<Vec<_>>>()?;

    let mut out = Map::new();
    out.insert(
        "type".to_string(),
        Value::String("FeatureCollection".to_string()),
    );
    out.insert("features".to_string(), Value::Array(features));
    Ok(Value::Object(out))
}

fn reproject_feature(feature: Value) -> Result<Value> {
    let Value::Object(mut feature) = feature else {
        return Err(processing("feature is not a JSON object"));
    };

    // retain keeps the remaining members in their original order
    feature.retain(|key, _| key != "id" && key != "bbox");

    if let Some(Value::Object(props)) = feature.get_mut("properties") {
        props.retain(|key, _| !DROPPED_PROPERTIES.contains(&key.as_str()));
    }

    if let Some(geometry) = feature.get_mut("geometry") {
        reproject_geometry(geometry)?;
    }

    Ok(Value::Object(feature))
}

fn reproject_geometry(geometry: &mut Value) -> Result<()> {
    let Value::Object(geom) = geometry else {
        // null geometry
        return Ok(());
    };

    geom.retain(|key, _| key != "bbox");

    let kind = geom
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match kind.as_str() {
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon"
        | "MultiPolygon" => {
            if let Some(coords) = geom.get_mut("coordinates") {
                reproject_coordinates(coords)?;
            }
        }
        "GeometryCollection" => {
            if let Some(Value::Array(children)) = geom.get_mut("geometries") {
                for child in children {
                    reproject_geometry(child)?;
                }
            }
        }
        other => tracing::debug!("Leaving unknown geometry type '{}' untouched", other),
    }
    Ok(())
}

/// Walks nested coordinate arrays down to positions.
fn reproject_coordinates(coords: &mut Value) -> Result<()> {
    let Value::Array(items) = coords else {
        return Err(processing("coordinates are not an array"));
    };

    if items.first().map(Value::is_number).unwrap_or(false) {
        let x = items.first().and_then(Value::as_f64);
        let y = items.get(1).and_then(Value::as_f64);
        let (Some(x), Some(y)) = (x, y) else {
            return Err(processing("position needs numeric x and y"));
        };
        let (lon, lat) = utmk_to_wgs84(x, y);
        items[0] = number(lon)?;
        items[1] = number(lat)?;
        return Ok(());
    }

    for item in items {
        reproject_coordinates(item)?;
    }
    Ok(())
}

fn number(value: f64) -> Result<Value> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| processing("projected coordinate is not finite"))
}

fn processing(message: &str) -> SgisError {
    SgisError::ProcessingError {
        message: message.to_string(),
    }
}
