pub mod export;
pub mod geojson;
pub mod projection;
pub mod sgis;
pub mod token;

pub use crate::domain::model::{AuthResult, BoundaryQuery, Crs, LowSearch, Record};
pub use crate::domain::ports::{ConfigProvider, SgisApi, Storage};
pub use crate::utils::error::Result;
