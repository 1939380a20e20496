use async_trait::async_trait;
use foundation::Coordinate;
use tracing::debug;

use crate::error::GeometryError;
use crate::service::GeometryService;
use crate::summary::{GeometrySummary, PolylineMetaRequest};

pub const POLYLINE_META_PATH: &str = "/polyline-meta";

/// Geometry service reached over HTTP (`POST {base_url}/polyline-meta`).
#[derive(Debug, Clone)]
pub struct HttpGeometryService {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGeometryService {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), POLYLINE_META_PATH);
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl GeometryService for HttpGeometryService {
    async fn compute(&self, coordinates: &[Coordinate]) -> Result<GeometrySummary, GeometryError> {
        let body = PolylineMetaRequest {
            waypoints: coordinates.to_vec(),
        };
        debug!(
            "POST {} with {} waypoints",
            self.endpoint,
            body.waypoints.len()
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeometryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeometryError::Status(status.as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GeometryError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| GeometryError::Decode(e.to_string()))
    }
}
