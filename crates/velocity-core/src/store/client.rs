//! HTTP backend client
//!
//! Typed client over the key-value worker's REST surface. Every endpoint
//! wraps its payload in a `{success, data, error}` envelope.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::nav::session::RecentHistory;
use crate::share::relay::{LiveShareTick, TickSink};
use crate::share::viewer::TrackingFeed;

use super::types::{NewLocation, SavedLocation, SettingsPatch, TrackingState, UserSettings};
use super::StoreError;

/// JSON envelope used by every backend endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsPayload {
    items: Vec<SavedLocation>,
}

#[derive(Debug, Deserialize)]
struct DeletedPayload {
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct AckPayload {
    #[allow(dead_code)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct ResetPayload {
    reset: bool,
}

/// Client for the settings/locations/tracking backend
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client against `base_url` (e.g. `http://127.0.0.1:8787`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("VelocityOS/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        if response.status().as_u16() == 404 {
            return Err(StoreError::NotFound);
        }
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(StoreError::Rejected(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| StoreError::Decode("missing data field".to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.client.delete(self.url(path)).send().await?;
        Self::decode(response).await
    }

    /// GET /api/settings
    pub async fn settings(&self) -> Result<UserSettings, StoreError> {
        self.get("/api/settings").await
    }

    /// POST /api/settings; the backend merges the patch shallowly
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<UserSettings, StoreError> {
        self.post("/api/settings", patch).await
    }

    /// GET /api/locations
    pub async fn locations(&self) -> Result<Vec<SavedLocation>, StoreError> {
        let payload: ItemsPayload = self.get("/api/locations").await?;
        Ok(payload.items)
    }

    /// POST /api/locations
    pub async fn add_location(&self, loc: &NewLocation) -> Result<SavedLocation, StoreError> {
        self.post("/api/locations", loc).await
    }

    /// DELETE /api/locations/:id
    pub async fn remove_location(&self, id: &str) -> Result<bool, StoreError> {
        let payload: DeletedPayload = self.delete(&format!("/api/locations/{id}")).await?;
        Ok(payload.deleted)
    }

    /// GET /api/locations/recent, most recent first, max 10
    pub async fn recent_locations(&self) -> Result<Vec<SavedLocation>, StoreError> {
        let payload: ItemsPayload = self.get("/api/locations/recent").await?;
        Ok(payload.items)
    }

    /// POST /api/locations/recent, an upsert by id
    pub async fn log_recent_location(&self, loc: &SavedLocation) -> Result<(), StoreError> {
        let _: AckPayload = self.post("/api/locations/recent", loc).await?;
        Ok(())
    }

    /// DELETE /api/locations/recent
    pub async fn clear_recent(&self) -> Result<(), StoreError> {
        let _: AckPayload = self.delete("/api/locations/recent").await?;
        Ok(())
    }

    /// GET /api/tracking/:id; yields `NotFound` when the session ended
    pub async fn tracking(&self, tracking_id: &str) -> Result<TrackingState, StoreError> {
        self.get(&format!("/api/tracking/{tracking_id}")).await
    }

    /// POST /api/tracking/:id; the backend stamps `lastUpdate`
    pub async fn push_tracking(
        &self,
        tracking_id: &str,
        tick: &LiveShareTick,
    ) -> Result<(), StoreError> {
        let _: AckPayload = self
            .post(&format!("/api/tracking/{tracking_id}"), tick)
            .await?;
        Ok(())
    }

    /// POST /api/system/reset, clearing settings, locations and history
    pub async fn reset_system(&self) -> Result<(), StoreError> {
        let payload: ResetPayload = self.post("/api/system/reset", &()).await?;
        if !payload.reset {
            return Err(StoreError::Rejected("reset refused".to_string()));
        }
        Ok(())
    }
}

impl RecentHistory for HttpBackend {
    fn record_recent(
        &self,
        loc: SavedLocation,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move { self.log_recent_location(&loc).await }
    }
}

impl TickSink for HttpBackend {
    fn push_tick(
        &self,
        tracking_id: &str,
        tick: LiveShareTick,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move { self.push_tracking(tracking_id, &tick).await }
    }
}

impl TrackingFeed for HttpBackend {
    fn fetch_tracking(
        &self,
        tracking_id: &str,
    ) -> impl Future<Output = Result<TrackingState, StoreError>> + Send {
        async move { self.tracking(tracking_id).await }
    }
}
