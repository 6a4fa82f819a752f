use acc_api::{endpoints::Endpoint, Client, Request};
use serde_json::Value;
use std::sync::Arc;

use crate::server::error::ServerError;
use crate::server::services::{with_refresh, SessionStore, TokenRefresher};

/// The five hierarchy reads, each bound to a session and wrapped in the
/// refresh-once retry.
pub struct HierarchyService {
    api: Client,
    refresher: Arc<dyn TokenRefresher>,
}

impl HierarchyService {
    pub fn new(api: Client, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { api, refresher }
    }

    pub async fn list_hubs(
        &self,
        sessions: &SessionStore,
        session_id: &str,
    ) -> Result<Vec<Value>, ServerError> {
        self.fetch(sessions, session_id, Request::hubs().list()).await
    }

    pub async fn list_projects(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        hub_id: &str,
    ) -> Result<Vec<Value>, ServerError> {
        self.fetch(sessions, session_id, Request::hubs().projects(hub_id))
            .await
    }

    pub async fn list_top_folders(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        project_id: &str,
    ) -> Result<Vec<Value>, ServerError> {
        let endpoint = Request::project(project_id).top_folders();
        self.fetch(sessions, session_id, endpoint).await
    }

    pub async fn list_folder_contents(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        project_id: &str,
        folder_id: &str,
    ) -> Result<Vec<Value>, ServerError> {
        let endpoint = Request::project(project_id).folder(folder_id).contents();
        self.fetch(sessions, session_id, endpoint).await
    }

    pub async fn list_folder_permissions(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        project_id: &str,
        folder_id: &str,
    ) -> Result<Vec<Value>, ServerError> {
        let endpoint = Request::project(project_id).folder(folder_id).permissions();
        self.fetch(sessions, session_id, endpoint).await
    }

    async fn fetch<E>(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        endpoint: E,
    ) -> Result<Vec<Value>, ServerError>
    where
        E: Endpoint + Send + Sync,
    {
        let api = &self.api;
        let endpoint = &endpoint;
        let records = with_refresh(
            sessions,
            session_id,
            self.refresher.as_ref(),
            |token| async move { api.fetch_all(endpoint, &token.access_token).await },
        )
        .await?;

        tracing::debug!(
            session_id = %session_id,
            endpoint = %endpoint.endpoint(),
            records = records.len(),
            "Fetched hierarchy records"
        );
        Ok(records)
    }
}
