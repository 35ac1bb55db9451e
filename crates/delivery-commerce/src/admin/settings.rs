use crate::admin::{authorize, delete_image};
use crate::backend::Backend;
use crate::error::{CommerceError, OrNotFound};
use crate::ids::StoreSettingsId;
use crate::queries;
use crate::settings::{self, NewStoreSettings, StoreSettings, StoreSettingsPatch};
use chrono::Utc;
use delivery_auth::AuthSession;
use delivery_db::Table;
use tracing::info;

/// Bucket holding the store logo.
pub const LOGO_BUCKET: &str = "images";

/// Store name, description and logo.
#[derive(Clone)]
pub struct StoreSettingsAdmin {
    backend: Backend,
}

impl StoreSettingsAdmin {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn get(&self, session: &AuthSession) -> Result<Option<StoreSettings>, CommerceError> {
        authorize(session)?;
        Ok(settings::load(&self.backend.db).await?)
    }

    pub async fn create(
        &self,
        session: &AuthSession,
        new: NewStoreSettings,
    ) -> Result<StoreSettings, CommerceError> {
        authorize(session)?;
        new.validate().into_result()?;
        let created: StoreSettings = self
            .backend
            .db
            .insert_as(Table::StoreSettings, &new)
            .await?;
        self.backend.invalidate(&[queries::store_settings()]).await;
        info!(settings = %created.id, "store settings created");
        Ok(created)
    }

    pub async fn update(
        &self,
        session: &AuthSession,
        id: &StoreSettingsId,
        patch: StoreSettingsPatch,
    ) -> Result<StoreSettings, CommerceError> {
        authorize(session)?;
        patch.validate().into_result()?;
        let updated = self
            .backend
            .db
            .update_by_id(Table::StoreSettings, id.as_str(), &patch)
            .await
            .or_not_found(|| CommerceError::StoreSettingsNotFound(id.to_string()))?;
        self.backend.invalidate(&[queries::store_settings()]).await;
        info!(settings = %id, "store settings updated");
        Ok(updated)
    }

    /// Upload a logo as `store/logo-<millis>.<ext>` and return its public URL.
    pub async fn upload_logo(
        &self,
        session: &AuthSession,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CommerceError> {
        authorize(session)?;
        let path = logo_path(file_name, Utc::now().timestamp_millis());
        let url = self
            .backend
            .blobs
            .upload(LOGO_BUCKET, &path, bytes)
            .await?;
        info!(path = %path, "logo uploaded");
        Ok(url)
    }

    pub async fn delete_logo(&self, session: &AuthSession, url: &str) -> Result<(), CommerceError> {
        authorize(session)?;
        delete_image(self.backend.blobs.as_ref(), LOGO_BUCKET, url).await
    }
}

fn logo_path(file_name: &str, millis: i64) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("store/logo-{}.{}", millis, ext),
        _ => format!("store/logo-{}", millis),
    }
}
