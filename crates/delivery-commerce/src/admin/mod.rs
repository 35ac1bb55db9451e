//! Back-office services.
//!
//! Every entry point takes the caller's [`AuthSession`] and refuses to run
//! without a live one. Writes invalidate the named queries they affect.

mod categories;
mod complements;
mod customers;
mod links;
mod orders;
mod products;
mod settings;

pub use categories::CategoryAdmin;
pub use complements::ComplementAdmin;
pub use customers::CustomerAdmin;
pub use links::LinkDiff;
pub use orders::OrderAdmin;
pub use products::ProductAdmin;
pub use settings::{StoreSettingsAdmin, LOGO_BUCKET};

use crate::backend::Backend;
use crate::error::CommerceError;
use delivery_auth::{require_session, AuthSession};
use delivery_db::{path_from_public_url, unique_file_name, BlobStorage};

/// All back-office services over one backend.
#[derive(Clone)]
pub struct Admin {
    pub categories: CategoryAdmin,
    pub products: ProductAdmin,
    pub complements: ComplementAdmin,
    pub customers: CustomerAdmin,
    pub orders: OrderAdmin,
    pub settings: StoreSettingsAdmin,
}

impl Admin {
    pub fn new(backend: Backend) -> Self {
        Self {
            categories: CategoryAdmin::new(backend.clone()),
            products: ProductAdmin::new(backend.clone()),
            complements: ComplementAdmin::new(backend.clone()),
            customers: CustomerAdmin::new(backend.clone()),
            orders: OrderAdmin::new(backend.clone()),
            settings: StoreSettingsAdmin::new(backend),
        }
    }
}

pub(crate) fn authorize(session: &AuthSession) -> Result<(), CommerceError> {
    let user = require_session(session)?;
    tracing::trace!(user = %user.email, "admin call");
    Ok(())
}

/// Upload under a collision-free name in `bucket`.
pub(crate) async fn upload_image(
    blobs: &dyn BlobStorage,
    bucket: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, CommerceError> {
    let path = unique_file_name(file_name);
    let url = blobs.upload(bucket, &path, bytes).await.map_err(|e| {
        tracing::error!(bucket, error = %e, "image upload failed");
        CommerceError::from(e)
    })?;
    tracing::info!(bucket, path = %path, "image uploaded");
    Ok(url)
}

/// Remove the object behind a public URL. URLs outside `bucket` are ignored.
pub(crate) async fn delete_image(
    blobs: &dyn BlobStorage,
    bucket: &str,
    url: &str,
) -> Result<(), CommerceError> {
    let Some(path) = path_from_public_url(url, bucket) else {
        tracing::debug!(bucket, url, "not a bucket url; nothing to delete");
        return Ok(());
    };
    blobs.remove(bucket, &[path]).await?;
    Ok(())
}
