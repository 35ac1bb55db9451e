use crate::admin::{authorize, delete_image, upload_image};
use crate::backend::Backend;
use crate::catalog::{
    any_id, Complement, ComplementGroup, ComplementGroupPatch, ComplementGroupWithComplements,
    ComplementPatch, NewComplement, NewComplementGroup, Product, ProductComplementGroup,
};
use crate::error::{CommerceError, OrNotFound};
use crate::ids::{ComplementGroupId, ComplementId};
use crate::queries;
use delivery_auth::AuthSession;
use delivery_db::{Query, Table};
use std::collections::HashMap;
use tracing::info;

/// Bucket for complement photos.
pub const COMPLEMENT_IMAGE_BUCKET: &str = "complements";

fn by_position() -> Query {
    Query::new()
        .order_by("sort_order", true)
        .order_by("name", true)
}

/// Complement group and complement management.
#[derive(Clone)]
pub struct ComplementAdmin {
    backend: Backend,
}

impl ComplementAdmin {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    async fn invalidate(&self) {
        self.backend
            .invalidate(&[queries::complement_groups(), queries::products()])
            .await;
    }

    /// Every group with its complements, both by `sort_order` then name.
    pub async fn list_groups(
        &self,
        session: &AuthSession,
    ) -> Result<Vec<ComplementGroupWithComplements>, CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        let groups: Vec<ComplementGroup> =
            db.query_as(Table::ComplementGroups, &by_position()).await?;
        let complements: Vec<Complement> = db.query_as(Table::Complements, &by_position()).await?;

        let mut by_group: HashMap<ComplementGroupId, Vec<Complement>> = HashMap::new();
        for complement in complements {
            by_group
                .entry(complement.group_id.clone())
                .or_default()
                .push(complement);
        }
        Ok(groups
            .into_iter()
            .map(|group| {
                let complements = by_group.remove(&group.id).unwrap_or_default();
                ComplementGroupWithComplements { group, complements }
            })
            .collect())
    }

    pub async fn get_group(
        &self,
        session: &AuthSession,
        id: &ComplementGroupId,
    ) -> Result<ComplementGroupWithComplements, CommerceError> {
        authorize(session)?;
        let group = self.find_group(id).await?;
        let complements = self.complements_of(id).await?;
        Ok(ComplementGroupWithComplements { group, complements })
    }

    async fn find_group(&self, id: &ComplementGroupId) -> Result<ComplementGroup, CommerceError> {
        self.backend
            .db
            .find_by_id(Table::ComplementGroups, id.as_str())
            .await
            .or_not_found(|| CommerceError::ComplementGroupNotFound(id.to_string()))
    }

    async fn complements_of(&self, id: &ComplementGroupId) -> Result<Vec<Complement>, CommerceError> {
        let query = by_position().eq("complement_group_id", id.as_str());
        Ok(self.backend.db.query_as(Table::Complements, &query).await?)
    }

    pub async fn create_group(
        &self,
        session: &AuthSession,
        group: NewComplementGroup,
    ) -> Result<ComplementGroup, CommerceError> {
        authorize(session)?;
        group.validate()?;
        let created: ComplementGroup = self
            .backend
            .db
            .insert_as(Table::ComplementGroups, &group)
            .await?;
        self.invalidate().await;
        info!(group = %created.id, name = %created.name, "complement group created");
        Ok(created)
    }

    /// Update a group; the resulting selection bounds must stay consistent.
    pub async fn update_group(
        &self,
        session: &AuthSession,
        id: &ComplementGroupId,
        patch: ComplementGroupPatch,
    ) -> Result<ComplementGroup, CommerceError> {
        authorize(session)?;
        let current = self.find_group(id).await?;
        patch.validate_against(&current)?;
        let updated = self
            .backend
            .db
            .update_by_id(Table::ComplementGroups, id.as_str(), &patch)
            .await
            .or_not_found(|| CommerceError::ComplementGroupNotFound(id.to_string()))?;
        self.invalidate().await;
        info!(group = %id, "complement group updated");
        Ok(updated)
    }

    /// Delete a group with its complements and product links.
    pub async fn delete_group(
        &self,
        session: &AuthSession,
        id: &ComplementGroupId,
    ) -> Result<(), CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        let by_group = Query::new().eq("complement_group_id", id.as_str());
        let unlinked = db
            .delete_where(Table::ProductComplementGroups, &by_group)
            .await?;
        let removed = db.delete_where(Table::Complements, &by_group).await?;
        db.delete_by_id(Table::ComplementGroups, id.as_str()).await?;
        self.invalidate().await;
        info!(group = %id, unlinked, removed, "complement group deleted");
        Ok(())
    }

    /// Complements of one group by `sort_order` then name.
    pub async fn list_complements(
        &self,
        session: &AuthSession,
        group_id: &ComplementGroupId,
    ) -> Result<Vec<Complement>, CommerceError> {
        authorize(session)?;
        self.complements_of(group_id).await
    }

    pub async fn create_complement(
        &self,
        session: &AuthSession,
        complement: NewComplement,
    ) -> Result<Complement, CommerceError> {
        authorize(session)?;
        complement.validate().into_result()?;
        self.find_group(&complement.group_id).await?;
        let created: Complement = self
            .backend
            .db
            .insert_as(Table::Complements, &complement)
            .await?;
        self.invalidate().await;
        info!(complement = %created.id, group = %created.group_id, "complement created");
        Ok(created)
    }

    pub async fn update_complement(
        &self,
        session: &AuthSession,
        id: &ComplementId,
        patch: ComplementPatch,
    ) -> Result<Complement, CommerceError> {
        authorize(session)?;
        patch.validate().into_result()?;
        let updated = self
            .backend
            .db
            .update_by_id(Table::Complements, id.as_str(), &patch)
            .await
            .or_not_found(|| CommerceError::ComplementNotFound(id.to_string()))?;
        self.invalidate().await;
        Ok(updated)
    }

    pub async fn delete_complement(
        &self,
        session: &AuthSession,
        id: &ComplementId,
    ) -> Result<(), CommerceError> {
        authorize(session)?;
        self.backend
            .db
            .delete_by_id(Table::Complements, id.as_str())
            .await?;
        self.invalidate().await;
        Ok(())
    }

    /// Store a complement photo and return its public URL.
    pub async fn upload_image(
        &self,
        session: &AuthSession,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CommerceError> {
        authorize(session)?;
        upload_image(
            self.backend.blobs.as_ref(),
            COMPLEMENT_IMAGE_BUCKET,
            file_name,
            bytes,
        )
        .await
    }

    pub async fn delete_image(&self, session: &AuthSession, url: &str) -> Result<(), CommerceError> {
        authorize(session)?;
        delete_image(self.backend.blobs.as_ref(), COMPLEMENT_IMAGE_BUCKET, url).await
    }

    /// Products that offer a group, by name.
    pub async fn products_using_group(
        &self,
        session: &AuthSession,
        group_id: &ComplementGroupId,
    ) -> Result<Vec<Product>, CommerceError> {
        authorize(session)?;
        let db = &self.backend.db;
        let links: Vec<ProductComplementGroup> = db
            .query_as(
                Table::ProductComplementGroups,
                &Query::new().eq("complement_group_id", group_id.as_str()),
            )
            .await?;
        if links.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<&str> = links.iter().map(|l| l.product_id.as_str()).collect();
        Ok(db
            .query_as(Table::Products, &any_id("id", &ids).order_by("name", true))
            .await?)
    }
}
