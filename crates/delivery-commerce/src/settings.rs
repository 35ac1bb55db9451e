//! Store identity shown in the menu header.

use crate::error::ValidationErrors;
use crate::ids::StoreSettingsId;
use chrono::{DateTime, Utc};
use delivery_db::{Db, DbError, Query, Table};
use serde::{Deserialize, Serialize};

/// The single settings row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    pub id: StoreSettingsId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The oldest settings row, if one was ever saved.
pub(crate) async fn load(db: &Db) -> Result<Option<StoreSettings>, DbError> {
    db.query_optional(
        Table::StoreSettings,
        &Query::new().order_by("created_at", true),
    )
    .await
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStoreSettings {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewStoreSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(!self.name.trim().is_empty(), "name", "Name is required");
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StoreSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<Option<String>>,
}

impl StoreSettingsPatch {
    pub(crate) fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Name is required");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required() {
        assert!(NewStoreSettings::new("Cantina da Nona").validate().is_empty());
        assert_eq!(NewStoreSettings::new("  ").validate().get("name"), Some("Name is required"));

        let patch = StoreSettingsPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(!patch.validate().is_empty());
        assert!(StoreSettingsPatch::default().validate().is_empty());
    }
}
