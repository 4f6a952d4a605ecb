//! Template persistence.
//!
//! The engine only ever reads and writes whole records by key, so storage
//! is a small async trait. [`MemoryStore`] backs the CLI and the tests; a
//! database-backed store implements the same trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::VorlageError;
use crate::model::{CompanyBranding, ServiceCatalogItem, Template};

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn template(&self, id: &str) -> Result<Option<Template>, VorlageError>;

    async fn branding(&self, company_type: &str) -> Result<Option<CompanyBranding>, VorlageError>;

    /// Active catalog entries of a company, ordered by category then name.
    async fn services(&self, company_type: &str) -> Result<Vec<ServiceCatalogItem>, VorlageError>;

    async fn save_template(&self, template: Template) -> Result<(), VorlageError>;

    async fn save_branding(&self, branding: CompanyBranding) -> Result<(), VorlageError>;

    /// Insert or replace by `(company_type, service_code)`.
    async fn save_service(&self, item: ServiceCatalogItem) -> Result<(), VorlageError>;
}

#[derive(Default)]
struct Tables {
    templates: HashMap<String, Template>,
    branding: HashMap<String, CompanyBranding>,
    services: HashMap<(String, String), ServiceCatalogItem>,
}

/// In-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn template(&self, id: &str) -> Result<Option<Template>, VorlageError> {
        Ok(self.tables.read().await.templates.get(id).cloned())
    }

    async fn branding(&self, company_type: &str) -> Result<Option<CompanyBranding>, VorlageError> {
        Ok(self.tables.read().await.branding.get(company_type).cloned())
    }

    async fn services(&self, company_type: &str) -> Result<Vec<ServiceCatalogItem>, VorlageError> {
        let tables = self.tables.read().await;
        let mut items: Vec<ServiceCatalogItem> = tables
            .services
            .values()
            .filter(|s| s.company_type == company_type && s.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.service_name.cmp(&b.service_name))
        });
        Ok(items)
    }

    async fn save_template(&self, template: Template) -> Result<(), VorlageError> {
        self.tables
            .write()
            .await
            .templates
            .insert(template.id.clone(), template);
        Ok(())
    }

    async fn save_branding(&self, branding: CompanyBranding) -> Result<(), VorlageError> {
        self.tables
            .write()
            .await
            .branding
            .insert(branding.company_type.clone(), branding);
        Ok(())
    }

    async fn save_service(&self, item: ServiceCatalogItem) -> Result<(), VorlageError> {
        let key = (item.company_type.clone(), item.service_code.clone());
        self.tables.write().await.services.insert(key, item);
        Ok(())
    }
}
