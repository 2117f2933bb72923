//! Book Catalog Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and implementations
//! - service: Category hierarchy operations (validation, deletion guard)

pub mod config;
pub mod domain;
pub mod repository;
pub mod service;

pub use config::CatalogConfig;

use repository::{init_db, CategoryRepository, DbState};
use service::CategoryService;
use std::sync::Arc;

/// Category service backed by SQLite
pub type SqliteCategoryService = CategoryService<CategoryRepository, CategoryRepository>;

/// Application state shared across request handlers
pub struct AppState {
    pub db_state: DbState,
    pub config: CatalogConfig,
    pub categories: SqliteCategoryService,
}

/// Install the rolling file logger described by `config`
pub fn init_logging(config: &CatalogConfig) -> Result<(), String> {
    let options = rolling_logger::LoggerOptions {
        max_bytes: config.log_max_bytes,
        max_files: config.log_max_files,
        ..rolling_logger::LoggerOptions::new(&config.log_dir, &config.app_name)
    };
    rolling_logger::init_logger_with(options).map_err(|e| format!("Failed to init logger: {}", e))
}

/// Open the database and wire up services
pub async fn init_app(config: CatalogConfig) -> Result<AppState, String> {
    let db_state = init_db(&config.db_path).await?;

    let repo = Arc::new(CategoryRepository::new(db_state.connection()));
    let categories = CategoryService::new(repo.clone(), repo);

    log::info!("{} catalog initialized", config.app_name);

    Ok(AppState {
        db_state,
        config,
        categories,
    })
}

/// Logging first, then the database
pub async fn run(config: CatalogConfig) -> Result<AppState, String> {
    init_logging(&config)?;

    match init_app(config).await {
        Ok(state) => {
            let _ = rolling_logger::info("Catalog startup complete");
            Ok(state)
        }
        Err(e) => {
            let _ = rolling_logger::error(&format!("Catalog startup failed: {}", e));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::path::PathBuf;

    fn memory_config() -> CatalogConfig {
        CatalogConfig {
            db_path: PathBuf::from(":memory:"),
            ..CatalogConfig::default()
        }
    }

    #[tokio::test]
    async fn test_init_app_with_sqlite() {
        let state = init_app(memory_config()).await.expect("init");
        let categories = &state.categories;

        let a = categories.create_category("A".to_string(), None, None).await.unwrap();
        let b = categories.create_category("B".to_string(), None, Some(a.id)).await.unwrap();
        let c = categories.create_category("C".to_string(), None, Some(b.id)).await.unwrap();

        let cycle = categories.update_category(a.id, "A".to_string(), None, Some(c.id)).await;
        assert!(matches!(cycle, Err(DomainError::InvalidParentAssignment { .. })));

        let roots = categories.get_root_categories().await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, a.id);

        categories.link_book(100, c.id).await.unwrap();
        assert_eq!(
            categories.delete_category(c.id).await,
            Err(DomainError::CategoryHasDependents(c.id))
        );
        assert_eq!(
            categories.delete_category(b.id).await,
            Err(DomainError::CategoryHasDependents(b.id))
        );

        categories.unlink_book(100, c.id).await.unwrap();
        assert!(categories.delete_category(c.id).await.unwrap());
        assert!(!categories.category_exists(c.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backed_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig {
            db_path: dir.path().join("catalog.db"),
            ..CatalogConfig::default()
        };

        let id = {
            let state = init_app(config.clone()).await.unwrap();
            state
                .categories
                .create_category("Kept".to_string(), Some("persisted".to_string()), None)
                .await
                .unwrap()
                .id
        };

        let reopened = init_app(config).await.unwrap();
        let found = reopened.categories.get_category(id).await.unwrap().unwrap();
        assert_eq!(found.name, "Kept");
        assert_eq!(reopened.db_state.db_path, dir.path().join("catalog.db"));
    }
}
