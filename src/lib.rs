//! Bookstore application library
//!
//! Wires the feature modules onto the kernel, database and HTTP crates.

pub mod modules;

use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Registry holding every feature module of the service
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Connect and apply pending migrations, returning how many ran
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let registry = build_registry();
    let pool = bookstore_db::connect(&settings.database).await?;
    let applied = bookstore_db::run_migrations(&pool, &registry.collect_migrations()).await;
    pool.close().await;
    applied
}

/// Bootstrap the schema, then serve HTTP until shutdown
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry();

    let pool = bookstore_db::connect(&settings.database).await?;
    bookstore_db::run_migrations(&pool, &registry.collect_migrations()).await?;

    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bookstore_http::start_server(&registry, &ctx).await;

    registry.stop_all().await?;
    pool.close().await;

    served
}
