use anyhow::Context;
use bookstore_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    bookstore_telemetry::init(&settings.telemetry).ok();

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.redacted_url(),
        "bookstore-app bootstrap starting"
    );

    bookstore_app::serve(settings).await
}
