use actix_web::web;
use cart_service::config::{Settings, Storage};
use cart_service::{build_server, create_pool, run_migrations, AppServices};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let services = match &settings.storage {
        Storage::Postgres {
            database_url,
            pool_size,
        } => {
            let pool = create_pool(database_url, *pool_size).map_err(std::io::Error::other)?;
            run_migrations(&pool).map_err(std::io::Error::other)?;
            AppServices::with_pool(pool, settings.status_policy)
        }
        Storage::Memory => {
            log::warn!("Using in-memory storage; data is lost on restart");
            AppServices::in_memory(settings.status_policy)
        }
    };

    log::info!(
        "Starting server at http://{}:{} (order status policy: {:?})",
        settings.host,
        settings.port,
        settings.status_policy
    );

    build_server(web::Data::new(services), &settings.host, settings.port)?.await
}
