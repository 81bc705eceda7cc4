use carebook_api::config::ApiConfig;
use carebook_db::{create_pool, schema::initialize_database};
use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url, config.max_connections)
        .await
        .wrap_err("Failed to connect to the database")?;

    // Schema creation is idempotent, so every start can run it
    initialize_database(&db_pool).await?;

    carebook_api::start_server(config, db_pool).await?;

    Ok(())
}
