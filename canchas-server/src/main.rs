use std::{env, sync::Arc};

use anyhow::Context;
use canchas_app::{App, AuthConfig, PgDatabase};
use canchas_server::{logging, run_server, ServerContext};
use chrono::Duration;
use log::info;

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let secret = env::var("CANCHAS_JWT_SECRET").context("CANCHAS_JWT_SECRET must be set")?;

    let token_ttl_hours = env::var("CANCHAS_TOKEN_TTL_HOURS")
        .map(|x| x.parse::<i64>().expect("Token ttl must be a number"))
        .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);

    info!("Connecting to database...");
    let database = PgDatabase::new(&database_url).await?;

    info!("Running migrations...");
    database.migrate().await?;

    let app = App::new(
        database,
        AuthConfig {
            secret,
            token_ttl: Duration::hours(token_ttl_hours),
        },
    );

    run_server(ServerContext { app: Arc::new(app) }).await
}
