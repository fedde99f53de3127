use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
};

use axum::routing::get;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod auth;
mod context;
mod docs;
mod errors;
mod notifications;
mod reservations;
mod schemas;
mod serialized;
mod tournaments;

pub mod logging;

pub use context::{CanchasApp, ServerContext};

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 8080;

pub type Router = axum::Router<ServerContext>;

/// Starts the canchas server
pub async fn run_server(context: ServerContext) -> anyhow::Result<()> {
    let port = env::var("CANCHAS_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let root_router = Router::new()
        .merge(auth::router())
        .nest("/reservas", reservations::router())
        .nest("/api/torneos", tournaments::router())
        .nest("/notificaciones", notifications::router())
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on port {port}");

    axum::serve(listener, root_router.into_make_service()).await?;

    Ok(())
}
