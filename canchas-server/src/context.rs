use std::sync::Arc;

use axum::extract::FromRef;
use canchas_app::{App, PgDatabase};

/// The app as served, backed by postgres
pub type CanchasApp = App<PgDatabase>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub app: Arc<CanchasApp>,
}
