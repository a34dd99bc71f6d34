//! Server construction and middleware wiring.

mod config;

pub use config::{ServerConfig, ServerSettings};

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::RegistrationService;
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::form::index;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users;
use crate::middleware::Trace;
use crate::outbound::persistence::{Database, DbConfig, DbError, DieselUserStore};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Shared state handed to every Actix worker.
#[derive(Clone)]
pub struct AppDependencies {
    /// Readiness and liveness flags.
    pub health_state: web::Data<HealthState>,
    /// Registry port used by the users handlers.
    pub http_state: web::Data<HttpState>,
}

/// Assemble the application: JSON error handling, tracing, the `/api`
/// scope, the registration page, probes and (in debug builds) Swagger UI.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(Trace)
        .service(web::scope("/api").configure(users::configure))
        .service(index)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Open the SQLite store and wrap it in the registration service.
///
/// # Errors
/// Returns [`DbError`] when the database file cannot be opened or its schema
/// cannot be created.
pub async fn build_http_state(db: &DbConfig) -> Result<HttpState, DbError> {
    let database = Database::open(db.clone()).await?;
    let store = Arc::new(DieselUserStore::new(database, Arc::new(DefaultClock)));
    Ok(HttpState::new(Arc::new(RegistrationService::new(store))))
}

/// A started server together with the address it actually bound.
pub struct BoundServer {
    /// Server future; await or spawn it to drive the listener.
    pub server: Server,
    /// Bound address, which differs from the requested one for port 0.
    pub local_addr: SocketAddr,
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The user store is opened before binding so startup fails fast when the
/// database is unusable.
///
/// # Errors
/// Propagates [`std::io::Error`] when opening the store, binding the socket,
/// or starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<BoundServer> {
    let http_state = web::Data::new(
        build_http_state(&config.db)
            .await
            .map_err(std::io::Error::other)?,
    );
    let ServerConfig {
        bind_addr,
        db: _,
        workers,
        handle_signals,
    } = config;

    let server_health_state = health_state.clone();
    let mut http_server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    });
    if let Some(workers) = workers {
        http_server = http_server.workers(workers);
    }
    if !handle_signals {
        http_server = http_server.disable_signals();
    }
    let http_server = http_server.bind(bind_addr)?;
    let local_addr = http_server
        .addrs()
        .first()
        .copied()
        .ok_or_else(|| std::io::Error::other("server bound no address"))?;
    let server = http_server.run();

    health_state.mark_ready();
    info!(%local_addr, "user registry listening");
    Ok(BoundServer { server, local_addr })
}
