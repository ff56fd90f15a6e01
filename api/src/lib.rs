pub mod accounts;
pub mod auth;
pub mod client_state;
pub mod config;
pub mod error;
pub mod obfuscate_errors;
pub mod panic_handler;
pub mod projects;
pub mod routes;
pub mod search_panel;
pub mod shared_state;
pub mod tracing_config;

pub use error::{Error, Result};

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use axum::{middleware, routing::IntoMakeService, Extension, Router};
use eyre::eyre;
use hyper::server::conn::AddrIncoming;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

use project_board_db::{EntityStore, MemoryStore};
use project_board_storage::{ProviderConfig, S3ProviderConfig};

use crate::{
    accounts::Accounts, obfuscate_errors::ObfuscateErrorLayer, projects::ProjectService,
    shared_state::InnerState,
};

pub struct Server {
    pub host: String,
    pub port: u16,
    pub server: axum::Server<AddrIncoming, IntoMakeService<Router>>,
}

impl Server {
    pub async fn run(self) -> Result<(), eyre::Report> {
        self.server.await?;
        Ok(())
    }
}

/// Connect to Postgres when a database URL is given, or keep everything in memory.
pub async fn create_store(database_url: Option<&str>) -> Result<Arc<dyn EntityStore>, eyre::Report> {
    match database_url {
        None => {
            event!(
                Level::WARN,
                "No database configured, data will be kept in memory"
            );
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "postgres")]
        Some(url) => {
            let pool = project_board_db::connect(url, 32).map_err(|e| eyre!("{e}"))?;
            let store = project_board_db::PgStore::new(pool);
            store.run_migrations().await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => Err(eyre!(
            "A database URL was given, but this build does not include Postgres support"
        )),
    }
}

fn provider_config(config: &config::Config) -> Result<ProviderConfig, eyre::Report> {
    let s3 = S3ProviderConfig {
        endpoint: config.s3_endpoint.as_deref().map(str::parse).transpose()?,
        region: config.s3_region.clone(),
        access_key_id: config.s3_access_key_id.clone(),
        secret_key: config.s3_secret_key.clone(),
        virtual_host_style: config.s3_virtual_host_style,
    };

    let provider = ProviderConfig::from_name(
        &config.storage_provider,
        config.storage_location.clone(),
        s3,
    )?;
    Ok(provider)
}

pub async fn create_server(config: config::Config) -> Result<Server, eyre::Report> {
    let production = config.env != "development" && !cfg!(debug_assertions);

    let store = create_store(config.database_url.as_deref()).await?;

    let provider = provider_config(&config)?;
    let blobs = Arc::new(provider.create_operator(&config.public_url_base)?);

    // Local files are served by this process when they have a path on this host.
    let serve_files: Option<PathBuf> = match &provider {
        ProviderConfig::Local { root }
            if config.public_url_base.starts_with('/') && config.public_url_base.len() > 1 =>
        {
            Some(root.clone())
        }
        _ => None,
    };

    let timeout = (config.store_timeout_ms > 0)
        .then(|| Duration::from_millis(config.store_timeout_ms));

    let state = Arc::new(InnerState {
        production,
        projects: Arc::new(ProjectService::new(store.clone(), blobs, timeout)),
        accounts: Accounts::new(store, chrono::Duration::days(config.session_days)),
    });

    let mut app = Router::new().nest("/api", routes::configure_routes(Router::new()));
    if let Some(root) = serve_files {
        app = app.nest_service(
            config.public_url_base.trim_end_matches('/'),
            ServeDir::new(root),
        );
    }

    let app = app.layer(
        // Global middlewares
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(move |err| {
                panic_handler::handle_panic(production, err)
            }))
            .layer(ObfuscateErrorLayer::new(production))
            .compression()
            .decompression()
            .set_x_request_id(MakeRequestUuid)
            .propagate_x_request_id()
            .layer(Extension(state))
            .layer(middleware::from_fn(auth::authenticate))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO)),
            )
            .into_inner(),
    );

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let builder = axum::Server::try_bind(&addr)?;
    let server = builder.serve(app.into_make_service());

    // The port may have been chosen by the OS.
    let port = server.local_addr().port();
    event!(Level::INFO, "Listening on {}:{}", config.host, port);

    Ok(Server {
        host: config.host,
        port,
        server,
    })
}
