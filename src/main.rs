use std::{process, sync::Arc};

use portfolio_api::{
    application::{
        error::AppError,
        repos::Repositories,
        seed::{SeedCommand, seed},
    },
    cache::{CachePolicy, CacheState, ResponseCache},
    config::{self, SeedArgs, StorageBackend},
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        memory::InMemoryRepositories,
        notify, telemetry,
        uploads::UploadStorage,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Seed(args) => run_seed(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    match settings.database.backend {
        StorageBackend::Postgres => {
            let repositories = init_postgres(&settings).await?;
            serve_http(&settings, repositories).await
        }
        StorageBackend::Memory => {
            warn!(
                target = "portfolio::startup",
                "serving from in-memory storage; all data is lost on exit"
            );
            serve_http(&settings, Arc::new(InMemoryRepositories::new())).await
        }
    }
}

async fn run_seed(settings: config::Settings, args: SeedArgs) -> Result<(), AppError> {
    if args.admin_password.chars().count() < 6 {
        return Err(AppError::validation(
            "admin password must be at least 6 characters long",
        ));
    }

    let command = SeedCommand {
        admin_name: args.admin_name,
        admin_email: settings.auth.admin_email.clone(),
        admin_password: args.admin_password,
    };

    let report = match settings.database.backend {
        StorageBackend::Postgres => seed(init_postgres(&settings).await?, command).await,
        StorageBackend::Memory => {
            warn!(
                target = "portfolio::seed",
                "seeding in-memory storage; nothing will persist"
            );
            seed(Arc::new(InMemoryRepositories::new()), command).await
        }
    }
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    info!(
        target = "portfolio::seed",
        admin_created = report.admin_created,
        skills_created = report.skills_created,
        services_created = report.services_created,
        "seed completed"
    );
    Ok(())
}

async fn init_postgres(settings: &config::Settings) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let repositories = PostgresRepositories::new(pool);
    repositories
        .health_check()
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    info!(target = "portfolio::startup", "database connected");
    Ok(Arc::new(repositories))
}

fn build_state<R: Repositories>(
    settings: &config::Settings,
    repositories: Arc<R>,
) -> Result<ApiState, AppError> {
    let notifier = notify::from_settings(&settings.notify).map_err(AppError::from)?;
    let upload_storage = UploadStorage::new(
        settings.uploads.directory.clone(),
        settings.uploads.max_file_bytes.get(),
    )
    .map_err(|err| AppError::from(InfraError::from(err)))?;
    let cache = CacheState {
        cache: ResponseCache::new(),
        policy: Arc::new(CachePolicy::from(&settings.cache)),
    };

    Ok(ApiState::new(
        repositories,
        &settings.auth,
        notifier,
        cache,
        Arc::new(upload_storage),
    ))
}

async fn serve_http<R: Repositories>(
    settings: &config::Settings,
    repositories: Arc<R>,
) -> Result<(), AppError> {
    let state = build_state(settings, repositories)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "portfolio::startup",
        addr = %settings.server.addr,
        "listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        () = shutdown_signal() => {}
    }

    info!(target = "portfolio::shutdown", "draining connections");
    let _ = stop_tx.send(());
    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!(
                target = "portfolio::shutdown",
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out"
            );
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
