use std::{process, sync::Arc};

use md2slides::{
    application::{convert::ConversionSettings, error::AppError},
    config,
    infra::{
        error::InfraError,
        google::{self, GoogleOAuthClient, GoogleSlidesClient},
        http::{self, AppState},
        telemetry,
    },
};
use tokio::{net::TcpListener, sync::Notify};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

mod batch_tool;

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

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args.command.unwrap_or(config::Command::Serve);

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve => run_serve(settings).await,
        config::Command::Batch(args) => batch_tool::print_batch(&settings, &args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let client = settings
        .google
        .require_client()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;
    let http_client = google::build_client(&settings.google)?;

    let oauth = GoogleOAuthClient::new(http_client.clone(), client, &settings.google);
    let slides = GoogleSlidesClient::new(http_client, settings.google.slides_api_base.clone());
    let state = AppState::new(
        Arc::new(oauth),
        Arc::new(slides),
        ConversionSettings {
            delimiter: settings.slides.delimiter.clone(),
            default_title: settings.slides.default_title.clone(),
        },
        settings.session.cookie_secure,
    );

    serve_http(&settings, http::build_router(state)).await
}

async fn serve_http(settings: &config::Settings, router: axum::Router) -> Result<(), AppError> {
    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        addr = %settings.server.addr,
        redirect_uri = %settings.google.redirect_uri,
        "listening"
    );

    let stop = Arc::new(Notify::new());
    let stopped = Arc::clone(&stop);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { stopped.notified().await })
            .await
    });

    tokio::select! {
        finished = &mut server => return server_result(finished),
        () = shutdown_signal() => {}
    }

    info!(
        grace_seconds = settings.server.graceful_shutdown.as_secs(),
        "shutting down"
    );
    stop.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(finished) => server_result(finished),
        Err(_) => {
            warn!("graceful shutdown timed out; dropping open connections");
            Ok(())
        }
    }
}

fn server_result(
    finished: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match finished {
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
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
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
