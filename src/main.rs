use std::process::ExitCode;

use place_hours::{
    config::Config,
    error::Error,
    server::server::{serve, Server},
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::load()?;
    let address = config.socket_addr()?;
    let server = Server::setup(config.tz()?);

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| Error::Bind {
            address: address.to_string(),
            source,
        })?;
    info!("Listening on {address}, evaluating in {}", server.timezone());

    serve(listener, server).await;
    Ok(())
}
