use anyhow::Result;
use tracing::*;

use loghive_core::Services;
use loghive_protocol_http::HttpProtocolServer;

use crate::config::load_config;

pub(crate) async fn command(cli: &crate::Cli) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    info!(%version, "Loghive");

    let config = load_config(&cli.config)?;
    let listen = config.store.listen;
    let services = Services::new(config).await?;

    let server = HttpProtocolServer::new(&services).run(listen);

    if console::user_attended() {
        info!("--------------------------------------------");
        info!("Loghive is now running.");
        info!("Accepting HTTP connections on {listen}");
        info!("--------------------------------------------");
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Exiting");
        }
        result = server => {
            if let Err(error) = result {
                error!(?error, "HTTP server error");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
