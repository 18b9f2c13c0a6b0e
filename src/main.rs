use clap::Parser;
use copyforge::config::setup_logging;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = copyforge::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    if let Err(err) =
        copyforge::web::setup_server(&cli.listen_address, cli.port, &cli.service).await
    {
        error!("Application error: {}", err);
    }
}
