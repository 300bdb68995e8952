// Entrypoint for the CLI application.
// - Keeps `main` small: read settings, build the two HTTP clients and hand
//   them to the UI loop.
// - Returns `anyhow::Result` so setup failures print and exit non-zero.

use spe_demo_cli::api::GraphClient;
use spe_demo_cli::auth::ClientCredentials;
use spe_demo_cli::config::{self, Settings};
use spe_demo_cli::{logging, ui::main_menu};

fn main() -> anyhow::Result<()> {
    // `.env` files come first: they may set SPE_DEMO_LOG.
    let env_files = config::load_env_files();
    logging::init_logging()?;
    env_files.log();

    // CLIENT_ID, TENANT_ID, CLIENT_SECRET and CONTAINER_TYPE_ID, from the
    // environment or a `.env` file. See `config::Settings::from_env`.
    let settings = Settings::from_env();
    let missing = settings.missing();
    if !missing.is_empty() {
        tracing::warn!(?missing, "configuration incomplete, remote calls will fail");
    }

    let gateway = GraphClient::new(&settings)?;
    let credentials = ClientCredentials::new(&settings)?;

    // Blocks until the user picks "Exit".
    main_menu(&gateway, &credentials)?;
    Ok(())
}
