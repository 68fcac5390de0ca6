//! jmx-relay CLI entry point.

use jmx_relay::cli::{self, Cli};
use jmx_relay::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    cli::execute(cli).await
}
