//! The `darkroom url` command: print the public URL of a storage key.

use clap::Args;
use darkroom_core::storage::public_url;
use darkroom_core::Config;

/// Arguments for the `url` command.
#[derive(Args, Debug)]
pub struct UrlArgs {
    /// Storage key, e.g. `20240601_123456_a1b2c3d4_holiday.jpg`
    pub key: String,
}

/// Execute the url command.
pub fn execute(args: UrlArgs, config: &Config) -> anyhow::Result<()> {
    println!("{}", public_url(&config.storage, &args.key));
    Ok(())
}
