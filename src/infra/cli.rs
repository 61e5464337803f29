//! Command line arguments of the `wallet-engine` binary.

use {
    crate::domain::eth,
    bigdecimal::BigDecimal,
    clap::{Parser, Subcommand},
    std::path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Log filter in `tracing_subscriber::EnvFilter` syntax.
    #[clap(long, env, default_value = "warn,wallet_engine=info")]
    pub log: String,

    /// Path to the TOML config holding the chain registry.
    #[clap(long, env)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Print the balances of an address on every chain.
    Balances {
        #[clap(long)]
        owner: eth::Address,
    },
    /// Estimate the network fee of a native transfer.
    Estimate {
        #[clap(long)]
        chain: String,
        #[clap(long)]
        from: eth::Address,
        #[clap(long)]
        to: eth::Address,
        #[clap(long)]
        amount: BigDecimal,
    },
    /// Print the largest native amount `from` can send after fees.
    MaxSendable {
        #[clap(long)]
        chain: String,
        #[clap(long)]
        from: eth::Address,
        #[clap(long)]
        to: eth::Address,
    },
    /// Send the native asset.
    SendNative {
        #[clap(long)]
        chain: String,
        #[clap(long)]
        to: eth::Address,
        #[clap(long)]
        amount: BigDecimal,
        #[command(flatten)]
        signer: Signer,
    },
    /// Send a registry token.
    SendToken {
        #[clap(long)]
        chain: String,
        /// Symbol of the token as configured in the registry.
        #[clap(long)]
        token: String,
        #[clap(long)]
        to: eth::Address,
        #[clap(long)]
        amount: BigDecimal,
        #[command(flatten)]
        signer: Signer,
    },
}

#[derive(clap::Args, Debug)]
pub struct Signer {
    /// Hex encoded private key of the sending account.
    #[clap(
        long,
        env,
        hide_env_values = true,
        required_unless_present = "mnemonic",
        conflicts_with = "mnemonic"
    )]
    pub private_key: Option<String>,

    /// BIP-39 phrase of the sending account.
    #[clap(long, env, hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Account index to derive from the mnemonic.
    #[clap(long, default_value_t = 0)]
    pub account_index: u32,
}
