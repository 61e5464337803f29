use {
    crate::{
        api::dto,
        domain::transfer::TokenTransfer,
        engine::Engine,
        infra::{cli, config, signer},
    },
    alloy::signers::local::PrivateKeySigner,
    anyhow::Context,
    clap::Parser,
    serde_json::Value,
    tracing_subscriber::EnvFilter,
};

/// Parses the command line, runs the command and prints its result as JSON.
pub async fn start(args: impl IntoIterator<Item = String>) -> anyhow::Result<()> {
    let args = cli::Args::parse_from(args);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!(config = ?args.config, "starting wallet engine");

    let engine = Engine::new(config::file::load(&args.config).await);
    let output = run(&engine, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(engine: &Engine, command: cli::Command) -> anyhow::Result<Value> {
    let output = match command {
        cli::Command::Balances { owner } => {
            let balances = engine.balances().get_or_fetch(owner).await;
            serde_json::to_value(dto::Balances::from_domain(owner, &balances))?
        }
        cli::Command::Estimate {
            chain,
            from,
            to,
            amount,
        } => {
            let chain = engine.chain(&chain)?;
            let estimate = engine.estimator().estimate(chain, from, to, &amount).await?;
            serde_json::to_value(dto::Estimate::from_domain(&estimate))?
        }
        cli::Command::MaxSendable { chain, from, to } => {
            let chain = engine.chain(&chain)?;
            let balances = engine.balances().get_or_fetch(from).await;
            let balance = &balances
                .chain(&chain.id.0)
                .context("chain missing from balances")?
                .native
                .amount;
            let max = engine
                .estimator()
                .max_sendable(chain, from, to, balance)
                .await;
            serde_json::to_value(dto::MaxSendable::from_domain(&max))?
        }
        cli::Command::SendNative {
            chain,
            to,
            amount,
            signer,
        } => {
            let chain = engine.chain(&chain)?;
            let signer = load_signer(&signer)?;
            let outcome = engine
                .executor()
                .send_native(&signer, to, &amount, chain, None)
                .await;
            engine.balances().invalidate(signer.address()).await;
            serde_json::to_value(dto::Outcome::from_domain(chain, &outcome))?
        }
        cli::Command::SendToken {
            chain,
            token,
            to,
            amount,
            signer,
        } => {
            let chain = engine.chain(&chain)?;
            let token = chain
                .token(&token)
                .with_context(|| format!("token {token} is not supported on {}", chain.id))?;
            let signer = load_signer(&signer)?;
            let transfer = TokenTransfer {
                token: token.address,
                to,
                amount,
            };
            let outcome = engine
                .executor()
                .send_token(&signer, &transfer, chain, None)
                .await;
            engine.balances().invalidate(signer.address()).await;
            serde_json::to_value(dto::Outcome::from_domain(chain, &outcome))?
        }
    };
    Ok(output)
}

fn load_signer(args: &cli::Signer) -> anyhow::Result<PrivateKeySigner> {
    let signer = match (&args.private_key, &args.mnemonic) {
        (Some(key), _) => signer::from_private_key(key)?,
        (None, Some(phrase)) => signer::from_mnemonic(phrase, args.account_index)?,
        (None, None) => anyhow::bail!("either a private key or a mnemonic is required"),
    };
    Ok(signer)
}
