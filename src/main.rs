use clap::{Parser, Subcommand};
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use safe_multiexec::{
    actions::{Action, TransferRecord, prepare_calls, resolve_transfers},
    config::Config,
    context::RunContext,
    parse_address,
    safe::{SafeFamily, SafeSigner},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Execute one administrative action on every child of a parent Safe.
#[derive(Parser, Debug)]
#[command(name = "safe-multiexec", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config/default.toml")]
    config: String,

    /// Post every batch without asking
    #[arg(long, default_value_t = false)]
    yes: bool,

    /// Parent Safe (overrides `family.parent`)
    #[arg(long)]
    parent: Option<String>,

    /// Comma separated child Safes (overrides `family.children`)
    #[arg(long, value_delimiter = ',')]
    sub_safes: Option<Vec<String>>,

    /// Private key of a parent owner, used to sign the batches
    #[arg(long, env = "PROPOSER_PK", hide_env_values = true)]
    proposer_pk: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an owner to every child Safe
    AddOwner {
        #[arg(long)]
        new_owner: String,
        #[arg(long, default_value_t = 1)]
        threshold: u64,
    },
    /// Claim vested airdrop tokens into the parent
    Claim,
    /// Redeem the airdrop allocation of every child
    Redeem,
    /// Delegate Snapshot votes of every child to the parent
    SetDelegate,
    ClearDelegate,
    /// Pay out transfers listed in a JSON file from the parent
    Transfer {
        #[arg(long)]
        file: String,
    },
}

impl Command {
    fn action(&self) -> anyhow::Result<Action> {
        Ok(match self {
            Command::AddOwner {
                new_owner,
                threshold,
            } => Action::AddOwner {
                new_owner: parse_address(new_owner)?,
                threshold: U256::from(*threshold),
            },
            Command::Claim => Action::Claim,
            Command::Redeem => Action::Redeem,
            Command::SetDelegate => Action::SetDelegate,
            Command::ClearDelegate => Action::ClearDelegate,
            Command::Transfer { .. } => anyhow::bail!("transfers are sent by the parent itself"),
        })
    }
}

fn transaction_queue(parent: Address) -> String {
    format!(
        "https://app.safe.global/transactions/queue?safe=eth:{}",
        to_checksum(&parent, None)
    )
}

fn load_family(cli: &Cli, config: &Config) -> anyhow::Result<SafeFamily> {
    let parent = cli
        .parent
        .clone()
        .or_else(|| config.family.parent.clone())
        .ok_or_else(|| anyhow::anyhow!("no parent Safe given (--parent or family.parent)"))?;
    let children = cli
        .sub_safes
        .clone()
        .unwrap_or_else(|| config.family.children.clone());
    Ok(SafeFamily::parse(&parent, &children)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the key may come from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    info!("safe-multiexec starting with config: {:?}", config);

    let family = load_family(&cli, &config)?;
    let signer = SafeSigner::from_hex(&cli.proposer_pk)?;
    let context = RunContext::from_config(config, cli.yes)?;
    let orchestrator = context.orchestrator();

    let nonces = match &cli.command {
        Command::Transfer { file } => {
            let records = TransferRecord::load_all(file)?;
            let mut cache = context.decimals_cache();
            let transfers = resolve_transfers(&records, &mut cache).await?;
            for transfer in &transfers {
                info!("{}", transfer);
            }
            let items = transfers.iter().map(|t| t.as_batch_item()).collect();
            orchestrator.run_items(family.parent, items, &signer).await?
        }
        command => {
            let action = command.action()?;
            let calls = prepare_calls(
                &action,
                &family,
                context.chain.as_ref(),
                context.allocations.clone(),
                &context.config.delegation,
            )
            .await?;
            orchestrator.run(family.parent, calls, &signer).await?
        }
    };

    info!(
        "Transaction with nonce(s) {:?} posted to {}",
        nonces,
        transaction_queue(family.parent)
    );
    Ok(())
}
