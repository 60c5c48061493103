use std::env;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use ethers::types::Address;

use aa_transfer::configure::load_config;
use aa_transfer::logger::setup_logger;
use aa_transfer::transfer::adapters::{
    AbstractionService, EnclaveHttp, LocalWalletSigner, MockService, MockWallet, WalletProvider,
};
use aa_transfer::transfer::{OrchestratorConfig, TransferOrchestrator, TransferRequest};

#[derive(Debug, Parser)]
#[command(
    name = "aa-transfer",
    about = "Send an ERC-20 transfer through a hosted smart account"
)]
struct Args {
    /// Recipient address (0x...)
    recipient: String,

    /// Token amount as a decimal string, e.g. "1.5"
    amount: String,

    /// Run against scripted in-process collaborators instead of live services
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Args::parse();
    let config = load_config()?;
    setup_logger(&config)?;

    let token_address: Address = config
        .token_address
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid token_address {:?}: {:?}", config.token_address, e))?;

    let orchestrator_config = OrchestratorConfig {
        network_id: config.network_id,
        token_address,
        token_decimals: config.token_decimals,
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        explorer_url: config.explorer_url.clone(),
    };

    let (service, wallet): (Arc<dyn AbstractionService>, Option<Arc<dyn WalletProvider>>) =
        if args.mock {
            let signer: Address = "0x1111111111111111111111111111111111111111"
                .parse()
                .expect("static address");
            (
                Arc::new(MockService::new()),
                Some(Arc::new(MockWallet::new(vec![signer]))),
            )
        } else {
            // The signing key plays the part of the browser wallet
            let signing_key = env::var("WALLET_PRIVATE_KEY")
                .expect("WALLET_PRIVATE_KEY must be set (or pass --mock)");
            (
                Arc::new(EnclaveHttp::new(
                    config.service_url.clone(),
                    config.api_key.clone(),
                )),
                Some(Arc::new(LocalWalletSigner::from_private_key(&signing_key)?)),
            )
        };

    let orchestrator = TransferOrchestrator::new(service, wallet, orchestrator_config);

    let accounts = match orchestrator.connect().await {
        Ok(accounts) => accounts,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Ok(());
        }
    };

    println!("Connected: {}", short_address(accounts.wallet));
    println!("Smart account: {:#x}", accounts.smart_account);

    // Give the first balance fetch a moment to land
    tokio::time::sleep(Duration::from_millis(500)).await;
    if let Some(balance) = orchestrator.formatted_balance() {
        println!("Balance: {}", balance);
    }

    let request = TransferRequest {
        recipient: args.recipient.clone(),
        amount: args.amount.clone(),
    };
    match orchestrator.transfer(&request).await {
        Ok(submitted) => {
            println!("Transfer initiated successfully!");
            println!("Transaction: {}", submitted.explorer_url);
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
        }
    }

    orchestrator.shutdown();
    Ok(())
}

fn short_address(address: Address) -> String {
    let full = format!("{:#x}", address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
