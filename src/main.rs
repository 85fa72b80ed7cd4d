use teumnirm::commands::Cli;
use teumnirm::libs::messages::macros::is_debug_mode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if is_debug_mode() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "teumnirm=debug".into()))
            .init();
    }

    Cli::menu().await
}
