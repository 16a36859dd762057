use std::path::Path;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads configuration, installs logging and hands off to `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config(Some(Path::new(configuration::DEFAULT_CONFIG_FILE)))?;
    let _guard = configuration::init_tracing(&config.logging)?;
    web_server::run_server(config).await
}
