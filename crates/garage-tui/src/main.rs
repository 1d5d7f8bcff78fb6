use garage_tui::app::App;

// Bridge handlers and the panel's store are single-thread types, so the App
// runs on a current-thread runtime; background readers are still tasks.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let data_dir = garage_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // The terminal is occupied by the UI, so logs go to a file.
    let log_path = data_dir.join("vgarage.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; suppress noisy HTTP client internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("vgarage log: {}", log_path.display());
    tracing::info!("vgarage starting");

    let config = garage_proto::config::Config::load().unwrap_or_default();
    if config.simulation.enabled {
        tracing::info!("simulation mode: commands resolve locally");
    }

    App::new(config).run().await
}
