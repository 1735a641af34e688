use tracing_subscriber::{fmt, EnvFilter};

pub fn initialize_logger() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("code2clip=info"));

    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("A global logger was already installed");
    }
}
