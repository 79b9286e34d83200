#[cfg(not(feature = "dashboard_gui"))]
fn main() {
    eprintln!("The dashboard GUI is disabled. Rebuild with --features dashboard_gui to enable it.");
    std::process::exit(1);
}

#[cfg(feature = "dashboard_gui")]
fn main() -> iced::Result {
    use std::path::PathBuf;

    use clap::Parser;
    use tracing_subscriber::EnvFilter;

    use nota_dashboard::api::client::NotasApiClient;
    use nota_dashboard::config::{self, DashboardConfig};
    use nota_dashboard::ui::{self, DashboardFlags};

    #[derive(Debug, Parser)]
    #[command(name = "nota-dashboard-gui", about = "Nota fiscal processing dashboard")]
    struct Options {
        /// Base URL of the notas API.
        #[arg(long, value_name = "URL", env = "NOTA_DASHBOARD_API_ENDPOINT")]
        endpoint: Option<String>,
        /// Bearer token used to authenticate against the notas API.
        #[arg(long, value_name = "TOKEN", env = "NOTA_DASHBOARD_API_TOKEN")]
        auth_token: Option<String>,
        /// Optional dashboard configuration file.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = Options::parse();

    let file_config = match options.config.as_deref() {
        Some(path) => match config::load(path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("Failed to load dashboard config: {error}");
                std::process::exit(2);
            }
        },
        None => DashboardConfig::default(),
    };

    let endpoint = options
        .endpoint
        .unwrap_or_else(|| file_config.api.endpoint.clone());
    let auth_token = options.auth_token.or_else(|| file_config.api.auth_token.clone());

    let client = match NotasApiClient::from_endpoint(&endpoint, auth_token, file_config.api.timeout())
    {
        Ok(client) => client,
        Err(error) => {
            eprintln!("Failed to initialise notas API client: {error}");
            std::process::exit(2);
        }
    };

    ui::launch(DashboardFlags {
        client,
        config_path: options.config,
    })
}
