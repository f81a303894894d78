use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "outlet-map",
    version,
    about = "Outlet map with a chat-driven search panel"
)]
pub struct CliArgs {
    /// Print an outlet summary and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Run one chat query in headless mode
    #[arg(long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the backend base URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Latitude reported by the location provider
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude reported by the location provider
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Write logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.api_url {
            std::env::set_var("API_URL", url);
        }
        if let Some(lat) = self.lat {
            std::env::set_var("USER_LAT", lat.to_string());
        }
        if let Some(lon) = self.lon {
            std::env::set_var("USER_LON", lon.to_string());
        }
        if let Some(path) = &self.log_file {
            std::env::set_var("LOG_FILE", path);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }
}
