use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use charla::RedirectPolicy;
use charla::core::config::{CharlaConfig, load_config, resolve};
use charla::services::{ConversationIndex, LocalConversations, LocalProfile, OpenAiClient};
use charla::tui::{self, Services};

#[derive(Parser)]
#[command(name = "charla", about = "Terminal chat with a financial assistant")]
struct Args {
    /// Address to open: "/" for a new chat or "/chat/<id>" for a saved one
    #[arg(long, default_value = "/")]
    path: String,

    /// Who gets moved to a new conversation's permanent address
    #[arg(long, value_enum)]
    redirect_policy: Option<RedirectPolicy>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to charla.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("charla.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = load_config().unwrap_or_else(|e| {
        warn!("{}, using defaults", e);
        CharlaConfig::default()
    });
    let config = resolve(&file_config, args.redirect_policy);

    info!(
        "Charla starting at {} (model {}, redirect policy {:?})",
        args.path, config.model, config.redirect_policy
    );

    let profile = LocalProfile::open(&config.profile_path()).map_err(std::io::Error::other)?;
    let assistant = Arc::new(OpenAiClient::from_config(&config));
    let services = Services {
        profile: Arc::new(profile),
        conversations: Arc::new(LocalConversations::new(config.chats_dir(), assistant)),
        index: Arc::new(ConversationIndex::new(config.chats_dir())),
    };

    tui::run(config, args.path, services)
}
