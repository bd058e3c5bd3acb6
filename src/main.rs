use clap::Parser;

use simchat_cli::cli::commands::{chat, models};
use simchat_cli::cli::{Args, Command};
use simchat_cli::logging;
use simchat_cli::ui::Style;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let code = match args.command {
        Some(Command::Models) => match models::print_models() {
            Ok(()) => exitcode::OK,
            Err(e) => {
                eprintln!("{} {e:#}", Style::error("Error:"));
                exitcode::CONFIG
            }
        },
        None => {
            logging::init_default();

            let options = chat::ChatOptions {
                api_key: args.api_key,
                model: args.model,
                retry: args.retry,
                dump_dir: args.dump_dir,
                cache_path: args.cache_path,
                endpoint: args.endpoint,
            };

            match chat::run_chat(options).await {
                Ok(()) => exitcode::OK,
                Err(e) => {
                    tracing::error!(error = %e.error(), "chat ended with an error");
                    eprintln!("{} {:#}", Style::error("Error:"), e.error());
                    e.exit_code()
                }
            }
        }
    };

    std::process::exit(code);
}
