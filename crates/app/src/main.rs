// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Access, Grant, Init, List, Revoke, Upload, Version};

command_enum! {
    (Init, Init),
    (Upload, Upload),
    (List, List),
    (Access, Access),
    (Grant, Grant),
    (Revoke, Revoke),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let guards = pinshare::process::init_logging(args.log_level, args.log_dir.as_deref());

    let ctx = cli::op::OpContext {
        config_path: args.config_path,
        gateway_url: args.gateway_url,
        api_key: args.api_key,
        api_secret: args.api_secret,
    };

    let result = args.command.execute(&ctx).await;
    // flush buffered log lines before exiting
    drop(guards);

    match result {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
