use anyhow::Result;
use clap::{Parser, Subcommand};

mod auth;
mod cli_style;

use auth::SiteHasher;
use cli_style::{get_styles, print_error, print_key_value, print_success};

/// Manage the shared site password hash used by the server config.
#[derive(Parser)]
#[command(styles = get_styles(), name = "cli-auth", version)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hashes a password for the `site_password_hash` config entry.
    Hash { password: String },

    /// Verifies a password against an existing hash, it doesn't make any
    /// persistent change, it just compares the password hash.
    Check { password: String, hash: String },
}

fn main() -> Result<()> {
    let cli = CliArgs::parse();

    match cli.command {
        Command::Hash { password } => {
            let hasher = SiteHasher::Argon2;
            let salt = hasher.generate_b64_salt();
            let hash = hasher.hash(password.as_bytes(), &salt)?;
            print_success("Password hashed");
            print_key_value("hasher", &hasher.to_string());
            print_key_value("site_password_hash", &hash);
        }
        Command::Check { password, hash } => {
            if SiteHasher::Argon2.verify(password.as_str(), hash.as_str())? {
                print_success("Password matches the hash");
            } else {
                print_error("Password does NOT match the hash");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
