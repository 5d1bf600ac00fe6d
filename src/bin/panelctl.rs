//! panelctl — God Panel command-line client
//!
//! Thin CLI over the godpanel services. Session tokens persist in the
//! user data directory, so `login` once and later commands are
//! authenticated.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use godpanel::platform::FileStore;
use godpanel::types::LoginForm;
use godpanel::{ApiClient, ClientConfig, Params, RequestDescriptor, Services};
use serde::Serialize;
use serde_json::Value;

/// God Panel CLI client
#[derive(Parser)]
#[command(name = "panelctl")]
#[command(version = godpanel::PKG_VERSION)]
#[command(about = "God Panel admin API client")]
struct Args {
    /// Config file (default: ~/.godpanel/config.toml)
    #[arg(short, long, env = "GODPANEL_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and environment
    #[arg(short, long)]
    base_url: Option<String>,

    /// Session storage file (default: in the user data directory)
    #[arg(long)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// GET an arbitrary API path
    Get {
        /// Path relative to the base URL (e.g. /dashboard/stats)
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },

    /// Show dashboard statistics
    Stats,

    /// Show unread dashboard alerts
    Alerts,

    /// List users, one page at a time
    Users {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },

    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "GODPANEL_PASSWORD")]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,
}

/// `key=value`; the value is parsed as JSON when possible, else kept as a string.
fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::load(args.config.as_deref())?.apply_env()?;
    if let Some(url) = args.base_url {
        config = config.base_url(url);
    }

    let store = FileStore::open(args.session.unwrap_or_else(FileStore::default_path))?;
    let client = ApiClient::builder()
        .config(config)
        .store(Arc::new(store))
        .build()?;
    let services = Services::new(client);

    match args.command {
        Command::Get { path, params } => {
            let params: Params = params.into_iter().collect();
            let response = services
                .api
                .request(RequestDescriptor::get(path).params(params))
                .await?;
            print_json(&response)?;
        }
        Command::Stats => {
            let response = services.dashboard.stats().await?;
            print_json(&response.into_data()?)?;
        }
        Command::Alerts => {
            let alerts = services.dashboard.alerts().await?.into_data()?;
            let unread: Vec<_> = alerts.into_iter().filter(|a| !a.read).collect();
            if unread.is_empty() {
                println!("No unread alerts");
            } else {
                print_json(&unread)?;
            }
        }
        Command::Users { page, limit } => {
            let page = services
                .users
                .find_paginated(page, limit, None)
                .await?
                .into_data()?;
            for user in &page.items {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id,
                    user.role.as_str(),
                    user.email,
                    user.display_name
                );
            }
            println!(
                "page {}/{} ({} users)",
                page.page, page.total_pages, page.total
            );
        }
        Command::Login { email, password } => {
            let response = services
                .auth
                .login(&LoginForm::new(email, password))
                .await?;
            match response.data {
                Some(session) if response.success => {
                    println!("Signed in as {}", session.user.email);
                }
                _ => {
                    let message = response.message.unwrap_or_else(|| "login failed".into());
                    return Err(message.into());
                }
            }
        }
        Command::Logout => {
            services.auth.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match services.auth.initialize().await {
            Some(user) => print_json(&user)?,
            None => {
                eprintln!("Not signed in");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_values_parse_as_json() {
        assert_eq!(parse_param("page=2").unwrap(), ("page".into(), Value::from(2)));
        assert_eq!(
            parse_param("noCache=true").unwrap(),
            ("noCache".into(), Value::Bool(true))
        );
    }

    #[test]
    fn param_values_fall_back_to_strings() {
        assert_eq!(
            parse_param("q=jane doe").unwrap(),
            ("q".into(), Value::from("jane doe"))
        );
    }

    #[test]
    fn malformed_params_are_rejected() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
    }
}
