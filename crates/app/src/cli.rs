//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relay_domain::{HttpMethod, UserRole};

/// Authenticated client for the backend API.
#[derive(Parser, Debug)]
#[command(name = "relay", version, about)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the API base URL, e.g. `https://api.example.com/api`.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do once the client is set up.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
        /// Use the administrator login endpoint.
        #[arg(long)]
        admin: bool,
    },

    /// Create an account and sign in.
    Signup {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
        /// INFLUENCER or BRAND.
        #[arg(long, value_parser = parse_role)]
        role: UserRole,
    },

    /// Finish a Google sign-in with the authorization code.
    Google {
        /// Authorization code from the OAuth redirect.
        #[arg(long)]
        code: String,
        /// Role for a first-time sign-in.
        #[arg(long, value_parser = parse_role)]
        role: Option<UserRole>,
    },

    /// Forget the stored credential.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Send an authorized request.
    Send {
        /// HTTP method.
        #[arg(value_parser = parse_method)]
        method: HttpMethod,
        /// Path relative to the base URL, e.g. `/campaigns`.
        path: String,
        /// Extra header as `Name: value`. Repeatable.
        #[arg(long = "header", short = 'H', value_parser = parse_header)]
        headers: Vec<(String, String)>,
        /// JSON body.
        #[arg(long, conflicts_with = "form")]
        json: Option<String>,
        /// Form field as `key=value`. Repeatable.
        #[arg(long, value_parser = parse_field)]
        form: Vec<(String, String)>,
    },
}

fn parse_role(value: &str) -> Result<UserRole, String> {
    value.parse().map_err(|e: relay_domain::DomainError| e.to_string())
}

fn parse_method(value: &str) -> Result<HttpMethod, String> {
    value.parse().map_err(|e: relay_domain::DomainError| e.to_string())
}

fn parse_header(value: &str) -> Result<(String, String), String> {
    let (name, value) = value
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{value}`"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_field(value: &str) -> Result<(String, String), String> {
    let (key, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected `key=value`, got `{value}`"))?;
    Ok((key.to_string(), value.to_string()))
}
