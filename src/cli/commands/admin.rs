use anyhow::anyhow;
use clap::{Subcommand, ValueEnum};
use serde_json::json;

use crate::cli::utils::{connect_store, output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::NewAdminRequest;
use crate::database::Store;
use crate::services::admins;
use crate::types::AdminRole;

/// Environment variable read when `--password` is omitted.
pub const PASSWORD_ENV: &str = "GRANDSON_ADMIN_PASSWORD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    SuperAdmin,
}

impl From<RoleArg> for AdminRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => AdminRole::Admin,
            RoleArg::SuperAdmin => AdminRole::SuperAdmin,
        }
    }
}

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an admin account")]
    Create {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, value_enum, default_value = "admin", help = "Account role")]
        role: RoleArg,
        #[arg(long, help = "Password (defaults to GRANDSON_ADMIN_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "List admin accounts")]
    List,
}

pub async fn handle(cmd: AdminCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create {
            email,
            name,
            role,
            password,
        } => {
            let password = resolve_password(password, std::env::var(PASSWORD_ENV).ok())?;
            let store = connect_store(config).await?;
            let admin = admins::create_admin(
                &store,
                NewAdminRequest {
                    email,
                    name,
                    password,
                    role: role.into(),
                },
            )
            .await?;

            output_success(
                &output_format,
                &format!("Admin '{}' created as {}", admin.email, admin.role.as_str()),
                Some(json!({ "admin": admin })),
            )
        }
        AdminCommands::List => {
            let store = connect_store(config).await?;
            let admins = store.list_admins().await?;
            if admins.is_empty() {
                return output_empty_collection(&output_format, "admins", "No admin accounts");
            }

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "admins": admins }))?),
                OutputFormat::Text => {
                    for admin in &admins {
                        let last_login = admin
                            .last_login_at
                            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "never".to_string());
                        println!("{:<36}  {:<12}  {:<32}  {}", admin.id, admin.role.as_str(), admin.email, last_login);
                    }
                }
            }
            Ok(())
        }
    }
}

/// Explicit argument wins over the environment.
fn resolve_password(arg: Option<String>, env: Option<String>) -> anyhow::Result<String> {
    arg.or(env)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow!("No password given: pass --password or set {}", PASSWORD_ENV))
}
