//! Administrator account commands.

use clap::{Args, Subcommand};
use tracing::info;

use filevault_auth::{PasswordHasher, PasswordValidator};
use filevault_core::config::AppConfig;
use filevault_core::error::AppError;
use filevault_core::traits::EntityStore;
use filevault_core::types::{EntityKind, User, UserId, unix_now};
use filevault_database::repositories::UserRepository;
use filevault_database::{DatabasePool, QueryBuilder, commit};
use filevault_storage::LocalEntityStore;

use crate::output;

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Set the administrator password, creating the account if needed
    ResetPassword {
        /// Login name (prompts, defaulting to `admin_username` from config)
        #[arg(short, long)]
        username: Option<String>,
        /// New password (prompts with confirmation if not provided)
        #[arg(short, long)]
        password: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// What the upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Created(UserId),
    Updated(UserId),
}

impl ResetOutcome {
    pub fn user_id(self) -> UserId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

/// Execute admin commands
pub async fn execute(args: &AdminArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    match &args.command {
        AdminCommand::ResetPassword {
            username,
            password,
            yes,
        } => {
            let username = match username {
                Some(u) => u.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Admin username")
                    .default(config.admin_username.clone())
                    .interact_text()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };

            let validator = PasswordValidator::new();
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("New password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .validate_with(|input: &String| {
                        validator.validate(input).map_err(|e| e.message)
                    })
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };
            validator.validate(&password)?;

            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Reset the password of '{username}'. Continue?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    output::print_warning("Cancelled.");
                    return Ok(());
                }
            }

            let (db, builder) = super::open_database(&config).await?;
            let result = reset_password(&config, &db, &builder, &username, &password).await;
            db.close().await;

            match result? {
                ResetOutcome::Created(id) => {
                    output::print_success(&format!(
                        "Administrator '{username}' created ({})",
                        config.admin_name
                    ));
                    output::print_kv("id", &id.to_string());
                }
                ResetOutcome::Updated(id) => {
                    output::print_success(&format!("Password reset for '{username}'"));
                    output::print_kv("id", &id.to_string());
                }
            }
        }
    }

    Ok(())
}

/// Upsert the administrator row in one transaction, then make sure its
/// directory exists.
pub async fn reset_password(
    config: &AppConfig,
    db: &DatabasePool,
    builder: &QueryBuilder,
    username: &str,
    password: &str,
) -> Result<ResetOutcome, AppError> {
    let hash = PasswordHasher::new(&config.password_hash)?.hash_password(password)?;
    let users = UserRepository::new(db, builder);
    let now = unix_now();

    let mut tx = db.begin().await?;
    let ids = users.find_ids_by_name(&mut tx, username).await?;
    let outcome = match ids.as_slice() {
        [] => {
            let user = User {
                id: UserId::new(),
                name: username.to_string(),
                updated_at: now,
            };
            users.insert(&mut tx, &user, &hash).await?;
            ResetOutcome::Created(user.id)
        }
        [id] => {
            users.update_password(&mut tx, *id, &hash, now).await?;
            ResetOutcome::Updated(*id)
        }
        _ => {
            return Err(AppError::multiple_rows(format!(
                "{} users are named '{username}'",
                ids.len()
            )));
        }
    };
    commit(tx).await?;

    let store = LocalEntityStore::new(&config.root).await?;
    let dir = store.layout().user_dir(outcome.user_id());
    if !store.entity_exists(&dir).await {
        store.create_entity(&dir, None, EntityKind::User).await?;
    }

    info!(user_id = %outcome.user_id(), ?outcome, "Administrator password reset");
    Ok(outcome)
}
