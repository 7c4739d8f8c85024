//! Command-line surface
//!
//! Each command builds the same pieces an interactive front end would use
//! (session store, login flow, controller, view shell) and drives them once.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use coop_core::associate::{Associate, AssociateStatus, ListQuery};
use coop_core::session::{FileKeyValueStore, SessionStore};

use crate::api::ApiClient;
use crate::associates::{AssociatesController, Notice};
use crate::auth::AuthFlow;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::shell::{ModuleKind, View, ViewShell};

#[derive(Debug, Parser)]
#[command(name = "coop-admin")]
#[command(about = "Administration client for the cooperative backend", long_about = None)]
pub struct Cli {
    /// Backend origin, overrides COOP_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session directory, overrides COOP_DATA_DIR
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show which screen the stored session leads to
    Status,
    /// List associates
    List {
        /// Case-insensitive match on names, document and email
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        estado: Option<AssociateStatus>,
        #[arg(long)]
        documento: Option<String>,
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print one associate as JSON
    Show { id: i64 },
    /// Create an associate
    Create {
        /// JSON form document merged over the blank form
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Field assignment by wire name, e.g. datos_laborales.cargo=Docente
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// Update an associate
    Edit {
        id: i64,
        /// JSON document merged over the selected record
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// Delete an associate
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Environment configuration with flag overrides applied
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(api_url) = &self.api_url {
            config = config.with_api_url(api_url.clone());
        }
        if let Some(data_dir) = &self.data_dir {
            config = config.with_data_dir(data_dir.clone());
        }
        config
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    debug!("Using backend {} and storage {:?}", config.api_base(), config.storage_path());

    let storage = FileKeyValueStore::open(config.storage_path()).await?;
    let sessions = SessionStore::new(Arc::new(storage));
    let api = Arc::new(ApiClient::new(&config, sessions.clone())?);

    match cli.command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            let flow = AuthFlow::new(api, sessions);
            let session = flow.login(&username, &password).await?;
            println!("Signed in as {}", session.user.display_name());
        }
        Command::Logout => {
            let mut shell = ViewShell::new(sessions);
            shell.on_logout().await?;
            println!("Signed out");
        }
        Command::Whoami => {
            let session = sessions.load().await?.ok_or(ClientError::NotAuthenticated)?;
            let user = &session.user;
            println!("{}", user.display_name());
            println!("  username: {}", user.username);
            if !user.email.is_empty() {
                println!("  email:    {}", user.email);
            }
            if !user.role.is_empty() {
                println!("  role:     {}", user.role);
            }
        }
        Command::Status => {
            let mut shell = ViewShell::new(sessions);
            let view = shell.bootstrap().await?;
            println!("{}", describe_view(view));
        }
        Command::List {
            search,
            estado,
            documento,
            skip,
            limit,
        } => {
            let query = ListQuery {
                skip,
                limit,
                status: estado,
                document_number: documento,
            };
            let mut controller = open_module(api, sessions, query).await?;
            if let Some(term) = search {
                controller.set_search(term);
            }
            print!("{}", render_table(&controller.visible()));
        }
        Command::Show { id } => {
            let controller = AssociatesController::new(api);
            let associate = controller.show(id).await?;
            let json =
                serde_json::to_string_pretty(&associate).map_err(coop_core::Error::from)?;
            println!("{}", json);
        }
        Command::Create { file, set } => {
            let mut controller = open_module(api, sessions, ListQuery::default()).await?;
            controller.begin_create();
            fill_form(&mut controller, file.as_deref(), &set).await?;
            controller
                .submit()
                .await
                .map_err(|e| rejected(&mut controller, e))?;
            report(&mut controller);
        }
        Command::Edit { id, file, set } => {
            let mut controller = open_module(api, sessions, ListQuery::default()).await?;
            controller.begin_edit(id).await?;
            fill_form(&mut controller, file.as_deref(), &set).await?;
            controller
                .submit()
                .await
                .map_err(|e| rejected(&mut controller, e))?;
            report(&mut controller);
        }
        Command::Delete { id, yes } => {
            let mut controller = open_module(api, sessions, ListQuery::default()).await?;
            let confirm = |message: &str| yes || ask_yes_no(message);
            let deleted = controller
                .delete(id, &confirm)
                .await
                .map_err(|e| rejected(&mut controller, e))?;
            if !deleted {
                println!("Cancelled");
                return Ok(());
            }
            report(&mut controller);
        }
    }

    Ok(())
}

/// Restore the session, open the associates module and load the list
async fn open_module(
    api: Arc<ApiClient>,
    sessions: SessionStore,
    query: ListQuery,
) -> Result<AssociatesController> {
    let mut shell = ViewShell::new(sessions);
    shell.bootstrap().await?;
    if shell.open_module(ModuleKind::Associates) != View::Module(ModuleKind::Associates) {
        return Err(ClientError::NotAuthenticated);
    }

    let mut controller = AssociatesController::new(api).with_query(query);
    controller.mount().await?;
    Ok(controller)
}

async fn fill_form(
    controller: &mut AssociatesController,
    file: Option<&Path>,
    assignments: &[String],
) -> Result<()> {
    let form = controller.form_mut().ok_or_else(|| {
        coop_core::Error::InvalidState("no associate form is open".to_string())
    })?;

    if let Some(path) = file {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(coop_core::Error::from)?;
        let patch: serde_json::Value =
            serde_json::from_str(&content).map_err(coop_core::Error::from)?;
        form.merge_json(patch)?;
    }

    for assignment in assignments {
        let (field, value) = parse_assignment(assignment)?;
        form.set(field, value)?;
    }
    Ok(())
}

/// Replace a failed action's error with the notice the controller recorded
fn rejected(controller: &mut AssociatesController, err: ClientError) -> ClientError {
    match controller.take_notice() {
        Some(Notice::Error(message)) => ClientError::Rejected { message },
        _ => err,
    }
}

fn report(controller: &mut AssociatesController) {
    if let Some(notice) = controller.take_notice() {
        println!("{}", notice.message());
    }
    if let Some(error) = controller.error() {
        eprintln!("Warning: list refresh failed: {}", error);
    }
}

/// Split `field=value`
pub fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
        _ => Err(coop_core::Error::InvalidInput(format!(
            "Expected FIELD=VALUE, got '{}'",
            raw
        ))
        .into()),
    }
}

pub fn describe_view(view: View) -> String {
    match view {
        View::Loading => "Loading".to_string(),
        View::Login => "Not logged in".to_string(),
        View::Dashboard => "Dashboard".to_string(),
        View::Module(module) => format!("Module: {}", module.title()),
    }
}

/// Fixed-width table of associates
pub fn render_table(items: &[&Associate]) -> String {
    if items.is_empty() {
        return "No associates found\n".to_string();
    }

    let rows: Vec<[String; 5]> = items
        .iter()
        .map(|a| {
            [
                a.id.to_string(),
                format!("{} {}", a.document_type, a.document_number),
                a.full_name(),
                a.email.clone(),
                a.status.to_string(),
            ]
        })
        .collect();

    let headers = ["ID", "DOCUMENT", "NAME", "EMAIL", "STATUS"];
    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush().map_err(coop_core::Error::from)?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(coop_core::Error::from)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn ask_yes_no(message: &str) -> bool {
    match prompt(&format!("{} [y/N] ", message)) {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
