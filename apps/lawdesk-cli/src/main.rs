use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use lawdesk_cli::page::{self, AppointmentsPage, CasesPage, ClientsPage};
use lawdesk_cli::{render, ApiClient, ClientEditor, PageState};

/// LawDesk - browse and edit law office records from the terminal
#[derive(Parser)]
#[command(name = "lawdesk")]
#[command(about = "LawDesk - browse and edit law office records from the terminal")]
#[command(version = "0.1.0")]
struct Cli {
    /// Server root URL
    #[arg(long, env = "LAWDESK_BASE_URL", default_value = "http://127.0.0.1:8087")]
    base_url: String,

    /// Log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Client records
    #[command(subcommand)]
    Clients(ClientCmd),
    /// Case records
    #[command(subcommand)]
    Cases(BrowseCmd),
    /// Appointment records
    #[command(subcommand)]
    Appointments(BrowseCmd),
}

#[derive(Subcommand)]
enum BrowseCmd {
    /// List records, optionally filtered
    List {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show one record
    Show { id: Uuid },
}

#[derive(Subcommand)]
enum ClientCmd {
    /// List clients, optionally filtered by name or email
    List {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show one client
    Show { id: Uuid },
    /// Add a client
    Add(ClientFields),
    /// Edit a client; omitted fields keep their current value
    Edit {
        id: Uuid,
        #[command(flatten)]
        fields: ClientFields,
    },
    /// Delete a client (cases and appointments keep their reference)
    Delete {
        id: Uuid,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct ClientFields {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Empty string clears the phone on edit
    #[arg(long)]
    phone: Option<String>,
    /// Empty string clears the address on edit
    #[arg(long)]
    address: Option<String>,
}

impl ClientFields {
    fn apply(self, editor: &mut ClientEditor) {
        let form = &mut editor.form;
        for (slot, value) in [
            (&mut form.first_name, self.first_name),
            (&mut form.last_name, self.last_name),
            (&mut form.email, self.email),
            (&mut form.phone, self.phone),
            (&mut form.address, self.address),
        ] {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print a rendered page; a page that failed to load turns into a non-zero exit.
fn emit<T>(state: &PageState<T>, text: String) -> Result<()> {
    if let PageState::Error(e) = state {
        bail!("could not load: {e}");
    }
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let api = ApiClient::new(&cli.base_url)?;
    tracing::info!(base_url = %api.base_url(), "LawDesk client starting");

    match cli.command {
        Commands::Clients(cmd) => clients(&api, cmd).await,
        Commands::Cases(BrowseCmd::List { search }) => {
            let mut page = CasesPage::load(&api).await;
            page.set_search(search);
            emit(&page.state, render::cases(&page))
        }
        Commands::Cases(BrowseCmd::Show { id }) => {
            let page = page::case_detail(&api, id).await;
            emit(&page.state, render::case(&page))
        }
        Commands::Appointments(BrowseCmd::List { search }) => {
            let mut page = AppointmentsPage::load(&api).await;
            page.set_search(search);
            emit(&page.state, render::appointments(&page))
        }
        Commands::Appointments(BrowseCmd::Show { id }) => {
            let page = page::appointment_detail(&api, id).await;
            emit(&page.state, render::appointment(&page))
        }
    }
}

async fn clients(api: &ApiClient, cmd: ClientCmd) -> Result<()> {
    match cmd {
        ClientCmd::List { search } => {
            let mut page = ClientsPage::load(api).await;
            page.set_search(search);
            emit(&page.state, render::clients(&page))
        }
        ClientCmd::Show { id } => {
            let page = page::client_detail(api, id).await;
            emit(&page.state, render::client(&page))
        }
        ClientCmd::Add(fields) => {
            let mut page = ClientsPage::load(api).await;
            let mut editor = ClientEditor::open(None);
            fields.apply(&mut editor);
            if let Some(client) = editor.submit(api, &mut page).await? {
                println!("Added {} ({})", client.full_name(), client.id);
            }
            Ok(())
        }
        ClientCmd::Edit { id, fields } => {
            let detail = page::client_detail(api, id).await;
            let existing = match &detail.state {
                PageState::Loaded(c) => c,
                _ => return emit(&detail.state, render::client(&detail)),
            };
            let mut page = ClientsPage::load(api).await;
            let mut editor = ClientEditor::open(Some(existing));
            fields.apply(&mut editor);
            match editor.submit(api, &mut page).await? {
                Some(client) => println!("Updated {} ({})", client.full_name(), client.id),
                None => println!("Client not found"),
            }
            Ok(())
        }
        ClientCmd::Delete { id, yes } => {
            if !yes {
                bail!("refusing to delete client {id} without --yes");
            }
            let mut page = ClientsPage::load(api).await;
            page.delete(api, id).await?;
            println!("Deleted client {id}");
            Ok(())
        }
    }
}
