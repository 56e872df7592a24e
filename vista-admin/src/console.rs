//! Command-line driver: loads a screen, fills a form or presses a control,
//! and prints the resulting markup.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;
use vista_core::surface::{FileUpload, MemoryForm};
use vista_core::{ActionOutcome, Confirmer, FieldValue, Level, Notifier, Select, SubmitOutcome};

use crate::page::{MemoryPage, Screen};
use crate::AdminError;

#[derive(Parser, Debug)]
#[command(name = "vista-admin", version, about = "Event-planning admin console")]
pub struct Cli {
    /// Answer yes to every confirmation prompt.
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and render a screen.
    List {
        #[arg(value_enum)]
        screen: Screen,
        /// Venue filter (destination id).
        #[arg(long)]
        destination: Option<String>,
    },
    /// Fill and submit a form. Values are `key=value`; `key=@path` attaches a file.
    Submit {
        #[arg(value_enum)]
        form: FormName,
        assignments: Vec<String>,
    },
    /// Press a control, e.g. `destination:3:delete` or `booking:7:confirmed`.
    Action {
        #[arg(value_enum)]
        screen: Screen,
        key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormName {
    DestinationAdd,
    DestinationEdit,
    VenueAdd,
    VenueEdit,
    VendorAdd,
    VendorEdit,
    Booking,
}

impl FormName {
    fn screen(self) -> Screen {
        match self {
            FormName::DestinationAdd | FormName::DestinationEdit => Screen::Destinations,
            FormName::VenueAdd | FormName::VenueEdit => Screen::Venues,
            FormName::VendorAdd | FormName::VendorEdit => Screen::Vendors,
            FormName::Booking => Screen::Storefront,
        }
    }
}

// ============================================================================
// Terminal surfaces
// ============================================================================

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: Level, message: &str) {
        let tag = match level {
            Level::Success => "ok",
            Level::Warning => "warn",
            Level::Danger => "error",
        };
        eprintln!("[{}] {}", tag, message);
    }
}

/// Asks on stderr and reads the answer from stdin.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

// ============================================================================
// Commands
// ============================================================================

pub fn parse_assignment(raw: &str) -> Result<(String, FieldValue), AdminError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(k, _)| !k.trim().is_empty())
        .ok_or_else(|| AdminError::InvalidAssignment(raw.to_string()))?;

    let value = match value.strip_prefix('@') {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|source| AdminError::Upload {
                path: path.to_string(),
                source,
            })?;
            let file_name = Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            FieldValue::File(FileUpload { file_name, bytes })
        }
        None => FieldValue::text(value),
    };
    Ok((key.trim().to_string(), value))
}

/// Runs one command against the page and returns the markup to print.
pub async fn run(command: Command, page: &MemoryPage) -> Result<String, AdminError> {
    match command {
        Command::List { screen, destination } => {
            if screen == Screen::Venues {
                if let Some(id) = destination {
                    // The filter only accepts destinations it has been populated with.
                    page.load(Screen::Destinations).await;
                    page.selects.venue_filter.set_value(&id);
                }
            }
            let outcome = page.load(screen).await;
            info!("Loaded {:?}: {:?}", screen, outcome);
            Ok(page.html(screen))
        }
        Command::Submit { form, assignments } => {
            let values = assignments
                .iter()
                .map(|raw| parse_assignment(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let outcome = submit(page, form, values).await?;
            info!("Submitted {:?}: {:?}", form, outcome);
            Ok(page.html(form.screen()))
        }
        Command::Action { screen, key } => {
            page.load(screen).await;
            let outcome = page
                .activate(screen, &key)
                .await
                .ok_or_else(|| AdminError::UnknownTrigger {
                    screen: format!("{:?}", screen).to_lowercase(),
                    key: key.clone(),
                })?;
            info!("Activated {}: {:?}", key, outcome);
            Ok(page.html(screen))
        }
    }
}

fn lookup<'a>(values: &'a [(String, FieldValue)], name: &str) -> Option<&'a str> {
    values.iter().find(|(k, _)| k == name).and_then(|(_, v)| match v {
        FieldValue::Text(text) => Some(text.as_str()),
        _ => None,
    })
}

/// Opens the same controls a user would go through before typing into `form`.
async fn prepare(
    page: &MemoryPage,
    form: FormName,
    values: &[(String, FieldValue)],
) -> Result<(), AdminError> {
    let screen = form.screen();
    let opener = match form {
        FormName::VenueAdd => {
            page.load(Screen::Destinations).await;
            None
        }
        FormName::DestinationEdit => {
            lookup(values, "id").map(|id| format!("destination:{}:edit", id))
        }
        FormName::VenueEdit => lookup(values, "id").map(|id| format!("venue:{}:edit", id)),
        FormName::VendorEdit => {
            lookup(values, "vendor_id").map(|id| format!("vendor:{}:edit", id))
        }
        FormName::Booking => {
            lookup(values, "destination_id").map(|id| format!("destination:{}:select", id))
        }
        FormName::DestinationAdd | FormName::VendorAdd => None,
    };

    page.load(screen).await;
    if let Some(key) = opener {
        let outcome = page
            .activate(screen, &key)
            .await
            .ok_or_else(|| AdminError::UnknownTrigger {
                screen: format!("{:?}", screen).to_lowercase(),
                key: key.clone(),
            })?;
        if matches!(outcome, ActionOutcome::Missing(_)) {
            return Err(AdminError::UnknownTrigger {
                screen: format!("{:?}", screen).to_lowercase(),
                key,
            });
        }
    }
    Ok(())
}

async fn submit(
    page: &MemoryPage,
    form: FormName,
    values: Vec<(String, FieldValue)>,
) -> Result<SubmitOutcome, AdminError> {
    prepare(page, form, &values).await?;

    let surface: &MemoryForm = match form {
        FormName::DestinationAdd => &page.forms.destination_add,
        FormName::DestinationEdit => &page.forms.destination_edit,
        FormName::VenueAdd => &page.forms.venue_add,
        FormName::VenueEdit => &page.forms.venue_edit,
        FormName::VendorAdd => &page.forms.vendor_add,
        FormName::VendorEdit => &page.forms.vendor_edit,
        FormName::Booking => &page.forms.booking,
    };
    for (name, value) in values {
        surface.set(&name, value);
    }

    let outcome = match form {
        FormName::DestinationAdd => page.destinations.add.submit().await,
        FormName::DestinationEdit => page.destinations.edit.submit().await,
        FormName::VenueAdd => page.venues.add.submit().await,
        FormName::VenueEdit => page.venues.edit.submit().await,
        FormName::VendorAdd => page.vendors.add.submit().await,
        FormName::VendorEdit => page.vendors.edit.submit().await,
        FormName::Booking => page.storefront.booking.submit().await,
    };
    Ok(outcome)
}
