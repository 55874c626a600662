//! Interactive session state management for npsites
//!
//! The session is a small state machine: it waits for a state name, then for a
//! site selection, until the user exits. Each input line is interpreted against
//! the current state into a [`Command`], and the command drives the clients and
//! the rendering.

use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::cache::RequestCache;
use crate::cli::Settings;
use crate::data::{FetchError, NationalSite, NpsClient, PlacesClient, StateDirectory, StateEntry};
use crate::ui;

/// Errors that end the interactive session
#[derive(Debug, Error)]
pub enum AppError {
    /// Fetching data failed in a way the session can't recover from
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading input or writing output failed
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Session state enum representing what input is expected next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for a state name
    AwaitingState,
    /// Waiting for a site number from the listed sites
    AwaitingSelection {
        state_name: String,
        sites: Vec<NationalSite>,
    },
    /// The user exited or input ended
    Done,
}

/// What a line of input asks the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Back,
    /// Look up the sites of a state, as typed (matched ignoring case)
    LookupState(String),
    /// Show places near the site at this 0-based index
    Select(usize),
    /// Input not valid here; the message explains why
    Invalid(String),
}

/// Interprets one line of input in the given state
pub fn interpret(state: &AppState, input: &str) -> Command {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();

    match state {
        AppState::Done => Command::Exit,
        AppState::AwaitingState => match lowered.as_str() {
            "exit" => Command::Exit,
            "" => Command::Invalid("Please enter a state name.".to_string()),
            _ => Command::LookupState(trimmed.to_string()),
        },
        AppState::AwaitingSelection { sites, .. } => match lowered.as_str() {
            "exit" => Command::Exit,
            "back" => Command::Back,
            _ => match trimmed.parse::<usize>() {
                Ok(n) if (1..=sites.len()).contains(&n) => Command::Select(n - 1),
                Ok(n) => Command::Invalid(format!(
                    "{} is out of range. Please choose a number between 1 and {}.",
                    n,
                    sites.len()
                )),
                Err(_) => Command::Invalid(format!(
                    "'{}' is not a number. Please choose 1-{}, 'exit' or 'back'.",
                    trimmed,
                    sites.len()
                )),
            },
        },
    }
}

/// Shown when a line of input can't be decoded
pub const NOT_TEXT_MESSAGE: &str = "That input is not valid text. Please try again.";

/// Main application struct holding session state, clients and the cache
pub struct App {
    /// Current session state
    pub state: AppState,
    /// Park service site client
    nps: NpsClient,
    /// Places API client
    places: PlacesClient,
    /// Shared request cache for both clients
    cache: RequestCache,
    /// State name to page URL, fetched on the first lookup
    directory: Option<StateDirectory>,
}

impl App {
    /// Creates the application from startup settings
    pub fn new(settings: &Settings) -> Self {
        let nps = NpsClient::with_base_url(settings.nps_base_url.clone());
        let places = PlacesClient::new(settings.api_key.clone())
            .with_base_url(settings.places_url.clone())
            .with_radius(settings.radius)
            .with_max_matches(settings.max_matches);
        let cache = RequestCache::open(&settings.cache_file);
        Self::with_clients(nps, places, cache)
    }

    /// Creates the application from already configured parts
    pub fn with_clients(nps: NpsClient, places: PlacesClient, cache: RequestCache) -> Self {
        Self {
            state: AppState::AwaitingState,
            nps,
            places,
            cache,
            directory: None,
        }
    }

    /// Prompt for the current state, or `None` once the session is over
    pub fn prompt(&self) -> Option<&'static str> {
        match self.state {
            AppState::AwaitingState => Some(ui::STATE_PROMPT),
            AppState::AwaitingSelection { .. } => Some(ui::SELECTION_PROMPT),
            AppState::Done => None,
        }
    }

    /// Runs the prompt loop until the user exits or input ends
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<(), AppError> {
        let mut buf = Vec::new();
        while let Some(prompt) = self.prompt() {
            ui::render_prompt(&mut out, prompt)?;
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                writeln!(out)?;
                self.state = AppState::Done;
                break;
            }
            match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line, &mut out).await?,
                Err(_) => ui::render_message(&mut out, NOT_TEXT_MESSAGE)?,
            }
        }
        Ok(())
    }

    /// Handles a single line of input
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<(), AppError> {
        match interpret(&self.state, line) {
            Command::Exit => {
                self.state = AppState::Done;
            }
            Command::Back => {
                self.state = AppState::AwaitingState;
            }
            Command::Invalid(message) => {
                ui::render_message(out, &message)?;
            }
            Command::LookupState(state_name) => {
                self.lookup_state(state_name, out).await?;
            }
            Command::Select(index) => {
                self.show_nearby(index, out).await?;
            }
        }
        Ok(())
    }

    async fn lookup_state<W: Write>(&mut self, state_name: String, out: &mut W) -> Result<(), AppError> {
        if self.directory.is_none() {
            match self.nps.state_directory(&mut self.cache).await {
                Ok(directory) => self.directory = Some(directory),
                Err(e) => return report_recoverable(e, out),
            }
        }

        let entry = self
            .directory
            .as_ref()
            .and_then(|directory| directory.lookup(&state_name))
            .cloned();
        let Some(StateEntry {
            name: state_name,
            url: state_url,
        }) = entry
        else {
            ui::render_message(out, &format!("No state named '{}' was found.", state_name))?;
            return Ok(());
        };

        let sites = match self.nps.sites_for_state(&mut self.cache, &state_url).await {
            Ok(sites) => sites,
            Err(e) => return report_recoverable(e, out),
        };
        if sites.is_empty() {
            ui::render_message(out, &format!("No sites are listed for {}.", state_name))?;
            return Ok(());
        }

        ui::render_site_list(out, &state_name, &sites)?;
        tracing::debug!(state = %state_name, sites = sites.len(), "Awaiting selection");
        self.state = AppState::AwaitingSelection { state_name, sites };
        Ok(())
    }

    async fn show_nearby<W: Write>(&mut self, index: usize, out: &mut W) -> Result<(), AppError> {
        let site = match &self.state {
            AppState::AwaitingSelection { sites, .. } => sites.get(index).cloned(),
            _ => None,
        };
        let Some(site) = site else {
            return Ok(());
        };

        match self.places.nearby_places(&mut self.cache, &site).await {
            Ok(places) => ui::render_nearby_places(out, &site, &places)?,
            Err(e) => return report_recoverable(e, out),
        }
        Ok(())
    }
}

/// Prints a recoverable error and carries on; anything else ends the session
fn report_recoverable<W: Write>(error: FetchError, out: &mut W) -> Result<(), AppError> {
    if error.is_recoverable() {
        tracing::warn!(%error, "Recovered");
        ui::render_message(out, &error.to_string())?;
        Ok(())
    } else {
        Err(error.into())
    }
}
