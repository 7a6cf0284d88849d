//! Command handlers.
//!
//! Each mutating handler authenticates the caller, applies the access gate,
//! runs the tracker operation and saves.

mod department;
mod employee;
mod permission;

use tracing::info;

use common::{AppError, AppResult};
use domain::{can_manage_records, Caller, Predicate};
use tracker_service_lib::config::TrackerServiceConfig;
use tracker_service_lib::repository::CsvStorage;
use tracker_service_lib::service::Tracker;
use tracker_service_lib::{initialize, open_storage, AuthService, InitAction};

use crate::cli::{Cli, Commands, FilterArgs};
use crate::output::Output;

/// Loaded state plus who is asking.
pub struct App {
    pub tracker: Tracker,
    pub out: Output,
    storage: CsvStorage,
    caller_id: Option<String>,
    password: Option<String>,
}

impl App {
    pub fn open(config: &TrackerServiceConfig, cli: &Cli) -> AppResult<Self> {
        let (tracker, _) = initialize(config, InitAction::LoadOrSeed)?;
        Ok(Self {
            tracker,
            out: Output::new(cli.json),
            storage: open_storage(config),
            caller_id: cli.caller.clone(),
            password: cli.password.clone(),
        })
    }

    /// Authenticated caller; `--as` and `--password` are required.
    pub fn caller(&self) -> AppResult<Caller> {
        let id = self
            .caller_id
            .as_deref()
            .ok_or_else(|| AppError::validation("This command needs --as <EMP_ID>"))?;
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| AppError::validation("This command needs --password or TRACKER_PASSWORD"))?;
        self.tracker.authenticate(id, password)
    }

    /// Authenticated caller if `--as` was given, otherwise anonymous.
    pub fn caller_or_anonymous(&self) -> AppResult<Caller> {
        if self.caller_id.is_some() {
            self.caller()
        } else {
            Ok(Caller::default())
        }
    }

    /// Authenticated caller allowed to manage records.
    pub fn manager(&self, action: &str) -> AppResult<Caller> {
        let caller = self.caller()?;
        if !can_manage_records(&caller) {
            return Err(AppError::forbidden(action));
        }
        Ok(caller)
    }

    pub fn save(&self) -> AppResult<()> {
        self.tracker.save_to_storage(&self.storage)
    }
}

/// Turn the repeated filter flags into predicates.
pub fn predicates(filters: &FilterArgs) -> AppResult<Vec<Predicate>> {
    let kinds = [
        ("string", &filters.contains),
        ("min", &filters.min),
        ("max", &filters.max),
    ];
    let mut predicates = Vec::new();
    for (kind, pairs) in kinds {
        for (field, value) in pairs {
            predicates.push(Predicate::parse(kind, field, value)?);
        }
    }
    Ok(predicates)
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli, config: TrackerServiceConfig) -> AppResult<()> {
    match &cli.command {
        Commands::Init { force } => {
            let action = if *force {
                InitAction::Reseed
            } else {
                InitAction::LoadOrSeed
            };
            let (tracker, outcome) = initialize(&config, action)?;
            Output::new(cli.json).init(&config, &tracker, outcome);
            Ok(())
        }
        Commands::Login => {
            let app = App::open(&config, &cli)?;
            let caller = app.caller()?;
            info!(id = ?caller.id, "Authenticated");
            app.out.login(&caller);
            Ok(())
        }
        Commands::Employee { action } => employee::run(&mut App::open(&config, &cli)?, action),
        Commands::Department { action } => department::run(&mut App::open(&config, &cli)?, action),
        Commands::Permission { action } => permission::run(&mut App::open(&config, &cli)?, action),
    }
}
