//! `jobpacker settings`: view and edit `preferences.json`.

use clap::Subcommand;
use jobpacker_core::{Preferences, SessionStore};

use crate::render;

#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print the saved defaults
    Show,
    /// Change one default, e.g. `set job_boards indeed,linkedin`
    Set { key: String, value: String },
    /// Restore every default
    Reset,
}

/// # Errors
///
/// Returns an error for unknown keys, unparsable values, or when the
/// preferences file cannot be written.
pub(crate) fn run_settings(store: &SessionStore, command: SettingsCommands) -> anyhow::Result<()> {
    match command {
        SettingsCommands::Show => {
            render::print_preferences(&store.load_preferences());
        }
        SettingsCommands::Set { key, value } => {
            let mut prefs = store.load_preferences();
            prefs.set(&key, &value)?;
            store.save_preferences(&prefs)?;
            println!("saved {key}");
        }
        SettingsCommands::Reset => {
            store.save_preferences(&Preferences::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
