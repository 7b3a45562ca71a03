//! ruletidy - sort files into folders by extension rules
//!
//! This library classifies the files of a directory tree with an ordered set
//! of user-defined extension rules, moves each file into the folder named
//! after its rule (or only reports it in a dry run), previews the result
//! without touching the disk, and can undo the most recent batch of moves.

pub mod cli;
pub mod config;
pub mod organizer;
pub mod output;
pub mod preview;
pub mod resolver;
pub mod rules;
pub mod undo;

pub use config::{ConfigError, ConfigFormat, RulesConfig};
pub use organizer::{OrganizationTask, Organizer, Stats, ValidationError};
pub use preview::{PreviewEntry, PreviewTarget};
pub use resolver::{Resolution, ResolveError, resolve};
pub use rules::{Rule, RuleSet, UNORGANIZED};
pub use undo::{UndoAction, UndoLog, UndoReport};

pub use cli::{Cli, run_cli};
