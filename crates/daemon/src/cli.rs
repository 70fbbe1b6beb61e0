// SPDX-License-Identifier: MIT

//! Command-line surface (spec §6): one flag, `--system`, plus the standard
//! `--help`/`--version` clap gives for free.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "reportd", version, about = "Per-user problem-reporting orchestration daemon")]
pub struct Cli {
    /// Serve on the system bus instead of the session bus.
    #[arg(long)]
    pub system: bool,
}

/// Which bus a connected [`crate::Daemon`] is serving on (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    Session,
    System,
}

impl From<&Cli> for BusKind {
    fn from(cli: &Cli) -> Self {
        if cli.system {
            BusKind::System
        } else {
            BusKind::Session
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_session_bus() {
        let cli = Cli::parse_from(["reportd"]);
        assert_eq!(BusKind::from(&cli), BusKind::Session);
    }

    #[test]
    fn system_flag_selects_system_bus() {
        let cli = Cli::parse_from(["reportd", "--system"]);
        assert_eq!(BusKind::from(&cli), BusKind::System);
    }
}
