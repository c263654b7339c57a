//! Command gateway — player queries and privileged administration.
//!
//! Authorization is decided by the host and arrives as [`Caller::authorized`].
//! Privileged commands from an unauthorized caller are a silent no-op.
//!
//! | Command | Privileged | Effect |
//! |---------|------------|--------|
//! | `lives` | no | Lives remaining for the caller |
//! | `deaths` | no | Death count for the caller |
//! | `banlist` | yes | Enumerate banned players |
//! | `wipebanlist` | yes | Clear the ban registry |
//! | `unbanplayer <playerId>` | yes | Remove one ban |
//! | `banplayer <playerId>` | yes | Ban and disconnect a player |
//! | `resetdeaths` | yes | Clear every death counter |
//! | `resetplayer <playerId>` | yes | Clear one death counter |

use deathtracker_logic::enforcement::lives_remaining;
use deathtracker_logic::{messages, PlayerId};
use std::fmt;

use crate::engine::TrackerState;
use crate::ports::PlayerSessions;

/// Who issued a command and whether the host granted admin rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The invoking player, `None` for the server console.
    pub player: Option<PlayerId>,
    pub authorized: bool,
}

impl Caller {
    pub fn player(id: impl Into<PlayerId>, authorized: bool) -> Self {
        Self {
            player: Some(id.into()),
            authorized,
        }
    }

    /// The server console: no identity, always authorized.
    pub fn console() -> Self {
        Self {
            player: None,
            authorized: true,
        }
    }
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lives,
    Deaths,
    BanList,
    WipeBanList,
    Unban(PlayerId),
    Ban(PlayerId),
    ResetDeaths,
    ResetPlayer(PlayerId),
}

/// Why a command line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    MissingArgument {
        command: &'static str,
        usage: &'static str,
    },
}

impl CommandError {
    pub fn requires_privilege(&self) -> bool {
        matches!(self, Self::MissingArgument { .. })
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(name) => f.write_str(&messages::unknown_command(name)),
            CommandError::MissingArgument { command, usage } => {
                f.write_str(&messages::usage(command, usage))
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    /// Parse a command name and its arguments. Names are case-insensitive;
    /// player id arguments are taken verbatim. Extra arguments are ignored.
    pub fn parse(name: &str, args: &[&str]) -> Result<Self, CommandError> {
        let first_arg = |command: &'static str| {
            args.first()
                .copied()
                .filter(|s| !s.is_empty())
                .map(PlayerId::from)
                .ok_or(CommandError::MissingArgument {
                    command,
                    usage: "<playerId>",
                })
        };

        match name.trim().to_ascii_lowercase().as_str() {
            "lives" => Ok(Command::Lives),
            "deaths" => Ok(Command::Deaths),
            "banlist" => Ok(Command::BanList),
            "wipebanlist" => Ok(Command::WipeBanList),
            "unbanplayer" => first_arg("unbanplayer").map(Command::Unban),
            "banplayer" => first_arg("banplayer").map(Command::Ban),
            "resetdeaths" => Ok(Command::ResetDeaths),
            "resetplayer" => first_arg("resetplayer").map(Command::ResetPlayer),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    pub fn requires_privilege(&self) -> bool {
        !matches!(self, Command::Lives | Command::Deaths)
    }
}

/// Result of running a command against the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Executed {
    pub reply: String,
    /// Whether the state changed and must be flushed.
    pub mutated: bool,
}

impl Executed {
    fn read(reply: String) -> Self {
        Self {
            reply,
            mutated: false,
        }
    }

    fn write(reply: String) -> Self {
        Self {
            reply,
            mutated: true,
        }
    }
}

/// Run an authorized command. The caller holds the state lock.
pub(crate) fn execute(
    state: &mut TrackerState,
    sessions: &dyn PlayerSessions,
    caller: &Caller,
    command: Command,
) -> Executed {
    match command {
        Command::Lives => match &caller.player {
            Some(player) => {
                let count = state.ledger.death_count(player.as_str());
                Executed::read(messages::lives_left(lives_remaining(
                    count,
                    state.config.default_lives,
                )))
            }
            None => Executed::read(messages::PLAYER_ONLY.to_string()),
        },
        Command::Deaths => match &caller.player {
            Some(player) => {
                Executed::read(messages::deaths(state.ledger.death_count(player.as_str())))
            }
            None => Executed::read(messages::PLAYER_ONLY.to_string()),
        },
        Command::BanList => Executed::read(messages::ban_list(state.bans.list())),
        Command::WipeBanList => {
            let wiped = state.bans.len();
            state.bans.clear();
            log::info!("Ban list wiped ({} entries)", wiped);
            Executed::write(messages::BAN_LIST_WIPED.to_string())
        }
        Command::Unban(player) => {
            if state.bans.unban(player.as_str()) {
                log::info!("Player {} unbanned", player);
                Executed::write(messages::unbanned(player.as_str()))
            } else {
                Executed::read(messages::not_banned(player.as_str()))
            }
        }
        Command::Ban(player) => {
            if state.bans.ban(&player) {
                log::info!("Player {} banned by administrator", player);
                sessions.kick(&player, &state.config.ban_message);
                Executed::write(messages::banned(player.as_str()))
            } else {
                Executed::read(messages::already_banned(player.as_str()))
            }
        }
        Command::ResetDeaths => {
            let tracked = state.ledger.len();
            state.ledger.reset_all();
            log::info!("Death counts reset for all players ({} tracked)", tracked);
            Executed::write(messages::DEATHS_RESET.to_string())
        }
        Command::ResetPlayer(player) => {
            if state.ledger.reset_player(player.as_str()) {
                log::info!("Death count reset for player {}", player);
                Executed::write(messages::player_deaths_reset(player.as_str()))
            } else {
                Executed::read(messages::player_had_no_deaths(player.as_str()))
            }
        }
    }
}
