//! Reply and notice texts sent to players and operators.

use crate::player::PlayerId;

pub const NO_BANS: &str = "No players are currently banned.";
pub const BAN_LIST_HEADER: &str = "Banned players:";
pub const BAN_LIST_WIPED: &str = "Ban list has been wiped.";
pub const DEATHS_RESET: &str = "Death counts have been reset for all players.";
pub const DEATHS_RESET_ECONOMICS_WIPE: &str = "Death counts reset due to economics data wipe.";
pub const PLAYER_ONLY: &str = "This command can only be used by a player.";

pub fn lives_left(lives: u64) -> String {
    format!("You have {} lives left.", lives)
}

pub fn deaths(count: u64) -> String {
    format!("You have died {} times.", count)
}

pub fn penalized(amount: f64) -> String {
    format!("You have been penalized {} for exceeding death limits.", amount)
}

/// Ban list as one line per id, or [`NO_BANS`] when empty.
pub fn ban_list(banned: &[PlayerId]) -> String {
    if banned.is_empty() {
        return NO_BANS.to_string();
    }
    let mut out = String::from(BAN_LIST_HEADER);
    for id in banned {
        out.push('\n');
        out.push_str(id.as_str());
    }
    out
}

pub fn unbanned(player: &str) -> String {
    format!("Player {} has been unbanned.", player)
}

pub fn not_banned(player: &str) -> String {
    format!("Player {} is not banned.", player)
}

pub fn banned(player: &str) -> String {
    format!("Player {} has been banned.", player)
}

pub fn already_banned(player: &str) -> String {
    format!("Player {} is already banned.", player)
}

pub fn player_deaths_reset(player: &str) -> String {
    format!("Death count has been reset for player {}.", player)
}

pub fn player_had_no_deaths(player: &str) -> String {
    format!("Player {} has no recorded deaths.", player)
}

pub fn usage(command: &str, args: &str) -> String {
    if args.is_empty() {
        format!("Usage: {}", command)
    } else {
        format!("Usage: {} {}", command, args)
    }
}

pub fn unknown_command(command: &str) -> String {
    format!("Unknown command: {}", command)
}
