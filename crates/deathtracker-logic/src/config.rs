//! Policy configuration — life allowance, penalty amount, ban message.
//!
//! The on-disk form ([`ConfigFile`]) has every key optional so that older or
//! hand-edited files still load. [`ConfigFile::normalize`] fills in defaults
//! and clamps out-of-range values, reporting each adjustment so the caller
//! can log it and write the normalized form back.

use serde::{Deserialize, Serialize};

/// Lives granted to every player before penalties apply.
pub const DEFAULT_LIVES: u32 = 3;

/// Amount withdrawn per death once lives are exhausted.
pub const DEFAULT_PENALTY_AMOUNT: f64 = 100.0;

/// Disconnect reason and notice sent to excluded players.
pub const DEFAULT_BAN_MESSAGE: &str = "You have been banned for exceeding death limits.";

/// Normalized, immutable-after-load policy values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    pub default_lives: u32,
    pub penalty_amount: f64,
    pub ban_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_lives: DEFAULT_LIVES,
            penalty_amount: DEFAULT_PENALTY_AMOUNT,
            ban_message: DEFAULT_BAN_MESSAGE.to_string(),
        }
    }
}

/// Raw configuration as read from disk. Missing keys are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub default_lives: Option<i64>,
    #[serde(default)]
    pub penalty_amount: Option<f64>,
    #[serde(default)]
    pub ban_message: Option<String>,
}

/// A change applied while normalizing a [`ConfigFile`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAdjustment {
    /// Key absent; default used.
    Defaulted { key: &'static str },
    /// Value outside the allowed range; replaced.
    Clamped { key: &'static str, from: String, to: String },
}

impl ConfigFile {
    /// Fill defaults and clamp invalid values.
    ///
    /// - `DefaultLives` below zero becomes 0; above `u32::MAX` saturates.
    /// - `PenaltyAmount` that is negative or not finite becomes 0.0.
    pub fn normalize(self) -> (Config, Vec<ConfigAdjustment>) {
        let mut adjustments = Vec::new();

        let default_lives = match self.default_lives {
            None => {
                adjustments.push(ConfigAdjustment::Defaulted { key: "DefaultLives" });
                DEFAULT_LIVES
            }
            Some(lives) => {
                let clamped = u32::try_from(lives.max(0)).unwrap_or(u32::MAX);
                if i64::from(clamped) != lives {
                    adjustments.push(ConfigAdjustment::Clamped {
                        key: "DefaultLives",
                        from: lives.to_string(),
                        to: clamped.to_string(),
                    });
                }
                clamped
            }
        };

        let penalty_amount = match self.penalty_amount {
            None => {
                adjustments.push(ConfigAdjustment::Defaulted { key: "PenaltyAmount" });
                DEFAULT_PENALTY_AMOUNT
            }
            Some(amount) if !amount.is_finite() || amount < 0.0 => {
                adjustments.push(ConfigAdjustment::Clamped {
                    key: "PenaltyAmount",
                    from: amount.to_string(),
                    to: "0".to_string(),
                });
                0.0
            }
            Some(amount) => amount,
        };

        let ban_message = match self.ban_message {
            None => {
                adjustments.push(ConfigAdjustment::Defaulted { key: "BanMessage" });
                DEFAULT_BAN_MESSAGE.to_string()
            }
            Some(message) => message,
        };

        (
            Config {
                default_lives,
                penalty_amount,
                ban_message,
            },
            adjustments,
        )
    }
}
