//! Round-robin pairing generation.
//!
//! Every competitor meets every other competitor exactly once per engine variant. The first
//! competitor of a pairing always takes the player seat.

use std::fmt;

/// One game to play: two competitor indexes and an engine variant index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pairing {
    /// Competitor in the player seat.
    pub player: usize,
    /// Competitor in the opponent seat. Always greater than `player`.
    pub opponent: usize,
    /// Engine variant the game is played on.
    pub variant: usize,
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} (variant {})",
            self.player, self.opponent, self.variant
        )
    }
}

/// Every unordered pair `(i, j), i < j` over `competitors`, crossed with every variant.
///
/// Pairings are ordered by player, then opponent, then variant.
pub fn pairings(competitors: usize, variants: usize) -> Vec<Pairing> {
    let mut pending = Vec::with_capacity(number_of_games(competitors, variants));
    for player in 0..competitors {
        for opponent in (player + 1)..competitors {
            for variant in 0..variants {
                pending.push(Pairing {
                    player,
                    opponent,
                    variant,
                });
            }
        }
    }
    pending
}

/// `C(competitors, 2) × variants`
pub fn number_of_games(competitors: usize, variants: usize) -> usize {
    competitors * competitors.saturating_sub(1) / 2 * variants
}

/// Games played, and so victories reachable, by each competitor.
pub fn games_per_competitor(competitors: usize, variants: usize) -> usize {
    competitors.saturating_sub(1) * variants
}
