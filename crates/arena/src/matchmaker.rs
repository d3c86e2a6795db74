//! Opponent selection by rating proximity

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::profile::ArenaProfile;
use crate::registry::PlayerRegistry;

/// Rating-window matchmaker
#[derive(Debug, Clone, Copy)]
pub struct Matchmaker {
    /// Half-width of the accepted rating band
    pub window: i32,
}

impl Matchmaker {
    pub fn new(window: i32) -> Self {
        Self { window }
    }

    /// Every other profile rated within `[rating - window, rating + window]`
    pub fn candidates<'a>(
        &self,
        registry: &'a PlayerRegistry,
        player_id: &str,
    ) -> Result<Vec<&'a ArenaProfile>> {
        let rating = registry.require(player_id)?.rating();
        let min = rating.saturating_sub(self.window);
        let max = rating.saturating_add(self.window);

        Ok(registry
            .iter()
            .filter(|p| p.player_id != player_id && p.rating() >= min && p.rating() <= max)
            .collect())
    }

    /// Pick one candidate uniformly at random.
    ///
    /// `Ok(None)` means nobody is in range right now.
    pub fn find_match<'a, R: Rng + ?Sized>(
        &self,
        registry: &'a PlayerRegistry,
        player_id: &str,
        rng: &mut R,
    ) -> Result<Option<&'a ArenaProfile>> {
        let candidates = self.candidates(registry, player_id)?;
        Ok(candidates.choose(rng).copied())
    }
}
