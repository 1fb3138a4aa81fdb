/// Score, lives and energy for one game session.
///
/// Owned by the game manager and lent to whichever screen is active, so it
/// survives level restarts and level changes. A new game starts a new
/// session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    score: u32,
    lives: u32,
    energy: u32,
    max_energy: u32,
}

impl Session {
    pub fn new(lives: u32, max_energy: u32) -> Self {
        Session {
            score: 0,
            lives,
            energy: 0,
            max_energy,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn give_life(&mut self) {
        self.lives = self.lives.saturating_add(1);
    }

    /// Takes one life and returns how many are left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }

    /// Adds energy, clamped to the maximum.
    pub fn give_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(self.max_energy);
    }

    /// Spends `amount` if there is enough. Otherwise leaves the energy alone
    /// and returns `false`.
    pub fn spend_energy(&mut self, amount: u32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy -= amount;
        true
    }

    pub fn reset_energy(&mut self) {
        self.energy = 0;
    }
}
