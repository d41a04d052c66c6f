use crate::events::EventBus;
use crate::state::World;

use super::levels_set::LevelsSet;

/// Level-up, level-down and experience template shared by progression tracks.
///
/// Implementors expose their [`LevelsSet`] and may react to transitions
/// through `on_level_up` / `on_level_down`, which run after the level event
/// was published.
pub trait LevelTrack {
    fn levels_set(&self) -> &LevelsSet;

    fn levels_set_mut(&mut self) -> &mut LevelsSet;

    fn on_level_up(&mut self, _world: &mut dyn World, _level: i32, _bus: &EventBus) {}

    fn on_level_down(&mut self, _world: &mut dyn World, _left: i32, _bus: &EventBus) {}

    fn current_level(&self) -> i32 {
        self.levels_set().current_level()
    }

    fn current_exp(&self) -> f64 {
        self.levels_set().current_exp()
    }

    fn next_level_experience(&self) -> f64 {
        self.levels_set().next_level_experience()
    }

    /// Enters the next level. Returns `false` at the top level.
    fn level_up(&mut self, world: &mut dyn World, bus: &EventBus) -> bool {
        let Some(level) = self.levels_set_mut().step_up(world, bus) else {
            return false;
        };
        self.on_level_up(world, level, bus);
        true
    }

    /// Returns to the previous level. Returns `false` at the bottom level.
    fn level_down(&mut self, world: &mut dyn World, bus: &EventBus) -> bool {
        let Some(left) = self.levels_set_mut().step_down(world, bus) else {
            return false;
        };
        self.on_level_down(world, left, bus);
        true
    }

    /// Adds experience and levels up as long as it covers the next level.
    ///
    /// Returns the number of levels gained; several levels may be gained by
    /// one call. With `set_required_experience_limit` the total is capped as
    /// soon as the top level is reached, so every published total is capped.
    fn add_experience(&mut self, world: &mut dyn World, amount: f64, bus: &EventBus) -> u32 {
        if !self.levels_set_mut().gain_experience(amount, bus) {
            return 0;
        }

        let mut gained = 0;
        while let Some(required) = self.levels_set().pending_level_requirement() {
            if self.levels_set().current_exp() < required || !self.level_up(world, bus) {
                break;
            }
            gained += 1;
        }

        gained
    }
}

impl LevelTrack for LevelsSet {
    fn levels_set(&self) -> &LevelsSet {
        self
    }

    fn levels_set_mut(&mut self) -> &mut LevelsSet {
        self
    }
}
