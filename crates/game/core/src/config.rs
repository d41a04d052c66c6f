/// Tunable defaults shared by skills and progression tracks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SkillsConfig {
    /// Prefix of owner-scoped event keys, named after the owner's identifier
    /// property (`id` yields keys such as `id7.level_up`).
    pub scope_prefix: String,

    /// Multiplier used by skills that do not set their own.
    pub critical_multiplier: f64,

    /// Ratio by which dodge must exceed aim for a full dodge, when the attack
    /// does not set its own.
    pub dodge_over_aim_success: f64,

    /// Growth factor between synthesized levels (1 interpolates linearly).
    pub auto_fill_experience_multiplier: f64,

    /// Session seed for critical-hit rolls.
    pub game_seed: u64,
}

impl SkillsConfig {
    pub const DEFAULT_SCOPE_PREFIX: &'static str = "id";
    pub const DEFAULT_CRITICAL_MULTIPLIER: f64 = 2.0;
    pub const DEFAULT_DODGE_OVER_AIM_SUCCESS: f64 = 2.0;
    pub const DEFAULT_AUTO_FILL_EXPERIENCE_MULTIPLIER: f64 = 1.0;

    pub fn new() -> Self {
        Self {
            scope_prefix: Self::DEFAULT_SCOPE_PREFIX.to_string(),
            critical_multiplier: Self::DEFAULT_CRITICAL_MULTIPLIER,
            dodge_over_aim_success: Self::DEFAULT_DODGE_OVER_AIM_SUCCESS,
            auto_fill_experience_multiplier: Self::DEFAULT_AUTO_FILL_EXPERIENCE_MULTIPLIER,
            game_seed: 0,
        }
    }

    pub fn with_game_seed(mut self, game_seed: u64) -> Self {
        self.game_seed = game_seed;
        self
    }
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self::new()
    }
}
