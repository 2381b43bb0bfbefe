/// Ability configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityConfig {
    /// Max mana given to characters whose hero configuration does not set one.
    pub default_max_mana: f32,
    /// Half extent of newly placed trigger volumes (a cube of twice this size).
    pub trigger_half_extent: f32,
}

impl AbilityConfig {
    // ===== invariants =====
    /// Lower bound enforced on max mana by the attribute set.
    pub const MIN_MAX_MANA: f32 = 1.0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_MANA: f32 = 100.0;
    pub const DEFAULT_TRIGGER_HALF_EXTENT: f32 = 100.0;

    pub fn new() -> Self {
        Self {
            default_max_mana: Self::DEFAULT_MAX_MANA,
            trigger_half_extent: Self::DEFAULT_TRIGGER_HALF_EXTENT,
        }
    }

    pub fn with_trigger_half_extent(mut self, trigger_half_extent: f32) -> Self {
        self.trigger_half_extent = trigger_half_extent;
        self
    }
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self::new()
    }
}
