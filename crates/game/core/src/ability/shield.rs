use tracing::debug;

use super::{AbilityContext, AbilityError, GameplayAbility, InputResponse};
use crate::effect::{EffectContext, EffectHandle};
use crate::messaging::{Signal, VerbMessage};
use crate::tags::GameplayTag;

/// Drains mana while active; ends on input or when mana runs out.
///
/// Activation applies the hero's mana-decrease template and shows the HUD
/// slot. Ending removes that effect, applies the cooldown template and hides
/// the slot.
#[derive(Debug, Default)]
pub struct ManaShieldAbility {
    effect_handle: EffectHandle,
}

impl ManaShieldAbility {
    const TAGS: [GameplayTag; 1] = [GameplayTag::AbilityManaShield];
    const BLOCKED_BY: [GameplayTag; 1] = [GameplayTag::CooldownManaShield];

    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the drain applied on activation, invalid when none is held.
    pub fn effect_handle(&self) -> EffectHandle {
        self.effect_handle
    }
}

impl GameplayAbility for ManaShieldAbility {
    fn name(&self) -> &'static str {
        "mana_shield"
    }

    fn ability_tags(&self) -> &[GameplayTag] {
        &Self::TAGS
    }

    fn activation_blocked_tags(&self) -> &[GameplayTag] {
        &Self::BLOCKED_BY
    }

    fn can_activate(&self, ctx: &AbilityContext<'_>) -> bool {
        ctx.host.as_deref().is_some_and(|host| {
            !Self::BLOCKED_BY.iter().any(|tag| host.has_tag(*tag)) && host.mana_set().mana() > 0.0
        })
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>) {
        let template = ctx.hero.and_then(|hero| hero.mana_decrease());
        if template.is_none() {
            dev_warn!(avatar = ?ctx.avatar, "mana decrease template is not configured");
        }

        let Some(host) = ctx.host.as_deref_mut() else {
            dev_warn!(avatar = ?ctx.avatar, "ability system is missing in mana shield ability");
            return;
        };

        let owner = host.owner();
        self.effect_handle = host.apply_effect_to_self(template, EffectContext::from_self(owner));
        debug!(%owner, handle = ?self.effect_handle, "mana shield raised");

        ctx.bus
            .broadcast(VerbMessage::new(Signal::ShieldShown).with_instigator(ctx.avatar));
    }

    fn input_pressed(&mut self, _ctx: &mut AbilityContext<'_>) -> InputResponse {
        InputResponse::EndAbility
    }

    fn end(
        &mut self,
        ctx: &mut AbilityContext<'_>,
        was_cancelled: bool,
    ) -> Result<(), AbilityError> {
        let Some(owner) = self.effect_handle.owner() else {
            dev_warn!(avatar = ?ctx.avatar, "mana shield ended without an active drain");
            return Ok(());
        };

        let Some(host) = ctx
            .host
            .as_deref_mut()
            .filter(|host| host.owner() == owner)
        else {
            dev_warn!(%owner, "ability system of the drain owner is missing");
            return Err(AbilityError::MissingAbilitySystem { owner });
        };

        if ctx.avatar.is_none() {
            dev_warn!(%owner, "avatar actor is not valid");
            return Err(AbilityError::InvalidAvatar);
        }

        let cooldown = ctx.hero.and_then(|hero| hero.mana_cooldown());
        if cooldown.is_none() {
            dev_warn!(%owner, "mana cooldown template is not configured");
        }

        host.remove_effect(self.effect_handle, 1);
        host.apply_effect_to_self(cooldown, EffectContext::from_self(owner));
        self.effect_handle.invalidate();
        debug!(%owner, was_cancelled, "mana shield lowered");

        ctx.bus
            .broadcast(VerbMessage::new(Signal::ShieldHidden).with_instigator(ctx.avatar));
        Ok(())
    }
}
