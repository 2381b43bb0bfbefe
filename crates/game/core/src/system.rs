//! Per-actor ability system: attributes, active effects, tags and granted
//! abilities.
//!
//! [`EffectHost`] owns everything effects touch. [`AbilitySystem`] adds the
//! granted abilities on top and runs their lifecycle; the two are kept apart
//! so an ability can borrow the host while its own spec is borrowed too.

use tracing::{debug, trace};

use crate::ability::{
    AbilityContext, AbilityError, AbilitySpec, AbilitySpecHandle, AbilityState, GameplayAbility,
    InputResponse,
};
use crate::attributes::{ManaAttribute, ManaNotification, ManaSet, ModifierExecution};
use crate::effect::{
    ActiveEffects, EffectContext, EffectHandle, EffectTemplate, ModOp, StackRemoval,
};
use crate::error::GameError;
use crate::hero::HeroConfig;
use crate::messaging::MessageBus;
use crate::state::EntityId;
use crate::tags::{GameplayTag, TagCounts};

/// Attributes, active effects and tags of one actor.
#[derive(Debug)]
pub struct EffectHost {
    owner: EntityId,
    attributes: ManaSet,
    effects: ActiveEffects,
    loose_tags: TagCounts,
}

impl EffectHost {
    pub fn new(owner: EntityId, attributes: ManaSet) -> Self {
        Self {
            owner,
            attributes,
            effects: ActiveEffects::new(owner),
            loose_tags: TagCounts::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn mana_set(&self) -> &ManaSet {
        &self.attributes
    }

    pub fn mana_set_mut(&mut self) -> &mut ManaSet {
        &mut self.attributes
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Applies `template` to this host.
    ///
    /// Instant templates execute immediately and return an invalid handle.
    /// A missing template applies nothing and also returns an invalid handle.
    pub fn apply_effect_to_self(
        &mut self,
        template: Option<&EffectTemplate>,
        context: EffectContext,
    ) -> EffectHandle {
        let Some(template) = template else {
            debug!(owner = %self.owner, "no effect template; nothing applied");
            return EffectHandle::INVALID;
        };

        if template.is_instant() {
            trace!(owner = %self.owner, effect = %template.name, "executing instant effect");
            for modifier in &template.modifiers {
                self.attributes.execute(&ModifierExecution {
                    attribute: modifier.attribute,
                    op: modifier.op,
                    magnitude: modifier.magnitude,
                    instigator: context.instigator,
                    causer: context.causer,
                });
            }
            return EffectHandle::INVALID;
        }

        let (handle, created) = self.effects.insert(template, context);
        debug!(
            owner = %self.owner,
            effect = %template.name,
            ?handle,
            created,
            "applied duration effect"
        );

        if template.is_periodic() {
            if created {
                self.execute_effect(handle);
            }
        } else {
            self.refresh_aggregates();
        }
        handle
    }

    /// Removes `stacks` stacks of the effect behind `handle` (`0` removes all).
    ///
    /// Returns false when the handle is invalid, belongs to another host or
    /// no longer refers to an active effect.
    pub fn remove_effect(&mut self, handle: EffectHandle, stacks: u32) -> bool {
        if handle.owner() != Some(self.owner) {
            trace!(owner = %self.owner, ?handle, "ignoring removal of foreign handle");
            return false;
        }

        match self.effects.remove_stacks(handle, stacks) {
            None => false,
            Some(StackRemoval::Removed(effect)) => {
                debug!(owner = %self.owner, effect = %effect.template().name, "removed effect");
                self.refresh_aggregates();
                true
            }
            Some(StackRemoval::Remaining(left)) => {
                debug!(owner = %self.owner, ?handle, left, "removed effect stacks");
                self.refresh_aggregates();
                true
            }
        }
    }

    /// Applies an in-place modification to a base value.
    ///
    /// Bypasses effect execution, so no change events are published for it.
    pub fn apply_mod_to_attribute(&mut self, attribute: ManaAttribute, op: ModOp, magnitude: f32) {
        let base = self.attributes.attribute(attribute).base();
        self.attributes
            .set_base_value(attribute, op.apply(base, magnitude));
    }

    pub fn set_numeric_attribute_base(&mut self, attribute: ManaAttribute, value: f32) {
        self.apply_mod_to_attribute(attribute, ModOp::Override, value);
    }

    fn execute_effect(&mut self, handle: EffectHandle) {
        let Some(effect) = self.effects.get(handle) else {
            return;
        };
        let context = effect.context();
        let executions: Vec<_> = effect
            .template()
            .modifiers
            .iter()
            .map(|modifier| ModifierExecution {
                attribute: modifier.attribute,
                op: modifier.op,
                magnitude: effect.scaled_magnitude(modifier.op, modifier.magnitude),
                instigator: context.instigator,
                causer: context.causer,
            })
            .collect();

        for execution in &executions {
            self.attributes.execute(execution);
        }
    }

    fn refresh_aggregates(&mut self) {
        // Max first, so the mana clamp sees the new bound.
        for attribute in [ManaAttribute::MaxMana, ManaAttribute::Mana] {
            let aggregate = self.effects.aggregate(attribute);
            self.attributes.set_aggregate(attribute, aggregate);
        }
    }

    /// Advances periodic executions and durations by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let tick = self.effects.tick(dt);

        for handle in tick.executions {
            self.execute_effect(handle);
        }
        for handle in tick.expired {
            self.remove_effect(handle, 0);
        }
    }

    /// Drains the notifications queued by the attribute set.
    pub fn take_notifications(&mut self) -> Vec<ManaNotification> {
        self.attributes.observers_mut().take()
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub fn set_loose_tag_count(&mut self, tag: GameplayTag, count: u32) {
        self.loose_tags.set(tag, count);
    }

    pub fn add_loose_tag(&mut self, tag: GameplayTag) {
        self.loose_tags.add(tag);
    }

    pub fn remove_loose_tag(&mut self, tag: GameplayTag) {
        self.loose_tags.remove(tag);
    }

    /// Loose count plus the number of active effects granting `tag`.
    pub fn tag_count(&self, tag: GameplayTag) -> u32 {
        self.loose_tags.count(tag) + self.effects.granted_count(tag)
    }

    pub fn has_tag(&self, tag: GameplayTag) -> bool {
        self.tag_count(tag) > 0
    }
}

/// Ability system component of one actor.
pub struct AbilitySystem {
    host: EffectHost,
    abilities: Vec<AbilitySpec>,
    next_spec: u32,
}

impl AbilitySystem {
    pub fn new(owner: EntityId, attributes: ManaSet) -> Self {
        Self {
            host: EffectHost::new(owner, attributes),
            abilities: Vec::new(),
            next_spec: 0,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.host.owner()
    }

    pub fn host(&self) -> &EffectHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut EffectHost {
        &mut self.host
    }

    pub fn grant_ability(&mut self, ability: Box<dyn GameplayAbility>) -> AbilitySpecHandle {
        self.next_spec += 1;
        let handle = AbilitySpecHandle(self.next_spec);
        debug!(owner = %self.owner(), ability = ability.name(), "granted ability");
        self.abilities.push(AbilitySpec::new(handle, ability));
        handle
    }

    pub fn ability_state(&self, spec: AbilitySpecHandle) -> Option<AbilityState> {
        self.abilities
            .iter()
            .find(|s| s.handle == spec)
            .map(|s| s.state)
    }

    fn index_of(&self, spec: AbilitySpecHandle) -> Result<usize, AbilityError> {
        self.abilities
            .iter()
            .position(|s| s.handle == spec)
            .ok_or(AbilityError::UnknownSpec(spec))
    }

    /// Activates an inactive ability if it allows activation.
    ///
    /// Returns `Ok(false)` when the ability is already running or refused.
    pub fn try_activate(
        &mut self,
        spec: AbilitySpecHandle,
        hero: Option<&HeroConfig>,
        bus: &mut MessageBus,
    ) -> Result<bool, AbilityError> {
        let index = self.index_of(spec)?;
        let host = &mut self.host;
        let spec = &mut self.abilities[index];

        if spec.state != AbilityState::Inactive {
            trace!(ability = spec.ability.name(), state = %spec.state, "ability already running");
            return Ok(false);
        }

        let mut ctx = AbilityContext {
            avatar: Some(host.owner()),
            host: Some(&mut *host),
            hero,
            bus,
        };
        if !spec.ability.can_activate(&ctx) {
            debug!(ability = spec.ability.name(), "activation refused");
            return Ok(false);
        }

        spec.state = AbilityState::Activating;
        spec.ability.activate(&mut ctx);

        spec.state = AbilityState::Active;
        for tag in spec.ability.ability_tags() {
            host.add_loose_tag(*tag);
        }
        debug!(owner = %host.owner(), ability = spec.ability.name(), "ability activated");
        Ok(true)
    }

    /// Forwards an input press to an active ability.
    pub fn input_pressed(
        &mut self,
        spec: AbilitySpecHandle,
        hero: Option<&HeroConfig>,
        bus: &mut MessageBus,
    ) -> Result<(), AbilityError> {
        let index = self.index_of(spec)?;
        let host = &mut self.host;
        let spec = &mut self.abilities[index];
        if spec.state != AbilityState::Active {
            return Ok(());
        }

        let mut ctx = AbilityContext {
            avatar: Some(host.owner()),
            host: Some(&mut *host),
            hero,
            bus: &mut *bus,
        };
        match spec.ability.input_pressed(&mut ctx) {
            InputResponse::Ignore => Ok(()),
            InputResponse::EndAbility => self.end_at(index, false, hero, bus),
        }
    }

    pub fn end_ability(
        &mut self,
        spec: AbilitySpecHandle,
        hero: Option<&HeroConfig>,
        bus: &mut MessageBus,
    ) -> Result<(), AbilityError> {
        let index = self.index_of(spec)?;
        self.end_at(index, false, hero, bus)
    }

    /// Cancels every active ability carrying one of `tags`.
    ///
    /// Returns how many abilities ended.
    pub fn cancel_abilities(
        &mut self,
        tags: &[GameplayTag],
        hero: Option<&HeroConfig>,
        bus: &mut MessageBus,
    ) -> usize {
        let mut cancelled = 0;
        for index in 0..self.abilities.len() {
            let spec = &self.abilities[index];
            let matches = spec.state == AbilityState::Active
                && spec.ability.ability_tags().iter().any(|tag| tags.contains(tag));
            if !matches {
                continue;
            }

            match self.end_at(index, true, hero, bus) {
                Ok(()) => cancelled += 1,
                Err(err) => debug!(
                    category = %err.category(),
                    error = %err,
                    "ability did not end on cancel"
                ),
            }
        }
        cancelled
    }

    fn end_at(
        &mut self,
        index: usize,
        was_cancelled: bool,
        hero: Option<&HeroConfig>,
        bus: &mut MessageBus,
    ) -> Result<(), AbilityError> {
        let host = &mut self.host;
        let spec = &mut self.abilities[index];
        if spec.state != AbilityState::Active {
            return Ok(());
        }

        spec.state = AbilityState::Ending;
        let mut ctx = AbilityContext {
            avatar: Some(host.owner()),
            host: Some(&mut *host),
            hero,
            bus,
        };
        if let Err(err) = spec.ability.end(&mut ctx, was_cancelled) {
            spec.state = AbilityState::Active;
            return Err(err);
        }

        spec.state = AbilityState::Inactive;
        for tag in spec.ability.ability_tags() {
            host.remove_loose_tag(*tag);
        }
        debug!(
            owner = %host.owner(),
            ability = spec.ability.name(),
            was_cancelled,
            "ability ended"
        );
        Ok(())
    }
}

impl std::fmt::Debug for AbilitySystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilitySystem")
            .field("host", &self.host)
            .field("abilities", &self.abilities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ManaEventKind;
    use crate::effect::ActiveEffect;

    fn host(max_mana: f32) -> EffectHost {
        EffectHost::new(EntityId(1), ManaSet::with_max_mana(max_mana))
    }

    fn self_context() -> EffectContext {
        EffectContext::from_self(EntityId(1))
    }

    #[test]
    fn missing_template_applies_nothing() {
        let mut host = host(100.0);

        let handle = host.apply_effect_to_self(None, self_context());

        assert!(!handle.is_valid());
        assert!(host.effects().is_empty());
        assert_eq!(host.mana_set().mana(), 100.0);
    }

    #[test]
    fn instant_effect_executes_without_a_handle() {
        let mut host = host(100.0);
        let burst = EffectTemplate::instant("burst").with_modifier(
            ManaAttribute::ManaDecrease,
            ModOp::Add,
            40.0,
        );

        let handle = host.apply_effect_to_self(Some(&burst), self_context());

        assert!(!handle.is_valid());
        assert_eq!(host.mana_set().mana(), 60.0);
    }

    #[test]
    fn periodic_drain_executes_on_application_and_each_period() {
        let mut host = host(100.0);
        let drain = EffectTemplate::infinite("drain")
            .with_period(1.0)
            .with_modifier(ManaAttribute::ManaDecrease, ModOp::Add, 10.0);

        let handle = host.apply_effect_to_self(Some(&drain), self_context());
        assert_eq!(host.mana_set().mana(), 90.0);

        host.tick(2.0);
        assert_eq!(host.mana_set().mana(), 70.0);

        assert!(host.remove_effect(handle, 1));
        host.tick(5.0);
        assert_eq!(host.mana_set().mana(), 70.0);
    }

    #[test]
    fn held_max_bonus_is_reverted_on_removal() {
        let mut host = host(100.0);
        let bonus = EffectTemplate::infinite("bonus").with_modifier(
            ManaAttribute::MaxMana,
            ModOp::Add,
            50.0,
        );

        let handle = host.apply_effect_to_self(Some(&bonus), self_context());
        assert_eq!(host.mana_set().max_mana(), 150.0);

        host.remove_effect(handle, 0);
        assert_eq!(host.mana_set().max_mana(), 100.0);
    }

    #[test]
    fn timed_effect_grants_tag_until_expiry() {
        let mut host = host(100.0);
        let cooldown =
            EffectTemplate::timed("cooldown", 3.0).granting(GameplayTag::CooldownManaShield);

        let handle = host.apply_effect_to_self(Some(&cooldown), self_context());
        assert!(host.has_tag(GameplayTag::CooldownManaShield));

        host.tick(1.0);
        let remaining = host.effects().get(handle).and_then(ActiveEffect::remaining);
        assert_eq!(remaining, Some(2.0));

        host.tick(3.5);
        assert!(!host.has_tag(GameplayTag::CooldownManaShield));
        assert!(host.effects().is_empty());
    }

    #[test]
    fn foreign_handle_is_not_removed() {
        let mut host = host(100.0);
        let mut other = EffectHost::new(EntityId(2), ManaSet::new());
        let drain = EffectTemplate::infinite("drain");
        let handle = other.apply_effect_to_self(Some(&drain), EffectContext::default());

        assert!(!host.remove_effect(handle, 0));
        assert!(other.remove_effect(handle, 0));
        assert!(!host.remove_effect(EffectHandle::INVALID, 0));
    }

    #[test]
    fn base_override_publishes_nothing() {
        let mut host = host(100.0);
        let observers = host.mana_set_mut().observers_mut();
        let observer = observers.register();
        observers.subscribe(observer, ManaEventKind::ManaChanged);

        host.set_numeric_attribute_base(ManaAttribute::Mana, 20.0);

        assert_eq!(host.mana_set().mana(), 20.0);
        assert!(host.take_notifications().is_empty());
    }

    #[test]
    fn loose_and_granted_tags_combine() {
        let mut host = host(100.0);
        let cooldown =
            EffectTemplate::infinite("cooldown").granting(GameplayTag::CooldownManaShield);
        host.add_loose_tag(GameplayTag::CooldownManaShield);
        host.apply_effect_to_self(Some(&cooldown), self_context());

        assert_eq!(host.tag_count(GameplayTag::CooldownManaShield), 2);

        host.set_loose_tag_count(GameplayTag::CooldownManaShield, 0);
        assert_eq!(host.tag_count(GameplayTag::CooldownManaShield), 1);
    }

    /// Records lifecycle calls; refuses to end while `stuck` is set.
    #[derive(Default)]
    struct Probe {
        activations: u32,
        ends: Vec<bool>,
        stuck: bool,
    }

    impl GameplayAbility for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn ability_tags(&self) -> &[GameplayTag] {
            &[GameplayTag::AbilityManaShield]
        }

        fn activation_blocked_tags(&self) -> &[GameplayTag] {
            &[GameplayTag::CooldownManaShield]
        }

        fn activate(&mut self, _ctx: &mut AbilityContext<'_>) {
            self.activations += 1;
        }

        fn input_pressed(&mut self, _ctx: &mut AbilityContext<'_>) -> InputResponse {
            InputResponse::EndAbility
        }

        fn end(
            &mut self,
            _ctx: &mut AbilityContext<'_>,
            was_cancelled: bool,
        ) -> Result<(), AbilityError> {
            if self.stuck {
                return Err(AbilityError::InvalidAvatar);
            }
            self.ends.push(was_cancelled);
            Ok(())
        }
    }

    #[test]
    fn activation_adds_ability_tags_and_end_removes_them() {
        let mut system = AbilitySystem::new(EntityId(1), ManaSet::new());
        let mut bus = MessageBus::new();
        let spec = system.grant_ability(Box::new(Probe::default()));

        assert_eq!(system.try_activate(spec, None, &mut bus), Ok(true));
        assert_eq!(system.ability_state(spec), Some(AbilityState::Active));
        assert!(system.host().has_tag(GameplayTag::AbilityManaShield));
        assert_eq!(system.try_activate(spec, None, &mut bus), Ok(false));

        system.input_pressed(spec, None, &mut bus).unwrap();

        assert_eq!(system.ability_state(spec), Some(AbilityState::Inactive));
        assert!(!system.host().has_tag(GameplayTag::AbilityManaShield));
    }

    #[test]
    fn blocked_tag_refuses_activation() {
        let mut system = AbilitySystem::new(EntityId(1), ManaSet::new());
        let mut bus = MessageBus::new();
        let spec = system.grant_ability(Box::new(Probe::default()));
        system
            .host_mut()
            .add_loose_tag(GameplayTag::CooldownManaShield);

        assert_eq!(system.try_activate(spec, None, &mut bus), Ok(false));
        assert_eq!(system.ability_state(spec), Some(AbilityState::Inactive));
    }

    #[test]
    fn failed_end_keeps_the_ability_active() {
        let mut system = AbilitySystem::new(EntityId(1), ManaSet::new());
        let mut bus = MessageBus::new();
        let spec = system.grant_ability(Box::new(Probe {
            stuck: true,
            ..Probe::default()
        }));
        system.try_activate(spec, None, &mut bus).unwrap();

        assert_eq!(
            system.end_ability(spec, None, &mut bus),
            Err(AbilityError::InvalidAvatar)
        );
        assert_eq!(system.ability_state(spec), Some(AbilityState::Active));
        assert!(system.host().has_tag(GameplayTag::AbilityManaShield));
    }

    #[test]
    fn cancel_ends_only_matching_active_abilities() {
        let mut system = AbilitySystem::new(EntityId(1), ManaSet::new());
        let mut bus = MessageBus::new();
        let active = system.grant_ability(Box::new(Probe::default()));
        let idle = system.grant_ability(Box::new(Probe::default()));
        system.try_activate(active, None, &mut bus).unwrap();

        let cancelled =
            system.cancel_abilities(&[GameplayTag::AbilityManaShield], None, &mut bus);

        assert_eq!(cancelled, 1);
        assert_eq!(system.ability_state(active), Some(AbilityState::Inactive));
        assert_eq!(system.ability_state(idle), Some(AbilityState::Inactive));
    }

    #[test]
    fn unknown_spec_is_reported() {
        let mut system = AbilitySystem::new(EntityId(1), ManaSet::new());
        let mut bus = MessageBus::new();
        let missing = AbilitySpecHandle(42);

        assert_eq!(
            system.try_activate(missing, None, &mut bus),
            Err(AbilityError::UnknownSpec(missing))
        );
    }

    #[test]
    fn drain_to_zero_queues_depletion() {
        let mut host = host(30.0);
        let observer = host.mana_set_mut().observers_mut().register();
        host.mana_set_mut()
            .observers_mut()
            .subscribe(observer, ManaEventKind::OutOfMana);
        let burst = EffectTemplate::instant("burst").with_modifier(
            ManaAttribute::ManaDecrease,
            ModOp::Add,
            50.0,
        );

        host.apply_effect_to_self(Some(&burst), self_context());

        let notes = host.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].event.kind, ManaEventKind::OutOfMana);
    }
}
