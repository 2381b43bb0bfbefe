use super::{EffectContext, EffectDuration, EffectHandle, EffectTemplate, ModOp};
use crate::attributes::{Aggregate, ManaAttribute};
use crate::state::EntityId;
use crate::tags::GameplayTag;

/// One applied, non-instant template.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEffect {
    handle: EffectHandle,
    template: EffectTemplate,
    context: EffectContext,
    stacks: u32,
    remaining: Option<f32>,
    until_next_period: f32,
}

impl ActiveEffect {
    pub fn handle(&self) -> EffectHandle {
        self.handle
    }

    pub fn template(&self) -> &EffectTemplate {
        &self.template
    }

    pub fn context(&self) -> EffectContext {
        self.context
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Seconds left before expiry; `None` for infinite effects.
    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Magnitude of `op` scaled by the stack count. Only additive modifiers stack.
    pub(crate) fn scaled_magnitude(&self, op: ModOp, magnitude: f32) -> f32 {
        match op {
            ModOp::Add => magnitude * self.stacks as f32,
            _ => magnitude,
        }
    }
}

/// Result of advancing active effects by one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectTick {
    /// Periodic executions due this frame, in order.
    pub executions: Vec<EffectHandle>,
    /// Effects whose duration ran out this frame.
    pub expired: Vec<EffectHandle>,
}

/// Outcome of removing stacks from an active effect.
#[derive(Clone, Debug, PartialEq)]
pub enum StackRemoval {
    /// The last stack went away; the effect is no longer active.
    Removed(ActiveEffect),
    /// Stacks are left; the effect stays active.
    Remaining(u32),
}

/// Active effects of one ability system.
#[derive(Clone, Debug)]
pub struct ActiveEffects {
    owner: EntityId,
    next_id: u32,
    effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            next_id: 0,
            effects: Vec::new(),
        }
    }

    pub fn get(&self, handle: EffectHandle) -> Option<&ActiveEffect> {
        self.effects.iter().find(|effect| effect.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Adds an application of `template`, stacking onto an existing instance
    /// when the template allows it.
    ///
    /// Returns the handle and whether a new instance was created.
    pub(crate) fn insert(
        &mut self,
        template: &EffectTemplate,
        context: EffectContext,
    ) -> (EffectHandle, bool) {
        let remaining = match template.duration {
            EffectDuration::HasDuration(seconds) => Some(seconds),
            EffectDuration::Infinite | EffectDuration::Instant => None,
        };

        if let Some(limit) = template.stack_limit
            && let Some(existing) = self
                .effects
                .iter_mut()
                .find(|effect| effect.template.name == template.name)
        {
            existing.stacks = (existing.stacks + 1).min(limit);
            existing.remaining = remaining;
            return (existing.handle, false);
        }

        self.next_id += 1;
        let handle = EffectHandle::new(self.owner, self.next_id);
        self.effects.push(ActiveEffect {
            handle,
            template: template.clone(),
            context,
            stacks: 1,
            remaining,
            until_next_period: template.period.unwrap_or(0.0),
        });
        (handle, true)
    }

    /// Removes up to `stacks` stacks (`0` removes every stack).
    ///
    /// Returns `None` when the handle is unknown.
    pub(crate) fn remove_stacks(
        &mut self,
        handle: EffectHandle,
        stacks: u32,
    ) -> Option<StackRemoval> {
        let index = self
            .effects
            .iter()
            .position(|effect| effect.handle == handle)?;

        let effect = &mut self.effects[index];
        if stacks == 0 || stacks >= effect.stacks {
            return Some(StackRemoval::Removed(self.effects.remove(index)));
        }

        effect.stacks -= stacks;
        Some(StackRemoval::Remaining(effect.stacks))
    }

    /// Number of active effects granting `tag`.
    pub fn granted_count(&self, tag: GameplayTag) -> u32 {
        self.effects
            .iter()
            .filter(|effect| effect.template.granted_tags.contains(&tag))
            .count() as u32
    }

    /// Folds the held (non-periodic) modifiers targeting `attribute`.
    pub fn aggregate(&self, attribute: ManaAttribute) -> Aggregate {
        let mut aggregate = Aggregate::IDENTITY;
        for effect in self.effects.iter().filter(|e| !e.template.is_periodic()) {
            for modifier in effect
                .template
                .modifiers
                .iter()
                .filter(|m| m.attribute == attribute)
            {
                aggregate.push(
                    modifier.op,
                    effect.scaled_magnitude(modifier.op, modifier.magnitude),
                );
            }
        }
        aggregate
    }

    /// Advances periods and durations by `dt` seconds.
    ///
    /// A periodic effect only executes for the part of the frame it was alive.
    pub(crate) fn tick(&mut self, dt: f32) -> EffectTick {
        let mut tick = EffectTick::default();

        for effect in &mut self.effects {
            let alive = effect.remaining.map_or(dt, |remaining| dt.min(remaining));

            if let Some(period) = effect.template.period.filter(|_| effect.template.is_periodic()) {
                effect.until_next_period -= alive;
                while effect.until_next_period <= 0.0 {
                    tick.executions.push(effect.handle);
                    effect.until_next_period += period;
                }
            }

            if let Some(remaining) = effect.remaining.as_mut() {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    tick.expired.push(effect.handle);
                }
            }
        }

        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> EntityId {
        EntityId(1)
    }

    #[test]
    fn unstacked_templates_create_new_instances() {
        let mut effects = ActiveEffects::new(owner());
        let drain = EffectTemplate::infinite("drain");

        let (first, first_new) = effects.insert(&drain, EffectContext::default());
        let (second, second_new) = effects.insert(&drain, EffectContext::default());

        assert!(first_new && second_new);
        assert_ne!(first, second);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn stacking_templates_share_a_handle_up_to_the_limit() {
        let mut effects = ActiveEffects::new(owner());
        let drain = EffectTemplate::infinite("drain").with_stack_limit(2);

        let (first, _) = effects.insert(&drain, EffectContext::default());
        let (second, created) = effects.insert(&drain, EffectContext::default());
        effects.insert(&drain, EffectContext::default());

        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(effects.get(first).map(ActiveEffect::stacks), Some(2));
    }

    #[test]
    fn removing_one_stack_keeps_the_instance() {
        let mut effects = ActiveEffects::new(owner());
        let drain = EffectTemplate::infinite("drain").with_stack_limit(3);
        let (handle, _) = effects.insert(&drain, EffectContext::default());
        effects.insert(&drain, EffectContext::default());

        assert_eq!(
            effects.remove_stacks(handle, 1),
            Some(StackRemoval::Remaining(1))
        );
        assert!(matches!(
            effects.remove_stacks(handle, 1),
            Some(StackRemoval::Removed(_))
        ));
        assert_eq!(effects.remove_stacks(handle, 1), None);
    }

    #[test]
    fn periodic_tick_stops_at_expiry() {
        let mut effects = ActiveEffects::new(owner());
        let pulse = EffectTemplate::timed("pulse", 2.5).with_period(1.0);
        let (handle, _) = effects.insert(&pulse, EffectContext::default());

        let tick = effects.tick(10.0);

        assert_eq!(tick.executions, vec![handle, handle]);
        assert_eq!(tick.expired, vec![handle]);
    }

    #[test]
    fn aggregate_skips_periodic_modifiers() {
        let mut effects = ActiveEffects::new(owner());
        let held = EffectTemplate::infinite("held")
            .with_modifier(ManaAttribute::MaxMana, ModOp::Add, 20.0)
            .with_stack_limit(2);
        let drain = EffectTemplate::infinite("drain")
            .with_period(1.0)
            .with_modifier(ManaAttribute::MaxMana, ModOp::Add, 99.0);
        effects.insert(&held, EffectContext::default());
        effects.insert(&held, EffectContext::default());
        effects.insert(&drain, EffectContext::default());

        let aggregate = effects.aggregate(ManaAttribute::MaxMana);

        assert_eq!(aggregate.add, 40.0);
    }
}
