use super::{
    Aggregate, AttributeData, ManaAttribute, ManaEvent, ManaEventKind, ModifierExecution,
    ObserverList,
};
use crate::config::AbilityConfig;

/// Mana attributes of one ability system.
///
/// `Mana` is only changed through executions (decrease, recover or direct
/// writes) and overrides; `MaxMana` can also be raised or lowered by duration
/// effects. Invariants after every mutation:
///
/// - `0 <= mana <= max_mana`
/// - `max_mana >= 1`
/// - `mana_recover == 0` and `mana_decrease == 0` outside an execution
#[derive(Clone, Debug)]
pub struct ManaSet {
    mana: AttributeData,
    max_mana: AttributeData,
    mana_recover: AttributeData,
    mana_decrease: AttributeData,

    /// Set once mana reaches zero; guards against repeated `OutOfMana` events.
    out_of_mana: bool,

    mana_before_change: f32,
    max_mana_before_change: f32,

    observers: ObserverList,
}

impl ManaSet {
    pub fn new() -> Self {
        Self::with_max_mana(AbilityConfig::DEFAULT_MAX_MANA)
    }

    /// Creates a full set (`mana == max_mana`).
    pub fn with_max_mana(max_mana: f32) -> Self {
        let max_mana = max_mana.max(AbilityConfig::MIN_MAX_MANA);
        Self {
            mana: AttributeData::new(max_mana),
            max_mana: AttributeData::new(max_mana),
            mana_recover: AttributeData::new(0.0),
            mana_decrease: AttributeData::new(0.0),
            out_of_mana: false,
            mana_before_change: 0.0,
            max_mana_before_change: 0.0,
            observers: ObserverList::new(),
        }
    }

    pub fn mana(&self) -> f32 {
        self.mana.current()
    }

    pub fn max_mana(&self) -> f32 {
        self.max_mana.current()
    }

    pub fn mana_recover(&self) -> f32 {
        self.mana_recover.current()
    }

    pub fn mana_decrease(&self) -> f32 {
        self.mana_decrease.current()
    }

    pub fn is_out_of_mana(&self) -> bool {
        self.out_of_mana
    }

    pub fn attribute(&self, attribute: ManaAttribute) -> &AttributeData {
        match attribute {
            ManaAttribute::Mana => &self.mana,
            ManaAttribute::MaxMana => &self.max_mana,
            ManaAttribute::ManaRecover => &self.mana_recover,
            ManaAttribute::ManaDecrease => &self.mana_decrease,
        }
    }

    fn attribute_mut(&mut self, attribute: ManaAttribute) -> &mut AttributeData {
        match attribute {
            ManaAttribute::Mana => &mut self.mana,
            ManaAttribute::MaxMana => &mut self.max_mana,
            ManaAttribute::ManaRecover => &mut self.mana_recover,
            ManaAttribute::ManaDecrease => &mut self.mana_decrease,
        }
    }

    pub fn observers(&self) -> &ObserverList {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut ObserverList {
        &mut self.observers
    }

    // ========================================================================
    // Value hooks
    // ========================================================================

    fn clamp_attribute(&self, attribute: ManaAttribute, value: &mut f32) {
        match attribute {
            ManaAttribute::Mana => *value = value.clamp(0.0, self.max_mana()),
            ManaAttribute::MaxMana => *value = value.max(AbilityConfig::MIN_MAX_MANA),
            ManaAttribute::ManaRecover | ManaAttribute::ManaDecrease => {}
        }
    }

    fn pre_attribute_base_change(&self, attribute: ManaAttribute, value: &mut f32) {
        self.clamp_attribute(attribute, value);
    }

    fn pre_attribute_change(&self, attribute: ManaAttribute, value: &mut f32) {
        self.clamp_attribute(attribute, value);
    }

    fn post_attribute_change(&mut self, attribute: ManaAttribute, _old: f32, new: f32) {
        if attribute == ManaAttribute::MaxMana && self.mana() > new {
            // Lowered maximum: force current mana down with a base override.
            self.set_base_value(ManaAttribute::Mana, new);
        }

        if self.out_of_mana && self.mana() > 0.0 {
            self.out_of_mana = false;
        }
    }

    /// Writes a base value (clamped) and refreshes the current value.
    ///
    /// This is also the override path used when max mana drops below mana.
    pub(crate) fn set_base_value(&mut self, attribute: ManaAttribute, mut value: f32) {
        self.pre_attribute_base_change(attribute, &mut value);
        self.attribute_mut(attribute).base = value;
        self.refresh_current(attribute);
    }

    /// Replaces the duration-effect modifiers folded into `attribute`.
    pub(crate) fn set_aggregate(&mut self, attribute: ManaAttribute, aggregate: Aggregate) {
        self.attribute_mut(attribute).aggregate = aggregate;
        self.refresh_current(attribute);
    }

    fn refresh_current(&mut self, attribute: ManaAttribute) {
        let data = *self.attribute(attribute);
        let mut value = data.aggregate.evaluate(data.base);
        self.pre_attribute_change(attribute, &mut value);

        if value != data.current {
            self.attribute_mut(attribute).current = value;
            self.post_attribute_change(attribute, data.current, value);
        }
    }

    // ========================================================================
    // Effect execution
    // ========================================================================

    fn pre_effect_execute(&mut self) -> bool {
        self.mana_before_change = self.mana();
        self.max_mana_before_change = self.max_mana();
        true
    }

    /// Executes one modifier of an instant or periodic effect.
    pub(crate) fn execute(&mut self, data: &ModifierExecution) {
        if !self.pre_effect_execute() {
            return;
        }

        let base = self.attribute(data.attribute).base();
        self.set_base_value(data.attribute, data.op.apply(base, data.magnitude));

        self.post_effect_execute(data);
    }

    fn post_effect_execute(&mut self, data: &ModifierExecution) {
        match data.attribute {
            ManaAttribute::ManaDecrease => {
                let value = (self.mana() - self.mana_decrease()).clamp(0.0, self.max_mana());
                self.set_base_value(ManaAttribute::Mana, value);
                self.set_base_value(ManaAttribute::ManaDecrease, 0.0);
            }
            ManaAttribute::ManaRecover => {
                let value = (self.mana() + self.mana_recover()).clamp(0.0, self.max_mana());
                self.set_base_value(ManaAttribute::Mana, value);
                self.set_base_value(ManaAttribute::ManaRecover, 0.0);
            }
            ManaAttribute::Mana => {
                let value = self.mana().clamp(0.0, self.max_mana());
                self.set_base_value(ManaAttribute::Mana, value);
            }
            ManaAttribute::MaxMana => {
                let old = self.max_mana_before_change;
                self.emit(ManaEventKind::MaxManaChanged, data, old, self.max_mana());
            }
        }

        if self.mana() != self.mana_before_change {
            let old = self.mana_before_change;
            self.emit(ManaEventKind::ManaChanged, data, old, self.mana());
        }

        if self.mana() <= 0.0 && !self.out_of_mana {
            let old = self.mana_before_change;
            self.emit(ManaEventKind::OutOfMana, data, old, self.mana());
        }

        // Handlers run after this returns, so the flag reflects the final value.
        self.out_of_mana = self.mana() <= 0.0;
    }

    fn emit(&mut self, kind: ManaEventKind, data: &ModifierExecution, old: f32, new: f32) {
        self.observers.emit(ManaEvent {
            kind,
            instigator: data.instigator,
            causer: data.causer,
            magnitude: data.magnitude,
            old_value: old,
            new_value: new,
        });
    }

    // ========================================================================
    // Replication
    // ========================================================================

    /// Applies an authoritative mana value received on a client.
    ///
    /// Causal context is not replicated: events carry no instigator and the
    /// magnitude is estimated from the difference. The value is clamped to
    /// `[0, max_mana]` like any local write.
    pub fn replicate_mana(&mut self, mut value: f32) {
        self.clamp_attribute(ManaAttribute::Mana, &mut value);
        let old = self.mana();
        self.mana.base = value;
        self.mana.current = value;

        let event = ManaEvent {
            kind: ManaEventKind::ManaChanged,
            instigator: None,
            causer: None,
            magnitude: value - old,
            old_value: old,
            new_value: value,
        };
        self.observers.emit(event);

        if !self.out_of_mana && value <= 0.0 {
            self.observers.emit(ManaEvent {
                kind: ManaEventKind::OutOfMana,
                ..event
            });
        }

        self.out_of_mana = value <= 0.0;
    }

    /// Applies an authoritative max mana value received on a client.
    ///
    /// A maximum below current mana forces mana down without a mana event.
    pub fn replicate_max_mana(&mut self, mut value: f32) {
        self.clamp_attribute(ManaAttribute::MaxMana, &mut value);
        let old = self.max_mana();
        self.max_mana.base = value;
        self.max_mana.current = value;
        self.post_attribute_change(ManaAttribute::MaxMana, old, value);

        self.observers.emit(ManaEvent {
            kind: ManaEventKind::MaxManaChanged,
            instigator: None,
            causer: None,
            magnitude: value - old,
            old_value: old,
            new_value: value,
        });
    }
}

impl Default for ManaSet {
    fn default() -> Self {
        Self::new()
    }
}
