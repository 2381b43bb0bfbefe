//! Mana component: binds an actor to the mana set of its ability system and
//! re-broadcasts attribute changes to UI-facing listeners.

use tracing::{debug, error, trace};

use crate::attributes::{ManaAttribute, ManaEvent, ManaEventKind, ManaNotification, ObserverId};
use crate::character::{ActorRegistry, Character};
use crate::effect::{EffectContext, EffectHandle, EffectTemplate};
use crate::error::{ErrorCategory, GameError};
use crate::hero::HeroConfig;
use crate::messaging::{MessageBus, Multicast};
use crate::state::EntityId;
use crate::system::{AbilitySystem, EffectHost};
use crate::tags::GameplayTag;

/// Payload of the component's change signals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManaChange {
    pub component: EntityId,
    pub old_value: f32,
    pub new_value: f32,
    pub instigator: Option<EntityId>,
}

impl ManaChange {
    fn from_event(component: EntityId, event: &ManaEvent) -> Self {
        Self {
            component,
            old_value: event.old_value,
            new_value: event.new_value,
            instigator: event.instigator,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("mana component of {owner} is already bound to an ability system")]
    AlreadyInitialized { owner: EntityId },

    #[error("mana component of {owner} cannot bind to the ability system of {system}")]
    ForeignAbilitySystem { owner: EntityId, system: EntityId },
}

impl GameError for ComponentError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyInitialized { .. } => ErrorCategory::BindingMisuse,
            Self::ForeignAbilitySystem { .. } => ErrorCategory::InvalidReference,
        }
    }

    fn actor(&self) -> Option<EntityId> {
        match self {
            Self::AlreadyInitialized { owner } | Self::ForeignAbilitySystem { owner, .. } => {
                Some(*owner)
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized { .. } => "COMPONENT_ALREADY_INITIALIZED",
            Self::ForeignAbilitySystem { .. } => "COMPONENT_FOREIGN_SYSTEM",
        }
    }
}

/// Unbound until [`initialize`](ManaComponent::initialize), bound until
/// [`uninitialize`](ManaComponent::uninitialize).
#[derive(Debug)]
pub struct ManaComponent {
    owner: EntityId,
    observer: Option<ObserverId>,
    recover_effect: Option<EffectTemplate>,
    recover_handle: EffectHandle,
    pub on_mana_changed: Multicast<ManaChange>,
    pub on_max_mana_changed: Multicast<ManaChange>,
}

impl ManaComponent {
    const EVENTS: [ManaEventKind; 3] = [
        ManaEventKind::ManaChanged,
        ManaEventKind::MaxManaChanged,
        ManaEventKind::OutOfMana,
    ];

    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            observer: None,
            recover_effect: None,
            recover_handle: EffectHandle::INVALID,
            on_mana_changed: Multicast::new(),
            on_max_mana_changed: Multicast::new(),
        }
    }

    /// Template applied to the owner while the component is bound.
    pub fn with_recover_effect(mut self, template: EffectTemplate) -> Self {
        self.recover_effect = Some(template);
        self
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Component of `actor`, if the actor is a character.
    pub fn find<R>(registry: &R, actor: EntityId) -> Option<&ManaComponent>
    where
        R: ActorRegistry + ?Sized,
    {
        registry.character(actor).map(Character::mana_component)
    }

    pub fn is_bound(&self) -> bool {
        self.observer.is_some()
    }

    /// Binds to `system` and starts the owner with full mana.
    pub fn initialize(&mut self, system: &mut AbilitySystem) -> Result<(), ComponentError> {
        if self.observer.is_some() {
            let err = ComponentError::AlreadyInitialized { owner: self.owner };
            error!(owner = %self.owner, category = %err.category(), "{err}");
            return Err(err);
        }
        if system.owner() != self.owner {
            let err = ComponentError::ForeignAbilitySystem {
                owner: self.owner,
                system: system.owner(),
            };
            error!(owner = %self.owner, category = %err.category(), "{err}");
            return Err(err);
        }

        let host = system.host_mut();
        let observers = host.mana_set_mut().observers_mut();
        let observer = observers.register();
        for kind in Self::EVENTS {
            observers.subscribe(observer, kind);
        }
        self.observer = Some(observer);

        let max_mana = host.mana_set().max_mana();
        host.set_numeric_attribute_base(ManaAttribute::Mana, max_mana);
        Self::clear_gameplay_tags(host);

        let mana = host.mana_set().mana();
        let max_mana = host.mana_set().max_mana();
        self.on_mana_changed.broadcast(&ManaChange {
            component: self.owner,
            old_value: mana,
            new_value: mana,
            instigator: None,
        });
        self.on_max_mana_changed.broadcast(&ManaChange {
            component: self.owner,
            old_value: max_mana,
            new_value: max_mana,
            instigator: None,
        });

        if let Some(template) = &self.recover_effect {
            self.recover_handle =
                host.apply_effect_to_self(Some(template), EffectContext::from_self(self.owner));
        }

        debug!(owner = %self.owner, mana, max_mana, "mana component bound");
        Ok(())
    }

    /// Unbinds from `system`. Calling it on an unbound component does nothing.
    pub fn uninitialize(&mut self, system: &mut AbilitySystem) {
        let Some(observer) = self.observer.take() else {
            trace!(owner = %self.owner, "mana component already unbound");
            return;
        };

        let host = system.host_mut();
        Self::clear_gameplay_tags(host);
        if self.recover_handle.is_valid() {
            host.remove_effect(self.recover_handle, 0);
            self.recover_handle.invalidate();
        }
        let dropped = host.mana_set_mut().observers_mut().unsubscribe_all(observer);
        debug!(owner = %self.owner, dropped, "mana component unbound");
    }

    fn clear_gameplay_tags(host: &mut EffectHost) {
        host.set_loose_tag_count(GameplayTag::AbilityManaShield, 0);
    }

    /// Current mana, or `0.0` when unbound.
    pub fn mana(&self, system: &AbilitySystem) -> f32 {
        if self.is_bound() {
            system.host().mana_set().mana()
        } else {
            0.0
        }
    }

    /// Max mana, or `0.0` when unbound.
    pub fn max_mana(&self, system: &AbilitySystem) -> f32 {
        if self.is_bound() {
            system.host().mana_set().max_mana()
        } else {
            0.0
        }
    }

    /// Mana divided by max mana; `0.0` when unbound or when max is not positive.
    pub fn mana_normalized(&self, system: &AbilitySystem) -> f32 {
        let max_mana = self.max_mana(system);
        if max_mana > 0.0 {
            self.mana(system) / max_mana
        } else {
            0.0
        }
    }

    /// Routes one queued attribute notification.
    ///
    /// Depletion cancels every active ability carrying the shield tag.
    pub fn handle_notification(
        &mut self,
        notification: &ManaNotification,
        system: &mut AbilitySystem,
        hero: Option<&HeroConfig>,
        bus: &mut MessageBus,
    ) {
        if self.observer != Some(notification.observer) {
            trace!(owner = %self.owner, "notification for another observer");
            return;
        }

        let event = &notification.event;
        match event.kind {
            ManaEventKind::ManaChanged => {
                self.on_mana_changed
                    .broadcast(&ManaChange::from_event(self.owner, event));
            }
            ManaEventKind::MaxManaChanged => {
                self.on_max_mana_changed
                    .broadcast(&ManaChange::from_event(self.owner, event));
            }
            ManaEventKind::OutOfMana => {
                let cancelled =
                    system.cancel_abilities(&[GameplayTag::AbilityManaShield], hero, bus);
                debug!(owner = %self.owner, cancelled, "out of mana");
            }
        }
    }
}
