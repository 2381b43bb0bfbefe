use std::cell::RefCell;
use std::rc::Rc;

use ability_content::HeroLoader;
use ability_core::{
    AbilityState, EffectTemplate, GameplayTag, HeroCatalog, ManaAttribute, ModOp, Signal, Vec3,
};
use ability_runtime::{World, WorldError};

const HEROES: &str = r#"#![enable(implicit_some)]
(
    heroes: {
        "warden": (
            max_mana: 50.0,
            mana_decrease: (
                name: "shield_drain",
                duration: Infinite,
                period: 1.0,
                modifiers: [(attribute: ManaDecrease, op: Add, magnitude: 20.0)],
            ),
            mana_cooldown: (
                name: "shield_cooldown",
                duration: HasDuration(3.0),
                granted_tags: [CooldownManaShield],
            ),
        ),
    },
)
"#;

fn catalog() -> HeroCatalog {
    HeroLoader::parse(HEROES).expect("hero catalog parses")
}

fn hud_log(world: &mut World) -> Rc<RefCell<Vec<Signal>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for signal in Signal::ALL {
        let log = Rc::clone(&log);
        world
            .bus_mut()
            .subscribe(signal, move |message| log.borrow_mut().push(message.verb));
    }
    log
}

#[test]
fn depletion_cancels_shield_and_hides_hud_slot() {
    let mut world = World::builder().heroes(catalog()).build();
    let log = hud_log(&mut world);
    let hero = world.spawn_hero("warden", Vec3::ZERO).unwrap();

    assert_eq!(world.activate_shield(hero), Ok(true));
    assert_eq!(world.character(hero).unwrap().mana(), 30.0);

    world.step(1.0).unwrap();
    assert_eq!(world.character(hero).unwrap().mana(), 10.0);

    world.step(1.0).unwrap();

    let character = world.character(hero).unwrap();
    assert_eq!(character.mana(), 0.0);
    assert_eq!(
        character.ability_system().ability_state(character.shield_spec()),
        Some(AbilityState::Inactive)
    );
    assert!(
        character
            .ability_system()
            .host()
            .has_tag(GameplayTag::CooldownManaShield)
    );
    assert_eq!(*log.borrow(), vec![Signal::ShieldShown, Signal::ShieldHidden]);
}

#[test]
fn input_press_lowers_shield_and_cooldown_blocks_reactivation() {
    let mut world = World::builder().heroes(catalog()).build();
    let hero = world.spawn_hero("warden", Vec3::ZERO).unwrap();

    world.activate_shield(hero).unwrap();
    world.press_shield_input(hero).unwrap();

    assert_eq!(world.activate_shield(hero), Ok(false));
    world.step(3.0).unwrap();
    assert_eq!(world.activate_shield(hero), Ok(true));
}

#[test]
fn mana_listeners_see_changes_with_owner() {
    let mut world = World::builder().heroes(catalog()).build();
    let hero = world.spawn_hero("warden", Vec3::ZERO).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    world
        .character_mut(hero)
        .unwrap()
        .mana_component_mut()
        .on_mana_changed
        .add(move |change| sink.borrow_mut().push((change.component, change.new_value)));

    let burst = EffectTemplate::instant("burst").with_modifier(
        ManaAttribute::ManaDecrease,
        ModOp::Add,
        15.0,
    );
    world.apply_effect(hero, &burst).unwrap();

    assert_eq!(*seen.borrow(), vec![(hero, 35.0)]);
}

#[test]
fn lowering_max_mana_pulls_mana_down() {
    let mut world = World::builder().heroes(catalog()).build();
    let hero = world.spawn_hero("warden", Vec3::ZERO).unwrap();
    let maxes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&maxes);
    world
        .character_mut(hero)
        .unwrap()
        .mana_component_mut()
        .on_max_mana_changed
        .add(move |change| sink.borrow_mut().push((change.old_value, change.new_value)));

    let shrink = EffectTemplate::instant("shrink").with_modifier(
        ManaAttribute::MaxMana,
        ModOp::Override,
        20.0,
    );
    world.apply_effect(hero, &shrink).unwrap();

    let character = world.character(hero).unwrap();
    assert_eq!(character.max_mana(), 20.0);
    assert_eq!(character.mana(), 20.0);
    assert_eq!(*maxes.borrow(), vec![(50.0, 20.0)]);
}

#[test]
fn unknown_targets_are_reported() {
    let mut world = World::builder().heroes(catalog()).build();
    let prop = world.spawn_prop(Vec3::ZERO);

    assert_eq!(
        world.spawn_hero("nobody", Vec3::ZERO),
        Err(WorldError::UnknownHero("nobody".into()))
    );
    assert_eq!(world.activate_shield(prop), Err(WorldError::NotACharacter(prop)));
    assert_eq!(
        world.press_shield_input(ability_core::EntityId(99)),
        Err(WorldError::UnknownActor(ability_core::EntityId(99)))
    );
}
