//! Tests for the battle engine, action resolution and the phase state machine.

use std::collections::HashMap;
use std::sync::Arc;

use hecs::{Entity, World};

use medarot_core::catalog::*;
use medarot_core::components::*;
use medarot_core::config::*;
use medarot_core::enums::*;
use medarot_core::error::{BattleError, ChargeRejection};
use medarot_core::events::{BattleEvent, UiEvent};
use medarot_core::result::ActionFailure;
use medarot_core::rng::{Draw, ScriptedRolls};

use crate::battle_log::LogEvent;
use crate::engine::BattleEngine;
use crate::part_info::{gauge_duration_ticks, PartInfo};
use crate::resources::BattleResources;
use crate::systems::{action_queue, charge, game_end, gauge, post_action, status_effects};
use crate::{loader, target_selector, world_setup};

// ---- Fixtures ----

fn part(id: &str, slot: PartSlot) -> PartDefinition {
    PartDefinition {
        id: id.to_string(),
        name: id.to_string(),
        part_type: slot,
        category: PartCategory::None,
        part_trait: PartTrait::None,
        weapon_type: WeaponType::None,
        max_armor: 40,
        power: 0,
        charge: 1.0,
        cooldown: 1.0,
        defense: 0,
        accuracy: 0,
        mobility: 0,
        propulsion: 0,
        stability: 0,
    }
}

fn test_parts() -> Vec<PartDefinition> {
    vec![
        PartDefinition {
            category: PartCategory::Ranged,
            part_trait: PartTrait::Shoot,
            weapon_type: WeaponType::Missile,
            max_armor: 30,
            power: 10,
            accuracy: 40,
            ..part("head_missile", PartSlot::Head)
        },
        PartDefinition {
            category: PartCategory::Ranged,
            part_trait: PartTrait::Shoot,
            weapon_type: WeaponType::Rifle,
            power: 30,
            accuracy: 50,
            ..part("rifle", PartSlot::RightArm)
        },
        PartDefinition {
            category: PartCategory::Melee,
            part_trait: PartTrait::Strike,
            weapon_type: WeaponType::Sword,
            power: 20,
            accuracy: 40,
            ..part("sword", PartSlot::LeftArm)
        },
        PartDefinition {
            category: PartCategory::Support,
            part_trait: PartTrait::Support,
            weapon_type: WeaponType::Device,
            power: 50,
            ..part("booster", PartSlot::LeftArm)
        },
        PartDefinition {
            max_armor: 50,
            defense: 10,
            mobility: 5,
            propulsion: 20,
            ..part("legs_slow", PartSlot::Legs)
        },
        PartDefinition {
            max_armor: 50,
            defense: 10,
            mobility: 5,
            propulsion: 30,
            ..part("legs_fast", PartSlot::Legs)
        },
    ]
}

fn test_catalog() -> Catalog {
    let medals = vec![
        MedalDefinition {
            id: "kabuto".into(),
            name: "Kabuto".into(),
            personality: "Leader".into(),
            skill_level: 0,
        },
        MedalDefinition {
            id: "mystery".into(),
            name: "Mystery".into(),
            personality: "NoSuchPersonality".into(),
            skill_level: 0,
        },
    ];
    Catalog::new(test_parts(), medals, HashMap::new()).unwrap()
}

/// Settings used by the literal-draw scenarios.
fn test_config() -> GameConfig {
    GameConfig {
        hit: ChanceSettings {
            base_chance: 70.0,
            min_chance: 10.0,
            max_chance: 95.0,
        },
        defense: ChanceSettings {
            base_chance: 50.0,
            min_chance: 15.0,
            max_chance: 95.0,
        },
        damage: DamageSettings {
            damage_adjustment_factor: 5.0,
            random_variance: 0.1,
            medal_skill_factor: 0.0,
            critical: CriticalSettings {
                base_chance: 5.0,
                success_rate_factor: 0.0,
                min_chance: 0.0,
                max_chance: 100.0,
            },
        },
        ..GameConfig::default()
    }
}

struct Member {
    id: &'static str,
    team: Team,
    leader: bool,
    draw: u8,
    left: &'static str,
    legs: &'static str,
    player: bool,
}

fn member(id: &'static str, team: Team, leader: bool, draw: u8) -> Member {
    Member {
        id,
        team,
        leader,
        draw,
        left: "sword",
        legs: "legs_slow",
        player: false,
    }
}

fn loadout(m: &Member) -> Loadout {
    Loadout {
        id: m.id.to_string(),
        name: m.id.to_uppercase(),
        team: m.team,
        is_leader: m.leader,
        draw_index: m.draw,
        medal_id: "kabuto".into(),
        head_id: "head_missile".into(),
        right_arm_id: "rifle".into(),
        left_arm_id: m.left.to_string(),
        legs_id: m.legs.to_string(),
        player_controlled: m.player,
    }
}

fn duel_loadouts() -> Vec<Loadout> {
    vec![
        loadout(&member("a", Team::One, true, 0)),
        loadout(&member("b", Team::Two, true, 0)),
    ]
}

fn three_on_three() -> Vec<Loadout> {
    vec![
        loadout(&member("a1", Team::One, true, 0)),
        loadout(&member("a2", Team::One, false, 1)),
        loadout(&member("a3", Team::One, false, 2)),
        loadout(&member("b1", Team::Two, true, 0)),
        loadout(&member("b2", Team::Two, false, 1)),
        loadout(&member("b3", Team::Two, false, 2)),
    ]
}

fn spawn(catalog: &Catalog, loadouts: &[Loadout]) -> (World, Vec<Entity>) {
    let mut world = World::new();
    let entities = world_setup::initialize_battle_world(&mut world, catalog, loadouts).unwrap();
    (world, entities)
}

fn set_state(world: &mut World, entity: Entity, kind: StateKind, total: u32) {
    let (state, gauge) = world
        .query_one_mut::<(&mut ActionState, &mut Gauge)>(entity)
        .unwrap();
    state.kind = kind;
    gauge.restart(total);
}

/// Charge `actor` against `target` and move it straight to the ready queue.
fn make_ready(
    world: &mut World,
    catalog: &Catalog,
    config: &GameConfig,
    res: &mut BattleResources,
    actor: Entity,
    slot: PartSlot,
    target: Option<(Entity, Option<PartSlot>)>,
) {
    charge::start_charge(world, catalog, config, actor, slot, target).unwrap();
    world.get::<&mut ActionState>(actor).unwrap().kind = StateKind::Ready;
    res.ready_queue.push(actor);
}

fn armor(world: &World, entity: Entity, slot: PartSlot) -> i32 {
    world.get::<&Parts>(entity).unwrap().get(slot).current_armor
}

fn state(world: &World, entity: Entity) -> StateKind {
    world.get::<&ActionState>(entity).unwrap().kind
}

// ---- Attack resolution scenarios ----

#[test]
fn test_clean_hit_without_defense() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, Some(PartSlot::RightArm))));

    let mut rolls = ScriptedRolls::new([
        Draw::Percent(30.0),
        Draw::Percent(99.0),
        Draw::Variance(0.0),
        Draw::Percent(99.0),
    ]);
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();

    assert!(result.action_did_hit);
    assert!(!result.is_critical);
    assert!(!result.is_defended);
    assert_eq!(result.original_damage, 39);
    assert_eq!(result.damage_to_apply, 39);
    assert_eq!(result.damage_dealt, 39);
    assert_eq!(result.actual_hit_slot, Some(PartSlot::RightArm));
    assert_eq!(result.target_part_id.as_deref(), Some("rifle"));
    assert_eq!(rolls.remaining(), 0);
    assert_eq!(rolls.mismatches(), 0);
    assert!(res.ready_queue.is_empty());

    res.last_result.set(result);
    let lines = post_action::apply_action_result(&mut world, &catalog, &config, &mut res).unwrap();
    assert!(!lines.is_empty());
    assert_eq!(armor(&world, b, PartSlot::RightArm), 1);
    assert_eq!(state(&world, a), StateKind::Cooldown);
    assert_eq!(world.get::<&TargetHistory>(b).unwrap().last_attacker, Some(a));
    assert_eq!(
        world.get::<&LastActionHistory>(a).unwrap().last_hit_slot,
        Some(PartSlot::RightArm)
    );
}

#[test]
fn test_miss_still_starts_cooldown() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, Some(PartSlot::RightArm))));

    let mut rolls = ScriptedRolls::new([Draw::Percent(96.0)]);
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    assert!(!result.action_did_hit);
    assert_eq!(result.damage_to_apply, 0);

    res.last_result.set(result);
    post_action::apply_action_result(&mut world, &catalog, &config, &mut res).unwrap();
    assert_eq!(armor(&world, b, PartSlot::RightArm), 40);
    assert_eq!(state(&world, a), StateKind::Cooldown);
    assert_eq!(world.get::<&TargetHistory>(b).unwrap().last_attacker, None);
}

#[test]
fn test_defended_hit_redirects_to_legs() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, Some(PartSlot::RightArm))));

    let mut rolls = ScriptedRolls::new([
        Draw::Percent(30.0),
        Draw::Percent(99.0),
        Draw::Variance(0.0),
        Draw::Percent(10.0),
    ]);
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    assert!(result.is_defended);
    assert_eq!(result.original_damage, 39);
    assert_eq!(result.damage_to_apply, 29);
    assert_eq!(result.intended_slot, Some(PartSlot::RightArm));
    assert_eq!(result.actual_hit_slot, Some(PartSlot::Legs));

    res.last_result.set(result);
    post_action::apply_action_result(&mut world, &catalog, &config, &mut res).unwrap();
    assert_eq!(armor(&world, b, PartSlot::Legs), 21);
    assert_eq!(armor(&world, b, PartSlot::RightArm), 40);
}

#[test]
fn test_critical_ignores_evasion_for_damage_only() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, Some(PartSlot::RightArm))));

    let mut rolls = ScriptedRolls::new([
        Draw::Percent(30.0),
        Draw::Percent(1.0),
        Draw::Variance(0.0),
        Draw::Percent(99.0),
    ]);
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    assert!(result.is_critical);
    assert_eq!(result.damage_to_apply, 40);
}

#[test]
fn test_applying_result_twice_is_a_no_op() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, Some(PartSlot::Legs))));

    let mut rolls = ScriptedRolls::new([
        Draw::Percent(30.0),
        Draw::Percent(99.0),
        Draw::Variance(0.0),
        Draw::Percent(99.0),
    ]);
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    res.last_result.set(result);

    assert!(post_action::apply_action_result(&mut world, &catalog, &config, &mut res).is_some());
    let after_first = armor(&world, b, PartSlot::Legs);
    assert!(res.last_result.consumed);
    assert!(post_action::apply_action_result(&mut world, &catalog, &config, &mut res).is_none());
    assert_eq!(armor(&world, b, PartSlot::Legs), after_first);
}

#[test]
fn test_preselected_target_broken_fails_without_damage() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, Some(PartSlot::RightArm))));
    world.get::<&mut ActionState>(b).unwrap().kind = StateKind::Broken;

    let mut rolls = ScriptedRolls::default();
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    assert_eq!(result.failure, Some(ActionFailure::NoValidTarget));
    assert!(!result.action_did_hit);
    assert_eq!(rolls.mismatches(), 0);

    res.last_result.set(result);
    post_action::apply_action_result(&mut world, &catalog, &config, &mut res).unwrap();
    assert_eq!(state(&world, a), StateKind::Cooldown);
}

#[test]
fn test_broken_acting_part_drops_action() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, None)));
    world.get::<&mut Parts>(a).unwrap().right_arm.apply_damage(1000);

    let mut rolls = ScriptedRolls::default();
    assert!(action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).is_none());
    assert_eq!(state(&world, a), StateKind::Idle);
    assert_eq!(world.get::<&ActionIntent>(a).unwrap().slot, None);
}

#[test]
fn test_melee_targets_closest_enemy() {
    let catalog = test_catalog();
    let config = test_config();
    let loadouts = vec![
        loadout(&member("a", Team::One, true, 0)),
        loadout(&member("b1", Team::Two, true, 0)),
        loadout(&member("b2", Team::Two, false, 1)),
    ];
    let (mut world, e) = spawn(&catalog, &loadouts);
    let (a, b1, b2) = (e[0], e[1], e[2]);
    // b2 is halfway through its charge, so it is closer to the centre line.
    set_state(&mut world, b2, StateKind::Charging, 10);
    world.get::<&mut Gauge>(b2).unwrap().progress = 5;

    let info = PartInfo::new(&world, &catalog, &config);
    assert_eq!(target_selector::closest_enemy(&world, &info, a), Some(b2));
    assert_eq!(target_selector::candidate_enemies(&world, a), vec![b1, b2]);

    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::LeftArm, Some((b1, None)));
    let target = *world.get::<&Target>(a).unwrap();
    assert_eq!(target.policy, TargetPolicy::ClosestAtExecution);
    assert_eq!(target.entity, None);

    // A miss still names the part it was aimed at; that draw follows the hit roll.
    let mut rolls = ScriptedRolls::new([Draw::Percent(99.0), Draw::Pick(1)]);
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    assert_eq!(result.target, Some(b2));
    assert!(!result.action_did_hit);
    // Intact non-head parts are right arm, left arm, legs.
    assert_eq!(result.intended_slot, Some(PartSlot::LeftArm));
    assert_eq!(rolls.remaining(), 0);
    assert_eq!(rolls.mismatches(), 0);
}

#[test]
fn test_damaged_part_drawn_after_defense_roll() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a, PartSlot::RightArm, Some((b, None)));

    let mut rolls = ScriptedRolls::new([
        Draw::Percent(30.0),
        Draw::Percent(99.0),
        Draw::Variance(0.0),
        Draw::Percent(99.0),
        Draw::Pick(1),
    ]);
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();

    assert!(result.action_did_hit);
    assert!(!result.is_defended);
    assert_eq!(result.intended_slot, Some(PartSlot::LeftArm));
    assert_eq!(result.actual_hit_slot, Some(PartSlot::LeftArm));
    assert_eq!(result.damage_dealt, 39);
    assert_eq!(result.target_part_id.as_deref(), Some("sword"));
    assert_eq!(rolls.remaining(), 0);
    assert_eq!(rolls.mismatches(), 0);
}

#[test]
fn test_defense_part_priority() {
    let catalog = test_catalog();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let b = e[1];
    assert_eq!(target_selector::defense_part(&world, b), Some(PartSlot::Legs));
    world.get::<&mut Parts>(b).unwrap().legs.apply_damage(1000);
    assert_eq!(target_selector::defense_part(&world, b), Some(PartSlot::RightArm));
    world.get::<&mut Parts>(b).unwrap().right_arm.apply_damage(1000);
    assert_eq!(target_selector::defense_part(&world, b), Some(PartSlot::LeftArm));
    world.get::<&mut Parts>(b).unwrap().left_arm.apply_damage(1000);
    assert_eq!(target_selector::defense_part(&world, b), Some(PartSlot::Head));
}

// ---- Support buffs ----

#[test]
fn test_support_buff_lifecycle() {
    let catalog = test_catalog();
    let config = test_config();
    let mut supporter = member("a1", Team::One, true, 0);
    supporter.left = "booster";
    let loadouts = vec![
        loadout(&supporter),
        loadout(&member("a2", Team::One, false, 1)),
        loadout(&member("b", Team::Two, true, 0)),
    ];
    let (mut world, e) = spawn(&catalog, &loadouts);
    let (a1, a2) = (e[0], e[1]);
    let formula = ActionFormula::default();
    let mut res = BattleResources::default();
    make_ready(&mut world, &catalog, &config, &mut res, a1, PartSlot::LeftArm, None);

    let mut rolls = ScriptedRolls::default();
    let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    assert!(result.action_did_hit);
    assert!((res.team_buffs.multiplier(Team::One, BuffType::Accuracy) - 1.5).abs() < 1e-9);

    let boosted = PartInfo::new(&world, &catalog, &config)
        .with_buffs(&res.team_buffs)
        .success_rate(a2, PartSlot::RightArm, &formula);
    assert!((boosted - 75.0).abs() < 1e-9);

    // Using the same part again replaces its entry instead of stacking.
    res.last_result.set(result);
    post_action::apply_action_result(&mut world, &catalog, &config, &mut res).unwrap();
    set_state(&mut world, a1, StateKind::Idle, 1);
    make_ready(&mut world, &catalog, &config, &mut res, a1, PartSlot::LeftArm, None);
    action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
    assert_eq!(res.team_buffs.sources(Team::One, BuffType::Accuracy).len(), 1);

    post_action::apply_part_damage(&mut world, &mut res, a1, PartSlot::LeftArm, 1000).unwrap();
    assert!(res.team_buffs.sources(Team::One, BuffType::Accuracy).is_empty());
    let plain = PartInfo::new(&world, &catalog, &config)
        .with_buffs(&res.team_buffs)
        .success_rate(a2, PartSlot::RightArm, &formula);
    assert!((plain - 50.0).abs() < 1e-9);
    assert_eq!(res.team_buffs.remove_from_source(a1, PartSlot::LeftArm), 0);
}

// ---- Breaking and game end ----

#[test]
fn test_head_break_breaks_combatant_and_is_sticky() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let mut res = BattleResources::default();
    res.tick = 12;
    res.ready_queue.push(b);

    let outcome = post_action::apply_part_damage(&mut world, &mut res, b, PartSlot::Head, 30).unwrap();
    assert!(outcome.part_broken);
    assert!(outcome.combatant_broken);
    assert_eq!(armor(&world, b, PartSlot::Head), 0);
    assert!(res.ready_queue.is_empty());
    assert_eq!(world.get::<&ActionState>(b).unwrap().broken_at_tick, Some(12));
    assert!(res
        .events
        .drain()
        .iter()
        .any(|ev| matches!(ev, BattleEvent::PartBroken { slot: PartSlot::Head, .. })));

    for _ in 0..200 {
        gauge::run(&mut world, &mut res.ready_queue);
    }
    assert_eq!(state(&world, b), StateKind::Broken);
    assert_eq!(
        charge::start_charge(&mut world, &catalog, &config, b, PartSlot::RightArm, Some((a, None))),
        Err(ChargeRejection::NotIdle)
    );
    assert_eq!(game_end::check(&world), Some(BattleOutcome::Winner(Team::One)));
}

#[test]
fn test_all_parts_broken_breaks_combatant() {
    let catalog = test_catalog();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let b = e[1];
    let mut res = BattleResources::default();
    for slot in [PartSlot::RightArm, PartSlot::LeftArm] {
        let outcome = post_action::apply_part_damage(&mut world, &mut res, b, slot, 100).unwrap();
        assert!(!outcome.combatant_broken);
    }
    let outcome = post_action::apply_part_damage(&mut world, &mut res, b, PartSlot::Legs, 100).unwrap();
    assert!(!outcome.combatant_broken);
    assert_eq!(state(&world, b), StateKind::Idle);
    let outcome = post_action::apply_part_damage(&mut world, &mut res, b, PartSlot::Head, 5).unwrap();
    assert!(!outcome.part_broken);
}

#[test]
fn test_simultaneous_defeat_earlier_leader_loses() {
    let catalog = test_catalog();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    let break_at = |world: &mut World, entity: Entity, tick: u64| {
        let mut action = world.get::<&mut ActionState>(entity).unwrap();
        action.kind = StateKind::Broken;
        action.broken_at_tick = Some(tick);
    };
    assert_eq!(game_end::check(&world), None);
    break_at(&mut world, a, 5);
    break_at(&mut world, b, 7);
    assert_eq!(game_end::check(&world), Some(BattleOutcome::Winner(Team::Two)));
    break_at(&mut world, b, 5);
    assert_eq!(game_end::check(&world), Some(BattleOutcome::Draw));
}

#[test]
fn test_leader_kill_ends_battle() {
    let catalog = Arc::new(test_catalog());
    let loadouts = vec![
        loadout(&member("a1", Team::One, true, 0)),
        loadout(&member("a2", Team::One, false, 1)),
        loadout(&member("b1", Team::Two, true, 0)),
        loadout(&member("b2", Team::Two, false, 1)),
    ];
    let rolls = ScriptedRolls::new([
        Draw::Percent(30.0),
        Draw::Percent(99.0),
        Draw::Variance(0.0),
        Draw::Percent(99.0),
    ]);
    let mut engine = BattleEngine::with_rng(
        catalog,
        test_config(),
        BattleConfig::default(),
        &loadouts,
        Box::new(rolls),
    )
    .unwrap();
    let a1 = engine.find("a1").unwrap();
    let a2 = engine.find("a2").unwrap();
    let b1 = engine.find("b1").unwrap();
    let b2 = engine.find("b2").unwrap();

    for entity in [a2, b1, b2] {
        set_state(engine.world_mut(), entity, StateKind::Charging, 10_000);
    }
    engine.world_mut().get::<&mut Parts>(b1).unwrap().head.current_armor = 5;
    engine
        .start_charge(a1, PartSlot::RightArm, Some((b1, Some(PartSlot::Head))))
        .unwrap();
    engine.world_mut().get::<&mut ActionState>(a1).unwrap().kind = StateKind::Ready;
    engine.resources_mut().ready_queue.push(a1);

    let mut events = Vec::new();
    for _ in 0..10 {
        engine.tick();
        events.extend(engine.drain_events());
        if engine.phase() == BattlePhase::GameOver {
            break;
        }
    }

    assert_eq!(engine.outcome(), Some(BattleOutcome::Winner(Team::One)));
    assert_eq!(state(engine.world(), b1), StateKind::Broken);
    let game_overs = events
        .iter()
        .filter(|ev| matches!(ev, BattleEvent::GameOver(_)))
        .count();
    assert_eq!(game_overs, 1);
    assert!(events
        .iter()
        .any(|ev| matches!(ev, BattleEvent::ActionAnimationStarted(r) if r.actor == a1)));

    // Game over waits for the player, then asks to leave.
    engine.tick();
    assert_eq!(engine.phase(), BattlePhase::GameOver);
    assert!(!engine.exit_requested());
    engine.send(UiEvent::GoToTitle);
    engine.tick();
    assert!(engine.exit_requested());
    assert!(engine
        .drain_events()
        .iter()
        .any(|ev| matches!(ev, BattleEvent::ExitRequested)));
}

// ---- Ordering and timing ----

#[test]
fn test_ready_queue_drains_by_propulsion() {
    let catalog = test_catalog();
    let config = test_config();
    let mut x = member("x", Team::One, true, 0);
    x.legs = "legs_fast";
    let y = member("y", Team::One, false, 1);
    let mut z = member("z", Team::One, false, 2);
    z.legs = "legs_fast";
    let loadouts = vec![
        loadout(&x),
        loadout(&y),
        loadout(&z),
        loadout(&member("w", Team::Two, true, 0)),
    ];
    let (mut world, e) = spawn(&catalog, &loadouts);
    let (x, y, z, w) = (e[0], e[1], e[2], e[3]);
    let mut res = BattleResources::default();
    for actor in [x, y, z] {
        make_ready(&mut world, &catalog, &config, &mut res, actor, PartSlot::RightArm, Some((w, Some(PartSlot::RightArm))));
    }

    assert_eq!(
        action_queue::execution_order(&world, &catalog, &config, &res.ready_queue),
        vec![x, z, y]
    );
    let mut rolls = ScriptedRolls::default();
    let mut order = Vec::new();
    for _ in 0..3 {
        let result = action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).unwrap();
        order.push(result.actor);
    }
    assert_eq!(order, vec![x, z, y]);
    assert!(action_queue::execute_next(&mut world, &catalog, &config, &mut res, &mut rolls).is_none());
}

#[test]
fn test_gauge_duration_scaling() {
    let time = TimeSettings::default();
    assert_eq!(gauge_duration_ticks(1.0, 50.0, &time), 60);
    assert_eq!(gauge_duration_ticks(1.0, 5.0, &time), 110);
    assert_eq!(gauge_duration_ticks(0.0, 50.0, &time), 1);
    assert_eq!(gauge_duration_ticks(1.0, -1000.0, &time), 600);
}

#[test]
fn test_charge_completes_and_cooldown_returns_to_idle() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    charge::start_charge(&mut world, &catalog, &config, a, PartSlot::RightArm, Some((b, None))).unwrap();
    let total = world.get::<&Gauge>(a).unwrap().total_duration;
    assert_eq!(total, 110);

    let mut ready = Vec::new();
    for _ in 0..total - 1 {
        gauge::run(&mut world, &mut ready);
    }
    assert_eq!(state(&world, a), StateKind::Charging);
    gauge::run(&mut world, &mut ready);
    assert_eq!(state(&world, a), StateKind::Ready);
    assert_eq!(ready, vec![a]);
    assert_eq!(world.get::<&Gauge>(a).unwrap().current, 100.0);

    charge::start_cooldown(&mut world, &catalog, &config, a);
    assert_eq!(state(&world, a), StateKind::Cooldown);
    let cooldown = world.get::<&Gauge>(a).unwrap().total_duration;
    for _ in 0..cooldown {
        gauge::run(&mut world, &mut ready);
    }
    assert_eq!(state(&world, a), StateKind::Idle);
    assert_eq!(world.get::<&ActionIntent>(a).unwrap().slot, None);
    assert_eq!(world.get::<&Target>(a).unwrap().entity, None);
}

#[test]
fn test_charge_rejections_leave_state_untouched() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let (a, b) = (e[0], e[1]);
    assert_eq!(
        charge::start_charge(&mut world, &catalog, &config, a, PartSlot::Legs, None),
        Err(ChargeRejection::NoActionCategory)
    );
    world.get::<&mut Parts>(a).unwrap().right_arm.apply_damage(1000);
    assert_eq!(
        charge::start_charge(&mut world, &catalog, &config, a, PartSlot::RightArm, Some((b, None))),
        Err(ChargeRejection::SlotBroken)
    );
    assert_eq!(state(&world, a), StateKind::Idle);
    assert_eq!(world.get::<&ActionIntent>(a).unwrap().slot, None);
}

// ---- Status effects ----

#[test]
fn test_damage_over_time_ticks_and_expires() {
    let catalog = test_catalog();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let b = e[1];
    world.get::<&mut ActiveEffects>(b).unwrap().effects = vec![
        ActiveEffect {
            payload: EffectPayload::DamageOverTime { damage: 0 },
            remaining_ticks: 2,
        },
        ActiveEffect {
            payload: EffectPayload::EvasionDebuff { multiplier: 0.5 },
            remaining_ticks: 1,
        },
    ];

    let mut res = BattleResources::default();
    assert_eq!(status_effects::run(&mut world, &mut res), 1);
    assert_eq!(armor(&world, b, PartSlot::RightArm), 39);
    assert_eq!(world.get::<&ActiveEffects>(b).unwrap().effects.len(), 1);

    assert_eq!(status_effects::run(&mut world, &mut res), 1);
    assert!(world.get::<&ActiveEffects>(b).unwrap().effects.is_empty());
    assert_eq!(status_effects::run(&mut world, &mut res), 0);
    assert_eq!(armor(&world, b, PartSlot::RightArm), 38);
}

fn damage_entries(res: &BattleResources) -> Vec<(PartSlot, i32)> {
    res.log
        .entries()
        .iter()
        .filter_map(|entry| match entry.event {
            LogEvent::Damage { slot, amount, .. } => Some((slot, amount)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_stacked_damage_over_time_moves_to_next_part() {
    let catalog = test_catalog();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let b = e[1];
    let heavy = ActiveEffect {
        payload: EffectPayload::DamageOverTime { damage: 40 },
        remaining_ticks: 3,
    };
    world.get::<&mut ActiveEffects>(b).unwrap().effects = vec![heavy, heavy];

    let mut res = BattleResources::default();
    assert_eq!(status_effects::run(&mut world, &mut res), 2);
    assert_eq!(armor(&world, b, PartSlot::RightArm), 0);
    assert_eq!(armor(&world, b, PartSlot::LeftArm), 0);
    assert_eq!(armor(&world, b, PartSlot::Legs), 50);
    assert_eq!(armor(&world, b, PartSlot::Head), 30);
    assert_eq!(
        damage_entries(&res),
        vec![(PartSlot::RightArm, 40), (PartSlot::LeftArm, 40)]
    );
    assert_eq!(state(&world, b), StateKind::Idle);
}

#[test]
fn test_damage_to_broken_part_is_not_logged() {
    let catalog = test_catalog();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let b = e[1];
    let mut res = BattleResources::default();

    let first = post_action::apply_part_damage(&mut world, &mut res, b, PartSlot::LeftArm, 25).unwrap();
    assert_eq!(first.remaining_armor, 15);
    let second = post_action::apply_part_damage(&mut world, &mut res, b, PartSlot::LeftArm, 99).unwrap();
    assert!(second.part_broken);
    post_action::apply_part_damage(&mut world, &mut res, b, PartSlot::LeftArm, 10).unwrap();

    assert_eq!(
        damage_entries(&res),
        vec![(PartSlot::LeftArm, 25), (PartSlot::LeftArm, 15)]
    );
}

#[test]
fn test_evasion_debuff_lowers_evasion() {
    let catalog = test_catalog();
    let config = test_config();
    let (mut world, e) = spawn(&catalog, &duel_loadouts());
    let b = e[1];
    let before = PartInfo::new(&world, &catalog, &config).evasion_rate(b);
    world.get::<&mut ActiveEffects>(b).unwrap().effects.push(ActiveEffect {
        payload: EffectPayload::EvasionDebuff { multiplier: 0.5 },
        remaining_ticks: 10,
    });
    let after = PartInfo::new(&world, &catalog, &config).evasion_rate(b);
    assert!((before - 5.0).abs() < 1e-9);
    assert!((after - 2.5).abs() < 1e-9);
}

// ---- Setup and loading ----

#[test]
fn test_loadout_validation() {
    let catalog = test_catalog();
    let mut world = World::new();

    let mut two_leaders = duel_loadouts();
    two_leaders.push(loadout(&member("c", Team::One, true, 1)));
    assert!(matches!(
        world_setup::initialize_battle_world(&mut world, &catalog, &two_leaders),
        Err(BattleError::InvalidLoadout(_))
    ));

    let mut crowded = three_on_three();
    crowded.push(loadout(&member("a4", Team::One, false, 3)));
    assert!(matches!(
        world_setup::initialize_battle_world(&mut world, &catalog, &crowded),
        Err(BattleError::InvalidLoadout(_))
    ));

    let mut missing = duel_loadouts();
    missing[0].legs_id = "nope".into();
    assert!(matches!(
        world_setup::initialize_battle_world(&mut world, &catalog, &missing),
        Err(BattleError::CatalogMissingDefinition { kind: "part", .. })
    ));

    let mut same_draw = duel_loadouts();
    same_draw.push(loadout(&member("c", Team::One, false, 0)));
    assert!(matches!(
        world_setup::initialize_battle_world(&mut world, &catalog, &same_draw),
        Err(BattleError::InvalidLoadout(_))
    ));

    assert_eq!(world.len(), 0);
}

#[test]
fn test_loader_skips_malformed_rows_and_rejects_duplicates() {
    let json = r#"[
        {"id": "p1", "part_name": "Rifle", "type": "right_arm", "category": "ranged",
         "trait": "shoot", "max_armor": 30, "power": 20},
        {"id": "broken-row", "part_name": "Oops"},
        {"id": "p2", "part_name": "Legs", "type": "legs", "max_armor": 40}
    ]"#;
    let parts = loader::parse_parts(json).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].part_trait, PartTrait::Shoot);

    let duplicated = r#"[
        {"id": "m", "name": "A", "personality": "Joker"},
        {"id": "m", "name": "B", "personality": "Joker"}
    ]"#;
    assert!(matches!(
        loader::parse_medals(duplicated),
        Err(BattleError::DuplicateDefinition { kind: "medal", .. })
    ));

    assert!(matches!(loader::parse_parts("{"), Err(BattleError::Parse { .. })));

    let formulas = loader::parse_formulas(
        r#"{"aim": {"success_rate_bonuses": [{"source": "stability", "multiplier": 1.0}]}}"#,
    )
    .unwrap();
    assert_eq!(formulas[&PartTrait::Aim].success_rate_bonuses.len(), 1);
}

#[test]
fn test_demo_data_loads_and_runs() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let catalog = Arc::new(loader::load_catalog(&root).unwrap());
    let loadouts = loader::load_loadouts(&root.join(loader::LOADOUTS_FILE)).unwrap();
    let config = loader::load_config(&root.join(loader::SETTINGS_FILE)).unwrap();
    let mut engine = BattleEngine::new(catalog, config, BattleConfig::default(), &loadouts).unwrap();
    assert!(engine.run_to_completion(200_000).is_some());
}

// ---- Engine flow ----

#[test]
fn test_player_modal_flow() {
    let catalog = Arc::new(test_catalog());
    let mut loadouts = three_on_three();
    loadouts[0].player_controlled = true;
    let mut engine = BattleEngine::new(catalog, test_config(), BattleConfig::default(), &loadouts).unwrap();
    let player = engine.find("a1").unwrap();

    engine.tick();
    assert_eq!(engine.phase(), BattlePhase::PlayerActionSelect);
    assert!(engine
        .drain_events()
        .contains(&BattleEvent::PlayerActionRequired { actor: player }));

    engine.tick();
    let events = engine.drain_events();
    let modal = events
        .iter()
        .find_map(|ev| match ev {
            BattleEvent::ShowActionModal(view) => Some(view.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(modal.actor, player);
    let slots: Vec<PartSlot> = modal.options.iter().map(|o| o.slot).collect();
    assert_eq!(slots, vec![PartSlot::Head, PartSlot::RightArm, PartSlot::LeftArm]);
    let rifle = &modal.options[1];
    assert!(rifle.default_target.is_some());
    assert_eq!(modal.options[2].default_target, None);

    // Cancel re-shows the modal.
    engine.send(UiEvent::PlayerActionIntent {
        actor: player,
        slot: PartSlot::RightArm,
        target: None,
        target_slot: None,
    });
    engine.send(UiEvent::ActionCanceled);
    engine.tick();
    assert!(engine
        .drain_events()
        .iter()
        .any(|ev| matches!(ev, BattleEvent::ShowActionModal(_))));
    assert_eq!(state(engine.world(), player), StateKind::Idle);

    engine.send(UiEvent::PlayerActionIntent {
        actor: player,
        slot: PartSlot::RightArm,
        target: None,
        target_slot: None,
    });
    engine.send(UiEvent::ActionConfirmed);
    engine.tick();
    assert!(engine.drain_events().contains(&BattleEvent::HideActionModal));
    assert_eq!(state(engine.world(), player), StateKind::Charging);
    assert_eq!(engine.phase(), BattlePhase::GaugeProgress);
    let target = *engine.world().get::<&Target>(player).unwrap();
    assert_eq!(target.policy, TargetPolicy::Preselected);
    assert!(target.entity.is_some());
}

#[test]
fn test_unknown_personality_falls_back_and_warns_once() {
    let catalog = Arc::new(test_catalog());
    let mut loadouts = duel_loadouts();
    loadouts[1].medal_id = "mystery".into();
    let mut engine = BattleEngine::new(catalog, test_config(), BattleConfig::default(), &loadouts).unwrap();
    let b = engine.find("b").unwrap();

    engine.tick();
    assert_eq!(state(engine.world(), b), StateKind::Charging);
    assert!(engine.warned_personality.contains(&b));
    for _ in 0..2000 {
        engine.tick();
    }
    assert_eq!(engine.warned_personality.len(), 1);
}

#[test]
fn test_determinism_same_seed() {
    let catalog = Arc::new(test_catalog());
    let battle = BattleConfig {
        seed: 12345,
        headless: true,
    };
    let mut engine_a = BattleEngine::new(catalog.clone(), test_config(), battle, &three_on_three()).unwrap();
    let mut engine_b = BattleEngine::new(catalog, test_config(), battle, &three_on_three()).unwrap();

    for _ in 0..3000 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
    assert!(!engine_a.log().results().is_empty());
    assert_eq!(engine_a.log().results(), engine_b.log().results());
}

#[test]
fn test_battle_runs_to_completion() {
    let catalog = Arc::new(test_catalog());
    let mut engine = BattleEngine::new(catalog, GameConfig::default(), BattleConfig::default(), &three_on_three()).unwrap();
    let outcome = engine.run_to_completion(200_000);
    assert!(outcome.is_some());
    assert_eq!(engine.phase(), BattlePhase::GameOver);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.outcome, outcome);
    assert!(engine
        .log()
        .entries()
        .iter()
        .any(|entry| matches!(entry.event, LogEvent::GameOver { .. })));
}

// ---- Invariants ----

mod invariants {
    use super::*;
    use proptest::prelude::*;

    use crate::calculators;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn battle_invariants_hold_for_any_seed(seed in any::<u64>()) {
            let catalog = Arc::new(test_catalog());
            let battle = BattleConfig { seed, headless: true };
            let mut engine = BattleEngine::new(catalog, GameConfig::default(), battle, &three_on_three()).unwrap();
            let mut broken: Vec<String> = Vec::new();

            for _ in 0..1500 {
                let snapshot = engine.tick();
                engine.drain_events();
                for combatant in &snapshot.combatants {
                    for part in &combatant.parts {
                        prop_assert!(part.current_armor >= 0 && part.current_armor <= part.max_armor);
                        prop_assert_eq!(part.is_broken, part.current_armor == 0);
                    }
                    if broken.contains(&combatant.id) {
                        prop_assert_eq!(combatant.state, StateKind::Broken);
                    } else if combatant.state == StateKind::Broken {
                        broken.push(combatant.id.clone());
                    }
                }
                for (_, _, sources) in engine.team_buffs().entries() {
                    for source in sources {
                        let parts = engine.world().get::<&Parts>(source.source).unwrap();
                        prop_assert!(!parts.is_broken(source.slot));
                    }
                }
                if engine.phase() == BattlePhase::GameOver {
                    break;
                }
            }
        }

        #[test]
        fn hit_chance_stays_in_bounds(success in -500.0f64..500.0, evasion in -500.0f64..500.0) {
            let config = GameConfig::default();
            let chance = calculators::hit_chance(&config, success, evasion);
            prop_assert!(chance >= config.hit.min_chance && chance <= config.hit.max_chance);
        }

        #[test]
        fn damage_is_at_least_one(
            success in -500.0f64..500.0,
            evasion in -500.0f64..500.0,
            power in -100.0f64..300.0,
            variance in -1.0f64..1.0,
        ) {
            let settings = DamageSettings::default();
            let input = calculators::DamageInput {
                success_rate: success,
                evasion_rate: evasion,
                power,
                medal_skill: 0,
                jitter: calculators::jitter(&settings, variance),
            };
            prop_assert!(calculators::damage(&settings, input) >= 1);
        }

        #[test]
        fn gauge_duration_is_at_least_one_tick(base in 0.0f64..30.0, stat in -200.0f64..400.0) {
            prop_assert!(gauge_duration_ticks(base, stat, &TimeSettings::default()) >= 1);
        }
    }
}
