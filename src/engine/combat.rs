use tracing::{info, warn};

use crate::engine::dice::roll_dice;
use crate::engine::helpers::{find_by_name, spend_energy};
use crate::engine::output::Output;
use crate::engine::rng::Chance;
use crate::error::Result;
use crate::store::{EffectType, MobRecord, PERSISTENT, Store};
use crate::world::{ItemType, SpecialAbility, World};

/////////////////
/// DETECTION ///
/////////////////

/// Roll detection for every living mob in the current room.
///
/// Returns true if combat started. Already-engaged robots aren't re-rolled.
pub fn check_detection(out: &mut Output, store: &mut Store, rng: &mut dyn Chance) -> bool {
    if store.state().in_combat {
        return false;
    }

    let room = store.state().current_room.clone();
    let mobs: Vec<(String, f64)> = store
        .mobs_in(&room)
        .iter()
        .map(|m| (m.name.clone(), m.detect_chance))
        .collect();
    if mobs.is_empty() {
        return false;
    }

    let spotted: Vec<&str> = mobs
        .iter()
        .filter(|(_, p)| rng.chance(*p))
        .map(|(name, _)| name.as_str())
        .collect();
    if spotted.is_empty() {
        return false;
    }

    store.state_mut().in_combat = true;
    info!(room = %room, hostiles = mobs.len(), "combat initiated");

    let everyone: Vec<&str> = mobs.iter().map(|(n, _)| n.as_str()).collect();
    let who = if mobs.len() > 1 {
        "multiple hostiles"
    } else {
        "a hostile"
    };
    out.event(format!(
        "⚠️ **COMBAT INITIATED!**\n\n🚨 {} spotted you entering the area!\n\n**HOSTILE ALERT**: All enemies in the room are now engaged:\n• {}\n\n🤖 obot-3 is now in combat with {}. Use combat commands to defend yourself or attempt to retreat.\n\n**Energy Status**: {}/{} - Combat actions cost energy!",
        spotted.join(" and "),
        everyone.join(", "),
        who,
        store.state().energy,
        store.state().max_energy
    ));
    true
}

///////////////
/// HAZARDS ///
///////////////

/// Roll the current room's environmental hazard, if it has one.
pub fn roll_hazard(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
) -> Result<()> {
    let room = store.state().current_room.clone();
    let Some(hazard) = world.hazards.get(&room) else {
        return Ok(());
    };
    if !rng.chance(hazard.trigger_chance) {
        return Ok(());
    }

    let damage = roll_dice(&hazard.damage, rng);
    let health = (store.state().health - damage).max(0);
    store.state_mut().health = health;
    out.event(format!(
        "⚠️  **HAZARD DETECTED:** {} - {} I've sustained {} {} damage!",
        hazard.name, hazard.desc, damage, hazard.damage_type
    ));

    if health <= 0 {
        out.event("💀 SYSTEM FAILURE: obot-3 has been destroyed!");
        enter_maintenance_mode(out, world, store)?;
    }
    Ok(())
}

//////////////
/// ATTACK ///
//////////////

/// `interact <target> attack`. Returns true if the attack took a turn.
pub fn handle_attack(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
    target: &str,
) -> Result<bool> {
    let room = store.state().current_room.clone();

    let found = find_by_name(store.mobs_in(&room), target, |m| m.name.as_str()).cloned();
    let Some(mob) = found else {
        if was_here(world, store, &room, target) {
            out.say("The threat has already been neutralized.");
        } else {
            out.say(format!("Target \"{target}\" not found in this location."));
        }
        return Ok(false);
    };

    if !spend_energy(out, world, store, world.rules.attack_cost)? {
        return Ok(false);
    }

    let (bonus, weapon) = equipped_weapon(store);
    let damage = roll_dice(&world.rules.base_attack, rng) + bonus;
    store.update_mob_health(&mob.id, mob.health - damage)?;

    let with = weapon.map(|w| format!(" with {w}")).unwrap_or_default();
    out.say(format!(
        "⚔️  obot-3 attacks {}{} for {} damage!",
        mob.name, with, damage
    ));

    if store.mob(&mob.id)?.is_alive {
        retaliate(out, world, store, rng, &mob)?;
        return Ok(true);
    }

    info!(mob = %mob.id, room = %room, "mob neutralized");
    out.say(format!("💀 {} has been neutralized!", mob.name));

    let defeat_text = world.mobs.get(&mob.id).and_then(|m| m.defeat_text.as_deref());
    if let Some(text) = defeat_text {
        out.event(text);
    }

    if store.mobs_in(&room).is_empty() {
        store.state_mut().in_combat = false;
        // only a guardian's fall clears its room for good
        if defeat_text.is_some() {
            store.clear_room(&room)?;
        }
        out.event("🏆 **AREA SECURED** - All hostiles neutralized. obot-3 is no longer in combat.");
    }
    Ok(true)
}

/// A mob matching `target` started in this room or lies dead here.
fn was_here(world: &World, store: &Store, room: &str, target: &str) -> bool {
    let query = target.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }
    let matches = |name: &str| name.to_lowercase().contains(&query);

    store
        .tables()
        .mobs
        .values()
        .any(|m| !m.is_alive && m.location == room && matches(&m.name))
        || world
            .mobs
            .values()
            .any(|m| m.location == room && matches(&m.name) && !store.tables().mobs.contains_key(&m.id))
}

/// Bonus damage and name of the first weapon in the inventory.
pub fn equipped_weapon(store: &Store) -> (i32, Option<String>) {
    store
        .inventory()
        .into_iter()
        .find(|i| i.kind == ItemType::Weapon)
        .map(|w| (w.value, Some(w.name.clone())))
        .unwrap_or((0, None))
}

///////////////////
/// RETALIATION ///
///////////////////

fn retaliate(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
    mob: &MobRecord,
) -> Result<()> {
    let rules = &world.rules;

    let damage = roll_dice(&mob.damage, rng);
    let health = (store.state().health - damage).max(0);
    out.event(format!(
        "{} attacks obot-3 for {} {} damage!",
        mob.name, damage, mob.damage_type
    ));

    if let Some(ability) = &mob.special {
        apply_special_ability(out, store, rng, ability);
    }
    store.state_mut().health = health;

    if store.state().energy <= rules.retreat_energy {
        out.event("⚡ EMERGENCY ENERGY RETREAT: Power reserves critical - automatic withdrawal initiated!");
        energy_retreat(world, store);
        out.event("🤖 obot-3 disengages from combat to preserve remaining power systems.");
    } else if health <= rules.flee_health {
        out.event("🔋 WARNING: obot-3 is critically damaged and attempting to flee!");
        if rng.chance(rules.flee_chance) {
            flee(store, rng);
            out.event("obot-3 successfully retreats to a safer location.");
        } else {
            out.event("obot-3 is unable to escape!");
        }
    }

    if health <= 0 {
        out.event("💀 SYSTEM FAILURE: obot-3 has been destroyed!");
        enter_maintenance_mode(out, world, store)?;
    }
    Ok(())
}

fn apply_special_ability(
    out: &mut Output,
    store: &mut Store,
    rng: &mut dyn Chance,
    ability: &SpecialAbility,
) {
    match ability {
        SpecialAbility::AcidBurn => {
            store.add_effect(
                EffectType::AcidBurn,
                "Corrosive acid continues eating through obot-3's plating",
                3,
                1,
            );
            out.event("🧪 Acid splashes across obot-3's chassis - ongoing corrosion detected!");
        }
        SpecialAbility::AttachCorrode => {
            store.add_effect(
                EffectType::Attached,
                "Metallivorous bacteria attached to obot-3's frame",
                PERSISTENT,
                1,
            );
            out.event("🦠 Bacteria swarm attaches to obot-3 - continuous metal corrosion detected!");
        }
        SpecialAbility::ElectricalGlitch => {
            if rng.chance(0.25) {
                out.event(
                    "⚡ Electrical surge causes system glitches - some tools temporarily offline!",
                );
            }
        }
        SpecialAbility::Passive(_) => {}
    }
}

/// Pull back through the exit that leads closest to home.
fn energy_retreat(world: &World, store: &mut Store) {
    let room = store.state().current_room.clone();
    let Ok(record) = store.room(&room) else {
        return;
    };

    let exits = &record.exits;
    let rules = &world.rules;
    let target = exits
        .values()
        .find(|t| **t == rules.bunker_room)
        .or_else(|| exits.values().find(|t| **t == rules.start_room))
        .or_else(|| exits.values().next())
        .cloned();

    if let Some(target) = target {
        info!(from = %room, to = %target, "energy retreat");
        let state = store.state_mut();
        state.current_room = target;
        state.in_combat = false;
    }
}

fn flee(store: &mut Store, rng: &mut dyn Chance) {
    let room = store.state().current_room.clone();
    let Ok(record) = store.room(&room) else {
        return;
    };
    let targets: Vec<String> = record.exits.values().cloned().collect();
    if targets.is_empty() {
        return;
    }

    let target = targets[rng.pick(targets.len())].clone();
    info!(from = %room, to = %target, "fled combat");
    let state = store.state_mut();
    state.current_room = target;
    state.in_combat = false;
}

////////////////////////
/// MAINTENANCE MODE ///
////////////////////////

/// Emergency repair after the robot is destroyed in the field.
///
/// Costs a tenth of maximum energy for good.
pub fn enter_maintenance_mode(out: &mut Output, world: &World, store: &mut Store) -> Result<()> {
    let rules = &world.rules;

    let max_energy = store.state().max_energy * 9 / 10;
    let state = store.state_mut();
    state.health = rules.maintenance_health;
    state.max_energy = max_energy;
    state.energy = max_energy / 2;
    state.current_room = rules.start_room.clone();
    state.in_combat = false;
    store.clear_effects();

    warn!(max_energy, "obot-3 entered maintenance mode");
    out.event(format!(
        "🔧 **MAINTENANCE MODE** - Emergency repairs complete. obot-3 has been recovered to {} with {} health and {}/{} energy. Maximum energy capacity permanently reduced.",
        world.room_name(&rules.start_room),
        rules.maintenance_health,
        max_energy / 2,
        max_energy
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::ScriptedChance;
    use crate::store::ItemLocation;
    use crate::world::default_world;

    fn in_room(room: &str) -> (World, Store) {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        store.state_mut().mission_started = true;
        store.state_mut().current_room = room.to_string();
        (world, store)
    }

    #[test]
    fn detection_starts_combat() {
        let (_, mut store) = in_room("STORAGE_8");
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_draws([0.0]);
        assert!(check_detection(&mut out, &mut store, &mut rng));
        assert!(store.state().in_combat);
        assert!(out.contains("COMBAT INITIATED"));
    }

    #[test]
    fn missed_detection_keeps_stealth() {
        let (_, mut store) = in_room("STORAGE_8");
        let mut out = Output::new();
        let mut rng = ScriptedChance::new();
        assert!(!check_detection(&mut out, &mut store, &mut rng));
        assert!(!store.state().in_combat);
        assert!(out.is_empty());
    }

    #[test]
    fn attack_damages_and_mob_retaliates() {
        let (world, mut store) = in_room("STORAGE_8");
        let mut out = Output::new();
        // player 1d6+2 rolls 3 -> 5; rat 1d4+1 rolls 2 -> 3
        let mut rng = ScriptedChance::new().with_dice([3, 2]);
        assert!(handle_attack(&mut out, &world, &mut store, &mut rng, "rat").expect("attack"));

        let rat = store.mob("storage_rat_001").expect("rat");
        assert_eq!(rat.health, 7);
        assert!(rat.is_alive);
        assert_eq!(store.state().health, 97);
        assert_eq!(store.state().energy, 97);
    }

    #[test]
    fn weapon_bonus_applies() {
        let (world, mut store) = in_room("STORAGE_8");
        store
            .move_item("combat_knife_001", ItemLocation::Inventory)
            .expect("knife");
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_dice([1]);
        handle_attack(&mut out, &world, &mut store, &mut rng, "rat").expect("attack");

        // 1 + 2 + 12 kills a 12 hp rat outright
        assert!(out.contains("with Tactical Combat Knife for 15 damage"));
        assert!(out.contains("AREA SECURED"));
        assert!(!store.state().in_combat);
        assert!(store.mobs_in("STORAGE_8").is_empty());

        // the carcass stays on record; only guardians clear a room
        let rat = store.mob("storage_rat_001").expect("rat row kept");
        assert!(!rat.is_alive);
        assert!(!store.room("STORAGE_8").expect("room").cleared);
    }

    #[test]
    fn felling_the_guardian_clears_its_room() {
        let (world, mut store) = in_room("WORKSHOP");
        store.update_mob_health("maintenance_bot_corrupted_001", 1).expect("android");
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_dice([1]);
        handle_attack(&mut out, &world, &mut store, &mut rng, "android").expect("attack");

        assert!(out.contains("AREA SECURED"));
        assert!(store.room("WORKSHOP").expect("room").cleared);
        assert!(store.mob("maintenance_bot_corrupted_001").is_err());
    }

    #[test]
    fn attacking_the_dead_changes_nothing() {
        let (world, mut store) = in_room("STORAGE_8");
        store.update_mob_health("storage_rat_001", 0).expect("rat");
        let before = store.tables().clone();

        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_dice([6, 6]);
        assert!(!handle_attack(&mut out, &world, &mut store, &mut rng, "rat").expect("attack"));
        assert_eq!(out.to_text(), "The threat has already been neutralized.");
        assert_eq!(store.state(), &before.state);
        assert_eq!(store.tables().mobs, before.mobs);
    }

    #[test]
    fn lethal_retaliation_enters_maintenance() {
        let (world, mut store) = in_room("WORKSHOP");
        store.state_mut().health = 3;
        store.state_mut().in_combat = true;
        let mut out = Output::new();
        // flee roll fails so the robot stays put until maintenance
        let mut rng = ScriptedChance::new().with_dice([1, 8, 8]).with_draws([0.9]);
        handle_attack(&mut out, &world, &mut store, &mut rng, "android").expect("attack");

        let s = store.state();
        assert_eq!(s.health, 25);
        assert_eq!(s.max_energy, 90);
        assert_eq!(s.energy, 45);
        assert_eq!(s.current_room, world.rules.start_room);
        assert!(!s.in_combat);
        assert!(out.contains("unable to escape"));
    }

    #[test]
    fn low_energy_retreat_preempts_flee() {
        let (world, mut store) = in_room("HALLWAY_B4");
        store.state_mut().energy = 7;
        store.state_mut().health = 10;
        store.state_mut().in_combat = true;
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_dice([1, 1]);
        handle_attack(&mut out, &world, &mut store, &mut rng, "survivor").expect("attack");

        assert!(out.contains("EMERGENCY ENERGY RETREAT"));
        assert!(!out.contains("attempting to flee"));
        assert!(!store.state().in_combat);
        // no exit home from here, so the first listed exit
        assert_eq!(store.state().current_room, "HALLWAY_B3");
        assert_eq!(store.state().turn_number, 1);
    }

    #[test]
    fn retreat_heads_for_the_bunker_first() {
        let (world, mut store) = in_room("STORAGE_15");
        energy_retreat(&world, &mut store);
        assert_eq!(store.state().current_room, "BUNKER");
    }

    #[test]
    fn retreat_falls_back_to_the_start_room() {
        // HALLWAY_B8 lists HALLWAY_B7 before STORAGE_15
        let (world, mut store) = in_room("HALLWAY_B8");
        store.state_mut().in_combat = true;
        energy_retreat(&world, &mut store);
        assert_eq!(store.state().current_room, world.rules.start_room);
        assert!(!store.state().in_combat);
    }

    #[test]
    fn successful_flee_leaves_the_fight() {
        let (world, mut store) = in_room("WORKSHOP");
        store.state_mut().health = 10;
        store.state_mut().in_combat = true;
        let mut out = Output::new();
        // player hits for 3, android 2d8+4 hits for 6; flee roll 0.1 succeeds
        let mut rng = ScriptedChance::new()
            .with_dice([1, 1, 1])
            .with_draws([0.1, 0.0]);
        handle_attack(&mut out, &world, &mut store, &mut rng, "android").expect("attack");

        assert!(out.contains("attempting to flee"));
        assert!(out.contains("successfully retreats"));
        let s = store.state();
        assert_eq!(s.health, 4);
        assert_eq!(s.current_room, "BOILER");
        assert!(!s.in_combat);
        assert!(store.mob("maintenance_bot_corrupted_001").expect("android").is_alive);
    }

    #[test]
    fn acid_burn_attaches_effect() {
        let (world, mut store) = in_room("JANITOR_CLOSET");
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_dice([1, 1]);
        handle_attack(&mut out, &world, &mut store, &mut rng, "slime").expect("attack");

        let effects = store.effects();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectType::AcidBurn);
        assert_eq!(effects[0].duration, 3);
    }
}
