use indexmap::IndexMap;
use tracing::info;

use crate::engine::combat::check_detection;
use crate::engine::effects::tick_effects;
use crate::engine::helpers::{advance_turns, require_mission, spend_energy};
use crate::engine::output::Output;
use crate::engine::rng::Chance;
use crate::engine::weight::enforce_weight_limits;
use crate::error::{GameError, Result};
use crate::store::Store;
use crate::world::{AccessRequirement, World};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Open,
    Denied(String),
}

/// How a `move` ended, so a route walker knows whether to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Stopped,
}

/// Evaluate a room's access requirements in catalog order; the first unmet one wins.
pub fn check_access(world: &World, store: &Store, room_id: &str) -> Result<Access> {
    let room = world
        .rooms
        .get(room_id)
        .ok_or_else(|| GameError::UnknownRoom(room_id.to_string()))?;

    for req in &room.access {
        match req {
            AccessRequirement::Locked { text } => return Ok(Access::Denied(text.clone())),
            AccessRequirement::RequiresItem { item, text } => {
                if !store.has_in_inventory(item) {
                    return Ok(Access::Denied(text.clone()));
                }
            }
            AccessRequirement::BlockedBy { text, .. } => {
                if !store.room(room_id)?.obstacle_cleared {
                    return Ok(Access::Denied(text.clone()));
                }
            }
        }
    }
    Ok(Access::Open)
}

/// Match `input` against the exit map: whole direction first, then a one-letter
/// abbreviation. Ambiguity is reported as `Err` with the candidates.
fn resolve_exit(
    exits: &IndexMap<String, String>,
    input: &str,
) -> std::result::Result<Option<(String, String)>, Vec<String>> {
    let input = input.trim().to_lowercase();

    if let Some(target) = exits.get(&input) {
        return Ok(Some((input, target.clone())));
    }

    let mut chars = input.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Ok(None);
    };

    let hits: Vec<(&String, &String)> = exits
        .iter()
        .filter(|(dir, _)| dir.starts_with(c))
        .collect();

    match hits.as_slice() {
        [] => Ok(None),
        [(dir, target)] => Ok(Some(((*dir).clone(), (*target).clone()))),
        many => Err(many.iter().map(|(d, _)| (*d).clone()).collect()),
    }
}

////////////
/// MOVE ///
////////////

pub fn handle_move(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
    direction: &str,
) -> Result<MoveOutcome> {
    if !require_mission(out, store) {
        return Ok(MoveOutcome::Stopped);
    }

    let here = store.state().current_room.clone();
    let (direction, target) = match resolve_exit(&store.room(&here)?.exits, direction) {
        Ok(Some(hit)) => hit,
        Ok(None) => {
            out.say(format!("No exit to the {direction} from this location."));
            return Ok(MoveOutcome::Stopped);
        }
        Err(candidates) => {
            out.say(format!(
                "That direction is ambiguous here. Did you mean: {}?",
                candidates.join(", ")
            ));
            return Ok(MoveOutcome::Stopped);
        }
    };

    if let Access::Denied(text) = check_access(world, store, &target)? {
        out.say(text);
        return Ok(MoveOutcome::Stopped);
    }

    if store.state().in_combat {
        out.say(
            "🚫 Cannot move - hostile contacts are actively engaged! You must deal with the threat first.",
        );
        return Ok(MoveOutcome::Stopped);
    }

    if !spend_energy(out, world, store, world.rules.move_cost)? {
        return Ok(MoveOutcome::Stopped);
    }

    store.state_mut().current_room = target.clone();
    store.discover_room(&target)?;
    advance_turns(store, 1);
    info!(from = %here, to = %target, "moved");

    out.say(format!(
        "🚶 obot-3 moves {} to {}",
        direction,
        world.room_name(&target)
    ));

    let completes = world.rooms.get(&target).is_some_and(|r| r.completes_mission);
    if completes && !store.state().game_completed {
        store.state_mut().game_completed = true;
        info!(room = %target, "mission complete");
        out.event(format!(
            "🎉 **MISSION COMPLETE** - obot-3 has reached {}. A route out of the basement is open, Commander. The survivors can finally plan their escape.",
            world.room_name(&target)
        ));
    }

    let detected = check_detection(out, store, rng);
    enforce_weight_limits(out, world, store, rng)?;
    tick_effects(out, world, store)?;

    if !detected && !store.mobs_in(&target).is_empty() {
        out.say(
            "👁️ **STEALTH MODE**: Hostile contacts detected but haven't noticed you yet. Use 'explore' carefully or prepare for combat.",
        );
    }
    Ok(MoveOutcome::Moved)
}

/////////////////
/// OBSTACLES ///
/////////////////

/// A blocked room reachable from here (or this room itself) whose obstacle matches `target`.
/// Returns the room id, obstacle name and blocking text.
pub fn find_obstacle(
    world: &World,
    store: &Store,
    target: &str,
) -> Result<Option<(String, String, String)>> {
    let query = target.trim().to_lowercase();
    if query.is_empty() {
        return Ok(None);
    }

    let here = store.state().current_room.clone();
    let mut candidates = vec![here.clone()];
    candidates.extend(store.room(&here)?.exits.values().cloned());

    for room_id in candidates {
        let Some(room) = world.rooms.get(&room_id) else {
            continue;
        };
        if store.room(&room_id)?.obstacle_cleared {
            continue;
        }
        for req in &room.access {
            if let AccessRequirement::BlockedBy { obstacle, text } = req {
                if obstacle.contains(&query) || query.contains(obstacle.as_str()) {
                    return Ok(Some((room_id.clone(), obstacle.clone(), text.clone())));
                }
            }
        }
    }
    Ok(None)
}

/// `interact <obstacle> move`. Returns true if a turn was spent.
pub fn handle_move_obstacle(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    target: &str,
) -> Result<bool> {
    let Some((room_id, obstacle, _)) = find_obstacle(world, store, target)? else {
        out.say(format!("There are no {target} to move in this location."));
        return Ok(false);
    };

    if !spend_energy(out, world, store, world.rules.obstacle_cost)? {
        return Ok(false);
    }

    store.clear_obstacle(&room_id)?;
    info!(room = %room_id, obstacle = %obstacle, "obstacle cleared");
    out.say(format!(
        "📦 obot-3 pushes aside the {obstacle}, clearing a path into {}.",
        world.room_name(&room_id)
    ));
    out.say("✅ **Path cleared!** The way is now open.");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::ScriptedChance;
    use crate::store::ItemLocation;
    use crate::world::default_world;

    fn started(room: &str) -> (World, Store) {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        store.state_mut().mission_started = true;
        store.state_mut().current_room = room.to_string();
        (world, store)
    }

    #[test]
    fn abbreviations_resolve_when_unique() {
        let mut exits = IndexMap::new();
        exits.insert("north".to_string(), "A".to_string());
        exits.insert("northwest".to_string(), "B".to_string());
        exits.insert("east".to_string(), "C".to_string());

        assert_eq!(
            resolve_exit(&exits, "e"),
            Ok(Some(("east".to_string(), "C".to_string())))
        );
        assert_eq!(
            resolve_exit(&exits, "North"),
            Ok(Some(("north".to_string(), "A".to_string())))
        );
        assert!(resolve_exit(&exits, "n").is_err());
        assert_eq!(resolve_exit(&exits, "up"), Ok(None));
    }

    #[test]
    fn access_requirements() {
        let (world, mut store) = started("LAUNDRY");
        assert!(matches!(
            check_access(&world, &store, "STORAGE_4").expect("room"),
            Access::Denied(_)
        ));
        assert!(matches!(
            check_access(&world, &store, "MAINTENANCE_DOOR_LOCKED").expect("room"),
            Access::Denied(t) if t.contains("maintenance keys")
        ));

        store
            .move_item("maintenance_keys_001", ItemLocation::Inventory)
            .expect("keys");
        assert_eq!(
            check_access(&world, &store, "MAINTENANCE_DOOR_LOCKED").expect("room"),
            Access::Open
        );

        assert!(matches!(
            check_access(&world, &store, "CARETAKER_HALLWAY_BLOCKED").expect("room"),
            Access::Denied(_)
        ));
        store.clear_obstacle("CARETAKER_HALLWAY_BLOCKED").expect("room");
        assert_eq!(
            check_access(&world, &store, "CARETAKER_HALLWAY_BLOCKED").expect("room"),
            Access::Open
        );
    }

    #[test]
    fn move_requires_mission() {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        let mut out = Output::new();
        let mut rng = ScriptedChance::new();
        let outcome = handle_move(&mut out, &world, &mut store, &mut rng, "north").expect("move");
        assert_eq!(outcome, MoveOutcome::Stopped);
        assert!(out.contains("start_mission"));
        assert_eq!(store.state().current_room, world.rules.start_room);
    }

    #[test]
    fn combat_blocks_movement() {
        let (world, mut store) = started("STORAGE_8");
        store.state_mut().in_combat = true;
        let exit = store.room("STORAGE_8").expect("room").exits.keys().next().cloned();
        let mut out = Output::new();
        let mut rng = ScriptedChance::new();
        let outcome = handle_move(
            &mut out,
            &world,
            &mut store,
            &mut rng,
            &exit.expect("exit"),
        )
        .expect("move");
        assert_eq!(outcome, MoveOutcome::Stopped);
        assert!(out.contains("actively engaged"));
        assert_eq!(store.state().energy, 100);
    }

    #[test]
    fn move_spends_energy_and_turn() {
        let (world, mut store) = started("STORAGE_15");
        let (dir, target) = store
            .room("STORAGE_15")
            .expect("room")
            .exits
            .iter()
            .find(|(_, t)| matches!(check_access(&world, &store, t), Ok(Access::Open)))
            .map(|(d, t)| (d.clone(), t.clone()))
            .expect("open exit");

        let mut out = Output::new();
        let mut rng = ScriptedChance::new();
        let outcome = handle_move(&mut out, &world, &mut store, &mut rng, &dir).expect("move");

        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(store.state().current_room, target);
        assert_eq!(store.state().energy, 98);
        assert_eq!(store.state().turn_number, 2);
        assert!(store.room(&target).expect("room").discovered);
    }

    #[test]
    fn boxes_clear_from_next_door() {
        let (world, mut store) = started("LAUNDRY");
        let mut out = Output::new();
        assert!(handle_move_obstacle(&mut out, &world, &mut store, "boxes").expect("boxes"));
        assert!(store.room("CARETAKER_HALLWAY_BLOCKED").expect("room").obstacle_cleared);
        assert_eq!(store.state().energy, 95);

        let mut out = Output::new();
        assert!(!handle_move_obstacle(&mut out, &world, &mut store, "boxes").expect("boxes"));
        assert!(out.contains("There are no boxes"));
    }
}
