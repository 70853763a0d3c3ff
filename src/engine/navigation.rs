use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::engine::helpers::require_mission;
use crate::engine::movement::{Access, MoveOutcome, check_access, handle_move};
use crate::engine::output::Output;
use crate::engine::rng::Chance;
use crate::error::Result;
use crate::store::Store;
use crate::world::World;

/// A discovered room matching `query` by id or by name.
fn find_destination(world: &World, store: &Store, query: &str) -> Option<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let discovered = || {
        store
            .tables()
            .rooms
            .values()
            .filter(|r| r.discovered)
            .map(|r| r.id.as_str())
    };

    discovered()
        .find(|id| id.to_lowercase() == query)
        .or_else(|| discovered().find(|id| world.room_name(id).to_lowercase().contains(&query)))
        .map(str::to_string)
}

/// Shortest list of `(direction, room)` steps from the current room to `goal`,
/// travelling only through discovered rooms the robot can currently enter.
pub fn find_route(world: &World, store: &Store, goal: &str) -> Result<Option<Vec<(String, String)>>> {
    let start = store.state().current_room.clone();
    if start == goal {
        return Ok(Some(Vec::new()));
    }

    let mut came_from: HashMap<String, (String, String)> = HashMap::new();
    let mut queue = VecDeque::from([start.clone()]);

    while let Some(room_id) = queue.pop_front() {
        for (direction, next) in &store.room(&room_id)?.exits {
            if *next == start || came_from.contains_key(next) {
                continue;
            }
            if !store.room(next)?.discovered {
                continue;
            }
            if check_access(world, store, next)? != Access::Open {
                continue;
            }
            came_from.insert(next.clone(), (room_id.clone(), direction.clone()));

            if next == goal {
                let mut path = Vec::new();
                let mut at = goal.to_string();
                while let Some((prev, dir)) = came_from.get(&at) {
                    path.push((dir.clone(), at.clone()));
                    at = prev.clone();
                }
                path.reverse();
                return Ok(Some(path));
            }
            queue.push_back(next.clone());
        }
    }
    Ok(None)
}

/// Walk to a previously visited room one `move` at a time.
pub fn handle_navigate(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
    destination: &str,
) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }

    let Some(goal) = find_destination(world, store, destination) else {
        out.say(format!(
            "🧭 No discovered location matches \"{destination}\". I can only navigate to areas I have already visited."
        ));
        return Ok(());
    };

    let Some(route) = find_route(world, store, &goal)? else {
        out.say(format!(
            "🧭 No known route to {} through accessible, explored areas.",
            world.room_name(&goal)
        ));
        return Ok(());
    };

    if route.is_empty() {
        out.say(format!("📍 obot-3 is already at {}.", world.room_name(&goal)));
        return Ok(());
    }

    let directions: Vec<&str> = route.iter().map(|(d, _)| d.as_str()).collect();
    out.say(format!(
        "🧭 Route to {}: {} ({} moves)",
        world.room_name(&goal),
        directions.join(" → "),
        route.len()
    ));
    debug!(goal = %goal, steps = route.len(), "navigating");

    for (direction, expected) in &route {
        if handle_move(out, world, store, rng, direction)? == MoveOutcome::Stopped {
            break;
        }
        let state = store.state();
        if state.current_room != *expected || state.in_combat || state.game_completed {
            break;
        }
    }

    if store.state().current_room != goal {
        out.say("⚠️  Navigation halted before reaching the destination.");
    }
    Ok(())
}
