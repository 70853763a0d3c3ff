use tracing::info;

use crate::engine::combat::handle_attack;
use crate::engine::effects::tick_effects;
use crate::engine::helpers::{advance_turns, require_mission};
use crate::engine::items::{handle_drop, handle_examine, handle_take, handle_use};
use crate::engine::movement::handle_move_obstacle;
use crate::engine::output::Output;
use crate::engine::rng::Chance;
use crate::error::Result;
use crate::store::Store;
use crate::world::World;

/// Verbs accepted by `interact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    Examine,
    Take,
    Drop,
    Use,
    Attack,
    Move,
}

impl InteractAction {
    pub fn parse(s: &str) -> Option<InteractAction> {
        let a = match s.trim().to_lowercase().as_str() {
            "examine" | "x" | "look" | "inspect" => InteractAction::Examine,
            "take" | "get" | "grab" | "pick" => InteractAction::Take,
            "drop" => InteractAction::Drop,
            "use" => InteractAction::Use,
            "attack" | "fight" | "hit" => InteractAction::Attack,
            "move" | "push" | "clear" => InteractAction::Move,
            _ => return None,
        };
        Some(a)
    }
}

/////////////////
/// LIFECYCLE ///
/////////////////

pub fn handle_start_mission(out: &mut Output, world: &World, store: &mut Store) -> Result<()> {
    if store.state().mission_started {
        out.say(format!(
            "🤖 obot-3 is already active and standing by in {}, Commander. Use 'explore' to scan the area.",
            world.room_name(&store.state().current_room)
        ));
        return Ok(());
    }

    let start = world.rules.start_room.clone();
    store.state_mut().mission_started = true;
    store.discover_room(&start)?;
    info!(world = %world.id, "mission started");

    out.title(format!("🤖 **{}**", world.name));
    out.say(world.intro.trim());
    out.say(format!(
        "📍 Systems online in {}. Use 'explore' to scan, 'move <direction>' to travel and 'return_to_bunker' to deliver supplies.",
        world.room_name(&start)
    ));
    Ok(())
}

/// Reseed every table from the catalog.
pub fn handle_new_game(out: &mut Output, world: &World, store: &mut Store) {
    store.reset(world);
    info!(world = %world.id, "new game");
    out.say("🔄 Memory banks wiped. A fresh obot-3 awaits activation - use 'start_mission' to begin.");
}

////////////////
/// INTERACT ///
////////////////

/// `interact(target, action)`. Any action that spends a turn also ticks status effects.
pub fn handle_interact(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
    target: &str,
    action: &str,
) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }

    let Some(parsed) = InteractAction::parse(action) else {
        out.say(format!(
            "Unknown action \"{action}\". Try examine, take, drop, use, attack or move."
        ));
        return Ok(());
    };

    let took_turn = match parsed {
        InteractAction::Examine => handle_examine(out, world, store, target)?,
        InteractAction::Take => handle_take(out, world, store, rng, target)?,
        InteractAction::Drop => handle_drop(out, store, target)?,
        InteractAction::Use => handle_use(out, world, store, target)?,
        InteractAction::Attack => handle_attack(out, world, store, rng, target)?,
        InteractAction::Move => handle_move_obstacle(out, world, store, target)?,
    };

    if took_turn {
        advance_turns(store, 1);
        tick_effects(out, world, store)?;
    }
    Ok(())
}
