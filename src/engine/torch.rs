use tracing::info;

use crate::engine::effects::tick_effects;
use crate::engine::helpers::{advance_turns, require_mission};
use crate::engine::output::Output;
use crate::error::Result;
use crate::store::Store;
use crate::world::World;

const CUT_TURNS: u32 = 3;

/// Cut through a sealed barrier, adding the catalog's exit to this room.
pub fn handle_use_plasma_torch(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    direction: &str,
) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }

    let here = store.state().current_room.clone();
    let cuts: Vec<_> = world.torch_cuts.iter().filter(|c| c.room == here).collect();
    if cuts.is_empty() {
        out.say(
            "🚫 Can only use the plasma torch at a sealed barrier. There is nothing here worth cutting through.",
        );
        return Ok(());
    }

    let torch_id = &world.rules.torch_item;
    let cost = match store.item(torch_id) {
        Ok(torch) if store.has_in_inventory(torch_id) => torch.energy_cost,
        _ => {
            out.say("🔧 obot-3 needs an industrial plasma torch in inventory to cut through barriers.");
            return Ok(());
        }
    };

    let direction = direction.trim().to_lowercase();
    if direction != "up" && direction != "down" {
        out.say("❓ Plasma torch direction must be \"up\" or \"down\".");
        return Ok(());
    }

    let Some(cut) = cuts.into_iter().find(|c| c.direction == direction) else {
        out.say(format!(
            "🚫 There is no sealed barrier {direction} from here for the torch to cut."
        ));
        return Ok(());
    };

    let energy = store.state().energy;
    if energy < cost {
        out.say(format!(
            "🔋 Insufficient energy to operate plasma torch. Required: {cost}, Available: {energy}"
        ));
        return Ok(());
    }

    if store.room(&here)?.exits.get(&direction) == Some(&cut.target) {
        out.say(format!(
            "✅ The way {direction} has already been cut open. Use 'move {direction}' to go through."
        ));
        return Ok(());
    }

    store.state_mut().energy = energy - cost;
    store.set_room_exit(&here, &direction, &cut.target)?;
    advance_turns(store, CUT_TURNS);
    info!(room = %here, direction = %direction, target = %cut.target, "barrier cut");

    out.event(cut.text.trim_end());
    tick_effects(out, world, store)?;
    Ok(())
}
