use crate::engine::combat::{check_detection, roll_hazard};
use crate::engine::effects::tick_effects;
use crate::engine::helpers::{advance_turns, require_mission, spend_energy};
use crate::engine::output::Output;
use crate::engine::rng::Chance;
use crate::error::{GameError, Result};
use crate::store::Store;
use crate::world::World;

/// Scan the current room: discovery, detection, hazards and effect damage, then the report.
pub fn handle_explore(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }
    if !spend_energy(out, world, store, world.rules.explore_cost)? {
        return Ok(());
    }

    let here = store.state().current_room.clone();
    store.discover_room(&here)?;

    // events are reported after the scan itself
    let mut events = Output::new();
    check_detection(&mut events, store, rng);
    roll_hazard(&mut events, world, store, rng)?;
    tick_effects(&mut events, world, store)?;
    advance_turns(store, 1);

    // hazards and effects may have sent the robot home
    let scanned = store.state().current_room.clone();
    if scanned != here {
        out.append(events);
        return Ok(());
    }

    render_scan(out, world, store, &here)?;
    out.append(events);
    render_exits(out, world, store, &here)?;
    Ok(())
}

fn render_scan(out: &mut Output, world: &World, store: &Store, room_id: &str) -> Result<()> {
    let room = world
        .rooms
        .get(room_id)
        .ok_or_else(|| GameError::UnknownRoom(room_id.to_string()))?;

    out.title("🤖 **SCANNING CURRENT AREA...**");
    out.say(format!(
        "📍 **My Current Location:** {}\n🔍 **Visual Analysis:** {}",
        room.name, room.desc
    ));

    let items = store.items_in_room(room_id);
    if !items.is_empty() {
        let mut s = String::from("📦 **Items My Sensors Have Located:**");
        for item in items {
            s.push_str(&format!(
                "\n  • {} ({}lbs) - {}",
                item.name, item.weight, item.desc
            ));
        }
        out.say(s);
    }

    let mobs = store.mobs_in(room_id);
    if !mobs.is_empty() {
        let engaged = store.state().in_combat;
        let mut s = if engaged {
            String::from("⚔️ **ENGAGED HOSTILES:**")
        } else {
            String::from("👁️ **STEALTH MODE - HOSTILE CONTACTS:**")
        };
        for mob in mobs {
            let alert = if mob.detect_chance >= 0.8 {
                "HIGH ALERT"
            } else if mob.detect_chance >= 0.6 {
                "ALERT"
            } else {
                "LOW ALERT"
            };
            s.push_str(&format!(
                "\n  • {} ({}/{} HP) - Detection Risk: {}\n    {}",
                mob.name, mob.health, mob.max_health, alert, mob.desc
            ));
        }
        if !engaged {
            s.push_str("\n\n🤖 **TACTICAL ADVISORY**: Hostiles haven't detected me yet. I can attempt stealth actions or prepare for combat.");
        }
        out.say(s);
    }
    Ok(())
}

fn render_exits(out: &mut Output, world: &World, store: &Store, room_id: &str) -> Result<()> {
    let exits = &store.room(room_id)?.exits;
    if exits.is_empty() {
        out.set_exits("🚪 **Exit Routes:** (none)");
        return Ok(());
    }

    let mut s = String::from("🚪 **Exit Routes I Can Access:**");
    for (direction, target) in exits {
        let name = if store.room(target)?.discovered {
            world.room_name(target)
        } else {
            "Unexplored area"
        };
        s.push_str(&format!("\n  • {direction}: {name}"));
    }
    out.set_exits(s);
    Ok(())
}
