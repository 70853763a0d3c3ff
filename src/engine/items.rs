use tracing::{debug, info};

use crate::engine::helpers::{find_by_name, spend_energy};
use crate::engine::movement::find_obstacle;
use crate::engine::output::Output;
use crate::engine::render::render_inventory;
use crate::engine::rng::Chance;
use crate::engine::weight::enforce_weight_limits;
use crate::error::Result;
use crate::store::{ItemLocation, ItemRecord, Store};
use crate::world::{ItemType, World};

fn in_room(store: &Store, target: &str) -> Option<ItemRecord> {
    let here = store.state().current_room.clone();
    find_by_name(store.items_in_room(&here), target, |i| i.name.as_str()).cloned()
}

fn in_inventory(store: &Store, target: &str) -> Option<ItemRecord> {
    find_by_name(store.inventory(), target, |i| i.name.as_str()).cloned()
}

fn sync_weight(store: &mut Store) {
    let weight = store.carrying_weight();
    store.state_mut().carrying_weight = weight;
}

////////////
/// TAKE ///
////////////

/// `interact <item> take`. Returns true if a turn was spent.
pub fn handle_take(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
    target: &str,
) -> Result<bool> {
    let Some(item) = in_room(store, target) else {
        out.say(format!("Item \"{target}\" not found in this location."));
        return Ok(false);
    };

    let carried = store.carrying_weight();
    let total = carried + item.weight;
    if total >= world.rules.carry_capacity {
        out.say(format!(
            "⚠️  Cannot take {} - would exceed obot-3's carrying capacity ({:.1}lbs, limit {}lbs)",
            item.name, total, world.rules.carry_capacity
        ));
        return Ok(false);
    }

    if !spend_energy(out, world, store, world.rules.take_cost)? {
        return Ok(false);
    }

    store.move_item(&item.id, ItemLocation::Inventory)?;
    debug!(item = %item.id, weight = total, "picked up");
    out.say(format!("✅ obot-3 picks up {} ({}lbs)", item.name, item.weight));

    enforce_weight_limits(out, world, store, rng)?;
    Ok(true)
}

////////////
/// DROP ///
////////////

pub fn handle_drop(out: &mut Output, store: &mut Store, target: &str) -> Result<bool> {
    let Some(item) = in_inventory(store, target) else {
        out.say(format!("Item \"{target}\" not found in inventory."));
        return Ok(false);
    };

    let here = store.state().current_room.clone();
    store.move_item(&item.id, ItemLocation::Room(here))?;
    sync_weight(store);
    out.say(format!("📤 obot-3 sets down {}.", item.name));
    Ok(true)
}

///////////////
/// EXAMINE ///
///////////////

pub fn handle_examine(
    out: &mut Output,
    world: &World,
    store: &Store,
    target: &str,
) -> Result<bool> {
    if let Some(item) = in_room(store, target).or_else(|| in_inventory(store, target)) {
        out.say(format!(
            "🔍 **{}**\n{}\nWeight: {}lbs | Type: {}",
            item.name,
            item.desc,
            item.weight,
            item.kind.as_str()
        ));
        if item.energy_cost > 0 {
            out.say(format!("Energy cost to use: {}", item.energy_cost));
        }
        return Ok(true);
    }

    let here = store.state().current_room.clone();
    let mob = find_by_name(store.mobs_in(&here), target, |m| m.name.as_str()).cloned();
    if let Some(mob) = mob {
        out.say(format!(
            "🔍 **{}**\n{}\nHealth: {}/{}",
            mob.name, mob.desc, mob.health, mob.max_health
        ));
        return Ok(true);
    }

    if let Some((room_id, obstacle, text)) = find_obstacle(world, store, target)? {
        out.say(format!(
            "🔍 **Blocked passage: {}**\nThe way into {} is obstructed by {}. {}",
            obstacle,
            world.room_name(&room_id),
            obstacle,
            text
        ));
        return Ok(true);
    }

    out.say(format!(
        "Cannot examine \"{target}\" - not found in this location."
    ));
    Ok(true)
}

///////////
/// USE ///
///////////

/// `interact <item> use`. Energy items never cost energy; everything else must be affordable.
pub fn handle_use(out: &mut Output, world: &World, store: &mut Store, target: &str) -> Result<bool> {
    let Some(item) = in_inventory(store, target) else {
        out.say(format!("Item \"{target}\" not found in inventory."));
        return Ok(false);
    };

    let energy = store.state().energy;
    let cost = if item.kind == ItemType::Energy {
        0
    } else {
        item.energy_cost
    };
    if cost > energy {
        out.say(format!(
            "Insufficient energy to use {}. Required: {}, Available: {}",
            item.name, cost, energy
        ));
        return Ok(false);
    }

    if let Some(lore) = world.items.get(&item.id).and_then(|i| i.lore.as_ref()) {
        store.state_mut().energy -= cost;
        let id = format!("lore_{}", item.id);
        if store.discover_content(&id, lore.kind, &lore.title, &lore.body, &item.name) {
            info!(item = %item.id, kind = lore.kind.as_str(), "intel discovered");
            out.event(format!(
                "{} **NEW {} FILE ARCHIVED:** {}\n\n{}",
                lore.kind.icon(),
                lore.kind.as_str().to_uppercase(),
                lore.title,
                lore.body
            ));
            out.say("💡 Use 'access_discovered_intel' to review archived files.");
        } else {
            out.say(format!(
                "📁 {} has nothing new - \"{}\" is already in my memory banks.",
                item.name, lore.title
            ));
        }
        return Ok(true);
    }

    match item.kind {
        ItemType::RobotMedicine => {
            let max = world.rules.max_health;
            let health = store.state().health;
            let repaired = item.value.min(max - health).max(0);
            let state = store.state_mut();
            state.health = health + repaired;
            state.energy -= cost;
            consume(store, &item)?;
            out.say(format!(
                "🔧 obot-3 uses {} and repairs {} damage",
                item.name, repaired
            ));
        }
        ItemType::Energy => {
            let state = store.state();
            let gained = item.value.min(state.max_energy - state.energy).max(0);
            store.state_mut().energy += gained;
            consume(store, &item)?;
            out.say(format!(
                "🔋 obot-3 uses {} and gains {} energy",
                item.name, gained
            ));
        }
        ItemType::HumanMedicine => out.say(format!(
            "🤖 {} is designed for human use - obot-3 cannot benefit from this item",
            item.name
        )),
        ItemType::Food => out.say(
            "🤖 obot-3 cannot process organic matter, but this food could help human survivors",
        ),
        ItemType::Water | ItemType::RawWater | ItemType::WaterPurifier => out.say(format!(
            "💧 {} belongs in the bunker - use 'return_to_bunker' to deliver it.",
            item.name
        )),
        ItemType::Key => out.say(format!(
            "🔑 {} stays on obot-3's key ring and opens matching doors automatically.",
            item.name
        )),
        ItemType::Weapon => out.say(format!(
            "⚔️  {} equipped as primary weapon ({} bonus damage)",
            item.name, item.value
        )),
        ItemType::Tool if item.id == world.rules.torch_item => out.say(format!(
            "🔥 {} is ready. Use 'use_plasma_torch' with \"up\" or \"down\" at a sealed barrier.",
            item.name
        )),
        ItemType::Tool | ItemType::Material => out.say(format!(
            "🔍 obot-3 analyzes {} - no direct application found.",
            item.name
        )),
    }
    Ok(true)
}

fn consume(store: &mut Store, item: &ItemRecord) -> Result<()> {
    store.move_item(&item.id, ItemLocation::Consumed)?;
    sync_weight(store);
    Ok(())
}

/////////////////
/// INVENTORY ///
/////////////////

/// Inventory report. The weight governor gets a say first.
pub fn handle_inventory(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
) -> Result<()> {
    let mut drops = Output::new();
    enforce_weight_limits(&mut drops, world, store, rng)?;
    render_inventory(out, world, store);
    out.append(drops);
    Ok(())
}
