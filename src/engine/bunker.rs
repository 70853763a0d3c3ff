use tracing::{info, warn};

use crate::engine::effects::tick_effects;
use crate::engine::helpers::{advance_turns, find_by_name, require_mission};
use crate::engine::output::Output;
use crate::error::Result;
use crate::store::{BunkerItem, ItemLocation, ItemOrigin, ItemRecord, Resource, Store};
use crate::world::{BunkerCategory, ItemType, World, Yields};

///////////////////
/// HIBERNATION ///
///////////////////

/// Emergency shutdown on an empty battery: days pass at the bunker's expense.
pub fn trigger_hibernation(out: &mut Output, world: &World, store: &mut Store) {
    let rules = &world.rules;
    store.advance_day(rules.hibernation_days);
    store.state_mut().energy = rules.hibernation_energy;
    warn!(days = rules.hibernation_days, "emergency hibernation");

    let s = store.state();
    let r = s.resources;
    out.event(format!(
        "💤 **EMERGENCY HIBERNATION ACTIVATED**\n\n🤖 Commander, my energy reserves were completely depleted. I've entered emergency hibernation mode.\n\n**HIBERNATION REPORT:**\n- Duration: {days} days\n- Energy recovered: {}/{} (emergency power only)\n- Bunker resources consumed during hibernation:\n  • Food: {days} days ({} remaining)\n  • Water: {days} days ({} remaining)\n  • Energy: {days} days ({} remaining)\n\n⚠️  **ADVISORY**: Emergency hibernation is costly. Plan your energy usage more carefully to avoid future hibernations.\n\nI now have enough power to return to base for full recharging.",
        s.energy,
        s.max_energy,
        r.food,
        r.water,
        r.energy,
        days = rules.hibernation_days,
    ));
}

//////////////
/// RETURN ///
//////////////

/// Where a delivered item ends up.
enum Delivery {
    Resource(Resource, i32),
    Stored(BunkerCategory, Option<u32>, &'static str),
}

fn classify(kind: ItemType, yields: Yields, value: i32) -> Delivery {
    match kind {
        ItemType::Food if yields.food > 0 => Delivery::Resource(Resource::Food, yields.food),
        ItemType::Water if yields.water > 0 => Delivery::Resource(Resource::Water, yields.water),
        ItemType::Energy if yields.energy > 0 => {
            Delivery::Resource(Resource::Energy, yields.energy)
        }
        ItemType::Energy => Delivery::Stored(
            BunkerCategory::Material,
            u32::try_from(value).ok().filter(|v| *v > 0),
            "stored (not compatible with fuel cell generator)",
        ),
        ItemType::Food | ItemType::Water => {
            Delivery::Stored(BunkerCategory::Material, None, "stored")
        }
        ItemType::RawWater => Delivery::Stored(
            BunkerCategory::Material,
            None,
            "stored (requires purification tablets before use)",
        ),
        ItemType::WaterPurifier => Delivery::Stored(
            BunkerCategory::Material,
            None,
            "stored (can purify contaminated water)",
        ),
        ItemType::HumanMedicine => Delivery::Stored(BunkerCategory::Medicine, None, "stored"),
        ItemType::Weapon | ItemType::Tool => {
            Delivery::Stored(BunkerCategory::Defense, None, "stored")
        }
        ItemType::Material => Delivery::Stored(BunkerCategory::Material, None, "stored"),
        ItemType::RobotMedicine | ItemType::Key => {
            Delivery::Stored(BunkerCategory::Technology, None, "stored")
        }
    }
}

/// Hand everything over to the bunker and reset at the start room.
pub fn handle_return_to_bunker(out: &mut Output, world: &World, store: &mut Store) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }

    let rules = &world.rules;
    let cargo: Vec<ItemRecord> = store.inventory().into_iter().cloned().collect();

    out.title("🏠 **RETURNING TO BUNKER**");
    out.say("📡 obot-3 initiating return protocol...\n🚁 Uploading collected data to bunker systems...");

    let mut lines = Vec::new();
    for item in &cargo {
        match classify(item.kind, item.yields, item.value) {
            Delivery::Resource(resource, days) => {
                store.add_bunker_resource(resource, days);
                lines.push(format!(
                    "  ✅ {} → {} days of {} added to life support",
                    item.name,
                    days,
                    resource.as_str()
                ));
            }
            Delivery::Stored(category, survival_days, note) => {
                store.add_to_bunker(BunkerItem {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    quantity: 1,
                    category,
                    desc: item.desc.clone(),
                    survival_days,
                    origin: Some(ItemOrigin {
                        kind: item.kind,
                        weight: item.weight,
                        value: item.value,
                        energy_cost: item.energy_cost,
                    }),
                });
                lines.push(format!(
                    "  📦 {} → {} in bunker {} storage",
                    item.name,
                    note,
                    category.as_str()
                ));
            }
        }
        store.delete_item(&item.id)?;
    }

    if lines.is_empty() {
        out.say("📦 No items to transfer from obot-3's inventory.");
    } else {
        out.say(format!(
            "📦 **TRANSFERRING ITEMS TO BUNKER STORAGE:**\n{}",
            lines.join("\n")
        ));
    }

    let decontaminated = store.remove_persistent_effects();
    let state = store.state_mut();
    state.current_room = rules.start_room.clone();
    state.carrying_weight = 0.0;
    state.in_combat = false;
    state.turn_number += rules.return_trip_turns;
    info!(items = cargo.len(), decontaminated, "returned to bunker");

    if decontaminated > 0 {
        out.event("🧼 Decontamination cycle complete - attached organisms scrubbed from obot-3's frame.");
    }

    let s = store.state();
    let r = s.resources;
    out.say(format!(
        "🤖 I have returned safely to the bunker and delivered all supplies.\n⏰ **Day {} After the Incident**\n📊 **Life Support Status:** Food: {}d | Water: {}d | Energy: {}d",
        s.days_since_incident, r.food, r.water, r.energy
    ));
    if r.min() <= 2 {
        out.event(format!(
            "🚨 **WARNING:** Critical resources running low! Only {} days remaining.",
            r.min()
        ));
    }
    out.say("Commander, use 'bunker_status' for detailed supplies or 'explore' to begin another sweep.");
    Ok(())
}

//////////////
/// STATUS ///
//////////////

pub fn handle_bunker_status(out: &mut Output, store: &Store) {
    let s = store.state();
    let r = s.resources;

    out.title("🏠 **BUNKER STATUS REPORT**");
    out.say(format!(
        "📅 **Day {} After the Incident**\n\n**CRITICAL LIFE SUPPORT RESOURCES:**\n🍞 Food: {} days remaining\n💧 Water: {} days remaining\n⚡ Energy: {} days remaining",
        s.days_since_incident, r.food, r.water, r.energy
    ));

    let min = r.min();
    out.say(match min {
        m if m <= 0 => "🚨 **CRITICAL FAILURE:** Life support systems offline! You must find resources immediately!".to_string(),
        m if m <= 2 => format!("🚨 **CRITICAL:** Only {m} days of life support remaining!"),
        m if m <= 5 => format!("⚠️  **WARNING:** Only {m} days until resource depletion."),
        m => format!("✅ **STATUS:** {m} days of life support available."),
    });

    let stored_food: u32 = store
        .bunker_in(BunkerCategory::Food)
        .iter()
        .filter_map(|b| b.survival_days.map(|d| d * b.quantity))
        .sum();
    if stored_food > 0 {
        out.say(format!(
            "📦 **Additional Supplies:** {stored_food} days of stored food"
        ));
    }

    let items = store.bunker_items();
    let mut current: Option<BunkerCategory> = None;
    let mut section = String::new();
    for item in items {
        if current != Some(item.category) {
            if !section.is_empty() {
                out.say(std::mem::take(&mut section));
            }
            current = Some(item.category);
            section.push_str(item.category.heading());
        }
        let each = item
            .survival_days
            .map(|d| format!(" ({d} days each)"))
            .unwrap_or_default();
        section.push_str(&format!("\n  • {} x{}{}", item.name, item.quantity, each));
    }
    if !section.is_empty() {
        out.say(section);
    }

    out.say(if stored_food < 7 {
        "🚨 **CRITICAL**: Food supplies critically low! Survival time less than one week."
    } else if stored_food < 14 {
        "⚠️  **WARNING**: Food supplies running low. Consider prioritizing food collection."
    } else {
        "✅ **STATUS**: Bunker supplies adequate for sustained survival."
    });
}

//////////////
/// WATER ///
//////////////

pub fn handle_purify_water(out: &mut Output, world: &World, store: &mut Store) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }
    let is = |b: &BunkerItem, kind: ItemType, id_part: &str| {
        b.quantity > 0
            && (b.origin.as_ref().is_some_and(|o| o.kind == kind) || b.id.contains(id_part))
    };

    let raw = store
        .bunker_items()
        .into_iter()
        .find(|&b| is(b, ItemType::RawWater, "raw_water"))
        .cloned();
    let Some(raw) = raw else {
        out.say("🚫 **No raw water available for purification**\n\nCommander, I don't detect any contaminated water in bunker storage that needs purification. You'll need to collect some raw water first.");
        return Ok(());
    };

    let purifier = store
        .bunker_items()
        .into_iter()
        .find(|&b| is(b, ItemType::WaterPurifier, "water_purifier"))
        .cloned();
    let Some(purifier) = purifier else {
        out.say("🚫 **No purification tablets available**\n\nCommander, I don't have any water purification tablets in bunker storage. You'll need to find some purification supplies first.");
        return Ok(());
    };

    let days = world.rules.purify_yield;
    store.remove_bunker_item(&raw.id, 1)?;
    store.remove_bunker_item(&purifier.id, 1)?;
    store.add_bunker_resource(Resource::Water, days);
    info!(days, "water purified");

    out.title("💧 **Water Purification Complete**");
    out.say(format!(
        "✅ Used 1 {} to purify {}\n\n🚰 **Result:** +{} days of clean drinking water added to life support\n\n📊 **Resources Used:**\n  • {}: 1 unit ({} remaining)\n  • {}: 1 tablet ({} remaining)",
        purifier.name,
        raw.name,
        days,
        raw.name,
        raw.quantity - 1,
        purifier.name,
        purifier.quantity - 1
    ));
    Ok(())
}

/////////////
/// REST ///
/////////////

/// Overnight recharge at the bunker: one day passes, energy is full again.
pub fn handle_rest_and_recharge(out: &mut Output, world: &World, store: &mut Store) {
    if !require_mission(out, store) {
        return;
    }
    let here = store.state().current_room.clone();
    if !world.is_bunker_room(&here) {
        out.say(format!(
            "🚫 **Cannot rest here** - I can only rest and recharge at the bunker.\n\nCurrent location: {}",
            world.room_name(&here)
        ));
        return;
    }

    let (energy, max) = (store.state().energy, store.state().max_energy);
    if energy >= max {
        out.say(format!(
            "🔋 **Energy Already Full** - Current Energy: {energy}/{max}\n\nCommander, my power reserves are already at maximum capacity. No recharging needed at this time."
        ));
        return;
    }

    store.advance_day(1);
    store.state_mut().energy = max;

    let s = store.state();
    let r = s.resources;
    out.title("🛌 **OVERNIGHT RECHARGE COMPLETE**");
    out.say(format!(
        "**RECHARGE REPORT:**\n- Energy: {energy} → {max}/{max} (fully recharged)\n- Time advanced: 1 day\n- Days since incident: {}\n\n**BUNKER LIFE SUPPORT STATUS:**\n- Food: {} days remaining\n- Water: {} days remaining\n- Energy: {} days remaining",
        s.days_since_incident, r.food, r.water, r.energy
    ));

    let min = r.min();
    if min <= 2 {
        out.event(format!(
            "🚨 **CRITICAL WARNING**: Bunker life support critically low! Only {min} days remaining before system failure."
        ));
    } else if min <= 5 {
        out.event(
            "⚠️  **WARNING**: Bunker resources running low. Consider prioritizing supply collection.",
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestLength {
    Short,
    Long,
}

impl RestLength {
    pub fn parse(s: &str) -> Option<RestLength> {
        match s.trim().to_lowercase().as_str() {
            "short" => Some(RestLength::Short),
            "long" => Some(RestLength::Long),
            _ => None,
        }
    }
}

/// Power-saving rest in the field. Not possible with hostiles in the room.
pub fn handle_rest(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    length: RestLength,
) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }
    let here = store.state().current_room.clone();
    if !store.mobs_in(&here).is_empty() {
        out.say("🚫 Cannot rest - hostiles are present!");
        return Ok(());
    }

    let rules = &world.rules;
    let missing = (store.state().max_energy - store.state().energy).max(0);
    let (restored, turns) = match length {
        RestLength::Short => (missing.min(rules.short_rest_energy), rules.short_rest_turns),
        RestLength::Long => (missing, rules.long_rest_turns),
    };

    store.state_mut().energy += restored;
    advance_turns(store, turns);
    out.say(format!(
        "😴 obot-3 enters power-saving mode and restores {restored} energy over {turns} turns."
    ));
    tick_effects(out, world, store)
}

/////////////
/// EQUIP ///
/////////////

fn equippable(b: &BunkerItem) -> bool {
    matches!(
        b.category,
        BunkerCategory::Defense | BunkerCategory::Technology
    )
}

/// List bunker equipment, or take one unit of `name` back into the inventory.
pub fn handle_equip_from_bunker(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    name: Option<&str>,
) -> Result<()> {
    if !require_mission(out, store) {
        return Ok(());
    }
    let here = store.state().current_room.clone();
    if !world.is_bunker_room(&here) {
        out.say(format!(
            "🚫 **Cannot access bunker storage** - I must be at the bunker to retrieve equipment.\n\nCurrent location: {}",
            world.room_name(&here)
        ));
        return Ok(());
    }

    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        list_equipment(out, store);
        return Ok(());
    };

    let stock: Vec<&BunkerItem> = store
        .bunker_items()
        .into_iter()
        .filter(|b| equippable(b))
        .collect();
    let Some(entry) = find_by_name(stock, name, |b| b.name.as_str()).cloned() else {
        out.say(format!(
            "🚫 **Equipment not found** - \"{name}\" is not available in bunker storage.\n\nUse 'equip_from_bunker' without parameters to see available equipment."
        ));
        return Ok(());
    };

    // starting supplies have no field origin; treat them as light generic gear
    let origin = entry.origin.clone().unwrap_or(ItemOrigin {
        kind: if entry.category == BunkerCategory::Defense {
            ItemType::Weapon
        } else {
            ItemType::Tool
        },
        weight: 2.0,
        value: 5,
        energy_cost: 0,
    });

    let carried = store.carrying_weight();
    if carried + origin.weight >= world.rules.carry_capacity {
        out.say(format!(
            "⚖️ **Weight limit** - Cannot carry {}. Current weight: {:.1}/{:.1} lbs\n\nDrop some items first or deploy with lighter load.",
            entry.name, carried, world.rules.carry_capacity
        ));
        return Ok(());
    }

    store.remove_bunker_item(&entry.id, 1)?;
    store.insert_item(ItemRecord {
        id: entry.id.clone(),
        name: entry.name.clone(),
        desc: entry.desc.clone(),
        weight: origin.weight,
        kind: origin.kind,
        value: origin.value,
        energy_cost: origin.energy_cost,
        location: ItemLocation::Inventory,
        yields: Yields::default(),
    });
    let weight = store.carrying_weight();
    store.state_mut().carrying_weight = weight;
    info!(item = %entry.id, "equipped from bunker");

    out.say(format!(
        "✅ **Equipment Retrieved:** {}\n\n🎒 The {} has been equipped and is ready for deployment.\n\n⚖️ **Weight:** {:.1}/{:.1} lbs",
        entry.name, entry.name, weight, world.rules.carry_capacity
    ));
    Ok(())
}

fn list_equipment(out: &mut Output, store: &Store) {
    out.title("🔧 **BUNKER EQUIPMENT STORAGE**");

    let mut any = false;
    for (category, heading) in [
        (BunkerCategory::Defense, "⚔️ **Available Weapons & Tools:**"),
        (BunkerCategory::Technology, "🛠️ **Available Technology:**"),
    ] {
        let items = store.bunker_in(category);
        if items.is_empty() {
            continue;
        }
        any = true;
        let mut s = String::from(heading);
        for item in items {
            s.push_str(&format!("\n  • {} (Qty: {})", item.name, item.quantity));
        }
        out.say(s);
    }

    if !any {
        out.say("📦 No weapons or tools currently in storage.");
    }
    out.say("💡 **Usage:** Use 'equip_from_bunker' with specific item name to retrieve equipment.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EffectType, PERSISTENT};
    use crate::world::default_world;

    fn started() -> (World, Store) {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        store.state_mut().mission_started = true;
        (world, store)
    }

    fn carry(store: &mut Store, ids: &[&str]) {
        for id in ids {
            store.move_item(id, ItemLocation::Inventory).expect("item");
        }
    }

    #[test]
    fn return_converts_and_files_cargo() {
        let (world, mut store) = started();
        store.state_mut().current_room = "HALLWAY_B4".into();
        carry(
            &mut store,
            &["funyuns_001", "combat_knife_001", "heating_oil_001", "raw_water_001"],
        );

        let mut out = Output::new();
        handle_return_to_bunker(&mut out, &world, &mut store).expect("return");

        let s = store.state();
        assert_eq!(s.resources.food, 7 + 4);
        assert_eq!(s.current_room, world.rules.start_room);
        assert_eq!(s.carrying_weight, 0.0);
        assert_eq!(s.turn_number, 1 + world.rules.return_trip_turns);
        assert!(store.inventory().is_empty());
        assert!(store.item("funyuns_001").is_err());

        let knife = store.bunker_item("combat_knife_001").expect("knife");
        assert_eq!(knife.category, BunkerCategory::Defense);
        let oil = store.bunker_item("heating_oil_001").expect("oil");
        assert_eq!(oil.category, BunkerCategory::Material);
        assert_eq!(oil.survival_days, Some(10));
        assert!(out.contains("not compatible with fuel cell generator"));
    }

    #[test]
    fn return_scrubs_persistent_effects_only() {
        let (world, mut store) = started();
        store.add_effect(EffectType::Attached, "bugs", PERSISTENT, 1);
        store.add_effect(EffectType::AcidBurn, "acid", 2, 1);

        let mut out = Output::new();
        handle_return_to_bunker(&mut out, &world, &mut store).expect("return");
        assert_eq!(store.effects().len(), 1);
        assert!(out.contains("Decontamination"));
    }

    #[test]
    fn purify_without_raw_water_changes_nothing() {
        let (world, mut store) = started();
        let before = store.state().resources;
        let mut out = Output::new();
        handle_purify_water(&mut out, &world, &mut store).expect("purify");
        assert!(out.contains("No raw water available"));
        assert_eq!(store.state().resources, before);
    }

    #[test]
    fn purify_consumes_one_of_each() {
        let (world, mut store) = started();
        carry(&mut store, &["raw_water_001", "water_purifier_001"]);
        let mut out = Output::new();
        handle_return_to_bunker(&mut out, &world, &mut store).expect("return");

        let mut out = Output::new();
        handle_purify_water(&mut out, &world, &mut store).expect("purify");
        assert_eq!(store.state().resources.water, 10 + 6);
        assert!(store.bunker_item("raw_water_001").is_none());
        assert!(store.bunker_item("water_purifier_001").is_none());

        let mut out = Output::new();
        handle_purify_water(&mut out, &world, &mut store).expect("purify");
        assert!(out.contains("No raw water available"));
    }

    #[test]
    fn recharge_only_at_bunker_and_when_drained() {
        let (world, mut store) = started();
        let mut out = Output::new();
        handle_rest_and_recharge(&mut out, &world, &mut store);
        assert!(out.contains("Energy Already Full"));
        assert_eq!(store.state().days_since_incident, 12);

        store.state_mut().energy = 30;
        let mut out = Output::new();
        handle_rest_and_recharge(&mut out, &world, &mut store);
        assert_eq!(store.state().energy, 100);
        assert_eq!(store.state().days_since_incident, 13);

        store.state_mut().energy = 30;
        store.state_mut().current_room = "HALLWAY_B8".into();
        let mut out = Output::new();
        handle_rest_and_recharge(&mut out, &world, &mut store);
        assert!(out.contains("Cannot rest here"));
        assert_eq!(store.state().energy, 30);
    }

    #[test]
    fn bunker_services_wait_for_activation() {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        store.state_mut().energy = 30;
        let before = store.tables().clone();

        let mut out = Output::new();
        handle_rest_and_recharge(&mut out, &world, &mut store);
        handle_purify_water(&mut out, &world, &mut store).expect("purify");
        handle_equip_from_bunker(&mut out, &world, &mut store, Some("knife")).expect("equip");

        assert_eq!(out.to_text().matches("not yet activated").count(), 3);
        assert_eq!(store.state().days_since_incident, 12);
        assert_eq!(store.state(), &before.state);
        assert_eq!(store.tables().bunker, before.bunker);
    }

    #[test]
    fn field_rest() {
        let (world, mut store) = started();
        store.state_mut().energy = 50;
        let mut out = Output::new();
        handle_rest(&mut out, &world, &mut store, RestLength::Short).expect("rest");
        assert_eq!(store.state().energy, 70);
        assert_eq!(store.state().turn_number, 4);

        handle_rest(&mut out, &world, &mut store, RestLength::Long).expect("rest");
        assert_eq!(store.state().energy, 100);

        store.state_mut().current_room = "STORAGE_8".into();
        store.state_mut().energy = 50;
        let mut out = Output::new();
        handle_rest(&mut out, &world, &mut store, RestLength::Long).expect("rest");
        assert!(out.contains("hostiles are present"));
        assert_eq!(store.state().energy, 50);
    }

    #[test]
    fn equip_round_trip() {
        let (world, mut store) = started();
        carry(&mut store, &["combat_knife_001"]);
        let mut out = Output::new();
        handle_return_to_bunker(&mut out, &world, &mut store).expect("return");

        let mut out = Output::new();
        handle_equip_from_bunker(&mut out, &world, &mut store, None).expect("list");
        assert!(out.contains("Tactical Combat Knife (Qty: 1)"));

        let mut out = Output::new();
        handle_equip_from_bunker(&mut out, &world, &mut store, Some("knife")).expect("equip");
        let knife = store.item("combat_knife_001").expect("back in inventory");
        assert_eq!(knife.kind, ItemType::Weapon);
        assert_eq!(knife.value, 12);
        assert!(store.bunker_item("combat_knife_001").is_none());
    }
}
