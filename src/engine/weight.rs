use tracing::debug;

use crate::engine::output::Output;
use crate::engine::rng::Chance;
use crate::error::Result;
use crate::store::{ItemLocation, Store};
use crate::world::World;

/// Recompute the carried load and let the servos shed items when it gets too heavy.
///
/// At capacity everything drops; in the critical and heavy bands a single random
/// item may slip. Dropped items land in the current room.
pub fn enforce_weight_limits(
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
) -> Result<()> {
    let rules = &world.rules;
    let weight = store.carrying_weight();
    let room = store.state().current_room.clone();

    if weight >= rules.carry_capacity {
        let ids: Vec<String> = store.inventory().iter().map(|i| i.id.clone()).collect();
        for id in &ids {
            store.move_item(id, ItemLocation::Room(room.clone()))?;
        }
        debug!(weight, dropped = ids.len(), "overload, dropping everything");
        out.event("🚨 CRITICAL: obot-3 becomes unstable and drops all items!");
    } else if weight >= rules.critical_load {
        if rng.chance(rules.critical_drop_chance) {
            let name = drop_random(store, rng, &room)?;
            out.event(format!(
                "⚠️  obot-3 struggles with the weight and drops {name}"
            ));
        }
    } else if weight >= rules.heavy_load && rng.chance(rules.heavy_drop_chance) {
        let name = drop_random(store, rng, &room)?;
        out.event(format!(
            "⚠️  obot-3's servos strain and accidentally drops {name}"
        ));
    }

    store.state_mut().carrying_weight = store.carrying_weight();
    Ok(())
}

fn drop_random(store: &mut Store, rng: &mut dyn Chance, room: &str) -> Result<String> {
    let inventory = store.inventory();
    let picked = inventory[rng.pick(inventory.len())];
    let (id, name) = (picked.id.clone(), picked.name.clone());
    store.move_item(&id, ItemLocation::Room(room.to_string()))?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::ScriptedChance;
    use crate::world::default_world;

    fn carry(store: &mut Store, ids: &[&str]) {
        for id in ids {
            store.move_item(id, ItemLocation::Inventory).expect("item");
        }
    }

    #[test]
    fn light_load_is_untouched() {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        carry(&mut store, &["funyuns_001"]);
        let mut out = Output::new();
        // a draw that would trigger any band check
        let mut rng = ScriptedChance::new().with_draws([0.0, 0.0]);
        enforce_weight_limits(&mut out, &world, &mut store, &mut rng).expect("ok");
        assert!(out.is_empty());
        assert_eq!(store.inventory().len(), 1);
        assert!(store.state().carrying_weight > 0.0);
    }

    #[test]
    fn overload_drops_everything() {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        // 18.4 + 12.7
        carry(&mut store, &["metal_scraps_001", "building_parts_001"]);
        let mut out = Output::new();
        let mut rng = ScriptedChance::new();
        enforce_weight_limits(&mut out, &world, &mut store, &mut rng).expect("ok");
        assert!(out.contains("drops all items"));
        assert!(store.inventory().is_empty());
        assert_eq!(store.state().carrying_weight, 0.0);
        let here = store.state().current_room.clone();
        let on_floor = store.items_in_room(&here);
        for id in ["metal_scraps_001", "building_parts_001"] {
            assert!(on_floor.iter().any(|i| i.id == id), "{id} not dropped");
        }
    }

    #[test]
    fn heavy_band_slips_on_a_low_draw() {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        // 18.4 + 1.8
        carry(&mut store, &["metal_scraps_001", "combat_knife_001"]);
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_draws([0.1, 0.0]);
        enforce_weight_limits(&mut out, &world, &mut store, &mut rng).expect("ok");
        assert!(out.contains("servos strain"));
        assert_eq!(store.inventory().len(), 1);
        let here = store.state().current_room.clone();
        let dropped = store
            .items_in_room(&here)
            .iter()
            .filter(|i| i.id == "metal_scraps_001" || i.id == "combat_knife_001")
            .count();
        assert_eq!(dropped, 1);
    }

    #[test]
    fn heavy_band_holds_on_a_high_draw() {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        carry(&mut store, &["metal_scraps_001", "combat_knife_001"]);
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_draws([0.2]);
        enforce_weight_limits(&mut out, &world, &mut store, &mut rng).expect("ok");
        assert!(out.is_empty());
        assert_eq!(store.inventory().len(), 2);
        assert!((store.state().carrying_weight - 20.2).abs() < 1e-9);
    }

    #[test]
    fn critical_band_drops_one_on_a_hit() {
        let world = default_world().expect("catalog");
        let mut store = Store::new(&world);
        // 15.8 + 9.5
        carry(&mut store, &["record_collection_001", "raw_water_001"]);
        let mut out = Output::new();
        let mut rng = ScriptedChance::new().with_draws([0.1, 0.0]);
        enforce_weight_limits(&mut out, &world, &mut store, &mut rng).expect("ok");
        assert!(out.contains("struggles with the weight"));
        assert_eq!(store.inventory().len(), 1);
    }
}
