//! Persistent state store.
//!
//! All mutable game data lives in [`Tables`], seeded from the [`World`] catalog and
//! written to a single versioned JSON save file. The engine only talks to the store
//! through the methods below; it never holds rows across a command.

mod records;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GameError, Result};
use crate::world::{BunkerCategory, ContentKind, World};

pub use records::{
    BunkerItem, CombatEffect, DiscoveredContent, EffectType, GameState, ItemLocation, ItemOrigin,
    ItemRecord, MobRecord, PERSISTENT, Resource, Resources, RoomRecord,
};

const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tables {
    pub state: GameState,
    pub rooms: IndexMap<String, RoomRecord>,
    pub items: IndexMap<String, ItemRecord>,
    pub mobs: IndexMap<String, MobRecord>,
    pub effects: Vec<CombatEffect>,
    pub bunker: Vec<BunkerItem>,
    pub discovered: IndexMap<String, DiscoveredContent>,
    next_id: u64,
}

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    world_id: String,
    tables: Tables,
}

pub struct Store {
    tables: Tables,
    world_id: String,
    path: Option<PathBuf>,
}

impl Tables {
    /// Fresh tables for a new game.
    pub fn seed(world: &World) -> Self {
        let rules = &world.rules;

        let state = GameState {
            current_room: rules.start_room.clone(),
            health: rules.max_health,
            energy: rules.start_energy,
            max_energy: rules.start_energy,
            carrying_weight: 0.0,
            turn_number: 1,
            mission_started: false,
            game_completed: false,
            in_combat: false,
            days_since_incident: rules.start_day,
            resources: Resources {
                food: rules.start_food,
                water: rules.start_water,
                energy: rules.start_energy_days,
            },
        };

        let rooms = world
            .rooms
            .values()
            .map(|r| {
                let exits = r
                    .exits
                    .iter()
                    .map(|e| (e.direction.clone(), e.target.clone()))
                    .collect();
                let record = RoomRecord {
                    id: r.id.clone(),
                    discovered: false,
                    // bunker rooms are safe from the start
                    cleared: world.is_bunker_room(&r.id),
                    obstacle_cleared: false,
                    exits,
                };
                (r.id.clone(), record)
            })
            .collect();

        let items = world
            .items
            .values()
            .map(|i| {
                let record = ItemRecord {
                    id: i.id.clone(),
                    name: i.name.clone(),
                    desc: i.desc.clone(),
                    weight: i.weight,
                    kind: i.kind,
                    value: i.value,
                    energy_cost: i.energy_cost,
                    location: ItemLocation::Room(i.start_room.clone()),
                    yields: i.yields,
                };
                (i.id.clone(), record)
            })
            .collect();

        let mobs = world
            .mobs
            .values()
            .map(|m| {
                let record = MobRecord {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    desc: m.desc.clone(),
                    health: m.health,
                    max_health: m.health,
                    damage: m.damage.clone(),
                    damage_type: m.damage_type.clone(),
                    location: m.location.clone(),
                    is_alive: true,
                    special: m.special.clone(),
                    detect_chance: m.detect_chance,
                    combat_style: m.combat_style.clone(),
                };
                (m.id.clone(), record)
            })
            .collect();

        let bunker = rules
            .bunker_supplies
            .iter()
            .map(|s| BunkerItem {
                id: s.id.clone(),
                name: s.name.clone(),
                quantity: s.quantity,
                category: s.category,
                desc: s.desc.clone(),
                survival_days: s.survival_days,
                origin: None,
            })
            .collect();

        Tables {
            state,
            rooms,
            items,
            mobs,
            effects: Vec::new(),
            bunker,
            discovered: IndexMap::new(),
            next_id: 1,
        }
    }
}

impl Store {
    /// In-memory store; `save` is a no-op.
    pub fn new(world: &World) -> Self {
        Store {
            tables: Tables::seed(world),
            world_id: world.id.clone(),
            path: None,
        }
    }

    /// Load the save at `path`, or seed a new game there if none exists.
    pub fn open(path: impl AsRef<Path>, world: &World) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            info!(path = %path.display(), "no save file, starting a new game");
            let store = Store {
                tables: Tables::seed(world),
                world_id: world.id.clone(),
                path: Some(path),
            };
            store.save()?;
            return Ok(store);
        }

        let contents = fs::read_to_string(&path)?;
        let data: SaveData = serde_json::from_str(&contents)?;

        if data.version != SAVE_VERSION {
            return Err(GameError::UnsupportedSaveVersion {
                found: data.version,
                expected: SAVE_VERSION,
            });
        }
        if data.world_id != world.id {
            return Err(GameError::InvalidWorld(format!(
                "save file belongs to world '{}', not '{}'",
                data.world_id, world.id
            )));
        }

        debug!(path = %path.display(), turn = data.tables.state.turn_number, "save loaded");
        Ok(Store {
            tables: data.tables,
            world_id: data.world_id,
            path: Some(path),
        })
    }

    /// Write the save file atomically (temp file + rename).
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let data = SaveData {
            version: SAVE_VERSION,
            world_id: self.world_id.clone(),
            tables: self.tables.clone(),
        };
        let json = serde_json::to_string_pretty(&data)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "save written");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reseed every table from the catalog.
    pub fn reset(&mut self, world: &World) {
        self.tables = Tables::seed(world);
        self.world_id = world.id.clone();
    }

    /// Run `f` against the store; an `Err` restores every table to its prior contents.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Store) -> Result<T>) -> Result<T> {
        let snapshot = self.tables.clone();
        match f(self) {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!(error = %e, "rolling back store transaction");
                self.tables = snapshot;
                Err(e)
            }
        }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let n = self.tables.next_id;
        self.tables.next_id += 1;
        format!("{prefix}_{n}")
    }

    //////////////////
    /// GAME STATE ///
    //////////////////

    pub fn state(&self) -> &GameState {
        &self.tables.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.tables.state
    }

    /////////////
    /// ROOMS ///
    /////////////

    pub fn room(&self, id: &str) -> Result<&RoomRecord> {
        self.tables
            .rooms
            .get(id)
            .ok_or_else(|| GameError::UnknownRoom(id.to_string()))
    }

    fn room_mut(&mut self, id: &str) -> Result<&mut RoomRecord> {
        self.tables
            .rooms
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownRoom(id.to_string()))
    }

    pub fn discover_room(&mut self, id: &str) -> Result<()> {
        self.room_mut(id)?.discovered = true;
        Ok(())
    }

    /// Delete the room's mobs and mark it cleared, all or nothing.
    pub fn clear_room(&mut self, id: &str) -> Result<()> {
        self.transaction(|store| {
            store.room_mut(id)?.cleared = true;
            store.tables.mobs.retain(|_, m| m.location != id);
            Ok(())
        })
    }

    pub fn clear_obstacle(&mut self, id: &str) -> Result<()> {
        self.room_mut(id)?.obstacle_cleared = true;
        Ok(())
    }

    pub fn set_room_exit(&mut self, id: &str, direction: &str, target: &str) -> Result<()> {
        if !self.tables.rooms.contains_key(target) {
            return Err(GameError::UnknownRoom(target.to_string()));
        }
        self.room_mut(id)?
            .exits
            .insert(direction.to_string(), target.to_string());
        Ok(())
    }

    /////////////
    /// ITEMS ///
    /////////////

    pub fn item(&self, id: &str) -> Result<&ItemRecord> {
        self.tables
            .items
            .get(id)
            .ok_or_else(|| GameError::UnknownItem(id.to_string()))
    }

    pub fn items_in_room(&self, room_id: &str) -> Vec<&ItemRecord> {
        self.tables
            .items
            .values()
            .filter(|i| i.location.is_in_room(room_id))
            .collect()
    }

    pub fn inventory(&self) -> Vec<&ItemRecord> {
        self.tables
            .items
            .values()
            .filter(|i| i.location == ItemLocation::Inventory)
            .collect()
    }

    pub fn has_in_inventory(&self, item_id: &str) -> bool {
        self.tables
            .items
            .get(item_id)
            .is_some_and(|i| i.location == ItemLocation::Inventory)
    }

    /// Sum of the weights of everything in the inventory.
    pub fn carrying_weight(&self) -> f64 {
        self.inventory().iter().map(|i| i.weight).sum()
    }

    pub fn move_item(&mut self, id: &str, location: ItemLocation) -> Result<()> {
        let item = self
            .tables
            .items
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownItem(id.to_string()))?;
        item.location = location;
        Ok(())
    }

    pub fn delete_item(&mut self, id: &str) -> Result<ItemRecord> {
        self.tables
            .items
            .shift_remove(id)
            .ok_or_else(|| GameError::UnknownItem(id.to_string()))
    }

    /// Add an item row. Keeps `item.id` if it's free, otherwise generates one from it.
    pub fn insert_item(&mut self, mut item: ItemRecord) -> String {
        if self.tables.items.contains_key(&item.id) {
            item.id = self.next_id(&item.id);
        }
        let id = item.id.clone();
        self.tables.items.insert(id.clone(), item);
        id
    }

    ////////////
    /// MOBS ///
    ////////////

    pub fn mob(&self, id: &str) -> Result<&MobRecord> {
        self.tables
            .mobs
            .get(id)
            .ok_or_else(|| GameError::UnknownMob(id.to_string()))
    }

    /// Living mobs in a room.
    pub fn mobs_in(&self, room_id: &str) -> Vec<&MobRecord> {
        self.tables
            .mobs
            .values()
            .filter(|m| m.is_alive && m.location == room_id)
            .collect()
    }

    pub fn update_mob_health(&mut self, id: &str, health: i32) -> Result<()> {
        let mob = self
            .tables
            .mobs
            .get_mut(id)
            .ok_or_else(|| GameError::UnknownMob(id.to_string()))?;
        mob.health = health.clamp(0, mob.max_health);
        mob.is_alive = mob.health > 0;
        Ok(())
    }

    ///////////////
    /// EFFECTS ///
    ///////////////

    pub fn effects(&self) -> &[CombatEffect] {
        &self.tables.effects
    }

    pub fn add_effect(&mut self, kind: EffectType, desc: &str, duration: i32, damage: i32) -> String {
        let id = self.next_id(kind.as_str());
        self.tables.effects.push(CombatEffect {
            id: id.clone(),
            kind,
            desc: desc.to_string(),
            duration,
            damage,
        });
        id
    }

    /// Update an effect's remaining turns; at zero or below the effect is deleted.
    /// Persistent effects are left alone unless `duration` is zero.
    pub fn set_effect_duration(&mut self, id: &str, duration: i32) {
        if duration == 0 || (duration < 0 && duration != PERSISTENT) {
            self.tables.effects.retain(|e| e.id != id);
        } else if let Some(e) = self.tables.effects.iter_mut().find(|e| e.id == id) {
            e.duration = duration;
        }
    }

    pub fn clear_effects(&mut self) {
        self.tables.effects.clear();
    }

    /// Remove every persistent effect; returns how many were removed.
    pub fn remove_persistent_effects(&mut self) -> usize {
        let before = self.tables.effects.len();
        self.tables.effects.retain(|e| !e.is_persistent());
        before - self.tables.effects.len()
    }

    //////////////
    /// BUNKER ///
    //////////////

    /// Bunker stock ordered by category, then name.
    pub fn bunker_items(&self) -> Vec<&BunkerItem> {
        let mut items: Vec<&BunkerItem> = self.tables.bunker.iter().collect();
        items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        items
    }

    pub fn bunker_item(&self, id: &str) -> Option<&BunkerItem> {
        self.tables.bunker.iter().find(|b| b.id == id)
    }

    /// File stock in the bunker. Repeat deliveries of the same name stack.
    pub fn add_to_bunker(&mut self, item: BunkerItem) {
        if let Some(existing) = self
            .tables
            .bunker
            .iter_mut()
            .find(|b| b.name.eq_ignore_ascii_case(&item.name))
        {
            existing.quantity += item.quantity;
            if existing.origin.is_none() {
                existing.origin = item.origin;
            }
            return;
        }
        self.tables.bunker.push(item);
    }

    /// Take `quantity` units out of the bunker; the row goes away at zero.
    pub fn remove_bunker_item(&mut self, id: &str, quantity: u32) -> Result<()> {
        let pos = self
            .tables
            .bunker
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| GameError::UnknownItem(id.to_string()))?;

        let entry = &mut self.tables.bunker[pos];
        entry.quantity = entry.quantity.saturating_sub(quantity);
        if entry.quantity == 0 {
            self.tables.bunker.remove(pos);
        }
        Ok(())
    }

    pub fn bunker_in(&self, category: BunkerCategory) -> Vec<&BunkerItem> {
        self.bunker_items()
            .into_iter()
            .filter(|b| b.category == category)
            .collect()
    }

    pub fn add_bunker_resource(&mut self, resource: Resource, days: i32) {
        *self.tables.state.resources.get_mut(resource) += days;
    }

    /// Consume `days` of every resource (floored at zero) and move the calendar on.
    pub fn advance_day(&mut self, days: u32) {
        let state = &mut self.tables.state;
        let n = days as i32;
        state.resources.food = (state.resources.food - n).max(0);
        state.resources.water = (state.resources.water - n).max(0);
        state.resources.energy = (state.resources.energy - n).max(0);
        state.days_since_incident += days;
        info!(days, day = state.days_since_incident, "days advanced");
    }

    /////////////////////////
    /// DISCOVERED CONTENT ///
    /////////////////////////

    /// Record a lore file. Returns false if `id` was already discovered.
    pub fn discover_content(
        &mut self,
        id: &str,
        kind: ContentKind,
        title: &str,
        body: &str,
        source_item: &str,
    ) -> bool {
        if self.tables.discovered.contains_key(id) {
            return false;
        }
        self.tables.discovered.insert(
            id.to_string(),
            DiscoveredContent {
                id: id.to_string(),
                kind,
                title: title.to_string(),
                body: body.to_string(),
                discovered_at: Utc::now(),
                source_item: source_item.to_string(),
            },
        );
        true
    }

    pub fn discovered(&self) -> impl Iterator<Item = &DiscoveredContent> {
        self.tables.discovered.values()
    }
}
