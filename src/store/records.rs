//! Rows held by the [`Store`](super::Store).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::world::{BunkerCategory, ContentKind, ItemType, SpecialAbility, Yields};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub current_room: String,
    pub health: i32,
    pub energy: i32,
    pub max_energy: i32,
    pub carrying_weight: f64,
    pub turn_number: u32,
    pub mission_started: bool,
    pub game_completed: bool,
    pub in_combat: bool,
    pub days_since_incident: u32,
    pub resources: Resources,
}

/// Bunker life support, in days remaining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub food: i32,
    pub water: i32,
    pub energy: i32,
}

impl Resources {
    pub fn min(&self) -> i32 {
        self.food.min(self.water).min(self.energy)
    }

    pub fn get_mut(&mut self, resource: Resource) -> &mut i32 {
        match resource {
            Resource::Food => &mut self.food,
            Resource::Water => &mut self.water,
            Resource::Energy => &mut self.energy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Food,
    Water,
    Energy,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Food => "food",
            Resource::Water => "water",
            Resource::Energy => "energy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: String,
    pub discovered: bool,
    pub cleared: bool,
    /// Set once an `interact <obstacle> move` has cleared a `blocked_by` requirement.
    pub obstacle_cleared: bool,
    /// direction -> room id; torch cuts add entries at runtime.
    pub exits: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "at", content = "room", rename_all = "snake_case")]
pub enum ItemLocation {
    Room(String),
    Inventory,
    Consumed,
}

impl ItemLocation {
    pub fn is_in_room(&self, room_id: &str) -> bool {
        matches!(self, ItemLocation::Room(r) if r == room_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub weight: f64,
    pub kind: ItemType,
    pub value: i32,
    pub energy_cost: i32,
    pub location: ItemLocation,
    pub yields: Yields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobRecord {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub health: i32,
    pub max_health: i32,
    pub damage: String,
    pub damage_type: String,
    pub location: String,
    pub is_alive: bool,
    pub special: Option<SpecialAbility>,
    pub detect_chance: f64,
    pub combat_style: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    AcidBurn,
    Attached,
    ElectricalGlitch,
}

impl EffectType {
    pub fn as_str(self) -> &'static str {
        match self {
            EffectType::AcidBurn => "acid_burn",
            EffectType::Attached => "attached",
            EffectType::ElectricalGlitch => "electrical_glitch",
        }
    }
}

/// Duration value for effects that never wear off on their own.
pub const PERSISTENT: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEffect {
    pub id: String,
    pub kind: EffectType,
    pub desc: String,
    /// Turns remaining, or [`PERSISTENT`].
    pub duration: i32,
    pub damage: i32,
}

impl CombatEffect {
    pub fn is_persistent(&self) -> bool {
        self.duration == PERSISTENT
    }

    pub fn is_active(&self) -> bool {
        self.is_persistent() || self.duration > 0
    }
}

/// What a field item looked like before it was filed in the bunker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOrigin {
    pub kind: ItemType,
    pub weight: f64,
    pub value: i32,
    pub energy_cost: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BunkerItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub category: BunkerCategory,
    pub desc: String,
    pub survival_days: Option<u32>,
    pub origin: Option<ItemOrigin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredContent {
    pub id: String,
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
    pub discovered_at: DateTime<Utc>,
    pub source_item: String,
}
