use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//////////////////////////////
/// CATALOG STRUCTS AND ENUMS ///
//////////////////////////////

/// Static world catalog: everything the store is seeded from.
pub struct World {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub intro: String,
    pub rules: Rules,
    pub rooms: IndexMap<String, Room>,
    pub items: IndexMap<String, Item>,
    pub mobs: IndexMap<String, Mob>,
    /// Keyed by room id; at most one hazard per room.
    pub hazards: HashMap<String, Hazard>,
    pub torch_cuts: Vec<TorchCut>,
}

impl World {
    pub fn room_name<'a>(&'a self, room_id: &'a str) -> &'a str {
        self.rooms
            .get(room_id)
            .map(|r| r.name.as_str())
            .unwrap_or(room_id)
    }

    pub fn is_bunker_room(&self, room_id: &str) -> bool {
        self.rules.bunker_rooms.iter().any(|r| r == room_id)
    }
}

pub struct Room {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub exits: Vec<Exit>,
    pub access: Vec<AccessRequirement>,
    pub completes_mission: bool,
}

pub struct Exit {
    pub direction: String,
    pub target: String,
}

/// What it takes to enter a room. Evaluated by `engine::movement::check_access`.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessRequirement {
    /// No way in from this side.
    Locked { text: String },
    /// An item id must be in the inventory.
    RequiresItem { item: String, text: String },
    /// Something physical is in the way until an `interact <obstacle> move` clears it.
    BlockedBy { obstacle: String, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Food,
    Energy,
    Water,
    RawWater,
    WaterPurifier,
    RobotMedicine,
    HumanMedicine,
    Weapon,
    Tool,
    Key,
    Material,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Food => "food",
            ItemType::Energy => "energy",
            ItemType::Water => "water",
            ItemType::RawWater => "raw_water",
            ItemType::WaterPurifier => "water_purifier",
            ItemType::RobotMedicine => "robot_medicine",
            ItemType::HumanMedicine => "human_medicine",
            ItemType::Weapon => "weapon",
            ItemType::Tool => "tool",
            ItemType::Key => "key",
            ItemType::Material => "material",
        }
    }

    pub fn parse(s: &str) -> Option<ItemType> {
        let t = match s.trim().to_lowercase().as_str() {
            "food" => ItemType::Food,
            "energy" => ItemType::Energy,
            "water" => ItemType::Water,
            "raw_water" => ItemType::RawWater,
            "water_purifier" => ItemType::WaterPurifier,
            "robot_medicine" => ItemType::RobotMedicine,
            "human_medicine" => ItemType::HumanMedicine,
            "weapon" => ItemType::Weapon,
            "tool" => ItemType::Tool,
            "key" => ItemType::Key,
            "material" => ItemType::Material,
            _ => return None,
        };
        Some(t)
    }
}

/// Days of bunker life support an item converts into on delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Yields {
    pub food: i32,
    pub energy: i32,
    pub water: i32,
}

pub struct Item {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub weight: f64,
    pub kind: ItemType,
    pub value: i32,
    pub energy_cost: i32,
    pub start_room: String,
    pub yields: Yields,
    pub lore: Option<Lore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Broadcast,
    Blueprint,
    Audio,
    Intel,
    Knowledge,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Broadcast,
        ContentKind::Blueprint,
        ContentKind::Audio,
        ContentKind::Intel,
        ContentKind::Knowledge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Broadcast => "broadcast",
            ContentKind::Blueprint => "blueprint",
            ContentKind::Audio => "audio",
            ContentKind::Intel => "intel",
            ContentKind::Knowledge => "knowledge",
        }
    }

    pub fn parse(s: &str) -> Option<ContentKind> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn icon(self) -> &'static str {
        match self {
            ContentKind::Broadcast => "📡",
            ContentKind::Blueprint => "📐",
            ContentKind::Audio => "🎵",
            ContentKind::Intel => "🔍",
            ContentKind::Knowledge => "📚",
        }
    }
}

pub struct Lore {
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialAbility {
    AcidBurn,
    AttachCorrode,
    ElectricalGlitch,
    /// Flavor-only tag with no mechanical effect (e.g. "pack_coordination").
    Passive(String),
}

impl SpecialAbility {
    pub fn parse(s: &str) -> SpecialAbility {
        match s.trim() {
            "acid_burn" => SpecialAbility::AcidBurn,
            "attach_corrode" => SpecialAbility::AttachCorrode,
            "electrical_glitch" => SpecialAbility::ElectricalGlitch,
            other => SpecialAbility::Passive(other.to_string()),
        }
    }
}

pub struct Mob {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub health: i32,
    pub damage: String,
    pub damage_type: String,
    pub location: String,
    pub special: Option<SpecialAbility>,
    pub detect_chance: f64,
    pub combat_style: String,
    pub defeat_text: Option<String>,
}

pub struct Hazard {
    pub room: String,
    pub name: String,
    pub desc: String,
    pub trigger_chance: f64,
    pub damage: String,
    pub damage_type: String,
}

pub struct TorchCut {
    pub room: String,
    pub direction: String,
    pub target: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BunkerCategory {
    Food,
    Fuel,
    Medicine,
    Defense,
    Technology,
    Material,
}

impl BunkerCategory {
    pub fn heading(self) -> &'static str {
        match self {
            BunkerCategory::Food => "🍞 **FOOD SUPPLIES**",
            BunkerCategory::Fuel => "⛽ **FUEL & ENERGY**",
            BunkerCategory::Medicine => "💊 **MEDICAL SUPPLIES**",
            BunkerCategory::Defense => "🛡️  **DEFENSE & TOOLS**",
            BunkerCategory::Technology => "⚙️  **TECHNOLOGY**",
            BunkerCategory::Material => "📦 **RAW MATERIALS**",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BunkerCategory::Food => "food",
            BunkerCategory::Fuel => "fuel",
            BunkerCategory::Medicine => "medicine",
            BunkerCategory::Defense => "defense",
            BunkerCategory::Technology => "technology",
            BunkerCategory::Material => "material",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BunkerSupply {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub category: BunkerCategory,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub survival_days: Option<u32>,
}

/// Tunable game rules, read from the `[rules]` table. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub start_room: String,
    pub bunker_rooms: Vec<String>,
    /// Preferred destination of an energy retreat.
    pub bunker_room: String,
    pub torch_item: String,

    pub carry_capacity: f64,
    pub heavy_load: f64,
    pub critical_load: f64,
    pub heavy_drop_chance: f64,
    pub critical_drop_chance: f64,

    pub max_health: i32,
    pub start_energy: i32,

    pub explore_cost: i32,
    pub move_cost: i32,
    pub take_cost: i32,
    pub attack_cost: i32,
    pub obstacle_cost: i32,

    pub base_attack: String,
    pub flee_health: i32,
    pub flee_chance: f64,
    pub retreat_energy: i32,
    pub maintenance_health: i32,

    pub hibernation_days: u32,
    pub hibernation_energy: i32,
    pub return_trip_turns: u32,
    pub purify_yield: i32,

    pub short_rest_energy: i32,
    pub short_rest_turns: u32,
    pub long_rest_turns: u32,

    pub start_day: u32,
    pub start_food: i32,
    pub start_water: i32,
    pub start_energy_days: i32,
    pub bunker_supplies: Vec<BunkerSupply>,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            start_room: "STORAGE_15".to_string(),
            bunker_rooms: vec!["BUNKER".to_string(), "STORAGE_15".to_string()],
            bunker_room: "BUNKER".to_string(),
            torch_item: "plasma_torch_001".to_string(),

            carry_capacity: 30.0,
            heavy_load: 20.0,
            critical_load: 25.0,
            heavy_drop_chance: 0.15,
            critical_drop_chance: 0.5,

            max_health: 100,
            start_energy: 100,

            explore_cost: 3,
            move_cost: 2,
            take_cost: 1,
            attack_cost: 3,
            obstacle_cost: 5,

            base_attack: "1d6+2".to_string(),
            flee_health: 20,
            flee_chance: 0.75,
            retreat_energy: 5,
            maintenance_health: 25,

            hibernation_days: 2,
            hibernation_energy: 40,
            return_trip_turns: 5,
            purify_yield: 6,

            short_rest_energy: 20,
            short_rest_turns: 3,
            long_rest_turns: 8,

            start_day: 12,
            start_food: 7,
            start_water: 10,
            start_energy_days: 15,
            bunker_supplies: Vec::new(),
        }
    }
}
