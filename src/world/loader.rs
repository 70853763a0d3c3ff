use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::model::{
    AccessRequirement, ContentKind, Exit, Hazard, Item, ItemType, Lore, Mob, Room, Rules,
    SpecialAbility, TorchCut, World, Yields,
};
use super::validator::validate_world;
use crate::error::{GameError, Result};

/// The catalog shipped with the binary.
const DEFAULT_WORLD: &str = include_str!("../../assets/basement.toml");

////////////////////
/// TOML STRUCTS ///
////////////////////

#[derive(Deserialize)]
struct WorldFile {
    world: WorldHeader,
    #[serde(default)]
    rules: Rules,
    #[serde(default)]
    room: Vec<RoomConfig>, // [[room]] blocks
    #[serde(default)]
    item: Vec<ItemConfig>, // [[item]] blocks
    #[serde(default)]
    mob: Vec<MobConfig>,
    #[serde(default)]
    hazard: Vec<HazardConfig>,
    #[serde(default)]
    torch_cut: Vec<TorchCutConfig>,
}

#[derive(Deserialize)]
struct WorldHeader {
    id: String,
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    intro: String,
}

#[derive(Deserialize)]
struct RoomConfig {
    id: String,
    name: String,
    #[serde(default)]
    desc: String,

    #[serde(default)]
    exit: Vec<ExitConfig>, // [[room.exit]]
    #[serde(default)]
    access: Vec<AccessConfig>, // [[room.access]]

    #[serde(default)]
    completes_mission: bool,
}

#[derive(Deserialize)]
struct ExitConfig {
    direction: String,
    target: String,
}

#[derive(Deserialize)]
struct AccessConfig {
    /// "locked", "requires_item" or "blocked_by"
    kind: String,
    #[serde(default)]
    item: Option<String>,
    #[serde(default)]
    obstacle: Option<String>,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ItemConfig {
    id: String,
    name: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    weight: f64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: i32,
    #[serde(default)]
    energy_cost: i32,
    location: String,

    #[serde(default)]
    food_value: i32,
    #[serde(default)]
    energy_value: i32,
    #[serde(default)]
    water_value: i32,

    #[serde(default)]
    lore: Option<LoreConfig>, // [item.lore]
}

#[derive(Deserialize)]
struct LoreConfig {
    kind: String,
    title: String,
    body: String,
}

#[derive(Deserialize)]
struct MobConfig {
    id: String,
    name: String,
    #[serde(default)]
    desc: String,
    health: i32,
    damage: String,
    #[serde(default = "default_damage_type")]
    damage_type: String,
    location: String,
    #[serde(default)]
    special_ability: Option<String>,
    #[serde(default = "default_detect_chance")]
    detect_chance: f64,
    #[serde(default)]
    combat_style: String,
    #[serde(default)]
    defeat_text: Option<String>,
}

#[derive(Deserialize)]
struct HazardConfig {
    room: String,
    name: String,
    #[serde(default)]
    desc: String,
    trigger_chance: f64,
    damage: String,
    #[serde(default = "default_damage_type")]
    damage_type: String,
}

#[derive(Deserialize)]
struct TorchCutConfig {
    room: String,
    direction: String,
    target: String,
    #[serde(default)]
    text: String,
}

fn default_damage_type() -> String {
    "physical".to_string()
}

// Mobs without an explicit chance notice the robot half the time.
fn default_detect_chance() -> f64 {
    0.5
}

/////////////////////////////
/// TOML PARSER FUNCTIONS ///
/////////////////////////////

/// Load a world from a .toml file on disk.
pub fn load_world_from_file(path: &Path) -> Result<World> {
    let contents = fs::read_to_string(path)?;
    debug!(path = %path.display(), "loading world file");
    load_world_from_str(&contents)
}

/// The embedded basement catalog.
pub fn default_world() -> Result<World> {
    load_world_from_str(DEFAULT_WORLD)
}

/// Parse, build and validate a world from TOML text.
pub fn load_world_from_str(contents: &str) -> Result<World> {
    let world_file: WorldFile = toml::from_str(contents)?;
    let world = build_world(world_file)?;

    let errors = validate_world(&world);
    if !errors.is_empty() {
        return Err(GameError::Validation(errors));
    }

    Ok(world)
}

fn build_world(world_file: WorldFile) -> Result<World> {
    if world_file.world.id.trim().is_empty() {
        return Err(GameError::InvalidWorld("world.id may not be empty".into()));
    }

    // Rooms
    let mut rooms: IndexMap<String, Room> = IndexMap::new();

    for room_cfg in world_file.room {
        if rooms.contains_key(&room_cfg.id) {
            return Err(GameError::InvalidWorld(format!(
                "Duplicate room id: {}",
                room_cfg.id
            )));
        }

        let exits = room_cfg
            .exit
            .into_iter()
            .map(|e| Exit {
                direction: e.direction.to_lowercase(),
                target: e.target,
            })
            .collect();

        let access = room_cfg
            .access
            .into_iter()
            .map(|a| parse_access(&room_cfg.id, a))
            .collect::<std::result::Result<Vec<_>, String>>()
            .map_err(GameError::InvalidWorld)?;

        rooms.insert(
            room_cfg.id.clone(),
            Room {
                id: room_cfg.id,
                name: room_cfg.name,
                desc: normalize_multiline_desc(&room_cfg.desc),
                exits,
                access,
                completes_mission: room_cfg.completes_mission,
            },
        );
    }

    // Items
    let mut items: IndexMap<String, Item> = IndexMap::new();

    for ic in world_file.item {
        if items.contains_key(&ic.id) {
            return Err(GameError::InvalidWorld(format!(
                "Duplicate item id: {}",
                ic.id
            )));
        }

        let kind = ItemType::parse(&ic.kind).ok_or_else(|| {
            GameError::InvalidWorld(format!("Item '{}' has unknown type '{}'", ic.id, ic.kind))
        })?;

        if ic.weight < 0.0 {
            return Err(GameError::InvalidWorld(format!(
                "Item '{}' has a negative weight",
                ic.id
            )));
        }

        let lore = ic.lore.map(|l| parse_lore(&ic.id, l)).transpose()?;

        items.insert(
            ic.id.clone(),
            Item {
                id: ic.id,
                name: ic.name,
                desc: normalize_multiline_desc(&ic.desc),
                weight: ic.weight,
                kind,
                value: ic.value,
                energy_cost: ic.energy_cost,
                start_room: ic.location,
                yields: Yields {
                    food: ic.food_value,
                    energy: ic.energy_value,
                    water: ic.water_value,
                },
                lore,
            },
        );
    }

    // Mobs
    let mut mobs: IndexMap<String, Mob> = IndexMap::new();

    for mc in world_file.mob {
        if mobs.contains_key(&mc.id) {
            return Err(GameError::InvalidWorld(format!(
                "Duplicate mob id: {}",
                mc.id
            )));
        }

        if mc.health <= 0 {
            return Err(GameError::InvalidWorld(format!(
                "Mob '{}' must start with positive health",
                mc.id
            )));
        }

        let special = mc
            .special_ability
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(SpecialAbility::parse);

        if let Some(SpecialAbility::Passive(tag)) = &special {
            debug!(mob = %mc.id, ability = %tag, "special ability has no mechanical effect");
        }

        mobs.insert(
            mc.id.clone(),
            Mob {
                id: mc.id,
                name: mc.name,
                desc: normalize_multiline_desc(&mc.desc),
                health: mc.health,
                damage: mc.damage,
                damage_type: mc.damage_type,
                location: mc.location,
                special,
                detect_chance: mc.detect_chance.clamp(0.0, 1.0),
                combat_style: mc.combat_style,
                defeat_text: mc.defeat_text.map(|s| normalize_multiline_desc(&s)),
            },
        );
    }

    // Hazards, one per room
    let mut hazards: HashMap<String, Hazard> = HashMap::new();

    for hc in world_file.hazard {
        if hazards.contains_key(&hc.room) {
            return Err(GameError::InvalidWorld(format!(
                "Room '{}' has more than one hazard",
                hc.room
            )));
        }

        hazards.insert(
            hc.room.clone(),
            Hazard {
                room: hc.room,
                name: hc.name,
                desc: normalize_multiline_desc(&hc.desc),
                trigger_chance: hc.trigger_chance.clamp(0.0, 1.0),
                damage: hc.damage,
                damage_type: hc.damage_type,
            },
        );
    }

    let torch_cuts = world_file
        .torch_cut
        .into_iter()
        .map(|tc| TorchCut {
            room: tc.room,
            direction: tc.direction.to_lowercase(),
            target: tc.target,
            text: normalize_multiline_desc(&tc.text),
        })
        .collect();

    Ok(World {
        id: world_file.world.id,
        name: world_file.world.name,
        desc: normalize_multiline_desc(&world_file.world.desc),
        intro: normalize_multiline_desc(&world_file.world.intro),
        rules: world_file.rules,
        rooms,
        items,
        mobs,
        hazards,
        torch_cuts,
    })
}

fn normalize_multiline_desc(raw: &str) -> String {
    let mut result = String::new();
    let mut pending_blank_lines = 0usize;
    let mut first_text_seen = false;

    for line in raw.lines() {
        // Indentation in the TOML never reaches the player.
        let trimmed = line.trim();

        if trimmed.is_empty() {
            pending_blank_lines += 1;
            continue;
        }

        if !first_text_seen {
            result.push_str(trimmed);
            first_text_seen = true;
        } else {
            match pending_blank_lines {
                // Wrapped line
                0 => {
                    result.push(' ');
                    result.push_str(trimmed);
                }
                1 => {
                    result.push('\n');
                    result.push_str(trimmed);
                }
                _ => {
                    result.push_str("\n\n");
                    result.push_str(trimmed);
                }
            }
        }

        pending_blank_lines = 0;
    }

    result
}

////////////////////////////
///   PARSE HELPERS      ///
////////////////////////////

fn parse_access(room_id: &str, cfg: AccessConfig) -> std::result::Result<AccessRequirement, String> {
    let text = normalize_multiline_desc(&cfg.text);

    match cfg.kind.trim().to_lowercase().as_str() {
        "locked" => Ok(AccessRequirement::Locked {
            text: if text.is_empty() {
                "🚫 The door is locked. You need to find a way to unlock it.".to_string()
            } else {
                text
            },
        }),
        "requires_item" => {
            let item = cfg
                .item
                .filter(|i| !i.trim().is_empty())
                .ok_or_else(|| format!("room '{}' requires_item access has no item", room_id))?;
            Ok(AccessRequirement::RequiresItem { item, text })
        }
        "blocked_by" => {
            let obstacle = cfg
                .obstacle
                .filter(|o| !o.trim().is_empty())
                .ok_or_else(|| format!("room '{}' blocked_by access has no obstacle", room_id))?;
            Ok(AccessRequirement::BlockedBy {
                obstacle: obstacle.to_lowercase(),
                text,
            })
        }
        other => Err(format!(
            "room '{}' has unknown access kind '{}': expected 'locked', 'requires_item' or 'blocked_by'",
            room_id, other
        )),
    }
}

fn parse_lore(item_id: &str, cfg: LoreConfig) -> Result<Lore> {
    let kind = match ContentKind::parse(&cfg.kind) {
        Some(k) => k,
        None => {
            warn!(item = %item_id, kind = %cfg.kind, "unknown lore kind, filing as knowledge");
            ContentKind::Knowledge
        }
    };

    if cfg.title.trim().is_empty() {
        return Err(GameError::InvalidWorld(format!(
            "Item '{}' lore has an empty title",
            item_id
        )));
    }

    Ok(Lore {
        kind,
        title: cfg.title,
        body: normalize_multiline_desc(&cfg.body),
    })
}
