use std::collections::HashSet;

use super::model::{AccessRequirement, World};
use crate::engine::parse_dice;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(msg: impl Into<String>) -> Self {
        ValidationError {
            message: msg.into(),
        }
    }
}

pub fn validate_world(world: &World) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = Vec::new();
    let rules = &world.rules;

    if world.rooms.is_empty() {
        errors.push(ValidationError::new("world has no rooms"));
    }

    if !world.rooms.contains_key(&rules.start_room) {
        errors.push(ValidationError::new(format!(
            "start_room '{}' not found among rooms",
            rules.start_room
        )));
    }

    for r in &rules.bunker_rooms {
        if !world.rooms.contains_key(r) {
            errors.push(ValidationError::new(format!(
                "bunker room '{}' not found among rooms",
                r
            )));
        }
    }

    if !world.rooms.contains_key(&rules.bunker_room) {
        errors.push(ValidationError::new(format!(
            "bunker_room '{}' not found among rooms",
            rules.bunker_room
        )));
    }

    if parse_dice(&rules.base_attack).is_none() {
        errors.push(ValidationError::new(format!(
            "base_attack '{}' is not valid dice notation",
            rules.base_attack
        )));
    }

    if !(rules.heavy_load <= rules.critical_load && rules.critical_load <= rules.carry_capacity) {
        errors.push(ValidationError::new(
            "weight bands must satisfy heavy_load <= critical_load <= carry_capacity",
        ));
    }

    // Exits and access requirements
    for (room_id, room) in &world.rooms {
        let mut seen_dirs: HashSet<&str> = HashSet::new();
        for exit in &room.exits {
            if !world.rooms.contains_key(&exit.target) {
                errors.push(ValidationError::new(format!(
                    "room '{}' exit '{}' targets missing room '{}'",
                    room_id, exit.direction, exit.target
                )));
            }
            if !seen_dirs.insert(exit.direction.as_str()) {
                errors.push(ValidationError::new(format!(
                    "room '{}' has two exits named '{}'",
                    room_id, exit.direction
                )));
            }
        }

        for req in &room.access {
            if let AccessRequirement::RequiresItem { item, .. } = req {
                if !world.items.contains_key(item) {
                    errors.push(ValidationError::new(format!(
                        "room '{}' access requires missing item '{}'",
                        room_id, item
                    )));
                }
            }
        }
    }

    for item in world.items.values() {
        if !world.rooms.contains_key(&item.start_room) {
            errors.push(ValidationError::new(format!(
                "item '{}' location room '{}' not found",
                item.id, item.start_room
            )));
        }
    }

    if !world.items.contains_key(&rules.torch_item) && !world.torch_cuts.is_empty() {
        errors.push(ValidationError::new(format!(
            "torch_item '{}' not found among items",
            rules.torch_item
        )));
    }

    for mob in world.mobs.values() {
        if !world.rooms.contains_key(&mob.location) {
            errors.push(ValidationError::new(format!(
                "mob '{}' location room '{}' not found",
                mob.id, mob.location
            )));
        }
        if parse_dice(&mob.damage).is_none() {
            errors.push(ValidationError::new(format!(
                "mob '{}' damage '{}' is not valid dice notation",
                mob.id, mob.damage
            )));
        }
    }

    for hazard in world.hazards.values() {
        if !world.rooms.contains_key(&hazard.room) {
            errors.push(ValidationError::new(format!(
                "hazard '{}' room '{}' not found",
                hazard.name, hazard.room
            )));
        }
        if parse_dice(&hazard.damage).is_none() {
            errors.push(ValidationError::new(format!(
                "hazard '{}' damage '{}' is not valid dice notation",
                hazard.name, hazard.damage
            )));
        }
    }

    for cut in &world.torch_cuts {
        if !world.rooms.contains_key(&cut.room) {
            errors.push(ValidationError::new(format!(
                "torch_cut room '{}' not found",
                cut.room
            )));
        }
        if !world.rooms.contains_key(&cut.target) {
            errors.push(ValidationError::new(format!(
                "torch_cut in '{}' targets missing room '{}'",
                cut.room, cut.target
            )));
        }
    }

    let mut supply_ids: HashSet<&str> = HashSet::new();
    for supply in &rules.bunker_supplies {
        if !supply_ids.insert(supply.id.as_str()) {
            errors.push(ValidationError::new(format!(
                "bunker supply '{}' listed twice",
                supply.id
            )));
        }
    }

    errors
}
