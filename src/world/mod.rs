mod loader;
mod model;
mod validator;

pub use loader::{default_world, load_world_from_file, load_world_from_str};

pub use model::{
    AccessRequirement, BunkerCategory, BunkerSupply, ContentKind, Exit, Hazard, Item, ItemType,
    Lore, Mob, Room, Rules, SpecialAbility, TorchCut, World, Yields,
};
pub use validator::{ValidationError, validate_world};
