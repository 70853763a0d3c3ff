mod actions;
mod bunker;
mod combat;
mod dice;
mod effects;
mod explore;
mod helpers;
mod items;
mod movement;
mod navigation;
mod output;
mod render;
mod rng;
mod torch;
mod weight;

pub use actions::{
    InteractAction, handle_interact, handle_new_game, handle_start_mission,
};

pub use bunker::{
    RestLength, handle_bunker_status, handle_equip_from_bunker, handle_purify_water, handle_rest,
    handle_rest_and_recharge, handle_return_to_bunker, trigger_hibernation,
};

pub use combat::{enter_maintenance_mode, handle_attack};
pub use dice::{Dice, parse_dice, roll_dice};
pub use effects::tick_effects;
pub use explore::handle_explore;
pub use items::handle_inventory;
pub use movement::{MoveOutcome, handle_move};
pub use navigation::{find_route, handle_navigate};
pub use output::{Output, OutputBlock};
pub use render::{handle_access_discovered_intel, render_status};
pub use rng::{Chance, ScriptedChance};
pub use torch::handle_use_plasma_torch;
pub use weight::enforce_weight_limits;
