pub mod commands;
pub mod engine;
pub mod error;
pub mod store;
pub mod world;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::{debug, error};

use commands::{Command, HELP};
use engine::{
    Chance, Output, RestLength, handle_access_discovered_intel, handle_bunker_status,
    handle_equip_from_bunker, handle_explore, handle_interact, handle_inventory, handle_move,
    handle_navigate, handle_new_game, handle_purify_water, handle_rest, handle_rest_and_recharge,
    handle_return_to_bunker, handle_start_mission, handle_use_plasma_torch, render_status,
};
use error::Result;
use store::Store;
use world::World;

pub use error::GameError;
pub use world::{default_world, load_world_from_file, load_world_from_str};

/// A running game: the catalog, the persistent tables and the dice.
pub struct Game {
    world: World,
    store: Store,
    rng: Box<dyn Chance>,
}

#[cfg(feature = "wasm")]
mod wasm_bindings {
    use super::*;
    use serde::Serialize;
    use serde_wasm_bindgen::to_value;
    use wasm_bindgen::prelude::*;

    const DEFAULT_SEED: u64 = 0x0B07;

    #[derive(Serialize)]
    struct WasmCallResult {
        text: String,
        blocks: Vec<engine::OutputBlock>,
    }

    #[wasm_bindgen]
    pub struct WasmGame {
        game: Game,
    }

    #[wasm_bindgen]
    impl WasmGame {
        /// Create an in-memory game from a TOML world string.
        #[wasm_bindgen(constructor)]
        pub fn new(world_toml: &str, seed: Option<u64>) -> std::result::Result<WasmGame, JsValue> {
            let world =
                load_world_from_str(world_toml).map_err(|e| JsValue::from_str(&e.to_string()))?;
            let store = Store::new(&world);
            let rng = StdRng::seed_from_u64(seed.unwrap_or(DEFAULT_SEED));
            Ok(WasmGame {
                game: Game::with_rng(world, store, Box::new(rng)),
            })
        }

        /// Run one typed command line.
        #[wasm_bindgen]
        pub fn call(&mut self, line: &str) -> JsValue {
            let out = match Command::parse_line(line) {
                None => Output::new(),
                Some(Ok(cmd)) => self.game.execute(cmd),
                Some(Err(e)) => error_output(&e),
            };
            to_value(&WasmCallResult {
                text: out.to_text(),
                blocks: out.blocks,
            })
            .unwrap_or(JsValue::NULL)
        }

        /// Run one tool call; `args_json` is the JSON argument object.
        #[wasm_bindgen(js_name = callTool)]
        pub fn call_tool(&mut self, name: &str, args_json: &str) -> String {
            let args = serde_json::from_str(args_json).unwrap_or(Value::Null);
            self.game.call_tool(name, &args)
        }
    }
}

fn error_output(e: &GameError) -> Output {
    let mut out = Output::new();
    out.say(format!("Error: {e}"));
    out
}

impl Game {
    pub fn new(world: World, store: Store) -> Self {
        Self::with_rng(world, store, Box::new(StdRng::from_entropy()))
    }

    pub fn with_rng(world: World, store: Store, rng: Box<dyn Chance>) -> Self {
        Game { world, store, rng }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run one command inside a store transaction and persist the result.
    ///
    /// Internal errors, including a failed save, roll the command back and come
    /// out as `Error: <message>`.
    pub fn execute(&mut self, cmd: Command) -> Output {
        let world = &self.world;
        let rng = self.rng.as_mut();
        debug!(command = ?cmd, "executing");

        let result = self.store.transaction(|store| {
            let mut out = Output::new();
            run(&cmd, &mut out, world, store, rng)?;
            store.save()?;
            Ok(out)
        });

        match result {
            Ok(out) => out,
            Err(e) => {
                error!(error = %e, command = ?cmd, "command failed");
                error_output(&e)
            }
        }
    }

    /// Tool-call entry point: returns the narrative as one text block.
    pub fn call_tool(&mut self, name: &str, args: &Value) -> String {
        match Command::from_tool_call(name, args) {
            Ok(cmd) => self.execute(cmd).to_text(),
            Err(e) => error_output(&e).to_text(),
        }
    }
}

fn run(
    cmd: &Command,
    out: &mut Output,
    world: &World,
    store: &mut Store,
    rng: &mut dyn Chance,
) -> Result<()> {
    match cmd {
        Command::StartMission => handle_start_mission(out, world, store)?,
        Command::Explore => handle_explore(out, world, store, rng)?,
        Command::Move { direction } => {
            handle_move(out, world, store, rng, direction)?;
        }
        Command::Interact { target, action } => {
            handle_interact(out, world, store, rng, target, action)?
        }
        Command::Inventory => handle_inventory(out, world, store, rng)?,
        Command::Status => render_status(out, world, store),
        Command::Rest { duration } => match RestLength::parse(duration) {
            Some(length) => handle_rest(out, world, store, length)?,
            None => out.say(format!(
                "❓ Rest duration must be \"short\" or \"long\", not \"{duration}\"."
            )),
        },
        Command::ReturnToBunker => handle_return_to_bunker(out, world, store)?,
        Command::BunkerStatus => handle_bunker_status(out, store),
        Command::PurifyWater => handle_purify_water(out, world, store)?,
        Command::RestAndRecharge => handle_rest_and_recharge(out, world, store),
        Command::UsePlasmaTorch { direction } => {
            handle_use_plasma_torch(out, world, store, direction)?
        }
        Command::AccessDiscoveredIntel { kind } => {
            handle_access_discovered_intel(out, store, kind.as_deref())
        }
        Command::EquipFromBunker { item_name } => {
            handle_equip_from_bunker(out, world, store, item_name.as_deref())?
        }
        Command::Navigate { destination } => {
            handle_navigate(out, world, store, rng, destination)?
        }
        Command::NewGame => handle_new_game(out, world, store),
        Command::Help => out.say(HELP),
        Command::Quit => out.say("Goodbye."),
    }
    Ok(())
}
