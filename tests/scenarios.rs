use obot3::commands::Command;
use obot3::engine::ScriptedChance;
use obot3::store::{ItemLocation, Store};
use obot3::{Game, default_world};
use serde_json::json;

fn game_with(setup: impl FnOnce(&mut Store), rng: ScriptedChance) -> Game {
    let world = default_world().expect("catalog");
    let mut store = Store::new(&world);
    setup(&mut store);
    Game::with_rng(world, store, Box::new(rng))
}

fn started_in(room: &'static str) -> impl FnOnce(&mut Store) {
    move |store| {
        store.state_mut().mission_started = true;
        store.state_mut().current_room = room.to_string();
    }
}

#[test]
fn supply_run_feeds_the_bunker() {
    let mut game = game_with(|_| {}, ScriptedChance::new());

    let intro = game.call_tool("start_mission", &json!({}));
    assert!(!intro.contains("already active"));
    let again = game.call_tool("start_mission", &json!({}));
    assert!(again.contains("already active"));

    let scan = game.call_tool("explore", &json!({}));
    assert!(scan.contains("Bag of Funyuns"));

    let took = game.call_tool("interact", &json!({"target": "funyuns", "action": "take"}));
    assert!(took.contains("picks up Bag of Funyuns"));

    game.call_tool("return_to_bunker", &json!({}));
    let state = game.store().state();
    assert_eq!(state.resources.food, 7 + 4);
    assert!(game.store().inventory().is_empty());

    let report = game.call_tool("bunker_status", &json!({}));
    assert!(report.contains("Day 12 After the Incident"));
    assert!(report.contains("Food: 11 days remaining"));
}

#[test]
fn explore_can_start_a_fight() {
    let mut game = game_with(started_in("STORAGE_8"), ScriptedChance::new().with_draws([0.0]));

    let text = game.call_tool("explore", &json!({}));
    assert!(text.contains("COMBAT INITIATED"));
    assert!(game.store().state().in_combat);

    let blocked = game.call_tool("move", &json!({"direction": "west"}));
    assert!(blocked.contains("actively engaged"));
    assert_eq!(game.store().state().current_room, "STORAGE_8");
}

#[test]
fn heavy_pickup_is_refused() {
    let mut game = game_with(
        |store| {
            started_in("WORKSHOP")(store);
            store
                .move_item("record_collection_001", ItemLocation::Inventory)
                .expect("records");
        },
        ScriptedChance::new(),
    );

    let text = game.call_tool(
        "interact",
        &json!({"target": "scrap metal", "action": "take"}),
    );
    assert!(text.contains("Cannot take"));
    assert!(!game.store().has_in_inventory("metal_scraps_001"));
    assert_eq!(game.store().state().turn_number, 1);
}

#[test]
fn drained_battery_hibernates() {
    let mut game = game_with(
        |store| {
            started_in("STORAGE_15")(store);
            store.state_mut().energy = 0;
        },
        ScriptedChance::new(),
    );

    let text = game.call_tool("move", &json!({"direction": "north"}));
    assert!(text.contains("HIBERNATION"));
    let state = game.store().state();
    assert_eq!(state.energy, 40);
    assert_eq!(state.days_since_incident, 14);
    assert_eq!(state.resources.water, 8);
    assert_eq!(state.current_room, "STORAGE_15");
}

#[test]
fn torch_route_completes_the_mission() {
    let mut game = game_with(
        |store| {
            started_in("STAIRS_UP")(store);
            store
                .move_item("plasma_torch_001", ItemLocation::Inventory)
                .expect("torch");
        },
        ScriptedChance::new(),
    );

    let cut = game.call_tool("use_plasma_torch", &json!({"direction": "up"}));
    assert!(cut.contains("PLASMA TORCH ACTIVATED"));

    let text = game.call_tool("move", &json!({"direction": "up"}));
    assert!(text.contains("MISSION COMPLETE"));
    assert!(game.store().state().game_completed);
    assert_eq!(game.store().state().current_room, "LOBBY");
}

#[test]
fn internal_errors_roll_back() {
    let mut game = game_with(started_in("NOWHERE"), ScriptedChance::new());

    let text = game.call_tool("explore", &json!({}));
    assert!(text.starts_with("Error: Unknown room: NOWHERE"));
    assert_eq!(game.store().state().energy, 100);
    assert_eq!(game.store().state().turn_number, 1);
}

#[test]
fn unknown_tools_and_missing_arguments_are_narrative() {
    let mut game = game_with(|_| {}, ScriptedChance::new());
    assert_eq!(
        game.call_tool("dance", &json!({})),
        "Error: Unknown tool: dance"
    );
    assert_eq!(
        game.call_tool("move", &json!({})),
        "Error: Missing argument: direction"
    );
    let out = game.execute(Command::Help);
    assert!(out.contains("navigate <room>"));
}

#[test]
fn progress_survives_a_restart() {
    let world = default_world().expect("catalog");
    let path = std::env::temp_dir().join(format!("obot3-scenario-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let session_world = default_world().expect("catalog");
        let store = Store::open(&path, &session_world).expect("open");
        let mut game = Game::with_rng(session_world, store, Box::new(ScriptedChance::new()));
        game.call_tool("start_mission", &json!({}));
        game.call_tool("interact", &json!({"target": "radio", "action": "take"}));
    }

    let store = Store::open(&path, &world).expect("reopen");
    assert!(store.state().mission_started);
    assert!(store.has_in_inventory("emergency_radio_001"));
    assert_eq!(store.state().energy, 99);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn failed_save_leaves_memory_untouched() {
    let dir = std::env::temp_dir().join(format!("obot3-unwritable-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("dir");

    let world = default_world().expect("catalog");
    let store = Store::open(dir.join("save.json"), &world).expect("open");
    let mut game = Game::with_rng(world, store, Box::new(ScriptedChance::new()));
    std::fs::remove_dir_all(&dir).expect("remove dir");

    let text = game.call_tool("start_mission", &json!({}));
    assert!(text.starts_with("Error:"));
    assert!(!game.store().state().mission_started);
    assert!(!game.store().room("STORAGE_15").expect("room").discovered);
}
