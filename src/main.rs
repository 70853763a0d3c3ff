use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use obot3::commands::Command;
use obot3::engine::{Output, OutputBlock};
use obot3::store::Store;
use obot3::{Game, default_world, load_world_from_file};
use tracing_subscriber::EnvFilter;

const DEFAULT_SAVE: &str = "obot3-save.json";

fn flush_output(out: Output) {
    let mut printed_anything = false;
    let mut started_events = false;

    for block in out.blocks {
        match block {
            OutputBlock::Title(t) => {
                println!("\n{}", t);
                printed_anything = true;
            }
            OutputBlock::Text(line) => {
                println!("{}", line);
                printed_anything = true;
            }
            OutputBlock::Event(ev) => {
                if !started_events {
                    if printed_anything {
                        println!();
                    }
                    started_events = true;
                }
                println!("{}", ev);
                printed_anything = true;
            }
            OutputBlock::Exits(exits) => {
                println!("\n{}", exits);
                printed_anything = true;
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> io::Result<()> {
    init_logging();

    let mut args = env::args().skip(1);
    let save_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE));
    let world_path = args.next().map(PathBuf::from);

    let world = match &world_path {
        Some(path) => load_world_from_file(path),
        None => default_world(),
    };
    let world = match world {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Failed to load world: {e}");
            std::process::exit(1);
        }
    };

    let store = match Store::open(&save_path, &world) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open save file '{}': {e}", save_path.display());
            std::process::exit(1);
        }
    };

    println!("Welcome to {}!", world.name);
    if !world.desc.trim().is_empty() {
        println!("{}", world.desc.trim());
    }
    println!("Saving to {}", save_path.display());
    println!();
    println!("Type 'start_mission' to wake obot-3, 'help' for commands, 'quit' to exit.\n");

    let mut game = Game::new(world, store);
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes_read = stdin.read_line(&mut input)?;
        if bytes_read == 0 {
            println!("\nGoodbye.");
            break;
        }

        let cmd = match Command::parse_line(&input) {
            None => continue,
            Some(Ok(cmd)) => cmd,
            Some(Err(e)) => {
                println!("{e}. Type 'help' for commands.");
                continue;
            }
        };

        let quit = cmd == Command::Quit;
        flush_output(game.execute(cmd));

        if quit {
            break;
        }
    }

    Ok(())
}
