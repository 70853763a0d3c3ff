//! The command surface: tool calls from a host harness, or typed lines from the REPL.

use serde_json::Value;

use crate::error::{GameError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartMission,
    Explore,
    Move { direction: String },
    Interact { target: String, action: String },
    Inventory,
    Status,
    Rest { duration: String },
    ReturnToBunker,
    BunkerStatus,
    PurifyWater,
    RestAndRecharge,
    UsePlasmaTorch { direction: String },
    AccessDiscoveredIntel { kind: Option<String> },
    EquipFromBunker { item_name: Option<String> },
    Navigate { destination: String },
    NewGame,
    Help,
    Quit,
}

pub const TOOL_NAMES: [&str; 16] = [
    "start_mission",
    "explore",
    "move",
    "interact",
    "inventory",
    "status",
    "rest",
    "return_to_bunker",
    "bunker_status",
    "purify_water",
    "rest_and_recharge",
    "use_plasma_torch",
    "access_discovered_intel",
    "equip_from_bunker",
    "navigate",
    "new_game",
];

pub const HELP: &str = "\
Commands:
  start_mission                 wake obot-3 up
  explore                       scan the current area
  move <direction>              (or n/s/e/w/u/d)
  interact <target> <action>    action: examine, take, drop, use, attack, move
  take|drop|use|examine|attack <target>
  inventory | status
  rest <short|long>
  return_to_bunker | bunker_status | purify_water | rest_and_recharge
  use_plasma_torch <up|down>
  access_discovered_intel [type]
  equip_from_bunker [item name]
  navigate <room>
  new_game | help | quit";

fn str_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required(args: &Value, key: &'static str) -> Result<String> {
    str_arg(args, key).ok_or(GameError::MissingArgument(key))
}

impl Command {
    /// Build a command from a tool name and its JSON arguments.
    pub fn from_tool_call(name: &str, args: &Value) -> Result<Command> {
        let cmd = match name.trim() {
            "start_mission" => Command::StartMission,
            "explore" => Command::Explore,
            "move" => Command::Move {
                direction: required(args, "direction")?,
            },
            "interact" => Command::Interact {
                target: required(args, "target")?,
                action: required(args, "action")?,
            },
            "inventory" => Command::Inventory,
            "status" => Command::Status,
            "rest" => Command::Rest {
                duration: required(args, "duration")?,
            },
            "return_to_bunker" => Command::ReturnToBunker,
            "bunker_status" => Command::BunkerStatus,
            "purify_water" => Command::PurifyWater,
            "rest_and_recharge" => Command::RestAndRecharge,
            "use_plasma_torch" => Command::UsePlasmaTorch {
                direction: required(args, "direction")?,
            },
            "access_discovered_intel" => Command::AccessDiscoveredIntel {
                kind: str_arg(args, "type"),
            },
            "equip_from_bunker" => Command::EquipFromBunker {
                item_name: str_arg(args, "item_name"),
            },
            "navigate" => Command::Navigate {
                destination: required(args, "destination")?,
            },
            "new_game" => Command::NewGame,
            other => return Err(GameError::UnknownCommand(other.to_string())),
        };
        Ok(cmd)
    }

    /// Parse a typed line. Returns `None` for blank input.
    pub fn parse_line(input: &str) -> Option<Result<Command>> {
        let mut parts = input.split_whitespace();
        let verb = parts.next()?.to_lowercase();
        let rest: Vec<&str> = parts.collect();
        let joined = rest.join(" ");
        let arg = || Some(joined.clone()).filter(|s| !s.is_empty());

        let need = |key: &'static str| arg().ok_or(GameError::MissingArgument(key));

        let cmd = match verb.as_str() {
            "start_mission" | "start" => Ok(Command::StartMission),
            "explore" | "look" | "l" | "scan" => Ok(Command::Explore),
            "n" | "s" | "e" | "w" | "u" | "d" | "north" | "south" | "east" | "west" | "up"
            | "down" => Ok(Command::Move {
                direction: verb.clone(),
            }),
            "move" | "go" => need("direction").map(|direction| Command::Move { direction }),
            "interact" => match rest.split_last() {
                Some((action, target)) if !target.is_empty() => Ok(Command::Interact {
                    target: target.join(" "),
                    action: action.to_string(),
                }),
                _ => Err(GameError::MissingArgument("target")),
            },
            "take" | "get" | "drop" | "use" | "examine" | "x" | "attack" | "push" => {
                need("target").map(|target| Command::Interact {
                    target,
                    action: verb.clone(),
                })
            }
            "inventory" | "i" | "inv" => Ok(Command::Inventory),
            "status" => Ok(Command::Status),
            "rest" => need("duration").map(|duration| Command::Rest { duration }),
            "return_to_bunker" | "return" => Ok(Command::ReturnToBunker),
            "bunker_status" | "bunker" => Ok(Command::BunkerStatus),
            "purify_water" | "purify" => Ok(Command::PurifyWater),
            "rest_and_recharge" | "recharge" => Ok(Command::RestAndRecharge),
            "use_plasma_torch" | "torch" => {
                need("direction").map(|direction| Command::UsePlasmaTorch { direction })
            }
            "access_discovered_intel" | "intel" => {
                Ok(Command::AccessDiscoveredIntel { kind: arg() })
            }
            "equip_from_bunker" | "equip" => Ok(Command::EquipFromBunker { item_name: arg() }),
            "navigate" | "goto" => {
                need("destination").map(|destination| Command::Navigate { destination })
            }
            "new_game" => Ok(Command::NewGame),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(GameError::UnknownCommand(verb.clone())),
        };
        Some(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_calls_map_to_commands() {
        assert_eq!(
            Command::from_tool_call("interact", &json!({"target": "boxes", "action": "move"}))
                .expect("interact"),
            Command::Interact {
                target: "boxes".into(),
                action: "move".into()
            }
        );
        assert_eq!(
            Command::from_tool_call("access_discovered_intel", &json!({})).expect("intel"),
            Command::AccessDiscoveredIntel { kind: None }
        );
        assert!(matches!(
            Command::from_tool_call("move", &json!({})),
            Err(GameError::MissingArgument("direction"))
        ));
        assert!(matches!(
            Command::from_tool_call("dance", &Value::Null),
            Err(GameError::UnknownCommand(_))
        ));
    }

    #[test]
    fn every_tool_name_parses() {
        let args = json!({
            "direction": "up",
            "target": "radio",
            "action": "use",
            "duration": "short",
            "destination": "bunker"
        });
        for name in TOOL_NAMES {
            assert!(Command::from_tool_call(name, &args).is_ok(), "{name}");
        }
    }

    #[test]
    fn typed_lines() {
        assert!(Command::parse_line("   ").is_none());
        assert_eq!(
            Command::parse_line("interact bag of funyuns take")
                .expect("line")
                .expect("cmd"),
            Command::Interact {
                target: "bag of funyuns".into(),
                action: "take".into()
            }
        );
        assert_eq!(
            Command::parse_line("take energy cell")
                .expect("line")
                .expect("cmd"),
            Command::Interact {
                target: "energy cell".into(),
                action: "take".into()
            }
        );
        assert_eq!(
            Command::parse_line("N").expect("line").expect("cmd"),
            Command::Move {
                direction: "n".into()
            }
        );
        assert!(matches!(
            Command::parse_line("navigate"),
            Some(Err(GameError::MissingArgument("destination")))
        ));
    }
}
