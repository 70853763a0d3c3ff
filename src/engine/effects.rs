use crate::engine::combat::enter_maintenance_mode;
use crate::engine::output::Output;
use crate::error::Result;
use crate::store::{EffectType, Store};
use crate::world::World;

/// Apply one turn of every active effect.
///
/// Only timed effects bite: they deal their damage, count down and disappear at
/// zero. Persistent ones sit on the chassis doing nothing per turn until they are
/// cleaned off at the bunker. Reaching zero health drops the robot into
/// maintenance mode and ends the tick.
pub fn tick_effects(out: &mut Output, world: &World, store: &mut Store) -> Result<()> {
    let effects: Vec<_> = store
        .effects()
        .iter()
        .filter(|e| e.duration > 0)
        .cloned()
        .collect();

    for effect in effects {
        let health = (store.state().health - effect.damage).max(0);
        store.state_mut().health = health;
        out.event(tick_message(effect.kind, effect.damage, health, world.rules.max_health));

        store.set_effect_duration(&effect.id, effect.duration - 1);

        if health <= 0 {
            enter_maintenance_mode(out, world, store)?;
            break;
        }
    }
    Ok(())
}

fn tick_message(kind: EffectType, damage: i32, health: i32, max: i32) -> String {
    match kind {
        EffectType::AcidBurn => format!(
            "🧪 Acid continues eating through obot-3's plating! (-{damage} health, {health}/{max})"
        ),
        EffectType::Attached => format!(
            "🦠 The bacteria colony clinging to obot-3 keeps corroding its chassis! (-{damage} health, {health}/{max})"
        ),
        EffectType::ElectricalGlitch => format!(
            "⚡ Residual current arcs through obot-3's circuits! (-{damage} health, {health}/{max})"
        ),
    }
}

/// One-line summary for the status screen.
pub fn describe_effect(kind: EffectType, duration: i32, persistent: bool) -> String {
    let label = match kind {
        EffectType::AcidBurn => "🧪 Acid Burn",
        EffectType::Attached => "🦠 Attached Bacteria",
        EffectType::ElectricalGlitch => "⚡ Electrical Glitch",
    };
    if persistent {
        format!("{label} (persistent - requires bunker decontamination)")
    } else {
        format!("{label} ({duration} turns remaining)")
    }
}
