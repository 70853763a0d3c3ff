use crate::engine::effects::describe_effect;
use crate::engine::output::Output;
use crate::store::Store;
use crate::world::{ContentKind, World};

//////////////
/// STATUS ///
//////////////

pub fn render_status(out: &mut Output, world: &World, store: &Store) {
    let s = store.state();
    let max_health = world.rules.max_health;
    let capacity = world.rules.carry_capacity;

    out.title("🤖 **OBOT-3 SYSTEM STATUS**");

    let mut report = format!(
        "📍 **Location:** {}\n❤️  **Structural Integrity:** {}/{}\n🔋 **Energy:** {}/{}\n⚖️  **Load:** {:.1}/{:.1} lbs\n⏱️  **Turn:** {}\n📅 **Day {} After the Incident**",
        world.room_name(&s.current_room),
        s.health,
        max_health,
        s.energy,
        s.max_energy,
        s.carrying_weight,
        capacity,
        s.turn_number,
        s.days_since_incident
    );
    if s.in_combat {
        report.push_str("\n⚔️  **COMBAT ACTIVE** - hostiles engaged");
    }
    if s.game_completed {
        report.push_str("\n🎉 **MISSION COMPLETE**");
    }
    out.say(report);

    let effects: Vec<String> = store
        .effects()
        .iter()
        .filter(|e| e.is_active())
        .map(|e| format!("  • {}", describe_effect(e.kind, e.duration, e.is_persistent())))
        .collect();
    if !effects.is_empty() {
        out.say(format!("🩹 **ACTIVE EFFECTS:**\n{}", effects.join("\n")));
    }

    if s.health <= 20 {
        out.event("🚨 **CRITICAL DAMAGE** - Immediate repairs required!");
    } else if s.health <= 50 {
        out.event("⚠️  **DAMAGED** - Repairs recommended.");
    }
    if s.energy <= 20 {
        out.event("🔋 **LOW POWER** - Return to the bunker to recharge.");
    }
}

/////////////////
/// INVENTORY ///
/////////////////

pub fn render_inventory(out: &mut Output, world: &World, store: &Store) {
    let items = store.inventory();
    let weight = store.carrying_weight();
    let capacity = world.rules.carry_capacity;

    out.title("🎒 **OBOT-3 CARGO HOLD**");

    if items.is_empty() {
        out.say("📦 Cargo hold is empty.");
    } else {
        let mut s = String::new();
        for item in &items {
            if !s.is_empty() {
                s.push('\n');
            }
            s.push_str(&format!(
                "  • {} ({}lbs) - {}",
                item.name,
                item.weight,
                item.kind.as_str()
            ));
        }
        out.say(s);
    }

    out.say(format!(
        "⚖️  **Carrying Capacity:** {weight:.1}/{capacity:.1} lbs"
    ));

    if weight >= world.rules.critical_load {
        out.event("🚨 **WARNING:** Approaching critical weight - may drop items!");
    } else if weight >= world.rules.heavy_load {
        out.event("⚠️  **CAUTION:** Heavy load - occasional drops possible");
    }
}

/////////////
/// INTEL ///
/////////////

/// `access_discovered_intel(type?)`: a grouped index, or every file of one kind in full.
pub fn handle_access_discovered_intel(out: &mut Output, store: &Store, kind: Option<&str>) {
    out.title("🧠 **OBOT-3 MEMORY BANKS - DISCOVERED INTELLIGENCE**");

    let files: Vec<_> = store.discovered().collect();
    if files.is_empty() {
        out.say(
            "📄 No intelligence gathered yet. Use items like radios, journals and blueprints to uncover what happened here.",
        );
        return;
    }

    let available: Vec<ContentKind> = ContentKind::ALL
        .into_iter()
        .filter(|k| files.iter().any(|f| f.kind == *k))
        .collect();
    let available_list = available
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let Some(kind) = kind.map(str::trim).filter(|k| !k.is_empty()) else {
        for k in &available {
            let mut s = format!("{} **{} FILES:**", k.icon(), k.as_str().to_uppercase());
            for f in files.iter().filter(|f| f.kind == *k) {
                s.push_str(&format!("\n  • {} (from {})", f.title, f.source_item));
            }
            out.say(s);
        }
        out.say(format!(
            "💡 Use 'access_discovered_intel' with a type to read full files. Available: {available_list}"
        ));
        return;
    };

    let Some(kind) = ContentKind::parse(kind) else {
        out.say(format!(
            "❓ Unknown intelligence type \"{kind}\". Available: {available_list}"
        ));
        return;
    };

    let matching: Vec<_> = files.iter().filter(|f| f.kind == kind).collect();
    if matching.is_empty() {
        out.say(format!(
            "📄 No {} files discovered yet. Available: {available_list}",
            kind.as_str()
        ));
        return;
    }

    for (n, f) in matching.iter().enumerate() {
        out.say(format!(
            "📄 **FILE {}: {}**\nSource: {}\nDiscovered: {}\n\n{}\n{}",
            n + 1,
            f.title,
            f.source_item,
            f.discovered_at.format("%Y-%m-%d %H:%M UTC"),
            f.body.trim_end(),
            "=".repeat(60)
        ));
    }
}
