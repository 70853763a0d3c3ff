use crate::engine::bunker::trigger_hibernation;
use crate::engine::output::Output;
use crate::error::Result;
use crate::store::Store;
use crate::world::World;

/// First candidate whose name contains `query`, case-insensitively.
pub fn find_by_name<'a, T, I, F>(candidates: I, query: &str, name: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> &str,
    T: 'a,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    candidates
        .into_iter()
        .find(|c| name(c).to_lowercase().contains(&query))
}

/// Says why not and returns false if the mission hasn't been started.
pub fn require_mission(out: &mut Output, store: &Store) -> bool {
    if store.state().mission_started {
        return true;
    }
    out.say(
        "🚫 Commander, my systems are not yet activated. Please use 'start_mission' first to initialize my exploration protocols.",
    );
    false
}

/// Deduct `cost` energy, or explain why the action can't happen.
///
/// An action attempted on an empty battery triggers emergency hibernation.
pub fn spend_energy(out: &mut Output, world: &World, store: &mut Store, cost: i32) -> Result<bool> {
    let energy = store.state().energy;

    if energy <= 0 {
        trigger_hibernation(out, world, store);
        return Ok(false);
    }

    if energy < cost {
        out.say(format!(
            "⚠️  **ENERGY CRITICAL** - Current Energy: {}/{}\n\n🤖 Commander, my power reserves are critically low. I cannot perform this action (requires {}).",
            energy,
            store.state().max_energy,
            cost
        ));
        out.say(format!(
            "**OPTIONS:**\n- Return to bunker for recharge\n- Wait for emergency hibernation if energy reaches 0\n\n**WARNING**: If I run out of energy in the field, I'll hibernate for {} days (consuming bunker resources) and only recover to {} energy.",
            world.rules.hibernation_days, world.rules.hibernation_energy
        ));
        return Ok(false);
    }

    store.state_mut().energy = energy - cost;
    Ok(true)
}

pub fn advance_turns(store: &mut Store, turns: u32) {
    store.state_mut().turn_number += turns;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[test]
    fn find_by_name_is_case_insensitive_substring() {
        let items = [Named("Tactical Combat Knife"), Named("Heavy Bike Chain")];
        let hit = find_by_name(&items, "KNIFE", |n| n.0);
        assert_eq!(hit.map(|n| n.0), Some("Tactical Combat Knife"));
        assert!(find_by_name(&items, "", |n| n.0).is_none());
        assert!(find_by_name(&items, "torch", |n| n.0).is_none());
    }
}
