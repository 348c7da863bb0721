//! Round-start initiative ordering.

use crate::actor::Actor;
use crate::character::Attributes;
use crate::dice::{DiceExpr, DiceRoller};
use crate::room::Room;

/// Names of the actors that take part in the coming round: anything not
/// incapacitated, dead, or explicitly idle.
pub fn active_actors(room: &Room) -> Vec<String> {
    room.actors()
        .filter(|a| a.is_active())
        .map(|a| a.name.clone())
        .collect()
}

/// One scored entry of the initiative order.
#[derive(Clone, Debug, PartialEq)]
pub struct InitiativeEntry {
    pub name: String,
    pub score: i32,
}

/// Rolls initiative for `actors` and returns them in acting order.
///
/// Score is d20 + dexterity modifier; ties are broken only by an
/// independent draw from `tiebreak` (lower draw acts first). The order is
/// recomputed fresh every round, never persisted.
pub fn initiative_order(
    actors: &[&Actor],
    roller: &mut dyn DiceRoller,
    mut tiebreak: impl FnMut() -> f64,
) -> Vec<InitiativeEntry> {
    let mut scored: Vec<(InitiativeEntry, f64)> = actors
        .iter()
        .map(|actor| {
            let roll = roller.roll(DiceExpr::D20, 0);
            let score = roll.total + Attributes::modifier(actor.sheet.attributes.dexterity);
            (
                InitiativeEntry {
                    name: actor.name.clone(),
                    score,
                },
                tiebreak(),
            )
        })
        .collect();

    scored.sort_by(|(a, draw_a), (b, draw_b)| {
        b.score
            .cmp(&a.score)
            .then_with(|| draw_a.total_cmp(draw_b))
    });
    scored.into_iter().map(|(entry, _)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterSheet;
    use crate::dice::testing::ScriptedRoller as Scripted;
    use crate::grid::{Position, Tile, TileMap};

    fn actor_with_dex(name: &str, dexterity: i32) -> Actor {
        let mut sheet = CharacterSheet::named(name);
        sheet.attributes.dexterity = dexterity;
        Actor::new(sheet, '@', Position::ORIGIN)
    }

    #[test]
    fn order_is_a_strict_function_of_roll_plus_dex() {
        let a = actor_with_dex("liora", 16); // +3
        let b = actor_with_dex("selra", 10); // +0
        let c = actor_with_dex("brog", 8); // -1

        // Rolls: liora 5 (=8), selra 15 (=15), brog 12 (=11).
        let mut roller = Scripted(vec![5, 15, 12]);
        let order = initiative_order(&[&a, &b, &c], &mut roller, || 0.5);
        let names: Vec<_> = order.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["selra", "brog", "liora"]);
        assert_eq!(order[0].score, 15);
        assert_eq!(order[1].score, 11);
        assert_eq!(order[2].score, 8);
    }

    #[test]
    fn ties_are_broken_only_by_the_supplied_draw() {
        let a = actor_with_dex("liora", 10);
        let b = actor_with_dex("selra", 10);

        // Identical scores; the draw sequence decides, lower first.
        let mut roller = Scripted(vec![10, 10]);
        let mut draws = vec![0.9, 0.1].into_iter();
        let order = initiative_order(&[&a, &b], &mut roller, || draws.next().unwrap());
        let names: Vec<_> = order.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["selra", "liora"]);

        // Swapping the draws swaps the order, nothing else changes.
        let mut roller = Scripted(vec![10, 10]);
        let mut draws = vec![0.1, 0.9].into_iter();
        let order = initiative_order(&[&a, &b], &mut roller, || draws.next().unwrap());
        let names: Vec<_> = order.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["liora", "selra"]);
    }

    #[test]
    fn inactive_actors_are_filtered_from_the_roster() {
        let mut room = Room::new(
            "clearing",
            "",
            TileMap::filled(5, 5, Tile::floor(' ', "floor")),
        );
        room.add_actor(actor_with_dex("liora", 10)).unwrap();

        let mut sleeper = actor_with_dex("selra", 10);
        sleeper.position = Position::new(1, 0);
        sleeper
            .sheet
            .conditions
            .insert(crate::character::Conditions::SLEEPING);
        room.add_actor(sleeper).unwrap();

        let mut idle = actor_with_dex("brog", 10);
        idle.position = Position::new(2, 0);
        idle.control = crate::actor::ControlMode::Idle;
        room.add_actor(idle).unwrap();

        assert_eq!(active_actors(&room), vec!["liora"]);
    }
}
