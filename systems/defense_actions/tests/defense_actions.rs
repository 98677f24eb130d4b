use lane_defence_core::{Command, DefenseId, DefenseKind, Event, ThreatId, ThreatKind, TileCoord};
use lane_defence_system_defense_actions::DefenseActions;
use lane_defence_world::{self as world, query, World};

fn resolve_defense_phase(world: &mut World, system: &mut DefenseActions) -> Vec<Event> {
    let mut order = Vec::new();
    system.activation_order(query::turn(world), &query::defense_view(world), &mut order);

    let mut events = Vec::new();
    let mut commands = Vec::new();
    for defense in &order {
        commands.clear();
        let threats = query::threat_view(world);
        system.handle(defense, &threats, &query::occupancy_view(world), &mut commands);
        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }
    }
    events
}

#[test]
fn later_defenses_see_attention_spent_by_earlier_ones() {
    let mut world = World::new(1, 8, 20);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnThreat {
            kind: ThreatKind::Rapid,
            lane: 0,
        },
        &mut events,
    );
    for _ in 0..3 {
        world::apply(
            &mut world,
            Command::StepThreat {
                threat: ThreatId::new(0),
            },
            &mut events,
        );
    }
    world::apply(
        &mut world,
        Command::SpawnThreat {
            kind: ThreatKind::Standard,
            lane: 0,
        },
        &mut events,
    );
    for (kind, position) in [
        (DefenseKind::Thrower, 1),
        (DefenseKind::PassiveZone, 2),
        (DefenseKind::Thrower, 3),
        (DefenseKind::Distractor, 6),
    ] {
        world::apply(
            &mut world,
            Command::PlaceDefense {
                kind,
                tile: TileCoord::new(0, position),
            },
            &mut events,
        );
    }
    assert_eq!(query::balance(&world), 3);

    let mut system = DefenseActions::new();
    let distractions: Vec<_> = resolve_defense_phase(&mut world, &mut system)
        .into_iter()
        .filter_map(|event| match event {
            Event::ThreatDistracted {
                threat,
                source,
                attention,
            } => Some((threat.get(), source.map(|id| id.get()), attention)),
            _ => None,
        })
        .collect();

    assert_eq!(
        distractions,
        vec![
            (0, Some(0), 2),
            (0, Some(1), 1),
            (0, Some(2), 0),
            (1, Some(3), 3),
        ]
    );
}

#[test]
fn persistent_thrower_seeds_lure_that_a_threat_collects() {
    let mut world = World::new(1, 8, 10);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceDefense {
            kind: DefenseKind::PersistentThrower,
            tile: TileCoord::new(0, 2),
        },
        &mut events,
    );

    let mut system = DefenseActions::new();
    let dropped = resolve_defense_phase(&mut world, &mut system);
    assert_eq!(
        dropped,
        vec![Event::LureDropped {
            source: DefenseId::new(0),
            tile: TileCoord::new(0, 5),
        }]
    );

    world::apply(
        &mut world,
        Command::SpawnThreat {
            kind: ThreatKind::Standard,
            lane: 0,
        },
        &mut events,
    );
    events.clear();
    for _ in 0..2 {
        world::apply(
            &mut world,
            Command::StepThreat {
                threat: ThreatId::new(0),
            },
            &mut events,
        );
    }
    assert!(events.contains(&Event::LureCollected {
        threat: ThreatId::new(0),
        tile: TileCoord::new(0, 5),
    }));
}
