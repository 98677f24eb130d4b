#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that converts generator cadence and passive income into ledger credits.

use lane_defence_core::{Command, DefenseEffect, DefenseView};

/// Configuration parameters required to construct the generation system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    passive_income: u32,
}

impl Config {
    /// Creates a configuration crediting `passive_income` units every turn.
    #[must_use]
    pub const fn new(passive_income: u32) -> Self {
        Self { passive_income }
    }
}

/// Generation system emitting resource credits for the generator phase.
#[derive(Debug)]
pub struct Generation {
    passive_income: u32,
}

impl Generation {
    /// Creates a new generation system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            passive_income: config.passive_income,
        }
    }

    /// Emits credits for the turn: passive income first, then each due
    /// generator in lane-major, position-minor order.
    pub fn handle(&self, turn: u64, defenses: &DefenseView, out: &mut Vec<Command>) {
        if self.passive_income > 0 {
            out.push(Command::CreditResources {
                amount: self.passive_income,
                source: None,
            });
        }

        let mut due: Vec<_> = defenses
            .iter()
            .filter(|defense| defense.is_due(turn))
            .filter_map(|defense| match defense.kind.effect() {
                DefenseEffect::Generate { amount } => Some((defense.tile, defense.id, amount)),
                _ => None,
            })
            .collect();
        due.sort_unstable();

        out.extend(
            due.into_iter()
                .map(|(_, id, amount)| Command::CreditResources {
                    amount,
                    source: Some(id),
                }),
        );
    }
}
