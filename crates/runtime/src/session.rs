//! The combat session driver.
//!
//! Drives a [`DicePool`] through the turn/combat lifecycle in order:
//! `begin_combat → (begin_turn → play_die* → end_turn)* → finish_combat`.
//! Every step is synchronous; queued events are drained into the sink after
//! the step that produced them completes.

use dice_core::{DicePool, Die, PcgRng, PoolError, StatusKind};
use dice_content::DieTemplateRegistry;

use crate::replay::TurnRecord;
use crate::resolver::EventSink;

/// Session construction errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The loadout referenced a template the registry does not know.
    #[error("unknown die template '{0}'")]
    UnknownTemplate(String),

    /// The loadout was empty.
    #[error("loadout must contain at least one die")]
    EmptyLoadout,

    /// A pool lifecycle operation failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Configuration for one combat session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Die template names drawn from the content registry, in pool order.
    pub loadout: Vec<String>,

    /// Deterministic seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

/// Synchronous driver for one combat.
pub struct CombatSession<S: EventSink> {
    pool: DicePool,
    rng: PcgRng,
    sink: S,
    seed: u64,
    history: Vec<TurnRecord>,
}

impl<S: EventSink> CombatSession<S> {
    /// Builds a session from a loadout of content templates.
    pub fn new(
        config: SessionConfig,
        templates: &DieTemplateRegistry,
        sink: S,
    ) -> Result<Self, SessionError> {
        if config.loadout.is_empty() {
            return Err(SessionError::EmptyLoadout);
        }
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut pool = DicePool::new(seed);
        for name in &config.loadout {
            let die = templates
                .get(name)
                .ok_or_else(|| SessionError::UnknownTemplate(name.clone()))?;
            pool.add_template(die)?;
        }

        tracing::info!(seed, dice = config.loadout.len(), "combat session ready");
        Ok(Self {
            pool,
            rng: PcgRng,
            sink,
            seed,
            history: Vec::new(),
        })
    }

    /// The seed all rolls derive from; log it to reproduce the session.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Starts the combat: combat-start rules fire over the pool.
    pub fn begin_combat(&mut self) {
        self.pool.start_combat(&self.rng);
        tracing::info!(
            modifiers = self.pool.modifiers().len(),
            "combat started"
        );
        self.flush_events();
    }

    /// Rolls a fresh hand for the next turn.
    pub fn begin_turn(&mut self) {
        self.pool.roll_hand(&self.rng);
        let rolls: Vec<i32> = self.pool.hand().iter().map(Die::total_value).collect();
        tracing::info!(turn = self.pool.turn(), ?rolls, "hand rolled");

        self.history.push(TurnRecord {
            turn: self.pool.turn(),
            rolls,
            plays: Vec::new(),
        });
        self.flush_events();
    }

    /// Spends the die at `slot`.
    pub fn play_die(&mut self, slot: usize) -> Result<(), SessionError> {
        self.pool.use_die(slot, &self.rng)?;
        tracing::debug!(slot, remaining = self.pool.unconsumed_count(), "die played");

        if let Some(record) = self.history.last_mut() {
            record.plays.push(slot);
        }
        self.flush_events();
        Ok(())
    }

    /// Spends a reroll charge on the die at `slot`.
    pub fn reroll_die(&mut self, slot: usize) -> Result<(), SessionError> {
        self.pool.reroll_die(slot, &self.rng)?;
        Ok(())
    }

    /// Mirrors the resolver's mana/status state into the pool so gated
    /// conditions can read it.
    pub fn sync_combat_state(&mut self, mana: u32, statuses: &[StatusKind]) {
        self.pool.set_combat_state(mana, statuses);
    }

    /// Ends the turn, applying deferred pool mutations.
    pub fn end_turn(&mut self) {
        self.pool.end_turn();
        tracing::debug!(pool = self.pool.pool().len(), "turn ended");
    }

    /// Ends the combat: combat-end rules fire and modifiers drop.
    pub fn finish_combat(&mut self) {
        self.pool.end_combat(&self.rng);
        tracing::info!(turns = self.history.len(), "combat finished");
        self.flush_events();
    }

    /// The underlying pool, for inspection.
    pub fn pool(&self) -> &DicePool {
        &self.pool
    }

    /// Turn records accumulated so far.
    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// The sink, for reading back aggregated results.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn flush_events(&mut self) {
        let combat = self.pool.drain_combat_events();
        if !combat.is_empty() {
            self.sink.on_combat_events(&combat);
        }
        let mana = self.pool.drain_mana_events();
        if !mana.is_empty() {
            self.sink.on_mana_events(&mana);
        }
    }
}
