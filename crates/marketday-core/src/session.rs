//! A single game session.
//!
//! A [`Session`] owns everything one game needs: its clock, its market,
//! the production yield multipliers, the auction seed generator, and the
//! controller for the current phase. It is driven entirely by
//! [`Session::apply`], one event at a time, and is never shared: the
//! dispatcher task that owns it is the only code that mutates it.

use std::sync::Arc;
use std::time::Duration;

use marketday_market::Market;
use marketday_types::{ClientMessage, CommodityTable, CommodityType, Phase, ServerMessage, SessionId};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::clock::SessionClock;
use crate::config::SessionRules;
use crate::dispatch::Event;
use crate::phase::PhaseController;
use crate::player::{Broadcaster, PlayerHandle};

/// Convert a duration to whole milliseconds for the wire.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Session state shared by every phase controller.
pub(crate) struct SessionContext {
    id: SessionId,
    name: String,
    rules: SessionRules,
    clock: SessionClock,
    market: Market,
    yields: CommodityTable,
    rng: StdRng,
    broadcaster: Arc<dyn Broadcaster>,
}

impl SessionContext {
    pub(crate) const fn now(&self) -> Duration {
        self.clock.now()
    }

    pub(crate) const fn rules(&self) -> &SessionRules {
        &self.rules
    }

    pub(crate) const fn market_mut(&mut self) -> &mut Market {
        &mut self.market
    }

    pub(crate) const fn market(&self) -> &Market {
        &self.market
    }

    pub(crate) fn set_timeout(&mut self, duration: Duration) {
        self.clock.set_timeout(duration);
    }

    pub(crate) fn next_seed(&mut self) -> u32 {
        self.rng.random::<u32>()
    }

    /// Send `message` to every player. Failures are logged, never raised.
    pub(crate) fn broadcast(&self, message: &ServerMessage) {
        if let Err(e) = self.broadcaster.broadcast(message) {
            warn!(session = %self.name, error = %e, "Broadcast incomplete");
        }
    }

    /// Send `message` to one player. Failures are logged, never raised.
    pub(crate) fn unicast(&self, player: &PlayerHandle, message: &ServerMessage) {
        if let Err(e) = player.deliver(message) {
            warn!(session = %self.name, player = %player.id(), error = %e, "Unicast failed");
        }
    }
}

/// One game: its shared state plus the active phase controller.
pub struct Session {
    ctx: SessionContext,
    phase: PhaseController,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.ctx.id)
            .field("name", &self.ctx.name)
            .field("phase", &self.phase.kind())
            .field("clock", &self.ctx.clock)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session in the [`Phase::Waiting`] lobby.
    ///
    /// Auction seeds are drawn from `rng`, so a seeded generator makes a
    /// whole game reproducible.
    pub fn new(
        name: impl Into<String>,
        rules: SessionRules,
        broadcaster: Arc<dyn Broadcaster>,
        rng: StdRng,
    ) -> Self {
        let mut ctx = SessionContext {
            id: SessionId::new(),
            name: name.into(),
            rules,
            clock: SessionClock::new(),
            market: Market::new(rules.market),
            yields: CommodityType::ALL.into_iter().map(|c| (c, 1.0)).collect(),
            rng,
            broadcaster,
        };
        let mut phase = PhaseController::new(Phase::Waiting, &rules);
        phase.begin(&mut ctx);
        info!(session = %ctx.name, id = %ctx.id, "Session created");
        Self { ctx, phase }
    }

    /// Unique identifier of this session.
    pub const fn id(&self) -> SessionId {
        self.ctx.id
    }

    /// The game name players join by.
    pub fn name(&self) -> &str {
        &self.ctx.name
    }

    /// The current phase.
    pub const fn phase(&self) -> Phase {
        self.phase.kind()
    }

    /// The controller for the current phase.
    pub const fn controller(&self) -> &PhaseController {
        &self.phase
    }

    /// The session clock and its pending deadline.
    pub const fn clock(&self) -> &SessionClock {
        &self.ctx.clock
    }

    /// The session's market.
    pub const fn market(&self) -> &Market {
        self.ctx.market()
    }

    /// Current production yield multiplier per commodity.
    pub const fn yields(&self) -> &CommodityTable {
        &self.ctx.yields
    }

    /// The rules this session runs under.
    pub const fn rules(&self) -> &SessionRules {
        self.ctx.rules()
    }

    /// Apply one event to the session.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Player { player, message } => self.receive(&player, &message),
            Event::Tick { elapsed } => self.tick(elapsed),
        }
    }

    /// Advance the clock to `now`, firing the phase timer if the deadline
    /// has passed.
    pub fn tick(&mut self, now: Duration) {
        if self.ctx.clock.advance(now) {
            debug!(
                session = %self.ctx.name,
                phase = %self.phase.kind(),
                now_ms = duration_ms(now),
                "Deadline fired"
            );
            if let Some(next) = self.phase.timer(&mut self.ctx) {
                self.change_phase(next);
            }
        }
    }

    /// Handle a message from `player`.
    ///
    /// Session-level messages are handled first, in every phase; the
    /// message is then forwarded to the current phase controller.
    pub fn receive(&mut self, player: &PlayerHandle, message: &ClientMessage) {
        debug!(
            session = %self.ctx.name,
            player = %player.id(),
            action = message.action(),
            phase = %self.phase.kind(),
            "Message received"
        );

        match message {
            ClientMessage::Join => {
                self.ctx.unicast(
                    player,
                    &ServerMessage::Welcome {
                        game: self.ctx.name.clone(),
                        state: self.phase.kind(),
                    },
                );
                self.ctx.unicast(
                    player,
                    &ServerMessage::Effect {
                        yield_rates: self.ctx.yields.clone(),
                    },
                );
            }
            ClientMessage::SetName { name } => player.set_name(name.clone()),
            ClientMessage::ApplyEffect {
                price_modifier,
                yield_rate_modifier,
            } => self.apply_effect(price_modifier, yield_rate_modifier),
            _ => {}
        }

        if let Some(next) = self.phase.receive(&mut self.ctx, player, message) {
            self.change_phase(next);
        }
    }

    /// Replace the current phase with `next`.
    ///
    /// Ends the current controller, clears the deadline, announces the new
    /// phase, then installs and begins the new controller.
    pub fn change_phase(&mut self, next: Phase) {
        let previous = self.phase.kind();
        self.phase.end();
        info!(session = %self.ctx.name, from = %previous, to = %next, "Phase changed");

        self.ctx.clock.clear();
        self.ctx
            .broadcast(&ServerMessage::StateChanged { new_state: next });

        self.phase = PhaseController::new(next, &self.ctx.rules);
        self.phase.begin(&mut self.ctx);
    }

    fn apply_effect(&mut self, price_modifier: &CommodityTable, yield_rate_modifier: &CommodityTable) {
        self.ctx.market.apply_modifier(price_modifier);
        for (commodity, rate) in &mut self.ctx.yields {
            if let Some(factor) = yield_rate_modifier.get(commodity) {
                *rate *= factor;
            }
        }
        debug!(session = %self.ctx.name, yields = ?self.ctx.yields, "Effect applied");
        self.ctx.broadcast(&ServerMessage::Effect {
            yield_rates: self.ctx.yields.clone(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::testing::{expected_seeds, test_rng, RecordingBroadcaster, TestPlayer};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn session(broadcaster: &RecordingBroadcaster) -> Session {
        Session::new(
            "test",
            SessionRules::default(),
            Arc::new(broadcaster.clone()),
            test_rng(),
        )
    }

    fn join(session: &mut Session, player: &TestPlayer) {
        session.receive(&player.handle(), &ClientMessage::Join);
    }

    fn ready(session: &mut Session, player: &TestPlayer) {
        session.receive(&player.handle(), &ClientMessage::Ready);
    }

    #[test]
    fn new_session_waits_without_deadline() {
        let broadcaster = RecordingBroadcaster::new();
        let session = session(&broadcaster);
        assert_eq!(session.phase(), Phase::Waiting);
        assert_eq!(session.clock().deadline(), None);
        assert_eq!(session.name(), "test");
        assert!(broadcaster.messages().is_empty());
    }

    #[test]
    fn join_is_welcomed_with_current_yields() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        let alice = TestPlayer::new("alice");

        join(&mut session, &alice);

        let received = alice.received();
        assert_eq!(received.len(), 2);
        assert_eq!(
            received.first(),
            Some(&ServerMessage::Welcome {
                game: String::from("test"),
                state: Phase::Waiting,
            })
        );
        assert_eq!(
            received.get(1),
            Some(&ServerMessage::Effect {
                yield_rates: session.yields().clone(),
            })
        );
        assert!(broadcaster.messages().is_empty());
    }

    #[test]
    fn set_name_renames_player() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        let alice = TestPlayer::new("alice");

        session.receive(
            &alice.handle(),
            &ClientMessage::SetName {
                name: String::from("Alice the Grower"),
            },
        );
        assert_eq!(alice.name(), "Alice the Grower");
    }

    #[test]
    fn apply_effect_scales_prices_and_yields() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        let alice = TestPlayer::new("alice");

        let mut prices = CommodityTable::new();
        prices.insert(CommodityType::Tomato, 2.0);
        let mut yields = CommodityTable::new();
        yields.insert(CommodityType::Corn, 0.5);

        session.receive(
            &alice.handle(),
            &ClientMessage::ApplyEffect {
                price_modifier: prices,
                yield_rate_modifier: yields,
            },
        );

        assert_eq!(session.market().modifier(CommodityType::Tomato), 2.0);
        assert_eq!(session.yields().get(&CommodityType::Corn), Some(&0.5));
        assert_eq!(session.yields().get(&CommodityType::Tomato), Some(&1.0));
        assert_eq!(
            broadcaster.messages(),
            vec![ServerMessage::Effect {
                yield_rates: session.yields().clone(),
            }]
        );
    }

    #[test]
    fn all_ready_starts_production() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        let alice = TestPlayer::new("alice");
        let bob = TestPlayer::new("bob");

        join(&mut session, &alice);
        join(&mut session, &bob);
        ready(&mut session, &alice);
        assert_eq!(session.phase(), Phase::Waiting);
        ready(&mut session, &bob);

        assert_eq!(session.phase(), Phase::Production);
        assert_eq!(session.clock().deadline(), Some(ms(10_000)));
        assert_eq!(
            broadcaster.messages(),
            vec![
                ServerMessage::StateChanged {
                    new_state: Phase::Production
                },
                ServerMessage::SetClock { duration_ms: 10_000 },
            ]
        );
    }

    #[test]
    fn change_phase_clears_pending_deadline() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);

        session.change_phase(Phase::Production);
        assert!(session.clock().deadline().is_some());

        session.change_phase(Phase::Waiting);
        assert_eq!(session.clock().deadline(), None);
    }

    #[test]
    fn deadline_does_not_fire_on_equal_tick() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        session.change_phase(Phase::Production);

        session.tick(ms(10_000));
        assert_eq!(session.phase(), Phase::Production);

        session.tick(ms(10_001));
        assert_eq!(session.phase(), Phase::Auction);
    }

    #[test]
    fn late_tick_fires_timer_once() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        session.change_phase(Phase::Production);

        session.tick(ms(60_000));
        assert_eq!(session.phase(), Phase::Auction);

        // An older tick arriving late must not fire anything.
        broadcaster.clear();
        session.tick(ms(30_000));
        assert_eq!(session.phase(), Phase::Auction);
        assert!(broadcaster.messages().is_empty());
    }

    #[test]
    fn phase_ignores_actions_meant_for_other_phases() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        let alice = TestPlayer::new("alice");
        session.change_phase(Phase::Production);
        broadcaster.clear();

        session.receive(&alice.handle(), &ClientMessage::Bid { amount: 10 });
        session.receive(
            &alice.handle(),
            &ClientMessage::Sell {
                commodity: String::from("corn"),
                quantity: 1,
            },
        );

        assert!(broadcaster.messages().is_empty());
        assert!(alice.received().is_empty());
        assert_eq!(
            session.market().commodity(CommodityType::Corn).map(|c| c.supply()),
            Some(100)
        );
    }

    #[test]
    fn full_cycle_without_bids() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        let alice = TestPlayer::new("alice");
        let bob = TestPlayer::new("bob");

        join(&mut session, &alice);
        join(&mut session, &bob);
        ready(&mut session, &alice);
        ready(&mut session, &bob);
        assert_eq!(session.phase(), Phase::Production);
        assert_eq!(session.clock().deadline(), Some(ms(10_000)));

        session.tick(ms(10_001));
        assert_eq!(session.phase(), Phase::Auction);
        session.tick(ms(15_002));
        session.tick(ms(20_003));
        assert_eq!(session.phase(), Phase::Auction);
        session.tick(ms(25_004));
        assert_eq!(session.phase(), Phase::Trade);

        let seeds = expected_seeds(3);
        let expected = vec![
            ServerMessage::StateChanged {
                new_state: Phase::Production,
            },
            ServerMessage::SetClock { duration_ms: 10_000 },
            ServerMessage::StateChanged {
                new_state: Phase::Auction,
            },
            ServerMessage::AuctionSeed { seed: seeds[0] },
            ServerMessage::SetClock { duration_ms: 5_000 },
            ServerMessage::AuctionSeed { seed: seeds[1] },
            ServerMessage::SetClock { duration_ms: 5_000 },
            ServerMessage::AuctionSeed { seed: seeds[2] },
            ServerMessage::SetClock { duration_ms: 5_000 },
            ServerMessage::StateChanged {
                new_state: Phase::Trade,
            },
            ServerMessage::PriceUpdated {
                prices: session.market().prices(),
            },
            ServerMessage::SetClock { duration_ms: 10_000 },
        ];
        assert_eq!(broadcaster.messages(), expected);

        assert!(!alice.received().contains(&ServerMessage::AuctionWon));
        assert!(!bob.received().contains(&ServerMessage::AuctionWon));

        // Trading closes back into production.
        session.tick(ms(35_005));
        assert_eq!(session.phase(), Phase::Production);
    }

    #[test]
    fn apply_routes_events() {
        let broadcaster = RecordingBroadcaster::new();
        let mut session = session(&broadcaster);
        let alice = TestPlayer::new("alice");

        session.apply(Event::Player {
            player: alice.handle(),
            message: ClientMessage::Join,
        });
        session.apply(Event::Tick { elapsed: ms(300) });

        assert_eq!(alice.received().len(), 2);
        assert_eq!(session.clock().now(), ms(300));
    }

    #[test]
    fn duration_ms_saturates() {
        assert_eq!(duration_ms(ms(1_500)), 1_500);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }
}
