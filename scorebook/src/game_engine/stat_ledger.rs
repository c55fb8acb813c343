use super::{
    EngineError, Result,
    game_log::{EventContext, GameLog},
    penalty::ActivePenalty,
    roster::{PlayerRef, Roster},
};
use lax_common::{bundles::HomeAwayBundle, game_snapshot::PenaltySnapshot, stats::StatKind};
use log::*;

/// What a successful `record` did besides bumping the requested counter
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub goal: bool,
    pub assisted_by: Option<PlayerRef>,
    /// Set when a penalty counter was recorded, which issues a penalty
    pub penalty: Option<PenaltySnapshot>,
}

/// Borrows the parts of the game a stat can touch for the length of one
/// `record` call. The last passer slot belongs to the engine and is handed in
/// here, the ledger keeps no state of its own.
pub(crate) struct StatLedger<'a> {
    pub(crate) roster: &'a mut Roster,
    pub(crate) scores: &'a mut HomeAwayBundle<u16>,
    pub(crate) last_passer: &'a mut Option<PlayerRef>,
    pub(crate) log: &'a mut GameLog,
    pub(crate) teammate_assists_only: bool,
}

impl StatLedger<'_> {
    /// Nothing is changed unless every check passes
    pub(crate) fn record(
        &mut self,
        ctx: &EventContext,
        player: PlayerRef,
        stat: StatKind,
        amount: i32,
    ) -> Result<RecordOutcome> {
        let amount = u32::try_from(amount)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(EngineError::InvalidAmount(amount))?;
        if stat.is_penalty_stat() {
            // The amount is the penalty length in seconds
            let penalty = self.issue_penalty(ctx, player, amount)?;
            return Ok(RecordOutcome {
                penalty: Some(penalty),
                ..Default::default()
            });
        }

        {
            let stats = &mut self
                .roster
                .get_mut(player)
                .ok_or(EngineError::NotFound(player))?
                .stats;
            stats[stat] += amount;
            if stat == StatKind::ShotsOnGoal {
                stats.shots += amount;
            }
        }
        self.log.add_stat(ctx, player, stat, amount);

        let mut outcome = RecordOutcome::default();
        match stat {
            StatKind::Goals => {
                let goals = u16::try_from(amount).unwrap_or(u16::MAX);
                self.scores[player.team] = self.scores[player.team].saturating_add(goals);
                outcome.goal = true;
                outcome.assisted_by = self.take_assist(player);

                if let Some(passer) = outcome.assisted_by {
                    if let Some(p) = self.roster.get_mut(passer) {
                        p.stats.assists += 1;
                    }
                    debug!("Crediting {passer} with the assist on {player}'s goal");
                }
                self.log.add_goal(ctx, player, outcome.assisted_by);
                if let Some(passer) = outcome.assisted_by {
                    self.log.add_assist(ctx, passer, player);
                }
            }
            StatKind::Shots | StatKind::ShotsOnGoal => {
                trace!("{player} is now the last shooter");
                *self.last_passer = Some(player);
            }
            _ => {}
        }

        Ok(outcome)
    }

    /// Appends a clamped penalty to the player and bumps both penalty counters
    pub(crate) fn issue_penalty(
        &mut self,
        ctx: &EventContext,
        player: PlayerRef,
        duration: u32,
    ) -> Result<PenaltySnapshot> {
        let p = self
            .roster
            .get_mut(player)
            .ok_or(EngineError::NotFound(player))?;
        let index = p.penalties.len();
        let pen = ActivePenalty::new(duration, ctx.period, ctx.game_time);
        let snapshot = p.add_penalty(pen).as_snapshot(player.team, player.number, index);
        if snapshot.total_duration != duration {
            debug!("Clamped {player}'s {duration}s penalty to {}s", snapshot.total_duration);
        }
        self.log.add_penalty(ctx, player, snapshot.total_duration);
        Ok(snapshot)
    }

    /// Clears the last passer slot and returns it if that player earns the assist
    fn take_assist(&mut self, scorer: PlayerRef) -> Option<PlayerRef> {
        let passer = self.last_passer.take()?;
        if passer == scorer {
            return None;
        }
        if self.teammate_assists_only && passer.team != scorer.team {
            return None;
        }
        self.roster.contains(passer).then_some(passer)
    }
}

#[cfg(test)]
mod test {
    use super::super::{game_log::GameEventKind, roster::Player, test::initialize};
    use super::*;
    use lax_common::{
        config::NumberScope, game_snapshot::GamePeriod, position::Position, team::Team,
    };
    use time::OffsetDateTime;

    const A: PlayerRef = PlayerRef {
        team: Team::Home,
        number: 7,
    };
    const B: PlayerRef = PlayerRef {
        team: Team::Away,
        number: 24,
    };
    const C: PlayerRef = PlayerRef {
        team: Team::Home,
        number: 11,
    };

    struct Fixture {
        roster: Roster,
        scores: HomeAwayBundle<u16>,
        last_passer: Option<PlayerRef>,
        log: GameLog,
        teammate_assists_only: bool,
    }

    impl Fixture {
        fn new() -> Self {
            let mut roster = Roster::default();
            for (player_ref, position) in [
                (A, Position::Attack),
                (B, Position::Goalie),
                (C, Position::Midfield),
            ] {
                roster
                    .add(
                        player_ref.team,
                        Player::new(player_ref.number, "First", "Last", position),
                        NumberScope::PerTeam,
                    )
                    .unwrap();
            }
            Self {
                roster,
                scores: Default::default(),
                last_passer: None,
                log: Default::default(),
                teammate_assists_only: false,
            }
        }

        fn record(&mut self, player: PlayerRef, stat: StatKind, amount: i32) -> Result<RecordOutcome> {
            let ctx = EventContext {
                timestamp: OffsetDateTime::UNIX_EPOCH,
                period: GamePeriod::Regulation(1),
                game_time: 700,
            };
            StatLedger {
                roster: &mut self.roster,
                scores: &mut self.scores,
                last_passer: &mut self.last_passer,
                log: &mut self.log,
                teammate_assists_only: self.teammate_assists_only,
            }
            .record(&ctx, player, stat, amount)
        }

        fn stat(&self, player: PlayerRef, stat: StatKind) -> u32 {
            self.roster.get(player).unwrap().stats()[stat]
        }
    }

    #[test]
    fn test_shot_on_goal_counts_as_shot() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();
        for _ in 0..3 {
            f.record(A, StatKind::ShotsOnGoal, 1).unwrap();
        }
        assert_eq!(f.stat(A, StatKind::ShotsOnGoal), 3);
        assert_eq!(f.stat(A, StatKind::Shots), 4);

        f.record(A, StatKind::ShotsOnGoal, 2).unwrap();
        assert_eq!(f.stat(A, StatKind::ShotsOnGoal), 5);
        assert_eq!(f.stat(A, StatKind::Shots), 6);
    }

    #[test]
    fn test_no_self_assist() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();
        assert_eq!(f.last_passer, Some(A));

        let outcome = f.record(A, StatKind::Goals, 1).unwrap();
        assert_eq!(
            outcome,
            RecordOutcome {
                goal: true,
                ..Default::default()
            }
        );
        assert_eq!(f.stat(A, StatKind::Goals), 1);
        assert_eq!(f.stat(A, StatKind::Assists), 0);
        assert_eq!(f.scores, HomeAwayBundle::new(1, 0));
        assert_eq!(f.last_passer, None);
    }

    #[test]
    fn test_assist_to_last_shooter() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();
        let outcome = f.record(C, StatKind::Goals, 1).unwrap();

        assert_eq!(outcome.assisted_by, Some(A));
        assert_eq!(f.stat(C, StatKind::Goals), 1);
        assert_eq!(f.stat(A, StatKind::Assists), 1);
        assert_eq!(f.scores, HomeAwayBundle::new(1, 0));
        assert_eq!(f.last_passer, None);

        // The marker was used up, the next goal is unassisted
        let outcome = f.record(C, StatKind::Goals, 1).unwrap();
        assert_eq!(outcome.assisted_by, None);
        assert_eq!(f.stat(A, StatKind::Assists), 1);
        assert_eq!(f.scores, HomeAwayBundle::new(2, 0));
    }

    #[test]
    fn test_newer_shot_overwrites_marker() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();
        f.record(C, StatKind::ShotsOnGoal, 1).unwrap();
        assert_eq!(f.last_passer, Some(C));

        // C shot last, so a goal by C credits nobody
        f.record(C, StatKind::Goals, 1).unwrap();
        assert_eq!(f.stat(A, StatKind::Assists), 0);
        assert_eq!(f.stat(C, StatKind::Assists), 0);
    }

    #[test]
    fn test_cross_team_assists() {
        initialize();
        let mut f = Fixture::new();
        f.record(B, StatKind::Shots, 1).unwrap();
        assert_eq!(f.record(A, StatKind::Goals, 1).unwrap().assisted_by, Some(B));
        assert_eq!(f.stat(B, StatKind::Assists), 1);

        f.teammate_assists_only = true;
        f.record(B, StatKind::Shots, 1).unwrap();
        assert_eq!(f.record(A, StatKind::Goals, 1).unwrap().assisted_by, None);
        assert_eq!(f.stat(B, StatKind::Assists), 1);
        assert_eq!(f.last_passer, None);
        assert_eq!(f.scores, HomeAwayBundle::new(2, 0));
    }

    #[test]
    fn test_other_stats_leave_marker() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();
        f.record(B, StatKind::Saves, 1).unwrap();
        f.record(C, StatKind::GroundBalls, 1).unwrap();
        assert_eq!(f.last_passer, Some(A));
        assert_eq!(f.stat(B, StatKind::Saves), 1);
        assert_eq!(f.stat(C, StatKind::GroundBalls), 1);
    }

    #[test]
    fn test_goal_events() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();
        f.record(C, StatKind::Goals, 1).unwrap();

        let events: Vec<_> = f
            .log
            .events()
            .iter()
            .map(|e| (e.team, e.player, e.kind.clone()))
            .collect();
        assert_eq!(
            events,
            vec![
                (
                    Team::Home,
                    7,
                    GameEventKind::Stat {
                        stat: StatKind::Shots,
                        amount: 1
                    }
                ),
                (
                    Team::Home,
                    11,
                    GameEventKind::Stat {
                        stat: StatKind::Goals,
                        amount: 1
                    }
                ),
                (
                    Team::Home,
                    11,
                    GameEventKind::Goal {
                        assisted_by: Some(7)
                    }
                ),
                (Team::Home, 7, GameEventKind::Assist { scorer: 11 }),
            ]
        );
    }

    #[test]
    fn test_errors_change_nothing() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();
        let before_roster = f.roster.clone();
        let before_log = f.log.clone();

        // (player, stat, amount, result, msg)
        let test_cases = vec![
            (
                PlayerRef::new(Team::Away, 99),
                StatKind::Goals,
                1,
                EngineError::NotFound(PlayerRef::new(Team::Away, 99)),
                "Unknown player",
            ),
            (
                A,
                StatKind::Goals,
                -1,
                EngineError::InvalidAmount(-1),
                "Negative amount",
            ),
            (A, StatKind::Goals, 0, EngineError::InvalidAmount(0), "Zero amount"),
            (
                A,
                StatKind::Penalties,
                0,
                EngineError::InvalidAmount(0),
                "Zero length penalty",
            ),
            (
                PlayerRef::new(Team::Home, 99),
                StatKind::PenaltyTime,
                30,
                EngineError::NotFound(PlayerRef::new(Team::Home, 99)),
                "Penalty for unknown player",
            ),
        ];

        for (player, stat, amount, err, msg) in test_cases {
            assert_eq!(f.record(player, stat, amount), Err(err), "{}", msg);
            assert_eq!(f.roster, before_roster, "{}", msg);
            assert_eq!(f.log, before_log, "{}", msg);
            assert_eq!(f.scores, HomeAwayBundle::default(), "{}", msg);
            assert_eq!(f.last_passer, Some(A), "{}", msg);
        }
    }

    #[test]
    fn test_penalty_stats_issue_penalties() {
        initialize();
        let mut f = Fixture::new();
        f.record(A, StatKind::Shots, 1).unwrap();

        // (stat, seconds, issued duration, msg)
        let test_cases = vec![
            (StatKind::Penalties, 30, 30, "Penalty count"),
            (StatKind::Penalties, 500, 300, "Too long"),
            (StatKind::PenaltyTime, 1, 5, "Penalty time, too short"),
        ];

        for (i, (stat, seconds, duration, msg)) in test_cases.into_iter().enumerate() {
            let outcome = f.record(B, stat, seconds).unwrap();
            let pen = outcome.penalty.unwrap();
            assert!(!outcome.goal, "{}", msg);
            assert_eq!(pen.total_duration, duration, "{}", msg);
            assert_eq!(pen.remaining, duration, "{}", msg);
            assert_eq!(pen.index, i, "{}", msg);
            assert_eq!(
                f.log.events().last().unwrap().kind,
                GameEventKind::Penalty { duration },
                "{}",
                msg
            );
        }

        let b = f.roster.get(B).unwrap();
        assert_eq!(b.stats().penalties, 3);
        assert_eq!(b.stats().penalty_time, 335);
        assert_eq!(b.penalties().len(), 3);
        assert_eq!(b.penalties().get(0).unwrap().start_game_time(), 700);
        assert_eq!(f.log.len(), 4, "No Stat event for a penalty");
        assert_eq!(f.last_passer, Some(A));
    }
}
