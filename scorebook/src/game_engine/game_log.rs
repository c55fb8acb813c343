use super::roster::PlayerRef;
use lax_common::{game_snapshot::GamePeriod, stats::StatKind, team::Team};
use serde_derive::{Deserialize, Serialize};
use time::{
    OffsetDateTime,
    format_description::well_known::{Iso8601, iso8601},
};

const CONFIG: iso8601::EncodedConfig = iso8601::Config::DEFAULT
    .set_year_is_six_digits(false)
    .encode();
const FORMAT: Iso8601<CONFIG> = Iso8601::<CONFIG>;
time::serde::format_description!(pub(crate) iso8601_short_year, OffsetDateTime, FORMAT);

/// When and where in the game an event happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EventContext {
    pub(crate) timestamp: OffsetDateTime,
    pub(crate) period: GamePeriod,
    pub(crate) game_time: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    #[serde(with = "iso8601_short_year")]
    pub timestamp: OffsetDateTime,
    pub period: GamePeriod,
    pub game_time: u32,
    pub team: Team,
    pub player: u8,
    #[serde(flatten)]
    pub kind: GameEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEventKind {
    Stat {
        stat: StatKind,
        amount: u32,
    },
    #[serde(rename_all = "camelCase")]
    Goal {
        assisted_by: Option<u8>,
    },
    Assist {
        scorer: u8,
    },
    Penalty {
        duration: u32,
    },
}

/// Append-only record of everything that happened in the current game, kept
/// for export
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GameLog {
    events: Vec<GameEvent>,
}

impl GameLog {
    pub(crate) fn from_events(events: Vec<GameEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, ctx: &EventContext, player: PlayerRef, kind: GameEventKind) {
        self.events.push(GameEvent {
            timestamp: ctx.timestamp,
            period: ctx.period,
            game_time: ctx.game_time,
            team: player.team,
            player: player.number,
            kind,
        });
    }

    pub(crate) fn add_stat(&mut self, ctx: &EventContext, player: PlayerRef, stat: StatKind, amount: u32) {
        self.push(ctx, player, GameEventKind::Stat { stat, amount });
    }

    pub(crate) fn add_goal(&mut self, ctx: &EventContext, scorer: PlayerRef, assisted_by: Option<PlayerRef>) {
        self.push(
            ctx,
            scorer,
            GameEventKind::Goal {
                assisted_by: assisted_by.map(|p| p.number),
            },
        );
    }

    pub(crate) fn add_assist(&mut self, ctx: &EventContext, passer: PlayerRef, scorer: PlayerRef) {
        self.push(
            ctx,
            passer,
            GameEventKind::Assist {
                scorer: scorer.number,
            },
        );
    }

    pub(crate) fn add_penalty(&mut self, ctx: &EventContext, player: PlayerRef, duration: u32) {
        self.push(ctx, player, GameEventKind::Penalty { duration });
    }

    pub fn as_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }
}

#[cfg(test)]
mod test {
    use super::super::test::initialize;
    use super::*;
    use time::macros::datetime;

    fn ctx() -> EventContext {
        EventContext {
            timestamp: datetime!(2024-04-20 14:03:07 UTC),
            period: GamePeriod::Regulation(2),
            game_time: 431,
        }
    }

    #[test]
    fn test_events_are_appended_in_order() {
        initialize();
        let mut log = GameLog::default();
        let a = PlayerRef::new(Team::Home, 7);
        let c = PlayerRef::new(Team::Home, 11);

        log.add_stat(&ctx(), a, StatKind::Shots, 1);
        log.add_stat(&ctx(), c, StatKind::Goals, 1);
        log.add_goal(&ctx(), c, Some(a));
        log.add_assist(&ctx(), a, c);

        let kinds: Vec<_> = log.events().iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                GameEventKind::Stat {
                    stat: StatKind::Shots,
                    amount: 1
                },
                GameEventKind::Stat {
                    stat: StatKind::Goals,
                    amount: 1
                },
                GameEventKind::Goal {
                    assisted_by: Some(7)
                },
                GameEventKind::Assist { scorer: 11 },
            ]
        );
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_json_format() {
        initialize();
        let mut log = GameLog::default();
        log.add_goal(&ctx(), PlayerRef::new(Team::Away, 15), None);
        log.add_penalty(&ctx(), PlayerRef::new(Team::Home, 3), 60);

        let json: serde_json::Value = serde_json::from_str(&log.as_json().unwrap()).unwrap();
        assert_eq!(json[0]["type"], "goal");
        assert_eq!(json[0]["team"], "away");
        assert_eq!(json[0]["player"], 15);
        assert_eq!(json[0]["gameTime"], 431);
        assert_eq!(json[0]["assistedBy"], serde_json::Value::Null);
        assert_eq!(json[1]["type"], "penalty");
        assert_eq!(json[1]["duration"], 60);
        assert!(
            json[0]["timestamp"]
                .as_str()
                .unwrap()
                .starts_with("2024-04-20T14:03:07")
        );

        let events: Vec<GameEvent> = serde_json::from_value(json).unwrap();
        assert_eq!(events, log.events());
    }
}
