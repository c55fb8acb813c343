use super::{
    EngineError, Result,
    penalty::{ActivePenalty, PenaltyTracker},
};
use lax_common::{
    bundles::HomeAwayBundle, config::NumberScope, game_snapshot::PlayerSnapshot,
    position::Position, stats::Stats, team::Team,
};
use serde_derive::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies one player: jersey numbers are only guaranteed unique within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub team: Team,
    pub number: u8,
}

impl PlayerRef {
    pub fn new(team: Team, number: u8) -> Self {
        Self { team, number }
    }
}

impl Display for PlayerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} player #{}", self.team, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub number: u8,
    pub first_name: String,
    pub last_name: String,
    pub position: Position,
    pub(crate) stats: Stats,
    pub(crate) penalties: PenaltyTracker,
}

impl Player {
    pub fn new(number: u8, first_name: &str, last_name: &str, position: Position) -> Self {
        Self {
            number,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            position,
            stats: Stats::default(),
            penalties: PenaltyTracker::default(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_name(&self) -> String {
        format!("#{} {}", self.number, self.last_name)
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn penalties(&self) -> &PenaltyTracker {
        &self.penalties
    }

    pub fn has_active_penalties(&self) -> bool {
        !self.penalties.is_empty()
    }

    /// Issues a penalty. The penalty count and total penalty time only ever
    /// grow, they are not touched when the penalty expires or is dismissed.
    pub(crate) fn add_penalty(&mut self, penalty: ActivePenalty) -> &ActivePenalty {
        self.stats.penalties += 1;
        self.stats.penalty_time += penalty.total_duration();
        self.penalties.add(penalty)
    }

    pub(crate) fn clear_game_data(&mut self) {
        self.stats = Stats::default();
        self.penalties.clear();
    }

    pub fn as_snapshot(&self, team: Team) -> PlayerSnapshot {
        PlayerSnapshot {
            team,
            number: self.number,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            position: self.position,
            stats: self.stats,
            penalties: self.penalties.as_snapshots(team, self.number),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Roster {
    players: HomeAwayBundle<Vec<Player>>,
}

impl Roster {
    pub(crate) fn from_players(players: HomeAwayBundle<Vec<Player>>, scope: NumberScope) -> Result<Self> {
        let mut roster = Self::default();
        for (team, team_players) in players {
            for player in team_players {
                roster.add(team, player, scope)?;
            }
        }
        Ok(roster)
    }

    pub fn players(&self) -> &HomeAwayBundle<Vec<Player>> {
        &self.players
    }

    pub fn team(&self, team: Team) -> &[Player] {
        &self.players[team]
    }

    pub fn get(&self, player: PlayerRef) -> Option<&Player> {
        self.players[player.team]
            .iter()
            .find(|p| p.number == player.number)
    }

    pub(crate) fn get_mut(&mut self, player: PlayerRef) -> Option<&mut Player> {
        self.players[player.team]
            .iter_mut()
            .find(|p| p.number == player.number)
    }

    pub fn contains(&self, player: PlayerRef) -> bool {
        self.get(player).is_some()
    }

    /// Finds the team already using `number` within the given scope, if any
    pub fn number_taken(&self, team: Team, number: u8, scope: NumberScope) -> Option<Team> {
        let teams: &[Team] = match scope {
            NumberScope::PerTeam => &[team],
            NumberScope::Global => &[Team::Home, Team::Away],
        };
        teams
            .iter()
            .copied()
            .find(|t| self.contains(PlayerRef::new(*t, number)))
    }

    pub(crate) fn add(&mut self, team: Team, player: Player, scope: NumberScope) -> Result<PlayerRef> {
        if let Some(taken_by) = self.number_taken(team, player.number, scope) {
            return Err(EngineError::DuplicateNumber(taken_by, player.number));
        }
        let player_ref = PlayerRef::new(team, player.number);
        self.players[team].push(player);
        Ok(player_ref)
    }

    pub(crate) fn remove(&mut self, player: PlayerRef) -> Option<Player> {
        let team = &mut self.players[player.team];
        let index = team.iter().position(|p| p.number == player.number)?;
        Some(team.remove(index))
    }

    /// Checks that the current roster would be valid under `scope`
    pub fn check_scope(&self, scope: NumberScope) -> Result<()> {
        if scope == NumberScope::Global {
            if let Some(dup) = self.players.home.iter().find(|h| {
                self.contains(PlayerRef::new(Team::Away, h.number))
            }) {
                return Err(EngineError::DuplicateNumber(Team::Away, dup.number));
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Team, &Player)> {
        self.players
            .iter()
            .flat_map(|(team, players)| players.iter().map(move |p| (team, p)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (Team, &mut Player)> {
        self.players
            .iter_mut()
            .flat_map(|(team, players)| players.iter_mut().map(move |p| (team, p)))
    }

    pub fn len(&self) -> usize {
        self.players.home.len() + self.players.away.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::super::test::initialize;
    use super::*;

    fn sample_roster(scope: NumberScope) -> Roster {
        let mut roster = Roster::default();
        roster
            .add(Team::Home, Player::new(1, "John", "Doe", Position::Attack), scope)
            .unwrap();
        roster
            .add(Team::Home, Player::new(4, "Sarah", "Williams", Position::Goalie), scope)
            .unwrap();
        roster
            .add(Team::Away, Player::new(8, "Alex", "Brown", Position::Attack), scope)
            .unwrap();
        roster
    }

    #[test]
    fn test_names() {
        initialize();
        let player = Player::new(24, "Jordan", "Miller", Position::Defense);
        assert_eq!(player.full_name(), "Jordan Miller");
        assert_eq!(player.display_name(), "#24 Miller");
    }

    #[test]
    fn test_per_team_numbers() {
        initialize();
        let mut roster = sample_roster(NumberScope::PerTeam);

        assert_eq!(
            roster.add(
                Team::Away,
                Player::new(1, "Casey", "Wilson", Position::Midfield),
                NumberScope::PerTeam
            ),
            Ok(PlayerRef::new(Team::Away, 1))
        );
        assert_eq!(
            roster.add(
                Team::Home,
                Player::new(4, "Mike", "Johnson", Position::Defense),
                NumberScope::PerTeam
            ),
            Err(EngineError::DuplicateNumber(Team::Home, 4))
        );
        assert_eq!(roster.len(), 4);
        assert_eq!(
            roster.check_scope(NumberScope::Global),
            Err(EngineError::DuplicateNumber(Team::Away, 1))
        );
    }

    #[test]
    fn test_global_numbers() {
        initialize();
        let mut roster = sample_roster(NumberScope::Global);

        assert_eq!(
            roster.add(
                Team::Away,
                Player::new(1, "Casey", "Wilson", Position::Midfield),
                NumberScope::Global
            ),
            Err(EngineError::DuplicateNumber(Team::Home, 1))
        );
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.check_scope(NumberScope::Global), Ok(()));
    }

    #[test]
    fn test_lookup_and_remove() {
        initialize();
        let mut roster = sample_roster(NumberScope::PerTeam);

        assert!(roster.contains(PlayerRef::new(Team::Home, 4)));
        assert!(!roster.contains(PlayerRef::new(Team::Away, 4)));

        let removed = roster.remove(PlayerRef::new(Team::Home, 1)).unwrap();
        assert_eq!(removed.last_name, "Doe");
        assert_eq!(roster.remove(PlayerRef::new(Team::Home, 1)), None);
        assert_eq!(
            roster.iter().map(|(t, p)| (t, p.number)).collect::<Vec<_>>(),
            vec![(Team::Home, 4), (Team::Away, 8)]
        );
    }

    #[test]
    fn test_penalty_counters_never_decrease() {
        initialize();
        let mut player = Player::new(7, "A", "Attacker", Position::Attack);
        player.add_penalty(ActivePenalty::new(30, Default::default(), 700));
        player.add_penalty(ActivePenalty::new(60, Default::default(), 650));
        assert_eq!(player.stats().penalties, 2);
        assert_eq!(player.stats().penalty_time, 90);

        player.penalties.dismiss(0);
        player.penalties.advance(60);
        assert!(!player.has_active_penalties());
        assert_eq!(player.stats().penalties, 2);
        assert_eq!(player.stats().penalty_time, 90);
    }
}
