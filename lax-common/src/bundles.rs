use crate::team::Team;
use core::ops::{Index, IndexMut};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One value per team
#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeAwayBundle<T> {
    pub home: T,
    pub away: T,
}

impl<T> HomeAwayBundle<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Team, &T)> {
        [(Team::Home, &self.home), (Team::Away, &self.away)].into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Team, &mut T)> {
        [(Team::Home, &mut self.home), (Team::Away, &mut self.away)].into_iter()
    }
}

impl<T: Eq> HomeAwayBundle<T> {
    pub fn are_not_equal(&self) -> bool {
        self.home != self.away
    }
}

impl<T> Index<Team> for HomeAwayBundle<T> {
    type Output = T;

    fn index(&self, team: Team) -> &Self::Output {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }
}

impl<T> IndexMut<Team> for HomeAwayBundle<T> {
    fn index_mut(&mut self, team: Team) -> &mut Self::Output {
        match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        }
    }
}

impl<T: Display> Display for HomeAwayBundle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Home: {}, Away: {}", self.home, self.away)
    }
}

impl<T> IntoIterator for HomeAwayBundle<T> {
    type Item = (Team, T);
    type IntoIter = std::array::IntoIter<Self::Item, 2>;

    fn into_iter(self) -> Self::IntoIter {
        [(Team::Home, self.home), (Team::Away, self.away)].into_iter()
    }
}
