// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Days-of-week mask

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekdays on which a schedule may fire
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub const NONE: DaysOfWeek = DaysOfWeek(0);
    pub const EVERYDAY: DaysOfWeek = DaysOfWeek(0b111_1111);
    pub const WEEKDAYS: DaysOfWeek = DaysOfWeek(0b001_1111);
    pub const WEEKENDS: DaysOfWeek = DaysOfWeek(0b110_0000);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn with(self, day: Weekday) -> Self {
        DaysOfWeek(self.0 | Self::bit(day))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn days(self) -> impl Iterator<Item = Weekday> {
        ALL_DAYS.into_iter().filter(move |d| self.contains(*d))
    }

    /// Parse a preset (`everyday`, `weekdays`, `weekends`) or a single day name
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "everyday" | "daily" | "all" => Ok(Self::EVERYDAY),
            "weekdays" => Ok(Self::WEEKDAYS),
            "weekends" => Ok(Self::WEEKENDS),
            "never" => Ok(Self::NONE),
            other => other
                .parse::<Weekday>()
                .map(|day| Self::NONE.with(day))
                .map_err(|_| format!("unknown day of week: {}", s)),
        }
    }
}

impl Default for DaysOfWeek {
    fn default() -> Self {
        Self::EVERYDAY
    }
}

impl FromIterator<Weekday> for DaysOfWeek {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl fmt::Debug for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DaysOfWeek({})", self)
    }
}

impl fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EVERYDAY => write!(f, "everyday"),
            Self::WEEKDAYS => write!(f, "weekdays"),
            Self::WEEKENDS => write!(f, "weekends"),
            Self::NONE => write!(f, "never"),
            days => {
                let names: Vec<String> = days.days().map(|d| d.to_string()).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DaysRepr {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for DaysOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = match DaysRepr::deserialize(deserializer)? {
            DaysRepr::One(s) => vec![s],
            DaysRepr::Many(v) => v,
        };
        parts
            .iter()
            .flat_map(|part| part.split(','))
            .try_fold(Self::NONE, |acc, part| {
                Self::parse(part)
                    .map(|days| DaysOfWeek(acc.0 | days.0))
                    .map_err(serde::de::Error::custom)
            })
    }
}

impl Serialize for DaysOfWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
