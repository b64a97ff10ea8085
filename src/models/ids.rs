//! Typed row identifiers.
//!
//! Every persisted entity is keyed by the SQLite `INTEGER PRIMARY KEY` of its
//! table. Wrapping the raw `i64` in one newtype per table keeps a game id from
//! being passed where a team id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw row id, for binding into queries.
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Forms submit `0` for "nothing selected".
            pub const fn is_unset(self) -> bool {
                self.0 <= 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

entity_id!(
    /// Tournament event id.
    EventId
);
entity_id!(
    /// Team id.
    TeamId
);
entity_id!(
    /// Player id.
    PlayerId
);
entity_id!(
    /// Game id.
    GameId
);
entity_id!(
    /// Per-game statistic record id.
    StatId
);
