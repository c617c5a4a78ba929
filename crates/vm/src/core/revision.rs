use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Ethereum protocol revisions in chronological order.
///
/// Every gas cost, opcode availability rule and semantic edge case in the interpreter is
/// parametrized by a [`Revision`]. Revisions are totally ordered, so "active since" checks are a
/// simple comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Revision {
    /// Initial Ethereum release (July 2015)
    Frontier = 0,
    /// DELEGATECALL (March 2016)
    Homestead = 1,
    /// EIP-150 gas repricing, all-but-one-64th call gas (October 2016)
    TangerineWhistle = 2,
    /// EIP-158/160/170: empty accounts, EXP repricing, code size limit (November 2016)
    SpuriousDragon = 3,
    /// REVERT, RETURNDATA*, STATICCALL (October 2017)
    Byzantium = 4,
    /// Shifts, CREATE2, EXTCODEHASH, net gas metering (never activated on mainnet)
    Constantinople = 5,
    /// Constantinople without EIP-1283 (February 2019)
    Petersburg = 6,
    /// CHAINID, SELFBALANCE, EIP-2200 storage metering (December 2019)
    Istanbul = 7,
    /// EIP-2929 warm/cold access (April 2021)
    Berlin = 8,
    /// BASEFEE, EIP-3529 refunds, EIP-3541 reserved 0xEF prefix (August 2021)
    London = 9,
    /// The Merge: DIFFICULTY becomes PREVRANDAO (September 2022)
    Paris = 10,
    /// PUSH0, EIP-3860 init code limits (April 2023)
    Shanghai = 11,
    /// Transient storage, MCOPY, blob opcodes (March 2024)
    #[default]
    Cancun = 12,
}

impl Revision {
    /// The most recent supported revision.
    pub const LATEST: Revision = Revision::Cancun;

    /// All revisions, oldest first.
    pub const ALL: [Revision; 13] = [
        Revision::Frontier,
        Revision::Homestead,
        Revision::TangerineWhistle,
        Revision::SpuriousDragon,
        Revision::Byzantium,
        Revision::Constantinople,
        Revision::Petersburg,
        Revision::Istanbul,
        Revision::Berlin,
        Revision::London,
        Revision::Paris,
        Revision::Shanghai,
        Revision::Cancun,
    ];

    /// Returns true if `self` is at or after `other`.
    ///
    /// ```
    /// use bifrost_vm::core::revision::Revision;
    ///
    /// assert!(Revision::London.is_active(Revision::Berlin));
    /// assert!(!Revision::Istanbul.is_active(Revision::Berlin));
    /// ```
    #[inline]
    pub const fn is_active(self, other: Self) -> bool {
        self as u8 >= other as u8
    }

    /// The position of this revision in [`Revision::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The lowercase name of the revision, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Revision::Frontier => "frontier",
            Revision::Homestead => "homestead",
            Revision::TangerineWhistle => "tangerine_whistle",
            Revision::SpuriousDragon => "spurious_dragon",
            Revision::Byzantium => "byzantium",
            Revision::Constantinople => "constantinople",
            Revision::Petersburg => "petersburg",
            Revision::Istanbul => "istanbul",
            Revision::Berlin => "berlin",
            Revision::London => "london",
            Revision::Paris => "paris",
            Revision::Shanghai => "shanghai",
            Revision::Cancun => "cancun",
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Revision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "latest" => Ok(Revision::LATEST),
            "merge" => Ok(Revision::Paris),
            other => Revision::ALL
                .iter()
                .find(|revision| revision.name() == other)
                .copied()
                .ok_or_else(|| format!("unknown revision: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revisions_are_ordered() {
        for pair in Revision::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[1].is_active(pair[0]));
            assert!(!pair[0].is_active(pair[1]));
        }
    }

    #[test]
    fn test_index_matches_position() {
        for (i, revision) in Revision::ALL.iter().enumerate() {
            assert_eq!(revision.index(), i);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Berlin".parse::<Revision>(), Ok(Revision::Berlin));
        assert_eq!("tangerine-whistle".parse::<Revision>(), Ok(Revision::TangerineWhistle));
        assert_eq!("latest".parse::<Revision>(), Ok(Revision::Cancun));
        assert_eq!("merge".parse::<Revision>(), Ok(Revision::Paris));
        assert!("osaka".parse::<Revision>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for revision in Revision::ALL {
            assert_eq!(revision.to_string().parse::<Revision>(), Ok(revision));
        }
    }
}
