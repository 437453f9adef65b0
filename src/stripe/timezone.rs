//! Timezone handles for timestamp reconciliation
//!
//! ORC timestamps are written relative to the writer's wall clock, with an
//! epoch of 2015-01-01 00:00:00 in the writer's timezone. Reading them back
//! in a different zone means comparing the two zones' rules at the written
//! instant and correcting for the offset difference, re-checking after the
//! first correction in case it crossed a DST boundary.

use chrono::TimeZone as _;
use chrono_tz::OffsetComponents;

use crate::error::{OrcError, Result};

/// Seconds of 2015-01-01 00:00:00 UTC, the ORC timestamp epoch.
const ORC_EPOCH_UTC: i64 = 1_420_070_400;

/// The offset rules in force at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneVariant {
    /// Total offset from UTC in seconds, DST included
    pub gmt_offset: i64,
    /// Whether daylight saving is in force
    pub is_dst: bool,
}

impl TimezoneVariant {
    /// Whether two variants apply the same rule.
    pub fn has_same_rule(&self, other: &TimezoneVariant) -> bool {
        self.is_dst == other.is_dst && self.gmt_offset == other.gmt_offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ZoneRules {
    Utc,
    Fixed(i64),
    Named(chrono_tz::Tz),
}

/// A timezone handle: a name plus the ability to look up the offset rules
/// at any instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timezone {
    name: String,
    rules: ZoneRules,
}

impl Timezone {
    /// UTC / GMT.
    pub fn utc() -> Self {
        Timezone {
            name: "UTC".to_string(),
            rules: ZoneRules::Utc,
        }
    }

    /// A zone with a constant offset from UTC and no DST.
    pub fn fixed(name: impl Into<String>, gmt_offset_seconds: i64) -> Self {
        Timezone {
            name: name.into(),
            rules: ZoneRules::Fixed(gmt_offset_seconds),
        }
    }

    /// Look up a zone from the IANA database, e.g. `America/Los_Angeles`.
    pub fn named(name: &str) -> Result<Self> {
        if name == "UTC" || name == "GMT" {
            return Ok(Self::utc());
        }
        let tz: chrono_tz::Tz = name
            .parse()
            .map_err(|_| OrcError::UnknownTimezone(name.to_string()))?;
        Ok(Timezone {
            name: name.to_string(),
            rules: ZoneRules::Named(tz),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rules in force at `seconds` since the UNIX epoch.
    pub fn variant(&self, seconds: i64) -> TimezoneVariant {
        match &self.rules {
            ZoneRules::Utc => TimezoneVariant {
                gmt_offset: 0,
                is_dst: false,
            },
            ZoneRules::Fixed(offset) => TimezoneVariant {
                gmt_offset: *offset,
                is_dst: false,
            },
            ZoneRules::Named(tz) => {
                let Some(utc) = chrono::DateTime::from_timestamp(seconds, 0) else {
                    return TimezoneVariant {
                        gmt_offset: 0,
                        is_dst: false,
                    };
                };
                let offset = tz.offset_from_utc_datetime(&utc.naive_utc());
                let dst = offset.dst_offset();
                TimezoneVariant {
                    gmt_offset: (offset.base_utc_offset() + dst).num_seconds(),
                    is_dst: !dst.is_zero(),
                }
            }
        }
    }

    /// The ORC timestamp epoch of this zone, as seconds since the UNIX
    /// epoch: 2015-01-01 00:00:00 in this zone's wall clock.
    pub fn epoch(&self) -> i64 {
        ORC_EPOCH_UTC - self.variant(ORC_EPOCH_UTC).gmt_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_epoch() {
        assert_eq!(Timezone::utc().epoch(), 1_420_070_400);
        assert_eq!(Timezone::utc().variant(0).gmt_offset, 0);
    }

    #[test]
    fn test_fixed_offset() {
        let zone = Timezone::fixed("UTC+2", 7200);
        assert_eq!(zone.variant(123).gmt_offset, 7200);
        assert_eq!(zone.epoch(), 1_420_070_400 - 7200);
    }

    #[test]
    fn test_named_zone_dst() {
        let la = Timezone::named("America/Los_Angeles").unwrap();
        // 2015-01-15: PST, UTC-8
        let winter = la.variant(1_421_280_000);
        assert_eq!(winter.gmt_offset, -8 * 3600);
        assert!(!winter.is_dst);
        // 2015-07-15: PDT, UTC-7
        let summer = la.variant(1_436_918_400);
        assert_eq!(summer.gmt_offset, -7 * 3600);
        assert!(summer.is_dst);
        assert!(!winter.has_same_rule(&summer));
    }

    #[test]
    fn test_unknown_zone() {
        assert!(Timezone::named("Nowhere/Special").is_err());
    }

    #[test]
    fn test_gmt_aliases() {
        assert_eq!(Timezone::named("GMT").unwrap(), Timezone::utc());
        assert_eq!(Timezone::named("UTC").unwrap(), Timezone::utc());
    }
}
