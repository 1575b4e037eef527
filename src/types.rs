// src/types.rs
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Number of 100 ns ticks in one second
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Kind of frame announced by the packet-number byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    ConfigurationFrame,
    DataFrame,
}

impl FrameKind {
    /// Packet number zero is reserved for configuration frames; anything else is data.
    pub fn from_packet_number(packet_number: u8) -> Self {
        if packet_number == 0 {
            FrameKind::ConfigurationFrame
        } else {
            FrameKind::DataFrame
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, FrameKind::ConfigurationFrame)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FrameKind::ConfigurationFrame => "configuration",
            FrameKind::DataFrame => "data",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference point a wire time tag counts seconds from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Epoch {
    /// 1900-01-01 00:00:00 UTC
    Ntp,
    /// 1970-01-01 00:00:00 UTC
    Unix,
}

impl Epoch {
    /// Seconds between 1900-01-01 and 1970-01-01
    pub const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;

    /// Offset to add to an epoch-relative second count to get Unix seconds
    pub fn unix_offset_seconds(&self) -> i64 {
        match self {
            Epoch::Ntp => -Self::NTP_TO_UNIX_SECONDS,
            Epoch::Unix => 0,
        }
    }
}

/// Protocol revision reported by the device's configuration frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Revision {
    /// Early firmware; time tags count from the NTP epoch
    Revision0 = 0,
    /// Later firmware; time tags count from the Unix epoch
    Revision2 = 2,
}

impl Revision {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Revision::Revision0),
            2 => Some(Revision::Revision2),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn time_tag_epoch(&self) -> Epoch {
        match self {
            Revision::Revision0 => Epoch::Ntp,
            _ => Epoch::Unix,
        }
    }
}

/// Where the timestamp on a decoded header came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampSource {
    /// Wall-clock time at decode; configuration frames carry no time tag
    CaptureTime,
    /// Wire time tag interpreted with an authoritative revision
    TimeTag,
    /// Wire time tag interpreted with a guessed epoch, before any configuration was seen
    Provisional,
}

/// Absolute UTC point in time, stored as 100 ns ticks relative to the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    ticks: i64,
}

impl Timestamp {
    pub const UNIX_EPOCH: Timestamp = Timestamp { ticks: 0 };

    pub fn from_ticks(ticks: i64) -> Self {
        Timestamp { ticks }
    }

    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp { ticks: duration_to_ticks(after) },
            Err(err) => Timestamp { ticks: -duration_to_ticks(err.duration()) },
        }
    }

    /// Build a timestamp from a wire second count relative to `epoch`
    pub fn from_time_tag(seconds: u32, epoch: Epoch) -> Self {
        let unix_seconds = seconds as i64 + epoch.unix_offset_seconds();
        Timestamp { ticks: unix_seconds * TICKS_PER_SECOND }
    }

    pub fn add_ticks(&self, ticks: i64) -> Self {
        Timestamp { ticks: self.ticks.saturating_add(ticks) }
    }

    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn unix_seconds(&self) -> i64 {
        self.ticks.div_euclid(TICKS_PER_SECOND)
    }

    pub fn subsec_nanos(&self) -> u32 {
        (self.ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32
    }

    pub fn to_system_time(&self) -> SystemTime {
        let magnitude = Duration::new(
            self.ticks.unsigned_abs() / TICKS_PER_SECOND as u64,
            ((self.ticks.unsigned_abs() % TICKS_PER_SECOND as u64) * 100) as u32,
        );
        if self.ticks >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }

    #[cfg(test)]
    pub fn to_date_time(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(self.unix_seconds(), self.subsec_nanos()).unwrap()
    }
}

fn duration_to_ticks(duration: Duration) -> i64 {
    (duration.as_secs() as i64)
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add((duration.subsec_nanos() / 100) as i64)
}
