//! Enumerations carried as raw integers in the shared frame

use serde::{Deserialize, Serialize};

use crate::RelayError;

/// Declares a wire enum with `TryFrom<raw>` and `From<enum> for raw`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident($raw:ty) { $($variant:ident = $value:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Raw value as stored in the shared frame.
            pub const fn raw(self) -> $raw {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl TryFrom<$raw> for $name {
            type Error = RelayError;

            fn try_from(raw: $raw) -> Result<Self, Self::Error> {
                match raw {
                    $(v if v == $value => Ok($name::$variant),)+
                    other => Err(RelayError::reader(format!(
                        "unknown {} value {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for $raw {
            fn from(value: $name) -> $raw {
                value.raw()
            }
        }
    };
}

wire_enum! {
    /// Phase of the current session.
    GamePhase(u8) {
        Garage = 0,
        WarmUp = 1,
        GridWalk = 2,
        Formation = 3,
        Countdown = 4,
        GreenFlag = 5,
        FullCourseYellow = 6,
        SessionStopped = 7,
        SessionOver = 8,
    }
}

wire_enum! {
    /// Full-course yellow procedure state.
    YellowFlagState(i8) {
        Invalid = -1,
        NoFlag = 0,
        Pending = 1,
        PitClosed = 2,
        PitLeadLap = 3,
        PitOpen = 4,
        LastLap = 5,
        Resume = 6,
        RaceHalt = 7,
    }
}

wire_enum! {
    /// Surface under a wheel.
    SurfaceType(u8) {
        Dry = 0,
        Wet = 1,
        Grass = 2,
        Dirt = 3,
        Gravel = 4,
        Kerb = 5,
    }
}

wire_enum! {
    /// Track sector. The simulator numbers the final sector 0.
    Sector(i8) {
        Sector3 = 0,
        Sector1 = 1,
        Sector2 = 2,
    }
}

wire_enum! {
    FinishStatus(i8) {
        None = 0,
        Finished = 1,
        Dnf = 2,
        Dq = 3,
    }
}

wire_enum! {
    /// Who is in control of a vehicle.
    Control(i8) {
        Nobody = -1,
        Player = 0,
        Ai = 1,
        Remote = 2,
        Replay = 3,
    }
}

wire_enum! {
    WheelIndex(u8) {
        FrontLeft = 0,
        FrontRight = 1,
        RearLeft = 2,
        RearRight = 3,
    }
}

impl WheelIndex {
    pub const ALL: [WheelIndex; 4] =
        [WheelIndex::FrontLeft, WheelIndex::FrontRight, WheelIndex::RearLeft, WheelIndex::RearRight];

    /// Array slot of this wheel in telemetry and frame arrays.
    pub const fn slot(self) -> usize {
        self.raw() as usize
    }
}
