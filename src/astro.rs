//! Sun event times and moon illumination.
//!
//! Elevation-band crossings come from `sunrise`; solar noon, the sun's noon
//! altitude and the moon come from `suncalc`. Altitudes here are degrees
//! above the horizon.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

/// Sun altitude at the moment of sunrise/sunset, refraction included
pub const SUNRISE_ALTITUDE: f64 = -0.833;
pub const BLUE_HOUR_ALTITUDE: f64 = -4.0;
pub const GOLDEN_HOUR_ALTITUDE: f64 = 6.0;

/// Morning and evening crossing of one altitude
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Crossing {
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunTimes {
    pub solar_noon: Option<DateTime<Utc>>,
    /// Sunrise and sunset
    pub sun: Crossing,
    /// Boundary between blue hour and civil twilight proper
    pub blue_hour: Crossing,
    /// Dawn and dusk
    pub civil: Crossing,
    pub nautical: Crossing,
    /// Night end and night start
    pub astronomical: Crossing,
    /// Golden hour end (morning) and golden hour start (evening)
    pub golden_hour: Crossing,
    /// Altitude of the sun at solar noon, degrees
    pub noon_altitude: f64,
}

impl SunTimes {
    /// The sun never sets: no sunrise/sunset and above the horizon at noon
    pub fn is_polar_day(&self) -> bool {
        self.sun.rise.is_none() && self.noon_altitude > SUNRISE_ALTITUDE
    }

    /// The sun never rises
    pub fn is_polar_night(&self) -> bool {
        self.sun.rise.is_none() && self.noon_altitude <= SUNRISE_ALTITUDE
    }
}

/// `sunrise` reports a crossing that never happens as the Unix epoch.
fn event_time(day: &SolarDay, event: SolarEvent) -> Option<DateTime<Utc>> {
    let time = day.event_time(event);
    (time.timestamp() != 0).then_some(time)
}

fn crossing(day: &SolarDay, morning: SolarEvent, evening: SolarEvent) -> Crossing {
    Crossing {
        rise: event_time(day, morning),
        set: event_time(day, evening),
    }
}

/// `SolarEvent::Elevation` takes the angle below the horizon, in radians.
fn altitude_crossing(day: &SolarDay, altitude: f64) -> Crossing {
    let at = |morning| SolarEvent::Elevation {
        elevation: (-altitude).to_radians(),
        morning,
    };
    crossing(day, at(true), at(false))
}

fn suncalc_time(timestamp: suncalc::Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(timestamp.0)
}

/// Sun times for the calendar day `date` as seen from the given position.
///
/// Coordinates outside the valid range give an empty result.
pub fn sun_times(date: NaiveDate, latitude: f64, longitude: f64) -> SunTimes {
    // Mean solar noon of `date` at this longitude
    let mean_noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc()
        - Duration::seconds((longitude * 240.0) as i64);
    let noon = suncalc::get_times(
        suncalc::Timestamp(mean_noon.timestamp_millis()),
        latitude,
        longitude,
        None,
    )
    .solar_noon;
    let noon_altitude = suncalc::get_position(noon, latitude, longitude)
        .altitude
        .to_degrees();

    let mut times = SunTimes {
        solar_noon: suncalc_time(noon),
        sun: Crossing::default(),
        blue_hour: Crossing::default(),
        civil: Crossing::default(),
        nautical: Crossing::default(),
        astronomical: Crossing::default(),
        golden_hour: Crossing::default(),
        noon_altitude,
    };

    let Some(coordinates) = Coordinates::new(latitude, longitude) else {
        return times;
    };
    let day = SolarDay::new(coordinates, date);
    let twilight =
        |kind| crossing(&day, SolarEvent::Dawn(kind), SolarEvent::Dusk(kind));

    times.sun = crossing(&day, SolarEvent::Sunrise, SolarEvent::Sunset);
    times.blue_hour = altitude_crossing(&day, BLUE_HOUR_ALTITUDE);
    times.civil = twilight(DawnType::Civil);
    times.nautical = twilight(DawnType::Nautical);
    times.astronomical = twilight(DawnType::Astronomical);
    times.golden_hour = altitude_crossing(&day, GOLDEN_HOUR_ALTITUDE);
    times
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonIllumination {
    /// Illuminated fraction of the disc, 0.0 (new) to 1.0 (full)
    pub fraction: f64,
    /// 0.0 new, 0.25 first quarter, 0.5 full, 0.75 last quarter
    pub phase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub fn name(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

impl MoonIllumination {
    /// Nearest of the eight named phases
    pub fn named_phase(&self) -> MoonPhase {
        const PHASES: [MoonPhase; 8] = [
            MoonPhase::NewMoon,
            MoonPhase::WaxingCrescent,
            MoonPhase::FirstQuarter,
            MoonPhase::WaxingGibbous,
            MoonPhase::FullMoon,
            MoonPhase::WaningGibbous,
            MoonPhase::LastQuarter,
            MoonPhase::WaningCrescent,
        ];
        let index = (self.phase.rem_euclid(1.0) * 8.0).round() as usize % 8;
        PHASES[index]
    }
}

pub fn moon_illumination(date: DateTime<Utc>) -> MoonIllumination {
    let moon = suncalc::moon_illumination(suncalc::Timestamp(date.timestamp_millis()));
    MoonIllumination {
        fraction: moon.fraction,
        phase: moon.phase,
    }
}
