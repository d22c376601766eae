use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::astro::{self, SunTimes};
use crate::bot::BotContext;
use crate::telegram::types::Location;
use crate::telegram::TelegramApi;
use crate::timezone;

pub async fn handle(ctx: &BotContext, chat_id: i64, location: &Location) -> Result<()> {
    info!(
        "Location from chat {}: {:.4}, {:.4}",
        chat_id, location.latitude, location.longitude
    );

    let tz = timezone::timezone_at(location.latitude, location.longitude);
    let reply = describe(location, tz, Utc::now());
    ctx.api.send_message(chat_id, &reply, None).await?;
    Ok(())
}

/// Calendar day in `tz` containing `now`
fn local_date(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Multi-line sun and moon summary for a location, times in `tz`
pub fn describe(location: &Location, tz: Tz, now: DateTime<Utc>) -> String {
    let times = astro::sun_times(local_date(tz, now), location.latitude, location.longitude);
    let moon = astro::moon_illumination(now);

    let mut out = String::new();

    let accuracy = location
        .horizontal_accuracy
        .map(|m| format!(" (±{:.0} m)", m))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "📍 {:.5}, {:.5}{}",
        location.latitude, location.longitude, accuracy
    );
    let _ = writeln!(out, "🕰 Time zone: {}", tz.name());
    let _ = writeln!(out, "📅 {}", now.with_timezone(&tz).format("%A, %-d %B %Y"));
    out.push('\n');

    for line in sun_lines(&times, tz) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push('\n');
    let phase = moon.named_phase();
    let _ = write!(
        out,
        "{} Moon: {} ({:.0}% illuminated)",
        phase.emoji(),
        phase.name(),
        moon.fraction * 100.0
    );

    out
}

fn sun_lines(times: &SunTimes, tz: Tz) -> Vec<String> {
    let at = |t: Option<DateTime<Utc>>| t.map(|t| t.with_timezone(&tz).format("%H:%M").to_string());
    let range = |from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>| match (at(from), at(to)) {
        (Some(from), Some(to)) => Some(format!("{} – {}", from, to)),
        _ => None,
    };

    let mut lines = Vec::new();
    let mut push = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{}: {}", label, value));
        }
    };

    push("🌌 Astronomical dawn", at(times.astronomical.rise));
    push("⚓ Nautical dawn", at(times.nautical.rise));
    push("🔵 Blue hour", range(times.civil.rise, times.blue_hour.rise));

    let polar = if times.is_polar_day() {
        Some("☀️ Polar Day: the sun does not set today")
    } else if times.is_polar_night() {
        Some("🌑 Polar Night: the sun does not rise today")
    } else {
        None
    };

    if polar.is_none() {
        push("🌅 Sunrise", at(times.sun.rise));
    }
    push("🌤 Golden hour ends", at(times.golden_hour.rise));
    push("☀️ Solar noon", at(times.solar_noon));
    push("🌇 Golden hour", at(times.golden_hour.set));
    if polar.is_none() {
        push("🌇 Sunset", at(times.sun.set));
    }
    push("🔵 Blue hour", range(times.blue_hour.set, times.civil.set));
    push("⚓ Nautical dusk", at(times.nautical.set));
    push("🌌 Astronomical dusk", at(times.astronomical.set));

    if let Some(polar) = polar {
        lines.push(polar.to_string());
    }

    lines
}
