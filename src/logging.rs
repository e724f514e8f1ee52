//! Logging setup.
//!
//! Console output goes through `println!`; tracing events reach stdout only
//! at warn level (debug with `--verbose`). The `find` command also writes an
//! activity log file whose lines look like
//! `[2024-03-01 21:14:03 EST(-5)] INFO - message`.

use crate::{Error, Result};
use chrono::{Offset, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::path::Path;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Activity log file name.
pub const ACTIVITY_LOG_FILE: &str = "activity.log";

/// Timestamps in a configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedTimer(pub Tz);

impl FormatTime for ZonedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = Utc::now().with_timezone(&self.0);
        let offset = now.offset().fix().local_minus_utc() / 3600;
        write!(w, "[{} {}({})]", now.format("%Y-%m-%d %H:%M:%S"), now.format("%Z"), offset)
    }
}

/// `[time] LEVEL - message` event format.
struct ActivityFormat {
    timer: ZonedTimer,
}

impl<S, N> FormatEvent<S, N> for ActivityFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(writer, " {} - ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Activity log file settings.
#[derive(Debug, Clone, Copy)]
pub struct FileLog<'a> {
    pub dir: &'a Path,
    pub timezone: Tz,
}

/// Initialize the logging system.
///
/// The returned guard flushes the file log on drop and must be held for the
/// duration of the run.
pub fn init(verbose: bool, file: Option<FileLog<'_>>) -> Result<Option<WorkerGuard>> {
    let console_filter = if verbose {
        EnvFilter::new("plex_dupefinder=debug")
    } else {
        EnvFilter::new("plex_dupefinder=warn")
    };
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    let mut guard = None;
    let file_layer = match file {
        Some(file) => {
            std::fs::create_dir_all(file.dir)?;
            let appender = tracing_appender::rolling::never(file.dir, ACTIVITY_LOG_FILE);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);

            let file_filter = if verbose {
                EnvFilter::new("plex_dupefinder=debug")
            } else {
                EnvFilter::new("plex_dupefinder=info")
            };
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .event_format(ActivityFormat {
                        timer: ZonedTimer(file.timezone),
                    })
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoned_timer_format() {
        let mut out = String::new();
        ZonedTimer(chrono_tz::UTC)
            .format_time(&mut Writer::new(&mut out))
            .unwrap();
        assert!(out.starts_with('['));
        assert!(out.ends_with(" UTC(0)]"));
        assert_eq!(out.len(), "[2024-01-01 00:00:00 UTC(0)]".len());
    }
}
