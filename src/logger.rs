use std::fs::File;

use anyhow::Context;
use time::{format_description, OffsetDateTime};
use tracing::{subscriber::set_global_default, Level};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, FmtSubscriber};

/// Set up a trace-level file logger for this run.
pub fn init_logger() -> anyhow::Result<()> {
    let file_name = log_file_name()?;
    let file =
        File::create(&file_name).with_context(|| format!("could not create '{file_name}'"))?;
    let writer = BoxMakeWriter::new(file);
    let offset =
        time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(
        offset,
        format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
            .expect("valid format description"),
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer)
        .finish();

    set_global_default(subscriber)
        .context("could not set the global tracing subscriber; is one already set?")
}

fn log_file_name() -> anyhow::Result<String> {
    let format = format_description::parse("bench_[year]-[month]-[day]_[hour]:[minute]:[second].log")
        .expect("valid format description");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&format).context("could not format the log file name")
}
