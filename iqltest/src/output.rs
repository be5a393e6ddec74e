// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Color selection and the stderr logger.

use clap::{
    Args, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use iqltest_runner::reporter::ReporterOutput;
use owo_colors::{OwoColorize, Style, style};
use std::fmt;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
    warn,
};
use tracing_subscriber::{
    Layer,
    filter::{ParseError, Targets},
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Log events with this target are printed without a level heading.
pub(crate) const NO_HEADING_TARGET: &str = "iqltest::no_heading";

/// The environment variable holding the log filter.
const LOG_ENV: &str = "IQLTEST_LOG";

/// Styles for `--help` and argument errors.
pub(crate) const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Copy, Clone, Debug, Args)]
#[command(next_help_heading = "Output options")]
pub(crate) struct OutputOpts {
    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        value_name = "WHEN",
        env = "IQLTEST_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    /// Installs the stderr logger and returns the settings for the rest of the run.
    pub(crate) fn init(self) -> OutputContext {
        init_logger(self.color.should_colorize(supports_color::Stream::Stderr));
        OutputContext { color: self.color }
    }
}

/// Color settings for a run.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns styles for error messages, colorized if stderr supports it.
    pub fn stderr_styles(&self) -> StderrStyles {
        let mut styles = StderrStyles::default();
        if self.color.should_colorize(supports_color::Stream::Stderr) {
            styles.bold = style().bold();
        }
        styles
    }
}

/// When to produce color output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Color {
    /// Color if the stream is a terminal that supports it.
    #[default]
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

impl Color {
    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// Styles for error messages printed to stderr.
#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
}

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

fn init_logger(colorize: bool) {
    INIT_LOGGER.call_once(|| {
        let filter = std::env::var(LOG_ENV).unwrap_or_default();
        let (targets, parse_error) = match parse_log_filter(&filter) {
            Ok(targets) => (targets, None),
            Err(error) => (default_targets(), Some(error)),
        };

        let layer = tracing_subscriber::fmt::layer()
            .event_format(HeadingFormatter { colorize })
            .with_writer(std::io::stderr)
            .with_filter(targets);
        tracing_subscriber::registry().with(layer).init();

        if let Some(error) = parse_error {
            warn!("ignoring invalid {LOG_ENV} value `{filter}`: {error}");
        }
    });
}

fn default_targets() -> Targets {
    Targets::new().with_default(LevelFilter::INFO)
}

/// Parses a log filter such as `debug` or `iqltest_runner=trace`. An empty filter logs at info.
fn parse_log_filter(filter: &str) -> Result<Targets, ParseError> {
    if filter.trim().is_empty() {
        Ok(default_targets())
    } else {
        filter.parse()
    }
}

/// Prints each event as `<level>: <message>`.
struct HeadingFormatter {
    colorize: bool,
}

impl HeadingFormatter {
    fn heading(&self, level: Level) -> (&'static str, Style) {
        let (label, colored) = match level {
            Level::ERROR => ("error", style().red().bold()),
            Level::WARN => ("warning", style().yellow().bold()),
            Level::INFO => ("info", style().bold()),
            Level::DEBUG => ("debug", style().bold()),
            Level::TRACE => ("trace", style().dimmed()),
        };
        if !self.colorize {
            return (label, Style::new());
        }
        (label, colored)
    }
}

impl<S, N> FormatEvent<S, N> for HeadingFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING_TARGET {
            let (label, style) = self.heading(*metadata.level());
            write!(writer, "{}: ", label.style(style))?;
        }

        let mut message = MessageWriter {
            writer: &mut writer,
            result: Ok(()),
        };
        event.record(&mut message);
        message.result?;

        writeln!(writer)
    }
}

/// Writes the `message` field of an event and drops the rest.
struct MessageWriter<'a, 'w> {
    writer: &'a mut format::Writer<'w>,
    result: fmt::Result,
}

impl Visit for MessageWriter<'_, '_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" && self.result.is_ok() {
            self.result = write!(self.writer, "{value:?}");
        }
    }
}

/// Where the test reporter writes.
#[derive(Default)]
pub enum OutputWriter {
    /// The process's stdout and stderr.
    #[default]
    Normal,
    /// In-memory buffers, for tests.
    #[cfg(test)]
    Test {
        /// Captured stdout.
        stdout: Vec<u8>,
        /// Captured stderr.
        stderr: Vec<u8>,
    },
}

impl OutputWriter {
    pub(crate) fn reporter_output(&mut self) -> ReporterOutput<'_> {
        match self {
            Self::Normal => ReporterOutput::Terminal,
            #[cfg(test)]
            Self::Test { stdout, stderr } => ReporterOutput::Buffer { stdout, stderr },
        }
    }
}
