// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Args, Parser, builder::FalseyValueParser};
use iqltest_metadata::IqlTestExitCode;
use iqltest_runner::{
    generator::GeneratorExpander,
    invocation::BaseInvocation,
    paths::HarnessPaths,
    reporter::{RunSummary, TestReporter},
    runner::TestRunner,
    suite::simple_suite,
};
use tracing::info;

/// Offline integration test harness for the infraql query tool.
///
/// Runs a fixed suite of statements against the tool, followed by the tests described in the JSON
/// generator files under `<testroot>/test-generators/always`.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::HELP_STYLES,
    max_term_width = 100
)]
pub struct IqlTestApp {
    #[clap(flatten)]
    harness: HarnessOpts,

    #[clap(flatten)]
    output: OutputOpts,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Harness options")]
struct HarnessOpts {
    /// Root of the test tree
    #[arg(
        long,
        value_name = "DIR",
        env = "INFRAQL_TEST_ROOT",
        default_value = "test"
    )]
    testroot: Utf8PathBuf,

    /// Directory containing the tool under test
    #[arg(long, value_name = "DIR", default_value = "build")]
    rundir: Utf8PathBuf,

    /// File name of the tool under test, inside --rundir
    #[arg(long, value_name = "NAME", default_value = "infraql")]
    executable: String,

    /// Provider root passed to the tool [default: <testroot>/.infraql]
    #[arg(long, value_name = "DIR")]
    providerdir: Option<Utf8PathBuf>,

    /// Config file passed to the tool [default: <testroot>/.iqlrc]
    #[arg(long, value_name = "PATH")]
    configfile: Option<Utf8PathBuf>,

    /// Database file passed to the tool [default: <testroot>/db/tmp/python-tests-tmp-db.sqlite]
    #[arg(long, value_name = "PATH")]
    dbfilepath: Option<Utf8PathBuf>,

    /// Log level passed to the tool
    #[arg(
        long,
        value_name = "LEVEL",
        env = "INFRAQL_TEST_LOG_LEVEL",
        default_value = "warn"
    )]
    loglevel: String,

    /// Project identifier for tests that need one
    #[arg(
        long,
        value_name = "PROJECT",
        env = "INFRAQL_TEST_GOOGLE_PROJECT",
        default_value = "lab-kr-network-01"
    )]
    testgoogleproject: String,

    /// Zone identifier for tests that need one
    #[arg(
        long,
        value_name = "ZONE",
        env = "INFRAQL_TEST_GOOGLE_ZONE",
        default_value = "australia-southeast1-b"
    )]
    testgooglezone: String,

    /// Echo captured output for every simple-suite test
    ///
    /// Any non-empty value of the environment variable other than a falsey one (`0`, `false`,
    /// `no`, `off`) turns this on.
    #[arg(
        long,
        env = "INFRAQL_TEST_VERBOSE",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    verbosetesting: bool,

    /// A second generator directory to run after the always-run one
    ///
    /// Relative paths are resolved against <testroot>/test-generators.
    #[arg(long, value_name = "DIR", default_value = "")]
    additionalintegrationtestdir: String,
}

impl HarnessOpts {
    fn base_invocation(&self, paths: &HarnessPaths) -> BaseInvocation {
        let or_default = |path: &Option<Utf8PathBuf>, default: Utf8PathBuf| {
            path.clone().unwrap_or(default)
        };
        BaseInvocation::new(
            self.rundir.join(&self.executable),
            or_default(&self.configfile, paths.default_config_file()),
            or_default(&self.providerdir, paths.default_provider_root()),
            self.loglevel.clone(),
            or_default(&self.dbfilepath, paths.default_db_file()),
        )
    }

    fn additional_dir(&self) -> Option<&Utf8Path> {
        (!self.additionalintegrationtestdir.is_empty())
            .then(|| Utf8Path::new(&self.additionalintegrationtestdir))
    }
}

impl IqlTestApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    pub fn exec(
        self,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        let opts = self.harness;
        let paths = HarnessPaths::new(opts.testroot.clone());
        let base = opts.base_invocation(&paths);

        info!(
            "testing {} against project {} in zone {}",
            base.executable(),
            opts.testgoogleproject,
            opts.testgooglezone,
        );

        paths.prepare_output_dirs()?;

        let mut reporter = TestReporter::new(output_writer.reporter_output());
        if output.color.should_colorize(supports_color::Stream::Stderr) {
            reporter.colorize();
        }
        let mut runner = TestRunner::new(reporter);
        let mut summary = RunSummary::new();

        runner.run_tests(
            simple_suite(&base, &paths, opts.verbosetesting),
            &mut summary,
        )?;

        let assets_root = paths.assets_root();
        let expander = GeneratorExpander::new(&base, &assets_root);
        runner.run_generator_dir(&paths.always_dir(), &expander, &mut summary)?;
        if let Some(dir) = opts.additional_dir() {
            runner.run_generator_dir(&paths.resolve_additional_dir(dir), &expander, &mut summary)?;
        }

        runner.finish(&summary)?;

        if summary.is_success() {
            Ok(IqlTestExitCode::OK)
        } else {
            Err(ExpectedError::TestRunFailed {
                failing: summary.failure_count(),
                total: summary.test_count(),
            })
        }
    }
}

/// Parses arguments, runs the harness and exits the process.
pub fn main_impl() -> ! {
    let app = IqlTestApp::parse();
    let output = app.init_output();

    match app.exec(output, &mut OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}
