#[macro_use]
extern crate clap;

use yunit::{
    config, logger, run,
    ux::{
        self,
        clap::{arg, Action},
        exit,
        out::{self, Outputtable},
    },
};

use anyhow::Context;
use clap::{App, Arg};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    let code = match run(app().get_matches()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            e.downcast_ref::<ux::err::Error>()
                .map_or(exit::SCRIPT_FAILURE, ux::err::Error::exit_code)
        }
    };
    std::process::exit(code)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();
    run::guard::install_hook();
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("yunit")
        .author(crate_authors!())
        .version(crate_version!())
        .about("Unit test runner")
        .arg(
            Arg::with_name(arg::ENGINE)
                .help("Test engine library to load (repeatable)")
                .short("e")
                .long(arg::ENGINE)
                .value_name("PATH")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name(arg::CONTAINER)
                .help("Test container to run (repeatable)")
                .short("t")
                .long(arg::CONTAINER)
                .value_name("PATH")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name(arg::ISOLATION)
                .help("How to isolate tests from the runner")
                .short("i")
                .long(arg::ISOLATION)
                .value_name("LEVEL")
                .possible_values(run::isolation::string::ALL),
        )
        .arg(
            Arg::with_name(arg::NAMESPACE)
                .help("Symbol namespace policy for engine libraries")
                .long(arg::NAMESPACE)
                .value_name("POLICY")
                .possible_values(yunit::dl::string::ALL),
        )
        .arg(
            Arg::with_name(arg::ORDER)
                .help("Order to run tests in")
                .long(arg::ORDER)
                .value_name("STRATEGY")
                .possible_values(config::order::string::ALL),
        )
        .arg(
            Arg::with_name(arg::SEED)
                .help("Seed for shuffled order")
                .long(arg::SEED)
                .value_name("NUM"),
        )
        .arg(
            Arg::with_name(arg::FILTER)
                .help("Only run tests whose names contain this string")
                .short("f")
                .long(arg::FILTER)
                .value_name("TEXT"),
        )
        .arg(
            Arg::with_name(arg::FAIL_FAST)
                .help("Stop after the first failing test")
                .long(arg::FAIL_FAST),
        )
        .arg(
            Arg::with_name(arg::OUTPUT_TYPE)
                .help("How to output the report")
                .short("o")
                .long(arg::OUTPUT_TYPE)
                .value_name("FORMAT")
                .possible_values(out::choice::string::ALL),
        )
        .arg(
            Arg::with_name(arg::CONFIG)
                .help("Config file to use instead of the default")
                .short("c")
                .long(arg::CONFIG)
                .value_name("PATH"),
        )
        .arg(
            Arg::with_name(arg::DUMP_CONFIG)
                .help("Dump config instead of testing")
                .long(arg::DUMP_CONFIG),
        )
        .arg(
            Arg::with_name(arg::DUMP_CONFIG_PATH)
                .help("Dump config path instead of testing")
                .long(arg::DUMP_CONFIG_PATH),
        )
        .arg(
            Arg::with_name(arg::SCRIPT)
                .help("Run script (TOML, same shape as the config file)")
                .index(1),
        )
}

fn run(matches: clap::ArgMatches) -> anyhow::Result<i32> {
    Ok(match Action::from_clap(&matches)? {
        Action::DumpConfig => dump_config(&load_config(&matches)?)?,
        Action::DumpConfigPath => dump_config_path(&matches),
        Action::Run(output) => run_session(&load_config(&matches)?, output)?,
    })
}

fn load_config(matches: &clap::ArgMatches) -> anyhow::Result<config::Config> {
    Ok(ux::clap::load_config(matches).context("couldn't load configuration")?)
}

fn dump_config(config: &config::Config) -> ux::err::Result<i32> {
    println!("{}", config.to_string()?);
    Ok(exit::SUCCESS)
}

fn dump_config_path(matches: &clap::ArgMatches) -> i32 {
    println!("{}", ux::clap::config_file(matches).display());
    exit::SUCCESS
}

fn run_session(config: &config::Config, output: out::Config) -> ux::err::Result<i32> {
    let session = run::Session::new(config, Some(setup_ctrlc()?))?;

    let mut collector = logger::Collector::new();
    let result = session.run(&mut logger::Tee(logger::Tracing, &mut collector));
    if matches!(&result, Ok(summary) if summary.halted) {
        collector.halt();
    }

    // Tests that ran before a load failure still get reported.
    let report = collector.into_report();
    let code = exit::of_verdict(report.verdict());
    report.output(output)?;
    result?;
    Ok(code)
}

/// Creates a halt condition that stops the session if control-C is sent.
fn setup_ctrlc() -> ux::err::Result<run::halt::Condition> {
    let (cond, callback) = run::halt::Condition::on_callback();
    ctrlc::set_handler(callback)?;
    Ok(cond)
}
