use clap::builder::{styling, PossibleValuesParser};
use clap::{Arg, ArgAction, ArgMatches, Command};
use reify_common::config::{AdapterPolicy, BuildConfig, EraseOptions, JavaConfig};
use reify_common::data::primitive::PrimitiveKind;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ContractConfig {
    pub kinds: Vec<PrimitiveKind>,
    pub json: bool,
}

#[derive(Clone, Debug)]
pub struct JavaOutputConfig {
    pub kinds: Vec<PrimitiveKind>,
    pub build: BuildConfig,
}

#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub build: BuildConfig,
}

#[derive(Clone, Debug)]
pub enum Config {
    ContractConfig(ContractConfig),
    JavaOutputConfig(JavaOutputConfig),
    DemoConfig(DemoConfig),
}

const ADAPTER_POLICIES: &[&str] = &["shared", "per-use"];
const DEFAULT_ADAPTER_POLICY: &str = "shared";

fn parse_adapter_policy(s: &str) -> AdapterPolicy {
    match s {
        "shared" => AdapterPolicy::Shared,
        "per-use" => AdapterPolicy::PerUse,
        _ => unreachable!(),
    }
}

pub fn parse_kind(s: &str) -> Option<PrimitiveKind> {
    PrimitiveKind::ALL
        .into_iter()
        .find(|kind| kind.native_name() == s)
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .long("kind")
        .short('k')
        .help("Restrict output to the wrapper for this element kind. May be repeated.")
        .value_parser(PossibleValuesParser::new(
            PrimitiveKind::ALL.map(PrimitiveKind::native_name),
        ))
        .action(ArgAction::Append)
        .number_of_values(1)
}

fn adapter_policy_arg() -> Arg {
    Arg::new("adapter-policy")
        .long("adapter-policy")
        .help(
            "Set whether erasure creates one generic-view adapter per array ('shared') or a \
            fresh adapter at every use that needs one ('per-use').",
        )
        .value_parser(PossibleValuesParser::new(ADAPTER_POLICIES))
        .default_value(DEFAULT_ADAPTER_POLICY)
}

fn selected_kinds(matches: &ArgMatches) -> Vec<PrimitiveKind> {
    match matches.get_many::<String>("kind") {
        Some(values) => values.filter_map(|value| parse_kind(value)).collect(),
        None => PrimitiveKind::ALL.to_vec(),
    }
}

fn build_config(matches: &ArgMatches) -> BuildConfig {
    let mut java = JavaConfig::default();
    if let Some(package) = matches.get_one::<String>("package") {
        java.package = Some(package.to_owned());
    }
    if let Some(runtime_package) = matches.get_one::<String>("runtime-package") {
        java.runtime_package = runtime_package.to_owned();
    }

    // Only 'demo' erases programs.
    let adapter_policy = matches
        .try_get_one::<String>("adapter-policy")
        .ok()
        .flatten()
        .map(|s| parse_adapter_policy(s))
        .unwrap_or_default();

    BuildConfig {
        java,
        erase: EraseOptions { adapter_policy },
        output_dir: matches.get_one::<PathBuf>("output-dir").cloned(),
    }
}

fn java_output_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("package")
                .long("package")
                .short('p')
                .help("Declare the emitted classes in this Java package."),
        )
        .arg(
            Arg::new("runtime-package")
                .long("runtime-package")
                .help("Import the runtime classes 'Array', 'TypeDescriptor' and 'Util' from here.")
                .default_value("reify.lang"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_parser(clap::value_parser!(PathBuf))
                .help(
                    "Write each class to '<output-dir>/<Class>.java' instead of printing it to \
                    stdout.",
                ),
        )
}

impl Config {
    pub fn command() -> Command {
        let styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
            .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
            .literal(styling::AnsiColor::Cyan.on_default() | styling::Effects::BOLD)
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new("reifyc")
            .version(std::env!("CARGO_PKG_VERSION"))
            .about(std::env!("CARGO_PKG_DESCRIPTION"))
            .styles(styles)
            .next_line_help(true)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(
                Command::new("contract")
                    .about("Prints the members each array wrapper declares to the front-end")
                    .arg(kind_arg())
                    .arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue)
                            .help("Print the tables as JSON."),
                    ),
            )
            .subcommand(java_output_args(
                Command::new("java")
                    .about("Emits the Java companion class of each array wrapper")
                    .arg(kind_arg()),
            ))
            .subcommand(java_output_args(
                Command::new("demo")
                    .about(
                        "Erases the sample programs, runs them in the reference interpreter and \
                        emits their Java",
                    )
                    .arg(adapter_policy_arg()),
            ))
    }

    pub fn from_args() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        match matches.subcommand() {
            Some(("contract", matches)) => Config::ContractConfig(ContractConfig {
                kinds: selected_kinds(matches),
                json: matches.get_flag("json"),
            }),
            Some(("java", matches)) => Config::JavaOutputConfig(JavaOutputConfig {
                kinds: selected_kinds(matches),
                build: build_config(matches),
            }),
            Some(("demo", matches)) => Config::DemoConfig(DemoConfig {
                build: build_config(matches),
            }),
            _ => unreachable!("clap requires a subcommand"),
        }
    }
}
