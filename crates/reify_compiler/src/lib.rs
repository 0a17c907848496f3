pub mod cli;
pub mod demo;

use reify_backend::contract::{
    contract_for, DefaultRule, ParamType, ResolveError, ReturnType, WrapperContract,
};
use reify_common::report_error::{report_error, Reportable};
use std::io::{self, Write};

#[derive(Debug)]
enum ErrorKind {
    BackendError(reify_backend::error::Error),
    ScenarioMalformed(ResolveError),
    ScenarioFailed {
        scenario: &'static str,
        found: String,
    },
    CouldNotSerialize(serde_json::Error),
    CouldNotWriteOutput(io::Error),
}

// Kept apart from 'ErrorKind' so the backend error types stay out of this crate's public API.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind }
    }
}

impl From<reify_backend::error::Error> for Error {
    fn from(err: reify_backend::error::Error) -> Self {
        ErrorKind::BackendError(err).into()
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        ErrorKind::CouldNotWriteOutput(err).into()
    }
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write) -> io::Result<()> {
        use ErrorKind::*;
        match &self.kind {
            BackendError(err) => err.report(dest),
            ScenarioMalformed(err) => report_error(dest, "Malformed Scenario", &err.to_string()),
            ScenarioFailed { scenario, found } => report_error(
                dest,
                "Scenario Failed",
                &format!("scenario '{}' produced {}", scenario, found),
            ),
            CouldNotSerialize(err) => writeln!(dest, "Could not serialize contracts: {}", err),
            CouldNotWriteOutput(err) => writeln!(dest, "Could not write output: {}", err),
        }
    }

    fn exit_status(&self) -> i32 {
        match &self.kind {
            ErrorKind::BackendError(err) => err.exit_status(),
            _ => 1,
        }
    }
}

pub fn handle_config(config: cli::Config) -> Result<(), Error> {
    match config {
        cli::Config::ContractConfig(config) => print_contracts(&config),
        cli::Config::JavaOutputConfig(config) => emit_companions(&config),
        cli::Config::DemoConfig(config) => run_demo(&config),
    }
}

fn param_type_name(contract: &WrapperContract, type_: ParamType) -> String {
    match type_ {
        ParamType::Integer => "long".to_owned(),
        ParamType::Element => contract.kind.native_name().to_owned(),
        ParamType::Wrapper => contract.wrapper_name.to_owned(),
        ParamType::GenericView => contract.generic_view.to_string(),
    }
}

fn return_type_name(contract: &WrapperContract, ret: ReturnType) -> Option<String> {
    match ret {
        ReturnType::Unit => None,
        ReturnType::Integer => Some("long".to_owned()),
        ReturnType::Element => Some(contract.kind.native_name().to_owned()),
        ReturnType::Wrapper => Some(contract.wrapper_name.to_owned()),
        ReturnType::GenericView => Some(contract.generic_view.to_string()),
        ReturnType::Descriptor => Some("TypeDescriptor".to_owned()),
    }
}

fn default_text(contract: &WrapperContract, rule: DefaultRule) -> String {
    match rule {
        DefaultRule::ElementDefault => contract.kind.default_value().to_string(),
        DefaultRule::Zero => "0".to_owned(),
        DefaultRule::RemainingLength => "<remaining>".to_owned(),
    }
}

/// Writes one wrapper's member table, one member per line:
///
/// ```text
/// IntArray: reify.lang::Array<reify.lang::Integer>
///     static new(size: long, element: int = 0): IntArray
///     get(index: long): int
/// ```
pub fn write_contract(contract: &WrapperContract, w: &mut impl Write) -> io::Result<()> {
    writeln!(w, "{}: {}", contract.wrapper_name, contract.generic_view)?;
    for decl in &contract.operations {
        let params = decl
            .params
            .iter()
            .map(|param| {
                let mut text = format!("{}: {}", param.name, param_type_name(contract, param.type_));
                if let Some(rule) = param.default {
                    text.push_str(" = ");
                    text.push_str(&default_text(contract, rule));
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ");

        write!(w, "    ")?;
        if decl.is_static {
            write!(w, "static ")?;
        }
        write!(w, "{}({})", decl.name, params)?;
        if let Some(ret) = return_type_name(contract, decl.ret) {
            write!(w, ": {}", ret)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn print_contracts(config: &cli::ContractConfig) -> Result<(), Error> {
    let contracts: Vec<_> = config.kinds.iter().map(|kind| contract_for(*kind)).collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if config.json {
        serde_json::to_writer_pretty(&mut out, &contracts).map_err(ErrorKind::CouldNotSerialize)?;
        writeln!(out)?;
    } else {
        for (i, contract) in contracts.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            write_contract(contract, &mut out)?;
        }
    }
    Ok(())
}

fn emit_companions(config: &cli::JavaOutputConfig) -> Result<(), Error> {
    let units = reify_backend::companion_classes(&config.kinds, &config.build.java);
    reify_backend::write_units(&units, &config.build)?;
    Ok(())
}

fn run_demo(config: &cli::DemoConfig) -> Result<(), Error> {
    let scenarios = demo::scenarios().map_err(ErrorKind::ScenarioMalformed)?;

    let mut units = Vec::new();
    for scenario in &scenarios {
        log::info!("running scenario '{}'", scenario.name);
        let value = reify_backend::run(&scenario.program, &config.build.erase)?;
        writeln!(io::stdout().lock(), "{}: {:?}", scenario.name, value)?;
        if !scenario.check(&value) {
            return Err(ErrorKind::ScenarioFailed {
                scenario: scenario.name,
                found: format!("{:?}", value),
            }
            .into());
        }

        units.push(reify_backend::compile_to_java(
            &scenario.program,
            scenario.class_name,
            &config.build,
        )?);
    }

    reify_backend::write_units(&units, &config.build)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reify_common::data::primitive::PrimitiveKind;

    fn contract_text(kind: PrimitiveKind) -> String {
        let mut out = Vec::new();
        write_contract(&contract_for(kind), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn int_contract_table() {
        let text = contract_text(PrimitiveKind::Int);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "IntArray: reify.lang::Array<reify.lang::Integer>",
                "    static new(size: long, element: int = 0): IntArray",
                "    get(index: long): int",
                "    set(index: long, element: int)",
                "    size(): long",
                "    copyTo(destination: IntArray, sourcePosition: long = 0, \
                 destinationPosition: long = 0, length: long = <remaining>)",
                "    array(): reify.lang::Array<reify.lang::Integer>",
                "    static from(array: reify.lang::Array<reify.lang::Integer>): IntArray",
                "    $getType$(): TypeDescriptor",
            ]
        );
    }

    #[test]
    fn element_defaults_follow_the_kind() {
        assert!(contract_text(PrimitiveKind::Boolean).contains("element: boolean = false"));
        assert!(contract_text(PrimitiveKind::Double).contains("element: double = 0.0"));
    }

    #[test]
    fn scenario_failure_report() {
        let err: Error = ErrorKind::ScenarioFailed {
            scenario: "int copy",
            found: "()".to_owned(),
        }
        .into();
        let mut out = Vec::new();
        err.report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Scenario Failed"));
        assert!(text.contains("scenario 'int copy' produced ()"));
        assert_eq!(err.exit_status(), 1);
    }
}
