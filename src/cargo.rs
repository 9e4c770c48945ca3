// Copyright 2021 - 2026 Martin Pool

//! Compose `cargo` command lines for the check/build/test phases.

use std::env;

use tracing::debug;

use crate::build_dir::BuildDir;
use crate::options::Options;
use crate::outcome::Phase;
use crate::package::Package;
use crate::tool::Tool;
use crate::Result;

/// Return the name of the cargo binary.
///
/// When run as a Cargo subcommand, which is the usual/intended case, `$CARGO` tells us the
/// right way to call back into it, so that we get the matching toolchain etc.
pub fn cargo_bin() -> String {
    env::var("CARGO").unwrap_or_else(|_| "cargo".to_owned())
}

/// Make up the argv for a cargo check/build/test invocation, including argv\[0\] as the cargo
/// binary itself.
pub fn cargo_argv(package_name: Option<&str>, phase: Phase, options: &Options) -> Vec<String> {
    let mut cargo_args = vec![cargo_bin(), phase.name().to_string()];
    if phase == Phase::Check || phase == Phase::Build {
        cargo_args.push("--tests".to_string());
    }
    if let Some(package_name) = package_name {
        cargo_args.push("--package".to_owned());
        cargo_args.push(package_name.to_owned());
    } else {
        cargo_args.push("--workspace".to_string());
    }
    cargo_args.extend(options.additional_cargo_args.iter().cloned());
    if phase == Phase::Test {
        cargo_args.extend(options.additional_cargo_test_args.iter().cloned());
    }
    cargo_args
}

/// The [Tool] implementation for Cargo, the only tool presently supported.
#[derive(Debug, Default)]
pub struct CargoTool {}

impl Tool for CargoTool {
    fn compose_argv(
        &self,
        _build_dir: &BuildDir,
        packages: Option<&[&Package]>,
        phase: Phase,
        options: &Options,
    ) -> Result<Vec<String>> {
        let package_name = match packages {
            Some([single]) => Some(single.name.as_str()),
            _ => None,
        };
        debug!(?phase, ?package_name, "compose cargo argv");
        Ok(cargo_argv(package_name, phase, options))
    }

    fn compose_env(&self) -> Result<Vec<(String, String)>> {
        // See <https://doc.rust-lang.org/cargo/reference/environment-variables.html>
        // <https://doc.rust-lang.org/rustc/lints/levels.html#capping-lints>
        Ok(vec![("RUSTFLAGS".to_owned(), "--cap-lints=allow".to_owned())])
    }
}
