/*!
 * selffork demo
 *
 * Registers a handful of functions, then forks itself to run them:
 * - greet: print a numbered greeting
 * - sum: print the sum of a list
 * - record: write "count:label" to a file
 * - env: write the fork contract variables as seen by the child
 * - exit: exit with the given code
 */

use selffork::core::serialization::json;
use selffork::{args, init_tracing, register, ForkResult, Function, Target};
use std::fs;
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

fn greet(count: i64, label: String) {
    println!("{label} #{count}");
}

fn sum(values: Vec<i64>) {
    println!("{}", values.iter().sum::<i64>());
}

fn record(path: String, count: i64, label: String) -> io::Result<()> {
    fs::write(path, format!("{count}:{label}"))
}

fn env(path: String) -> io::Result<()> {
    let show = |key: &str| std::env::var(key).unwrap_or_else(|_| "-".to_string());
    fs::write(
        path,
        format!(
            "{}={}\n{}={}\nSELFFORK_DEMO={}\n",
            selffork::FORK_NAME_VAR,
            show(selffork::FORK_NAME_VAR),
            selffork::FORK_ARGS_VAR,
            show(selffork::FORK_ARGS_VAR),
            show("SELFFORK_DEMO"),
        ),
    )
}

fn exit(code: u8) -> ExitCode {
    ExitCode::from(code)
}

fn register_all() -> ForkResult<()> {
    register("greet", greet)?;
    register("sum", sum)?;
    register("record", record)?;
    register("env", env)?;
    register("exit", exit)?;
    Ok(())
}

fn run() -> ForkResult<()> {
    let mut greeter = Function::new("greet", Target::of(greet))?;

    greeter.fork(&args![1i64, "hello"])?;
    greeter.wait()?;
    if let Some(summary) = greeter.exit_summary() {
        println!("{}", json::to_string_pretty(&summary)?);
    }

    greeter.refork(&args![2i64, "again"])?;
    greeter.wait()?;

    let mut summer = selffork::fork("sum", &args![vec![1i64, 2, 3, 4]])?;
    let status = summer.wait()?;
    info!(success = status.success(), "Sum finished");

    let mut exiter = selffork::fork("exit", &args![3u8])?;
    let status = exiter.wait()?;
    info!(code = ?status.code(), "Exit finished");
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = register_all() {
        eprintln!("{:?}", miette::Report::new(e));
        return ExitCode::FAILURE;
    }
    if let Some(code) = selffork::init() {
        return code;
    }

    init_tracing();
    info!("selffork demo starting");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Demo failed");
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}
