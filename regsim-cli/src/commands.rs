//! CLI command implementations.

use std::fmt::Write as _;
use std::fs;

use regsim_assembler::instruction_text;
use regsim_common::Slot;
use regsim_vm::{Machine, MachineConfig, StepOutcome};
use serde::Deserialize;

/// Step budget when neither `--max-steps` nor a config file sets one.
pub const DEFAULT_MAX_STEPS: u64 = 10_000;

/// Everything `run` and `trace` can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
struct Settings {
    #[serde(flatten)]
    machine: MachineConfig,
    #[serde(default = "default_max_steps")]
    max_steps: u64,
}

fn default_max_steps() -> u64 {
    DEFAULT_MAX_STEPS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            machine: MachineConfig::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Parsed arguments of `run` and `trace`.
#[derive(Debug)]
struct Options {
    input: String,
    settings: Settings,
}

/// Load a program and report its size.
pub fn check(args: &[String]) -> Result<(), i32> {
    let input = single_input("check", args)?;
    let text = read_source(input)?;
    let program = regsim_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    println!(
        "OK: {input} ({} tokens, {} labels)",
        program.len(),
        program.labels().count()
    );
    Ok(())
}

/// Print the canonical listing of a program.
pub fn fmt(args: &[String]) -> Result<(), i32> {
    let input = single_input("fmt", args)?;
    let text = read_source(input)?;
    let program = regsim_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    print!("{}", regsim_assembler::listing(&program));
    Ok(())
}

/// Run a program to completion and print the register table.
pub fn run(args: &[String]) -> Result<(), i32> {
    let options = parse_options("run", args)?;
    let mut machine = load_machine(&options)?;
    execute(&mut machine, options.settings.max_steps, false)?;
    print!("{}", register_table(&machine));
    Ok(())
}

/// Like `run`, printing each instruction before it executes.
pub fn trace(args: &[String]) -> Result<(), i32> {
    let options = parse_options("trace", args)?;
    let mut machine = load_machine(&options)?;
    execute(&mut machine, options.settings.max_steps, true)?;
    print!("{}", register_table(&machine));
    Ok(())
}

// ---- Helpers ----

fn single_input<'a>(command: &str, args: &'a [String]) -> Result<&'a str, i32> {
    match args {
        [input] => Ok(input.as_str()),
        [] => {
            eprintln!("error: {command} requires an input file");
            eprintln!("Usage: regsim {command} <input.asm>");
            Err(1)
        }
        [_, extra, ..] => {
            eprintln!("error: unexpected argument '{extra}'");
            eprintln!("Usage: regsim {command} <input.asm>");
            Err(1)
        }
    }
}

fn read_source(input: &str) -> Result<String, i32> {
    fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })
}

/// Parse `<input> [--stack N] [--max-steps N] [--config F]`.
///
/// The config file is applied first; `--stack` and `--max-steps` override it
/// wherever they appear.
fn parse_options(command: &str, args: &[String]) -> Result<Options, i32> {
    let mut input = None;
    let mut config = None;
    let mut stack = None;
    let mut max_steps = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stack" => stack = Some(parse_number::<u32>(arg, iter.next())?),
            "--max-steps" => max_steps = Some(parse_number::<u64>(arg, iter.next())?),
            "--config" => config = Some(flag_value(arg, iter.next())?),
            flag if flag.starts_with("--") => {
                eprintln!("error: unknown option '{flag}'");
                return Err(1);
            }
            path if input.is_none() => input = Some(path.to_string()),
            extra => {
                eprintln!("error: unexpected argument '{extra}'");
                return Err(1);
            }
        }
    }

    let Some(input) = input else {
        eprintln!("error: {command} requires an input file");
        eprintln!("Usage: regsim {command} <input.asm> [--stack N] [--max-steps N] [--config F]");
        return Err(1);
    };

    let mut settings = match config {
        Some(path) => read_settings(path)?,
        None => Settings::default(),
    };
    if let Some(bytes) = stack {
        settings.machine.stack_capacity = bytes;
    }
    if let Some(steps) = max_steps {
        settings.max_steps = steps;
    }

    Ok(Options { input, settings })
}

fn flag_value<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, i32> {
    value.map(String::as_str).ok_or_else(|| {
        eprintln!("error: {flag} requires a value");
        1
    })
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, i32> {
    let value = flag_value(flag, value)?;
    value.parse().map_err(|_| {
        eprintln!("error: invalid value '{value}' for {flag}");
        1
    })
}

fn read_settings(path: &str) -> Result<Settings, i32> {
    let text = read_source(path)?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("error: invalid config '{path}': {e}");
        1
    })
}

/// A reset machine with the input program loaded.
fn load_machine(options: &Options) -> Result<Machine, i32> {
    let text = read_source(&options.input)?;
    let mut machine = Machine::new(options.settings.machine);
    machine.load(&text).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    Ok(machine)
}

/// Step until `hlt` or the end of the program, within `max_steps`.
fn execute(machine: &mut Machine, max_steps: u64, verbose: bool) -> Result<(), i32> {
    for _ in 0..max_steps {
        if verbose {
            if let Some(text) = next_instruction(machine) {
                println!("{text}");
            }
        }
        match machine.step() {
            Ok(StepOutcome::Halted | StepOutcome::Finished) => return Ok(()),
            Ok(StepOutcome::Executed(_) | StepOutcome::Skipped) => {}
            Err(e) => {
                eprintln!("runtime error: {e}");
                return Err(3);
            }
        }
    }
    if machine.is_finished() {
        return Ok(());
    }
    eprintln!("error: step budget of {max_steps} exhausted");
    Err(2)
}

/// `line N: <instruction>` for the instruction at `eip`, if it is one.
fn next_instruction(machine: &Machine) -> Option<String> {
    let program = machine.program()?;
    let eip = machine.eip();
    let opcode = program.get(eip)?.opcode()?;
    let end = (eip + opcode.width()).min(program.len());
    let line = program.line_of(eip)?;
    Some(format!(
        "line {line}: {}",
        instruction_text(&program.tokens()[eip..end])
    ))
}

/// One row per 32-bit register, then the flags word.
fn register_table(machine: &Machine) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:>10} {:>11} {:>10} binary",
        "reg", "unsigned", "signed", "hex"
    );
    for slot in Slot::ALL {
        let value = machine.get(slot.register());
        let hex = format!("0x{value:x}");
        let _ = writeln!(
            out,
            "{:<4} {value:>10} {:>11} {hex:>10} 0b{value:b}",
            slot.name(),
            value as i32
        );
    }
    let _ = writeln!(out, "eflags {}", machine.flags());
    out
}
