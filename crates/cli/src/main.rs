//! Command-line front end for the vector, SFU and CLIC models.
//!
//! This binary exposes the library's standalone units for quick experiments. It provides:
//! 1. **SFU:** Evaluate one transcendental on a binary32 input and report bits, value, flags
//!    and the error against a double-precision reference.
//! 2. **Reduce:** Run one grouped reduction over values given on the command line.
//! 3. **CLIC demo:** Build a controller from configuration, raise a few lines and print the
//!    delivered exception codes in delivery order.

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use rustc_apfloat::Round;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use vxsim_core::config::Config;
use vxsim_core::core::units::fpu::FloatFormat;
use vxsim_core::core::units::fpu::rounding_modes::RoundingMode;
use vxsim_core::core::units::fpu::soft;
use vxsim_core::core::units::sfu::{SfuOp, evaluate_with_reference};
use vxsim_core::core::units::vector::group_reduce::{GroupOp, GroupShape, ReductionEngine};
use vxsim_core::soc::devices::clic::{Clic, HartLines, decode_exccode};

#[derive(Parser, Debug)]
#[command(
    name = "vxsim",
    author,
    version,
    about = "RISC-V vector engine, SFU and CLIC models",
    long_about = "Exercise the SFU, grouped reductions and the CLIC from the command line.\n\nExamples:\n  vxsim sfu sigmoid 0.5\n  vxsim sfu rcp 0x3fc00000\n  vxsim reduce sum f16 1.0 -1.0 0.25\n  vxsim --config hw.json clic-demo"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one SFU function.
    Sfu {
        /// Function to evaluate.
        op: SfuArg,
        /// Input as an f32 literal or `0x`-prefixed binary32 bits.
        value: String,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Reduce values in groups of `reduction_group` elements.
    Reduce {
        /// Reduction operator.
        op: OpArg,
        /// Element format.
        fmt: FmtArg,
        /// Elements as float literals or `0x`-prefixed raw bits.
        #[arg(allow_hyphen_values = true, required = true)]
        values: Vec<String>,
        /// Pack one value per group instead of broadcasting.
        #[arg(long)]
        compress: bool,
        /// Round sums to odd instead of to nearest even.
        #[arg(long)]
        round_odd: bool,
    },

    /// Raise three interrupt lines and print the delivery order.
    ClicDemo,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SfuArg {
    Exp2,
    Rcp,
    Sigmoid,
    Tanh,
}

impl From<SfuArg> for SfuOp {
    fn from(arg: SfuArg) -> Self {
        match arg {
            SfuArg::Exp2 => Self::Exp2,
            SfuArg::Rcp => Self::Rcp,
            SfuArg::Sigmoid => Self::Sigmoid,
            SfuArg::Tanh => Self::Tanh,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OpArg {
    Sum,
    Max,
    Min,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FmtArg {
    F16,
    Bf16,
    F32,
}

impl From<FmtArg> for FloatFormat {
    fn from(arg: FmtArg) -> Self {
        match arg {
            FmtArg::F16 => Self::Half,
            FmtArg::Bf16 => Self::BFloat16,
            FmtArg::F32 => Self::Single,
        }
    }
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref().map_or_else(|| Ok(Config::default()), Config::from_file) {
        Ok(config) => {
            tracing::info!(path = ?cli.config, vlen = config.vector.vlen, "configuration loaded");
            config
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Sfu { op, value, json } => cmd_sfu(op.into(), &value, json),
        Commands::Reduce { op, fmt, values, compress, round_odd } => {
            cmd_reduce(&config, op, fmt.into(), &values, compress, round_odd)
        }
        Commands::ClicDemo => cmd_clic_demo(&config),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Parses `0x` bits or a float literal into a binary32 bit pattern.
fn parse_single(text: &str) -> Result<u32, String> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).map_err(|e| format!("bad bits {text:?}: {e}"));
    }
    text.parse::<f32>().map(f32::to_bits).map_err(|e| format!("bad value {text:?}: {e}"))
}

/// Parses one element of `fmt`, rounding float literals to nearest even.
fn parse_element(text: &str, fmt: FloatFormat) -> Result<u64, String> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        let bits = u64::from_str_radix(hex, 16).map_err(|e| format!("bad bits {text:?}: {e}"))?;
        return Ok(bits & fmt.value_mask());
    }
    let single = u64::from(parse_single(text)?);
    if fmt == FloatFormat::Single {
        return Ok(single);
    }
    Ok(soft::convert(FloatFormat::Single, fmt, single, Round::NearestTiesToEven).value)
}

/// Machine-readable SFU result.
#[derive(Serialize, Debug)]
struct SfuReport {
    op: String,
    input: u32,
    result: u32,
    value: f32,
    flags: u8,
    error_ulp: f32,
}

fn cmd_sfu(op: SfuOp, value: &str, json: bool) -> Result<(), String> {
    let input = parse_single(value)?;
    let out = evaluate_with_reference(op, input);
    if json {
        let report = SfuReport {
            op: op.to_string(),
            input,
            result: out.result,
            value: out.value(),
            flags: out.flags.bits(),
            error_ulp: out.error_estimate,
        };
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }
    println!("{op}({}) [{input:#010x}]", f32::from_bits(input));
    println!("  result: {:#010x} ({})", out.result, out.value());
    println!("  flags:  {}", out.flags);
    println!("  error:  {} ulp", out.error_estimate);
    println!("  acc:    {:#x}", out.booth_debug);
    Ok(())
}

fn cmd_reduce(
    config: &Config,
    op: OpArg,
    fmt: FloatFormat,
    values: &[String],
    compress: bool,
    round_odd: bool,
) -> Result<(), String> {
    let input = values.iter().map(|v| parse_element(v, fmt)).collect::<Result<Vec<_>, _>>()?;
    let engine = ReductionEngine::new(fmt, config.vector.reduction_group)
        .map_err(|e| e.to_string())?
        .with_rounding(RoundingMode::Rne)
        .with_round_to_odd(round_odd);
    let op = match op {
        OpArg::Sum => GroupOp::Sum,
        OpArg::Max => GroupOp::Max,
        OpArg::Min => GroupOp::Min,
    };
    let shape = if compress { GroupShape::Compress } else { GroupShape::Dup };
    let (out, flags) = engine.reduce(op, shape, &input);

    let width = fmt.bytes() * 2 + 2;
    for (i, bits) in out.iter().enumerate() {
        let value = soft::convert(fmt, FloatFormat::Double, *bits, Round::NearestTiesToEven).value;
        println!("[{i:3}] {bits:#0width$x} ({})", f64::from_bits(value));
    }
    println!("flags: {flags}");
    Ok(())
}

fn cmd_clic_demo(config: &Config) -> Result<(), String> {
    let clic_config = &config.clic;
    if clic_config.num_sources < 10 {
        return Err(format!("clic-demo needs at least 10 sources, config has {}", clic_config.num_sources));
    }
    let lines = Arc::new(HartLines::new(clic_config.num_harts));
    let clic = Clic::new(clic_config.clone(), lines.clone()).map_err(|e| e.to_string())?;

    // Edge-triggered IRQs 5, 2 and 9 with priorities 3, 3 and 1.
    let int_base = 0x1000u64;
    for (irq, ctl) in [(5u64, 3u64), (2, 3), (9, 1)] {
        let reg = int_base + irq * 4;
        clic.write(0, reg + 2, 1, 0b010);
        clic.write(0, reg + 3, 1, ctl);
        clic.write(0, reg + 1, 1, 1);
    }
    println!("cliccfg:  {:#04x}", clic.read(0, 0x0, 1));
    println!("clicinfo: {:#010x}", clic.read(0, 0x4, 4));

    for irq in [5usize, 2, 9] {
        clic.set_irq(irq, true);
    }

    while let Some(code) = lines.take(0) {
        let (irq, mode, level) = decode_exccode(code);
        println!("delivered exccode {code:#08x}: irq {irq}, mode {mode}, level {level}");
        clic.accept(0, usize::from(irq));
        clic.next_interrupt(0);
    }
    Ok(())
}
