use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::Context;

use vpucost_model::{build_workload, query, CostModel, QueryMode, Target};
use vpucost_workload::{
    ActivationFunction, DataType, IsiStrategy, Layout, MpeMode, NthwNtk, Operation,
    OperationParameters, Swizzling, VpuDevice,
};

/// VPU cost model query tool
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Serialized cost model path (default: models/<device>.vpunn)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Profiling mode: DPU or DMA
    #[arg(long, default_value = "DPU", value_parser = parse_tag::<QueryMode>)]
    mode: QueryMode,

    /// Target metric: cycles, power or utilization
    #[arg(long, default_value = "cycles", value_parser = parse_tag::<Target>)]
    target: Target,

    /// The VPU IP device
    #[arg(short, long, value_parser = parse_tag::<VpuDevice>)]
    device: VpuDevice,

    /// The operation
    #[arg(long, default_value = "CONVOLUTION", value_parser = parse_tag::<Operation>)]
    operation: Operation,

    /// DPU MPE mode (pre-2.7 devices)
    #[arg(long, default_value = "4x4", value_parser = parse_tag::<MpeMode>)]
    mpe_mode: MpeMode,

    /// DPU NTHW-NTK mode (2.7+ devices)
    #[arg(long, default_value = "8x8", value_parser = parse_tag::<NthwNtk>)]
    nthw_ntk: NthwNtk,

    /// The operation activation function
    #[arg(long, default_value = "NONE", value_parser = parse_tag::<ActivationFunction>)]
    activation: ActivationFunction,

    /// Tensor width
    #[arg(short = 'x', long)]
    width: u32,

    /// Tensor height
    #[arg(short = 'y', long)]
    height: u32,

    /// Tensor input channels
    #[arg(long)]
    input_channels: u32,

    /// Tensor output channels
    #[arg(long)]
    output_channels: u32,

    /// Tensor batch
    #[arg(short, long, default_value_t = 1)]
    batch: u32,

    /// Operation kernel
    #[arg(short, long, default_value_t = 1)]
    kernel: u32,

    /// Operation padding
    #[arg(short, long, default_value_t = 0)]
    padding: u32,

    /// Operation strides
    #[arg(short, long, default_value_t = 1)]
    strides: u32,

    /// The input datatype
    #[arg(long, default_value = "UINT8", value_parser = parse_tag::<DataType>)]
    input_dtype: DataType,

    /// The output datatype
    #[arg(long, default_value = "UINT8", value_parser = parse_tag::<DataType>)]
    output_dtype: DataType,

    /// The ODU layout
    #[arg(long, default_value = "ZXY", value_parser = parse_tag::<Layout>)]
    output_layout: Layout,

    /// ISI strategy
    #[arg(long, default_value = "clustering", value_parser = parse_tag::<IsiStrategy>)]
    isi_strategy: IsiStrategy,

    /// Activation tensor sparsity rate
    #[arg(long, default_value_t = 0.0, value_parser = parse_rate)]
    act_sparsity: f32,

    /// Enable weight tensor sparsity
    #[arg(long)]
    param_sparsity_enabled: bool,

    /// Weight tensor sparsity rate
    #[arg(long, default_value_t = 0.0, value_parser = parse_rate)]
    param_sparsity: f32,

    /// Input tensor swizzling key (0-5)
    #[arg(long, default_value = "0", value_parser = parse_swizzling)]
    input_swizzling: Swizzling,

    /// Weight tensor swizzling key (0-5)
    #[arg(long, default_value = "0", value_parser = parse_swizzling)]
    param_swizzling: Swizzling,

    /// Output tensor swizzling key (0-5)
    #[arg(long, default_value = "0", value_parser = parse_swizzling)]
    output_swizzling: Swizzling,

    /// How many tiles the DPU broadcasts to (1 = no broadcast)
    #[arg(long, default_value_t = 1)]
    output_write_tiles: u32,

    /// Print the full workload descriptor before querying
    #[arg(short, long)]
    verbose: bool,
}

fn parse_tag<T>(s: &str) -> Result<T, String>
where
    T: std::str::FromStr + Clone + Send + Sync + 'static,
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| e.to_string())
}

fn parse_rate(s: &str) -> Result<f32, String> {
    let rate: f32 = s
        .parse()
        .map_err(|_| format!("sparsity rate must be a number, got '{s}'"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("sparsity rate must be within [0, 1], got {rate}"))
    }
}

fn parse_swizzling(s: &str) -> Result<Swizzling, String> {
    let key: u8 = s
        .parse()
        .map_err(|_| format!("swizzling key must be an integer, got '{s}'"))?;
    Swizzling::from_key(key).ok_or_else(|| format!("swizzling key {key} out of range (0-5)"))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let params = OperationParameters {
        device: cli.device,
        operation: cli.operation,
        width: cli.width,
        height: cli.height,
        input_channels: cli.input_channels,
        output_channels: cli.output_channels,
        batch: cli.batch,
        kernel: cli.kernel,
        padding: cli.padding,
        stride: cli.strides,
        input_dtype: cli.input_dtype,
        output_dtype: cli.output_dtype,
        output_layout: cli.output_layout,
        activation: cli.activation,
        mpe_mode: cli.mpe_mode,
        nthw_ntk: cli.nthw_ntk,
        isi_strategy: cli.isi_strategy,
        activation_sparsity: cli.act_sparsity,
        weight_sparsity_enabled: cli.param_sparsity_enabled,
        weight_sparsity: cli.param_sparsity,
        input_swizzling: cli.input_swizzling,
        weight_swizzling: cli.param_swizzling,
        output_swizzling: cli.output_swizzling,
        output_write_tiles: cli.output_write_tiles,
    };

    // 1. Initialize the estimator; a missing model degrades with a warning.
    let model_path = cli
        .model
        .unwrap_or_else(|| default_model_path(cli.device));
    let model = CostModel::load(&model_path);

    // 2. Build the workload descriptor; inconsistent geometry aborts here.
    let workload = build_workload(&params, cli.mode)
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("invalid workload geometry")?;

    // 3. Optionally dump the descriptor.
    if cli.verbose {
        println!("{workload}");
    }

    // 4. One oracle query.
    let result = query(&model, &workload, cli.target)
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("cost query failed")?;

    println!("{} execution {}: {}", cli.mode, cli.target, result);

    Ok(())
}

fn default_model_path(device: VpuDevice) -> PathBuf {
    PathBuf::from(format!(
        "models/{}.vpunn",
        device.as_str().to_ascii_lowercase()
    ))
}
