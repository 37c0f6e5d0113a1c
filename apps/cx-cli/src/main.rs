use clap::{Parser, Subcommand, ValueEnum};
use cx_gas::ConstantSolubility;
use cx_project::{GasLiquidModel, PressureMode, ProjectError, SimulationInputs, load_config};
use cx_sim::{
    CellDemand, FlowSweep, SimError, VesselOptions, estimate_time_to_target, recommended_flow,
    run_flow_sweep, simulate, simulate_vessel, simulate_vessel_ph,
};
use cx_transfer::{
    DissolvedGas, TransferError, co2_stage_profiles, compute_single_pass_steady_outlet,
    reference_concentrations,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "cx-cli")]
#[command(about = "Gas exchange through semi-permeable tubing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate {
        /// Path to the YAML or JSON configuration
        config: PathBuf,
    },
    /// Single-pass outlet and fixed-duration run summary
    Run {
        config: PathBuf,
    },
    /// Recirculating vessel O2/N2 trajectory
    Vessel {
        config: PathBuf,
        /// End time in seconds
        #[arg(long, default_value_t = 3600.0)]
        t_end: f64,
        /// Requested time step in seconds
        #[arg(long, default_value_t = 1.0)]
        dt: f64,
        /// Rows printed from the trajectory
        #[arg(long, default_value_t = 12)]
        rows: usize,
    },
    /// Recirculating vessel CO2 and pH
    Ph {
        config: PathBuf,
        #[arg(long, default_value_t = 3600.0)]
        t_end: f64,
        #[arg(long, default_value_t = 1.0)]
        dt: f64,
        #[arg(long, default_value_t = 12)]
        rows: usize,
    },
    /// Time for vessel O2 to reach a percentage of air saturation
    Target {
        config: PathBuf,
        /// Target, percent of air-saturated O2
        #[arg(long)]
        percent: f64,
    },
    /// Sweep liquid flow
    Sweep {
        config: PathBuf,
        /// Lowest flow [mL/min]
        #[arg(long)]
        min: f64,
        /// Highest flow [mL/min]
        #[arg(long)]
        max: f64,
        #[arg(long, default_value_t = 10)]
        points: usize,
        /// Gas pressure source
        #[arg(long, value_enum, default_value_t = PressureArg::Manual)]
        pressure: PressureArg,
        /// Cell count for a demand-based flow recommendation
        #[arg(long)]
        cells: Option<f64>,
        /// Specific O2 uptake per cell [mol/s]
        #[arg(long, default_value_t = 1e-16)]
        q_o2_cell: f64,
        #[arg(long, default_value_t = 1.0)]
        margin: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PressureArg {
    Manual,
    Conservative,
    Optimistic,
}

impl PressureArg {
    fn mode(self, inputs: &SimulationInputs) -> PressureMode {
        match self {
            Self::Manual => PressureMode::Manual {
                p_total_kpa: inputs.p_total_kpa,
            },
            Self::Conservative => PressureMode::ConservativeCurve,
            Self::Optimistic => PressureMode::OptimisticCurve,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Run { config } => cmd_run(&config),
        Commands::Vessel {
            config,
            t_end,
            dt,
            rows,
        } => cmd_vessel(&config, VesselOptions { t_end_s: t_end, dt_s: dt }, rows),
        Commands::Ph {
            config,
            t_end,
            dt,
            rows,
        } => cmd_ph(&config, VesselOptions { t_end_s: t_end, dt_s: dt }, rows),
        Commands::Target { config, percent } => cmd_target(&config, percent),
        Commands::Sweep {
            config,
            min,
            max,
            points,
            pressure,
            cells,
            q_o2_cell,
            margin,
        } => {
            let demand = cells.map(|total_cells| CellDemand {
                total_cells,
                q_o2_cell_mol_s: q_o2_cell,
                margin,
            });
            cmd_sweep(&config, min, max, points, pressure, demand)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn cmd_validate(config: &Path) -> CliResult<()> {
    println!("Validating config: {}", config.display());
    let inputs = load_config(config)?;
    println!("✓ Config is valid");
    println!(
        "  {} / {} coupling, {} segments",
        inputs.transfer_model, inputs.gas_liquid_model, inputs.n_segments
    );
    Ok(())
}

fn cmd_run(config: &Path) -> CliResult<()> {
    let inputs = load_config(config)?;
    let sol = ConstantSolubility::default();

    let start = Instant::now();
    let steady = compute_single_pass_steady_outlet(&inputs, &sol, DissolvedGas::initial(&inputs))?;
    let run = simulate(&inputs, &sol)?;
    let elapsed = start.elapsed();

    let m = &steady.metadata;
    println!("Model:   {} ({})", m.model, m.solver);
    println!("  Tube volume:        {:.3} mL", m.tube_volume_ml);
    println!("  Annulus volume:     {:.3} mL", m.annulus_volume_ml);
    println!("  Residence time:     {:.2} s", m.residence_time_s);
    println!("  Gas residence time: {:.2} s", m.gas_residence_time_s);
    println!(
        "  Effective kLa:      O2 {:.5} 1/s, N2 {:.5} 1/s",
        m.effective_kla_o2_s_inv, m.effective_kla_n2_s_inv
    );
    println!("  O2 supply:          {:.5} mmol/min", m.o2_supply_rate_mmol_min);
    println!(
        "  Equilibrium:        O2 {:.4} mmol/L, N2 {:.4} mmol/L",
        run.cstar_o2_mmol_l, run.cstar_n2_mmol_l
    );
    println!(
        "  Outlet:             O2 {:.4} mmol/L, N2 {:.4} mmol/L",
        steady.outlet.o2, steady.outlet.n2
    );
    if m.o2_transfer_limited {
        println!("  ! O2 uptake limited by gas supply");
    }
    if let Some(p) = &m.profiles {
        println!(
            "  Gas outlet:         y_O2 {:.4}, y_N2 {:.4} ({} iterations{})",
            p.gas_out_y_o2,
            p.gas_out_y_n2,
            p.iterations,
            if p.converged { "" } else { ", not converged" }
        );
    }
    if let Some(co2) = &run.co2 {
        println!(
            "  CO2:                {:.4} -> {:.4} mmol/L, pH {:.3} -> {:.3}",
            co2.co2_in_mmol_l, co2.outlet.co2_final_outlet_mmol_l, co2.ph_in, co2.ph_out
        );
        if inputs.gas_liquid_model == GasLiquidModel::Segmented {
            let profiles = co2_stage_profiles(&inputs, &sol, co2.co2_in_mmol_l, inputs.n_segments)?;
            if let (Some(first), Some(last)) = (profiles.liq_profile_ph.first(), profiles.liq_profile_ph.last()) {
                println!(
                    "  pH section profile: {:.3} -> {:.3} ({} iterations{})",
                    first,
                    last,
                    profiles.iterations,
                    if profiles.co2_transfer_limited { ", supply limited" } else { "" }
                );
            }
        }
    }
    println!(
        "  Samples:            {} over {:.0} s ({:.1} ms)",
        run.len(),
        run.metadata.t_end_s,
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Indices of about `rows` evenly spaced samples, always including the last.
fn sample_indices(len: usize, rows: usize) -> Vec<usize> {
    if len == 0 || rows == 0 {
        return Vec::new();
    }
    let stride = len.div_ceil(rows).max(1);
    let mut idx: Vec<usize> = (0..len).step_by(stride).collect();
    if idx.last() != Some(&(len - 1)) {
        idx.push(len - 1);
    }
    idx
}

fn cmd_vessel(config: &Path, opts: VesselOptions, rows: usize) -> CliResult<()> {
    let inputs = load_config(config)?;
    let sol = ConstantSolubility::default();
    let reference = reference_concentrations(inputs.temperature_c, &sol)?;
    let traj = simulate_vessel(&inputs, &sol, reference.o2, opts)?;

    println!(
        "Vessel {:.2} L, dt {:.2} s, delay {} steps",
        inputs.volume_l, traj.effective_dt_s, traj.delay_steps
    );
    println!("{:>10} {:>12} {:>12} {:>8}", "t [s]", "O2 [mmol/L]", "N2 [mmol/L]", "DO [%]");
    for i in sample_indices(traj.time_s.len(), rows) {
        println!(
            "{:>10.1} {:>12.5} {:>12.5} {:>8.1}",
            traj.time_s[i], traj.c_o2_mmol_l[i], traj.c_n2_mmol_l[i], traj.do_percent[i]
        );
    }
    Ok(())
}

fn cmd_ph(config: &Path, opts: VesselOptions, rows: usize) -> CliResult<()> {
    let inputs = load_config(config)?;
    let series = simulate_vessel_ph(&inputs, &ConstantSolubility::default(), opts)?;

    println!(
        "Vessel {:.2} L, dt {:.2} s, pH stage {}",
        inputs.volume_l,
        series.effective_dt_s,
        if inputs.co2.enabled { "on" } else { "off" }
    );
    println!("{:>10} {:>13} {:>7}", "t [s]", "CO2 [mmol/L]", "pH");
    for i in sample_indices(series.time_s.len(), rows) {
        println!(
            "{:>10.1} {:>13.5} {:>7.3}",
            series.time_s[i], series.c_co2_mmol_l[i], series.ph[i]
        );
    }
    Ok(())
}

fn cmd_target(config: &Path, percent: f64) -> CliResult<()> {
    let inputs = load_config(config)?;
    let sol = ConstantSolubility::default();
    let reference = reference_concentrations(inputs.temperature_c, &sol)?;
    let result = estimate_time_to_target(&inputs, &sol, percent, reference.o2)?;

    match result.time_s {
        Some(t) if result.reached => println!(
            "✓ {percent:.1} % reached after {:.1} min ({:.1} % at stop)",
            t / 60.0,
            result.final_percent
        ),
        _ => println!(
            "✗ {percent:.1} % not reached within 8 h ({:.1} % at end)",
            result.final_percent
        ),
    }
    Ok(())
}

fn cmd_sweep(
    config: &Path,
    min: f64,
    max: f64,
    points: usize,
    pressure: PressureArg,
    demand: Option<CellDemand>,
) -> CliResult<()> {
    let inputs = load_config(config)?;
    let sweep = FlowSweep::new(min, max, points)?;
    let mode = pressure.mode(&inputs);
    let rows = run_flow_sweep(&inputs, &ConstantSolubility::default(), &sweep, Some(mode))?;

    println!("Pressure: {}", mode.label());
    println!(
        "{:>10} {:>9} {:>8} {:>11} {:>11} {:>12} {:>7} {:>4}",
        "Q [mL/min]", "P [kPa]", "dP [mbar]", "O2 [mM]", "N2 [mM]", "net O2", "DO [%]", "lim"
    );
    for r in &rows {
        println!(
            "{:>10.2} {:>9.2} {:>8.1} {:>11.5} {:>11.5} {:>12.6} {:>7.1} {:>4}",
            r.flow_ml_min,
            r.p_total_kpa,
            r.delta_p_mbar,
            r.c_o2_out_mmol_l,
            r.c_n2_out_mmol_l,
            r.net_o2_added_mmol_min,
            r.do_percent,
            if r.o2_transfer_limited { "yes" } else { "" }
        );
    }

    if let Some(demand) = demand {
        let needed = demand.o2_demand_mmol_min();
        match recommended_flow(&rows, &demand) {
            Some(r) => println!(
                "Demand {needed:.6} mmol/min met from {:.2} mL/min",
                r.flow_ml_min
            ),
            None => println!("Demand {needed:.6} mmol/min not met in the swept range"),
        }
    }
    Ok(())
}
