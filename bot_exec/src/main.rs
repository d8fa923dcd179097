//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The executable runs the autonomous routine against the simulated robot:
//!
//!     - Initialise the session, logging and parameters
//!     - Configure the drivetrain
//!     - Main loop, once per control cycle:
//!         - Autonomous sequencer processing
//!         - Safe mode handling
//!         - Simulation step
//!
//! The loop ends when the routine completes or is aborted, or when the run duration is reached.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use eqpt_if::OperatingMode;
use log::{debug, error, info, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use bot_lib::{
    auto_seq::{AutoSeq, SeqStatus},
    data_store::{DataStore, SafeModeCause},
    params::RobotParams,
    sens::StartPosition,
    sim::{SimBot, SimConfig},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
    time::seconds_to_cycles,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive cycle overruns after which the robot is made safe.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 200;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "bot_exec", about = "Run the autonomous routine on the simulated robot")]
struct Opt {
    /// Start position of the robot (left, middle, right or unknown)
    #[structopt(short, long, default_value = "middle", parse(try_from_str = parse_start))]
    start: StartPosition,

    /// Field configuration code sent by the driver station, e.g. "LRL"
    #[structopt(short, long)]
    field_config: Option<String>,

    /// Delay before the field configuration is received
    #[structopt(long, default_value = "0.25")]
    field_delay_s: f64,

    /// Disable the robot after this many seconds
    #[structopt(long)]
    disable_after_s: Option<f64>,

    /// Maximum duration of the run
    #[structopt(long, default_value = "15")]
    duration_s: f64,

    /// Parameter file, relative to the params directory
    #[structopt(long, default_value = "robot.toml")]
    params: String,

    /// Run the cycles back to back rather than in real time
    #[structopt(long)]
    fast: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("bot_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, the drive modules trace every cycle
    logger_init(
        LevelFilter::Debug,
        &[
            ("bot_lib::vel_reg", LevelFilter::Debug),
            ("bot_lib::sim", LevelFilter::Info),
        ],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Robot Executable\n");
    info!("Running on: {}", host::get_host_description());
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: RobotParams =
        util::params::load(&opt.params).wrap_err("Could not load robot params")?;
    params.validate().wrap_err("Invalid robot params")?;

    info!("Robot parameters loaded");

    let cycle_period_s = params.cycle_period_s;
    let cycle_frequency_hz = 1.0 / cycle_period_s;

    // ---- INITIALISE EQUIPMENT ----

    let mut bot = SimBot::with_config(
        opt.start,
        SimConfig {
            cycle_period_s,
            record_commands: false,
            ..SimConfig::default()
        },
    );
    if let Some(ref code) = opt.field_config {
        bot = bot.with_field_config(code, seconds_to_cycles(opt.field_delay_s, cycle_period_s));
    }
    let disable_cycle = opt
        .disable_after_s
        .map(|s| seconds_to_cycles(s, cycle_period_s));
    let max_cycles = seconds_to_cycles(opt.duration_s, cycle_period_s);

    info!(
        "Simulated robot at {} start, field configuration {:?}",
        opt.start, opt.field_config
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let mut auto_seq = AutoSeq::new(&params);
    auto_seq
        .init(&mut bot)
        .wrap_err("Failed to initialise AutoSeq")?;
    info!("AutoSeq init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    bot.set_mode(OperatingMode::Autonomous);

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz);

        // ---- DRIVER STATION ----

        if disable_cycle == Some(ds.num_cycles as u64) {
            info!("Disabling the robot");
            bot.set_mode(OperatingMode::Disabled);
        }

        // ---- AUTONOMY PROCESSING ----

        if !ds.safe {
            let status = auto_seq.tick(&mut bot);

            match status {
                SeqStatus::InProgress => (),
                SeqStatus::Complete => {
                    if ds.make_safe(SafeModeCause::AutoSeqComplete) {
                        auto_seq.halt(&mut bot);
                    }
                }
                SeqStatus::Aborted(ref abort) => {
                    error!("Autonomous routine aborted: {:?}", abort);
                    if ds.make_safe(SafeModeCause::AutoSeqAborted) {
                        auto_seq.halt(&mut bot);
                    }
                }
            }

            ds.seq_status = Some(status);
        }

        if ds.is_1_hz_cycle {
            let tm = auto_seq.tm();
            info!(
                "AutoSeq {}: step {}/{} ({:?}), counts L = {}, R = {}",
                tm.state, tm.step_index, tm.num_steps, tm.current_cmd, tm.counts[0], tm.counts[1]
            );
        }

        // ---- SIMULATION ----

        bot.step();

        ds.num_cycles += 1;

        if ds.safe {
            break;
        }

        if ds.num_cycles as u64 >= max_cycles {
            warn!("Run duration of {} s reached", opt.duration_s);
            auto_seq.halt(&mut bot);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        // Get the cycle duration
        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                if !opt.fast {
                    thread::sleep(d);
                }
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS
                    && ds.make_safe(SafeModeCause::CycleOverrun)
                {
                    auto_seq.halt(&mut bot);
                }
            }
        }
    }

    info!(
        "Run ended after {} cycles ({:.3} s of robot time)",
        ds.num_cycles,
        ds.num_cycles as f64 * cycle_period_s
    );

    match ds.safe_cause {
        Some(SafeModeCause::AutoSeqAborted) => Err(eyre!(
            "The autonomous routine was aborted: {:?}",
            ds.seq_status
        )),
        Some(SafeModeCause::CycleOverrun) => Err(eyre!(
            "More than {} consecutive cycle overruns",
            MAX_CONSEC_CYCLE_OVERRUNS
        )),
        _ => Ok(()),
    }
}

/// Parse a start position given on the command line.
fn parse_start(s: &str) -> Result<StartPosition, String> {
    match s.to_lowercase().as_str() {
        "left" | "l" => Ok(StartPosition::Left),
        "middle" | "m" => Ok(StartPosition::Middle),
        "right" | "r" => Ok(StartPosition::Right),
        "unknown" => Ok(StartPosition::Unknown),
        _ => Err(format!("Unknown start position \"{}\"", s)),
    }
}
