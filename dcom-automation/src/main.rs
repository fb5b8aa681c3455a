//! Runs the fuel tank automation loop against an in-process loopback device

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use dcom::automation::*;
use dcom::egu::convert_to_raw;
use dcom::*;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("expected 3 pump states but got {0}")]
    PumpCount(usize),
    #[error("{0} points cannot be written")]
    NotWritable(PointType),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Automation(#[from] AutomationError),
}

#[derive(Parser)]
#[command(name = "dcom-automation")]
#[command(about = "Runs the fuel tank automation loop against a loopback device")]
#[command(version)]
struct Cli {
    #[arg(
        short = 'd',
        long,
        default_value = "1",
        help = "delay between automation cycles in seconds"
    )]
    delay: u64,

    #[arg(short = 'u', long, default_value = "1", help = "unit id of the device")]
    unit: u8,

    #[arg(short = 'c', long, help = "number of cycles to run, runs until CTRL-C if absent")]
    cycles: Option<u64>,

    #[arg(long, default_value = "100", help = "initial raw fuel level")]
    fuel_level: u16,

    #[arg(long, default_value = "20", help = "fuel level low limit in engineering units")]
    low_limit: f64,

    #[arg(long, default_value = "500", help = "fuel level high limit in engineering units")]
    high_limit: f64,

    #[arg(long, default_value = "0", help = "initial valve state (0 = closed)")]
    valve: u16,

    #[arg(
        long,
        value_delimiter = ',',
        default_value = "1,0,0",
        help = "initial pump states (e.g. 1,0,1)"
    )]
    pumps: Vec<u16>,

    #[arg(long, default_value = "info", help = "log level (trace, debug, info, warn, error)")]
    log_level: tracing::Level,
}

/// Packs each write, hands the frame to a device that echoes it, and stores the parsed echo
struct LoopbackProcessor {
    storage: Arc<MemoryStorage>,
}

impl LoopbackProcessor {
    fn write(
        &self,
        config: &ConfigItem,
        transaction_id: u16,
        unit_id: u8,
        address: u16,
        value: i32,
    ) -> Result<(), Error> {
        let (function, raw) = match config.point_type {
            PointType::DigitalOutput => {
                let raw = if value == 0 { coil::OFF } else { coil::ON };
                (FunctionCode::WriteSingleCoil, raw)
            }
            PointType::AnalogOutput => {
                let raw = convert_to_raw(config.scale_factor, config.deviation, f64::from(value));
                (FunctionCode::WriteSingleRegister, raw)
            }
            other => return Err(Error::NotWritable(other)),
        };

        let parameters =
            WriteCommandParameters::new(transaction_id, unit_id, function, address, raw);
        let function = create_function(parameters.into())?;
        let request = function.pack_request()?;
        tracing::debug!("TX: {:02X?}", request);

        // a successful write single response is an echo of the request
        let readings = function.parse_response(&request)?;
        for reading in &readings {
            tracing::info!("{} = {}", reading.id, reading.value);
        }
        self.storage.apply(&readings);
        Ok(())
    }
}

impl ProcessingManager for LoopbackProcessor {
    fn execute_write_command(
        &self,
        config: &ConfigItem,
        transaction_id: u16,
        unit_id: u8,
        address: u16,
        value: i32,
    ) -> Result<(), AutomationError> {
        self.write(config, transaction_id, unit_id, address, value)
            .map_err(|err| AutomationError::Processing(err.to_string()))
    }
}

fn create_storage(cli: &Cli, points: &MonitoredPoints) -> Result<MemoryStorage, Error> {
    let pumps: [u16; 3] = cli
        .pumps
        .as_slice()
        .try_into()
        .map_err(|_| Error::PumpCount(cli.pumps.len()))?;

    let storage = MemoryStorage::new();
    storage.insert(
        points.fuel_level,
        cli.fuel_level,
        ConfigItem::new(
            PointType::AnalogOutput,
            1.0,
            0.0,
            cli.low_limit,
            cli.high_limit,
        ),
    );
    let digital = ConfigItem::unscaled(PointType::DigitalOutput);
    storage.insert(points.valve, cli.valve, digital);
    for (id, state) in points.pumps.into_iter().zip(pumps) {
        storage.insert(id, state, digital);
    }
    Ok(storage)
}

/// Time needed for `cycles` cycles, the first one runs immediately
fn run_time(delay: u64, cycles: u64) -> Duration {
    let seconds = delay.max(1).saturating_mul(cycles.saturating_sub(1));
    Duration::from_secs(seconds).saturating_add(Duration::from_millis(500))
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    if let Err(ref e) = run(cli).await {
        tracing::error!("{e}");
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<(), Error> {
    let points = MonitoredPoints::default();
    let storage = Arc::new(create_storage(&cli, &points)?);
    let processor = Arc::new(LoopbackProcessor {
        storage: storage.clone(),
    });
    let configuration = Arc::new(StaticConfiguration::new(cli.delay, cli.unit));

    let mut manager = AutomationManager::new(
        storage.clone(),
        processor,
        configuration,
        AutomationTrigger::new(),
    )
    .with_points(points);

    manager.start_with_configured_delay()?;

    match cli.cycles {
        Some(cycles) => tokio::time::sleep(run_time(cli.delay, cycles)).await,
        None => {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("unable to listen for CTRL-C: {err}");
            }
        }
    }

    manager.stop().await;

    for id in points.identifiers() {
        if let Some(value) = storage.raw_value(id) {
            tracing::info!("final {} = {}", id, value);
        }
    }

    Ok(())
}
