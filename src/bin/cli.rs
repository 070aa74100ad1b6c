//! smckv CLI
//!
//! Reads temperatures, fans, power state and raw keys from the System
//! Management Controller, and sets fan minimum speeds.

use clap::{Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use smckv::transport::{self, Transport};
use smckv::{Config, Result, SimulatedSmc, Smc, SmcError, SmcKey, Sp78Mode, TemperatureUnit};
use tracing_subscriber::{fmt, EnvFilter};

/// smckv CLI
#[derive(Parser, Debug)]
#[command(name = "smckv")]
#[command(about = "Query the System Management Controller")]
#[command(version)]
struct Args {
    /// Colorize output where applicable
    #[arg(short, long, global = true)]
    color: bool,

    /// Show keys (FourCC) next to temperature sensor names
    #[arg(short, long, global = true)]
    display_keys: bool,

    /// Show warning levels for temperatures and fan speeds
    #[arg(short, long, global = true)]
    warn: bool,

    /// Temperature unit
    #[arg(short, long, global = true, value_enum, default_value = "celsius")]
    unit: UnitArg,

    /// Decode temperatures from the integer byte only
    #[arg(long, global = true)]
    legacy_sp78: bool,

    /// Use the built-in simulated controller instead of the device
    #[arg(long, global = true)]
    simulate: bool,

    /// Controller service name
    #[arg(long, global = true, default_value = "AppleSMC")]
    service: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show temperature sensors
    Temps {
        /// Show sensors whose hardware mapping is unknown instead
        #[arg(long)]
        unknown: bool,
    },

    /// Show fan speeds (RPM)
    Fans,

    /// Show power related information
    Power,

    /// Show misc information
    Misc,

    /// Show temperatures, fans, power and misc (the default)
    All,

    /// List every key with its data type
    Keys,

    /// Check whether a FourCC is a valid key on this machine
    CheckKey {
        /// The key to check
        key: String,
    },

    /// Read and print a single key
    Read {
        /// The key to read
        key: String,
    },

    /// Set the minimum speed of a fan (requires superuser)
    SetFanMin {
        /// Fan id, starting from 0
        #[arg(short = 'n', long)]
        fan_id: u8,

        /// Minimum speed in RPM; must not exceed the fan's max speed
        #[arg(short = 's', long, allow_negative_numbers = true)]
        speed: i64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum UnitArg {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
            UnitArg::Kelvin => TemperatureUnit::Kelvin,
        }
    }
}

// =============================================================================
// Warning Levels
// =============================================================================

/// How close a reading is to its maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WarningLevel {
    Cool,
    Nominal,
    Danger,
    Crisis,
}

impl WarningLevel {
    fn of(value: f64, max: f64) -> Self {
        let ratio = value / max;
        if ratio <= 0.0 {
            WarningLevel::Cool
        } else if ratio <= 0.45 {
            WarningLevel::Nominal
        } else if ratio <= 0.75 {
            WarningLevel::Danger
        } else {
            WarningLevel::Crisis
        }
    }

    fn name(self) -> &'static str {
        match self {
            WarningLevel::Cool => "Cool",
            WarningLevel::Nominal => "Nominal",
            WarningLevel::Danger => "Danger",
            WarningLevel::Crisis => "Crisis",
        }
    }

    fn paint(self, text: String) -> ColoredString {
        match self {
            WarningLevel::Cool => text.as_str().blue(),
            WarningLevel::Nominal => text.as_str().green(),
            WarningLevel::Danger => text.as_str().yellow(),
            WarningLevel::Crisis => text.as_str().red(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

struct Printer<T: Transport> {
    smc: Smc<T>,
    display_keys: bool,
    warn: bool,
}

impl<T: Transport> Printer<T> {
    /// Reading followed by the warning level when requested
    fn leveled(&self, reading: String, level: WarningLevel) -> ColoredString {
        let text = if self.warn {
            format!("{} ({})", reading, level.name())
        } else {
            reading
        };
        level.paint(text)
    }

    fn temperatures(&self, unknown: bool) -> Result<()> {
        println!("-- Temperature --");

        let mut sensors: Vec<(String, SmcKey)> = if unknown {
            self.smc
                .all_unknown_temperature_sensors()?
                .into_iter()
                .map(|key| (key.name(), key))
                .collect()
        } else {
            self.smc
                .all_known_temperature_sensors()?
                .into_iter()
                .map(|s| (s.name.to_string(), s.key))
                .collect()
        };
        sensors.sort();

        let width = match sensors.iter().map(|(name, _)| name.len()).max() {
            Some(width) => width,
            None => {
                println!("No temperature sensors found");
                return Ok(());
            }
        };

        let config = self.smc.config();
        let unit = config.temperature_unit;

        for (name, key) in &sensors {
            let key_column = if self.display_keys {
                format!("({})", key)
            } else {
                String::new()
            };
            print!("{:<width$}   {}  ", name, key_column, width = width);

            match self.smc.temperature_celsius(*key) {
                Ok(celsius) => {
                    let level = WarningLevel::of(celsius, config.max_temperature_celsius);
                    let reading = format!("{:.2}{}", unit.convert(celsius), unit.symbol());
                    println!("{}", self.leveled(reading, level));
                }
                Err(e) => {
                    tracing::debug!("Reading {} failed: {}", key, e);
                    println!("NA");
                }
            }
        }

        Ok(())
    }

    fn fans(&self) -> Result<()> {
        println!("-- Fan --");

        let fans = self.smc.all_fans()?;
        if fans.is_empty() {
            println!("No fans found");
        }

        for fan in &fans {
            println!("[id {}] {}", fan.id, fan.name);
            println!("\tMin:      {} RPM", fan.min_speed);
            println!("\tMax:      {} RPM", fan.max_speed);

            match self.smc.fan_current_speed(fan.id) {
                Ok(rpm) => {
                    let level = WarningLevel::of(f64::from(rpm), f64::from(fan.max_speed));
                    println!("\tCurrent:  {}", self.leveled(format!("{} RPM", rpm), level));
                }
                Err(_) => println!("\tCurrent:  NA"),
            }
        }

        Ok(())
    }

    fn power(&self) -> Result<()> {
        let info = self.smc.battery_information()?;

        println!("-- Power --");
        println!("AC Present:       {}", flag(info.is_ac_present));
        println!("Battery Powered:  {}", flag(info.is_battery_powered));
        println!("Charging:         {}", flag(info.is_charging));
        println!("Battery Ok:       {}", flag(info.is_battery_ok));
        println!("Battery Count:    {}", info.battery_count);
        Ok(())
    }

    fn misc(&self) -> Result<()> {
        println!("-- Misc --");

        // Machines without an optical drive have no MSDI key
        let full = match self.smc.is_optical_disk_drive_full() {
            Err(SmcError::KeyNotFound(_)) => false,
            other => other?,
        };
        println!("Disc in ODD:      {}", flag(full));
        Ok(())
    }

    /// Every section in turn. A failing section prints its error and the
    /// rest still run.
    fn all(&self) -> Result<()> {
        let sections = [
            self.temperatures(false),
            self.fans(),
            self.power(),
            self.misc(),
        ];

        for outcome in sections {
            if let Err(e) = outcome {
                tracing::debug!("Section failed: {:?}", e);
                println!("{}", e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Result<()> {
        for entry in self.smc.all_keys()? {
            println!("{}  {}", entry.key, entry.data_type);
        }
        Ok(())
    }

    fn check_key(&self, name: &str) -> Result<()> {
        let answer = if self.smc.is_key_name_present(name)? {
            "valid"
        } else {
            "invalid"
        };
        println!("{} is a {} SMC key on this machine", name, answer);
        Ok(())
    }

    fn read(&self, name: &str) -> Result<()> {
        let key: SmcKey = name.parse()?;
        let value = self.smc.read_value(key)?;
        println!(
            "{}  {}  {}",
            key,
            value.data_type,
            value.display_value(self.smc.config().sp78_mode)
        );
        Ok(())
    }

    fn set_fan_min(&self, id: u8, rpm: i64) -> Result<()> {
        let fan = self.smc.fan(id)?;
        let current = self.smc.fan_current_speed(id)?;

        self.smc.set_fan_min_speed(id, rpm)?;

        println!("Min fan speed set successfully");
        println!("[id {}] {}", fan.id, fan.name);
        println!("\tMin (Previous):  {} RPM", fan.min_speed);
        println!("\tMin (Target):    {} RPM", rpm);
        println!("\tCurrent:         {} RPM", current);
        Ok(())
    }

    fn run(&self, command: Option<&Commands>) -> Result<()> {
        match command {
            None | Some(Commands::All) => self.all(),
            Some(Commands::Temps { unknown }) => self.temperatures(*unknown),
            Some(Commands::Fans) => self.fans(),
            Some(Commands::Power) => self.power(),
            Some(Commands::Misc) => self.misc(),
            Some(Commands::Keys) => self.keys(),
            Some(Commands::CheckKey { key }) => self.check_key(key),
            Some(Commands::Read { key }) => self.read(key),
            Some(Commands::SetFanMin { fan_id, speed }) => self.set_fan_min(*fan_id, *speed),
        }
    }
}

fn flag(value: bool) -> ColoredString {
    let text = value.to_string();
    if value {
        text.as_str().green()
    } else {
        text.as_str().red()
    }
}

/// User-facing message for the errors a command line user can act on
fn describe(error: &SmcError, command: Option<&Commands>) -> String {
    match (error, command) {
        (SmcError::KeyNotFound(_), Some(Commands::SetFanMin { fan_id, .. })) => {
            format!("This machine has no fan with id {}", fan_id)
        }
        (SmcError::NotPrivileged, _) => {
            "This operation must be invoked as the superuser".to_string()
        }
        (SmcError::UnsafeValue(_), Some(Commands::SetFanMin { .. })) => {
            format!("Invalid fan speed: {}. Must be > 0 and <= max fan speed", error)
        }
        (SmcError::InvalidKeyName(_), _) => "Must be a FourCC (four-character code)".to_string(),
        _ => error.to_string(),
    }
}

fn run<T: Transport>(transport: T, config: Config, args: &Args) -> Result<()> {
    let printer = Printer {
        smc: Smc::with_config(transport, config),
        display_keys: args.display_keys,
        warn: args.warn,
    };

    let outcome = printer.run(args.command.as_ref());
    let closed = printer.smc.close();
    outcome.and(closed)
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,smckv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    colored::control::set_override(args.color);

    let sp78_mode = if args.legacy_sp78 {
        Sp78Mode::Truncate
    } else {
        Sp78Mode::Full
    };

    // Build config from args
    let config = match Config::builder()
        .service_name(&args.service)
        .sp78_mode(sp78_mode)
        .temperature_unit(args.unit.into())
        .try_build()
    {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::debug!("smckv v{}", smckv::VERSION);

    let outcome = if args.simulate {
        tracing::info!("Using simulated controller");
        run(SimulatedSmc::macbook(), config, &args)
    } else {
        match transport::open(&config.service_name) {
            Ok(transport) => run(transport, config, &args),
            Err(e) => {
                tracing::error!("Failed to open a connection to the SMC: {}", e);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = outcome {
        eprintln!("{}", describe(&e, args.command.as_ref()));
        std::process::exit(1);
    }
}
