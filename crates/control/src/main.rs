//! dot11-control
//!
//! Sends one vendor command to an 802.11 control device and prints the
//! result.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use common::setup_logging;
use control::config::{ControlConfig, expand_path, parse_usb_id};
use control::{ControlTransport, Dot11Control, open_device};
use protocol::MacAddress;
use std::fmt::Display;
use std::str::FromStr;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dot11-control")]
#[command(
    author,
    version,
    about = "802.11 control - drive an emulated 802.11 control device over USB"
)]
#[command(long_about = "
Sends vendor control requests to an 802.11 control device. Each command is a
single synchronous control transfer.

EXAMPLES:
    # Create an injection + monitor VAP and tune it
    dot11-control open-inject-monitor
    dot11-control set-channel 6
    dot11-control get-channel

    # Talk to a device with a different ID
    dot11-control --vid 0x1d50 --pid 0x6002 info

    # Install a 40-bit WEP key
    dot11-control add-wep-key 00:11:22:33:44:55 0102030405

SETTERS:
    An OUT transfer cannot return the device's status code. set-timeout,
    set-datalink, set-channel and set-hwmac read the value back afterwards
    and fail if it did not change. add-wep-key has no read-back, so only
    the transfer itself is checked.

CONFIGURATION:
    The utility looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usbproxy-dot11/control.toml
    3. /etc/usbproxy-dot11/control.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// USB vendor ID (hex)
    #[arg(long, value_name = "VID", value_parser = parse_usb_id)]
    vid: Option<u16>,

    /// USB product ID (hex)
    #[arg(long, value_name = "PID", value_parser = parse_usb_id)]
    pid: Option<u16>,

    /// Timeout for ordinary commands in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an injection VAP
    OpenInject,
    /// Create a monitor mode VAP
    OpenMonitor,
    /// Create a VAP that injects and monitors
    OpenInjectMonitor,
    /// Show the library timeout
    GetTimeout,
    /// Set the library timeout
    SetTimeout {
        /// Timeout in milliseconds
        ms: i32,
    },
    /// Show the capture interface name
    CaptureIface,
    /// Show the driver name
    DriverName,
    /// Close the VAP
    Close,
    /// Show the datalink type
    GetDatalink,
    /// Set the datalink type
    SetDatalink {
        /// DLT value, e.g. 127 for radiotap
        dlt: i32,
    },
    /// Show the current channel
    GetChannel,
    /// Tune to a channel
    SetChannel {
        /// Channel number
        channel: i32,
    },
    /// Show the hardware MAC address
    GetHwmac,
    /// Set the hardware MAC address
    SetHwmac {
        /// Address as aa:bb:cc:dd:ee:ff
        mac: MacAddress,
    },
    /// Install a WEP key
    AddWepKey {
        /// BSSID the key applies to
        bssid: MacAddress,
        /// Key bytes as hex, e.g. 0102030405
        key: HexKey,
    },
    /// Show the device descriptor and strings
    Info,
}

/// Key bytes given on the command line as hex
#[derive(Debug, Clone, PartialEq, Eq)]
struct HexKey(Vec<u8>);

impl FromStr for HexKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.len() % 2 != 0 {
            return Err(anyhow!("Key must be an even number of hex digits"));
        }
        (0..s.len())
            .step_by(2)
            .map(|i| {
                s.get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| anyhow!("Invalid hex in key '{}'", s))
            })
            .collect::<Result<Vec<u8>>>()
            .map(HexKey)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = ControlConfig::default();
        let path = ControlConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let mut config = if let Some(ref path) = args.config {
        ControlConfig::load(Some(expand_path(path))).context("Failed to load configuration")?
    } else {
        ControlConfig::load_or_default()
    };

    if let Some(vid) = args.vid {
        config.control.vendor_id = vid;
    }
    if let Some(pid) = args.pid {
        config.control.product_id = pid;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.control.timeout_ms = timeout_ms;
    }
    config.validate().context("Invalid configuration")?;

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.control.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;

    let Some(command) = args.command else {
        println!("No command given (see --help).");
        return Ok(());
    };

    let settings = &config.control;
    info!(
        "Using device {:04x}:{:04x}",
        settings.vendor_id, settings.product_id
    );
    let handle =
        open_device(settings.vendor_id, settings.product_id).context("Failed to open device")?;
    let mut control = Dot11Control::from_settings(handle, settings);

    run(&mut control, command)
}

fn run<T: ControlTransport>(control: &mut Dot11Control<T>, command: Command) -> Result<()> {
    match command {
        Command::OpenInject => println!("{}", control.open_inject()?),
        Command::OpenMonitor => println!("{}", control.open_monitor()?),
        Command::OpenInjectMonitor => println!("{}", control.open_inject_monitor()?),
        Command::GetTimeout => println!("{}", control.get_timeout()?),
        Command::SetTimeout { ms } => {
            control.set_timeout(ms)?;
            confirm("timeout", ms, control.get_timeout()?)?;
        }
        Command::CaptureIface => println!("{}", control.capture_interface()?),
        Command::DriverName => println!("{}", control.driver_name()?),
        Command::Close => control.close()?,
        Command::GetDatalink => println!("{}", control.get_datalink()?),
        Command::SetDatalink { dlt } => {
            control.set_datalink(dlt)?;
            confirm("datalink", dlt, control.get_datalink()?)?;
        }
        Command::GetChannel => println!("{}", control.get_channel()?),
        Command::SetChannel { channel } => {
            control.set_channel(channel)?;
            confirm("channel", channel, control.get_channel()?)?;
        }
        Command::GetHwmac => println!("{}", control.get_hardware_mac()?),
        Command::SetHwmac { mac } => {
            control.set_hardware_mac(mac)?;
            confirm("hardware MAC", mac, control.get_hardware_mac()?)?;
        }
        Command::AddWepKey { bssid, key } => control.add_wep_key(bssid, &key.0)?,
        Command::Info => {
            let device = control.device_descriptor()?;
            println!(
                "ID {:04x}:{:04x} USB {:x}.{:02x} class {:#04x}",
                device.vendor_id,
                device.product_id,
                device.usb_version >> 8,
                device.usb_version & 0xff,
                device.device_class
            );
            for (label, index) in [
                ("Manufacturer", device.manufacturer_index),
                ("Product", device.product_index),
                ("Serial", device.serial_number_index),
            ] {
                if index != 0 {
                    println!("{}: {}", label, control.string_descriptor(index)?);
                }
            }
        }
    }
    Ok(())
}

/// Fail when a read-back disagrees with the value just written
fn confirm<V: PartialEq + Display>(what: &str, requested: V, reported: V) -> Result<()> {
    if requested != reported {
        bail!(
            "Device rejected {} {}: it still reports {}",
            what,
            requested,
            reported
        );
    }
    Ok(())
}
