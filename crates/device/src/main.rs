//! dot11-proxy
//!
//! Diagnostic front end for the 802.11 control device plugin. Dumps the
//! emulated descriptors or drives the proxy through a short probe without a
//! proxy framework attached.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use common::setup_logging;
use device::config::{ProxyConfig, expand_path};
use device::{DescriptorTable, DeviceProxy, create_device_proxy, destroy_device_proxy};
use protocol::{
    Direction, LANGUAGE_ID_EN_US, SetupPacket, VendorRequest, decode_i32, descriptor_type,
    hex_string,
};
use std::time::Duration;
use tracing::info;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Parser, Debug)]
#[command(name = "dot11-proxy")]
#[command(
    author,
    version,
    about = "802.11 control device proxy - emulate a USB wireless control device"
)]
#[command(long_about = "
Diagnostic front end for the 802.11 control device plugin. The plugin turns
vendor control requests into calls on a wireless packet injection library.

EXAMPLES:
    # Show the descriptors the device reports
    dot11-proxy --dump-descriptors

    # Open wlan0 in injection + monitor mode and report its state
    dot11-proxy --interface wlan0 --probe

    # Probe without hardware
    dot11-proxy --interface wlan0 --backend simulated --probe

CONFIGURATION:
    The proxy looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usbproxy-dot11/proxy.toml
    3. /etc/usbproxy-dot11/proxy.toml
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

    /// Wireless interface, overrides dot11.interface
    #[arg(short, long, value_name = "IFACE")]
    interface: Option<String>,

    /// Controller backend (lorcon, simulated)
    #[arg(short, long, value_name = "NAME")]
    backend: Option<String>,

    /// Print the device, configuration and string descriptors and exit
    #[arg(long)]
    dump_descriptors: bool,

    /// Connect, open injection + monitor mode and report interface state
    #[arg(long)]
    probe: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = ProxyConfig::default();
        let path = ProxyConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let mut config = if let Some(ref path) = args.config {
        ProxyConfig::load(Some(expand_path(path))).context("Failed to load configuration")?
    } else {
        ProxyConfig::load_or_default()
    };

    if let Some(interface) = args.interface {
        config.dot11.interface = interface;
    }
    if let Some(backend) = args.backend {
        config.dot11.backend = backend;
    }
    config.validate().context("Invalid configuration")?;

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.proxy.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("dot11-proxy v{}", env!("CARGO_PKG_VERSION"));

    if args.dump_descriptors {
        dump_descriptors(&DescriptorTable::new(&config.descriptor));
        return Ok(());
    }

    if args.probe {
        return probe(&config);
    }

    println!("Nothing to do. Use --dump-descriptors or --probe (see --help).");
    Ok(())
}

fn dump_descriptors(table: &DescriptorTable) {
    println!("Device:        {}", hex_string(&table.device().to_bytes()));
    println!(
        "Configuration: {}",
        hex_string(&table.configuration().to_bytes())
    );
    for index in 0..=table.max_string_index() {
        if let Some(string) = table.string(index) {
            let text = if index == 0 {
                "(languages)".to_string()
            } else {
                format!("\"{}\"", string.to_string_lossy())
            };
            println!(
                "String {}:      {} {}",
                index,
                hex_string(string.as_bytes()),
                text
            );
        }
    }
}

fn probe(config: &ProxyConfig) -> Result<()> {
    let mut proxy = create_device_proxy(config).context("Failed to create device proxy")?;
    proxy
        .connect(CONNECT_TIMEOUT)
        .context("Failed to connect to the wireless interface")?;
    println!("Device:    {}", proxy.description());

    let product = request(
        proxy.as_mut(),
        SetupPacket::get_descriptor(descriptor_type::STRING, 2, LANGUAGE_ID_EN_US, 255),
    )?;
    println!("Product:   {}", hex_string(&product));

    let rc = vendor_int(proxy.as_mut(), VendorRequest::OpenInjectMonitor)?;
    println!("Open:      {}", rc);

    let driver = vendor(proxy.as_mut(), VendorRequest::GetDriverName, 255)?;
    println!("Driver:    {}", String::from_utf8_lossy(&driver));

    let capture = vendor(proxy.as_mut(), VendorRequest::GetCaptureInterface, 255)?;
    println!("Capture:   {}", String::from_utf8_lossy(&capture));

    println!(
        "Channel:   {}",
        vendor_int(proxy.as_mut(), VendorRequest::GetChannel)?
    );
    println!(
        "Datalink:  {}",
        vendor_int(proxy.as_mut(), VendorRequest::GetDatalink)?
    );

    destroy_device_proxy(proxy);
    Ok(())
}

fn request(proxy: &mut dyn DeviceProxy, setup: SetupPacket) -> Result<Vec<u8>> {
    proxy
        .control_request(&setup, &[])
        .map_err(|e| anyhow!("{} failed: {}", setup, e))
}

fn vendor(proxy: &mut dyn DeviceProxy, request_code: VendorRequest, length: u16) -> Result<Vec<u8>> {
    debug_assert_eq!(request_code.direction(), Direction::DeviceToHost);
    request(
        proxy,
        SetupPacket::vendor(request_code.direction(), request_code.code(), length),
    )
}

fn vendor_int(proxy: &mut dyn DeviceProxy, request_code: VendorRequest) -> Result<i32> {
    let reply = vendor(proxy, request_code, protocol::INT_SIZE as u16)?;
    decode_i32(&reply).with_context(|| format!("Short reply to {}", request_code))
}
