//! Run the full bring-up pipeline against the simulated platform.
//!
//! Shows every lifecycle callout and the published capability report.
//! Pass a MAC address argument to exercise the configured-override path:
//!
//! ```text
//! cargo run --example bringup_sim -- 02:00:00:11:22:33
//! ```

use anyhow::Result;
use eqos_bringup::sim::{ResetBehavior, SimPlatform};
use eqos_bringup::{BringupConfig, EqosAdapter, MacAddr, ResourceDescriptor};
use eqos_mac::regs::REGISTER_WINDOW_SIZE;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let mut config = BringupConfig::default();
    if let Some(arg) = std::env::args().nth(1) {
        let addr: MacAddr = arg.parse()?;
        config = config.with_mac_override(addr);
    }

    let platform = SimPlatform::new();
    platform
        .bank()
        .set_station_address(0, "00:11:22:33:44:55".parse()?);
    platform.bank().set_reset_behavior(ResetBehavior::ClearAfter(4));

    let mut adapter = EqosAdapter::new(Box::new(platform.clone()), config);

    adapter.prepare_hardware(&[
        ResourceDescriptor::MemoryRegion {
            start: 0xFE40_0000,
            length: REGISTER_WINDOW_SIZE as u64,
        },
        ResourceDescriptor::InterruptLine {
            vector: 41,
            affinity: 0x1,
        },
    ])?;

    let caps = adapter.power_on()?;

    println!();
    println!("Capability report");
    println!("  current address:   {}", caps.current_address);
    println!("  permanent address: {}", caps.permanent_address);
    println!("  max link speed:    {}", caps.max_link_speed);
    println!("  max transfer unit: {} bytes", caps.max_transfer_unit);
    println!("  DMA ceiling:       {:#x}", caps.max_physical_address);
    println!();
    println!(
        "reset completed in {} poll(s); hardware address-0 now {}",
        platform.bank().dma_mode_polls(),
        platform.bank().station_address(0)
    );

    adapter.power_off();
    adapter.release_hardware();

    Ok(())
}
