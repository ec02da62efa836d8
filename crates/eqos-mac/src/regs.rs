//! Register map for the DWC EQOS MAC.
//!
//! Every offset is relative to the start of the device's register window.
//! The window is exactly [`REGISTER_WINDOW_SIZE`] bytes; a platform memory
//! resource smaller than this cannot hold the device.
//!
//! Reset values quoted in comments are the databook defaults and are what an
//! unprogrammed part reads back after software reset.

// ── MAC block ────────────────────────────────────────────────────────────────

/// MAC_Configuration — operating mode of the MAC.
pub const MAC_CONFIGURATION: usize = 0x0000;
/// MAC_Ext_Configuration.
pub const MAC_EXT_CONFIGURATION: usize = 0x0004;
/// MAC_Packet_Filter — receive filter controls.
pub const MAC_PACKET_FILTER: usize = 0x0008;
/// MAC_Watchdog_Timeout.
pub const MAC_WATCHDOG_TIMEOUT: usize = 0x000C;

/// MAC_Q0_Tx_Flow_Ctrl — pause-frame generation control.
pub const MAC_TX_FLOW_CTRL: usize = 0x0070;
/// MAC_Rx_Flow_Ctrl — pause-frame reception control.
pub const MAC_RX_FLOW_CTRL: usize = 0x0090;

/// MAC_RxQ_Ctrl0 — receive queue management.
pub const MAC_RXQ_CTRL0: usize = 0x00A0;
/// MAC_RxQ_Ctrl1 — multicast/broadcast/untagged queue routing.
pub const MAC_RXQ_CTRL1: usize = 0x00A4;

/// MAC_Interrupt_Status.
pub const MAC_INTERRUPT_STATUS: usize = 0x00B0;
/// MAC_Interrupt_Enable.
pub const MAC_INTERRUPT_ENABLE: usize = 0x00B4;

/// MAC_PMT_Control_Status — power-management (magic/remote-wake) control.
pub const MAC_PMT_CONTROL_STATUS: usize = 0x00C0;
/// MAC_LPI_Control_Status.
pub const MAC_LPI_CONTROL_STATUS: usize = 0x00D0;

/// MAC_1US_Tic_Counter — reference-clock divisor for the on-chip 1 µs tick.
/// Reset value 0x3F (a 64 MHz CSR clock).
pub const MAC_ONE_US_TIC_COUNTER: usize = 0x00DC;

/// MAC_PHYIF_Control_Status.
pub const MAC_PHYIF_CONTROL_STATUS: usize = 0x00F8;

// ── Identification and capabilities ──────────────────────────────────────────

/// MAC_Version — silicon identification. Reset value 0x3051: core revision
/// 0x51 in the low byte, vendor user revision 0x30 in the next byte.
pub const MAC_VERSION: usize = 0x0110;
/// MAC_Debug.
pub const MAC_DEBUG: usize = 0x0114;

/// MAC_HW_Feature0 — first optional-feature presence word. Reset 0x181173F3.
pub const MAC_HW_FEATURE0: usize = 0x011C;
/// MAC_HW_Feature1 — second optional-feature presence word. Reset 0x111E01E8.
pub const MAC_HW_FEATURE1: usize = 0x0120;
/// MAC_HW_Feature2 — third optional-feature presence word. Reset 0x11041041.
pub const MAC_HW_FEATURE2: usize = 0x0124;
/// MAC_HW_Feature3 — fourth optional-feature presence word. Reset 0xC370031.
pub const MAC_HW_FEATURE3: usize = 0x0128;

/// Number of `MAC_HW_Feature` words.
pub const MAC_HW_FEATURE_COUNT: usize = 4;

/// Byte offset of `MAC_HW_Feature{index}`.
#[must_use]
pub const fn mac_hw_feature(index: usize) -> usize {
    MAC_HW_FEATURE0 + index * 4
}

// ── MDIO ─────────────────────────────────────────────────────────────────────

/// MAC_MDIO_Address — PHY management cycle control.
pub const MAC_MDIO_ADDRESS: usize = 0x0200;
/// MAC_MDIO_Data.
pub const MAC_MDIO_DATA: usize = 0x0204;

// ── Station addresses ────────────────────────────────────────────────────────

/// Base of the `MAC_AddressX_High`/`MAC_AddressX_Low` pairs.
pub const MAC_ADDRESS_BASE: usize = 0x0300;
/// Byte stride between address pairs.
pub const MAC_ADDRESS_STRIDE: usize = 8;
/// Number of station address slots.
pub const MAC_ADDRESS_COUNT: usize = 4;

/// Byte offset of `MAC_AddressX_High` (upper 16 bits of the 6-byte address).
/// Reset value 0xFFFF.
#[must_use]
pub const fn mac_address_high(index: usize) -> usize {
    MAC_ADDRESS_BASE + index * MAC_ADDRESS_STRIDE
}

/// Byte offset of `MAC_AddressX_Low` (lower 32 bits of the 6-byte address).
/// Reset value 0xFFFF_FFFF.
#[must_use]
pub const fn mac_address_low(index: usize) -> usize {
    MAC_ADDRESS_BASE + index * MAC_ADDRESS_STRIDE + 4
}

// ── MMC (statistics) ─────────────────────────────────────────────────────────

/// MMC_Control — statistics counter operating mode.
pub const MMC_CONTROL: usize = 0x0700;
/// MMC_Rx_Interrupt_Mask.
pub const MMC_RX_INTERRUPT_MASK: usize = 0x070C;
/// MMC_Tx_Interrupt_Mask.
pub const MMC_TX_INTERRUPT_MASK: usize = 0x0710;
/// MMC_IPC_Rx_Interrupt_Mask.
pub const MMC_IPC_RX_INTERRUPT_MASK: usize = 0x0800;

// ── MTL (queue fabric) ───────────────────────────────────────────────────────

/// MTL_Operation_Mode.
pub const MTL_OPERATION_MODE: usize = 0x0C00;
/// MTL_Interrupt_Status.
pub const MTL_INTERRUPT_STATUS: usize = 0x0C20;
/// MTL_RxQ_DMA_Map0 — receive queue to DMA channel mapping.
pub const MTL_RXQ_DMA_MAP0: usize = 0x0C30;

/// Base of the per-queue MTL register blocks.
pub const MTL_QUEUE_BASE: usize = 0x0D00;
/// Byte stride between MTL queue blocks.
pub const MTL_QUEUE_STRIDE: usize = 0x40;
/// Number of MTL queues in this configuration.
pub const MTL_QUEUE_COUNT: usize = 2;

// ── DMA engine ───────────────────────────────────────────────────────────────

/// DMA_Mode — bus operating mode; hosts the software-reset request bit.
pub const DMA_MODE: usize = 0x1000;
/// DMA_SysBus_Mode — AHB/AXI master behaviour. Reset value 0x10000.
pub const DMA_SYSBUS_MODE: usize = 0x1004;
/// DMA_Interrupt_Status.
pub const DMA_INTERRUPT_STATUS: usize = 0x1008;
/// DMA_Debug_Status0.
pub const DMA_DEBUG_STATUS0: usize = 0x100C;

/// Base of the per-channel DMA register blocks.
pub const DMA_CHANNEL_BASE: usize = 0x1100;
/// Byte stride between DMA channel blocks.
pub const DMA_CHANNEL_STRIDE: usize = 0x80;
/// Number of DMA channels in this configuration.
pub const DMA_CHANNEL_COUNT: usize = 2;

/// Byte offset of a register within DMA channel `index`.
#[must_use]
pub const fn dma_channel(index: usize, reg: usize) -> usize {
    DMA_CHANNEL_BASE + index * DMA_CHANNEL_STRIDE + reg
}

/// Register offsets within one DMA channel block.
pub mod channel {
    /// DMA_CHx_Control — descriptor skip length and PBL mode.
    pub const CONTROL: usize = 0x00;
    /// DMA_CHx_Tx_Control.
    pub const TX_CONTROL: usize = 0x04;
    /// DMA_CHx_Rx_Control.
    pub const RX_CONTROL: usize = 0x08;
    /// DMA_CHx_TxDesc_List_Address.
    pub const TXDESC_LIST_ADDRESS: usize = 0x14;
    /// DMA_CHx_RxDesc_List_Address.
    pub const RXDESC_LIST_ADDRESS: usize = 0x1C;
    /// DMA_CHx_TxDesc_Tail_Pointer.
    pub const TXDESC_TAIL_POINTER: usize = 0x20;
    /// DMA_CHx_RxDesc_Tail_Pointer.
    pub const RXDESC_TAIL_POINTER: usize = 0x28;
    /// DMA_CHx_TxDesc_Ring_Length.
    pub const TXDESC_RING_LENGTH: usize = 0x2C;
    /// DMA_CHx_RxDesc_Ring_Length.
    pub const RXDESC_RING_LENGTH: usize = 0x30;
    /// DMA_CHx_Interrupt_Enable.
    pub const INTERRUPT_ENABLE: usize = 0x34;
    /// DMA_CHx_Rx_Interrupt_WD_Timer.
    pub const RX_INTERRUPT_WD_TIMER: usize = 0x38;
    /// DMA_CHx_Status.
    pub const STATUS: usize = 0x60;
}

/// Total size of the register window in bytes.
pub const REGISTER_WINDOW_SIZE: usize = 0x1200;

// ── DMA_Mode bit definitions ─────────────────────────────────────────────────

/// `DMA_Mode` bit definitions.
pub mod dma_mode {
    /// Software reset request. Self-clears when the reset completes.
    pub const SWR: u32 = 1 << 0;
}

// ── DMA_SysBus_Mode bit definitions ──────────────────────────────────────────

/// `DMA_SysBus_Mode` bit and field definitions.
pub mod sysbus {
    /// Fixed burst length.
    pub const FB: u32 = 1 << 0;
    /// AXI burst length 4 permitted.
    pub const BLEN4: u32 = 1 << 1;
    /// AXI burst length 8 permitted.
    pub const BLEN8: u32 = 1 << 2;
    /// AXI burst length 16 permitted.
    pub const BLEN16: u32 = 1 << 3;
    /// Enhanced address mode (addresses wider than 32 bits).
    pub const EAME: u32 = 1 << 11;
    /// Address-aligned beats.
    pub const AAL: u32 = 1 << 12;

    /// Shift of the read outstanding-request limit field.
    pub const RD_OSR_LMT_SHIFT: u32 = 16;
    /// Shift of the write outstanding-request limit field.
    pub const WR_OSR_LMT_SHIFT: u32 = 24;
    /// Width mask of either outstanding-request limit field.
    pub const OSR_LMT_MASK: u32 = 0xF;

    /// Encode a maximum number of outstanding read requests.
    /// The field holds `requests - 1`.
    #[must_use]
    pub const fn read_outstanding_limit(requests: u32) -> u32 {
        ((requests - 1) & OSR_LMT_MASK) << RD_OSR_LMT_SHIFT
    }

    /// Encode a maximum number of outstanding write requests.
    /// The field holds `requests - 1`.
    #[must_use]
    pub const fn write_outstanding_limit(requests: u32) -> u32 {
        ((requests - 1) & OSR_LMT_MASK) << WR_OSR_LMT_SHIFT
    }
}

// ── DMA_CHx_Control field definitions ────────────────────────────────────────

/// `DMA_CHx_Control` field definitions.
pub mod channel_control {
    /// Shift of the descriptor skip length field (bus beats between
    /// consecutive descriptors).
    pub const DSL_SHIFT: u32 = 18;
    /// Width mask of the descriptor skip length field.
    pub const DSL_MASK: u32 = 0x7;

    /// Encode a descriptor skip length in bus beats.
    #[must_use]
    pub const fn descriptor_skip(beats: u32) -> u32 {
        (beats & DSL_MASK) << DSL_SHIFT
    }
}

// ── MMC_Control bit definitions ──────────────────────────────────────────────

/// `MMC_Control` bit definitions.
pub mod mmc_control {
    /// Reset all statistics counters.
    pub const COUNTER_RESET: u32 = 1 << 0;
    /// Stop counters at maximum instead of rolling over.
    pub const COUNTER_STOP_ROLLOVER: u32 = 1 << 1;
    /// Clear counters on read.
    pub const RESET_ON_READ: u32 = 1 << 2;
    /// Freeze all statistics counters.
    pub const COUNTER_FREEZE: u32 = 1 << 3;
}

// ── MAC_Version field definitions ────────────────────────────────────────────

/// `MAC_Version` field positions.
pub mod version {
    /// Shift of the Synopsys core revision field.
    pub const SNPSVER_SHIFT: u32 = 0;
    /// Shift of the vendor user revision field.
    pub const USERVER_SHIFT: u32 = 8;
    /// Width mask of either revision field.
    pub const VER_MASK: u32 = 0xFF;
}

// ── MAC_HW_Feature0 bit definitions ──────────────────────────────────────────

/// `MAC_HW_Feature0` bit definitions.
pub mod feature0 {
    /// 10/100 Mbps (MII) support.
    pub const MII: u32 = 1 << 0;
    /// 1000 Mbps (GMII) support.
    pub const GMII: u32 = 1 << 1;
    /// Half-duplex support.
    pub const HALF_DUPLEX: u32 = 1 << 2;
    /// Remote-wake packet detection.
    pub const REMOTE_WAKE: u32 = 1 << 6;
    /// Magic-packet detection.
    pub const MAGIC_PACKET: u32 = 1 << 7;
    /// MMC statistics block present.
    pub const MMC: u32 = 1 << 8;
    /// ARP offload present.
    pub const ARP_OFFLOAD: u32 = 1 << 9;
    /// IEEE 1588 timestamping present.
    pub const TIMESTAMP: u32 = 1 << 12;
    /// Energy-efficient Ethernet present.
    pub const EEE: u32 = 1 << 13;
    /// Transmit checksum offload present.
    pub const TX_CSUM: u32 = 1 << 14;
    /// Receive checksum offload present.
    pub const RX_CSUM: u32 = 1 << 16;
}

// ── MAC_HW_Feature1 field definitions ────────────────────────────────────────

/// `MAC_HW_Feature1` bit and field definitions.
pub mod feature1 {
    /// Shift of the DMA address-width class field.
    pub const ADDR64_SHIFT: u32 = 14;
    /// Width mask of the address-width class field.
    pub const ADDR64_MASK: u32 = 0x3;

    /// Address-width class value: 32-bit addressing.
    pub const ADDR64_32BIT: u32 = 0;
    /// Address-width class value: 40-bit addressing.
    pub const ADDR64_40BIT: u32 = 1;
    /// Address-width class value: 48-bit addressing.
    pub const ADDR64_48BIT: u32 = 2;

    /// TCP segmentation offload present.
    pub const TSO: u32 = 1 << 18;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_last_channel_block() {
        let last = dma_channel(DMA_CHANNEL_COUNT - 1, channel::STATUS);
        assert!(last + 4 <= REGISTER_WINDOW_SIZE);
    }

    #[test]
    fn address_pair_offsets() {
        assert_eq!(mac_address_high(0), 0x0300);
        assert_eq!(mac_address_low(0), 0x0304);
        assert_eq!(mac_address_high(3), 0x0318);
        assert_eq!(mac_address_low(3), 0x031C);
    }

    #[test]
    fn feature_word_offsets_are_contiguous() {
        assert_eq!(mac_hw_feature(0), MAC_HW_FEATURE0);
        assert_eq!(mac_hw_feature(1), MAC_HW_FEATURE1);
        assert_eq!(mac_hw_feature(2), MAC_HW_FEATURE2);
        assert_eq!(mac_hw_feature(3), MAC_HW_FEATURE3);
    }

    #[test]
    fn outstanding_limit_encoding() {
        assert_eq!(sysbus::read_outstanding_limit(4), 0x3 << 16);
        assert_eq!(sysbus::write_outstanding_limit(4), 0x3 << 24);
    }

    #[test]
    fn descriptor_skip_encoding() {
        assert_eq!(channel_control::descriptor_skip(6), 6 << 18);
        // Field is three bits wide
        assert_eq!(channel_control::descriptor_skip(8), 0);
    }
}
