//! Decode `MAC_Version` and `MAC_HW_Feature` register dumps.
//!
//! Useful when bringing up a new board: paste the five words out of a
//! register dump and see what the silicon claims to be.
//!
//! ```text
//! cargo run --example decode_features -- 0x3051 0x181173F3 0x111E01E8 0x11041041 0xC370031
//! ```
//!
//! With no arguments the databook reset values are decoded.

use anyhow::{Context, Result};
use eqos_mac::{FeatureWords, SiliconVersion};

fn parse_word(arg: &str) -> Result<u32> {
    let trimmed = arg.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(trimmed, 16).with_context(|| format!("invalid register word {arg:?}"))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (version_word, feature_words) = if args.is_empty() {
        (0x3051, [0x1811_73F3, 0x111E_01E8, 0x1104_1041, 0x0C37_0031])
    } else if args.len() == 5 {
        let mut words = [0u32; 4];
        for (word, arg) in words.iter_mut().zip(&args[1..]) {
            *word = parse_word(arg)?;
        }
        (parse_word(&args[0])?, words)
    } else {
        anyhow::bail!("expected no arguments or five register words");
    };

    let version = SiliconVersion::from_register(version_word);
    let features = FeatureWords(feature_words);

    println!("MAC_Version     {version_word:#010x}  ({version})");
    for (index, word) in feature_words.iter().enumerate() {
        println!("MAC_HW_Feature{index} {word:#010x}");
    }
    println!();
    println!("link speed:     {}", features.link_speed_class());
    println!("address width:  {:?}", features.address_width_class());
    println!("MMC statistics: {}", features.has_mmc());
    println!("timestamping:   {}", features.has_timestamping());
    println!("TSO:            {}", features.has_tso());

    Ok(())
}
