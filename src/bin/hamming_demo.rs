use anyhow::{ensure, Result};
use clap::Parser;
use hamming_secded::cs::ecc::{BitBuffer, BlockStatus, HammingCode, HammingConfig, ParityBitPolicy};
use tracing_subscriber::filter::LevelFilter;

/// Encode a bit stream with the extended Hamming (8,4) code, inject bit flips
/// and decode it again.
#[derive(Parser)]
struct Cli {
    /// Data bits, length a multiple of 4
    #[arg(long, default_value = "1101111101001001")]
    data: String,
    /// Codeword bit indices to flip before decoding
    #[arg(long, num_args = 0.., default_values_t = [1usize, 9, 20])]
    flip: Vec<usize>,
    /// Flip a lone wrong overall parity bit back instead of only reporting it
    #[arg(long)]
    correct_parity_bit: bool,
    /// Log per-block decoder decisions (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn spaced(bits: &BitBuffer) -> String {
    bits.iter()
        .map(|b| if b { "1" } else { "0" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let policy = if cli.correct_parity_bit {
        ParityBitPolicy::Correct
    } else {
        ParityBitPolicy::Report
    };
    let code = HammingCode::new(HammingConfig::default().with_parity_bit_policy(policy));

    let data = BitBuffer::from_bit_str(&cli.data)?;
    println!("Original data:\n{}", spaced(&data));

    let mut encoded = code.encode(&data)?;
    println!("Encoded data:\n{}", spaced(&encoded));

    for &index in &cli.flip {
        ensure!(
            index < encoded.len(),
            "cannot flip bit {}, encoded stream has {} bits",
            index,
            encoded.len()
        );
        encoded.flip(index)?;
    }
    println!("Introducing errors at {:?}:\n{}", cli.flip, spaced(&encoded));

    let decoded = code.decode(&mut encoded)?;
    println!("Corrected codewords:\n{}", spaced(&encoded));

    for report in decoded.report.blocks() {
        match report.status {
            BlockStatus::Clean => {}
            BlockStatus::Corrected { position } => {
                println!("Error on position {}, corrected.", report.base() + position)
            }
            BlockStatus::ParityBitError { corrected } => println!(
                "Block {}: the parity bit is incorrect{}",
                report.block,
                if corrected { ", corrected." } else { "." }
            ),
            BlockStatus::DoubleError { syndrome } => println!(
                "Block {}: double error detected (syndrome {}), not corrected.",
                report.block, syndrome
            ),
        }
    }

    println!("Original data:\n{}", spaced(&data));
    println!("Received and corrected data:\n{}", spaced(&decoded.data));

    Ok(())
}
