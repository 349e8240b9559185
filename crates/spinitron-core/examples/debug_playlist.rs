//! Debug script to inspect a station's playlist page and what the parser extracts
//!
//! Usage: cargo run --example debug_playlist -- <station>

use spinitron_core::parse_playlist;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let station = std::env::args().nth(1).unwrap_or_else(|| "wxyz".to_string());

    let client = reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()?;

    println!("Fetching playlist for station '{}'...\n", station);

    let html = client
        .get("https://spinitron.com/radio/playlist.php")
        .query(&[("ptype", "s"), ("station", station.as_str())])
        .send()
        .await?
        .text()
        .await?;

    std::fs::write("debug_playlist.html", &html)?;
    println!("HTML saved to debug_playlist.html");

    let entries = parse_playlist(&html)?;
    println!("\n=== {} rows parsed ===\n", entries.len());
    for entry in &entries {
        println!(
            "{:>8}  {} - {} [{}]{}",
            entry.song.time,
            entry.artist.name,
            entry.song.name,
            entry.disk.name,
            if entry.is_identifiable() { "" } else { "  (not identifiable)" }
        );
    }

    Ok(())
}
