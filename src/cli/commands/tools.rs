//! OCR tool availability check.

use console::style;

use crate::config::Settings;
use crate::ocr::{find_binary, OcrBackend, TesseractBackend};

pub async fn cmd_check_tools(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("Binaries:").cyan());
    match find_binary("tesseract") {
        Some(path) => println!(
            "  {:<15} {} {}",
            "tesseract",
            style("✓ found").green(),
            style(path.display()).dim()
        ),
        None => println!("  {:<15} {}", "tesseract", style("✗ not found").red()),
    }

    println!("\n{}", style("OCR Backends:").cyan());

    let tesseract = TesseractBackend::with_config(settings.ocr_config());
    let tesseract_status = if tesseract.is_available() {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<15} {}", "Tesseract", tesseract_status);
    println!(
        "                  {}",
        style(format!("language: {}", tesseract.language())).dim()
    );
    if !tesseract.is_available() {
        println!("                  {}", style(tesseract.availability_hint()).dim());
    }

    // Models auto-download on first use
    #[cfg(feature = "ocr-ocrs")]
    {
        use crate::ocr::OcrsBackend;
        let ocrs = OcrsBackend::with_config(settings.ocr_config());
        let ocrs_status = if ocrs.is_available() {
            style("✓ available").green()
        } else {
            style("○ models will auto-download").yellow()
        };
        println!("  {:<15} {}", "OCRS", ocrs_status);
        println!("                  {}", style(ocrs.availability_hint()).dim());
    }
    #[cfg(not(feature = "ocr-ocrs"))]
    {
        println!(
            "  {:<15} {}",
            "OCRS",
            style("not compiled (enable ocr-ocrs feature)").dim()
        );
    }

    println!(
        "\nConfigured backend: {}{}",
        style(settings.ocr_backend).bold(),
        if settings.ocr_enabled { "" } else { " (disabled)" }
    );
    println!();
    Ok(())
}
