use clap::Parser;
use gift_ledger_ocr::config::{Args, Config};
use gift_ledger_ocr::engines::EngineRegistry;
use gift_ledger_ocr::export;
use gift_ledger_ocr::ledger::summary::{format_amount, korean_reading, total_amount};
use gift_ledger_ocr::processor::{ensure_readable, LedgerProcessor, LedgerReport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(args);

    tracing::info!("Starting gift-ledger-ocr v{}", env!("CARGO_PKG_VERSION"));

    // Reject an unusable input before spending time on model loading
    ensure_readable(&config.image_path)?;

    let registry = EngineRegistry::new(&config)?;
    for info in registry.info() {
        tracing::debug!("Engine {} ({:?}): {}", info.name, info.role, info.description);
    }

    let processor = LedgerProcessor::new(registry.primary(), registry.secondary(), config.preprocess);
    let report = processor.process(&config.image_path, config.use_preprocessing)?;

    print_summary(&report);

    export::write_csv(&report.entries, &config.output_path)?;
    println!("✅ CSV 저장 완료: {}", config.output_path.display());

    if let Some(report_path) = &config.report_path {
        export::write_report(&report, report_path)?;
    }

    Ok(())
}

fn print_summary(report: &LedgerReport) {
    if let Some(text) = &report.secondary_text {
        println!("\n=== 보조 OCR 텍스트 ===");
        println!("{}", text);
    }

    println!("\n=== OCR 결과 ===");
    for entry in &report.entries {
        println!(
            "이름: {}, 금액: {}, 비고: {}",
            entry.name, entry.amount, entry.notes
        );
    }

    let total = total_amount(&report.entries);
    println!(
        "\n합계: {}원 ({}) / {}건",
        format_amount(total),
        korean_reading(total),
        report.entries.len()
    );

    for warning in &report.warnings {
        println!("⚠ {}", warning);
    }
}
