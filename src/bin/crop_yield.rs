// Terminal front end for the crop yield estimator
//
// Usage: cargo run --bin crop_yield [-- report.{md,html,json}]
// Artifacts are located through CROP_YIELD_DATA_DIR (see EstimatorConfig).

use anyhow::{bail, Context, Result};
use crop_yield_estimator::report::MarkdownFormatter;
use crop_yield_estimator::{
    logging, EstimatorConfig, FeatureKey, FieldContext, FieldRequest, RawInputs, ReportFormat,
    YieldPredictor,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init();

    let export_path = std::env::args().nth(1).map(PathBuf::from);
    let export_format = match &export_path {
        Some(path) => Some(
            ReportFormat::from_path(path)
                .with_context(|| format!("Unsupported report format: {}", path.display()))?,
        ),
        None => None,
    };

    let config = EstimatorConfig::from_env();
    tracing::info!(?config, "Configuration");

    let predictor = YieldPredictor::new(&config).context("Failed to initialize yield predictor")?;

    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("🌱 Smart Crop Yield Prediction\n");
    println!("Provide your field and environmental conditions to predict expected yield.\n");

    let options = predictor.context_options();
    let crop = choose(&mut input, "🌾 Select Crop Type", &options.crops)?;
    let region = choose(&mut input, "📍 Select Region", &options.regions)?;
    let soil = choose(&mut input, "🧱 Select Soil Type", &options.soils)?;
    let context = FieldContext::new(crop, region, soil);

    let defaults = predictor.defaults(&context).rounded();
    println!("\n🌦️ Optional Field Metrics (leave blank to use smart defaults)\n");

    let mut inputs = RawInputs::new();
    for key in FeatureKey::ALL {
        let label = format!(
            "{} ({}) [default: {:.2}]: ",
            key.description(),
            key,
            defaults[key]
        );
        inputs.set(key, prompt(&mut input, &label)?);
    }

    let report = predictor.predict(&FieldRequest::new(context, inputs));
    println!("\n{}", MarkdownFormatter::format(&report));

    if let (Some(path), Some(format)) = (export_path, export_format) {
        let document = format.render(&report).context("Failed to render report")?;
        std::fs::write(&path, document)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}

/// Print `label` and read one line (without the line ending)
fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Input closed before the form was complete");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Pick one of `options` by 1-based number or exact name, re-asking until valid
fn choose(input: &mut impl BufRead, label: &str, options: &[String]) -> Result<String> {
    println!("{}:", label);
    for (i, option) in options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }

    loop {
        let answer = prompt(input, "> ")?;
        let answer = answer.trim();

        if let Ok(n) = answer.parse::<usize>() {
            if (1..=options.len()).contains(&n) {
                return Ok(options[n - 1].clone());
            }
        } else if let Some(option) = options.iter().find(|o| o.as_str() == answer) {
            return Ok(option.clone());
        }

        println!("Please choose a listed number or name.");
    }
}
