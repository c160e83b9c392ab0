//! # glyphcut CLI
//!
//! Usage:
//!   glyphcut font.ttf --text "Hello" -o subset.ttf
//!   glyphcut font.ttf --text-file labels.txt --woff -o subset.woff
//!   glyphcut font.ttf --text "a → b" --data-uri --config opts.json
//!
//! Without --text or --text-file the whole font is kept.

use std::env;
use std::fs;
use std::process;

use glyphcut::FontOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glyphcut=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    if let Err(msg) = run(&args) {
        eprintln!("✗ {}", msg);
        process::exit(1);
    }
}

const FLAGS: [&str; 6] = ["--text", "--text-file", "-o", "--woff", "--data-uri", "--config"];

/// The argument after `flag`. A flag given without a value (last argument,
/// or followed by another flag) is an error.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, String> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    match args.get(pos + 1) {
        Some(value) if !FLAGS.contains(&value.as_str()) => Ok(Some(value.as_str())),
        _ => Err(format!("{} needs a value", flag)),
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let font_path = args
        .get(1)
        .filter(|a| !a.starts_with('-'))
        .ok_or("usage: glyphcut <font.ttf> [--text STR | --text-file PATH] [-o OUT] [--woff] [--data-uri] [--config OPTS.json]")?;
    let text = flag_value(args, "--text")?;
    let text_file = flag_value(args, "--text-file")?;
    let config = flag_value(args, "--config")?;
    let output_flag = flag_value(args, "-o")?;

    let font = fs::read(font_path).map_err(|e| format!("Failed to read {}: {}", font_path, e))?;

    let options = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path, e))?;
            FontOptions::from_json(&json).map_err(|e| e.to_string())?
        }
        None => FontOptions::default(),
    };

    let corpus = match (text, text_file) {
        (Some(text), _) => Some(text.to_string()),
        (None, Some(path)) => Some(
            fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?,
        ),
        (None, None) => None,
    };

    if args.iter().any(|a| a == "--data-uri") {
        let options = FontOptions {
            subset: options.subset && corpus.is_some(),
            ..options
        };
        let uri = glyphcut::embed_font(&font, corpus.as_deref().unwrap_or(""), &options)
            .map_err(|e| e.to_string())?;
        println!("{}", uri);
        return Ok(());
    }

    let sfnt = match &corpus {
        Some(text) if options.subset => glyphcut::subset(&font, text).map_err(|e| e.to_string())?,
        _ => font.clone(),
    };
    report(&sfnt);

    let woff = args.iter().any(|a| a == "--woff");
    let output = if woff {
        glyphcut::to_woff_with_level(&sfnt, options.compression_level).map_err(|e| e.to_string())?
    } else {
        sfnt
    };

    let default_path = if woff { "subset.woff" } else { "subset.ttf" };
    let output_path = output_flag.unwrap_or(default_path);
    fs::write(output_path, &output)
        .map_err(|e| format!("Failed to write {}: {}", output_path, e))?;
    eprintln!(
        "✓ Written {} bytes to {} (input {} bytes)",
        output.len(),
        output_path,
        font.len()
    );
    Ok(())
}

/// Cross-check the output with an independent parser.
fn report(sfnt: &[u8]) {
    match ttf_parser::Face::parse(sfnt, 0) {
        Ok(face) => tracing::info!(
            glyphs = face.number_of_glyphs(),
            units_per_em = face.units_per_em(),
            "output font parses"
        ),
        Err(e) => tracing::warn!(error = ?e, "output font does not parse with ttf-parser"),
    }
}
