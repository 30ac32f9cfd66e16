//! CLI utility that trains or queries the classifier with a digit image file.

use std::path::PathBuf;

use digitpad::classifier::{ClassifierClient, ClassifierRequest};
use digitpad::config;
use digitpad::session::SketchSession;

const USAGE: &str = "Usage: digitpad-send <image> [--label D] [--endpoint URL] [--invert] [--preview]

Draws <image> onto the sketch surface, extracts the feature grid and sends it
to the classifier. With --label the drawing trains the classifier; without it
the classifier is asked for a prediction.

  --label D        train with digit D (0-9)
  --endpoint URL   override the configured classifier endpoint
  --invert         treat light strokes on a dark background as ink
  --preview        print the extracted grid before sending";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, PartialEq)]
struct Options {
    image: PathBuf,
    label: Option<String>,
    endpoint: Option<String>,
    invert: bool,
    preview: bool,
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    let mut config = config::load_or_default().map_err(|err| err.to_string())?;
    if let Some(endpoint) = options.endpoint {
        config.classifier.endpoint = endpoint;
    }

    let mut source = image::open(&options.image)
        .map_err(|err| format!("Failed to open {}: {err}", options.image.display()))?
        .to_rgba8();
    if options.invert {
        for pixel in source.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            pixel.0 = [255 - r, 255 - g, 255 - b, a];
        }
    }

    let mut session = SketchSession::new(&config);
    session.surface_mut().paint_image(&source);
    if options.preview {
        let features = session.features().map_err(|err| err.to_string())?;
        println!("{}\n", features.to_ascii());
    }

    let request = match options.label.as_deref() {
        Some(label) => ClassifierRequest::Train(
            session.train_request(label).map_err(|err| err.to_string())?,
        ),
        None => ClassifierRequest::Predict(
            session.predict_request().map_err(|err| err.to_string())?,
        ),
    };
    let client = ClassifierClient::new(&config.classifier).map_err(|err| err.to_string())?;
    let outcome = client.send(&request).map_err(|err| err.to_string())?;
    println!("{}", outcome.message());
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut image = None;
    let mut label = None;
    let mut endpoint = None;
    let mut invert = false;
    let mut preview = false;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(None);
            }
            "--label" => {
                label = Some(iter.next().ok_or("--label requires a digit")?);
            }
            "--endpoint" => {
                endpoint = Some(iter.next().ok_or("--endpoint requires a URL")?);
            }
            "--invert" => invert = true,
            "--preview" => preview = true,
            other if other.starts_with("--") => {
                return Err(format!("Unknown option: {other}\n\n{USAGE}"));
            }
            other => {
                if image.replace(PathBuf::from(other)).is_some() {
                    return Err(format!("Only one image may be given\n\n{USAGE}"));
                }
            }
        }
    }
    let image = image.ok_or_else(|| format!("Missing image path\n\n{USAGE}"))?;
    Ok(Some(Options {
        image,
        label,
        endpoint,
        invert,
        preview,
    }))
}
