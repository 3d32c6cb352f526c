use lenscaps::{
    CameraRole, CapabilityEngine, CodecOption, EngineConfig, FrameSize, MemoryPreferences,
    PhysicalDeviceId, ProfilePlatform, SettingsSession,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "Usage: lenscaps-cli <profile.json> <command> [args] [--prefs FILE] [--config FILE] [--json]

Commands:
  list-lenses <front|back>
  options <front|back>
  resolve [front|back]
  set <role|lens|resolution|fps|zoom|codec|bitrate> <value>";

struct CliArgs {
    positional: Vec<String>,
    prefs: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, Box<dyn std::error::Error>> {
    let mut parsed = CliArgs {
        positional: Vec::new(),
        prefs: None,
        config: None,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--prefs" => {
                i += 1;
                parsed.prefs = Some(PathBuf::from(args.get(i).ok_or("--prefs needs a file")?));
            }
            "--config" => {
                i += 1;
                parsed.config = Some(PathBuf::from(args.get(i).ok_or("--config needs a file")?));
            }
            "--json" => parsed.json = true,
            other => parsed.positional.push(other.to_string()),
        }
        i += 1;
    }
    Ok(parsed)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    lenscaps::init_logging();

    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args)?;
    if cli.positional.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let platform = Arc::new(ProfilePlatform::from_json_file(&cli.positional[0])?);
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::load_or_default(),
    };
    let prefs = match &cli.prefs {
        Some(path) => MemoryPreferences::load_from_file(path)?,
        None => MemoryPreferences::new(),
    };

    let engine = CapabilityEngine::from_platform(platform, config);
    let mut session = SettingsSession::new(engine, prefs);

    let command = cli.positional[1].as_str();
    let rest = &cli.positional[2..];
    match command {
        "list-lenses" => cmd_list_lenses(&session, rest, cli.json)?,
        "options" => cmd_options(&mut session, rest, cli.json)?,
        "resolve" => cmd_resolve(&mut session, rest, cli.json)?,
        "set" => cmd_set(&mut session, rest, cli.json)?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }

    if let Some(path) = &cli.prefs {
        session.into_store().save_to_file(path)?;
    }
    Ok(())
}

fn role_arg(
    session: &SettingsSession<MemoryPreferences>,
    rest: &[String],
) -> Result<CameraRole, Box<dyn std::error::Error>> {
    match rest.first() {
        Some(role) => Ok(role.parse()?),
        None => Ok(session.current_role()),
    }
}

fn cmd_list_lenses(
    session: &SettingsSession<MemoryPreferences>,
    rest: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = role_arg(session, rest)?;
    let lenses = session.engine().list_lenses(role);
    if json {
        println!("{}", serde_json::to_string(&lenses)?);
    } else {
        for lens in lenses {
            let marker = if lens.is_default { "*" } else { " " };
            match lens.focal_length_mm {
                Some(focal) => println!("{} {}: {} ({:.1}mm)", marker, lens.id, lens.display_label, focal),
                None => println!("{} {}: {}", marker, lens.id, lens.display_label),
            }
        }
    }
    Ok(())
}

fn cmd_options(
    session: &mut SettingsSession<MemoryPreferences>,
    rest: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = role_arg(session, rest)?;
    let options = session.options(role);
    if json {
        println!("{}", serde_json::to_string(&options)?);
        return Ok(());
    }

    println!("Camera: {}", role);
    let lenses: Vec<&str> = options.lenses.iter().map(|l| l.display_label.as_str()).collect();
    println!(
        "Lenses: {}{}",
        lenses.join(", "),
        if options.lens_picker_enabled { "" } else { " (fixed)" }
    );
    let resolutions: Vec<&str> = options.resolutions.iter().map(|r| r.label.as_str()).collect();
    println!("Resolutions: {}", resolutions.join(", "));
    let rates: Vec<String> = options.frame_rates.iter().map(|r| r.to_string()).collect();
    println!("Frame rates: {}", rates.join(", "));
    let zooms: Vec<String> = options.zoom_steps.iter().map(|z| format!("{:.1}x", z)).collect();
    println!("Zoom: {}", zooms.join(", "));
    let codecs: Vec<&str> = options.codecs.iter().map(|c| c.display_name()).collect();
    println!("Codecs: {}", codecs.join(", "));
    Ok(())
}

fn cmd_resolve(
    session: &mut SettingsSession<MemoryPreferences>,
    rest: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = role_arg(session, rest)?;
    let outcome = session.resolve(role);
    if json {
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(());
    }

    for correction in &outcome.corrections {
        println!("corrected {}: {} -> {}", correction.key, correction.previous, correction.value);
    }
    print_configuration(&outcome.configuration);
    Ok(())
}

fn cmd_set(
    session: &mut SettingsSession<MemoryPreferences>,
    rest: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if rest.len() < 2 {
        eprintln!("Usage: lenscaps-cli <profile.json> set <field> <value>");
        std::process::exit(1);
    }
    let field = rest[0].as_str();
    let value = rest[1].as_str();

    let configuration = match field {
        "role" => session.set_role(value.parse::<CameraRole>()?)?,
        "lens" => session.select_lens(&PhysicalDeviceId::from(value))?,
        "resolution" => session.set_resolution(value.parse::<FrameSize>()?)?,
        "fps" | "frame-rate" => session.set_frame_rate(value.parse::<u32>()?)?,
        "zoom" => session.set_zoom(value.trim_end_matches('x').parse::<f32>()?)?,
        "codec" => session.set_codec(value.parse::<CodecOption>()?)?,
        "bitrate" if value.eq_ignore_ascii_case("auto") => session.set_bitrate_auto()?,
        "bitrate" => session.set_bitrate_custom(value.parse::<u32>()?)?,
        _ => {
            eprintln!("Unknown field: {}", field);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string(&configuration)?);
    } else {
        print_configuration(&configuration);
    }
    Ok(())
}

fn print_configuration(config: &lenscaps::EffectiveConfiguration) {
    println!("Camera:     {}", config.role);
    println!("Lens:       {}", config.lens_id);
    println!("Resolution: {}", lenscaps::capabilities::resolution_label(config.resolution));
    println!("Frame rate: {} fps", config.frame_rate);
    println!("Zoom:       {:.1}x", config.zoom);
    println!("Codec:      {}", config.codec.display_name());
    println!("Bitrate:    {}", config.bitrate_label());
}
