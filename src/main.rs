use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use farmchain::add_product::AddProductScreen;
use farmchain::camera::{
    CameraSession, JpegSurface, MediaDevices, PermissionAnswer, PhotoAttachment, Resolution,
    SimulatedMediaDevices,
};
use farmchain::config::Config;
use farmchain::location::{
    Coordinates, LocationError, LocationProbe, LocationService, NoGeolocation, RequestOutcome,
    SimulatedLocationService,
};
use farmchain::product::{Field, CROP_OPTIONS, UNIT_OPTIONS};

/// Parse and validate resolution (WIDTHxHEIGHT format)
fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 1280x720)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in resolution", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in resolution", parts[1]))?;
    if width == 0 || height == 0 {
        return Err("Resolution width and height must be greater than 0".to_string());
    }
    if width > 7680 || height > 4320 {
        return Err("Resolution exceeds maximum supported (7680x4320)".to_string());
    }
    Ok(Resolution { width, height })
}

/// Parse and validate a latitude (-90 to 90)
fn parse_latitude(s: &str) -> Result<f64, String> {
    let lat: f64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Latitude must be between -90 and 90, got {}", lat));
    }
    Ok(lat)
}

/// Parse and validate a longitude (-180 to 180)
fn parse_longitude(s: &str) -> Result<f64, String> {
    let lon: f64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Longitude must be between -180 and 180, got {}", lon));
    }
    Ok(lon)
}

/// farmchain: field capture for produce records
#[derive(Parser)]
#[command(name = "farmchain")]
#[command(version, about = "Field capture for FarmChain produce records")]
#[command(long_about = "Take product photos, acquire the farm's location and register \
    produce against simulated device hosts. Nothing is persisted.")]
#[command(after_help = "EXAMPLES:
    # Take a photo with the rear camera and save it
    farmchain photo --out tomato.jpg

    # Resolve the farm location after a 2 second fix
    farmchain locate --lat 18.5204 --lon 73.8567 --delay-ms 2000

    # Register a product with photo and location
    farmchain register --crop Tomatoes --quantity 50 --unit kg \\
        --harvest-date 2026-10-01 --photo --locate")]
struct Cli {
    /// Path to config file (default: ~/.config/farmchain/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Simulated camera host options
#[derive(clap::Args, Debug, Clone)]
struct CameraHostArgs {
    /// Simulate a device without any camera
    #[arg(long)]
    no_camera: bool,

    /// Simulate refusing the camera permission prompt
    #[arg(long)]
    deny_camera: bool,

    /// Native resolution of the simulated feed
    #[arg(long, value_parser = parse_resolution, default_value = "640x480")]
    resolution: Resolution,
}

/// Simulated location host options
#[derive(clap::Args, Debug, Clone)]
struct LocationHostArgs {
    /// Latitude reported by the simulated host
    #[arg(
        long,
        value_parser = parse_latitude,
        default_value = "18.5204",
        allow_negative_numbers = true
    )]
    lat: f64,

    /// Longitude reported by the simulated host
    #[arg(
        long,
        value_parser = parse_longitude,
        default_value = "73.8567",
        allow_negative_numbers = true
    )]
    lon: f64,

    /// Time the simulated host takes to produce a fix
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Simulate refusing the location permission
    #[arg(long)]
    deny_location: bool,

    /// Simulate a host that cannot determine its position
    #[arg(long, conflicts_with = "deny_location")]
    position_unavailable: bool,

    /// Simulate a host without any location capability
    #[arg(long)]
    no_geolocation: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the camera, take one photo and release the camera
    Photo {
        #[command(flatten)]
        host: CameraHostArgs,

        /// Write the JPEG to this file
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Request the current location once
    Locate {
        #[command(flatten)]
        host: LocationHostArgs,
    },

    /// Fill in and register a product
    Register {
        /// Crop name
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(CROP_OPTIONS))]
        crop: String,

        /// Variety (optional)
        #[arg(long)]
        variety: Option<String>,

        /// Quantity harvested
        #[arg(long)]
        quantity: String,

        /// Quantity unit
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(UNIT_OPTIONS))]
        unit: String,

        /// Harvest date (YYYY-MM-DD)
        #[arg(long)]
        harvest_date: String,

        /// Description (optional)
        #[arg(long)]
        description: Option<String>,

        /// Take a product photo with the camera
        #[arg(long, conflicts_with = "photo_file")]
        photo: bool,

        /// Attach a photo file instead of using the camera
        #[arg(long)]
        photo_file: Option<PathBuf>,

        /// Attach the current location
        #[arg(long)]
        locate: bool,

        #[command(flatten)]
        camera_host: CameraHostArgs,

        #[command(flatten)]
        location_host: LocationHostArgs,
    },
}

impl CameraHostArgs {
    fn devices(&self) -> SimulatedMediaDevices {
        let devices = if self.no_camera {
            SimulatedMediaDevices::no_devices()
        } else {
            SimulatedMediaDevices::front_and_rear()
        };
        let permission = if self.deny_camera {
            PermissionAnswer::Deny
        } else {
            PermissionAnswer::Grant
        };
        devices
            .with_permission(permission)
            .with_resolution(self.resolution)
    }
}

impl LocationHostArgs {
    fn service(&self) -> SimulatedLocationService {
        let service = if self.deny_location {
            SimulatedLocationService::failing(LocationError::denied())
        } else if self.position_unavailable {
            SimulatedLocationService::failing(LocationError::unavailable())
        } else {
            SimulatedLocationService::fixed(Coordinates::new(self.lat, self.lon))
        };
        service.with_delay(std::time::Duration::from_millis(self.delay_ms))
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    // If --config is specified, require the file to exist
    if let Some(path) = path {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
    }
    Config::load(path).map_err(|e| e.to_string())
}

fn camera_session<D: MediaDevices>(devices: D, config: &Config) -> CameraSession<D, JpegSurface> {
    CameraSession::new(devices, JpegSurface::new())
        .with_constraints(config.video_constraints())
        .with_quality(config.camera.jpeg_quality)
}

async fn run_photo(
    config: &Config,
    host: &CameraHostArgs,
    out: Option<&Path>,
) -> Result<(), String> {
    let mut session = camera_session(host.devices(), config);

    session.open().await.map_err(|e| e.to_string())?;
    if let Some(stream) = session.preview() {
        println!("Previewing {} ({})", stream.device_label, stream.resolution);
    }

    let result = session.capture_photo();
    session.close();
    let image = result.map_err(|e| e.to_string())?;

    println!(
        "Captured {}x{} {} ({} bytes)",
        image.width,
        image.height,
        image.mime_type,
        image.len()
    );
    if let Some(out) = out {
        std::fs::write(out, &image.bytes)
            .map_err(|e| format!("Failed to write {}: {}", out.display(), e))?;
        println!("Saved to {}", out.display());
    }
    Ok(())
}

async fn locate_with<L: LocationService>(config: &Config, service: L) -> Result<(), String> {
    let probe = LocationProbe::new(service).with_options(config.position_options());
    match probe.request_location().await {
        RequestOutcome::Located(c) => {
            println!("GPS: {:.6}, {:.6}", c.latitude, c.longitude);
            Ok(())
        }
        RequestOutcome::Failed(e) => Err(e.to_string()),
        RequestOutcome::AlreadyPending => Err("A location request is already pending".to_string()),
    }
}

async fn run_locate(config: &Config, host: &LocationHostArgs) -> Result<(), String> {
    if host.no_geolocation {
        locate_with(config, NoGeolocation).await
    } else {
        locate_with(config, host.service()).await
    }
}

struct RegisterRequest {
    fields: Vec<(Field, String)>,
    photo: bool,
    photo_file: Option<PathBuf>,
    locate: bool,
}

async fn register_with<L: LocationService>(
    config: &Config,
    request: RegisterRequest,
    camera_host: &CameraHostArgs,
    service: L,
) -> Result<(), String> {
    let mut screen = AddProductScreen::new(
        camera_session(camera_host.devices(), config),
        LocationProbe::new(service).with_options(config.position_options()),
    );
    for (field, value) in request.fields {
        screen.set_field(field, value);
    }

    if let Some(path) = request.photo_file {
        let bytes = std::fs::read(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        screen.attach_photo_file(PhotoAttachment::from_file(name, mime_for(&path), bytes));
    } else if request.photo {
        screen.take_photo().await.map_err(|e| e.to_string())?;
    }

    if request.locate {
        screen.use_current_location().await;
        match (screen.location_label(), screen.location_error()) {
            (Some(label), _) => println!("{}", label),
            (None, Some(error)) => eprintln!("Location: {}", error),
            (None, None) => {}
        }
    }

    let product = screen.submit().map_err(|e| e.to_string())?;
    if let Some(photo) = &product.draft.photo {
        println!("Photo: {} ({} bytes)", photo.file_name, photo.size);
    }
    println!("Product registered successfully! ID: {}", product.id);
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Photo { host, out } => run_photo(&config, &host, out.as_deref()).await,
        Commands::Locate { host } => run_locate(&config, &host).await,
        Commands::Register {
            crop,
            variety,
            quantity,
            unit,
            harvest_date,
            description,
            photo,
            photo_file,
            locate,
            camera_host,
            location_host,
        } => {
            let request = RegisterRequest {
                fields: vec![
                    (Field::CropName, crop),
                    (Field::Variety, variety.unwrap_or_default()),
                    (Field::Quantity, quantity),
                    (Field::Unit, unit),
                    (Field::HarvestDate, harvest_date),
                    (Field::Description, description.unwrap_or_default()),
                ],
                photo,
                photo_file,
                locate,
            };
            // Ctrl+C drops the screen, which releases the camera
            tokio::select! {
                result = async {
                    if location_host.no_geolocation {
                        register_with(&config, request, &camera_host, NoGeolocation).await
                    } else {
                        register_with(&config, request, &camera_host, location_host.service()).await
                    }
                } => result,
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("Interrupted");
                    std::process::exit(130);
                }
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("1280x720"), Ok(Resolution::HD));
        assert!(parse_resolution("1280").is_err());
        assert!(parse_resolution("0x720").is_err());
        assert!(parse_resolution("9000x720").is_err());
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_latitude("-33.8688"), Ok(-33.8688));
        assert!(parse_latitude("91").is_err());
        assert_eq!(parse_longitude("151.2093"), Ok(151.2093));
        assert!(parse_longitude("-181").is_err());
        assert!(parse_longitude("east").is_err());
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for(Path::new("crop.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("crop.png")), "image/png");
        assert_eq!(mime_for(Path::new("crop")), "application/octet-stream");
    }

    #[test]
    fn test_cli_parses_register() {
        let cli = Cli::try_parse_from([
            "farmchain",
            "register",
            "--crop",
            "Rice",
            "--quantity",
            "10",
            "--unit",
            "kg",
            "--harvest-date",
            "2026-10-01",
            "--locate",
            "--lat",
            "-12.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Register {
                crop,
                locate,
                location_host,
                ..
            } => {
                assert_eq!(crop, "Rice");
                assert!(locate);
                assert_eq!(location_host.lat, -12.5);
            }
            _ => panic!("expected register"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_crop() {
        let result = Cli::try_parse_from([
            "farmchain",
            "register",
            "--crop",
            "Durian",
            "--quantity",
            "1",
            "--unit",
            "kg",
            "--harvest-date",
            "2026-10-01",
        ]);
        assert!(result.is_err());
    }
}
