use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use waymark_core::{
    export_store, history, Config, Coords, Error, FormView, HistoryFile, ListEntry, ListView,
    MapView, MarkerStyle, RawFields, Result, Session, SubmitOutcome, WorkoutStore,
};

#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Map-click workout journal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the map view with every recorded workout
    #[command(allow_negative_numbers = true)]
    Map {
        /// Center latitude (defaults to the configured home position)
        #[arg(long)]
        lat: Option<f64>,

        /// Center longitude (defaults to the configured home position)
        #[arg(long)]
        lng: Option<f64>,
    },

    /// Record a workout at a map coordinate
    #[command(allow_negative_numbers = true)]
    Log {
        /// Workout kind: running or cycling
        #[arg(long)]
        kind: String,

        /// Latitude of the workout location
        #[arg(long)]
        lat: f64,

        /// Longitude of the workout location
        #[arg(long)]
        lng: f64,

        /// Distance in km
        #[arg(long)]
        distance: String,

        /// Duration in minutes
        #[arg(long)]
        duration: String,

        /// Cadence in steps/min (running)
        #[arg(long, default_value = "")]
        cadence: String,

        /// Elevation gain in m (cycling)
        #[arg(long, default_value = "")]
        elevation: String,
    },

    /// List recorded workouts (default)
    List,

    /// Pan the map to a recorded workout
    Show { id: String },

    /// Export the journal to CSV
    Export {
        /// Output file (defaults to workouts.csv in the data directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    waymark_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Map { lat, lng }) => cmd_map(&data_dir, &config, lat, lng),
        Some(Commands::Log {
            kind,
            lat,
            lng,
            distance,
            duration,
            cadence,
            elevation,
        }) => {
            let fields = RawFields {
                kind,
                distance,
                duration,
                cadence,
                elevation,
            };
            cmd_log(&data_dir, &config, Coords { lat, lng }, &fields)
        }
        Some(Commands::Show { id }) => cmd_show(&data_dir, &config, &id),
        Some(Commands::Export { out }) => cmd_export(&data_dir, out),
        Some(Commands::List) | None => cmd_list(&data_dir, &config),
    }
}

fn cmd_map(data_dir: &Path, config: &Config, lat: Option<f64>, lng: Option<f64>) -> Result<()> {
    let mut session = open_session(data_dir, config, true);

    let fix = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Coords { lat, lng }),
        _ => config.map.home_fix(),
    };

    match fix {
        Some(center) => session.on_geolocation_ready(center),
        None => {
            session.on_geolocation_failed();
            eprintln!(
                "Could not get your position (pass --lat/--lng or set [map] home_lat/home_lng)"
            );
        }
    }

    Ok(())
}

fn cmd_log(data_dir: &Path, config: &Config, coords: Coords, fields: &RawFields) -> Result<()> {
    let mut session = open_session(data_dir, config, true);

    session.on_map_clicked(coords);

    match session.on_form_submitted(fields) {
        SubmitOutcome::Recorded(id) => {
            if let Some(e) = session.take_persist_error() {
                eprintln!("Workout recorded for this session, but history was not saved: {}", e);
            }
            println!("✓ Recorded workout {}", id);
            Ok(())
        }
        SubmitOutcome::Rejected => {
            eprintln!("Inputs have to be positive numbers!");
            Err(Error::Validation("workout fields rejected".into()))
        }
        SubmitOutcome::Ignored => Err(Error::Validation("no pending map click".into())),
    }
}

fn cmd_list(data_dir: &Path, config: &Config) -> Result<()> {
    // Hydration replays every persisted workout through the list view,
    // which prints them.
    let session = open_session(data_dir, config, false);

    if session.store().is_empty() {
        println!("No workouts recorded yet.");
    }

    Ok(())
}

fn cmd_show(data_dir: &Path, config: &Config, id: &str) -> Result<()> {
    let mut session = open_session(data_dir, config, true);
    // A stale id is a silent no-op.
    session.on_list_item_activated(id);
    Ok(())
}

fn cmd_export(data_dir: &Path, out: Option<PathBuf>) -> Result<()> {
    let slot = HistoryFile::new(data_dir);
    let mut store = WorkoutStore::new();
    store.load_records(history::load(&slot));

    let csv_path = out.unwrap_or_else(|| data_dir.join("workouts.csv"));
    let count = export_store(&store, &csv_path)?;

    if count == 0 {
        println!("No workouts to export.");
    } else {
        println!("✓ Exported {} workouts to {}", count, csv_path.display());
    }

    Ok(())
}

fn open_session(
    data_dir: &Path,
    config: &Config,
    quiet_list: bool,
) -> Session<ConsoleMap, ConsoleForm, ConsoleList, HistoryFile> {
    Session::new(
        ConsoleMap,
        ConsoleForm,
        ConsoleList { quiet: quiet_list },
        HistoryFile::new(data_dir),
        config.map.default_zoom,
    )
}

/// Map collaborator that prints render requests.
struct ConsoleMap;

impl MapView for ConsoleMap {
    fn render(&mut self, center: Coords, zoom: u8) {
        println!(
            "Map centered at ({:.4}, {:.4}), zoom {}",
            center.lat, center.lng, zoom
        );
    }

    fn place_marker(&mut self, coords: Coords, caption: &str, style: MarkerStyle) {
        match style.css_class() {
            Some(class) => println!(
                "  📍 ({:.4}, {:.4})  {}  [{}]",
                coords.lat, coords.lng, caption, class
            ),
            None => println!("  📍 ({:.4}, {:.4})  {}", coords.lat, coords.lng, caption),
        }
    }

    fn pan_to(&mut self, coords: Coords, zoom: u8) {
        println!("Panning to ({:.4}, {:.4}), zoom {}", coords.lat, coords.lng, zoom);
    }
}

/// Form collaborator. The form fields arrive as CLI arguments, so the
/// visibility choreography only leaves a trace in the logs.
struct ConsoleForm;

impl FormView for ConsoleForm {
    fn show(&mut self) {
        tracing::debug!("Form opened");
    }

    fn hide(&mut self) {
        tracing::debug!("Form closed");
    }

    fn focus_first_field(&mut self) {
        tracing::debug!("Focused distance field");
    }

    fn toggle_cadence_elevation(&mut self) {
        tracing::debug!("Toggled cadence/elevation rows");
    }
}

/// List collaborator that prints one block per workout.
struct ConsoleList {
    /// Suppress output when the list is not this command's surface.
    quiet: bool,
}

impl ListView for ConsoleList {
    fn push_entry(&mut self, entry: ListEntry) {
        if self.quiet {
            return;
        }

        println!("{} {}  [{}]", entry.icon, entry.description, entry.id);
        println!(
            "    {} km · {} min · {:.1} {} · {} {}",
            entry.distance_km,
            entry.duration_min,
            entry.metric_value,
            entry.metric_unit,
            entry.extra_value,
            entry.extra_unit
        );
    }
}
