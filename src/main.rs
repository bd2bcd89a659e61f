//! Bean Score - personal coffee place tracker
//!
//! Command line front end: log in, record places with ratings and dietary
//! options, and list them filtered and sorted by distance.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bean_score::{
    address_from_current_location, maps_search_url, ApiError, ApiResult, AppConfig, BeanScoreApi,
    Coordinates, FileTokenStore, FilterSpec, FixedLocation, Geocoder, Locator, PhotoCache,
    PhotoUpload, PhotoVariant, PlaceDraft, PlaceList, PlaceService, TokenStore, ValidationError,
};
use clap::{Args, Parser, Subcommand};
use reqwest::StatusCode;

/// Track and rate coffee places
#[derive(Parser, Debug)]
#[command(name = "bean_score")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend URL (overrides config and BEAN_SCORE_BACKEND_URL)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Treat the network as unavailable: no distance sorting or geocoding
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session token
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Delete the account and all its places
    DeleteAccount,
    /// List places, filtered and sorted by distance
    List(ListArgs),
    /// Show one place
    Show { id: String },
    /// Add a place
    Add(PlaceArgs),
    /// Edit a place; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: PlaceArgs,
    },
    /// Delete a place
    Delete { id: String },
    /// Manage place photos
    #[command(subcommand)]
    Photo(PhotoCommand),
    /// Prefetch all thumbnails and print cache usage
    CacheStats,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Case-insensitive match on name or address
    #[arg(default_value = "")]
    search: String,
    #[arg(long)]
    gluten_free: bool,
    #[arg(long)]
    veg_milk: bool,
    #[arg(long)]
    vegan_food: bool,
    #[arg(long)]
    sugar_free: bool,
    #[command(flatten)]
    location: LocationArgs,
}

#[derive(Args, Debug)]
struct LocationArgs {
    /// Current latitude
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Current longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
}

impl LocationArgs {
    fn provider(&self) -> FixedLocation {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => FixedLocation::at(lat, lng),
            _ => FixedLocation::default(),
        }
    }
}

#[derive(Args, Debug)]
struct PlaceArgs {
    #[arg(long)]
    name: Option<String>,
    /// Street address; looked up from --lat/--lng when omitted
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    instagram: Option<String>,
    /// Coffee quality, 1-5
    #[arg(long)]
    coffee: Option<u8>,
    /// Ambient, 1-5
    #[arg(long)]
    ambient: Option<u8>,
    #[arg(long)]
    gluten_free: Option<bool>,
    #[arg(long)]
    veg_milk: Option<bool>,
    #[arg(long)]
    vegan_food: Option<bool>,
    #[arg(long)]
    sugar_free: Option<bool>,
    /// JPEG or PNG photo, at most 2MB
    #[arg(long)]
    photo: Option<PathBuf>,
    /// Thumbnail for --photo, at most 500KB (defaults to the photo itself)
    #[arg(long, requires = "photo")]
    thumbnail: Option<PathBuf>,
    #[command(flatten)]
    location: LocationArgs,
}

impl PlaceArgs {
    /// Whether the address comes from reverse geocoding --lat/--lng. A new
    /// place always needs one; an edit only when a position was given.
    fn uses_current_location(&self, editing: bool) -> bool {
        self.address.is_none() && (!editing || self.location.lat.is_some())
    }

    fn apply_to(&self, draft: &mut PlaceDraft) {
        if let Some(name) = &self.name {
            draft.name = name.clone();
        }
        if let Some(address) = &self.address {
            draft.address = address.clone();
            // A new address needs fresh coordinates
            draft.set_coordinates(None);
        }
        if let Some(handle) = &self.instagram {
            draft.instagram_handle = Some(handle.clone()).filter(|h| !h.is_empty());
        }
        if let Some(coffee) = self.coffee {
            draft.coffee_quality = coffee;
        }
        if let Some(ambient) = self.ambient {
            draft.ambient = ambient;
        }
        if let Some(v) = self.gluten_free {
            draft.has_gluten_free = v;
        }
        if let Some(v) = self.veg_milk {
            draft.has_veg_milk = v;
        }
        if let Some(v) = self.vegan_food {
            draft.has_vegan_food = v;
        }
        if let Some(v) = self.sugar_free {
            draft.has_sugar_free = v;
        }
    }

    fn photo_upload(&self) -> ApiResult<Option<PhotoUpload>> {
        self.photo
            .as_deref()
            .map(|photo| read_photo(photo, self.thumbnail.as_deref()))
            .transpose()
    }
}

/// Reads a photo and its thumbnail; the content type follows the extension
fn read_photo(photo_path: &Path, thumbnail_path: Option<&Path>) -> ApiResult<PhotoUpload> {
    let photo = std::fs::read(photo_path)?;
    let thumbnail = match thumbnail_path {
        Some(path) => std::fs::read(path)?,
        None => photo.clone(),
    };
    let content_type = photo_path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(PhotoUpload::content_type_for)
        .unwrap_or("application/octet-stream")
        .to_string();
    Ok(PhotoUpload {
        photo,
        thumbnail,
        content_type,
    })
}

#[derive(Subcommand, Debug)]
enum PhotoCommand {
    /// Upload or replace the photo of a place
    Upload {
        id: String,
        photo: PathBuf,
        /// Thumbnail, at most 500KB (defaults to the photo itself)
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },
    /// Remove the photo of a place
    Delete { id: String },
    /// Download a photo to a file
    Fetch {
        id: String,
        /// thumbnail or full
        #[arg(long, default_value = "full", value_parser = parse_variant)]
        variant: PhotoVariant,
        /// Output file (default: <id>-<variant>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_variant(s: &str) -> Result<PhotoVariant, String> {
    PhotoVariant::parse(s).ok_or_else(|| format!("unknown photo variant '{s}'"))
}

/// Everything a command may need, built once from configuration
struct Context {
    config: AppConfig,
    online: bool,
    api: Arc<BeanScoreApi>,
    photos: Arc<PhotoCache>,
    geocoder: Arc<Geocoder>,
}

impl Context {
    fn new(cli: &Cli) -> Self {
        let mut config = AppConfig::load();
        if let Some(url) = &cli.backend_url {
            config.backend_url = url.clone();
        }
        log::debug!("Backend: {}", config.backend_url);

        let tokens: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(AppConfig::config_dir().join("token")));
        let api = Arc::new(BeanScoreApi::new(&config.backend_url, tokens));
        let photos = Arc::new(PhotoCache::new(Arc::clone(&api), config.debug));
        let geocoder = Arc::new(Geocoder::new(config.google_maps_api_key.clone()));

        Self {
            online: !cli.offline,
            config,
            api,
            photos,
            geocoder,
        }
    }

    fn service(&self) -> PlaceService {
        PlaceService::new(
            Arc::clone(&self.api),
            Arc::clone(&self.photos),
            Arc::clone(&self.geocoder),
        )
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let ctx = Context::new(&cli);

    if let Err(e) = run(cli.command, &ctx).await {
        log::error!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Command, ctx: &Context) -> ApiResult<()> {
    match command {
        Command::Login { email, password } => {
            let user = ctx.api.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Command::Register {
            email,
            password,
            name,
        } => {
            let user = ctx.api.register(&email, &password, &name).await?;
            println!("Welcome, {}!", user.name);
        }
        Command::Logout => {
            ctx.api.logout()?;
            ctx.photos.clear_all();
            println!("Logged out");
        }
        Command::Whoami => match ctx.api.current_user().await? {
            Some(user) => println!("{} <{}>", user.name, user.email),
            None => println!("Not logged in"),
        },
        Command::DeleteAccount => {
            ctx.api.delete_account().await?;
            ctx.photos.clear_all();
            println!("Account deleted");
        }
        Command::List(args) => list_places(args, ctx).await?,
        Command::Show { id } => show_place(&id, ctx).await?,
        Command::Add(fields) => {
            let mut draft = PlaceDraft::default();
            if fields.uses_current_location(false) {
                let (address, coordinates) = current_address(&fields.location, ctx).await?;
                draft.address = address;
                draft.set_coordinates(Some(coordinates));
            }
            fields.apply_to(&mut draft);
            let photo = fields.photo_upload()?;

            let place = ctx
                .service()
                .save_place(None, draft, photo, ctx.online)
                .await?;
            println!("Added {} ({})", place.name, place.id);
        }
        Command::Edit { id, fields } => {
            let place = ctx
                .api
                .get_place(&id)
                .await?
                .ok_or(ApiError::HttpStatus(StatusCode::NOT_FOUND))?;
            let mut draft = PlaceDraft::from(&place);
            if fields.uses_current_location(true) {
                let (address, coordinates) = current_address(&fields.location, ctx).await?;
                draft.address = address;
                draft.set_coordinates(Some(coordinates));
            }
            fields.apply_to(&mut draft);
            let photo = fields.photo_upload()?;

            let place = ctx
                .service()
                .save_place(Some(&id), draft, photo, ctx.online)
                .await?;
            println!("Updated {} ({})", place.name, place.id);
        }
        Command::Delete { id } => {
            ctx.service().delete_place(&id).await?;
            println!("Deleted {id}");
        }
        Command::Photo(command) => photo_command(command, ctx).await?,
        Command::CacheStats => {
            let places = ctx.api.list_places().await?;
            for place in places.iter().filter(|p| p.has_photo()) {
                ctx.photos.resolve(&place.id, PhotoVariant::Thumbnail).await;
            }
            let stats = ctx.photos.stats();
            println!(
                "{} cached photos, {:.1} KB",
                stats.count,
                stats.total_size as f64 / 1024.0
            );
        }
    }
    Ok(())
}

async fn list_places(args: ListArgs, ctx: &Context) -> ApiResult<()> {
    let places = ctx.api.list_places().await?;
    let filter = FilterSpec {
        search_term: args.search,
        has_gluten_free: args.gluten_free,
        has_veg_milk: args.veg_milk,
        has_vegan_food: args.vegan_food,
        has_sugar_free: args.sugar_free,
    };

    let location = if ctx.online {
        Locator::from_config(args.location.provider(), &ctx.config)
            .current_position()
            .await
            .map(|position| position.coordinates)
    } else {
        None
    };

    let entries = PlaceList::new(ctx.config.debug).entries(&places, &filter, location, ctx.online);
    if entries.is_empty() {
        if filter.is_active() {
            println!("No places match your filters");
        } else {
            println!("No places yet");
        }
        return Ok(());
    }

    for entry in entries {
        let distance = entry
            .formatted_distance()
            .map(|d| format!("  {d}"))
            .unwrap_or_default();
        println!(
            "{:<30} {:.1}{}  {}  [{}]",
            entry.place.name,
            entry.score,
            distance,
            entry.place.address,
            entry.place.id
        );
    }
    Ok(())
}

async fn show_place(id: &str, ctx: &Context) -> ApiResult<()> {
    let Some(place) = ctx.api.get_place(id).await? else {
        println!("Place {id} not found");
        return Ok(());
    };

    println!("{}", place.name);
    println!("  Score:          {:.1}", place.score());
    println!("  Coffee quality: {}/5", place.coffee_quality);
    println!("  Ambient:        {}/5", place.ambient);
    println!("  Address:        {}", place.address);
    println!("  Map:            {}", maps_search_url(&place.address));
    if let Some(handle) = &place.instagram_handle {
        println!("  Instagram:      @{}", handle.trim_start_matches('@'));
    }

    let dietary: Vec<&str> = [
        (place.has_gluten_free, "gluten free"),
        (place.has_veg_milk, "plant milk"),
        (place.has_vegan_food, "vegan food"),
        (place.has_sugar_free, "sugar free"),
    ]
    .into_iter()
    .filter_map(|(has, label)| has.then_some(label))
    .collect();
    if !dietary.is_empty() {
        println!("  Dietary:        {}", dietary.join(", "));
    }
    if let Some(coordinates) = place.coordinates() {
        println!(
            "  Coordinates:    {:.5}, {:.5}",
            coordinates.lat, coordinates.lng
        );
    }
    println!(
        "  Photo:          {}",
        if place.has_photo() { "yes" } else { "no" }
    );
    Ok(())
}

async fn photo_command(command: PhotoCommand, ctx: &Context) -> ApiResult<()> {
    match command {
        PhotoCommand::Upload {
            id,
            photo,
            thumbnail,
        } => {
            let upload = read_photo(&photo, thumbnail.as_deref())?;
            ctx.service().upload_photo(&id, upload).await?;
            println!("Photo uploaded for {id}");
        }
        PhotoCommand::Delete { id } => {
            ctx.service().delete_photo(&id).await?;
            println!("Photo deleted for {id}");
        }
        PhotoCommand::Fetch {
            id,
            variant,
            output,
        } => match ctx.photos.resolve(&id, variant).await {
            Some(handle) => {
                let Some(bytes) = handle.bytes() else {
                    println!("Photo for {id} is no longer available");
                    return Ok(());
                };
                let path = output
                    .unwrap_or_else(|| default_photo_path(&id, variant, handle.content_type()));
                std::fs::write(&path, &bytes[..])?;
                println!("Saved {} ({} bytes)", path.display(), handle.size());
            }
            None => println!("No {variant} photo for {id}"),
        },
    }
    Ok(())
}

fn default_photo_path(id: &str, variant: PhotoVariant, content_type: &str) -> PathBuf {
    let ext = if content_type == "image/png" { "png" } else { "jpg" };
    Path::new(".").join(format!("{id}-{variant}.{ext}"))
}

/// Address and coordinates for --lat/--lng via reverse geocoding
async fn current_address(
    location: &LocationArgs,
    ctx: &Context,
) -> ApiResult<(String, Coordinates)> {
    let locator = Locator::from_config(location.provider(), &ctx.config);
    address_from_current_location(&locator, &ctx.geocoder, ctx.online)
        .await
        .map_err(|e| {
            log::warn!("{}", e);
            ApiError::Validation(ValidationError::MissingAddress)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_args(args: &[&str]) -> PlaceArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Add(fields) | Command::Edit { fields, .. } => fields,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_without_address_uses_current_location() {
        let fields = place_args(&["bean_score", "add", "--name", "Cafe"]);
        assert!(fields.uses_current_location(false));

        let fields = place_args(&["bean_score", "add", "--address", "1 Main St"]);
        assert!(!fields.uses_current_location(false));
    }

    #[test]
    fn edit_with_position_reverse_geocodes() {
        let fields = place_args(&["bean_score", "edit", "p1", "--lat", "40.5", "--lng", "-74.25"]);
        assert!(fields.uses_current_location(true));
        assert!(fields.location.provider().0.is_some());
    }

    #[test]
    fn edit_without_position_keeps_address() {
        let fields = place_args(&["bean_score", "edit", "p1", "--coffee", "4"]);
        assert!(!fields.uses_current_location(true));

        let fields = place_args(&[
            "bean_score", "edit", "p1", "--address", "2 Side St", "--lat", "1", "--lng", "2",
        ]);
        assert!(!fields.uses_current_location(true));
    }

    #[test]
    fn edit_with_new_address_drops_stale_coordinates() {
        let fields = place_args(&["bean_score", "edit", "p1", "--address", "2 Side St"]);
        let mut draft = PlaceDraft {
            address: "1 Main St".to_string(),
            latitude: Some(40.0),
            longitude: Some(-74.0),
            ..Default::default()
        };
        fields.apply_to(&mut draft);
        assert_eq!(draft.address, "2 Side St");
        assert!(draft.coordinates().is_none());
    }
}
