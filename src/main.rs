use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use code2clip::context::AppContext;
use code2clip::copy::{Concatenation, StdoutSink, SystemClipboard, TextSink};
use code2clip::decode::decode_text;
use code2clip::extensions::{
    compute_extension_filters, subset_extensions, Category, ExtensionGroups,
    ExtensionMode, ExtensionSettings, ALL_CATEGORIES, DEFAULT_EXTENSION_CATEGORIES,
};
use code2clip::file_list::FileList;
use code2clip::ignore::{get_ignore_set, IgnorePreset, ALL_IGNORE_PRESETS};
use code2clip::logger::initialize_logger;
use code2clip::paths::{convert_path, is_dir, is_file};
use code2clip::remote::{remote_for, RemoteFs};
use code2clip::reporting::render_stats;
use code2clip::settings::{AppSettings, SettingsStore};
use code2clip::template::{Template, TemplatePreset, ALL_TEMPLATE_PRESETS};
use code2clip::utils::{expand_glob, looks_like_glob};
use code2clip::{
    BasicClipboardCopier, ClipError, ClipboardCopier, ClipboardCopierConfig, IgnoreFilter,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Settings file to use instead of the platform default
    #[arg(long, global = true, env = "CODE2CLIP_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: SubCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommands {
    /// Concatenate files and copy the result to the clipboard
    Copy(CopyArgs),
    /// Print the files a copy would include
    List(ListArgs),
    /// Show the effective extension allow-list or the extension catalog
    Extensions(ExtensionsArgs),
    /// Show ignore-folder and template presets
    Presets,
    /// Show size, modification time and encoding of files
    Info(InfoArgs),
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(subcommand)]
    Ssh(SshCommand),
}

#[derive(Parser, Debug, Clone, Default)]
struct FilterArgs {
    /// Extension mode: categories, allow_all or custom
    #[arg(long)]
    mode: Option<ExtensionMode>,
    /// Extra extensions to allow (comma or space separated)
    #[arg(long)]
    include: Option<String>,
    /// Extensions to deny, applied last
    #[arg(long)]
    exclude: Option<String>,
    /// Ignore-folder preset by name, e.g. "Web/Node"
    #[arg(long)]
    ignore_preset: Option<String>,
    /// Comma-separated folders to ignore; implies the Custom preset
    #[arg(long)]
    ignore: Option<String>,
}

#[derive(Parser, Debug, Clone)]
struct SourceArgs {
    /// Files, folders or glob patterns
    paths: Vec<String>,
    #[command(flatten)]
    filters: FilterArgs,
    /// Connect to the configured SSH host and resolve absolute paths there
    #[arg(long)]
    remote: bool,
    /// Allow ssh to prompt for a password
    #[arg(long)]
    interactive: bool,
    /// Read additional paths, one per line, from the clipboard
    #[arg(long)]
    from_clipboard: bool,
    /// Directory paths are shown relative to
    #[arg(short = 'r', long)]
    root: Option<String>,
    /// Use the common directory of all files as the root
    #[arg(long, conflicts_with = "root")]
    auto_root: bool,
}

#[derive(Parser, Debug, Clone)]
struct CopyArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Template preset: XML, Markdown or Custom
    #[arg(short = 'p', long)]
    preset: Option<String>,
    /// Custom prefix; `$filepath` and `$filename` are substituted
    #[arg(long)]
    prefix: Option<String>,
    #[arg(long)]
    suffix: Option<String>,
    /// Keep escape sequences such as `\n` literally
    #[arg(long)]
    no_escapes: bool,
    /// Print the result instead of copying it
    #[arg(long)]
    stdout: bool,
    /// Print a per-file line and byte summary
    #[arg(short = 's', long)]
    stats: bool,
    /// Remember the template choice in the settings
    #[arg(long)]
    save: bool,
}

#[derive(Parser, Debug, Clone)]
struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Parser, Debug, Clone)]
struct ExtensionsArgs {
    /// Print every category, subset and extension
    #[arg(long)]
    catalog: bool,
    /// Print the simple named extension groups
    #[arg(long, conflicts_with = "catalog")]
    groups: bool,
    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(Parser, Debug, Clone)]
struct InfoArgs {
    #[arg(required = true)]
    files: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum ConfigCommand {
    /// Print the current settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Restore all defaults
    Reset,
    /// Change one setting
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug, Clone)]
enum SshCommand {
    /// Connect to the configured host and optionally stat a path
    Check {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        interactive: bool,
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse();
    initialize_logger();

    if let Err(e) = run(cli_args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli_args: CliArgs) -> Result<(), ClipError> {
    let store = match cli_args.config {
        Some(path) => SettingsStore::open(path)?,
        None => SettingsStore::open_default()?,
    };
    debug!("Using settings file {:?}", store.path());

    match cli_args.cmd {
        SubCommands::Copy(args) => copy(AppContext::new(store), args).await,
        SubCommands::List(args) => list(AppContext::new(store), args).await,
        SubCommands::Extensions(args) => {
            show_extensions(store.settings(), &args);
            Ok(())
        }
        SubCommands::Presets => {
            show_presets();
            Ok(())
        }
        SubCommands::Info(args) => info_files(&args.files).await,
        SubCommands::Config(command) => config(store, command),
        SubCommands::Ssh(command) => ssh(AppContext::new(store), command).await,
    }
}

fn effective_extensions(settings: &AppSettings, filters: &FilterArgs) -> Vec<String> {
    let mut extensions: ExtensionSettings = settings.extensions.clone();
    if let Some(mode) = filters.mode {
        extensions.mode = mode;
    }
    if let Some(include) = &filters.include {
        if extensions.mode == ExtensionMode::Custom {
            extensions.custom_extensions_text = include.clone();
        } else {
            extensions.included_extensions_text = include.clone();
        }
    }
    if let Some(exclude) = &filters.exclude {
        extensions.excluded_extensions_text = exclude.clone();
    }
    compute_extension_filters(&extensions)
}

fn effective_ignore(settings: &AppSettings, filters: &FilterArgs) -> IgnoreFilter {
    let folders = match (&filters.ignore, &filters.ignore_preset) {
        (Some(custom), _) => get_ignore_set(IgnorePreset::Custom.name(), custom),
        (None, Some(preset)) => get_ignore_set(preset, &settings.custom_ignore_list),
        (None, None) => settings.ignore_filters(),
    };
    IgnoreFilter::new(folders)
}

/// Resolves the command line sources into an ordered file list.
async fn collect_files(
    remote: Option<&dyn RemoteFs>,
    settings: &AppSettings,
    source: &SourceArgs,
) -> Result<FileList, ClipError> {
    let extensions = effective_extensions(settings, &source.filters);
    let ignore = effective_ignore(settings, &source.filters);
    let mut file_list = FileList::new();

    if source.from_clipboard {
        let text = SystemClipboard::new()?.get_text()?;
        for missing in file_list.add_from_text(&text) {
            warn!("Clipboard path not found: {}", missing);
        }
    }

    for raw in &source.paths {
        let path = convert_path(raw, remote).await;
        if is_dir(&path, remote).await {
            let added = match remote_for(&path, remote) {
                Some(remote) => {
                    file_list
                        .add_remote_folder(remote, &path, Some(&extensions), Some(&ignore))
                        .await?
                }
                None => file_list.add_folder(Path::new(&path), Some(&extensions), Some(&ignore))?,
            };
            info!("Added {} files from {}", added, path);
        } else if is_file(&path, remote).await {
            file_list.add_file(path);
        } else if looks_like_glob(raw) {
            let matched = expand_glob(raw)?;
            if matched.is_empty() {
                warn!("No files matched pattern: {}", raw);
            }
            for file in matched {
                file_list.add_file(file);
            }
        } else {
            warn!("File not found: {}", raw);
        }
    }

    if let Some(root) = &source.root {
        file_list.set_root(root.clone());
    } else if source.auto_root {
        if let Some(root) = file_list.suggested_root() {
            debug!("Using common root {}", root);
            file_list.set_root(root);
        }
    }
    Ok(file_list)
}

async fn prepare_context(ctx: &mut AppContext, source: &SourceArgs) -> Result<(), ClipError> {
    if source.remote && !ctx.connect_if_configured(source.interactive).await? {
        return Err(ClipError::SshNotConfigured);
    }
    Ok(())
}

fn resolve_template(
    settings: &AppSettings,
    args: &CopyArgs,
) -> Result<(TemplatePreset, Template), ClipError> {
    let preset = match &args.preset {
        Some(name) => TemplatePreset::from_name(name).ok_or_else(|| {
            ClipError::ConfigError(format!("Unknown template preset '{}'", name))
        })?,
        None if args.prefix.is_some() || args.suffix.is_some() => TemplatePreset::Custom,
        None => settings.template_preset(),
    };
    let prefix = args.prefix.as_deref().unwrap_or(&settings.custom_prefix);
    let suffix = args.suffix.as_deref().unwrap_or(&settings.custom_suffix);
    let template = Template::from_preset(preset, prefix, suffix);
    Ok((TemplatePreset::detect(&template.prefix, &template.suffix), template))
}

async fn copy_files(
    ctx: &AppContext,
    settings: &AppSettings,
    args: &CopyArgs,
    template: &Template,
) -> Result<Concatenation, ClipError> {
    let file_list = collect_files(ctx.remote(), settings, &args.source).await?;

    let config = ClipboardCopierConfig {
        root_path: file_list.root().map(str::to_owned),
        template: template.clone(),
        interpret_escape_sequences: settings.interpret_escape_sequences && !args.no_escapes,
    };
    let sink: Box<dyn TextSink> = if args.stdout {
        Box::new(StdoutSink)
    } else {
        Box::new(SystemClipboard::new()?)
    };

    let mut copier = BasicClipboardCopier::new(config, sink);
    if let Some(remote) = ctx.remote() {
        copier = copier.with_remote(remote);
    }
    copier.copy_files_to_clipboard(file_list.files()).await
}

async fn copy(mut ctx: AppContext, args: CopyArgs) -> Result<(), ClipError> {
    let settings = ctx.store().settings().clone();
    let (preset, template) = resolve_template(&settings, &args)?;

    prepare_context(&mut ctx, &args.source).await?;
    let outcome = copy_files(&ctx, &settings, &args, &template).await;
    let result = ctx.finish(outcome).await?;

    if args.stats {
        info!("\n{}", render_stats(&result.stats));
    }
    if args.save {
        let store = ctx.store_mut();
        store.set_last_preset(preset)?;
        if preset == TemplatePreset::Custom {
            store.set_custom_template(&template.prefix, &template.suffix)?;
        }
    }
    if settings.show_success_message && !args.stdout {
        info!("Copied {} files to clipboard.", result.stats.len());
    }
    Ok(())
}

async fn list(mut ctx: AppContext, args: ListArgs) -> Result<(), ClipError> {
    prepare_context(&mut ctx, &args.source).await?;
    let settings = ctx.store().settings().clone();
    let collected = collect_files(ctx.remote(), &settings, &args.source).await;
    let file_list = ctx.finish(collected).await?;

    let (names, warnings) = file_list.display_names();
    for warning in warnings {
        warn!("Path Error: {}", warning);
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn show_extensions(settings: &AppSettings, args: &ExtensionsArgs) {
    if args.catalog {
        for category in ALL_CATEGORIES {
            let state = if settings.extensions.category_enabled(category) {
                "on"
            } else {
                "off"
            };
            println!("{} [{}]", category, state);
            for subset in category.subsets() {
                let excluded = settings
                    .extensions
                    .excluded_subsets
                    .get(&category)
                    .is_some_and(|set| set.contains(*subset));
                println!(
                    "  {}{}: {}",
                    subset,
                    if excluded { " (excluded)" } else { "" },
                    subset_extensions(subset).join(" ")
                );
            }
        }
        return;
    }
    if args.groups {
        let groups = ExtensionGroups::default();
        for name in groups.names() {
            let marker = if DEFAULT_EXTENSION_CATEGORIES.contains(&name) {
                "*"
            } else {
                " "
            };
            let extensions = groups.get(name).unwrap_or_default().join(" ");
            println!("{} {}: {}", marker, name, extensions);
        }
        return;
    }

    let filters = effective_extensions(settings, &args.filters);
    if filters.is_empty() {
        println!("All extensions allowed");
    } else {
        println!("{}", filters.join(" "));
    }
}

fn show_presets() {
    println!("Ignore presets:");
    for preset in ALL_IGNORE_PRESETS {
        let folders: Vec<String> = preset.folders().into_iter().collect();
        println!("  {}: {}", preset, folders.join(", "));
    }
    println!("Template presets:");
    for preset in ALL_TEMPLATE_PRESETS {
        match preset.builtin() {
            Some((prefix, suffix)) => println!("  {}: {} ... {}", preset, prefix, suffix),
            None => println!("  {}: prefix and suffix from settings", preset),
        }
    }
}

async fn info_files(files: &[String]) -> Result<(), ClipError> {
    for file in files {
        let metadata = match tokio::fs::metadata(file).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Could not read metadata of {}: {}", file, e);
                continue;
            }
        };
        let modified = metadata
            .modified()
            .map(|time| DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| "unknown".to_owned());
        let encoding = if metadata.is_file() {
            let bytes = tokio::fs::read(file).await?;
            match decode_text(&bytes) {
                Ok(decoded) => format!(
                    "{}, {} lines",
                    decoded.encoding,
                    decoded.text.lines().count()
                ),
                Err(reason) => reason,
            }
        } else {
            "directory".to_owned()
        };
        println!("{}: {} bytes, modified {}, {}", file, metadata.len(), modified, encoding);
    }
    Ok(())
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ClipError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ClipError::ConfigError(format!(
            "Expected a boolean for {}, got '{}'",
            key, value
        ))),
    }
}

fn category_key(key: &str) -> Option<Category> {
    Category::from_name(key.strip_prefix("include_")?)
}

fn config(mut store: SettingsStore, command: ConfigCommand) -> Result<(), ClipError> {
    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(store.settings())?);
        }
        ConfigCommand::Path => println!("{}", store.path().display()),
        ConfigCommand::Reset => {
            store.reset_all()?;
            info!("Settings reset to defaults");
        }
        ConfigCommand::Set { key, value } => {
            set_value(&mut store, &key, &value)?;
            info!("Updated {}", key);
        }
    }
    Ok(())
}

fn set_value(store: &mut SettingsStore, key: &str, value: &str) -> Result<(), ClipError> {
    if let Some(category) = category_key(key) {
        return store.set_category_enabled(category, parse_flag(key, value)?);
    }
    match key {
        "extension_mode" => {
            store.set_extension_mode(value.parse().map_err(ClipError::ConfigError)?)
        }
        "exclude_subset" | "include_subset" => {
            if Category::of_subset(value).is_none() {
                return Err(ClipError::ConfigError(format!("Unknown subset '{}'", value)));
            }
            store.set_subset_excluded(value, key == "exclude_subset")
        }
        "included_extensions" => store.set_included_extensions_text(value),
        "excluded_extensions" => store.set_excluded_extensions_text(value),
        "custom_extensions" => store.set_custom_extensions_text(value),
        "reset_extensions" => store.reset_extension_settings(),
        "ignore_preset" => {
            if IgnorePreset::from_name(value).is_none() {
                return Err(ClipError::ConfigError(format!("Unknown ignore preset '{}'", value)));
            }
            store.set_ignore_preset(value)
        }
        "custom_ignore_list" => store.set_custom_ignore_list(value),
        "reset_ignore" => store.reset_ignore_filters(),
        "ssh_host" => {
            let user = store.settings().ssh_username.clone();
            store.set_ssh(value, &user)
        }
        "ssh_username" => {
            let host = store.settings().ssh_host.clone();
            store.set_ssh(&host, value)
        }
        "template_preset" => {
            let preset = TemplatePreset::from_name(value).ok_or_else(|| {
                ClipError::ConfigError(format!("Unknown template preset '{}'", value))
            })?;
            store.set_last_preset(preset)
        }
        "custom_prefix" => {
            let suffix = store.settings().custom_suffix.clone();
            store.set_custom_template(value, &suffix)
        }
        "custom_suffix" => {
            let prefix = store.settings().custom_prefix.clone();
            store.set_custom_template(&prefix, value)
        }
        "interpret_escape_sequences" => {
            store.set_interpret_escape_sequences(parse_flag(key, value)?)
        }
        "show_success_message" => store.set_show_success_message(parse_flag(key, value)?),
        _ => Err(ClipError::ConfigError(format!("Unknown setting '{}'", key))),
    }
}

async fn ssh(mut ctx: AppContext, command: SshCommand) -> Result<(), ClipError> {
    match command {
        SshCommand::Check {
            host,
            user,
            interactive,
            path,
        } => {
            if host.is_some() || user.is_some() {
                let settings = ctx.store().settings();
                let host = host.unwrap_or_else(|| settings.ssh_host.clone());
                let user = user.unwrap_or_else(|| settings.ssh_username.clone());
                ctx.store_mut().set_ssh(&host, &user)?;
                ctx.process_events().await;
            }
            ctx.ssh_mut().connect(interactive).await?;
            info!("SSH connection OK");
            let outcome = match path {
                Some(path) => ctx.ssh().stat(&path).await.map(|kind| match kind {
                    Some(kind) => println!("{}: {:?}", path, kind),
                    None => println!("{}: not found", path),
                }),
                None => Ok(()),
            };
            ctx.finish(outcome).await
        }
    }
}

