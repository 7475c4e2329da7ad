use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use stackcanvas::{CanvasState, Editor, EditorConfig, TextElement};

#[derive(Parser, Debug)]
#[command(name = "stackcanvas", version)]
struct Cli {
    /// Editor config JSON; defaults apply to missing fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a saved canvas state as a PNG.
    Render(RenderArgs),
    /// Export a saved canvas state as an animated GIF.
    Gif(GifArgs),
    /// Build a canvas from image, GIF and text inputs and export it.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Canvas state JSON. Image `src` paths are resolved relative to this file.
    #[arg(long)]
    state: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GifArgs {
    /// Canvas state JSON. Image `src` paths are resolved relative to this file.
    #[arg(long)]
    state: PathBuf,

    /// Frames to export (config default when omitted).
    #[arg(long)]
    frames: Option<usize>,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Base image (png, jpg, jpeg, webp).
    #[arg(long)]
    image: Option<PathBuf>,

    /// Animated GIF layered over the base image.
    #[arg(long)]
    gif: Option<PathBuf>,

    /// Text label centred on the canvas.
    #[arg(long)]
    text: Option<String>,

    /// Font file used for the label.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Canvas width (config default when omitted).
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height (config default when omitted).
    #[arg(long)]
    height: Option<u32>,

    /// GIF frame count when writing a `.gif`.
    #[arg(long)]
    frames: Option<usize>,

    /// Output path; `.gif` exports an animation, anything else a PNG.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };
    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Gif(args) => cmd_gif(config, args),
        Command::Compose(args) => cmd_compose(config, args),
    }
}

fn cmd_render(config: EditorConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut editor = open_state(config, &args.state)?;
    ensure_parent(&args.out)?;
    editor.export_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_gif(config: EditorConfig, args: GifArgs) -> anyhow::Result<()> {
    let mut editor = open_state(config, &args.state)?;
    ensure_parent(&args.out)?;
    editor.export_gif(&args.out, args.frames)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_compose(config: EditorConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let width = args.width.unwrap_or(config.canvas_width);
    let height = args.height.unwrap_or(config.canvas_height);
    let mut editor = Editor::new(config.with_canvas_size(width, height));

    if let Some(path) = &args.image {
        upload_file(&mut editor, path)?;
    }
    if let Some(path) = &args.gif {
        upload_file(&mut editor, path)?;
    }

    if let Some(text) = &args.text {
        let mut style = editor.config().text.clone();
        if let Some(font) = &args.font {
            let bytes = std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
            style.font_family = editor.register_font(bytes)?;
        }
        let element = TextElement::new(
            text.clone(),
            f64::from(width) / 2.0,
            f64::from(height) / 2.0,
            style,
        );
        editor.store_mut().add_text_element(element);
    }

    ensure_parent(&args.out)?;
    let is_gif = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if is_gif {
        editor.export_gif(&args.out, args.frames)?;
    } else {
        editor.export_png(&args.out)?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn open_state(config: EditorConfig, path: &Path) -> anyhow::Result<Editor> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read state '{}'", path.display()))?;
    let state: CanvasState =
        serde_json::from_str(&json).with_context(|| format!("parse state '{}'", path.display()))?;

    let mut editor = Editor::with_state(config, state);
    let assets_root = path.parent().unwrap_or_else(|| Path::new("."));
    let attached = editor.load_pending_assets(assets_root);
    tracing::info!(attached, "assets loaded");
    Ok(editor)
}

fn upload_file(editor: &mut Editor, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("file name of '{}'", path.display()))?;
    editor
        .upload(name, &bytes)
        .with_context(|| format!("upload '{}'", path.display()))?;
    Ok(())
}

fn ensure_parent(out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
