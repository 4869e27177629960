//! Smartflow inspector - Entry Point

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

use smartflow::config::ResolvedConfig;
use smartflow::layout::{ArticleView, LayoutState, LineMetrics};
use smartflow::model::Size;
use smartflow::source::detect_input_source;
use smartflow::view_state::PagesPool;

/// Smartflow inspector - run article layout and issue viewer computations on JSON input
#[derive(Parser, Debug)]
#[command(name = "smartflow")]
#[command(version)]
#[command(about = "Inspect article column layouts, zoom ladders and page windows")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of pages kept materialized around the visible pages
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub capacity: Option<u32>,

    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Command,
}

/// Inspector subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Lay out an article and print one line per column
    Layout {
        /// Article JSON (reads from stdin if not provided or `-`)
        file: Option<PathBuf>,

        /// Layout state: init, preview, shrinked or expanded
        #[arg(long, default_value = "expanded")]
        state: LayoutState,

        /// Basis JSON overriding the configured basis
        #[arg(long)]
        basis: Option<PathBuf>,
    },

    /// Print the zoom ladder and the list of all zooms
    Zooms {
        /// Issue JSON (reads from stdin if not provided or `-`)
        file: Option<PathBuf>,

        /// Viewport as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_viewport)]
        viewport: Size,
    },

    /// Print the visible pages and the materialized window at an offset
    Window {
        /// Issue JSON (reads from stdin if not provided or `-`)
        file: Option<PathBuf>,

        /// Viewport as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_viewport)]
        viewport: Size,

        /// Container translate-left in pixels (clamped to the strip)
        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        offset: f64,
    },
}

/// Parse `600x800`.
fn parse_viewport(raw: &str) -> Result<Size, String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| format!("invalid dimension '{part}' in '{raw}'"))
    };
    Ok(Size::new(f64::from(parse(width)?), f64::from(parse(height)?)))
}

fn read_input(file: Option<PathBuf>) -> Result<String, Box<dyn Error>> {
    Ok(detect_input_source(file)?.read_document()?)
}

fn run_layout(
    config: &ResolvedConfig,
    document: &str,
    state: LayoutState,
    basis: Option<&str>,
) -> Result<Vec<String>, Box<dyn Error>> {
    let content = smartflow::parser::parse_article(document)?;
    let basis = match basis {
        Some(raw) => smartflow::parser::parse_basis(raw)?,
        None => config.basis.to_basis(),
    };
    let mut view = ArticleView::new(basis, &content, LineMetrics::new(config.avg_char_width));
    let columns = view.show(state)?;

    Ok(columns
        .iter()
        .enumerate()
        .map(|(index, column)| match column.filled_height() {
            Ok(height) => format!("column {index} [{height}]: {}", column.summary()),
            Err(_) => format!("column {index}: {}", column.summary()),
        })
        .collect())
}

fn run_zooms(document: &str, viewport: Size) -> Result<Vec<String>, Box<dyn Error>> {
    let mut issue = smartflow::parser::parse_issue(document)?;
    let info = issue.zoom_info(viewport);

    let mut lines = vec![
        format!("default: {}", info.default_zoom()),
        format!("min scale delta: {}", info.min_scale_delta()),
        "ladder:".to_string(),
    ];
    lines.extend(info.zooms().iter().map(|zoom| format!("  {zoom}")));
    lines.push("all:".to_string());
    lines.extend(info.all_zooms().iter().map(|zoom| format!("  {zoom}")));
    Ok(lines)
}

fn run_window(
    config: &ResolvedConfig,
    document: &str,
    viewport: Size,
    offset: f64,
) -> Result<Vec<String>, Box<dyn Error>> {
    let mut issue = smartflow::parser::parse_issue(document)?;
    let zoom = issue.zoom_info(viewport).default_zoom().clone();
    let mut pool = PagesPool::new(&issue, &zoom, viewport, config.pool_capacity);
    let offset = pool.clamp_offset(offset);
    let window = pool.set_offset(offset)?;

    Ok(vec![
        format!("offset: {offset}"),
        format!(
            "visible: {}..={}",
            window.first_visible, window.last_visible
        ),
        format!("window: {}..={} (center {})", window.start, window.end, window.center),
    ])
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = smartflow::config::load_config_with_precedence(args.config.clone())?;
        let merged = smartflow::config::merge_config(config_file);
        let with_env = smartflow::config::apply_env_overrides(merged)?;
        smartflow::config::apply_cli_overrides(with_env, args.capacity.map(|c| c as usize))
    };

    smartflow::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let lines = match args.command {
        Command::Layout { file, state, basis } => {
            let basis = basis.map(std::fs::read_to_string).transpose()?;
            run_layout(&config, &read_input(file)?, state, basis.as_deref())?
        }
        Command::Zooms { file, viewport } => run_zooms(&read_input(file)?, viewport)?,
        Command::Window {
            file,
            viewport,
            offset,
        } => run_window(&config, &read_input(file)?, viewport, offset)?,
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUE: &str = r#"{
        "id": "weekly-12",
        "heights": [600, 800, 1000],
        "pageSizes": [{"w": 400, "h": 800}, {"w": 600, "h": 1200}],
        "magnifierPageSizes": [{"w": 1500, "h": 3000}],
        "pages": 6,
        "pageLayout": [
            {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
            {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
            {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
            {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
            {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0},
            {"Width": 1000, "Height": 2000, "maxUnrestrictedScale": 0}
        ]
    }"#;

    #[test]
    fn test_help_does_not_error() {
        let err = Args::try_parse_from(["smartflow", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let err = Args::try_parse_from(["smartflow", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Args::try_parse_from(["smartflow"]).is_err());
    }

    #[test]
    fn test_layout_defaults() {
        let args = Args::parse_from(["smartflow", "layout", "article.json"]);
        assert_eq!(args.config, None);
        assert_eq!(args.capacity, None);
        assert_eq!(
            args.command,
            Command::Layout {
                file: Some(PathBuf::from("article.json")),
                state: LayoutState::Expanded,
                basis: None,
            }
        );
    }

    #[test]
    fn test_layout_state_flag() {
        let args = Args::parse_from(["smartflow", "layout", "--state", "preview"]);
        assert!(matches!(
            args.command,
            Command::Layout {
                state: LayoutState::Preview,
                file: None,
                ..
            }
        ));
    }

    #[test]
    fn test_layout_state_rejects_unknown() {
        assert!(Args::try_parse_from(["smartflow", "layout", "--state", "folded"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "smartflow",
            "window",
            "issue.json",
            "--viewport",
            "600x800",
            "--offset",
            "-1200",
            "--capacity",
            "7",
            "--config",
            "/custom/config.toml",
        ]);
        assert_eq!(args.capacity, Some(7));
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(
            args.command,
            Command::Window {
                file: Some(PathBuf::from("issue.json")),
                viewport: Size::new(600.0, 800.0),
                offset: -1200.0,
            }
        );
    }

    #[test]
    fn test_capacity_rejects_zero() {
        let err = Args::try_parse_from(["smartflow", "--capacity", "0", "zooms", "--viewport", "1x1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("600x800"), Ok(Size::new(600.0, 800.0)));
        assert_eq!(parse_viewport("1024X768"), Ok(Size::new(1024.0, 768.0)));
        assert!(parse_viewport("600").is_err());
        assert!(parse_viewport("0x800").is_err());
        assert!(parse_viewport("wide x tall").is_err());
    }

    #[test]
    fn test_run_layout_expanded() {
        let config = ResolvedConfig::default();
        let article = r#"{"title": "Short", "blocks": ["One paragraph of text."]}"#;
        let lines = run_layout(&config, article, LayoutState::Expanded, None).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("column 0 ["), "got: {}", lines[0]);
        assert!(lines[0].contains("title 20 | text 20"), "got: {}", lines[0]);
    }

    #[test]
    fn test_run_layout_bulk_is_unmeasured() {
        let config = ResolvedConfig::default();
        let article = r#"{"title": "Short", "blocks": ["a", "b"]}"#;
        let lines = run_layout(&config, article, LayoutState::Init, None).unwrap();
        assert_eq!(lines, vec!["column 0: title ? | text ? | text ?".to_string()]);
    }

    #[test]
    fn test_run_zooms_lists_ladder() {
        let lines = run_zooms(ISSUE, Size::new(600.0, 800.0)).unwrap();
        assert_eq!(lines[0], "default: normal 600x800 (fit)");
        assert!(lines.contains(&"  magnifier 1500x3000".to_string()));
    }

    #[test]
    fn test_run_window_clamps_offset() {
        let config = ResolvedConfig::default();
        let lines = run_window(&config, ISSUE, Size::new(600.0, 800.0), 500.0).unwrap();
        assert_eq!(lines[0], "offset: 0");
        assert_eq!(lines[1], "visible: 0..=1");
        assert_eq!(lines[2], "window: 0..=4 (center 0)");
    }
}
