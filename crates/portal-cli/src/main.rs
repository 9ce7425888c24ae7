//! `portal` command-line tool
//!
//! Offline access to the merge engine and checklist views, working on stored
//! checklist JSON files.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use portal_checklist::{Checklist, ChecklistStats, SectionLayout};
use portal_merge::{merge, ChecklistDiff, DirtyMask};
use portal_sync::PortalConfig;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let file = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help(help)
    };
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");
    let config = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Portal configuration file (TOML)");

    Command::new("portal")
        .version(clap::crate_version!())
        .about("Document checklist merge and inspection")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("merge")
                .about("Merge a local checklist into the authoritative one")
                .arg(
                    Arg::new("authoritative")
                        .long("authoritative")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Stored checklist JSON"),
                )
                .arg(
                    Arg::new("local")
                        .long("local")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Client's local checklist JSON"),
                )
                .arg(
                    Arg::new("dirty")
                        .long("dirty")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Dirty mask JSON (sections/categories/documents/statuses)"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the result here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("List changes between two checklists")
                .arg(file("before", "Earlier checklist JSON"))
                .arg(file("after", "Later checklist JSON"))
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("stats")
                .about("Count documents by status")
                .arg(file("file", "Checklist JSON"))
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("stage")
                .about("Normalize a CRM pipeline stage id")
                .arg(Arg::new("id").required(true).help("Pipeline stage id"))
                .arg(config.clone()),
        )
        .subcommand(
            Command::new("layout")
                .about("Show categories per selected section")
                .arg(file("file", "Checklist JSON"))
                .arg(config)
                .arg(json),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    match matches.subcommand() {
        Some(("merge", args)) => cmd_merge(args),
        Some(("diff", args)) => cmd_diff(args),
        Some(("stats", args)) => cmd_stats(args),
        Some(("stage", args)) => cmd_stage(args),
        Some(("layout", args)) => cmd_layout(args),
        Some((name, _)) => anyhow::bail!("unknown subcommand {name}"),
        None => anyhow::bail!("no subcommand given"),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument <{name}>"))
}

/// Stored checklist from disk; malformed content reads as the default
fn read_checklist(path: &Path) -> Result<Checklist> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Checklist::from_stored(Some(&raw)))
}

fn read_dirty(path: &Path) -> Result<DirtyMask> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid dirty mask in {}", path.display()))
}

fn load_config(args: &ArgMatches) -> Result<PortalConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => Ok(PortalConfig::load(path)?),
        None => {
            let mut config = PortalConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }
}

fn merge_files(authoritative: &Path, local: &Path, dirty: &Path) -> Result<Checklist> {
    let authoritative = read_checklist(authoritative)?;
    let local = read_checklist(local)?;
    let dirty = read_dirty(dirty)?;

    let merged = merge(&authoritative, &local, &dirty);
    tracing::info!(
        touched = dirty.touched_categories().len(),
        changes = %ChecklistDiff::between(&authoritative, &merged),
        "merged"
    );
    Ok(merged)
}

fn cmd_merge(args: &ArgMatches) -> Result<()> {
    let merged = merge_files(
        path_arg(args, "authoritative")?,
        path_arg(args, "local")?,
        path_arg(args, "dirty")?,
    )?;
    let encoded = serde_json::to_string_pretty(&merged)?;

    match args.get_one::<PathBuf>("out") {
        Some(out) => {
            fs::write(out, encoded + "\n")
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{encoded}"),
    }
    Ok(())
}

fn cmd_diff(args: &ArgMatches) -> Result<()> {
    let before = read_checklist(path_arg(args, "before")?)?;
    let after = read_checklist(path_arg(args, "after")?)?;
    let diff = ChecklistDiff::between(&before, &after);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else if diff.is_empty() {
        println!("no changes");
    } else {
        for change in &diff.changes {
            println!("{change}");
        }
    }
    Ok(())
}

fn cmd_stats(args: &ArgMatches) -> Result<()> {
    let checklist = read_checklist(path_arg(args, "file")?)?;
    let stats = ChecklistStats::of(&checklist);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_stats(&stats));
    }
    Ok(())
}

fn cmd_stage(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let id = args
        .get_one::<String>("id")
        .context("missing argument <id>")?;

    let stage = config.stages.normalize(id);
    println!("{} ({}/{})", stage, stage.position() + 1, portal_checklist::TaxStage::ALL.len());
    Ok(())
}

fn cmd_layout(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let checklist = read_checklist(path_arg(args, "file")?)?;
    let layout = config.vocabulary.layout(&checklist);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        print!("{}", render_layout(&layout));
    }
    Ok(())
}

fn render_stats(stats: &ChecklistStats) -> String {
    format!(
        "documents:          {}\n\
         accepted:           {}\n\
         pending review:     {}\n\
         needs resubmission: {}\n\
         missing files:      {}\n\
         not submitted:      {}\n\
         active categories:  {}\n\
         completion:         {:.0}%\n",
        stats.total,
        stats.accepted,
        stats.pending_review,
        stats.needs_resubmission,
        stats.missing_files,
        stats.not_submitted,
        stats.active_categories,
        stats.completion() * 100.0,
    )
}

fn render_layout(layout: &[SectionLayout]) -> String {
    let mut out = String::new();
    for section in layout {
        out.push_str(section.section.as_str());
        out.push('\n');
        for entry in &section.entries {
            let mark = if entry.active { 'x' } else { ' ' };
            let _ = writeln!(
                out,
                "  [{mark}] {} ({} documents)",
                entry.label, entry.document_count
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_checklist::{Category, DocumentEntry, DocumentStatus, Vocabulary};
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn merge_subcommand_parses() {
        let matches = cli()
            .try_get_matches_from([
                "portal",
                "merge",
                "--authoritative",
                "a.json",
                "--local",
                "l.json",
                "--dirty",
                "d.json",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "merge");
        assert_eq!(path_arg(args, "local").unwrap(), &PathBuf::from("l.json"));
        assert!(args.get_one::<PathBuf>("out").is_none());
    }

    #[test]
    fn merge_files_applies_dirty_mask() {
        let dir = tempfile::tempdir().unwrap();
        let stored = r#"{"_meta":{"selectedSections":["personal"]},
            "w_2s":{"label":"W-2s","status":"active",
                    "documents":[{"name":"W2","status":"pending_review"}]}}"#;
        let local = stored.replace("pending_review", "accepted");
        let authoritative = write(dir.path(), "auth.json", stored);
        let local = write(dir.path(), "local.json", &local);

        let clean = write(dir.path(), "clean.json", "{}");
        let merged = merge_files(&authoritative, &local, &clean).unwrap();
        assert_eq!(
            merged.document("w_2s", 0).unwrap().status,
            DocumentStatus::PendingReview
        );

        let dirty = write(dir.path(), "dirty.json", r#"{"statuses":{"w_2s":{"0":true}}}"#);
        let merged = merge_files(&authoritative, &local, &dirty).unwrap();
        assert_eq!(merged.document("w_2s", 0).unwrap().status, DocumentStatus::Accepted);
    }

    #[test]
    fn invalid_dirty_mask_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let checklist = write(dir.path(), "c.json", "{}");
        let dirty = write(dir.path(), "d.json", "[1, 2]");
        assert!(merge_files(&checklist, &checklist, &dirty).is_err());
    }

    #[test]
    fn layout_rendering() {
        let mut checklist = Checklist::default();
        checklist.insert_category(
            "k_1s",
            Category::new("K-1s")
                .with_active(true)
                .with_documents(vec![DocumentEntry::new("K-1 Fund LP")]),
        );
        let layout = Vocabulary::standard().layout(&checklist);
        let rendered = render_layout(&layout);

        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("personal"));
        assert_eq!(lines.next(), Some("  [x] K-1s (1 documents)"));
        assert_eq!(lines.next(), Some("  [ ] W-2s (0 documents)"));
    }

    #[test]
    fn stats_rendering() {
        let stats = ChecklistStats {
            total: 4,
            accepted: 1,
            ..ChecklistStats::default()
        };
        assert!(render_stats(&stats).contains("completion:         25%"));
    }
}
