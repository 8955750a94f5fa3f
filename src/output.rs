use crate::classifier::SourceTree;
use crate::orchestrator::BuildReport;
use crate::project::Analysis;
use crate::theme::Theme;
use serde::Serialize;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,       // Only errors
    Normal,      // Commands being run
    Verbose,     // Per-artifact decisions
    VeryVerbose, // Full dependency analysis
}

impl OutputMode {
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if verbose >= 2 {
            OutputMode::VeryVerbose
        } else if verbose == 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }
}

/// Print a titled bullet list, or `empty` when there is nothing to list.
fn print_list(title: &str, empty: &str, items: &[String]) {
    if items.is_empty() {
        println!("{}", Theme::muted(empty));
    } else {
        println!("{}", title);
        for item in items {
            println!(" * {}", item);
        }
    }
    println!();
}

/// Discovery results: sources, headers, entry points.
pub fn print_tree(tree: &SourceTree) {
    print_list(
        "Found the following source files:",
        "No source files were found",
        &tree.sources,
    );
    print_list(
        "Found the following header files:",
        "No header files were found",
        &tree.headers,
    );
    print_list(
        "The following source files were identified as main files:",
        "No source file was identified as main file",
        &tree.entry_points,
    );
}

/// Per-unit dependency and flag information.
pub fn print_analysis(analysis: &Analysis) {
    for unit in analysis.units.values() {
        let title = if unit.is_entry_point {
            format!("{} {}", Theme::header(&unit.path), Theme::value("(main)"))
        } else {
            Theme::header(&unit.path)
        };
        println!("{}", title);
        print_field("includes", &unit.local_includes);
        print_field("directly depends on", &unit.direct_dependencies);
        print_field("must be linked against", &unit.link_set);
        print_field("compiler flags", &unit.compiler_flags);
        print_field("linker flags", &unit.linker_flags);
        println!("  {} {}", Theme::muted("last changed:"), unit.staleness.display());
        println!();
    }
}

fn print_field(label: &str, items: &[String]) {
    if items.is_empty() {
        println!("  {} {}", Theme::muted(&format!("{}:", label)), Theme::muted("(none)"));
    } else {
        println!("  {} {}", Theme::muted(&format!("{}:", label)), items.join(" "));
    }
}

/// One-line summary after a build.
pub fn print_build_report(report: &BuildReport, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    if report.entry_points.is_empty() {
        println!("{}", Theme::warning("No main files found, nothing to build"));
        return;
    }

    if report.is_noop() {
        println!("{}", Theme::success("Build done (everything up to date)"));
    } else {
        println!(
            "{} {} compiled, {} linked",
            Theme::success("Build done:"),
            report.compiled.len(),
            report.linked.len()
        );
    }

    if mode != OutputMode::Normal {
        println!(
            "  {} objects and {} executables were already up to date",
            report.objects_up_to_date, report.executables_up_to_date
        );
    }
}

#[derive(Serialize)]
struct JsonEnvelope<'a, T: Serialize> {
    version: &'static str,
    timestamp: String,
    result: &'a T,
}

/// Print any serializable result as JSON for scripting
pub fn print_json<T: Serialize>(result: &T) -> anyhow::Result<()> {
    println!("{}", to_json(result)?);
    Ok(())
}

pub fn to_json<T: Serialize>(result: &T) -> anyhow::Result<String> {
    let envelope = JsonEnvelope {
        version: "1.0",
        timestamp: chrono::Utc::now().to_rfc3339(),
        result,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}
