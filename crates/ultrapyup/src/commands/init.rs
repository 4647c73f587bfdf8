//! `ultrapyup init`: initialize the project, write the selected extras, then
//! install the development tools.

use std::path::Path;

use anyhow::{Context, Result};
use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::{InitArgs, OutputFormat};
use crate::commands::ExitStatus;
use crate::printer::Printer;
use crate::project::{
    InitOrchestrator, InitResult, InstallPlan, PathHostTools, ProcessToolRunner, TerminalPrompt,
    ToolDefaults, ToolName, ToolRunner,
};
use crate::setup::{self, Editor, FileOutcome, GeneratedFile, HookTool, ProjectTools};

/// The JSON report: the core result plus the files written around it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Report<'a> {
    #[serde(flatten)]
    result: &'a InitResult,
    editor_files: Vec<GeneratedFile>,
    hook_files: Vec<GeneratedFile>,
}

/// Execute `ultrapyup init`.
pub(crate) fn execute(args: &InitArgs, printer: Printer) -> Result<ExitStatus> {
    let defaults = match &args.tool_defaults {
        Some(path) => ToolDefaults::from_path(path)?,
        None => ToolDefaults::builtin(),
    };
    let directory = std::path::absolute(&args.directory).with_context(|| {
        format!(
            "failed to resolve project directory `{}`",
            args.directory.display()
        )
    })?;

    let prompt = TerminalPrompt::default();
    let mut result = InitOrchestrator::new(&prompt, &PathHostTools, &printer)
        .with_defaults(defaults)
        .run(&directory, args.package_manager)?;

    let mut editor_files = Vec::new();
    let mut hook_files = Vec::new();
    let mut activations = Vec::new();
    if let Some(kind) = result.package_manager.as_ref().map(|resolved| resolved.kind) {
        let checker = result
            .type_checker()
            .unwrap_or_else(|| ToolName::type_checker_for(kind));
        let tools = ProjectTools::new(kind, checker);
        let (editors, hooks) = selection(args)?;

        editor_files = setup::editor::write_rules(&directory, &editors, tools)
            .context("failed to write editor rules")?;
        hook_files = setup::hooks::write_configs(&directory, &hooks, tools)
            .context("failed to write git hook configuration")?;
        for file in editor_files.iter().chain(&hook_files) {
            announce(file, printer);
        }

        // The hook managers are development dependencies too.
        let packages: Vec<String> = hooks.iter().map(|tool| tool.as_str().to_owned()).collect();
        match &mut result.install_plan {
            Some(plan) => packages.iter().for_each(|package| plan.push(package)),
            None => result.install_plan = InstallPlan::for_packages(kind, packages),
        }
        activations = hooks
            .into_iter()
            .map(|tool| (tool, tool.activation(tools)))
            .collect();
    }

    match args.output_format {
        OutputFormat::Json => {
            let report = Report {
                result: &result,
                editor_files,
                hook_files,
            };
            let json = serde_json::to_string_pretty(&report)?;
            anstream::println!("{json}");
        }
        OutputFormat::Text => summarize(&result, printer),
    }

    let Some(plan) = &result.install_plan else {
        return Ok(ExitStatus::Success);
    };
    if args.no_install {
        printer.info(&format!(
            "Run `{}` to install the development tools",
            plan.to_string().cyan()
        ));
        for (_, activation) in &activations {
            printer.info(&format!(
                "Then run `{}` to enable the git hooks",
                activation.to_string().cyan()
            ));
        }
        return Ok(ExitStatus::Success);
    }

    printer.info(&format!("Installing development tools with `{plan}`"));
    let status = run(plan, &directory)?;
    if status != ExitStatus::Success {
        return Ok(status);
    }
    printer.success("Development tools installed.");

    for (tool, activation) in &activations {
        if run(activation, &directory)? != ExitStatus::Success {
            printer.warn(&format!(
                "failed to enable the {tool} git hooks; run `{activation}` to retry"
            ));
        }
    }
    Ok(ExitStatus::Success)
}

/// The editors and hook managers to set up, from the flags or an interactive menu.
fn selection(args: &InitArgs) -> Result<(Vec<Editor>, Vec<HookTool>)> {
    let mut editors = args.editor.clone();
    let mut hooks = args.pre_commit.clone();

    let term = Term::stderr();
    if editors.is_empty() && hooks.is_empty() && args.output_format == OutputFormat::Text {
        let choices: Vec<_> = Editor::ALL.iter().map(|e| (*e, e.label())).collect();
        editors = setup::choose(&term, "Which editor rules do you want to enable?", &choices)?;
        let choices: Vec<_> = HookTool::ALL.iter().map(|t| (*t, t.label())).collect();
        hooks = setup::choose(&term, "Which pre-commit tool would you like to use?", &choices)?;
    }

    editors.sort_unstable();
    editors.dedup();
    hooks.sort_unstable();
    hooks.dedup();
    Ok((editors, hooks))
}

fn announce(file: &GeneratedFile, printer: Printer) {
    match file.outcome {
        FileOutcome::Created => printer.info(&format!("Created `{}`", file.path.display())),
        FileOutcome::Kept => printer.info(&format!("Kept existing `{}`", file.path.display())),
    }
}

/// Run `plan` in `directory`, mapping a failed command to its exit status.
fn run(plan: &InstallPlan, directory: &Path) -> Result<ExitStatus> {
    let outcome = ProcessToolRunner
        .run(plan, directory)
        .with_context(|| format!("failed to run `{}`", plan.program))?;

    if outcome.success() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::External(outcome.exit_code))
    }
}

fn summarize(result: &InitResult, printer: Printer) {
    let Some(resolved) = &result.package_manager else {
        return;
    };

    let tools: Vec<_> = result.tools_written().map(ToolName::as_str).collect();
    let configured = if tools.is_empty() {
        "no new tool configuration".to_owned()
    } else {
        format!("configured {}", tools.join(", "))
    };
    let migrated = match result.migrated_count() {
        1 => "1 dependency".to_owned(),
        count => format!("{count} dependencies"),
    };

    printer.success(&format!(
        "Initialized {} project: migrated {migrated}, {configured}.",
        resolved.kind
    ));
    if !result.warnings.is_empty() {
        printer.warn(&format!(
            "{} item(s) need manual attention, see the warnings above",
            result.warnings.len()
        ));
    }
}
