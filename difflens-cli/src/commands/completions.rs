//! Shell completions command - Generate shell completion scripts
//!
//! Generates completion scripts for bash, zsh, fish, powershell and elvish.

use std::io;

use clap::Command;
use clap_complete::{generate, shells};
use colored::Colorize;
use serde::Serialize;

use crate::output::{CsvOutput, Output, OutputConfig, OutputFormat, Outputter};

const BIN_NAME: &str = "difflens";

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shell::Bash => write!(f, "bash"),
            Shell::Zsh => write!(f, "zsh"),
            Shell::Fish => write!(f, "fish"),
            Shell::PowerShell => write!(f, "powershell"),
            Shell::Elvish => write!(f, "elvish"),
        }
    }
}

/// Instructions for installing completions
#[derive(Debug, Serialize)]
pub struct CompletionInstructions {
    pub shell: String,
    pub instructions: Vec<String>,
}

impl Outputter for CompletionInstructions {
    fn to_table(&self, _config: &OutputConfig) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} completions for {}\n\n",
            BIN_NAME.cyan().bold(),
            self.shell.yellow()
        ));
        output.push_str(&format!("{}\n", "Installation:".cyan().bold()));
        for instruction in &self.instructions {
            output.push_str(&format!("  {}\n", instruction));
        }
        output
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        let rows: Vec<Vec<String>> = self
            .instructions
            .iter()
            .map(|i| vec![self.shell.clone(), i.clone()])
            .collect();
        CsvOutput::from_rows(&["shell", "instruction"], &rows)
    }
}

/// Get installation instructions for a shell
fn get_instructions(shell: Shell) -> Vec<String> {
    let lines: &[&str] = match shell {
        Shell::Bash => &[
            "# Add to ~/.bashrc:",
            "eval \"$(difflens completions bash)\"",
            "",
            "# Or save to a file:",
            "difflens completions bash > ~/.local/share/bash-completion/completions/difflens",
        ],
        Shell::Zsh => &[
            "# Add to ~/.zshrc:",
            "eval \"$(difflens completions zsh)\"",
            "",
            "# Or save to a file in fpath:",
            "difflens completions zsh > ~/.zfunc/_difflens",
            "# Then add to ~/.zshrc before compinit:",
            "fpath=(~/.zfunc $fpath)",
        ],
        Shell::Fish => &[
            "# Save to fish completions directory:",
            "difflens completions fish > ~/.config/fish/completions/difflens.fish",
        ],
        Shell::PowerShell => &[
            "# Add to $PROFILE:",
            "Invoke-Expression (& difflens completions powershell | Out-String)",
        ],
        Shell::Elvish => &[
            "# Add to ~/.elvish/rc.elv:",
            "eval (difflens completions elvish | slurp)",
        ],
    };
    lines.iter().map(|l| l.to_string()).collect()
}

/// Write the completion script for `shell` to stdout
pub fn generate_completions(shell: Shell, cmd: &mut Command) {
    let out = &mut io::stdout();
    match shell {
        Shell::Bash => generate(shells::Bash, cmd, BIN_NAME, out),
        Shell::Zsh => generate(shells::Zsh, cmd, BIN_NAME, out),
        Shell::Fish => generate(shells::Fish, cmd, BIN_NAME, out),
        Shell::PowerShell => generate(shells::PowerShell, cmd, BIN_NAME, out),
        Shell::Elvish => generate(shells::Elvish, cmd, BIN_NAME, out),
    }
}

/// Run the completions command
pub fn run(
    shell: Shell,
    show_instructions: bool,
    cmd: &mut Command,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if show_instructions {
        let instructions = CompletionInstructions {
            shell: shell.to_string(),
            instructions: get_instructions(shell),
        };
        return Output::new(instructions, format).render();
    }

    generate_completions(shell, cmd);
    Ok(())
}
