//! Colored terminal output for the wayfarer CLI.

use crate::orchestrator::Notice;
use crate::types::MessageRole;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Output style configuration
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let title = format!("wayfarer v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "✈".bright_cyan().bold(),
                title.bright_white().bold(),
                "AI travel planning, one conversation at a time".dimmed()
            );
        } else {
            println!("\n   {}\n   AI travel planning, one conversation at a time\n", title);
        }
    }

    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Errors go to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    pub fn created(&self, path: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), path.bright_white());
        } else {
            println!("  [CREATED] {}", path);
        }
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!("  {} {} {}", "○".yellow(), path.dimmed(), format!("({})", reason).yellow());
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("  {}", message.dimmed().italic());
        } else {
            println!("  [TIP] {}", message);
        }
    }

    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// One chat line, prefixed by who said it.
    pub fn chat(&self, role: MessageRole, text: &str) {
        match (role, self.colored) {
            (MessageRole::User, true) => println!("  {} {}", "you ›".bright_blue().bold(), text),
            (MessageRole::Assistant, true) => {
                println!("  {} {}", "ai  ›".bright_magenta().bold(), text)
            }
            (MessageRole::User, false) => println!("  you > {}", text),
            (MessageRole::Assistant, false) => println!("  ai  > {}", text),
        }
    }

    pub fn notice(&self, notice: &Notice) {
        if notice.kind.is_error() {
            self.warning(&notice.message);
        } else {
            self.success(&notice.message);
        }
    }

    /// Input prompt showing the current view; flushed without a newline.
    pub fn prompt(&self, view: &str) {
        if self.colored {
            print!("{} ", format!("[{}]›", view).bright_cyan().bold());
        } else {
            print!("[{}]> ", view);
        }
        io::stdout().flush().ok();
    }

    pub fn newline(&self) {
        println!();
    }
}
